//! 死信队列 HTTP 控制器 / DLQ HTTP controller
//!
//! 只做请求解析与结果映射，不含业务逻辑。
//! Request decoding and outcome mapping only.
//!
//! - 新增 / 查询失败 → 4xx（400 / 404）
//! - 删除 / 列表 / 清空失败 → 500

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult, ErrorBody};
use crate::modules::dlq::model::{Message, NewMessage};
use crate::modules::dlq::service::DlqService;

const MSG_ADDED: &str = "Message added to DLQ";
const MSG_DELETED: &str = "Message deleted from DLQ";
const MSG_CLEARED: &str = "All messages cleared from DLQ";
const MSG_NOT_FOUND: &str = "Message not found";
const MSG_INVALID_ID: &str = "Invalid ID";

/// 新增成功响应 / Insert response envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddMessageResponse {
    pub message: String,
    pub data: Message,
}

/// 操作确认 / Confirmation body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Confirmation {
    pub message: String,
}

impl Confirmation {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// 请求体上限默认 256 MiB，`payload` 为任意长度文本
/// Default request body cap; `payload` is free-form text of any length.
pub const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024 * 1024;

/// JSON 解析失败时返回 400 `{"error": ...}` / Body decode errors become 400s
pub fn json_config(max_body_bytes: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(max_body_bytes)
        .error_handler(|err, _req| AppError::validation(err.to_string()).into())
}

fn parse_id(raw: &str) -> AppResult<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 0 => Ok(id),
        _ => Err(AppError::validation(MSG_INVALID_ID)),
    }
}

/// 新增死信消息 / Add a message to the DLQ
#[utoipa::path(
    post,
    path = "/dlq/message",
    tag = "DLQ",
    request_body = NewMessage,
    responses(
        (status = 200, description = "Message stored", body = AddMessageResponse),
        (status = 400, description = "Malformed body or duplicate message_id", body = ErrorBody)
    )
)]
pub async fn add_message(
    service: web::Data<dyn DlqService>,
    body: web::Json<NewMessage>,
) -> AppResult<HttpResponse> {
    let new_message = body.into_inner();
    new_message.validate().map_err(AppError::Validation)?;

    let message = service
        .add_message(new_message)
        .await
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AddMessageResponse {
        message: MSG_ADDED.to_string(),
        data: message,
    }))
}

/// 按主键查询 / Fetch by surrogate id
#[utoipa::path(
    get,
    path = "/dlq/message/id/{id}",
    tag = "DLQ",
    params(("id" = i64, Path, description = "Store-assigned id")),
    responses(
        (status = 200, description = "Message found", body = Message),
        (status = 400, description = "Non-numeric id", body = ErrorBody),
        (status = 404, description = "No such message", body = ErrorBody)
    )
)]
pub async fn get_message_by_id(
    service: web::Data<dyn DlqService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    match service.get_message_by_id(id).await {
        Ok(message) => Ok(HttpResponse::Ok().json(message)),
        Err(e) => {
            debug!(id, error = %e, "get_message_by_id failed");
            Err(AppError::not_found(MSG_NOT_FOUND))
        }
    }
}

/// 按业务键查询 / Fetch by business key
#[utoipa::path(
    get,
    path = "/dlq/message/message_id/{message_id}",
    tag = "DLQ",
    params(("message_id" = String, Path, description = "Client-supplied message id")),
    responses(
        (status = 200, description = "Message found", body = Message),
        (status = 404, description = "No such message", body = ErrorBody)
    )
)]
pub async fn get_message_by_message_id(
    service: web::Data<dyn DlqService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let message_id = path.into_inner();
    match service.get_message_by_message_id(&message_id).await {
        Ok(message) => Ok(HttpResponse::Ok().json(message)),
        Err(e) => {
            debug!(message_id = %message_id, error = %e, "get_message_by_message_id failed");
            Err(AppError::not_found(MSG_NOT_FOUND))
        }
    }
}

/// 列出全部消息（最新在前）/ List all messages, newest first
#[utoipa::path(
    get,
    path = "/dlq/messages",
    tag = "DLQ",
    responses(
        (status = 200, description = "All messages, newest first", body = [Message]),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn get_all_messages(service: web::Data<dyn DlqService>) -> AppResult<HttpResponse> {
    let messages = service
        .get_all_messages()
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;
    Ok(HttpResponse::Ok().json(messages))
}

#[utoipa::path(
    delete,
    path = "/dlq/message/id/{id}",
    tag = "DLQ",
    params(("id" = i64, Path, description = "Store-assigned id")),
    responses(
        (status = 200, description = "Deleted, or nothing matched", body = Confirmation),
        (status = 400, description = "Non-numeric id", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn delete_message_by_id(
    service: web::Data<dyn DlqService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    service
        .delete_message_by_id(id)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;
    Ok(HttpResponse::Ok().json(Confirmation::new(MSG_DELETED)))
}

#[utoipa::path(
    delete,
    path = "/dlq/message/message_id/{message_id}",
    tag = "DLQ",
    params(("message_id" = String, Path, description = "Client-supplied message id")),
    responses(
        (status = 200, description = "Deleted, or nothing matched", body = Confirmation),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn delete_message_by_message_id(
    service: web::Data<dyn DlqService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    service
        .delete_message_by_message_id(&path)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;
    Ok(HttpResponse::Ok().json(Confirmation::new(MSG_DELETED)))
}

/// 清空死信队列 / Remove every message
#[utoipa::path(
    delete,
    path = "/dlq/messages",
    tag = "DLQ",
    responses(
        (status = 200, description = "Store emptied", body = Confirmation),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn clear_messages(service: web::Data<dyn DlqService>) -> AppResult<HttpResponse> {
    service
        .clear_messages()
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;
    Ok(HttpResponse::Ok().json(Confirmation::new(MSG_CLEARED)))
}

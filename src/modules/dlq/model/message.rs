// 死信消息模型 / Dead-letter message model
// 说明: 字段与数据库列统一为蛇形命名（snake_case）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const TABLE_NAME: &str = "messages";

/// 已持久化的死信消息 / A persisted dead-letter message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Message {
    /// 存储分配的自增主键 / Store-assigned surrogate key
    pub id: i64,
    /// 客户端提供的业务键，全局唯一 / Client-supplied business key, unique
    pub message_id: String,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

/// 新增消息请求体 / Insert request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewMessage {
    pub message_id: String,
    pub payload: String,
}

impl NewMessage {
    pub fn new(message_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            payload: payload.into(),
        }
    }

    /// 必填字段不能为空 / Both fields are required and non-empty
    pub fn validate(&self) -> Result<(), String> {
        if self.message_id.is_empty() {
            return Err("message_id is required".to_string());
        }
        if self.payload.is_empty() {
            return Err("payload is required".to_string());
        }
        Ok(())
    }
}

use actix_web::{web, Scope};

use super::controller::dlq_controller::{
    add_message, clear_messages, delete_message_by_id, delete_message_by_message_id,
    get_all_messages, get_message_by_id, get_message_by_message_id, json_config,
    DEFAULT_MAX_BODY_BYTES,
};

/// `/dlq` 路由作用域，请求体上限为 `max_body_bytes`
/// The `/dlq` scope with a JSON body cap of `max_body_bytes`.
///
/// 需要调用方已注入 `web::Data<dyn DlqService>`。
/// The caller must have registered `web::Data<dyn DlqService>`.
pub fn scope(max_body_bytes: usize) -> Scope {
    web::scope("/dlq")
        .app_data(json_config(max_body_bytes))
        .route("/message", web::post().to(add_message))
        .service(
            web::resource("/message/id/{id}")
                .route(web::get().to(get_message_by_id))
                .route(web::delete().to(delete_message_by_id)),
        )
        .service(
            web::resource("/message/message_id/{message_id}")
                .route(web::get().to(get_message_by_message_id))
                .route(web::delete().to(delete_message_by_message_id)),
        )
        .service(
            web::resource("/messages")
                .route(web::get().to(get_all_messages))
                .route(web::delete().to(clear_messages)),
        )
}

/// 以默认请求体上限注册 `/dlq` 下的全部路由 / Mount every DLQ route with the default cap
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(scope(DEFAULT_MAX_BODY_BYTES));
}

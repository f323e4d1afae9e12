use utoipa::OpenApi;

/// OpenAPI 文档聚合
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::dlq::controller::dlq_controller::add_message,
        crate::modules::dlq::controller::dlq_controller::get_message_by_id,
        crate::modules::dlq::controller::dlq_controller::get_message_by_message_id,
        crate::modules::dlq::controller::dlq_controller::get_all_messages,
        crate::modules::dlq::controller::dlq_controller::delete_message_by_id,
        crate::modules::dlq::controller::dlq_controller::delete_message_by_message_id,
        crate::modules::dlq::controller::dlq_controller::clear_messages,
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::modules::dlq::model::Message,
            crate::modules::dlq::model::NewMessage,
            crate::modules::dlq::controller::AddMessageResponse,
            crate::modules::dlq::controller::Confirmation,
            crate::error::ErrorBody,
            crate::HealthStatus,
        )
    ),
    tags(
        (name = "DLQ", description = "死信消息的新增、查询与删除"),
        (name = "Health", description = "存储健康检查")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_dlq_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/dlq/message",
            "/dlq/message/id/{id}",
            "/dlq/message/message_id/{message_id}",
            "/dlq/messages",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}

use actix_web::{web, HttpResponse};

use crate::modules::dlq::repo::MessageRepository;
use crate::HealthStatus;

/// 存储健康检查 / Store health probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Store reachable", body = HealthStatus),
        (status = 503, description = "Store unreachable", body = HealthStatus)
    )
)]
pub async fn health_check(repo: web::Data<dyn MessageRepository>) -> HttpResponse {
    let status = repo.check_health().await;
    if status.healthy {
        HttpResponse::Ok().json(status)
    } else {
        tracing::warn!(component = %status.component, "health check failed");
        HttpResponse::ServiceUnavailable().json(status)
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

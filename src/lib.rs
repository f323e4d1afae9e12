// dlq-store 库主入口，按需导出模块

pub mod api;
#[path = "bootstrap/app_bootstrap.rs"]
pub mod app_bootstrap;
#[path = "bootstrap/command_registry.rs"]
pub mod command_registry;
pub mod comm;
pub mod db;
pub mod error;
pub mod modules;

#[cfg(test)]
mod testing;

pub use app_bootstrap::{AppBootstrap, AppConfig, AppState};
pub use command_registry::{build_app, ServerArgs};

// 健康检查接口与状态定义（统一对外暴露）
// Health check interface and status definitions
use async_trait::async_trait;

/// 健康状态：表示组件当前健康状况
/// Health status of a single component
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct HealthStatus {
    /// 组件名称（如 postgres_pool、memory_store）
    /// Component name (e.g., postgres_pool, memory_store)
    pub component: String,
    pub healthy: bool,
    /// 附加消息（错误信息）/ Error detail when unhealthy
    pub message: Option<String>,
    /// 采样时间戳（UTC）/ Sample timestamp (UTC)
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthStatus {
    pub fn healthy(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            healthy: true,
            message: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn unhealthy(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            healthy: false,
            message: Some(message.into()),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// 健康检查通用接口：由各存储实现具体检查逻辑
/// Implemented by each store backend
#[async_trait]
pub trait HealthCheck {
    /// 执行健康检查并返回健康状态
    async fn check_health(&self) -> HealthStatus;
}

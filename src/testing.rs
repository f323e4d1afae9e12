//! 测试用仓库替身 / Repository doubles for unit tests

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::error::{DbError, Result};
use crate::modules::dlq::model::{Message, NewMessage};
use crate::modules::dlq::repo::{MemoryMessageRepository, MessageRepository};
use crate::{HealthCheck, HealthStatus};

fn unavailable() -> DbError {
    DbError::Pool("connection refused".to_string())
}

/// 所有操作都失败的仓库，模拟存储不可用 / Every call fails like a dead store
pub struct FailingRepository;

#[async_trait]
impl MessageRepository for FailingRepository {
    async fn create(&self, _message: &NewMessage) -> Result<Message> {
        Err(unavailable())
    }
    async fn get_by_id(&self, _id: i64) -> Result<Message> {
        Err(unavailable())
    }
    async fn get_by_message_id(&self, _message_id: &str) -> Result<Message> {
        Err(unavailable())
    }
    async fn get_all(&self) -> Result<Vec<Message>> {
        Err(unavailable())
    }
    async fn delete_by_id(&self, _id: i64) -> Result<()> {
        Err(unavailable())
    }
    async fn delete_by_message_id(&self, _message_id: &str) -> Result<()> {
        Err(unavailable())
    }
    async fn delete_all(&self) -> Result<()> {
        Err(unavailable())
    }
}

#[async_trait]
impl HealthCheck for FailingRepository {
    async fn check_health(&self) -> HealthStatus {
        HealthStatus::unhealthy("failing_store", "connection refused")
    }
}

/// 按业务键查询总是未命中，其余委托给内存表；用于复现查重竞态
/// Business-key lookups always miss, everything else hits the memory table.
/// Reproduces the window where a concurrent insert is not yet visible.
pub struct StaleLookupRepository {
    inner: Arc<MemoryMessageRepository>,
}

impl StaleLookupRepository {
    pub fn new(inner: Arc<MemoryMessageRepository>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl MessageRepository for StaleLookupRepository {
    async fn create(&self, message: &NewMessage) -> Result<Message> {
        self.inner.create(message).await
    }
    async fn get_by_id(&self, id: i64) -> Result<Message> {
        self.inner.get_by_id(id).await
    }
    async fn get_by_message_id(&self, _message_id: &str) -> Result<Message> {
        Err(DbError::NotFound)
    }
    async fn get_all(&self) -> Result<Vec<Message>> {
        self.inner.get_all().await
    }
    async fn delete_by_id(&self, id: i64) -> Result<()> {
        self.inner.delete_by_id(id).await
    }
    async fn delete_by_message_id(&self, message_id: &str) -> Result<()> {
        self.inner.delete_by_message_id(message_id).await
    }
    async fn delete_all(&self) -> Result<()> {
        self.inner.delete_all().await
    }
}

#[async_trait]
impl HealthCheck for StaleLookupRepository {
    async fn check_health(&self) -> HealthStatus {
        self.inner.check_health().await
    }
}

//! 消息仓库 / Message repository
//!
//! 仓库是唯一访问存储的组件，与存储操作一一对应，不含业务逻辑。
//! The repository is the only component touching the store. One method per
//! store operation, no business logic.

use async_trait::async_trait;

use crate::db::error::Result;
use crate::modules::dlq::model::{Message, NewMessage};
use crate::HealthCheck;

pub mod memory_repo;
pub mod message_repo;

pub use memory_repo::MemoryMessageRepository;
pub use message_repo::PgMessageRepository;

#[async_trait]
pub trait MessageRepository: HealthCheck + Send + Sync {
    /// 插入消息，`message_id` 重复时返回 `ConstraintViolation`
    /// Insert; fails with `ConstraintViolation` on a duplicate `message_id`.
    async fn create(&self, message: &NewMessage) -> Result<Message>;

    /// 按主键读取，不存在返回 `NotFound` / By surrogate key
    async fn get_by_id(&self, id: i64) -> Result<Message>;

    /// 按业务键读取，不存在返回 `NotFound` / By business key
    async fn get_by_message_id(&self, message_id: &str) -> Result<Message>;

    /// 按 `created_at` 倒序返回全部 / All rows, newest first
    async fn get_all(&self) -> Result<Vec<Message>>;

    /// 按主键删除，未命中不报错 / No-op on miss
    async fn delete_by_id(&self, id: i64) -> Result<()>;

    /// 按业务键删除，未命中不报错 / No-op on miss
    async fn delete_by_message_id(&self, message_id: &str) -> Result<()>;

    async fn delete_all(&self) -> Result<()>;
}

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::db::error::DbError;
use crate::modules::dlq::model::{Message, NewMessage};
use crate::modules::dlq::repo::MessageRepository;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("message with this MessageID already exists")]
    DuplicateMessageId,
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Store(DbError),
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound => ServiceError::NotFound,
            other => ServiceError::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// 死信队列服务 / DLQ service
///
/// 唯一的业务规则：`message_id` 不可重复；其余操作直接委托给仓库。
/// The one business rule is "no duplicate `message_id`"; everything else is
/// delegated to the repository.
#[async_trait]
pub trait DlqService: Send + Sync {
    async fn add_message(&self, message: NewMessage) -> ServiceResult<Message>;
    async fn get_message_by_id(&self, id: i64) -> ServiceResult<Message>;
    async fn get_message_by_message_id(&self, message_id: &str) -> ServiceResult<Message>;
    async fn get_all_messages(&self) -> ServiceResult<Vec<Message>>;
    async fn delete_message_by_id(&self, id: i64) -> ServiceResult<()>;
    async fn delete_message_by_message_id(&self, message_id: &str) -> ServiceResult<()>;
    async fn clear_messages(&self) -> ServiceResult<()>;
}

pub struct DlqServiceImpl {
    repo: Arc<dyn MessageRepository>,
}

impl DlqServiceImpl {
    pub fn new(repo: Arc<dyn MessageRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl DlqService for DlqServiceImpl {
    /// 先查重再插入。两步之间不加锁：并发的相同 `message_id` 可能同时通过查重，
    /// 此时由表上的唯一约束兜底，后到者得到 `Store(ConstraintViolation)`。
    ///
    /// Check-then-insert is not atomic. Concurrent inserts of the same
    /// `message_id` may both pass the lookup; the table's unique constraint
    /// rejects the loser with `Store(ConstraintViolation)`.
    async fn add_message(&self, message: NewMessage) -> ServiceResult<Message> {
        match self.repo.get_by_message_id(&message.message_id).await {
            Ok(existing) if existing.id != 0 => return Err(ServiceError::DuplicateMessageId),
            Ok(_) | Err(DbError::NotFound) => {}
            // 查重失败不阻断插入 / a failed lookup does not block the insert
            Err(e) => debug!(error = %e, "duplicate lookup failed, attempting insert"),
        }
        self.repo.create(&message).await.map_err(ServiceError::from)
    }

    async fn get_message_by_id(&self, id: i64) -> ServiceResult<Message> {
        self.repo.get_by_id(id).await.map_err(ServiceError::from)
    }

    async fn get_message_by_message_id(&self, message_id: &str) -> ServiceResult<Message> {
        self.repo.get_by_message_id(message_id).await.map_err(ServiceError::from)
    }

    async fn get_all_messages(&self) -> ServiceResult<Vec<Message>> {
        self.repo.get_all().await.map_err(ServiceError::from)
    }

    async fn delete_message_by_id(&self, id: i64) -> ServiceResult<()> {
        self.repo.delete_by_id(id).await.map_err(ServiceError::from)
    }

    async fn delete_message_by_message_id(&self, message_id: &str) -> ServiceResult<()> {
        self.repo.delete_by_message_id(message_id).await.map_err(ServiceError::from)
    }

    async fn clear_messages(&self) -> ServiceResult<()> {
        self.repo.delete_all().await.map_err(ServiceError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::dlq::repo::MemoryMessageRepository;
    use crate::testing::{FailingRepository, StaleLookupRepository};

    fn service() -> (Arc<MemoryMessageRepository>, DlqServiceImpl) {
        let repo = Arc::new(MemoryMessageRepository::new());
        let svc = DlqServiceImpl::new(repo.clone());
        (repo, svc)
    }

    #[tokio::test]
    async fn test_add_then_get_by_message_id() {
        let (_, svc) = service();
        let created = svc.add_message(NewMessage::new("m1", "p1")).await.unwrap();
        let fetched = svc.get_message_by_message_id("m1").await.unwrap();
        assert_eq!(fetched.message_id, "m1");
        assert_eq!(fetched.payload, "p1");
        assert!(fetched.id > 0);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_duplicate_message_id_rejected() {
        let (repo, svc) = service();
        svc.add_message(NewMessage::new("m1", "p1")).await.unwrap();
        let err = svc
            .add_message(NewMessage::new("m1", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateMessageId));
        assert_eq!(err.to_string(), "message with this MessageID already exists");
        assert_eq!(repo.len(), 1);
        assert_eq!(svc.get_message_by_message_id("m1").await.unwrap().payload, "p1");
    }

    #[tokio::test]
    async fn test_get_deleted_id_is_not_found() {
        let (_, svc) = service();
        let m = svc.add_message(NewMessage::new("m1", "p1")).await.unwrap();
        svc.delete_message_by_id(m.id).await.unwrap();
        assert!(matches!(
            svc.get_message_by_id(m.id).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_id_succeeds() {
        let (_, svc) = service();
        assert!(svc.delete_message_by_id(12345).await.is_ok());
        assert!(svc.delete_message_by_message_id("nope").await.is_ok());
    }

    #[tokio::test]
    async fn test_clear_then_list_is_empty() {
        let (_, svc) = service();
        svc.add_message(NewMessage::new("a", "1")).await.unwrap();
        svc.add_message(NewMessage::new("b", "2")).await.unwrap();
        svc.clear_messages().await.unwrap();
        assert!(svc.get_all_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (_, svc) = service();
        for key in ["A", "B", "C"] {
            svc.add_message(NewMessage::new(key, "p")).await.unwrap();
        }
        let keys: Vec<String> = svc
            .get_all_messages()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.message_id)
            .collect();
        assert_eq!(keys, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_unique_constraint_backstops_race() {
        // 查重看不到已有记录，模拟并发请求同时通过查重
        // The lookup misses the existing row, as a concurrent request would.
        let inner = Arc::new(MemoryMessageRepository::new());
        inner.create(&NewMessage::new("m1", "first")).await.unwrap();
        let svc = DlqServiceImpl::new(Arc::new(StaleLookupRepository::new(inner.clone())));

        let err = svc
            .add_message(NewMessage::new("m1", "second"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Store(DbError::ConstraintViolation(_))
        ));
        assert_eq!(inner.len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_is_forwarded() {
        let svc = DlqServiceImpl::new(Arc::new(FailingRepository));
        assert!(matches!(
            svc.get_all_messages().await,
            Err(ServiceError::Store(DbError::Pool(_)))
        ));
        assert!(matches!(
            svc.add_message(NewMessage::new("m1", "p1")).await,
            Err(ServiceError::Store(DbError::Pool(_)))
        ));
    }
}

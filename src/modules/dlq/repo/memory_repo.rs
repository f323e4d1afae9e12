use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::MessageRepository;
use crate::db::error::{DbError, Result};
use crate::modules::dlq::model::message::TABLE_NAME;
use crate::modules::dlq::model::{Message, NewMessage};
use crate::{HealthCheck, HealthStatus};

#[derive(Default)]
struct MemoryTable {
    last_id: i64,
    rows: BTreeMap<i64, Message>,
}

/// 进程内消息表，语义与 PostgreSQL 表一致（含 `message_id` 唯一约束）
/// In-process message table with the same semantics as the SQL table,
/// including the unique constraint on `message_id`.
#[derive(Default)]
pub struct MemoryMessageRepository {
    table: RwLock<MemoryTable>,
}

impl MemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn create(&self, message: &NewMessage) -> Result<Message> {
        let mut table = self.table.write();
        if table
            .rows
            .values()
            .any(|row| row.message_id == message.message_id)
        {
            return Err(DbError::ConstraintViolation(format!(
                "duplicate key value violates unique constraint \"{}_message_id_key\"",
                TABLE_NAME
            )));
        }
        // 主键只增不减，删除后也不复用 / ids are never reused, even after deletes
        table.last_id += 1;
        let row = Message {
            id: table.last_id,
            message_id: message.message_id.clone(),
            payload: message.payload.clone(),
            created_at: Utc::now(),
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_by_id(&self, id: i64) -> Result<Message> {
        self.table
            .read()
            .rows
            .get(&id)
            .cloned()
            .ok_or(DbError::NotFound)
    }

    async fn get_by_message_id(&self, message_id: &str) -> Result<Message> {
        self.table
            .read()
            .rows
            .values()
            .find(|row| row.message_id == message_id)
            .cloned()
            .ok_or(DbError::NotFound)
    }

    async fn get_all(&self) -> Result<Vec<Message>> {
        let mut rows: Vec<Message> = self.table.read().rows.values().cloned().collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(rows)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        self.table.write().rows.remove(&id);
        Ok(())
    }

    async fn delete_by_message_id(&self, message_id: &str) -> Result<()> {
        self.table
            .write()
            .rows
            .retain(|_, row| row.message_id != message_id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        self.table.write().rows.clear();
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for MemoryMessageRepository {
    async fn check_health(&self) -> HealthStatus {
        HealthStatus::healthy("memory_store")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = MemoryMessageRepository::new();
        let a = repo.create(&NewMessage::new("a", "1")).await.unwrap();
        let b = repo.create(&NewMessage::new("b", "2")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(b.created_at >= a.created_at);
    }

    #[tokio::test]
    async fn test_unique_constraint() {
        let repo = MemoryMessageRepository::new();
        repo.create(&NewMessage::new("dup", "1")).await.unwrap();
        let err = repo.create(&NewMessage::new("dup", "2")).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(_)));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_clear() {
        let repo = MemoryMessageRepository::new();
        let first = repo.create(&NewMessage::new("a", "1")).await.unwrap();
        repo.delete_all().await.unwrap();
        assert!(repo.is_empty());
        let second = repo.create(&NewMessage::new("a", "1")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_lookups_and_deletes() {
        let repo = MemoryMessageRepository::new();
        let m = repo.create(&NewMessage::new("k", "v")).await.unwrap();
        assert_eq!(repo.get_by_id(m.id).await.unwrap(), m);
        assert_eq!(repo.get_by_message_id("k").await.unwrap(), m);
        assert!(matches!(repo.get_by_id(99).await, Err(DbError::NotFound)));

        repo.delete_by_message_id("k").await.unwrap();
        assert!(matches!(
            repo.get_by_message_id("k").await,
            Err(DbError::NotFound)
        ));
        // 未命中的删除同样成功 / deleting a miss still succeeds
        repo.delete_by_message_id("k").await.unwrap();
        repo.delete_by_id(m.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_all_newest_first() {
        let repo = MemoryMessageRepository::new();
        for key in ["a", "b", "c"] {
            repo.create(&NewMessage::new(key, "p")).await.unwrap();
        }
        let keys: Vec<String> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.message_id)
            .collect();
        assert_eq!(keys, vec!["c", "b", "a"]);
    }
}

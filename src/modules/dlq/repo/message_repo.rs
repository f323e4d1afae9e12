use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::MessageRepository;
use crate::db::error::{DbError, Result};
use crate::modules::dlq::model::{Message, NewMessage};
use crate::{HealthCheck, HealthStatus};

const SQL_INSERT: &str = "INSERT INTO messages (message_id, payload) VALUES ($1, $2) \
     RETURNING id, message_id, payload, created_at";
const SQL_BY_ID: &str = "SELECT id, message_id, payload, created_at FROM messages WHERE id = $1";
const SQL_BY_MESSAGE_ID: &str =
    "SELECT id, message_id, payload, created_at FROM messages WHERE message_id = $1";
const SQL_LIST: &str =
    "SELECT id, message_id, payload, created_at FROM messages ORDER BY created_at DESC, id DESC";
const SQL_DELETE_BY_ID: &str = "DELETE FROM messages WHERE id = $1";
const SQL_DELETE_BY_MESSAGE_ID: &str = "DELETE FROM messages WHERE message_id = $1";
const SQL_DELETE_ALL: &str = "DELETE FROM messages";

/// PostgreSQL 消息仓库 / PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, message: &NewMessage) -> Result<Message> {
        let row = sqlx::query_as::<_, Message>(SQL_INSERT)
            .bind(&message.message_id)
            .bind(&message.payload)
            .fetch_one(&self.pool)
            .await?;
        debug!(id = row.id, message_id = %row.message_id, "message inserted");
        Ok(row)
    }

    async fn get_by_id(&self, id: i64) -> Result<Message> {
        sqlx::query_as::<_, Message>(SQL_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)
    }

    async fn get_by_message_id(&self, message_id: &str) -> Result<Message> {
        sqlx::query_as::<_, Message>(SQL_BY_MESSAGE_ID)
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)
    }

    async fn get_all(&self) -> Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, Message>(SQL_LIST)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let res = sqlx::query(SQL_DELETE_BY_ID)
            .bind(id)
            .execute(&self.pool)
            .await?;
        debug!(id, rows = res.rows_affected(), "delete by id");
        Ok(())
    }

    async fn delete_by_message_id(&self, message_id: &str) -> Result<()> {
        let res = sqlx::query(SQL_DELETE_BY_MESSAGE_ID)
            .bind(message_id)
            .execute(&self.pool)
            .await?;
        debug!(message_id, rows = res.rows_affected(), "delete by message_id");
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let res = sqlx::query(SQL_DELETE_ALL).execute(&self.pool).await?;
        debug!(rows = res.rows_affected(), "messages cleared");
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for PgMessageRepository {
    async fn check_health(&self) -> HealthStatus {
        match crate::db::check_health(&self.pool).await {
            Ok(()) => HealthStatus::healthy("postgres_pool"),
            Err(e) => HealthStatus::unhealthy("postgres_pool", e.to_string()),
        }
    }
}

// 需要真实数据库：设置 DLQ_TEST_DATABASE_URL 后以 `cargo test -- --ignored` 运行
// Requires a live database: set DLQ_TEST_DATABASE_URL and run with `--ignored`.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::run_migrations;

    async fn repo() -> PgMessageRepository {
        let url = std::env::var("DLQ_TEST_DATABASE_URL").expect("DLQ_TEST_DATABASE_URL is not set");
        let pool = PgPool::connect(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        PgMessageRepository::new(pool)
    }

    fn unique_key(prefix: &str) -> String {
        format!(
            "{}-{}",
            prefix,
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)
        )
    }

    #[tokio::test]
    #[ignore = "requires DLQ_TEST_DATABASE_URL"]
    async fn test_pg_list_is_newest_first() {
        let repo = repo().await;
        let mut ids = Vec::new();
        for tag in ["a", "b", "c"] {
            let created = repo
                .create(&NewMessage::new(unique_key(tag), "payload"))
                .await
                .unwrap();
            ids.push(created.id);
        }
        let listed: Vec<i64> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .filter(|id| ids.contains(id))
            .collect();
        ids.reverse();
        assert_eq!(listed, ids);
        for id in ids {
            repo.delete_by_id(id).await.unwrap();
        }
    }

    #[tokio::test]
    #[ignore = "requires DLQ_TEST_DATABASE_URL"]
    async fn test_pg_crud_round() {
        let repo = repo().await;
        let key = unique_key("pg-test");
        let created = repo.create(&NewMessage::new(&key, "payload")).await.unwrap();
        assert!(created.id > 0);

        let dup = repo.create(&NewMessage::new(&key, "again")).await;
        assert!(matches!(dup, Err(DbError::ConstraintViolation(_))));

        let fetched = repo.get_by_message_id(&key).await.unwrap();
        assert_eq!(fetched, created);

        repo.delete_by_id(created.id).await.unwrap();
        assert!(matches!(
            repo.get_by_id(created.id).await,
            Err(DbError::NotFound)
        ));
        repo.delete_by_id(created.id).await.unwrap();
        assert!(repo.check_health().await.healthy);
    }
}

//! 表结构迁移 / Schema migration
//!
//! 所有语句均为幂等（`IF NOT EXISTS`），可在每次启动时执行。
//! Every statement is idempotent and safe to run on each startup.

use sqlx::PgPool;
use tracing::info;

use crate::db::error::Result;

struct Migration {
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "create_messages_table",
        sql: r#"
            CREATE TABLE IF NOT EXISTS messages (
                id BIGSERIAL PRIMARY KEY,
                message_id TEXT NOT NULL,
                payload TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                CONSTRAINT messages_message_id_key UNIQUE (message_id)
            )
        "#,
    },
    Migration {
        name: "create_messages_created_at_index",
        sql: "CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages (created_at DESC)",
    },
];

/// 在单个事务内执行全部迁移 / Apply all migrations inside one transaction
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    let mut tx = pool.begin().await?;
    for migration in MIGRATIONS {
        sqlx::query(migration.sql).execute(&mut *tx).await?;
        info!(migration = migration.name, "migration applied");
    }
    tx.commit().await?;
    Ok(())
}

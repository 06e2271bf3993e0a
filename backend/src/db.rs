use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Executor, Sqlite, SqlitePool};
use std::sync::Arc;

// Production database; override with HARU_DATABASE_URL.
const DATABASE_URL: &str = "sqlite:haru.db";

/// DbConnection manages the sqlite pool and schema for the service.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection, creating the database and
    /// schema if needed.
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize the standard database.
    pub async fn init() -> Result<Self> {
        let url = std::env::var("HARU_DATABASE_URL").unwrap_or_else(|_| DATABASE_URL.to_string());
        Self::new(&url).await
    }

    /// Initialize a test database with a unique name.
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema.
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        pool.execute(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                family_id TEXT,
                color TEXT
            );

            CREATE TABLE IF NOT EXISTS families (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                invite_code TEXT NOT NULL UNIQUE,
                created_by TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS child_profiles (
                id TEXT PRIMARY KEY,
                family_id TEXT NOT NULL,
                name TEXT NOT NULL,
                color TEXT NOT NULL,
                invite_code TEXT NOT NULL UNIQUE,
                linked_user_id TEXT,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                family_id TEXT NOT NULL,
                child_id TEXT,
                title TEXT NOT NULL,
                description TEXT,
                category TEXT NOT NULL DEFAULT 'general',
                start_date TEXT NOT NULL,
                start_time TEXT,
                end_time TEXT,
                is_all_day INTEGER NOT NULL DEFAULT 0,
                color TEXT,
                created_by TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS recurrences (
                id TEXT PRIMARY KEY,
                event_id TEXT NOT NULL UNIQUE,
                frequency TEXT NOT NULL,
                days_of_week TEXT NOT NULL,
                end_date TEXT
            );

            CREATE TABLE IF NOT EXISTS preparations (
                id TEXT PRIMARY KEY,
                family_id TEXT NOT NULL,
                child_id TEXT,
                title TEXT NOT NULL,
                description TEXT,
                category TEXT NOT NULL DEFAULT 'general',
                due_date TEXT NOT NULL,
                is_completed INTEGER NOT NULL DEFAULT 0,
                created_by TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                family_id TEXT NOT NULL,
                from_user_id TEXT NOT NULL,
                to_user_id TEXT,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS message_reads (
                user_id TEXT NOT NULL,
                family_id TEXT NOT NULL,
                last_read_at TEXT NOT NULL,
                PRIMARY KEY (user_id, family_id)
            );
            "#,
        )
        .await?;

        Ok(())
    }

    /// Get the underlying sqlite pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    #[tokio::test]
    async fn test_schema_bootstraps() {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");

        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM sqlite_master WHERE type = 'table' AND name IN \
             ('users', 'families', 'child_profiles', 'events', 'recurrences', 'preparations', \
              'messages', 'message_reads')",
        )
        .fetch_one(db.pool())
        .await
        .expect("Schema query failed");

        let count: i64 = row.get("count");
        assert_eq!(count, 8);
    }

    #[tokio::test]
    async fn test_setup_schema_is_idempotent() {
        let db = DbConnection::init_test().await.unwrap();
        DbConnection::setup_schema(db.pool())
            .await
            .expect("Re-running schema setup should not fail");
    }
}

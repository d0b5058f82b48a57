//! Helpers for tests that need a live `PostgreSQL` database.

use std::sync::Arc;

use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, EntityTrait, Schema,
    Statement,
};
use tracing::info;

use crate::entities::{MobileToken, Report, StrikeProfile};

/// Test database configuration.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER").unwrap_or_else(|_| "support_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "support_test".to_string()),
            database: std::env::var("TEST_DB_NAME").unwrap_or_else(|_| "support_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// Get the database URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// Get URL for connecting to postgres database (for creating test DB).
    #[must_use]
    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/postgres",
            self.username, self.password, self.host, self.port
        )
    }
}

/// A test database that creates the support tables on connect.
pub struct TestDatabase {
    conn: Arc<DatabaseConnection>,
    /// Database configuration.
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Connect to the configured database and make sure the support tables
    /// exist.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;
        create_tables(&conn).await?;

        info!(database = %config.database, "Connected to test database");

        Ok(Self {
            conn: Arc::new(conn),
            config,
        })
    }

    /// Create a uniquely named database (for parallel tests).
    pub async fn create_unique() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        let unique_suffix = uuid::Uuid::new_v4().simple().to_string();
        config.database = format!("support_test_{}", &unique_suffix[..8]);

        let postgres_conn = Database::connect(&config.postgres_url()).await?;
        postgres_conn
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("CREATE DATABASE \"{}\"", config.database),
            ))
            .await?;
        postgres_conn.close().await?;

        let db = Self::with_config(config).await?;
        info!(database = %db.config.database, "Created unique test database");
        Ok(db)
    }

    /// Shared handle to the connection, as repositories expect it.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        self.conn.clone()
    }

    /// Drop the database.
    ///
    /// Sessions still held by repositories are terminated first.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        if let Ok(conn) = Arc::try_unwrap(self.conn) {
            conn.close().await?;
        }

        let postgres_conn = Database::connect(&self.config.postgres_url()).await?;

        let terminate = format!(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
            self.config.database
        );
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, terminate))
            .await
            .ok(); // Ignore errors

        let drop_db = format!("DROP DATABASE IF EXISTS \"{}\"", self.config.database);
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, drop_db))
            .await?;

        postgres_conn.close().await?;

        info!(database = %self.config.database, "Dropped test database");
        Ok(())
    }
}

/// Create the support tables from the entity definitions if they are missing.
pub async fn create_tables(conn: &DatabaseConnection) -> Result<(), DbErr> {
    async fn create<E: EntityTrait>(conn: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
        let backend = conn.get_database_backend();
        let mut table = Schema::new(backend).create_table_from_entity(entity);
        table.if_not_exists();
        conn.execute(backend.build(&table)).await?;
        Ok(())
    }

    create(conn, StrikeProfile).await?;
    create(conn, Report).await?;
    create(conn, MobileToken).await?;
    Ok(())
}

//! ORM connector (sea-orm).
//!
//! Opens a pooled `DatabaseConnection` and, when the settings ask for it,
//! creates the tables of the entities handed in.

use std::time::Duration;

use gobe_core::SqlConfig;
use sea_orm::sea_query::TableCreateStatement;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityName, EntityTrait,
    Schema,
};

use crate::error::DbError;
use crate::repository::Repository;

/// Anything that can describe its own table. Implemented for every entity.
pub trait Table: Send + Sync {
    fn table(&self) -> String;

    fn create_statement(&self, schema: &Schema) -> TableCreateStatement;
}

impl<E: EntityTrait> Table for E {
    fn table(&self) -> String {
        EntityName::table_name(self).to_string()
    }

    fn create_statement(&self, schema: &Schema) -> TableCreateStatement {
        let mut stmt = schema.create_table_from_entity(*self);
        stmt.if_not_exists();
        stmt
    }
}

/// Create every listed table that does not exist yet, in order.
///
/// Parents must come before children so foreign keys resolve.
pub async fn auto_migrate<C: ConnectionTrait>(
    db: &C,
    tables: &[&dyn Table],
) -> Result<(), DbError> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    for table in tables {
        let stmt = table.create_statement(&schema);
        db.execute(backend.build(&stmt)).await?;
        tracing::info!(table = %table.table(), "Table ensured");
    }
    Ok(())
}

/// Pool limits and statement logging from the settings. Statements log at debug.
fn connect_options(config: &SqlConfig, dsn: &str) -> ConnectOptions {
    let timeout = Duration::from_secs(config.connect_timeout_secs);
    let mut options = ConnectOptions::new(dsn.to_string());
    options
        .max_connections(config.max_connections)
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .sqlx_logging(config.orm.debug)
        .sqlx_logging_level(log::LevelFilter::Debug);
    options
}

/// An open ORM connection plus the DSN it was opened with.
#[derive(Clone)]
pub struct OrmConnector {
    pub data_source_name: String,
    pub db: DatabaseConnection,
}

impl OrmConnector {
    /// Connect, then auto-migrate `tables` when `orm.auto_migrate` is set.
    ///
    /// ```ignore
    /// let orm = OrmConnector::connect(sql_config, &[&user::Entity, &post::Entity]).await?;
    /// let users = orm.repository::<user::Entity>();
    /// ```
    pub async fn connect(config: &SqlConfig, tables: &[&dyn Table]) -> Result<Self, DbError> {
        let dsn = config.data_source_name();
        let driver = config.driver.as_str();

        let db = Database::connect(connect_options(config, &dsn)).await.inspect_err(|e| {
            tracing::error!(driver, error = %e, "Failed to open ORM connection")
        })?;
        tracing::info!(
            driver,
            host = %config.db_host,
            database = %config.db_name,
            debug = config.orm.debug,
            "ORM connection ready"
        );

        if config.orm.auto_migrate {
            auto_migrate(&db, tables).await?;
        }

        Ok(Self {
            data_source_name: dsn,
            db,
        })
    }

    /// Repository for entity `E` on this connection.
    pub fn repository<E>(&self) -> Repository<'_, E>
    where
        E: EntityTrait,
        E::Model: Sync,
    {
        Repository::new(&self.db)
    }

    pub async fn ping(&self) -> Result<(), DbError> {
        self.db.ping().await?;
        Ok(())
    }

    pub async fn close(self) -> Result<(), DbError> {
        self.db.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{post, user};
    use gobe_core::{Connector, DbDriver, OrmOptions};
    use sea_orm::{DatabaseBackend, DbBackend, MockDatabase, MockExecResult};

    #[test]
    fn create_statement_is_idempotent() {
        let schema = Schema::new(DbBackend::Postgres);
        let sql = DbBackend::Postgres
            .build(&user::Entity.create_statement(&schema))
            .to_string();
        assert!(sql.starts_with(r#"CREATE TABLE IF NOT EXISTS "users""#), "{sql}");
        assert_eq!(Table::table(&user::Entity), "users");
    }

    #[tokio::test]
    async fn auto_migrate_runs_one_statement_per_table() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        auto_migrate(&db, &[&user::Entity, &post::Entity])
            .await
            .unwrap();
        assert_eq!(db.into_transaction_log().len(), 2);
    }

    fn unreachable_config() -> SqlConfig {
        SqlConfig {
            driver: DbDriver::Postgres,
            connector: Connector::Orm,
            db_name: "app".into(),
            db_host: "127.0.0.1".into(),
            db_port: Some(1),
            db_username: "app".into(),
            db_password: "app".into(),
            ssl_mode: "disable".into(),
            data_source_name: None,
            orm: OrmOptions {
                debug: true,
                auto_migrate: true,
            },
            max_connections: 1,
            connect_timeout_secs: 2,
        }
    }

    #[test]
    fn statements_log_at_debug_when_enabled() {
        let config = unreachable_config();
        let options = connect_options(&config, &config.data_source_name());
        assert_eq!(options.get_max_connections(), Some(1));
        let debug = format!("{options:?}");
        assert!(debug.contains("sqlx_logging: true"), "{debug}");
        assert!(debug.contains("sqlx_logging_level: Debug"), "{debug}");
    }

    #[tokio::test]
    async fn connect_failure_is_returned() {
        let config = unreachable_config();
        assert!(OrmConnector::connect(&config, &[&user::Entity]).await.is_err());
    }
}

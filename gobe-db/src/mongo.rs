//! Document store connector.

use std::ops::Deref;
use std::time::Duration;

use gobe_core::MongoConfig;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use crate::error::DbError;

/// Handle to one MongoDB database. Derefs to [`mongodb::Database`].
#[derive(Debug, Clone)]
pub struct MongoConnector(Database);

impl MongoConnector {
    /// Parse the URI, connect and ping the configured database.
    ///
    /// Both the connect and the server selection timeout come from
    /// `connect_timeout_secs`.
    pub async fn connect(config: &MongoConfig) -> Result<Self, DbError> {
        let uri = config.uri();
        let mut options = ClientOptions::parse(uri.as_str())
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Invalid MongoDB connection string"))?;

        let timeout = Duration::from_secs(config.connect_timeout_secs);
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options)?;
        let database = client.database(&config.db_name);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to reach MongoDB"))?;

        tracing::info!(database = %config.db_name, "Connected to MongoDB");
        Ok(Self(database))
    }

    pub async fn ping(&self) -> Result<(), DbError> {
        self.0.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    pub fn into_inner(self) -> Database {
        self.0
    }
}

impl Deref for MongoConnector {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

use std::sync::Arc;

use libsql::{Builder, Connection, Database};
use tracing::{info, instrument};

use crate::errors::SinkError;
use crate::schema::apply_schema;

/// Owns the libsql `Database` handle and applies the schema once at
/// connect time. A fresh `Connection` is cheap to obtain per operation;
/// `StoreClient` itself is `Clone` and shared across worker threads.
#[derive(Clone)]
pub struct StoreClient {
    database: Arc<Database>,
}

impl StoreClient {
    #[instrument(skip(auth_token))]
    pub async fn connect(url: &str, auth_token: Option<String>) -> Result<Self, SinkError> {
        if url.is_empty() {
            return Err(SinkError::Connection("store URL is empty".into()));
        }

        let is_remote = url.starts_with("libsql://") || url.starts_with("https://");
        let database = if is_remote {
            let token = auth_token
                .ok_or_else(|| SinkError::Connection("remote store requires an auth token".into()))?;
            Builder::new_remote(url.to_string(), token).build().await
        } else {
            Builder::new_local(url).build().await
        }
        .map_err(|e| SinkError::Connection(e.to_string()))?;

        let database = Arc::new(database);
        let bootstrap = database.connect().map_err(|e| SinkError::Connection(e.to_string()))?;
        apply_schema(&bootstrap).await?;

        info!(url, "connected to store");
        Ok(Self { database })
    }

    pub fn connection(&self) -> Result<Connection, SinkError> {
        self.database.connect().map_err(|e| SinkError::Connection(e.to_string()))
    }
}

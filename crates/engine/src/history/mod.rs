pub mod rest;
pub mod sqlite;

pub use rest::RestHistoryStore;
pub use sqlite::SqliteHistoryStore;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use common::config::HistoryBackend;
use common::{HistoryStore, Result};

/// Build the configured history store, or `None` when persistence is off.
///
/// A SQLite database that cannot be opened or migrated is logged and treated
/// like no store at all, so the cycle still samples and dispatches.
pub async fn open(backend: &HistoryBackend, timeout: Duration) -> Result<Option<Arc<dyn HistoryStore>>> {
    let store: Arc<dyn HistoryStore> = match backend {
        HistoryBackend::Disabled => {
            info!("No database configured, history disabled");
            return Ok(None);
        }
        HistoryBackend::Rest { url, api_key, table } => {
            info!(%url, table = %table, "Using REST record store");
            Arc::new(RestHistoryStore::new(url, api_key.clone(), table, timeout)?)
        }
        HistoryBackend::Sqlite { database_url } => match SqliteHistoryStore::connect(database_url).await {
            Ok(store) => {
                info!("Using SQLite history store");
                Arc::new(store)
            }
            Err(e) => {
                warn!(error = %e, "⚠️ SQLite history store unavailable, continuing without history");
                return Ok(None);
            }
        },
    };
    Ok(Some(store))
}

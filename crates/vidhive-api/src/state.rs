use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use vidhive_db::Database;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

/// Shared per-process state, built once at startup and injected into every
/// handler. The store handle lives here; nothing reaches for a global.
pub struct AppStateInner {
    pub db: Database,
    pub access_secret: String,
    pub refresh_secret: String,
    pub media_root: PathBuf,
}

/// Bound on any single store operation. Expiry surfaces as a 503 envelope
/// instead of a request that hangs indefinitely.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a store query off the async runtime, bounded by `STORE_TIMEOUT`.
pub async fn run_query<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    let task = tokio::task::spawn_blocking(move || f(&state.db));

    match tokio::time::timeout(STORE_TIMEOUT, task).await {
        Err(_) => Err(ApiError::Unavailable),
        Ok(Err(join_err)) => {
            error!("spawn_blocking join error: {join_err}");
            Err(ApiError::internal("Internal server error"))
        }
        Ok(Ok(result)) => result.map_err(ApiError::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            access_secret: "access-secret".into(),
            refresh_secret: "refresh-secret".into(),
            media_root: std::env::temp_dir(),
        })
    }

    #[tokio::test]
    async fn queries_run_and_propagate_values() {
        let state = test_state();
        let two = run_query(&state, |db| db.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT 1 + 1", [], |row| row.get(0))?;
            Ok(n)
        }))
        .await
        .unwrap();
        assert_eq!(two, 2);
    }

    #[tokio::test]
    async fn store_faults_become_internal_errors() {
        let state = test_state();
        let err = run_query(&state, |_| Err::<(), anyhow::Error>(anyhow::anyhow!("boom")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}

// Application state module
// Shared by every connection task: config, event store and route table

use super::types::Config;
use crate::api::{build_router, ApiRoute};
use crate::routing::{Router, RouterError};
use crate::store::SharedEventStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: SharedEventStore,
    pub router: Router<ApiRoute>,
}

impl AppState {
    /// Create `AppState` with the API routes registered
    pub fn new(config: Config, store: SharedEventStore) -> Result<Self, RouterError> {
        let router = build_router()?;

        Ok(Self {
            config,
            store,
            router,
        })
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EventStore;
    use std::sync::Arc;

    async fn state_with_access_log(enabled: bool) -> AppState {
        let mut config = Config::load_from("does-not-exist/config").unwrap();
        config.logging.access_log = enabled;
        let path = std::env::temp_dir().join(format!("calendar-state-{}.json", uuid::Uuid::new_v4()));
        let store = EventStore::open(path).await.unwrap();
        AppState::new(config, Arc::new(store)).unwrap()
    }

    #[tokio::test]
    async fn test_access_log_follows_config() {
        assert!(state_with_access_log(true).await.access_log_enabled());
        assert!(!state_with_access_log(false).await.access_log_enabled());
    }

    #[tokio::test]
    async fn test_registers_api_routes() {
        let state = state_with_access_log(false).await;
        assert_eq!(state.router.len(), 12);
    }
}

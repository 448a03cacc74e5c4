//! Shared Application State
//!
//! One `LearningEngine` per session, held behind an async mutex so turns for
//! a session run one at a time (double-submits queue in arrival order) while
//! different sessions proceed in parallel.

use crate::config::Config;
use mindflow_core::{CompletionClient, LearningEngine, ResourceLocator};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

pub type SharedEngine = Arc<Mutex<LearningEngine>>;

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    sessions: RwLock<HashMap<Uuid, SharedEngine>>,
    client: Arc<dyn CompletionClient>,
    locator: Arc<dyn ResourceLocator>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        locator: Arc<dyn ResourceLocator>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            client,
            locator,
            config,
        }
    }

    /// Creates a fresh session and returns its id. `client_ip` feeds the
    /// crisis-resource region lookup.
    pub async fn create_session(&self, client_ip: Option<String>) -> Uuid {
        let mut engine = LearningEngine::new(
            self.client.clone(),
            self.locator.clone(),
            self.config.agent_timeout,
        );
        if let Some(ip) = client_ip {
            engine = engine.with_client_ip(ip);
        }

        let id = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(engine)));
        id
    }

    pub async fn engine(&self, id: Uuid) -> Option<SharedEngine> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

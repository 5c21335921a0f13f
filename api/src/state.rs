use std::sync::Arc;
use std::time::Instant;

use prometheus::Registry;

use crate::config::AppConfig;
use crate::handoff::SessionRegistry;
use crate::validation::RuleTable;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub started_at: Instant,
    pub rules: Arc<RuleTable>,
    pub sessions: Arc<SessionRegistry>,
    pub registry: Registry,
}

impl AppState {
    pub fn new(config: AppConfig, registry: Registry) -> Self {
        Self {
            started_at: Instant::now(),
            rules: Arc::new(RuleTable::new(config.name_max_length)),
            sessions: Arc::new(SessionRegistry::new(config.session)),
            registry,
        }
    }
}

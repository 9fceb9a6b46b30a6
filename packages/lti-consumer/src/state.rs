use std::sync::Arc;

use common::signal::SignalRegistry;
use sea_orm::DatabaseConnection;

use crate::compat::HostRuntime;
use crate::config::AppConfig;
use crate::signals::default_registry;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub host: Arc<dyn HostRuntime>,
    pub config: AppConfig,
    pub signals: SignalRegistry,
}

impl AppState {
    pub fn new(db: DatabaseConnection, host: Arc<dyn HostRuntime>, config: AppConfig) -> Self {
        let signals = default_registry(host.clone());
        Self {
            db,
            host,
            config,
            signals,
        }
    }
}

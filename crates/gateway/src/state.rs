//! Application state shared across handlers

use axum::extract::FromRef;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use yomitomo_common::{
    auth::SessionManager, config::AppConfig, db::DbPool, errors::Result, uploads::UploadStore,
    Repository,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub sessions: SessionManager,
    pub uploads: Arc<UploadStore>,
    /// Present when a Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Connect storage, create the schema and open the session store
    pub async fn new(config: AppConfig) -> Result<Self> {
        let db = DbPool::connect_and_migrate(&config.database).await?;
        let sessions = SessionManager::from_config(&config.session).await?;
        let uploads = UploadStore::new(&config.uploads).await?;

        Ok(Self {
            config: Arc::new(config),
            db,
            sessions,
            uploads: Arc::new(uploads),
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn repo(&self) -> Repository {
        Repository::new(self.db.clone())
    }
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

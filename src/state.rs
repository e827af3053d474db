use std::sync::Arc;

use crate::config::ClientConfig;
use crate::services::api::http::HttpApi;
use crate::services::session::{Session, SqliteSessionStore};

/// Everything a CLI command needs: configuration and the durable session.
pub struct AppState {
    pub config: ClientConfig,
    pub session: Session,
}

impl AppState {
    pub fn open(config: ClientConfig) -> anyhow::Result<Self> {
        let store = SqliteSessionStore::open(&config.session_db)?;
        Ok(Self {
            config,
            session: Session::new(Arc::new(store)),
        })
    }

    /// Client without credentials, for registration and login.
    pub fn anonymous_api(&self) -> anyhow::Result<Arc<HttpApi>> {
        Ok(Arc::new(HttpApi::from_config(&self.config)?))
    }

    pub fn user_api(&self) -> anyhow::Result<Arc<HttpApi>> {
        let token = self.session.user().and_then(|u| u.token);
        Ok(Arc::new(HttpApi::from_config(&self.config)?.with_token(token)))
    }

    pub fn admin_api(&self) -> anyhow::Result<Arc<HttpApi>> {
        let token = self.session.admin().and_then(|a| a.token);
        Ok(Arc::new(HttpApi::from_config(&self.config)?.with_token(token)))
    }
}

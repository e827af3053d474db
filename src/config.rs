use std::env;
use std::time::Duration;

use crate::services::flash::DEFAULT_CLEAR_AFTER;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub session_db: String,
    pub message_clear_after: Duration,
    pub request_timeout: Option<Duration>,
    pub dev_port: u16,
    pub dev_admin_email: String,
    pub dev_admin_password: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("SERVICEBOOK_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api".to_string()),
            session_db: env::var("SERVICEBOOK_SESSION_DB")
                .unwrap_or_else(|_| "servicebook.db".to_string()),
            message_clear_after: env::var("SERVICEBOOK_MESSAGE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_CLEAR_AFTER),
            request_timeout: env::var("SERVICEBOOK_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
            dev_port: env::var("SERVICEBOOK_DEV_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            dev_admin_email: env::var("SERVICEBOOK_DEV_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@servicebook.local".to_string()),
            dev_admin_password: env::var("SERVICEBOOK_DEV_ADMIN_PASSWORD")
                .unwrap_or_else(|_| "admin123".to_string()),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".to_string(),
            session_db: "servicebook.db".to_string(),
            message_clear_after: DEFAULT_CLEAR_AFTER,
            request_timeout: None,
            dev_port: 8080,
            dev_admin_email: "admin@servicebook.local".to_string(),
            dev_admin_password: "admin123".to_string(),
        }
    }
}

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{ApiResult, AuthApi, BookingApi};
use crate::config::ClientConfig;
use crate::errors::ApiError;
use crate::models::{
    Booking, BookingDraft, BookingStatus, Credentials, LoginResponse, NewBooking, Registration,
    User,
};

/// REST client for the booking backend.
pub struct HttpApi {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build HTTP client")?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        })
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "sending request");
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let resp = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "request failed without a response");
            ApiError::Network(e.to_string())
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = error_message(&body);
        tracing::warn!(status = status.as_u16(), message = ?message, "request rejected");
        Err(ApiError::from_status(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let resp = self.send(builder).await?;
        let status = resp.status().as_u16();
        resp.json::<T>().await.map_err(|e| {
            tracing::warn!(error = %e, "failed to decode response body");
            ApiError::Unknown {
                status: Some(status),
                message: None,
            }
        })
    }
}

/// Pulls the human-readable text out of an error body. Spring-style JSON bodies carry
/// it in `message`; short plain-text bodies are used as-is.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string),
        Err(_) if !body.starts_with('<') && body.len() <= 200 => Some(body.to_string()),
        Err(_) => None,
    }
}

#[async_trait]
impl BookingApi for HttpApi {
    async fn list_for_user(&self, user_id: i64) -> ApiResult<Vec<Booking>> {
        self.send_json(self.request(Method::GET, &format!("/bookings/user/{user_id}")))
            .await
    }

    async fn list_all(&self) -> ApiResult<Vec<Booking>> {
        self.send_json(self.request(Method::GET, "/admin/bookings"))
            .await
    }

    async fn create(&self, draft: &BookingDraft) -> ApiResult<Booking> {
        let body = NewBooking::from(draft);
        self.send_json(self.request(Method::POST, "/bookings").json(&body))
            .await
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> ApiResult<()> {
        let builder = self
            .request(Method::PUT, &format!("/admin/booking/{id}"))
            .query(&[("status", status.as_str())]);
        self.send(builder).await?;
        Ok(())
    }

    async fn remove(&self, id: i64) -> ApiResult<()> {
        self.send(self.request(Method::DELETE, &format!("/bookings/{id}")))
            .await?;
        Ok(())
    }

    async fn remove_as_admin(&self, id: i64) -> ApiResult<()> {
        self.send(self.request(Method::DELETE, &format!("/admin/booking/{id}")))
            .await?;
        Ok(())
    }

    async fn status_of(&self, id: i64) -> ApiResult<String> {
        let resp = self
            .send(self.request(Method::GET, &format!("/bookings/booking/{id}/status")))
            .await?;
        let text = resp.text().await?;
        Ok(text.trim().trim_matches('"').to_string())
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn register(&self, registration: &Registration) -> ApiResult<User> {
        self.send_json(self.request(Method::POST, "/users/register").json(registration))
            .await
    }

    async fn login_user(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        self.send_json(self.request(Method::POST, "/users/login").json(credentials))
            .await
    }

    async fn login_admin(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        self.send_json(self.request(Method::POST, "/admin/login").json(credentials))
            .await
    }
}

pub mod http;

use async_trait::async_trait;

use crate::errors::ApiError;
use crate::models::{Booking, BookingDraft, BookingStatus, Credentials, LoginResponse, Registration, User};

pub type ApiResult<T> = Result<T, ApiError>;

/// Remote booking collection. Every call is single-shot; no retries.
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// Bookings owned by one user. Zero bookings is an empty vec, not an error.
    async fn list_for_user(&self, user_id: i64) -> ApiResult<Vec<Booking>>;

    /// Every booking, each embedding its owner. Admin only.
    async fn list_all(&self) -> ApiResult<Vec<Booking>>;

    /// Creates a booking. The server stores it as PENDING whatever the request says.
    async fn create(&self, draft: &BookingDraft) -> ApiResult<Booking>;

    async fn update_status(&self, id: i64, status: BookingStatus) -> ApiResult<()>;

    /// User-side cancellation. Deleting an id twice fails with `NotFound`.
    async fn remove(&self, id: i64) -> ApiResult<()>;

    /// Admin-side deletion, allowed from any status.
    async fn remove_as_admin(&self, id: i64) -> ApiResult<()>;

    async fn status_of(&self, id: i64) -> ApiResult<String>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, registration: &Registration) -> ApiResult<User>;
    async fn login_user(&self, credentials: &Credentials) -> ApiResult<LoginResponse>;
    async fn login_admin(&self, credentials: &Credentials) -> ApiResult<LoginResponse>;
}

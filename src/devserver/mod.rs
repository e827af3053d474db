//! In-process implementation of the booking REST API, for local runs and tests.
//!
//! It applies the server-side rules the client relies on: new bookings are always
//! PENDING, statuses are canonicalized on update, unknown ids are 404 (so a second
//! delete fails), users may only cancel PENDING bookings, and admin routes need the
//! bearer token handed out by `/admin/login`.

pub mod handlers;
pub mod store;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ClientConfig;
pub use store::DevStore;

pub struct DevState {
    store: Mutex<DevStore>,
}

impl DevState {
    pub fn new(store: DevStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Empty store with one seeded admin account.
    pub fn seeded(admin_email: &str, admin_password: &str) -> Self {
        let mut store = DevStore::new();
        store.create_admin(admin_email, admin_password);
        Self::new(store)
    }

    pub fn store(&self) -> MutexGuard<'_, DevStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn router(state: Arc<DevState>) -> Router {
    let api = Router::new()
        .route("/users/register", post(handlers::register))
        .route("/users/login", post(handlers::login_user))
        .route("/admin/login", post(handlers::login_admin))
        .route("/bookings", post(handlers::create_booking))
        .route("/bookings/user/:id", get(handlers::user_bookings))
        .route("/bookings/booking/:id/status", get(handlers::booking_status))
        .route("/bookings/:id", delete(handlers::cancel_booking))
        .route("/admin/bookings", get(handlers::all_bookings))
        .route(
            "/admin/booking/:id",
            put(handlers::update_status).delete(handlers::delete_booking),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(config: &ClientConfig, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(DevState::seeded(
        &config.dev_admin_email,
        &config.dev_admin_password,
    ));

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(admin = %config.dev_admin_email, "starting development API on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

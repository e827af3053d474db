use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use super::DevState;
use crate::errors::DevError;
use crate::models::{Booking, Credentials, LoginResponse, NewBooking, Registration, User};

fn check_admin(state: &DevState, headers: &HeaderMap) -> Result<(), DevError> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    if state.store().is_admin_token(token) {
        Ok(())
    } else {
        Err(DevError::Unauthorized)
    }
}

// POST /users/register
pub async fn register(
    State(state): State<Arc<DevState>>,
    Json(body): Json<Registration>,
) -> Result<Json<User>, DevError> {
    let user = state.store().register_user(&body)?;
    tracing::info!(user_id = user.id, "registered user");
    Ok(Json(user))
}

// POST /users/login
pub async fn login_user(
    State(state): State<Arc<DevState>>,
    Json(body): Json<Credentials>,
) -> Result<Json<LoginResponse>, DevError> {
    Ok(Json(state.store().login_user(&body)?))
}

// POST /admin/login
pub async fn login_admin(
    State(state): State<Arc<DevState>>,
    Json(body): Json<Credentials>,
) -> Result<Json<LoginResponse>, DevError> {
    Ok(Json(state.store().login_admin(&body)?))
}

// GET /bookings/user/:id
pub async fn user_bookings(
    State(state): State<Arc<DevState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Booking>>, DevError> {
    Ok(Json(state.store().bookings_for_user(user_id)?))
}

// POST /bookings
pub async fn create_booking(
    State(state): State<Arc<DevState>>,
    Json(body): Json<NewBooking>,
) -> Result<Json<Booking>, DevError> {
    let booking = state.store().create_booking(&body)?;
    tracing::info!(booking_id = booking.id, requested_status = ?body.status, "created booking");
    Ok(Json(booking))
}

// GET /bookings/booking/:id/status
pub async fn booking_status(
    State(state): State<Arc<DevState>>,
    Path(id): Path<i64>,
) -> Result<String, DevError> {
    state.store().booking_status(id)
}

// DELETE /bookings/:id
pub async fn cancel_booking(
    State(state): State<Arc<DevState>>,
    Path(id): Path<i64>,
) -> Result<&'static str, DevError> {
    state.store().cancel_booking(id)?;
    tracing::info!(booking_id = id, "cancelled booking");
    Ok("Booking Cancelled Successfully")
}

// GET /admin/bookings
pub async fn all_bookings(
    State(state): State<Arc<DevState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Booking>>, DevError> {
    check_admin(&state, &headers)?;
    Ok(Json(state.store().all_bookings()))
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

// PUT /admin/booking/:id?status=STATUS
pub async fn update_status(
    State(state): State<Arc<DevState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Booking>, DevError> {
    check_admin(&state, &headers)?;
    let status = query
        .status
        .ok_or_else(|| DevError::BadRequest("status is required".to_string()))?;
    let booking = state.store().update_status(id, &status)?;
    tracing::info!(booking_id = id, status = ?booking.status, "updated booking status");
    Ok(Json(booking))
}

// DELETE /admin/booking/:id
pub async fn delete_booking(
    State(state): State<Arc<DevState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<&'static str, DevError> {
    check_admin(&state, &headers)?;
    state.store().delete_booking(id)?;
    tracing::info!(booking_id = id, "deleted booking");
    Ok("Booking Deleted Successfully")
}

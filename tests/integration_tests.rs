use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use tower::ServiceExt;

use servicebook::controllers::{AdminDashboard, AuthController, UserDashboard};
use servicebook::devserver::{self, DevState};
use servicebook::errors::{ApiError, ErrorCategory};
use servicebook::models::{BookingForm, Credentials, MessageKind, Registration};
use servicebook::services::api::http::HttpApi;
use servicebook::services::api::BookingApi;
use servicebook::services::clock::FixedClock;
use servicebook::services::confirm::AlwaysAnswer;
use servicebook::services::lifecycle::BadgeClass;
use servicebook::services::session::Session;

const ADMIN_EMAIL: &str = "admin@servicebook.local";
const ADMIN_PASSWORD: &str = "admin123";

// ── Helpers ──

fn test_state() -> Arc<DevState> {
    Arc::new(DevState::seeded(ADMIN_EMAIL, ADMIN_PASSWORD))
}

fn rider() -> Registration {
    Registration {
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        password: "ride-safe".to_string(),
        phone: "9876543210".to_string(),
    }
}

fn admin_token(state: &DevState) -> String {
    state
        .store()
        .login_admin(&Credentials {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        })
        .unwrap()
        .token
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn spawn_server(state: Arc<DevState>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, devserver::router(state)).await.unwrap();
    });
    addr
}

// ── Dev server routes ──

#[tokio::test]
async fn test_create_booking_is_always_pending() {
    let state = test_state();
    let user = state.store().register_user(&rider()).unwrap();

    let res = devserver::router(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            serde_json::json!({
                "user": {"id": user.id},
                "bikeModel": "Royal Enfield Classic 350",
                "serviceType": "Brake Repair",
                "bookingDate": "2099-03-01",
                "status": "APPROVED",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["status"], "PENDING");
    assert_eq!(json["bookingDate"], "2099-03-01");
    assert_eq!(json["user"]["email"], "asha@example.com");
}

#[tokio::test]
async fn test_create_booking_unknown_service_rejected() {
    let state = test_state();
    let user = state.store().register_user(&rider()).unwrap();

    let res = devserver::router(state)
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            serde_json::json!({
                "user": {"id": user.id},
                "bikeModel": "Royal Enfield Classic 350",
                "serviceType": "Paint Job",
                "bookingDate": "2099-03-01",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert!(json["message"].as_str().unwrap().contains("Paint Job"));
}

#[tokio::test]
async fn test_register_missing_fields() {
    let res = devserver::router(test_state())
        .oneshot(json_request(
            "POST",
            "/api/users/register",
            serde_json::json!({"email": "asha@example.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let state = test_state();
    state.store().register_user(&rider()).unwrap();

    let res = devserver::router(state)
        .oneshot(json_request(
            "POST",
            "/api/users/register",
            serde_json::to_value(rider()).unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_requires_auth() {
    let res = devserver::router(test_state())
        .oneshot(
            Request::builder()
                .uri("/api/admin/bookings")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_wrong_token() {
    let res = devserver::router(test_state())
        .oneshot(
            Request::builder()
                .uri("/api/admin/bookings")
                .header("Authorization", "Bearer wrong-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_update_status_canonicalizes() {
    let state = test_state();
    let user = state.store().register_user(&rider()).unwrap();
    let booking = state
        .store()
        .create_booking(&servicebook::models::NewBooking {
            bike_model: Some("TVS Apache".to_string()),
            service_type: Some("Oil Change".to_string()),
            booking_date: Some("2099-04-10".to_string()),
            status: None,
            user: Some(servicebook::models::UserRef { id: user.id }),
        })
        .unwrap();
    let token = admin_token(&state);

    let res = devserver::router(state.clone())
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/admin/booking/{}?status=completed", booking.id))
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        state.store().booking_status(booking.id).unwrap(),
        "COMPLETED"
    );
}

#[tokio::test]
async fn test_admin_delete_twice() {
    let state = test_state();
    let user = state.store().register_user(&rider()).unwrap();
    let booking = state
        .store()
        .create_booking(&servicebook::models::NewBooking {
            bike_model: Some("TVS Apache".to_string()),
            service_type: Some("Tire Change".to_string()),
            booking_date: Some("2099-04-10".to_string()),
            status: None,
            user: Some(servicebook::models::UserRef { id: user.id }),
        })
        .unwrap();
    let token = admin_token(&state);

    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/admin/booking/{}", booking.id))
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    };

    let first = devserver::router(state.clone()).oneshot(delete()).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = devserver::router(state.clone()).oneshot(delete()).await.unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    let json = body_json(second).await;
    assert_eq!(json["message"], "Booking Not Found");
}

// ── Client against a running dev server ──

#[tokio::test]
async fn test_booking_lifecycle_over_http() {
    let addr = spawn_server(test_state()).await;
    let base = format!("http://{addr}/api");
    let session = Session::in_memory();

    let auth = AuthController::new(Arc::new(HttpApi::new(base.clone())), session.clone());
    let registered = auth.register(&rider()).await;
    assert_eq!(registered.kind, MessageKind::Success);

    let login = auth
        .login_user(&Credentials {
            email: "asha@example.com".to_string(),
            password: "ride-safe".to_string(),
        })
        .await;
    assert_eq!(login.text, "Login Successful!");
    let user = session.user().unwrap();

    let user_api = Arc::new(HttpApi::new(base.clone()).with_token(user.token.clone()));
    let dashboard = UserDashboard::new(user_api.clone(), &session, Arc::new(AlwaysAnswer(true)))
        .with_clock(Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
        )));

    dashboard.set_form(BookingForm {
        bike_model: "Honda CB Shine".to_string(),
        service_type: "Oil Change".to_string(),
        booking_date: "2025-06-16".to_string(),
    });
    dashboard.submit_booking().await;

    let view = dashboard.view();
    assert_eq!(view.message.as_ref().unwrap().text, "Booking created successfully!");
    assert_eq!(view.rows.len(), 1);
    let booking_id = view.rows[0].booking.id;
    assert_eq!(view.cancellable_ids(), vec![booking_id]);

    // admin approves
    let admin_login = auth
        .login_admin(&Credentials {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        })
        .await;
    assert_eq!(admin_login.kind, MessageKind::Success);
    let admin = session.admin().unwrap();

    let admin_api = Arc::new(HttpApi::new(base.clone()).with_token(admin.token.clone()));
    let admin_dashboard = AdminDashboard::new(admin_api.clone(), &session);
    admin_dashboard.refresh().await;
    assert_eq!(admin_dashboard.view().stats.pending, 1);

    admin_dashboard.set_status(booking_id, "approved").await;
    let admin_view = admin_dashboard.view();
    assert!(admin_view
        .message
        .as_ref()
        .unwrap()
        .text
        .contains(&format!("#{booking_id} status updated to APPROVED")));
    assert_eq!(admin_view.rows[0].badge, BadgeClass::Approved);
    assert_eq!(admin_view.stats.approved, 1);

    // user can no longer cancel
    dashboard.refresh().await;
    assert!(dashboard.view().cancellable_ids().is_empty());
    dashboard.cancel(booking_id).await;
    assert!(dashboard.view().message.unwrap().is_error());
    assert_eq!(user_api.status_of(booking_id).await.unwrap(), "APPROVED");

    // admin deletes, a second delete is not found
    admin_dashboard.request_delete(booking_id);
    admin_dashboard.confirm_delete().await;
    assert_eq!(admin_dashboard.view().stats.total, 0);

    let err = admin_api.remove_as_admin(booking_id).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
    assert_eq!(err.server_message(), Some("Booking Not Found"));
}

#[tokio::test]
async fn test_user_cancel_over_http() {
    let addr = spawn_server(test_state()).await;
    let base = format!("http://{addr}/api");
    let session = Session::in_memory();
    let auth = AuthController::new(Arc::new(HttpApi::new(base.clone())), session.clone());
    auth.register(&rider()).await;
    auth.login_user(&Credentials {
        email: "asha@example.com".to_string(),
        password: "ride-safe".to_string(),
    })
    .await;

    let dashboard = UserDashboard::new(
        Arc::new(HttpApi::new(base)),
        &session,
        Arc::new(AlwaysAnswer(true)),
    )
    .with_clock(Arc::new(FixedClock(
        NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
    )));
    dashboard.set_form(BookingForm {
        bike_model: "Bajaj Pulsar".to_string(),
        service_type: "General Service".to_string(),
        booking_date: "2025-07-01".to_string(),
    });
    dashboard.submit_booking().await;
    let id = dashboard.view().rows[0].booking.id;

    dashboard.cancel(id).await;

    let view = dashboard.view();
    assert_eq!(view.message.as_ref().unwrap().text, "Booking cancelled successfully!");
    assert!(view.is_empty());
}

#[tokio::test]
async fn test_login_errors_over_http() {
    let addr = spawn_server(test_state()).await;
    let base = format!("http://{addr}/api");
    let session = Session::in_memory();
    let auth = AuthController::new(Arc::new(HttpApi::new(base)), session.clone());
    auth.register(&rider()).await;

    let wrong_password = auth
        .login_user(&Credentials {
            email: "asha@example.com".to_string(),
            password: "nope".to_string(),
        })
        .await;
    assert_eq!(wrong_password.text, "Invalid email or password!");

    let unknown = auth
        .login_user(&Credentials {
            email: "ghost@example.com".to_string(),
            password: "nope".to_string(),
        })
        .await;
    assert_eq!(unknown.text, "User not found!");

    let admin = auth
        .login_admin(&Credentials {
            email: ADMIN_EMAIL.to_string(),
            password: "wrong".to_string(),
        })
        .await;
    assert_eq!(admin.text, "Invalid admin credentials!");
    assert!(session.user().is_none());
    assert!(session.admin().is_none());
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpApi::new(format!("http://{addr}/api"));
    let err = api.list_all().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.user_message("Failed to load bookings"), "Failed to load bookings");
}

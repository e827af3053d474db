use std::sync::Arc;

use crate::errors::ApiError;
use crate::models::{AdminIdentity, Credentials, Registration, StatusMessage, UserIdentity};
use crate::services::api::AuthApi;
use crate::services::lifecycle::validate_email;
use crate::services::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginRole {
    User,
    Admin,
}

/// Checks credentials locally. A failure here means no request is made.
pub fn validate_credentials(credentials: &Credentials) -> Result<(), ApiError> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(ApiError::Validation("Please fill in all fields!".to_string()));
    }
    if !validate_email(credentials.email.trim()) {
        return Err(ApiError::Validation(
            "Please enter a valid email address!".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_registration(registration: &Registration) -> Result<(), ApiError> {
    let fields = [
        &registration.name,
        &registration.email,
        &registration.password,
        &registration.phone,
    ];
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(ApiError::Validation("Please fill in all fields!".to_string()));
    }
    if !validate_email(registration.email.trim()) {
        return Err(ApiError::Validation(
            "Please enter a valid email address!".to_string(),
        ));
    }
    Ok(())
}

/// Text shown for a failed login, keyed on the HTTP status.
pub fn login_failure_message(role: LoginRole, err: &ApiError) -> String {
    match err {
        ApiError::Validation(text) => return text.clone(),
        ApiError::Network(_) => return "Network error! Please check your connection.".to_string(),
        _ => {}
    }

    match (role, err.status()) {
        (LoginRole::User, Some(401)) => "Invalid email or password!".to_string(),
        (LoginRole::Admin, Some(401)) => "Invalid admin credentials!".to_string(),
        (LoginRole::User, Some(403)) => "Access denied!".to_string(),
        (LoginRole::Admin, Some(403)) => "Access denied! Admin privileges required.".to_string(),
        (LoginRole::User, Some(404)) => "User not found!".to_string(),
        (LoginRole::Admin, Some(404)) => "Admin account not found!".to_string(),
        (_, Some(400)) => "Please check your credentials!".to_string(),
        (_, Some(500)) => "Server error! Please try again later.".to_string(),
        (_, Some(status)) if (200..300).contains(&status) => {
            "Invalid response from server!".to_string()
        }
        (_, Some(_)) => err.user_message("Login failed!"),
        (_, None) => "An unexpected error occurred!".to_string(),
    }
}

/// Registration and both login flows. A successful login writes the identity to the
/// session; the dashboards pick it up when they are constructed.
pub struct AuthController {
    api: Arc<dyn AuthApi>,
    session: Session,
}

impl AuthController {
    pub fn new(api: Arc<dyn AuthApi>, session: Session) -> Self {
        Self { api, session }
    }

    pub async fn register(&self, registration: &Registration) -> StatusMessage {
        if let Err(e) = validate_registration(registration) {
            return StatusMessage::error(e.user_message("Please fill in all fields!"));
        }

        match self.api.register(registration).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "user registered");
                StatusMessage::success("Registration Successful! Please log in.")
            }
            Err(e) => {
                tracing::warn!(error = %e, "registration failed");
                StatusMessage::error("Registration Failed! Please try again.")
            }
        }
    }

    pub async fn login_user(&self, credentials: &Credentials) -> StatusMessage {
        if let Err(e) = validate_credentials(credentials) {
            return StatusMessage::error(login_failure_message(LoginRole::User, &e));
        }

        let resp = match self.api.login_user(credentials).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "user login failed");
                return StatusMessage::error(login_failure_message(LoginRole::User, &e));
            }
        };

        let Some(id) = resp.id else {
            return StatusMessage::error("Invalid response from server!");
        };

        let identity = UserIdentity {
            id,
            email: Some(credentials.email.trim().to_string()),
            token: resp.token,
        };
        if let Err(e) = self.session.save_user(&identity) {
            tracing::error!(error = %e, "failed to store user session");
            return StatusMessage::error("Failed to save session!");
        }

        tracing::info!(user_id = id, "user logged in");
        StatusMessage::success("Login Successful!")
    }

    pub async fn login_admin(&self, credentials: &Credentials) -> StatusMessage {
        if let Err(e) = validate_credentials(credentials) {
            return StatusMessage::error(login_failure_message(LoginRole::Admin, &e));
        }

        let resp = match self.api.login_admin(credentials).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "admin login failed");
                return StatusMessage::error(login_failure_message(LoginRole::Admin, &e));
            }
        };

        let Some(id) = resp.id else {
            return StatusMessage::error("Invalid response from server!");
        };

        let identity = AdminIdentity {
            id,
            email: Some(credentials.email.trim().to_string()),
            token: resp.token,
        };
        if let Err(e) = self.session.save_admin(&identity) {
            tracing::error!(error = %e, "failed to store admin session");
            return StatusMessage::error("Failed to save session!");
        }

        tracing::info!(admin_id = id, "admin logged in");
        StatusMessage::success("Login Successful! Welcome to the Admin Dashboard.")
    }

    pub fn logout(&self, role: LoginRole) -> StatusMessage {
        let result = match role {
            LoginRole::User => self.session.clear_user(),
            LoginRole::Admin => self.session.clear_admin(),
        };
        match result {
            Ok(()) => StatusMessage::success("Logged out."),
            Err(e) => {
                tracing::error!(error = %e, "failed to clear session");
                StatusMessage::error("Failed to clear session!")
            }
        }
    }
}

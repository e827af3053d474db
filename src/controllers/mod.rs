pub mod admin_dashboard;
pub mod auth;
pub mod user_dashboard;

pub use admin_dashboard::{AdminDashboard, AdminView};
pub use auth::{AuthController, LoginRole};
pub use user_dashboard::{UserDashboard, UserView};

use crate::models::Booking;
use crate::services::lifecycle::{badge_class, BadgeClass};

/// One listed booking together with its display badge.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRow {
    pub booking: Booking,
    pub badge: BadgeClass,
}

impl BookingRow {
    pub fn new(booking: Booking) -> Self {
        let badge = badge_class(booking.status.as_deref());
        Self { booking, badge }
    }
}

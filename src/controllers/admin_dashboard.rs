use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::BookingRow;
use crate::models::{AdminIdentity, Booking, BookingStatus, StatusMessage};
use crate::services::api::BookingApi;
use crate::services::flash::{Flash, DEFAULT_CLEAR_AFTER};
use crate::services::lifecycle::{
    classify, filter_by_status, is_legal_transition, BookingStats, StatusFilter,
};
use crate::services::session::Session;

pub const EMPTY_STATE: &str = "No bookings match the selected status";

#[derive(Default)]
struct AdminDashboardState {
    bookings: Vec<Booking>,
    stats: BookingStats,
    loading: bool,
    filter: StatusFilter,
    delete_target: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AdminView {
    pub email: Option<String>,
    /// Bookings passing the active filter, in server order.
    pub rows: Vec<BookingRow>,
    pub loaded: usize,
    pub stats: BookingStats,
    pub filter: StatusFilter,
    pub loading: bool,
    pub message: Option<StatusMessage>,
    pub delete_target: Option<i64>,
}

impl AdminView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn empty_state(&self) -> Option<&'static str> {
        (!self.loading && self.rows.is_empty()).then_some(EMPTY_STATE)
    }

    /// "(Showing x of y)" while a filter hides part of the list.
    pub fn showing(&self) -> Option<String> {
        (self.rows.len() != self.loaded)
            .then(|| format!("(Showing {} of {})", self.rows.len(), self.loaded))
    }

    pub fn delete_prompt(&self) -> Option<String> {
        self.delete_target
            .map(|id| format!("Are you sure you want to delete booking #{id}? This action cannot be undone!"))
    }
}

/// Every booking in the system: list, filter, change status, delete.
pub struct AdminDashboard {
    api: Arc<dyn BookingApi>,
    admin: Option<AdminIdentity>,
    state: Mutex<AdminDashboardState>,
    flash: Flash,
}

impl AdminDashboard {
    pub fn new(api: Arc<dyn BookingApi>, session: &Session) -> Self {
        Self {
            api,
            admin: session.admin(),
            state: Mutex::new(AdminDashboardState::default()),
            flash: Flash::new(DEFAULT_CLEAR_AFTER),
        }
    }

    pub fn with_message_window(mut self, window: Duration) -> Self {
        self.flash = Flash::new(window);
        self
    }

    fn state(&self) -> MutexGuard<'_, AdminDashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn refresh(&self) {
        self.state().loading = true;
        let result = self.api.list_all().await;

        let mut state = self.state();
        state.loading = false;
        match result {
            Ok(bookings) => {
                state.stats = classify(&bookings);
                state.bookings = bookings;
                tracing::debug!(total = state.stats.total, "loaded all bookings");
                drop(state);
                self.flash.clear_error();
            }
            Err(e) => {
                drop(state);
                tracing::warn!(error = %e, "failed to load all bookings");
                self.flash.error(e.user_message("Failed to load bookings"));
            }
        }
    }

    /// Moves a booking to `status`. The status string is canonicalized first; an
    /// unknown value is rejected without a request.
    pub async fn set_status(&self, id: i64, status: &str) {
        let Some(new_status) = BookingStatus::parse(status) else {
            self.flash.error(format!("Invalid status: {status}"));
            return;
        };

        let current = self
            .state()
            .bookings
            .iter()
            .find(|b| b.id == id)
            .and_then(Booking::status);

        if !is_legal_transition(current, new_status) {
            self.flash.error(format!(
                "Booking #{id} cannot move to {new_status}"
            ));
            return;
        }

        match self.api.update_status(id, new_status).await {
            Ok(()) => {
                tracing::info!(
                    booking_id = id,
                    from = current.map(|s| s.as_str()).unwrap_or("UNKNOWN"),
                    to = %new_status,
                    "booking status updated"
                );
                self.flash.success(format!(
                    "Booking #{id} status updated to {new_status} successfully!"
                ));
                self.refresh().await;
            }
            Err(e) => {
                tracing::warn!(booking_id = id, error = %e, "failed to update status");
                self.flash.error(e.user_message("Failed to update status"));
            }
        }
    }

    /// First step of deletion: only records the target and opens the prompt.
    pub fn request_delete(&self, id: i64) {
        self.state().delete_target = Some(id);
    }

    pub fn cancel_delete_request(&self) {
        self.state().delete_target = None;
    }

    /// Second step of deletion. The prompt closes whatever the outcome; a failure is
    /// shown and not retried.
    pub async fn confirm_delete(&self) {
        let Some(id) = self.state().delete_target.take() else {
            return;
        };

        match self.api.remove_as_admin(id).await {
            Ok(()) => {
                tracing::info!(booking_id = id, "booking deleted");
                self.flash
                    .success(format!("Booking #{id} deleted successfully!"));
                self.refresh().await;
            }
            Err(e) => {
                tracing::warn!(booking_id = id, error = %e, "failed to delete booking");
                self.flash.error(e.user_message("Failed to delete booking"));
            }
        }
    }

    /// Changes the visible subset. Never refetches.
    pub fn set_filter(&self, filter: StatusFilter) {
        self.state().filter = filter;
    }

    pub fn view(&self) -> AdminView {
        let state = self.state();
        let rows = filter_by_status(&state.bookings, state.filter)
            .into_iter()
            .cloned()
            .map(BookingRow::new)
            .collect();
        AdminView {
            email: self.admin.as_ref().and_then(|a| a.email.clone()),
            rows,
            loaded: state.bookings.len(),
            stats: state.stats,
            filter: state.filter,
            loading: state.loading,
            message: self.flash.current(),
            delete_target: state.delete_target,
        }
    }

    pub fn close(&self) {
        self.flash.cancel_timer();
    }
}

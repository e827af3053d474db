use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::BookingRow;
use crate::models::{Booking, BookingForm, StatusMessage, UserIdentity};
use crate::services::api::BookingApi;
use crate::services::clock::{Clock, SystemClock};
use crate::services::confirm::Confirm;
use crate::services::flash::{Flash, DEFAULT_CLEAR_AFTER};
use crate::services::lifecycle::{
    classify, is_cancellable, sort_newest_first, validate_booking_form,
};
use crate::services::session::Session;

#[derive(Default)]
struct UserDashboardState {
    bookings: Vec<Booking>,
    loading: bool,
    creating: bool,
    form: BookingForm,
}

/// Clears the `creating` flag when dropped, including when the create call is
/// abandoned mid-flight.
struct CreatingGuard<'a>(&'a Mutex<UserDashboardState>);

impl Drop for CreatingGuard<'_> {
    fn drop(&mut self) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .creating = false;
    }
}

/// Snapshot of everything the user dashboard displays.
#[derive(Debug, Clone)]
pub struct UserView {
    pub email: Option<String>,
    pub rows: Vec<BookingRow>,
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub loading: bool,
    pub creating: bool,
    pub message: Option<StatusMessage>,
    pub form: BookingForm,
}

impl UserView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ids for which the cancel action is offered.
    pub fn cancellable_ids(&self) -> Vec<i64> {
        self.rows
            .iter()
            .filter(|row| is_cancellable(&row.booking))
            .map(|row| row.booking.id)
            .collect()
    }
}

/// One customer's bookings: list, create, cancel.
pub struct UserDashboard {
    api: Arc<dyn BookingApi>,
    confirm: Arc<dyn Confirm>,
    clock: Arc<dyn Clock>,
    user: Option<UserIdentity>,
    state: Mutex<UserDashboardState>,
    flash: Flash,
}

impl UserDashboard {
    /// Reads the signed-in user from `session` once; later session changes are not seen.
    pub fn new(api: Arc<dyn BookingApi>, session: &Session, confirm: Arc<dyn Confirm>) -> Self {
        Self {
            api,
            confirm,
            clock: Arc::new(SystemClock),
            user: session.user(),
            state: Mutex::new(UserDashboardState::default()),
            flash: Flash::new(DEFAULT_CLEAR_AFTER),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_message_window(mut self, window: Duration) -> Self {
        self.flash = Flash::new(window);
        self
    }

    fn state(&self) -> MutexGuard<'_, UserDashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_form(&self, form: BookingForm) {
        self.state().form = form;
    }

    pub async fn refresh(&self) {
        let Some(user) = &self.user else {
            self.flash.error("User not logged in!");
            return;
        };

        self.state().loading = true;
        let result = self.api.list_for_user(user.id).await;
        self.state().loading = false;

        match result {
            Ok(mut bookings) => {
                sort_newest_first(&mut bookings);
                tracing::debug!(user_id = user.id, count = bookings.len(), "loaded bookings");
                self.state().bookings = bookings;
                self.flash.clear_error();
            }
            Err(e) => {
                tracing::warn!(user_id = user.id, error = %e, "failed to load bookings");
                self.flash.error(e.user_message("Failed to load bookings"));
            }
        }
    }

    /// Validates the current form and creates the booking. Nothing is sent when the
    /// form is invalid.
    pub async fn submit_booking(&self) {
        let Some(user) = &self.user else {
            self.flash.error("User not logged in!");
            return;
        };

        let draft = {
            let mut state = self.state();
            if state.creating {
                return;
            }
            let validated = validate_booking_form(&state.form, user.id, self.clock.today());
            match validated {
                Ok(draft) => {
                    state.creating = true;
                    draft
                }
                Err(e) => {
                    drop(state);
                    self.flash.error(e.user_message("Please fill in all fields!"));
                    return;
                }
            }
        };

        self.flash.clear();
        let result = {
            let _creating = CreatingGuard(&self.state);
            self.api.create(&draft).await
        };

        match result {
            Ok(booking) => {
                tracing::info!(
                    user_id = user.id,
                    booking_id = booking.id,
                    service = %draft.service_type,
                    date = %draft.booking_date,
                    "booking created"
                );
                self.state().form = BookingForm::default();
                self.flash.success("Booking created successfully!");
                self.refresh().await;
            }
            Err(e) => {
                tracing::warn!(user_id = user.id, error = %e, "failed to create booking");
                self.flash.error(e.user_message("Failed to create booking"));
            }
        }
    }

    /// Cancels a listed PENDING booking after confirmation. Any other status, or an id
    /// not in the current list, is rejected without a request.
    pub async fn cancel(&self, booking_id: i64) {
        let booking = self
            .state()
            .bookings
            .iter()
            .find(|b| b.id == booking_id)
            .cloned();

        let Some(booking) = booking else {
            self.flash.error(format!("Booking #{booking_id} not found"));
            return;
        };

        if !is_cancellable(&booking) {
            self.flash.error(format!(
                "Booking #{booking_id} is {} and can no longer be cancelled",
                booking.display_status()
            ));
            return;
        }

        if !self
            .confirm
            .confirm("Are you sure you want to cancel this booking?")
        {
            return;
        }

        match self.api.remove(booking_id).await {
            Ok(()) => {
                tracing::info!(booking_id, "booking cancelled");
                self.flash.success("Booking cancelled successfully!");
                self.refresh().await;
            }
            Err(e) => {
                tracing::warn!(booking_id, error = %e, "failed to cancel booking");
                self.flash.error(e.user_message("Failed to cancel booking"));
            }
        }
    }

    pub fn view(&self) -> UserView {
        let state = self.state();
        let stats = classify(&state.bookings);
        UserView {
            email: self.user.as_ref().and_then(|u| u.email.clone()),
            rows: state.bookings.iter().cloned().map(BookingRow::new).collect(),
            total: stats.total,
            pending: stats.pending,
            completed: stats.completed,
            loading: state.loading,
            creating: state.creating,
            message: self.flash.current(),
            form: state.form.clone(),
        }
    }

    /// Tears the view down: a pending message clear is cancelled.
    pub fn close(&self) {
        self.flash.cancel_timer();
    }
}

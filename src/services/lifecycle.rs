use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::errors::ApiError;
use crate::models::booking::booking_date;
use crate::models::{Booking, BookingDraft, BookingForm, BookingStatus, ServiceType};

/// Per-status counts over one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub completed: usize,
    pub cancelled: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(BookingStatus),
}

impl StatusFilter {
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("ALL") {
            return Some(StatusFilter::All);
        }
        BookingStatus::parse(s).map(StatusFilter::Only)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "ALL",
            StatusFilter::Only(status) => status.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeClass {
    Pending,
    Approved,
    Completed,
    Cancelled,
}

impl BadgeClass {
    pub fn css_class(&self) -> &'static str {
        match self {
            BadgeClass::Pending => "status-pending",
            BadgeClass::Approved => "status-approved",
            BadgeClass::Completed => "status-completed",
            BadgeClass::Cancelled => "status-cancelled",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BadgeClass::Pending => "pending",
            BadgeClass::Approved => "approved",
            BadgeClass::Completed => "completed",
            BadgeClass::Cancelled => "cancelled",
        }
    }
}

pub fn canonical_status(raw: Option<&str>) -> Option<BookingStatus> {
    raw.and_then(BookingStatus::parse)
}

pub fn classify(bookings: &[Booking]) -> BookingStats {
    let mut stats = BookingStats {
        total: bookings.len(),
        ..BookingStats::default()
    };
    for booking in bookings {
        match canonical_status(booking.status.as_deref()) {
            Some(BookingStatus::Pending) => stats.pending += 1,
            Some(BookingStatus::Approved) => stats.approved += 1,
            Some(BookingStatus::Completed) => stats.completed += 1,
            Some(BookingStatus::Cancelled) => stats.cancelled += 1,
            None => {}
        }
    }
    stats
}

pub fn filter_by_status<'a>(bookings: &'a [Booking], filter: StatusFilter) -> Vec<&'a Booking> {
    match filter {
        StatusFilter::All => bookings.iter().collect(),
        StatusFilter::Only(wanted) => bookings
            .iter()
            .filter(|b| canonical_status(b.status.as_deref()) == Some(wanted))
            .collect(),
    }
}

pub fn is_cancellable(booking: &Booking) -> bool {
    canonical_status(booking.status.as_deref()) == Some(BookingStatus::Pending)
}

/// Statuses an admin may move a booking to. Every status is reachable from every
/// state, including the current one.
pub fn status_transitions(_from: Option<BookingStatus>) -> [BookingStatus; 4] {
    BookingStatus::ALL
}

pub fn is_legal_transition(from: Option<BookingStatus>, to: BookingStatus) -> bool {
    status_transitions(from).contains(&to)
}

pub fn badge_class(status: Option<&str>) -> BadgeClass {
    match canonical_status(status) {
        Some(BookingStatus::Approved) => BadgeClass::Approved,
        Some(BookingStatus::Completed) => BadgeClass::Completed,
        Some(BookingStatus::Cancelled) => BadgeClass::Cancelled,
        Some(BookingStatus::Pending) | None => BadgeClass::Pending,
    }
}

/// Newest booking date first, undated bookings last. Same-day bookings put the highest
/// id first.
pub fn sort_newest_first(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| {
        b.booking_date
            .cmp(&a.booking_date)
            .then_with(|| b.id.cmp(&a.id))
    });
}

pub fn validate_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
        .is_match(email)
}

pub fn validate_booking_form(
    form: &BookingForm,
    user_id: i64,
    today: NaiveDate,
) -> Result<BookingDraft, ApiError> {
    let bike_model = form.bike_model.trim();
    let service_type = form.service_type.trim();
    let raw_date = form.booking_date.trim();

    if bike_model.is_empty() || service_type.is_empty() || raw_date.is_empty() {
        return Err(ApiError::Validation("Please fill in all fields!".to_string()));
    }

    let service_type = ServiceType::parse(service_type)
        .ok_or_else(|| ApiError::Validation("Please select a valid service type!".to_string()))?;

    let booking_date = booking_date::parse(raw_date)
        .ok_or_else(|| ApiError::Validation("Please enter a valid booking date!".to_string()))?;

    if booking_date < today {
        return Err(ApiError::Validation(
            "Booking date cannot be in the past!".to_string(),
        ));
    }

    Ok(BookingDraft {
        user_id,
        bike_model: bike_model.to_string(),
        service_type,
        booking_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn booking(id: i64, day: &str, status: Option<&str>) -> Booking {
        Booking {
            id,
            user: None,
            bike_model: "Honda CB Shine".to_string(),
            service_type: "Oil Change".to_string(),
            booking_date: Some(date(day)),
            status: status.map(str::to_string),
        }
    }

    fn mixed() -> Vec<Booking> {
        vec![
            booking(1, "2025-06-01", Some("PENDING")),
            booking(2, "2025-06-02", Some("approved")),
            booking(3, "2025-06-03", Some("Completed")),
            booking(4, "2025-06-04", Some("CANCELLED")),
            booking(5, "2025-06-05", Some("pending")),
            booking(6, "2025-06-06", Some("ON_HOLD")),
            booking(7, "2025-06-07", None),
        ]
    }

    #[test]
    fn test_classify_counts() {
        let stats = classify(&mixed());
        assert_eq!(
            stats,
            BookingStats {
                total: 7,
                pending: 2,
                approved: 1,
                completed: 1,
                cancelled: 1,
            }
        );
    }

    #[test]
    fn test_classify_buckets_never_exceed_total() {
        let cases = vec![vec![], mixed(), vec![booking(1, "2025-01-01", Some("??"))]];
        for bookings in cases {
            let s = classify(&bookings);
            assert_eq!(s.total, bookings.len());
            assert!(s.pending + s.approved + s.completed + s.cancelled <= s.total);
        }
    }

    #[test]
    fn test_filter_all_is_identity() {
        let bookings = mixed();
        let filtered = filter_by_status(&bookings, StatusFilter::All);
        let ids: Vec<i64> = filtered.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_filter_specific_preserves_order() {
        let bookings = mixed();
        for status in BookingStatus::ALL {
            let filtered = filter_by_status(&bookings, StatusFilter::Only(status));
            assert!(filtered.iter().all(|b| b.status() == Some(status)));
        }
        let pending: Vec<i64> = filter_by_status(&bookings, StatusFilter::Only(BookingStatus::Pending))
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(pending, vec![1, 5]);
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(StatusFilter::parse("all"), Some(StatusFilter::All));
        assert_eq!(
            StatusFilter::parse("cancelled"),
            Some(StatusFilter::Only(BookingStatus::Cancelled))
        );
        assert_eq!(StatusFilter::parse("archived"), None);
    }

    #[test]
    fn test_is_cancellable() {
        assert!(is_cancellable(&booking(1, "2025-01-01", Some("PENDING"))));
        assert!(is_cancellable(&booking(1, "2025-01-01", Some("pending"))));
        assert!(!is_cancellable(&booking(1, "2025-01-01", Some("COMPLETED"))));
        assert!(!is_cancellable(&booking(1, "2025-01-01", Some("APPROVED"))));
        assert!(!is_cancellable(&booking(1, "2025-01-01", None)));
    }

    #[test]
    fn test_transitions_are_permissive() {
        for from in BookingStatus::ALL {
            for to in BookingStatus::ALL {
                assert!(is_legal_transition(Some(from), to));
            }
        }
        assert!(is_legal_transition(None, BookingStatus::Approved));
    }

    #[test]
    fn test_badge_class_fallback() {
        assert_eq!(badge_class(Some("approved")), BadgeClass::Approved);
        assert_eq!(badge_class(Some("COMPLETED")), BadgeClass::Completed);
        assert_eq!(badge_class(Some("Cancelled")), BadgeClass::Cancelled);
        assert_eq!(badge_class(Some("weird")), BadgeClass::Pending);
        assert_eq!(badge_class(None).css_class(), "status-pending");
    }

    #[test]
    fn test_sort_newest_first() {
        let mut bookings = vec![
            booking(1, "2025-06-01", None),
            booking(2, "2025-06-03", None),
            booking(3, "2025-06-03", None),
            booking(4, "2025-05-30", None),
        ];
        sort_newest_first(&mut bookings);
        let ids: Vec<i64> = bookings.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_sort_puts_undated_last() {
        let undated = |id| Booking {
            booking_date: None,
            ..booking(id, "2025-01-01", None)
        };
        let mut bookings = vec![
            undated(8),
            booking(1, "2025-06-01", None),
            undated(9),
            booking(2, "2024-01-01", None),
        ];
        sort_newest_first(&mut bookings);
        let ids: Vec<i64> = bookings.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 9, 8]);
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("rider@example.com"));
        assert!(!validate_email("bad@"));
        assert!(!validate_email("no at.com"));
        assert!(!validate_email("a@b"));
    }

    #[test]
    fn test_validate_form_missing_fields() {
        let form = BookingForm {
            bike_model: "  ".to_string(),
            service_type: "Oil Change".to_string(),
            booking_date: "2025-06-01".to_string(),
        };
        let err = validate_booking_form(&form, 1, date("2025-06-01")).unwrap_err();
        assert_eq!(err, ApiError::Validation("Please fill in all fields!".to_string()));
    }

    #[test]
    fn test_validate_form_past_date() {
        let form = BookingForm {
            bike_model: "Bajaj Pulsar".to_string(),
            service_type: "Oil Change".to_string(),
            booking_date: "2025-05-31".to_string(),
        };
        let err = validate_booking_form(&form, 1, date("2025-06-01")).unwrap_err();
        assert_eq!(
            err,
            ApiError::Validation("Booking date cannot be in the past!".to_string())
        );
    }

    #[test]
    fn test_validate_form_today_is_allowed() {
        let form = BookingForm {
            bike_model: "Bajaj Pulsar".to_string(),
            service_type: "tire change".to_string(),
            booking_date: "2025-06-01".to_string(),
        };
        let draft = validate_booking_form(&form, 8, date("2025-06-01")).unwrap();
        assert_eq!(draft.user_id, 8);
        assert_eq!(draft.service_type, ServiceType::TireChange);
        assert_eq!(draft.booking_date, date("2025-06-01"));
    }
}

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Pending,
    Approved,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Approved,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    /// Canonicalizes a status string. Matching ignores ASCII case; anything outside the
    /// four known values is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServiceType {
    #[serde(rename = "General Service")]
    GeneralService,
    #[serde(rename = "Oil Change")]
    OilChange,
    #[serde(rename = "Brake Repair")]
    BrakeRepair,
    #[serde(rename = "Engine Check")]
    EngineCheck,
    #[serde(rename = "Battery Replacement")]
    BatteryReplacement,
    #[serde(rename = "Tire Change")]
    TireChange,
    #[serde(rename = "Full Service")]
    FullService,
}

impl ServiceType {
    pub const CATALOG: [ServiceType; 7] = [
        ServiceType::GeneralService,
        ServiceType::OilChange,
        ServiceType::BrakeRepair,
        ServiceType::EngineCheck,
        ServiceType::BatteryReplacement,
        ServiceType::TireChange,
        ServiceType::FullService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::GeneralService => "General Service",
            ServiceType::OilChange => "Oil Change",
            ServiceType::BrakeRepair => "Brake Repair",
            ServiceType::EngineCheck => "Engine Check",
            ServiceType::BatteryReplacement => "Battery Replacement",
            ServiceType::TireChange => "Tire Change",
            ServiceType::FullService => "Full Service",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::CATALOG
            .into_iter()
            .find(|service| service.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owning user as embedded in a booking. Every field may be absent on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookingOwner {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    #[serde(default)]
    pub user: Option<BookingOwner>,
    #[serde(default)]
    pub bike_model: String,
    #[serde(default)]
    pub service_type: String,
    /// `None` when the server sent no date or one that does not parse.
    #[serde(default, with = "booking_date::lenient")]
    pub booking_date: Option<NaiveDate>,
    /// Raw status as sent by the server. Kept verbatim, including unknown values.
    #[serde(default)]
    pub status: Option<String>,
}

impl Booking {
    pub fn status(&self) -> Option<BookingStatus> {
        self.status.as_deref().and_then(BookingStatus::parse)
    }

    /// Missing status is displayed as PENDING; it is never written back that way.
    pub fn display_status(&self) -> &str {
        match self.status.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => BookingStatus::Pending.as_str(),
        }
    }

    pub fn owner_id(&self) -> Option<i64> {
        self.user.as_ref().and_then(|u| u.id)
    }

    pub fn display_date(&self) -> String {
        self.booking_date
            .map(|d| d.format(booking_date::FORMAT).to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// A validated booking request, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    pub user_id: i64,
    pub bike_model: String,
    pub service_type: ServiceType,
    pub booking_date: NaiveDate,
}

/// Raw form input as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingForm {
    pub bike_model: String,
    pub service_type: String,
    pub booking_date: String,
}

impl BookingForm {
    pub fn is_blank(&self) -> bool {
        self.bike_model.is_empty() && self.service_type.is_empty() && self.booking_date.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRef {
    pub id: i64,
}

/// Body of `POST /bookings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    #[serde(default)]
    pub bike_model: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub booking_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
}

impl From<&BookingDraft> for NewBooking {
    fn from(draft: &BookingDraft) -> Self {
        Self {
            bike_model: Some(draft.bike_model.clone()),
            service_type: Some(draft.service_type.as_str().to_string()),
            booking_date: Some(draft.booking_date.format(booking_date::FORMAT).to_string()),
            status: Some(BookingStatus::Pending.as_str().to_string()),
            user: Some(UserRef { id: draft.user_id }),
        }
    }
}

pub mod booking_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn parse(s: &str) -> Option<NaiveDate> {
        let date_part = s.trim().split(['T', ' ']).next()?;
        NaiveDate::parse_from_str(date_part, FORMAT).ok()
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid booking date: {raw}")))
    }

    /// Optional date that never fails the enclosing record: null, a non-string or an
    /// unparseable string all read as `None`.
    pub mod lenient {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
            let date = raw.as_ref().and_then(|v| v.as_str()).and_then(super::parse);
            if date.is_none() {
                tracing::debug!(raw = ?raw, "booking without a usable date");
            }
            Ok(date)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_ignores_case() {
        assert_eq!(BookingStatus::parse("pending"), Some(BookingStatus::Pending));
        assert_eq!(BookingStatus::parse("Approved"), Some(BookingStatus::Approved));
        assert_eq!(BookingStatus::parse("CANCELLED"), Some(BookingStatus::Cancelled));
        assert_eq!(BookingStatus::parse("canceled"), None);
        assert_eq!(BookingStatus::parse(""), None);
    }

    #[test]
    fn test_booking_from_server_json() {
        let json = r#"{
            "id": 7,
            "bikeModel": "Bajaj Pulsar",
            "serviceType": "Brake Repair",
            "bookingDate": "2025-06-16T00:00:00",
            "status": "approved",
            "user": {"id": 3, "name": "Asha", "email": "asha@example.com", "phone": "999"}
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.id, 7);
        assert_eq!(booking.booking_date, NaiveDate::from_ymd_opt(2025, 6, 16));
        assert_eq!(booking.status(), Some(BookingStatus::Approved));
        assert_eq!(booking.display_status(), "approved");
        assert_eq!(booking.owner_id(), Some(3));
    }

    #[test]
    fn test_missing_status_displays_pending() {
        let json = r#"{"id": 1, "bikeModel": "X", "serviceType": "Oil Change", "bookingDate": "2025-01-02"}"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.status, None);
        assert_eq!(booking.status(), None);
        assert_eq!(booking.display_status(), "PENDING");
        assert!(booking.user.is_none());
    }

    #[test]
    fn test_bad_date_does_not_drop_the_list() {
        let json = r#"[
            {"id": 1, "bikeModel": "Bajaj Pulsar", "serviceType": "Oil Change", "bookingDate": "2025-06-16", "status": "PENDING"},
            {"id": 2, "bikeModel": "TVS Apache", "serviceType": "Oil Change", "bookingDate": null, "status": "PENDING"},
            {"id": 3, "bikeModel": "Hero Splendor", "serviceType": "Oil Change", "bookingDate": "16/06/2025"},
            {"id": 4, "bikeModel": "Honda Activa", "serviceType": "Oil Change"}
        ]"#;
        let bookings: Vec<Booking> = serde_json::from_str(json).unwrap();
        assert_eq!(bookings.len(), 4);
        assert_eq!(bookings[0].booking_date, NaiveDate::from_ymd_opt(2025, 6, 16));
        assert!(bookings[1..].iter().all(|b| b.booking_date.is_none()));
        assert_eq!(bookings[0].display_date(), "2025-06-16");
        assert_eq!(bookings[1].display_date(), "N/A");
    }

    #[test]
    fn test_missing_date_serializes_as_null() {
        let json = r#"{"id": 5, "bikeModel": "X", "serviceType": "Oil Change", "bookingDate": null}"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        let value = serde_json::to_value(&booking).unwrap();
        assert!(value["bookingDate"].is_null());
    }

    #[test]
    fn test_new_booking_always_sends_pending() {
        let draft = BookingDraft {
            user_id: 4,
            bike_model: "Honda CB Shine".to_string(),
            service_type: ServiceType::OilChange,
            booking_date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
        };
        let body = serde_json::to_value(NewBooking::from(&draft)).unwrap();
        assert_eq!(body["status"], "PENDING");
        assert_eq!(body["serviceType"], "Oil Change");
        assert_eq!(body["bookingDate"], "2025-03-09");
        assert_eq!(body["user"]["id"], 4);
    }

    #[test]
    fn test_service_type_parse() {
        assert_eq!(ServiceType::parse("oil change"), Some(ServiceType::OilChange));
        assert_eq!(ServiceType::parse(" Full Service "), Some(ServiceType::FullService));
        assert_eq!(ServiceType::parse("Paint Job"), None);
    }
}

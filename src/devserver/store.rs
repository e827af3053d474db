use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::errors::DevError;
use crate::models::booking::booking_date;
use crate::models::{
    Booking, BookingOwner, BookingStatus, Credentials, LoginResponse, NewBooking, Registration,
    ServiceType, User,
};

#[derive(Debug, Clone)]
struct UserRecord {
    id: i64,
    name: String,
    email: String,
    password: String,
    phone: String,
}

#[derive(Debug, Clone)]
struct AdminRecord {
    id: i64,
    email: String,
    password: String,
}

#[derive(Debug, Clone)]
struct BookingRecord {
    id: i64,
    user_id: i64,
    bike_model: String,
    service_type: String,
    booking_date: NaiveDate,
    status: String,
}

/// In-memory backing data for the development API.
#[derive(Debug, Default)]
pub struct DevStore {
    users: Vec<UserRecord>,
    admins: Vec<AdminRecord>,
    bookings: BTreeMap<i64, BookingRecord>,
    /// Current bearer token per admin id. A new login replaces the previous token.
    admin_tokens: HashMap<i64, String>,
    next_user_id: i64,
    next_admin_id: i64,
    next_booking_id: i64,
}

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl DevStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_admin(&mut self, email: &str, password: &str) -> i64 {
        self.next_admin_id += 1;
        let id = self.next_admin_id;
        self.admins.push(AdminRecord {
            id,
            email: email.to_string(),
            password: password.to_string(),
        });
        id
    }

    pub fn register_user(&mut self, reg: &Registration) -> Result<User, DevError> {
        let fields = [&reg.name, &reg.email, &reg.password, &reg.phone];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(DevError::BadRequest("All fields are required".to_string()));
        }
        if self
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(reg.email.trim()))
        {
            return Err(DevError::Conflict("Email already registered".to_string()));
        }

        self.next_user_id += 1;
        let record = UserRecord {
            id: self.next_user_id,
            name: reg.name.trim().to_string(),
            email: reg.email.trim().to_string(),
            password: reg.password.clone(),
            phone: reg.phone.trim().to_string(),
        };
        let user = User {
            id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
        };
        self.users.push(record);
        Ok(user)
    }

    pub fn login_user(&self, creds: &Credentials) -> Result<LoginResponse, DevError> {
        let user = self
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(creds.email.trim()))
            .ok_or_else(|| DevError::NotFound("User Not Found".to_string()))?;

        if user.password != creds.password {
            return Err(DevError::InvalidCredentials("Invalid Password".to_string()));
        }

        Ok(LoginResponse {
            id: Some(user.id),
            token: Some(uuid::Uuid::new_v4().to_string()),
        })
    }

    pub fn login_admin(&mut self, creds: &Credentials) -> Result<LoginResponse, DevError> {
        let admin = self
            .admins
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(creds.email.trim()))
            .ok_or_else(|| DevError::NotFound("Admin Not Found".to_string()))?;

        if admin.password != creds.password {
            return Err(DevError::InvalidCredentials("Invalid Password".to_string()));
        }

        let id = admin.id;
        let token = uuid::Uuid::new_v4().to_string();
        if self.admin_tokens.insert(id, token.clone()).is_some() {
            tracing::debug!(admin_id = id, "replaced previous admin token");
        }
        Ok(LoginResponse {
            id: Some(id),
            token: Some(token),
        })
    }

    pub fn is_admin_token(&self, token: &str) -> bool {
        !token.is_empty() && self.admin_tokens.values().any(|t| t == token)
    }

    pub fn bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, DevError> {
        if !self.users.iter().any(|u| u.id == user_id) {
            return Err(DevError::NotFound("User Not Found".to_string()));
        }
        Ok(self
            .bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .map(|b| self.to_booking(b))
            .collect())
    }

    pub fn all_bookings(&self) -> Vec<Booking> {
        self.bookings.values().map(|b| self.to_booking(b)).collect()
    }

    /// Stores a new booking. Whatever status the request carries, it is saved as PENDING.
    pub fn create_booking(&mut self, req: &NewBooking) -> Result<Booking, DevError> {
        let (Some(bike_model), Some(service_type), Some(raw_date)) = (
            required(req.bike_model.as_deref()),
            required(req.service_type.as_deref()),
            required(req.booking_date.as_deref()),
        ) else {
            return Err(DevError::BadRequest(
                "bikeModel, serviceType and bookingDate are required".to_string(),
            ));
        };

        let service_type = ServiceType::parse(service_type)
            .ok_or_else(|| DevError::BadRequest(format!("Unknown service type: {service_type}")))?;
        let date = booking_date::parse(raw_date)
            .ok_or_else(|| DevError::BadRequest(format!("Invalid booking date: {raw_date}")))?;

        let user_id = req
            .user
            .as_ref()
            .map(|u| u.id)
            .ok_or_else(|| DevError::BadRequest("user is required".to_string()))?;
        if !self.users.iter().any(|u| u.id == user_id) {
            return Err(DevError::BadRequest("User Not Found".to_string()));
        }

        self.next_booking_id += 1;
        let record = BookingRecord {
            id: self.next_booking_id,
            user_id,
            bike_model: bike_model.to_string(),
            service_type: service_type.as_str().to_string(),
            booking_date: date,
            status: BookingStatus::Pending.as_str().to_string(),
        };
        let booking = self.to_booking(&record);
        self.bookings.insert(record.id, record);
        Ok(booking)
    }

    pub fn booking_status(&self, id: i64) -> Result<String, DevError> {
        self.bookings
            .get(&id)
            .map(|b| b.status.clone())
            .ok_or_else(|| DevError::NotFound("Booking Not Found".to_string()))
    }

    /// User-side cancellation removes the booking, and only while it is PENDING.
    pub fn cancel_booking(&mut self, id: i64) -> Result<(), DevError> {
        let booking = self
            .bookings
            .get(&id)
            .ok_or_else(|| DevError::NotFound("Booking Not Found".to_string()))?;

        if BookingStatus::parse(&booking.status) != Some(BookingStatus::Pending) {
            return Err(DevError::BadRequest(
                "Only pending bookings can be cancelled".to_string(),
            ));
        }
        self.bookings.remove(&id);
        Ok(())
    }

    pub fn update_status(&mut self, id: i64, status: &str) -> Result<Booking, DevError> {
        let status = BookingStatus::parse(status)
            .ok_or_else(|| DevError::BadRequest(format!("Invalid status: {status}")))?;

        let record = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| DevError::NotFound("Booking Not Found".to_string()))?;
        record.status = status.as_str().to_string();

        let record = record.clone();
        Ok(self.to_booking(&record))
    }

    pub fn delete_booking(&mut self, id: i64) -> Result<(), DevError> {
        self.bookings
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DevError::NotFound("Booking Not Found".to_string()))
    }

    fn to_booking(&self, record: &BookingRecord) -> Booking {
        let owner = self
            .users
            .iter()
            .find(|u| u.id == record.user_id)
            .map(|u| BookingOwner {
                id: Some(u.id),
                name: Some(u.name.clone()),
                email: Some(u.email.clone()),
            })
            .unwrap_or(BookingOwner {
                id: Some(record.user_id),
                ..BookingOwner::default()
            });

        Booking {
            id: record.id,
            user: Some(owner),
            bike_model: record.bike_model.clone(),
            service_type: record.service_type.clone(),
            booking_date: Some(record.booking_date),
            status: Some(record.status.clone()),
        }
    }
}

pub mod booking;
pub mod message;
pub mod user;

pub use booking::{
    Booking, BookingDraft, BookingForm, BookingOwner, BookingStatus, NewBooking, ServiceType,
    UserRef,
};
pub use message::{MessageKind, StatusMessage};
pub use user::{
    AdminIdentity, Credentials, LoginResponse, Registration, User, UserIdentity, ADMIN_ROLE,
};

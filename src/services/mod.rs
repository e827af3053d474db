pub mod api;
pub mod clock;
pub mod confirm;
pub mod flash;
pub mod lifecycle;
pub mod session;

//! Registration, login and the booking lifecycle.

pub mod auth;
mod bookings;
pub mod calendar;
mod error;

pub use auth::AuthService;
pub use bookings::BookingService;
pub use error::ServiceError;

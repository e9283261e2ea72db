//! Database models split into domain-specific modules.

pub mod booking;
pub mod user;

pub use booking::*;
pub use user::*;

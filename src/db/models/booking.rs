//! Booking models and DTOs.

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for BookingStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Booking {
    pub id: i64,
    /// Name of the person requesting the booking
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub resource_type: String,
    pub date: String,
    /// Either a single start time or a `start-end` range
    pub time: String,
    pub end_time: Option<String>,
    pub purpose: Option<String>,
    pub equipment: Option<String>,
    pub status: String,
    pub created_at: String,
}

impl Booking {
    pub fn status(&self) -> BookingStatus {
        BookingStatus::from(self.status.clone())
    }
}

/// An approved booking as served to the calendar page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalendarBooking {
    #[serde(flatten)]
    pub booking: Booking,
    /// `YYYY-MM-DDTHH:MM`
    pub start: String,
    pub end: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateBookingRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub end_time: Option<String>,
    pub purpose: Option<String>,
    pub equipment: Option<String>,
}

/// Body of `/approve` and `/reject`
#[derive(Debug, Default, Deserialize)]
pub struct StatusChangeRequest {
    #[serde(default, deserialize_with = "deserialize_booking_id")]
    pub id: Option<i64>,
}

/// Accept a booking id as a JSON number or a numeric string (form posts).
/// Anything else deserializes to `None`, which matches no row.
fn deserialize_booking_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Number(n)) => Some(n),
        Some(RawId::Text(s)) => s.trim().parse().ok(),
        Some(RawId::Other(_)) | None => None,
    })
}

use tracing::{error, info};

use super::{calendar, ServiceError};
use crate::config::ReadFailurePolicy;
use crate::db::{Booking, BookingStatus, BookingStore, CalendarBooking, CreateBookingRequest};

#[derive(Debug, Clone)]
pub struct BookingService {
    bookings: BookingStore,
    read_policy: ReadFailurePolicy,
}

impl BookingService {
    pub fn new(bookings: BookingStore, read_policy: ReadFailurePolicy) -> Self {
        Self {
            bookings,
            read_policy,
        }
    }

    pub fn read_policy(&self) -> ReadFailurePolicy {
        self.read_policy
    }

    /// Record a new booking request in the pending state
    pub async fn create(&self, req: CreateBookingRequest) -> Result<(), ServiceError> {
        let id = self.bookings.insert(&req).await?;
        info!(booking_id = id, "Booking request submitted");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Booking>, ServiceError> {
        let result = self.bookings.list().await;
        self.degrade(result, "bookings")
    }

    pub async fn list_approved(&self) -> Result<Vec<CalendarBooking>, ServiceError> {
        let result = self.bookings.list_by_status(BookingStatus::Approved).await;
        let approved = self.degrade(result, "approved bookings")?;
        Ok(approved.into_iter().map(calendar::to_calendar).collect())
    }

    /// Overwrite a booking's status. No existence or previous-state check:
    /// an unknown id is a no-op that reports zero rows.
    pub async fn set_status(
        &self,
        id: Option<i64>,
        status: BookingStatus,
    ) -> Result<u64, ServiceError> {
        let rows = self.bookings.set_status(id, status).await?;
        info!(booking_id = ?id, status = %status, rows, "Booking status updated");
        Ok(rows)
    }

    /// Apply the read failure policy to a list query
    fn degrade<T>(
        &self,
        result: Result<Vec<T>, sqlx::Error>,
        what: &str,
    ) -> Result<Vec<T>, ServiceError> {
        match result {
            Ok(rows) => Ok(rows),
            Err(e) => {
                error!("Failed to list {}: {}", what, e);
                match self.read_policy {
                    ReadFailurePolicy::FailOpen => Ok(Vec::new()),
                    ReadFailurePolicy::FailClosed => Err(ServiceError::Store(e)),
                }
            }
        }
    }
}

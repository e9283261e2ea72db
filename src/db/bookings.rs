use sqlx::SqlitePool;

use super::{Booking, BookingStatus, CreateBookingRequest};

/// Persistence for booking requests
#[derive(Debug, Clone)]
pub struct BookingStore {
    pool: SqlitePool,
}

impl BookingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a booking in the pending state. Fields are stored as given;
    /// only the schema's NOT NULL columns can reject a request.
    pub async fn insert(&self, req: &CreateBookingRequest) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO bookings (name, type, date, time, end_time, purpose, equipment, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&req.name)
        .bind(&req.resource_type)
        .bind(&req.date)
        .bind(&req.time)
        .bind(&req.end_time)
        .bind(&req.purpose)
        .bind(&req.equipment)
        .bind(BookingStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// All bookings, newest date first
    pub async fn list(&self) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY date DESC, id DESC")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn list_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE status = ? ORDER BY date, id")
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
    }

    #[cfg(test)]
    pub async fn get(&self, id: i64) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Overwrite the status of the booking with `id`. Returns the number of
    /// rows changed; a missing id changes nothing.
    pub async fn set_status(&self, id: Option<i64>, status: BookingStatus) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

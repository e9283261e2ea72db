// Booking endpoints
//
// List endpoints answer with JSON. The write endpoints answer with a short
// plain-text message, which is what the booking form and admin page display.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use super::error::ApiError;
use super::extract::JsonOrForm;
use crate::db::{Booking, BookingStatus, CalendarBooking, CreateBookingRequest, StatusChangeRequest};
use crate::AppState;

/// List all bookings, newest date first
///
/// GET /bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    Ok(Json(state.bookings.list().await?))
}

/// List approved bookings with calendar `start`/`end` timestamps
///
/// GET /approved-bookings
pub async fn list_approved_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CalendarBooking>>, ApiError> {
    Ok(Json(state.bookings.list_approved().await?))
}

/// Submit a booking request
///
/// POST /book
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    JsonOrForm(req): JsonOrForm<CreateBookingRequest>,
) -> (StatusCode, &'static str) {
    match state.bookings.create(req).await {
        Ok(()) => (StatusCode::OK, "Booking saved"),
        Err(e) => {
            tracing::error!("Failed to save booking: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save booking")
        }
    }
}

/// POST /approve
pub async fn approve_booking(
    State(state): State<Arc<AppState>>,
    JsonOrForm(req): JsonOrForm<StatusChangeRequest>,
) -> (StatusCode, &'static str) {
    change_status(&state, req, BookingStatus::Approved, "Booking approved").await
}

/// POST /reject
pub async fn reject_booking(
    State(state): State<Arc<AppState>>,
    JsonOrForm(req): JsonOrForm<StatusChangeRequest>,
) -> (StatusCode, &'static str) {
    change_status(&state, req, BookingStatus::Rejected, "Booking rejected").await
}

async fn change_status(
    state: &AppState,
    req: StatusChangeRequest,
    status: BookingStatus,
    done: &'static str,
) -> (StatusCode, &'static str) {
    match state.bookings.set_status(req.id, status).await {
        Ok(_) => (StatusCode::OK, done),
        Err(e) => {
            tracing::error!(booking_id = ?req.id, "Failed to mark booking {}: {}", status, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
        }
    }
}

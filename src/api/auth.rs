use axum::{extract::State, Json};
use std::sync::Arc;

use super::error::ApiError;
use super::extract::JsonOrForm;
use crate::db::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::AppState;

/// Create an account
///
/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonOrForm(request): JsonOrForm<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let response = state.auth.register(request).await?;
    Ok(Json(response))
}

/// Check credentials and tell the client where to go next
///
/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonOrForm(request): JsonOrForm<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = state.auth.login(request).await?;
    Ok(Json(response))
}

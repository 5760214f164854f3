//! Authentication endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::auth::{LoginRequest, LoginResponse},
    AppState,
};

use super::AppJson;

/// Log in as the library operator
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Malformed request", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = state.services.auth.login(&request.username, &request.password)?;
    Ok(Json(response))
}

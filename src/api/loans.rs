//! Circulation endpoints: checkout, check-in, renewal and overdue listing

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{member::parse_member_id, CopyStatus, Loan},
    AppState,
};

use super::{AppJson, AuthenticatedOperator};

/// A member acting on one copy
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CirculationRequest {
    /// Member ID (UUID)
    pub member_id: String,
    #[validate(length(min = 1, message = "Copy barcode is required"))]
    pub copy_barcode: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckinRequest {
    #[validate(length(min = 1, message = "Copy barcode is required"))]
    pub copy_barcode: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckinResponse {
    pub message: String,
    /// Status the copy was moved to
    pub status: CopyStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RenewResponse {
    pub message: String,
    pub new_due: DateTime<Utc>,
    pub member_id: Uuid,
}

/// Lend a copy to a member
#[utoipa::path(
    post,
    path = "/checkout",
    tag = "circulation",
    security(("bearer_auth" = [])),
    request_body = CirculationRequest,
    responses(
        (status = 200, description = "Loan created", body = Loan),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Member is blocked", body = crate::error::ErrorResponse),
        (status = 404, description = "Member or copy not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Copy is not available", body = crate::error::ErrorResponse)
    )
)]
pub async fn checkout(
    State(state): State<AppState>,
    operator: AuthenticatedOperator,
    AppJson(request): AppJson<CirculationRequest>,
) -> AppResult<Json<Loan>> {
    request.validate()?;
    let member_id = parse_member_id(&request.member_id)?;

    let loan = state
        .services
        .circulation
        .checkout(member_id, request.copy_barcode.trim(), operator.subject())
        .await?;
    Ok(Json(loan))
}

/// Return a copy
#[utoipa::path(
    post,
    path = "/checkin",
    tag = "circulation",
    security(("bearer_auth" = [])),
    request_body = CheckinRequest,
    responses(
        (status = 200, description = "Copy checked in", body = CheckinResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "No active loan for this copy", body = crate::error::ErrorResponse)
    )
)]
pub async fn checkin(
    State(state): State<AppState>,
    operator: AuthenticatedOperator,
    AppJson(request): AppJson<CheckinRequest>,
) -> AppResult<Json<CheckinResponse>> {
    request.validate()?;

    let outcome = state
        .services
        .circulation
        .checkin(request.copy_barcode.trim(), operator.subject())
        .await?;

    Ok(Json(CheckinResponse {
        message: "Check-in successful".to_string(),
        status: outcome.status,
    }))
}

/// Extend a loan
#[utoipa::path(
    post,
    path = "/loan/renew",
    tag = "circulation",
    security(("bearer_auth" = [])),
    request_body = CirculationRequest,
    responses(
        (status = 200, description = "Loan renewed", body = RenewResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Holds pending or member blocked", body = crate::error::ErrorResponse),
        (status = 404, description = "Member or active loan not found", body = crate::error::ErrorResponse),
        (status = 500, description = "No duration configured for the member tier", body = crate::error::ErrorResponse)
    )
)]
pub async fn renew(
    State(state): State<AppState>,
    operator: AuthenticatedOperator,
    AppJson(request): AppJson<CirculationRequest>,
) -> AppResult<Json<RenewResponse>> {
    request.validate()?;
    let member_id = parse_member_id(&request.member_id)?;

    let loan = state
        .services
        .circulation
        .renew(member_id, request.copy_barcode.trim(), operator.subject())
        .await?;

    Ok(Json(RenewResponse {
        message: "Loan renewed".to_string(),
        new_due: loan.due_date,
        member_id: loan.member_id,
    }))
}

/// Open loans past their due date
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "circulation",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue loans, oldest due date first", body = Vec<Loan>)
    )
)]
pub async fn list_overdue(
    State(state): State<AppState>,
    _operator: AuthenticatedOperator,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.circulation.overdue_loans(Utc::now()).await?;
    Ok(Json(loans))
}

//! Hold placement endpoint

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{member::parse_member_id, Hold},
    AppState,
};

use super::{loans::CirculationRequest, AppJson, AuthenticatedOperator};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HoldResponse {
    pub message: String,
    pub hold: Hold,
}

/// Place a hold on an unavailable copy
#[utoipa::path(
    post,
    path = "/holds/place",
    tag = "circulation",
    security(("bearer_auth" = [])),
    request_body = CirculationRequest,
    responses(
        (status = 200, description = "Hold placed", body = HoldResponse),
        (status = 400, description = "Copy is available or invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Member is blocked", body = crate::error::ErrorResponse),
        (status = 404, description = "Member or copy not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Member already holds this copy", body = crate::error::ErrorResponse)
    )
)]
pub async fn place_hold(
    State(state): State<AppState>,
    operator: AuthenticatedOperator,
    AppJson(request): AppJson<CirculationRequest>,
) -> AppResult<Json<HoldResponse>> {
    request.validate()?;
    let member_id = parse_member_id(&request.member_id)?;

    let hold = state
        .services
        .circulation
        .place_hold(member_id, request.copy_barcode.trim(), operator.subject())
        .await?;

    Ok(Json(HoldResponse {
        message: "Hold placed successfully".to_string(),
        hold,
    }))
}

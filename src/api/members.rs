//! Member administration endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::member::{parse_member_id, CreateMember, Member, UpdateMember},
    AppState,
};

use super::{AppJson, AuthenticatedOperator};

/// Register a new member
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    security(("bearer_auth" = [])),
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member registered", body = Member),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn register_member(
    State(state): State<AppState>,
    operator: AuthenticatedOperator,
    AppJson(request): AppJson<CreateMember>,
) -> AppResult<(StatusCode, Json<Member>)> {
    let member = state
        .services
        .members
        .register(request, operator.subject())
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Get a member by ID
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Member ID (UUID)")),
    responses(
        (status = 200, description = "Member details", body = Member),
        (status = 400, description = "Invalid member ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    _operator: AuthenticatedOperator,
    Path(id): Path<String>,
) -> AppResult<Json<Member>> {
    let id = parse_member_id(&id)?;
    let member = state.services.members.get(id).await?;
    Ok(Json(member))
}

/// Update member fields
#[utoipa::path(
    put,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Member ID (UUID)")),
    request_body = UpdateMember,
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_member(
    State(state): State<AppState>,
    operator: AuthenticatedOperator,
    Path(id): Path<String>,
    AppJson(patch): AppJson<UpdateMember>,
) -> AppResult<Json<Member>> {
    let id = parse_member_id(&id)?;
    let member = state
        .services
        .members
        .update(id, patch, operator.subject())
        .await?;
    Ok(Json(member))
}

/// Deactivate a member; the member is blocked from further borrowing
#[utoipa::path(
    patch,
    path = "/members/{id}/deactivate",
    tag = "members",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Member ID (UUID)")),
    responses(
        (status = 200, description = "Member deactivated", body = Member),
        (status = 400, description = "Invalid member ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn deactivate_member(
    State(state): State<AppState>,
    operator: AuthenticatedOperator,
    Path(id): Path<String>,
) -> AppResult<Json<Member>> {
    let id = parse_member_id(&id)?;
    let member = state
        .services
        .members
        .deactivate(id, operator.subject())
        .await?;
    Ok(Json(member))
}

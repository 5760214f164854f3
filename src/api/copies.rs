//! Copy (physical item) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::copy::{Copy, CopyQuery, CreateCopy, UpdateCopy},
    AppState,
};

use super::{AppJson, AuthenticatedOperator};

/// List copies, optionally for one ISBN
#[utoipa::path(
    get,
    path = "/copies",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(CopyQuery),
    responses(
        (status = 200, description = "Copies", body = Vec<Copy>)
    )
)]
pub async fn list_copies(
    State(state): State<AppState>,
    _operator: AuthenticatedOperator,
    Query(query): Query<CopyQuery>,
) -> AppResult<Json<Vec<Copy>>> {
    let copies = state.services.catalog.list_copies(query.isbn.as_deref()).await?;
    Ok(Json(copies))
}

/// Get a copy by barcode
#[utoipa::path(
    get,
    path = "/copies/{barcode}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("barcode" = String, Path, description = "Copy barcode")),
    responses(
        (status = 200, description = "Copy details", body = Copy),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_copy(
    State(state): State<AppState>,
    _operator: AuthenticatedOperator,
    Path(barcode): Path<String>,
) -> AppResult<Json<Copy>> {
    let copy = state.services.catalog.get_copy(&barcode).await?;
    Ok(Json(copy))
}

/// Register a new copy
#[utoipa::path(
    post,
    path = "/copies",
    tag = "copies",
    security(("bearer_auth" = [])),
    request_body = CreateCopy,
    responses(
        (status = 201, description = "Copy created", body = Copy),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Barcode already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_copy(
    State(state): State<AppState>,
    operator: AuthenticatedOperator,
    AppJson(request): AppJson<CreateCopy>,
) -> AppResult<(StatusCode, Json<Copy>)> {
    let copy = state
        .services
        .catalog
        .create_copy(request, operator.subject())
        .await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Update copy fields
#[utoipa::path(
    put,
    path = "/copies/{barcode}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("barcode" = String, Path, description = "Copy barcode")),
    request_body = UpdateCopy,
    responses(
        (status = 200, description = "Copy updated", body = Copy),
        (status = 400, description = "Invalid or empty update", body = crate::error::ErrorResponse),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_copy(
    State(state): State<AppState>,
    operator: AuthenticatedOperator,
    Path(barcode): Path<String>,
    AppJson(patch): AppJson<UpdateCopy>,
) -> AppResult<Json<Copy>> {
    let copy = state
        .services
        .catalog
        .update_copy(&barcode, patch, operator.subject())
        .await?;
    Ok(Json(copy))
}

/// Delete a copy
#[utoipa::path(
    delete,
    path = "/copies/{barcode}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("barcode" = String, Path, description = "Copy barcode")),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_copy(
    State(state): State<AppState>,
    operator: AuthenticatedOperator,
    Path(barcode): Path<String>,
) -> AppResult<StatusCode> {
    state
        .services
        .catalog
        .delete_copy(&barcode, operator.subject())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

//! API handlers for the circulation REST endpoints

pub mod auth;
pub mod books;
pub mod copies;
pub mod health;
pub mod holds;
pub mod loans;
pub mod members;
pub mod metrics;
pub mod middleware;
pub mod openapi;

use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
    routing::{get, patch, post},
    RequestPartsExt, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::auth::OperatorClaims, AppState};

/// Extractor for the operator authenticated by a bearer token
pub struct AuthenticatedOperator(pub OperatorClaims);

impl AuthenticatedOperator {
    /// Identity recorded as the performer of audited actions
    pub fn subject(&self) -> &str {
        &self.0.sub
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedOperator {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Authentication("Missing or invalid authorization header".to_string()))?;

        let claims = state.services.auth.verify(bearer.token())?;
        Ok(AuthenticatedOperator(claims))
    }
}

/// JSON body extractor reporting malformed bodies as validation errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Build the application router with all routes and layers
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let deadline = Duration::from_secs(state.config.server.request_timeout_secs);

    let routes = Router::new()
        // Public
        .route("/login", post(auth::login))
        .route("/healthz", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/search", get(books::search_books))
        .route(
            "/books/:isbn",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Copies
        .route("/copies", get(copies::list_copies).post(copies::create_copy))
        .route(
            "/copies/:barcode",
            get(copies::get_copy)
                .put(copies::update_copy)
                .delete(copies::delete_copy),
        )
        // Members
        .route("/members", post(members::register_member))
        .route(
            "/members/:id",
            get(members::get_member).put(members::update_member),
        )
        .route("/members/:id/deactivate", patch(members::deactivate_member))
        // Circulation
        .route("/checkout", post(loans::checkout))
        .route("/checkin", post(loans::checkin))
        .route("/loan/renew", post(loans::renew))
        .route("/loans/overdue", get(loans::list_overdue))
        .route("/holds/place", post(holds::place_hold))
        // Reporting
        .route("/admin/metrics", get(metrics::get_metrics))
        .layer(axum::middleware::from_fn_with_state(deadline, middleware::deadline))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

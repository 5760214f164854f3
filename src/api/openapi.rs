//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, copies, health, holds, loans, members, metrics};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circulation API",
        version = "1.0.0",
        description = "Library circulation REST API: catalog, members, loans and holds",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        // Books
        books::list_books,
        books::search_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Copies
        copies::list_copies,
        copies::get_copy,
        copies::create_copy,
        copies::update_copy,
        copies::delete_copy,
        // Members
        members::register_member,
        members::get_member,
        members::update_member,
        members::deactivate_member,
        // Circulation
        loans::checkout,
        loans::checkin,
        loans::renew,
        loans::list_overdue,
        holds::place_hold,
        // Reporting
        metrics::get_metrics,
    ),
    components(
        schemas(
            // Auth
            crate::models::auth::LoginRequest,
            crate::models::auth::LoginResponse,
            // Catalog
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::copy::Copy,
            crate::models::copy::CopyStatus,
            crate::models::copy::CreateCopy,
            crate::models::copy::UpdateCopy,
            // Members
            crate::models::member::Member,
            crate::models::member::MemberTier,
            crate::models::member::CreateMember,
            crate::models::member::UpdateMember,
            // Circulation
            crate::models::loan::Loan,
            crate::models::loan::Hold,
            loans::CirculationRequest,
            loans::CheckinRequest,
            loans::CheckinResponse,
            loans::RenewResponse,
            holds::HoldResponse,
            // Reporting
            crate::services::stats::Metrics,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Operator authentication"),
        (name = "books", description = "Bibliographic records"),
        (name = "copies", description = "Physical copies"),
        (name = "members", description = "Member administration"),
        (name = "circulation", description = "Loans and holds"),
        (name = "reporting", description = "Metrics")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

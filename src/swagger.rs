use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::giveaway::create_giveaway,
        handlers::giveaway::list_giveaways,
        handlers::giveaway::my_participations,
        handlers::giveaway::get_giveaway,
        handlers::giveaway::join_by_code,
        handlers::giveaway::join_giveaway,
        handlers::giveaway::draw_giveaway,
        handlers::giveaway::get_participants,
        handlers::giveaway::get_winners,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            UserResponse,
            UserSummary,
            AuthResponse,
            CreateGiveawayRequest,
            GiveawayListQuery,
            JoinByCodeRequest,
            GiveawayResponse,
            JoinedResponse,
            ParticipantResponse,
            WinnerResponse,
            DrawnWinner,
            DrawSummary,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "giveaway", description = "Giveaway management API"),
    ),
    info(
        title = "Giveaway Backend API",
        version = "1.0.0",
        description = "Giveaway Backend REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::PrizeStatus;
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::prize::create_prize,
        handlers::prize::get_prize,
        handlers::prize::list_prizes,
        handlers::prize::update_prize_status,
        handlers::prize::delete_prize,
    ),
    components(
        schemas(
            PrizeStatus,
            CreatePrizeRequest,
            CreatePrizeResponse,
            PrizeListQuery,
            UpdatePrizeStatusRequest,
            PrizeResponse,
            DeletePrizeResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness check"),
        (name = "prizes", description = "Prize record store"),
    ),
    info(
        title = "Prize Store API",
        version = "0.1.0",
        description = "Tracks awarded gifts from creation through the claim workflow",
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

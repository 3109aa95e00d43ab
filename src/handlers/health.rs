use crate::error::AppError;
use crate::models::HealthResponse;
use crate::services::PrizeService;
use actix_web::{HttpResponse, ResponseError, Result, web};

pub const SERVICE_NAME: &str = "prize-store";

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "数据库连通", body = HealthResponse),
        (status = 503, description = "数据库不可用")
    )
)]
/// 存活检查：查询数据库当前时间；数据库不可达时返回 503，不影响进程
pub async fn health_check(service: web::Data<PrizeService>) -> Result<HttpResponse> {
    match service.ping().await {
        Ok(db_time) => Ok(HttpResponse::Ok().json(HealthResponse {
            status: "ok".to_string(),
            service: SERVICE_NAME.to_string(),
            db_time,
        })),
        Err(e) => Ok(AppError::ServiceUnavailable(e.to_string()).error_response()),
    }
}

pub fn health_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health_check));
}

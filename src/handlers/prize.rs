use crate::error::AppError;
use crate::models::*;
use crate::services::PrizeService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/prizes",
    tag = "prizes",
    request_body = CreatePrizeRequest,
    responses(
        (status = 201, description = "创建成功（prize_id 已存在时同样返回成功，原记录不变）", body = CreatePrizeResponse),
        (status = 400, description = "缺少必填字段"),
        (status = 500, description = "数据库错误")
    )
)]
/// 创建奖品，prize_id 重复时幂等忽略
pub async fn create_prize(
    service: web::Data<PrizeService>,
    payload: web::Json<CreatePrizeRequest>,
) -> Result<HttpResponse> {
    let prize = match payload.into_inner().validate() {
        Ok(prize) => prize,
        Err(e) => return Ok(e.error_response()),
    };
    let prize_id = prize.prize_id.clone();

    match service.create_prize(prize).await {
        Ok(_) => Ok(HttpResponse::Created().json(CreatePrizeResponse {
            success: true,
            prize_id,
        })),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/prizes/{prize_id}",
    tag = "prizes",
    params(
        ("prize_id" = String, Path, description = "奖品ID")
    ),
    responses(
        (status = 200, description = "奖品记录", body = PrizeResponse),
        (status = 404, description = "不存在"),
        (status = 500, description = "数据库错误")
    )
)]
pub async fn get_prize(
    service: web::Data<PrizeService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match service.get_prize(&path.into_inner()).await {
        Ok(prize) => Ok(HttpResponse::Ok().json(prize)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/prizes",
    tag = "prizes",
    params(PrizeListQuery),
    responses(
        (status = 200, description = "用户奖品列表（按创建时间倒序）", body = [PrizeResponse]),
        (status = 400, description = "缺少 user_id"),
        (status = 500, description = "数据库错误")
    )
)]
pub async fn list_prizes(
    service: web::Data<PrizeService>,
    query: web::Query<PrizeListQuery>,
) -> Result<HttpResponse> {
    let (user_id, status) = match query.into_inner().validate() {
        Ok(v) => v,
        Err(e) => return Ok(e.error_response()),
    };

    match service.list_user_prizes(user_id, status.as_deref()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(list)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/prizes/{prize_id}",
    tag = "prizes",
    params(
        ("prize_id" = String, Path, description = "奖品ID")
    ),
    request_body = UpdatePrizeStatusRequest,
    responses(
        (status = 200, description = "更新后的奖品记录", body = PrizeResponse),
        (status = 400, description = "status 缺失或不合法"),
        (status = 404, description = "不存在"),
        (status = 500, description = "数据库错误")
    )
)]
/// 更新领取状态（不校验状态流转）
pub async fn update_prize_status(
    service: web::Data<PrizeService>,
    path: web::Path<String>,
    payload: web::Json<UpdatePrizeStatusRequest>,
) -> Result<HttpResponse> {
    let (status, error_message) = match payload.into_inner().validate() {
        Ok(v) => v,
        Err(e) => return Ok(e.error_response()),
    };

    match service
        .update_status(&path.into_inner(), status, error_message)
        .await
    {
        Ok(prize) => Ok(HttpResponse::Ok().json(prize)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/prizes/{prize_id}",
    tag = "prizes",
    params(
        ("prize_id" = String, Path, description = "奖品ID")
    ),
    responses(
        (status = 200, description = "已删除", body = DeletePrizeResponse),
        (status = 404, description = "不存在或状态不是 claimed"),
        (status = 500, description = "数据库错误")
    )
)]
/// 删除已领取（claimed）的奖品
pub async fn delete_prize(
    service: web::Data<PrizeService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match service.delete_claimed(&path.into_inner()).await {
        Ok(deleted) => Ok(HttpResponse::Ok().json(DeletePrizeResponse {
            success: true,
            deleted,
        })),
        Err(e) => Ok(e.error_response()),
    }
}

/// JSON 解析失败统一按参数错误返回
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// 路由配置
pub fn prize_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/prizes")
            .app_data(json_config())
            .app_data(query_config())
            .route("", web::post().to(create_prize))
            .route("", web::get().to(list_prizes))
            .route("/{prize_id}", web::get().to(get_prize))
            .route("/{prize_id}", web::patch().to(update_prize_status))
            .route("/{prize_id}", web::delete().to(delete_prize)),
    );
}

pub mod health;
pub mod prize;

pub use health::health_config;
pub use prize::prize_config;

use actix_web::web;

/// 注册全部业务路由（健康检查 + 奖品）
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health_config).configure(prize_config);
}

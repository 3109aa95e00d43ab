use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::entities::{PrizeStatus, prize_entity};
use crate::error::{AppError, AppResult};

/// 创建奖品请求（上游中奖后调用）
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreatePrizeRequest {
    #[schema(example = "gift-20261017-0001")]
    pub prize_id: Option<String>,
    #[schema(example = "Rose")]
    pub gift_name: Option<String>,
    /// 整数或数字字符串
    #[schema(value_type = Option<i64>, example = 42)]
    pub user_id: Option<Value>,
    pub username: Option<String>,
}

/// 校验通过的待插入奖品
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrize {
    pub prize_id: String,
    pub gift_name: String,
    pub user_id: i64,
    pub username: Option<String>,
}

impl CreatePrizeRequest {
    pub fn validate(self) -> AppResult<NewPrize> {
        let prize_id = non_blank(self.prize_id);
        let gift_name = non_blank(self.gift_name);
        let user_id = self.user_id.filter(|v| !v.is_null());

        let mut missing = Vec::new();
        if prize_id.is_none() {
            missing.push("prize_id");
        }
        if gift_name.is_none() {
            missing.push("gift_name");
        }
        if user_id.is_none() {
            missing.push("user_id");
        }

        match (prize_id, gift_name, user_id) {
            (Some(prize_id), Some(gift_name), Some(user_id)) => Ok(NewPrize {
                prize_id,
                gift_name,
                user_id: parse_user_id_value(&user_id)?,
                username: self.username,
            }),
            _ => Err(AppError::ValidationError(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

/// 创建奖品响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePrizeResponse {
    pub success: bool,
    pub prize_id: String,
}

/// 按用户查询奖品
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PrizeListQuery {
    /// 用户ID（必填）
    pub user_id: Option<String>,
    /// 状态过滤，精确匹配；未知值返回空列表
    pub status: Option<String>,
}

impl PrizeListQuery {
    pub fn validate(self) -> AppResult<(i64, Option<String>)> {
        let user_id = non_blank(self.user_id)
            .ok_or_else(|| AppError::ValidationError("user_id is required".to_string()))?;
        let user_id = parse_user_id_str(&user_id)?;
        Ok((user_id, non_blank(self.status)))
    }
}

/// 更新奖品状态请求（下游领取流程调用）
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdatePrizeStatusRequest {
    #[schema(example = "claiming")]
    pub status: Option<String>,
    /// 不传则清空之前的错误信息
    pub error_message: Option<String>,
}

impl UpdatePrizeStatusRequest {
    pub fn validate(self) -> AppResult<(PrizeStatus, Option<String>)> {
        let status = self
            .status
            .as_deref()
            .and_then(|s| s.parse::<PrizeStatus>().ok())
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "status is required and must be one of: {}",
                    PrizeStatus::allowed_values()
                ))
            })?;
        Ok((status, self.error_message))
    }
}

/// 奖品完整记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PrizeResponse {
    pub prize_id: String,
    pub gift_name: String,
    pub user_id: i64,
    pub username: Option<String>,
    pub status: PrizeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub error_message: Option<String>,
}

impl From<prize_entity::Model> for PrizeResponse {
    fn from(m: prize_entity::Model) -> Self {
        PrizeResponse {
            prize_id: m.prize_id,
            gift_name: m.gift_name,
            user_id: m.user_id,
            username: m.username,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
            error_message: m.error_message,
        }
    }
}

/// 删除奖品响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletePrizeResponse {
    pub success: bool,
    pub deleted: PrizeResponse,
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "prize-store")]
    pub service: String,
    pub db_time: DateTime<Utc>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_user_id_value(value: &Value) -> AppResult<i64> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(invalid_user_id),
        Value::String(s) => parse_user_id_str(s),
        _ => Err(invalid_user_id()),
    }
}

fn parse_user_id_str(s: &str) -> AppResult<i64> {
    s.trim().parse::<i64>().map_err(|_| invalid_user_id())
}

fn invalid_user_id() -> AppError {
    AppError::ValidationError("user_id must be a 64-bit integer".to_string())
}

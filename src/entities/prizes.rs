use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// 奖品领取状态
///
/// 预期流转 pending -> claiming -> claimed / failed，但服务端不校验流转顺序，
/// 任意状态都可以覆盖任意状态。
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum PrizeStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "claiming")]
    Claiming,
    #[sea_orm(string_value = "claimed")]
    Claimed,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl PrizeStatus {
    pub const ALL: [PrizeStatus; 4] = [
        PrizeStatus::Pending,
        PrizeStatus::Claiming,
        PrizeStatus::Claimed,
        PrizeStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrizeStatus::Pending => "pending",
            PrizeStatus::Claiming => "claiming",
            PrizeStatus::Claimed => "claimed",
            PrizeStatus::Failed => "failed",
        }
    }

    /// "pending, claiming, claimed, failed"
    pub fn allowed_values() -> String {
        Self::ALL
            .iter()
            .map(PrizeStatus::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for PrizeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrizeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown prize status: {s}"))
    }
}

/// 奖品记录
/// - prize_id 由上游生成，主键，不可变
/// - status 只能是 PrizeStatus 中的四个值（表上另有 CHECK 约束）
/// - created_at / updated_at 由数据库时钟生成
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "prizes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub prize_id: String,
    pub gift_name: String,
    pub user_id: i64,
    pub username: Option<String>,
    pub status: PrizeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

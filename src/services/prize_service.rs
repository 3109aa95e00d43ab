use crate::entities::{PrizeStatus, prize_entity as prizes};
use crate::error::{AppError, AppResult};
use crate::models::{NewPrize, PrizeResponse};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Statement,
};

/// 奖品记录存储
///
/// 每个操作只发出一条 SQL，不重试；并发写入由数据库自身保证（主键约束、行锁）。
/// 插入忽略与条件删除都是单条带条件的语句，不存在先查后写的竞态窗口。
/// 进程内只构造一个实例，通过 `web::Data` 在各 worker 间共享。
pub struct PrizeService {
    pool: DatabaseConnection,
}

impl PrizeService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 检查数据库连通性，返回数据库当前时间
    pub async fn ping(&self) -> AppResult<DateTime<Utc>> {
        let stmt = Statement::from_string(
            self.pool.get_database_backend(),
            "SELECT CURRENT_TIMESTAMP AS db_time",
        );
        let row = self
            .pool
            .query_one(stmt)
            .await?
            .ok_or_else(|| AppError::InternalError("Ping returned no rows".into()))?;
        Ok(row.try_get::<DateTime<Utc>>("", "db_time")?)
    }

    /// 创建奖品；prize_id 已存在时不做任何修改（ON CONFLICT DO NOTHING）
    ///
    /// 返回是否真正插入了新行
    pub async fn create_prize(&self, prize: NewPrize) -> AppResult<bool> {
        let insert = Query::insert()
            .into_table(prizes::Entity)
            .columns([
                prizes::Column::PrizeId,
                prizes::Column::GiftName,
                prizes::Column::UserId,
                prizes::Column::Username,
                prizes::Column::Status,
            ])
            .values_panic([
                prize.prize_id.clone().into(),
                prize.gift_name.into(),
                prize.user_id.into(),
                prize.username.into(),
                PrizeStatus::Pending.as_str().into(),
            ])
            .on_conflict(
                OnConflict::column(prizes::Column::PrizeId)
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();

        let stmt = self.pool.get_database_backend().build(&insert);
        let res = self.pool.execute(stmt).await?;

        if res.rows_affected() == 0 {
            log::debug!("Prize {} already exists, create ignored", prize.prize_id);
            return Ok(false);
        }

        log::info!(
            "Created prize {} for user {}",
            prize.prize_id,
            prize.user_id
        );
        Ok(true)
    }

    pub async fn get_prize(&self, prize_id: &str) -> AppResult<PrizeResponse> {
        prizes::Entity::find_by_id(prize_id.to_owned())
            .one(&self.pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| not_found(prize_id))
    }

    /// 用户奖品列表，按创建时间倒序
    ///
    /// status 按原样精确匹配，不在枚举内的值只会查不到数据
    pub async fn list_user_prizes(
        &self,
        user_id: i64,
        status: Option<&str>,
    ) -> AppResult<Vec<PrizeResponse>> {
        let mut query = prizes::Entity::find().filter(prizes::Column::UserId.eq(user_id));
        if let Some(status) = status {
            query = query.filter(prizes::Column::Status.eq(status));
        }

        let list = query
            .order_by_desc(prizes::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 更新状态；不校验状态流转，error_message 未传时置空，updated_at 取数据库时间
    pub async fn update_status(
        &self,
        prize_id: &str,
        status: PrizeStatus,
        error_message: Option<String>,
    ) -> AppResult<PrizeResponse> {
        let update = Query::update()
            .table(prizes::Entity)
            .values([
                (prizes::Column::Status, status.as_str().into()),
                (prizes::Column::ErrorMessage, error_message.into()),
                (prizes::Column::UpdatedAt, Expr::current_timestamp().into()),
            ])
            .and_where(Expr::col(prizes::Column::PrizeId).eq(prize_id))
            .returning_all()
            .to_owned();

        let stmt = self.pool.get_database_backend().build(&update);
        let updated = prizes::Entity::find()
            .from_raw_sql(stmt)
            .one(&self.pool)
            .await?
            .ok_or_else(|| not_found(prize_id))?;

        log::info!("Prize {} status set to {}", prize_id, status);
        Ok(updated.into())
    }

    /// 仅删除 status = claimed 的记录（单条条件 DELETE）
    ///
    /// 记录不存在与状态不是 claimed 都返回 NotFound
    pub async fn delete_claimed(&self, prize_id: &str) -> AppResult<PrizeResponse> {
        let delete = Query::delete()
            .from_table(prizes::Entity)
            .and_where(Expr::col(prizes::Column::PrizeId).eq(prize_id))
            .and_where(Expr::col(prizes::Column::Status).eq(PrizeStatus::Claimed.as_str()))
            .returning_all()
            .to_owned();

        let stmt = self.pool.get_database_backend().build(&delete);
        let deleted = prizes::Entity::find()
            .from_raw_sql(stmt)
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Prize {prize_id} not found or not claimed"))
            })?;

        log::info!("Deleted claimed prize {}", prize_id);
        Ok(deleted.into())
    }
}

#[cfg(test)]
impl PrizeService {
    /// 取出 MockDatabase 记录的 SQL（反转义引号，便于断言）
    pub(crate) fn drain_sql_log(&self) -> String {
        use sea_orm::MockDatabaseTrait;

        let log = self
            .pool
            .as_mock_connection()
            .get_mocker_mutex()
            .lock()
            .unwrap()
            .drain_transaction_log();
        format!("{log:?}").replace("\\\"", "\"")
    }
}

fn not_found(prize_id: &str) -> AppError {
    AppError::NotFound(format!("Prize {prize_id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn prize(prize_id: &str, user_id: i64, status: PrizeStatus, minute: u32) -> prizes::Model {
        let created_at = Utc.with_ymd_and_hms(2026, 10, 1, 12, minute, 0).unwrap();
        prizes::Model {
            prize_id: prize_id.to_string(),
            gift_name: "Rose".to_string(),
            user_id,
            username: Some("alice".to_string()),
            status,
            created_at,
            updated_at: created_at,
            error_message: None,
        }
    }

    fn new_prize() -> NewPrize {
        NewPrize {
            prize_id: "p1".into(),
            gift_name: "Rose".into(),
            user_id: 42,
            username: None,
        }
    }

    fn service_with(db: MockDatabase) -> PrizeService {
        PrizeService::new(db.into_connection())
    }

    fn no_rows() -> Vec<prizes::Model> {
        Vec::new()
    }

    #[tokio::test]
    async fn test_ping_returns_db_time() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 8, 0, 0).unwrap();
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[BTreeMap::from([("db_time", Value::from(now))])]]),
        );

        assert_eq!(service.ping().await.unwrap(), now);
    }

    #[tokio::test]
    async fn test_ping_surfaces_store_error() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("connection refused".into())]),
        );

        assert!(matches!(
            service.ping().await,
            Err(AppError::DatabaseError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_inserts_with_on_conflict_do_nothing() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres).append_exec_results(
            [MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }],
        ));

        assert!(service.create_prize(new_prize()).await.unwrap());

        let sql = service.drain_sql_log();
        assert!(sql.contains(r#"INSERT INTO "prizes""#));
        assert!(sql.contains(r#"ON CONFLICT ("prize_id") DO NOTHING"#));
        assert!(sql.contains(r#"String(Some("pending"))"#));
    }

    #[tokio::test]
    async fn test_create_duplicate_is_not_an_error() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres).append_exec_results(
            [MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }],
        ));

        assert!(!service.create_prize(new_prize()).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_prize() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![prize("p1", 42, PrizeStatus::Pending, 0)]])
                .append_query_results([no_rows()]),
        );

        let found = service.get_prize("p1").await.unwrap();
        assert_eq!(found.prize_id, "p1");
        assert_eq!(found.status, PrizeStatus::Pending);
        assert_eq!(found.gift_name, "Rose");
        assert_eq!(found.user_id, 42);

        assert!(matches!(
            service.get_prize("missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_user_prizes_filters_by_user_and_status() {
        let rows = vec![
            prize("p2", 42, PrizeStatus::Claimed, 30),
            prize("p1", 42, PrizeStatus::Claimed, 10),
        ];
        let service =
            service_with(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([rows]));

        let list = service
            .list_user_prizes(42, Some("claimed"))
            .await
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].prize_id, "p2");

        let sql = service.drain_sql_log();
        assert!(sql.contains(r#""user_id" = $1"#));
        assert!(sql.contains(r#""status" = $2"#));
        assert!(sql.contains("BigInt(Some(42))"));
        assert!(sql.contains(r#"String(Some("claimed"))"#));
        assert!(sql.contains(r#"ORDER BY "prizes"."created_at" DESC"#));
    }

    #[tokio::test]
    async fn test_list_user_prizes_without_status_filter() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([no_rows()]),
        );

        assert!(service.list_user_prizes(42, None).await.unwrap().is_empty());

        let sql = service.drain_sql_log();
        assert!(sql.contains(r#""user_id" = $1"#));
        assert!(!sql.contains(r#""status" = $"#));
        assert!(!sql.contains("$2"));
    }

    #[tokio::test]
    async fn test_list_unknown_status_is_empty_not_error() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([no_rows()]),
        );

        let list = service.list_user_prizes(7, Some("bogus")).await.unwrap();
        assert!(list.is_empty());
        assert!(service.drain_sql_log().contains(r#"String(Some("bogus"))"#));
    }

    #[tokio::test]
    async fn test_update_status_returns_row() {
        let mut row = prize("p1", 42, PrizeStatus::Failed, 0);
        row.updated_at = row.created_at + Duration::minutes(5);
        row.error_message = Some("timeout".into());

        let service =
            service_with(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![row]]));

        let updated = service
            .update_status("p1", PrizeStatus::Failed, Some("timeout".into()))
            .await
            .unwrap();
        assert_eq!(updated.status, PrizeStatus::Failed);
        assert_eq!(updated.error_message.as_deref(), Some("timeout"));
        assert!(updated.updated_at > updated.created_at);

        let sql = service.drain_sql_log();
        assert!(sql.contains(r#"UPDATE "prizes" SET"#));
        assert!(sql.contains(r#""updated_at" = CURRENT_TIMESTAMP"#));
        assert!(sql.contains(r#""prize_id" = $3"#));
        assert!(sql.contains("RETURNING *"));
        assert!(sql.contains(r#"String(Some("timeout"))"#));
    }

    #[tokio::test]
    async fn test_update_status_clears_error_message_when_omitted() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![prize("p1", 42, PrizeStatus::Claiming, 0)]]),
        );

        let updated = service
            .update_status("p1", PrizeStatus::Claiming, None)
            .await
            .unwrap();
        assert_eq!(updated.error_message, None);

        // error_message 显式写入 NULL，而不是保持原值
        let sql = service.drain_sql_log();
        assert!(sql.contains(r#""error_message" = $2"#));
        assert!(sql.contains("String(None)"));
        assert!(sql.contains(r#"String(Some("claiming"))"#));
    }

    #[tokio::test]
    async fn test_update_status_missing_prize() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([no_rows()]),
        );

        assert!(matches!(
            service
                .update_status("missing-id", PrizeStatus::Claimed, None)
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_claimed_is_single_conditional_delete() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![prize("p1", 42, PrizeStatus::Claimed, 0)]]),
        );

        let deleted = service.delete_claimed("p1").await.unwrap();
        assert_eq!(deleted.prize_id, "p1");
        assert_eq!(deleted.status, PrizeStatus::Claimed);

        let sql = service.drain_sql_log();
        assert_eq!(sql.matches("DELETE FROM").count(), 1);
        assert!(!sql.contains("SELECT"));
        assert!(sql.contains(r#""prize_id" = $1 AND "status" = $2"#));
        assert!(sql.contains(r#"String(Some("claimed"))"#));
        assert!(sql.contains("RETURNING *"));
    }

    #[tokio::test]
    async fn test_delete_not_claimed_is_not_found() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([no_rows()]),
        );

        assert!(matches!(
            service.delete_claimed("p1").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_store_error_is_database_error() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("relation \"prizes\" does not exist".into())]),
        );

        assert!(matches!(
            service.get_prize("p1").await,
            Err(AppError::DatabaseError(_))
        ));
    }
}

use sea_orm_migration::prelude::*;

/// Prizes (awarded gifts tracked through the claim workflow)
#[derive(DeriveIden)]
enum Prizes {
    Table,
    PrizeId,
    GiftName,
    UserId,
    Username,
    Status,
    CreatedAt,
    UpdatedAt,
    ErrorMessage,
}

const STATUSES: [&str; 4] = ["pending", "claiming", "claimed", "failed"];

/// prize_id / gift_name / username 使用 text，不限制上游传入的长度
fn prizes_table() -> TableCreateStatement {
    Table::create()
        .table(Prizes::Table)
        .if_not_exists()
        .col(ColumnDef::new(Prizes::PrizeId).text().not_null().primary_key())
        .col(ColumnDef::new(Prizes::GiftName).text().not_null())
        .col(ColumnDef::new(Prizes::UserId).big_integer().not_null())
        .col(ColumnDef::new(Prizes::Username).text().null())
        .col(
            ColumnDef::new(Prizes::Status)
                .string_len(16)
                .not_null()
                .default("pending")
                .check(Expr::col(Prizes::Status).is_in(STATUSES)),
        )
        .col(
            ColumnDef::new(Prizes::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Prizes::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(ColumnDef::new(Prizes::ErrorMessage).text().null())
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Every statement is `IF NOT EXISTS`, so running this against an
/// already-initialised database changes nothing.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(prizes_table()).await?;

        // 按用户查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prizes_user_id")
                    .table(Prizes::Table)
                    .col(Prizes::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prizes_status")
                    .table(Prizes::Table)
                    .col(Prizes::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Prizes::Table).to_owned())
            .await?;

        Ok(())
    }
}

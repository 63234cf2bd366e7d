//! Create `json_routes` table.
//! One row per registered route; `content` holds JSON text for both kinds.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JsonRoutes::Table)
                    .if_not_exists()
                    .col(string_len(JsonRoutes::Route, 2048).primary_key())
                    .col(string_len(JsonRoutes::Kind, 16).not_null().default("json"))
                    .col(text(JsonRoutes::Content).not_null())
                    .col(
                        timestamp_with_time_zone(JsonRoutes::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(JsonRoutes::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(JsonRoutes::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum JsonRoutes {
    Table,
    Route,
    Kind,
    Content,
    CreatedAt,
    UpdatedAt,
}

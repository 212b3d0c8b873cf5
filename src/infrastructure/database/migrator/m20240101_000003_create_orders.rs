//! Create orders table

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::BuyerId).integer().not_null())
                    .col(ColumnDef::new(Orders::Comment).string())
                    .col(ColumnDef::new(Orders::DeliveryAddress).string().not_null())
                    .col(ColumnDef::new(Orders::TotalPrice).big_integer().not_null())
                    .col(
                        ColumnDef::new(Orders::State)
                            .string_len(20)
                            .not_null()
                            .default("Preparing"),
                    )
                    .col(
                        ColumnDef::new(Orders::IsAccepted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Orders::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::DeliveryTime).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_buyer")
                            .from(Orders::Table, Orders::BuyerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_buyer")
                    .table(Orders::Table)
                    .col(Orders::BuyerId)
                    .to_owned(),
            )
            .await?;

        // Delivery sweep and seller listings query by state
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_state")
                    .table(Orders::Table)
                    .col(Orders::State)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Orders {
    Table,
    Id,
    BuyerId,
    Comment,
    DeliveryAddress,
    TotalPrice,
    State,
    IsAccepted,
    StartTime,
    DeliveryTime,
}

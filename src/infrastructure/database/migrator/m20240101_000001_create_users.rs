//! Create users table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::FullName).string().not_null())
                    .col(ColumnDef::new(Users::BirthDate).date().not_null())
                    .col(ColumnDef::new(Users::Address).string().not_null())
                    .col(ColumnDef::new(Users::UserType).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Users::VerificationState)
                            .string_len(20)
                            .not_null()
                            .default("Accepted"),
                    )
                    .col(
                        ColumnDef::new(Users::HasFullAccess)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::Image).blob())
                    .col(
                        ColumnDef::new(Users::RegistrationTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Admin listings filter sellers by verification state
        manager
            .create_index(
                Index::create()
                    .name("idx_users_type_state")
                    .table(Users::Table)
                    .col(Users::UserType)
                    .col(Users::VerificationState)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    FullName,
    BirthDate,
    Address,
    UserType,
    VerificationState,
    HasFullAccess,
    Image,
    RegistrationTime,
}

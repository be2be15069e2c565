use sea_orm_migration::prelude::*;

use crate::m20251001_000001_create_users::Users;
use crate::m20251001_000002_create_test_dates::TestDates;

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    UserId,
    TestDateId,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookings::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Bookings::TestDateId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_user")
                            .from(Bookings::Table, Bookings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_test_date")
                            .from(Bookings::Table, Bookings::TestDateId)
                            .to(TestDates::Table, TestDates::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // one booking per user per slot
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_bookings_user_test_date")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .col(Bookings::TestDateId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_test_date")
                    .table(Bookings::Table)
                    .col(Bookings::TestDateId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Bookings::Table).to_owned())
            .await?;
        Ok(())
    }
}

use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub(crate) enum TestDates {
    Table,
    Id,
    Date,
    Time,
    MaxSpots,
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
                    .table(TestDates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestDates::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestDates::Date).date().not_null().unique_key())
                    .col(ColumnDef::new(TestDates::Time).time().null())
                    .col(
                        ColumnDef::new(TestDates::MaxSpots)
                            .integer()
                            .not_null()
                            .default(40)
                            .check(Expr::col(TestDates::MaxSpots).gte(0)),
                    )
                    .col(
                        ColumnDef::new(TestDates::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(TestDates::Table).to_owned())
            .await?;
        Ok(())
    }
}

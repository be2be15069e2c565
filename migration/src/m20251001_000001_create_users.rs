use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    Phone,
    Image,
    PassportId,
    PaymentStatus,
    Attendance,
    Proctor,
    ListeningScore,
    GvrScore,
    TotalScore,
    WritingScore,
    CefrLevel,
    SlateStatus,
    Decision,
    PaymentProvider,
    TransactionId,
    AmountPaid,
    PaymentStatusAuto,
    PaymentDate,
    IsActive,
    IsStaff,
    IsSuperuser,
    IsBachelor,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("user_decision"))
                    .values(vec![
                        Alias::new("Pass"),
                        Alias::new("Fail"),
                        Alias::new("ESL Bridge"),
                        Alias::new("ESL Full"),
                        Alias::new("Conditional ESL Full"),
                        Alias::new("Conditional Pass"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("payment_provider"))
                    .values(vec![
                        Alias::new("Payme"),
                        Alias::new("Click"),
                        Alias::new("Xazna"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("payment_status_auto"))
                    .values(vec![
                        Alias::new("Pending"),
                        Alias::new("Paid"),
                        Alias::new("Failed"),
                        Alias::new("Refunded"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Users::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Users::LastName).string_len(100).not_null())
                    .col(ColumnDef::new(Users::Phone).string_len(255).null().unique_key())
                    .col(ColumnDef::new(Users::Image).string_len(255).null())
                    .col(
                        ColumnDef::new(Users::PassportId)
                            .string_len(100)
                            .null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PaymentStatus).string_len(50).null())
                    .col(ColumnDef::new(Users::Attendance).string_len(50).null())
                    .col(ColumnDef::new(Users::Proctor).string_len(100).null())
                    .col(ColumnDef::new(Users::ListeningScore).integer().null())
                    .col(ColumnDef::new(Users::GvrScore).integer().null())
                    .col(ColumnDef::new(Users::TotalScore).integer().null())
                    .col(ColumnDef::new(Users::WritingScore).integer().null())
                    .col(ColumnDef::new(Users::CefrLevel).string_len(3).null())
                    .col(ColumnDef::new(Users::SlateStatus).string_len(50).null())
                    .col(
                        ColumnDef::new(Users::Decision)
                            .custom(Alias::new("user_decision"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::PaymentProvider)
                            .custom(Alias::new("payment_provider"))
                            .null(),
                    )
                    .col(ColumnDef::new(Users::TransactionId).string_len(255).null())
                    .col(ColumnDef::new(Users::AmountPaid).big_integer().null())
                    .col(
                        ColumnDef::new(Users::PaymentStatusAuto)
                            .custom(Alias::new("payment_status_auto"))
                            .not_null()
                            .default(Expr::cust("'Pending'::payment_status_auto")),
                    )
                    .col(
                        ColumnDef::new(Users::PaymentDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsStaff)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsSuperuser)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsBachelor)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::LastLogin)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_proctor")
                    .table(Users::Table)
                    .col(Users::Proctor)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;
        for name in ["payment_status_auto", "payment_provider", "user_decision"] {
            manager
                .drop_type(Type::drop().name(Alias::new(name)).to_owned())
                .await?;
        }
        Ok(())
    }
}

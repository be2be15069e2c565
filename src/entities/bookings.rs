use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// A user's reservation of one seat on a test date. `(user_id, test_date_id)` is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub test_date_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::test_dates::Entity",
        from = "Column::TestDateId",
        to = "super::test_dates::Column::Id",
        on_delete = "Cascade"
    )]
    TestDate,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::test_dates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestDate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

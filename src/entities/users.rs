use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Final placement or exam result decision.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_decision")]
pub enum Decision {
    #[sea_orm(string_value = "Pass")]
    #[serde(rename = "Pass")]
    Pass,
    #[sea_orm(string_value = "Fail")]
    #[serde(rename = "Fail")]
    Fail,
    #[sea_orm(string_value = "ESL Bridge")]
    #[serde(rename = "ESL Bridge")]
    EslBridge,
    #[sea_orm(string_value = "ESL Full")]
    #[serde(rename = "ESL Full")]
    EslFull,
    #[sea_orm(string_value = "Conditional ESL Full")]
    #[serde(rename = "Conditional ESL Full")]
    ConditionalEslFull,
    #[sea_orm(string_value = "Conditional Pass")]
    #[serde(rename = "Conditional Pass")]
    ConditionalPass,
}

/// Platform through which a payment was made.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_provider")]
pub enum PaymentProvider {
    #[sea_orm(string_value = "Payme")]
    Payme,
    #[sea_orm(string_value = "Click")]
    Click,
    #[sea_orm(string_value = "Xazna")]
    Xazna,
}

/// Payment status synchronized from the provider.
#[derive(
    Debug,
    Clone,
    Default,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status_auto")]
pub enum PaymentStatus {
    #[default]
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Paid")]
    Paid,
    #[sea_orm(string_value = "Failed")]
    Failed,
    #[sea_orm(string_value = "Refunded")]
    Refunded,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Pass => write!(f, "Pass"),
            Decision::Fail => write!(f, "Fail"),
            Decision::EslBridge => write!(f, "ESL Bridge"),
            Decision::EslFull => write!(f, "ESL Full"),
            Decision::ConditionalEslFull => write!(f, "Conditional ESL Full"),
            Decision::ConditionalPass => write!(f, "Conditional Pass"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub phone: Option<String>,
    pub image: Option<String>,
    #[sea_orm(unique)]
    pub passport_id: Option<String>,
    pub payment_status: Option<String>,
    pub attendance: Option<String>,
    pub proctor: Option<String>,
    pub listening_score: Option<i32>,
    pub gvr_score: Option<i32>,
    pub total_score: Option<i32>,
    pub writing_score: Option<i32>,
    pub cefr_level: Option<String>,
    pub slate_status: Option<String>,
    pub decision: Option<Decision>,
    pub payment_provider: Option<PaymentProvider>,
    pub transaction_id: Option<String>,
    pub amount_paid: Option<i64>, // cents
    pub payment_status_auto: PaymentStatus,
    pub payment_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_bachelor: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bookings::Entity")]
    Bookings,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
impl Model {
    /// A plain inactive applicant, for tests.
    pub fn sample(id: i64, email: &str) -> Self {
        Self {
            id,
            email: email.to_string(),
            password_hash: String::new(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            phone: None,
            image: None,
            passport_id: None,
            payment_status: None,
            attendance: None,
            proctor: None,
            listening_score: None,
            gvr_score: None,
            total_score: None,
            writing_score: None,
            cefr_level: None,
            slate_status: None,
            decision: None,
            payment_provider: None,
            transaction_id: None,
            amount_paid: None,
            payment_status_auto: PaymentStatus::Pending,
            payment_date: None,
            is_active: false,
            is_staff: false,
            is_superuser: false,
            is_bachelor: false,
            last_login: None,
            created_at: None,
            updated_at: None,
        }
    }
}

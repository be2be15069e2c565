use crate::entities::{Decision, PaymentProvider, PaymentStatus, user_entity};
use crate::models::{PaginationParams, format_date, format_time};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminTestDateQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// Exact date filter, `YYYY-MM-DD`
    pub date: Option<String>,
    /// Substring search over the date and time text
    pub q: Option<String>,
    /// Comma separated: `date`, `time`, `max_spots`, `booked`, `spots_left`; `-` prefix for descending
    pub ordering: Option<String>,
}

impl AdminTestDateQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.page_size)
    }
}

/// A test date annotated with its booking count. `spots_left` here is the raw
/// difference used as a sort key and may be negative.
#[derive(Debug, Clone, sea_orm::FromQueryResult)]
pub struct AdminTestDateRow {
    pub id: i64,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub max_spots: i32,
    pub booked: i64,
    pub spots_left: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminTestDateResponse {
    pub id: i64,
    #[schema(example = "2025-11-01")]
    pub date: String,
    #[schema(example = "09:30")]
    pub time: Option<String>,
    pub max_spots: i32,
    pub booked: i64,
    pub spots_left: i64,
}

impl From<AdminTestDateRow> for AdminTestDateResponse {
    fn from(row: AdminTestDateRow) -> Self {
        Self {
            id: row.id,
            date: format_date(row.date),
            time: format_time(row.time),
            max_spots: row.max_spots,
            booked: row.booked,
            spots_left: row.spots_left.max(0),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTestDateRequest {
    #[schema(example = "2025-11-01")]
    pub date: String,
    #[schema(example = "09:30")]
    pub time: Option<String>,
    #[schema(example = 40)]
    pub max_spots: Option<i32>,
}

/// Partial update. An empty `time` string clears the time.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateTestDateRequest {
    pub date: Option<String>,
    pub time: Option<String>,
    pub max_spots: Option<i32>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminBookingQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// Only bookings for this test date id
    pub test_date: Option<i64>,
    /// Substring search over the booking user's email
    pub q: Option<String>,
}

impl AdminBookingQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.page_size)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminBookingResponse {
    pub id: i64,
    pub user_id: i64,
    pub user_email: String,
    pub test_date_id: i64,
    pub test_date: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminUserQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// Substring search over first/last name, email, proctor and passport id
    pub q: Option<String>,
    pub decision: Option<Decision>,
    pub payment_status: Option<String>,
    pub proctor: Option<String>,
    pub slate_status: Option<String>,
}

impl AdminUserQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.page_size)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminUserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
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
    /// cents
    pub amount_paid: Option<i64>,
    pub payment_status_auto: PaymentStatus,
    pub payment_date: Option<DateTime<Utc>>,
    pub is_bachelor: bool,
    pub is_active: bool,
    pub is_staff: bool,
}

impl From<user_entity::Model> for AdminUserResponse {
    fn from(u: user_entity::Model) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            phone: u.phone,
            passport_id: u.passport_id,
            payment_status: u.payment_status,
            attendance: u.attendance,
            proctor: u.proctor,
            listening_score: u.listening_score,
            gvr_score: u.gvr_score,
            total_score: u.total_score,
            writing_score: u.writing_score,
            cefr_level: u.cefr_level,
            slate_status: u.slate_status,
            decision: u.decision,
            payment_provider: u.payment_provider,
            transaction_id: u.transaction_id,
            amount_paid: u.amount_paid,
            payment_status_auto: u.payment_status_auto,
            payment_date: u.payment_date,
            is_bachelor: u.is_bachelor,
            is_active: u.is_active,
            is_staff: u.is_staff,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminUpdateUserRequest {
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
    pub amount_paid: Option<i64>,
    pub payment_status_auto: Option<PaymentStatus>,
    pub payment_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignProctorRequest {
    pub user_ids: Vec<i64>,
    #[schema(example = "J. Smith")]
    pub proctor_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignProctorResponse {
    pub updated: u64,
    pub proctor_name: String,
}

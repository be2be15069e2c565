use crate::entities::test_date_entity;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: Option<NaiveTime>) -> Option<String> {
    time.map(|t| t.format(TIME_FORMAT).to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TestDateResponse {
    pub id: i64,
    #[schema(example = "2025-11-01")]
    pub date: String,
    #[schema(example = "09:30")]
    pub time: Option<String>,
    pub max_spots: i32,
    pub spots_left: i64,
    pub is_full: bool,
}

impl TestDateResponse {
    pub fn new(test_date: &test_date_entity::Model, booked: i64) -> Self {
        Self {
            id: test_date.id,
            date: format_date(test_date.date),
            time: format_time(test_date.time),
            max_spots: test_date.max_spots,
            spots_left: test_date.spots_left(booked),
            is_full: test_date.is_full(booked),
        }
    }
}

/// One of the caller's bookings, reduced to the slot it reserves.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BookingListItem {
    #[schema(example = "2025-11-01")]
    pub date: String,
    #[schema(example = "09:30")]
    pub time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    /// Id of the test date to book
    pub test_date: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    pub id: i64,
    pub test_date_info: TestDateResponse,
    #[schema(example = "2025-10-17 12:00")]
    pub created_at: String,
}

impl BookingResponse {
    pub fn new(id: i64, test_date_info: TestDateResponse, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            test_date_info,
            created_at: created_at.format(CREATED_AT_FORMAT).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_date_response_projection() {
        let model = test_date_entity::Model {
            id: 4,
            date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            time: None,
            max_spots: 2,
            created_at: None,
        };
        let resp = TestDateResponse::new(&model, 2);
        assert_eq!(resp.date, "2025-11-01");
        assert_eq!(resp.time, None);
        assert_eq!(resp.spots_left, 0);
        assert!(resp.is_full);
    }

    #[test]
    fn test_time_is_formatted_without_seconds() {
        assert_eq!(
            format_time(NaiveTime::from_hms_opt(14, 5, 59)).as_deref(),
            Some("14:05")
        );
    }
}

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::entity::prelude::*;

/// Default seat capacity of a newly created slot.
pub const DEFAULT_MAX_SPOTS: i32 = 40;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "test_dates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub max_spots: i32,
    pub created_at: Option<DateTime<Utc>>,
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

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.time {
            Some(time) => write!(f, "{} {}", self.date, time.format("%H:%M")),
            None => write!(f, "{}", self.date),
        }
    }
}

impl Model {
    /// Seats still free given the current number of bookings, floored at zero.
    pub fn spots_left(&self, booked: i64) -> i64 {
        (i64::from(self.max_spots) - booked).max(0)
    }

    pub fn is_full(&self, booked: i64) -> bool {
        self.spots_left(booked) <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(max_spots: i32) -> Model {
        Model {
            id: 1,
            date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0),
            max_spots,
            created_at: None,
        }
    }

    #[test]
    fn test_spots_left_counts_down_and_floors_at_zero() {
        let d = slot(3);
        assert_eq!(d.spots_left(0), 3);
        assert_eq!(d.spots_left(2), 1);
        assert_eq!(d.spots_left(3), 0);
        assert_eq!(d.spots_left(5), 0);
    }

    #[test]
    fn test_single_seat_slot_fills_after_one_booking() {
        let d = slot(1);
        assert!(!d.is_full(0));
        assert!(d.is_full(1));
    }

    #[test]
    fn test_display_includes_time_when_set() {
        assert_eq!(slot(1).to_string(), "2025-11-01 09:30");
        let mut d = slot(1);
        d.time = None;
        assert_eq!(d.to_string(), "2025-11-01");
    }
}

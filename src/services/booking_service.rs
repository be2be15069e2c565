use crate::entities::{
    booking_entity as bookings, test_date_entity as test_dates, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::contains_pattern;
use chrono::{NaiveDate, NaiveTime};
use sea_orm::sea_query::{Alias, Expr, ExprTrait, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, JoinType, Order, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    SqlErr, TransactionTrait,
};
use std::collections::HashMap;

const SLOT_FULL: &str = "No spots left for this date.";
const ALREADY_BOOKED: &str = "You have already booked this test date.";

#[derive(Debug, sea_orm::FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, sea_orm::FromQueryResult)]
struct BookedRow {
    test_date_id: i64,
    booked: i64,
}

/// Sort keys accepted by the admin test date listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestDateOrderKey {
    Date,
    Time,
    MaxSpots,
    Booked,
    SpotsLeft,
}

impl TestDateOrderKey {
    fn expr(self) -> SimpleExpr {
        match self {
            Self::Date => Expr::col((test_dates::Entity, test_dates::Column::Date)).into(),
            Self::Time => Expr::col((test_dates::Entity, test_dates::Column::Time)).into(),
            Self::MaxSpots => Expr::col((test_dates::Entity, test_dates::Column::MaxSpots)).into(),
            Self::Booked => Expr::col(Alias::new("booked")).into(),
            Self::SpotsLeft => Expr::col(Alias::new("spots_left")).into(),
        }
    }
}

/// Parses `date,-booked` style ordering. Empty input means date then time ascending.
pub fn parse_ordering(raw: Option<&str>) -> AppResult<Vec<(TestDateOrderKey, Order)>> {
    let mut keys = Vec::new();
    for part in raw.unwrap_or_default().split(',').map(str::trim) {
        if part.is_empty() {
            continue;
        }
        let (name, order) = match part.strip_prefix('-') {
            Some(name) => (name, Order::Desc),
            None => (part, Order::Asc),
        };
        let key = match name {
            "date" => TestDateOrderKey::Date,
            "time" => TestDateOrderKey::Time,
            "max_spots" => TestDateOrderKey::MaxSpots,
            "booked" => TestDateOrderKey::Booked,
            "spots_left" => TestDateOrderKey::SpotsLeft,
            other => {
                return Err(AppError::ValidationError(format!(
                    "Unknown ordering field \"{other}\"."
                )));
            }
        };
        keys.push((key, order));
    }
    if keys.is_empty() {
        keys.push((TestDateOrderKey::Date, Order::Asc));
        keys.push((TestDateOrderKey::Time, Order::Asc));
    }
    Ok(keys)
}

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        AppError::ValidationError("Date has wrong format. Use YYYY-MM-DD.".to_string())
    })
}

/// Accepts `HH:MM` or `HH:MM:SS`.
fn parse_time(raw: &str) -> AppResult<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppError::ValidationError("Time has wrong format. Use HH:MM.".to_string()))
}

fn validate_max_spots(max_spots: i32) -> AppResult<i32> {
    if max_spots < 1 {
        return Err(AppError::ValidationError(
            "max_spots must be at least 1.".to_string(),
        ));
    }
    Ok(max_spots)
}

fn map_test_date_write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::ValidationError("test date with this date already exists.".to_string())
        }
        _ => err.into(),
    }
}

fn invalid_test_date(id: i64) -> AppError {
    AppError::ValidationError(format!("Invalid pk \"{id}\" - object does not exist."))
}

async fn count_bookings<C: ConnectionTrait>(db: &C, test_date_id: i64) -> Result<i64, DbErr> {
    Ok(bookings::Entity::find()
        .filter(bookings::Column::TestDateId.eq(test_date_id))
        .select_only()
        .column_as(Expr::val(1).count(), "count")
        .into_model::<CountRow>()
        .one(db)
        .await?
        .map(|r| r.count)
        .unwrap_or(0))
}

#[derive(Clone)]
pub struct BookingService {
    pool: DatabaseConnection,
}

impl BookingService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Booking counts per test date, for dates that have at least one booking.
    async fn booked_counts(&self) -> AppResult<HashMap<i64, i64>> {
        let rows = bookings::Entity::find()
            .select_only()
            .column(bookings::Column::TestDateId)
            .column_as(Expr::col(bookings::Column::Id).count(), "booked")
            .group_by(bookings::Column::TestDateId)
            .into_model::<BookedRow>()
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| (r.test_date_id, r.booked)).collect())
    }

    /// Every test date with its live availability, earliest first.
    pub async fn list_test_dates(&self) -> AppResult<Vec<TestDateResponse>> {
        let dates = test_dates::Entity::find()
            .order_by_asc(test_dates::Column::Date)
            .order_by_asc(test_dates::Column::Time)
            .all(&self.pool)
            .await?;
        let counts = self.booked_counts().await?;

        Ok(dates
            .iter()
            .map(|d| TestDateResponse::new(d, counts.get(&d.id).copied().unwrap_or(0)))
            .collect())
    }

    /// The caller's bookings, most recent first.
    pub async fn list_my_bookings(&self, user_id: i64) -> AppResult<Vec<BookingListItem>> {
        let rows = bookings::Entity::find()
            .filter(bookings::Column::UserId.eq(user_id))
            .order_by_desc(bookings::Column::CreatedAt)
            .order_by_desc(bookings::Column::Id)
            .all(&self.pool)
            .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let dates: HashMap<i64, test_dates::Model> = test_dates::Entity::find()
            .filter(test_dates::Column::Id.is_in(rows.iter().map(|b| b.test_date_id)))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|d| (d.id, d))
            .collect();

        Ok(rows
            .iter()
            .filter_map(|b| dates.get(&b.test_date_id))
            .map(|d| BookingListItem {
                date: format_date(d.date),
                time: format_time(d.time),
            })
            .collect())
    }

    /// Reserves a seat. The test date row is locked for the duration of the checks
    /// so concurrent requests cannot oversell the last seat.
    pub async fn create_booking(
        &self,
        user_id: i64,
        request: CreateBookingRequest,
    ) -> AppResult<BookingResponse> {
        let txn = self.pool.begin().await?;

        let test_date = test_dates::Entity::find_by_id(request.test_date)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| invalid_test_date(request.test_date))?;

        let booked = count_bookings(&txn, test_date.id).await?;
        if test_date.is_full(booked) {
            return Err(AppError::ValidationError(SLOT_FULL.to_string()));
        }

        let existing = bookings::Entity::find()
            .filter(bookings::Column::UserId.eq(user_id))
            .filter(bookings::Column::TestDateId.eq(test_date.id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(ALREADY_BOOKED.to_string()));
        }

        let booking = bookings::ActiveModel {
            user_id: Set(user_id),
            test_date_id: Set(test_date.id),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::ValidationError(ALREADY_BOOKED.to_string())
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => invalid_test_date(request.test_date),
            _ => e.into(),
        })?;

        txn.commit().await?;

        log::info!(
            "User {user_id} booked test date {} ({})",
            test_date.id,
            test_date
        );
        Ok(BookingResponse::new(
            booking.id,
            TestDateResponse::new(&test_date, booked + 1),
            booking.created_at,
        ))
    }

    pub async fn admin_list_test_dates(
        &self,
        query: &AdminTestDateQuery,
    ) -> AppResult<PaginatedResponse<AdminTestDateResponse>> {
        let params = query.pagination();
        let ordering = parse_ordering(query.ordering.as_deref())?;

        let mut select = test_dates::Entity::find();
        if let Some(date) = query.date.as_deref().filter(|d| !d.trim().is_empty()) {
            select = select.filter(test_dates::Column::Date.eq(parse_date(date)?));
        }
        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = contains_pattern(q);
            let as_text = |column: test_dates::Column| {
                Expr::expr(Func::cast_as(
                    Expr::col((test_dates::Entity, column)),
                    Alias::new("TEXT"),
                ))
            };
            select = select.filter(
                sea_orm::Condition::any()
                    .add(as_text(test_dates::Column::Date).like(pattern.clone()))
                    .add(as_text(test_dates::Column::Time).like(pattern)),
            );
        }

        let total = select
            .clone()
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let booked = Expr::col((bookings::Entity, bookings::Column::Id)).count();
        let spots_left = Expr::col((test_dates::Entity, test_dates::Column::MaxSpots))
            .sub(Expr::col((bookings::Entity, bookings::Column::Id)).count());

        let mut select = select
            .select_only()
            .column(test_dates::Column::Id)
            .column(test_dates::Column::Date)
            .column(test_dates::Column::Time)
            .column(test_dates::Column::MaxSpots)
            .column_as(booked, "booked")
            .column_as(spots_left, "spots_left")
            .join(JoinType::LeftJoin, test_dates::Relation::Bookings.def())
            .group_by(test_dates::Column::Id);
        for (key, order) in ordering {
            select = select.order_by(key.expr(), order);
        }

        let rows = select
            .order_by_asc(test_dates::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .into_model::<AdminTestDateRow>()
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(Into::into).collect(),
            &params,
            total as u64,
        ))
    }

    pub async fn create_test_date(
        &self,
        request: CreateTestDateRequest,
    ) -> AppResult<TestDateResponse> {
        let date = parse_date(&request.date)?;
        let time = request
            .time
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(parse_time)
            .transpose()?;
        let max_spots = validate_max_spots(
            request
                .max_spots
                .unwrap_or(test_dates::DEFAULT_MAX_SPOTS),
        )?;

        let model = test_dates::ActiveModel {
            date: Set(date),
            time: Set(time),
            max_spots: Set(max_spots),
            created_at: Set(Some(chrono::Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(map_test_date_write_error)?;

        log::info!("Test date {} created ({model})", model.id);
        Ok(TestDateResponse::new(&model, 0))
    }

    pub async fn update_test_date(
        &self,
        id: i64,
        request: UpdateTestDateRequest,
    ) -> AppResult<TestDateResponse> {
        let existing = test_dates::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Test date not found".to_string()))?;

        let mut model = existing.into_active_model();
        if let Some(date) = &request.date {
            model.date = Set(parse_date(date)?);
        }
        if let Some(time) = &request.time {
            model.time = Set(match time.trim() {
                "" => None,
                t => Some(parse_time(t)?),
            });
        }
        if let Some(max_spots) = request.max_spots {
            model.max_spots = Set(validate_max_spots(max_spots)?);
        }

        let updated = model
            .update(&self.pool)
            .await
            .map_err(map_test_date_write_error)?;
        let booked = count_bookings(&self.pool, updated.id).await?;
        Ok(TestDateResponse::new(&updated, booked))
    }

    /// Deleting a test date also removes its bookings.
    pub async fn delete_test_date(&self, id: i64) -> AppResult<()> {
        let result = test_dates::Entity::delete_by_id(id).exec(&self.pool).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Test date not found".to_string()));
        }
        log::info!("Test date {id} deleted");
        Ok(())
    }

    pub async fn admin_list_bookings(
        &self,
        query: &AdminBookingQuery,
    ) -> AppResult<PaginatedResponse<AdminBookingResponse>> {
        let params = query.pagination();

        let mut select = bookings::Entity::find();
        if let Some(test_date_id) = query.test_date {
            select = select.filter(bookings::Column::TestDateId.eq(test_date_id));
        }
        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            select = select
                .join(JoinType::InnerJoin, bookings::Relation::User.def())
                .filter(
                    Expr::expr(Func::lower(Expr::col((users::Entity, users::Column::Email))))
                        .like(contains_pattern(&q.to_lowercase())),
                );
        }

        let total = select
            .clone()
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let rows = select
            .order_by_desc(bookings::Column::CreatedAt)
            .order_by_desc(bookings::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let emails: HashMap<i64, String> = if rows.is_empty() {
            HashMap::new()
        } else {
            users::Entity::find()
                .filter(users::Column::Id.is_in(rows.iter().map(|b| b.user_id)))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|u| (u.id, u.email))
                .collect()
        };
        let dates: HashMap<i64, test_dates::Model> = if rows.is_empty() {
            HashMap::new()
        } else {
            test_dates::Entity::find()
                .filter(test_dates::Column::Id.is_in(rows.iter().map(|b| b.test_date_id)))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|d| (d.id, d))
                .collect()
        };

        let data = rows
            .into_iter()
            .map(|b| AdminBookingResponse {
                id: b.id,
                user_id: b.user_id,
                user_email: emails.get(&b.user_id).cloned().unwrap_or_default(),
                test_date_id: b.test_date_id,
                test_date: dates
                    .get(&b.test_date_id)
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                created_at: b.created_at,
            })
            .collect();

        Ok(PaginatedResponse::new(data, &params, total as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn slot(id: i64, max_spots: i32) -> test_dates::Model {
        test_dates::Model {
            id,
            date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0),
            max_spots,
            created_at: None,
        }
    }

    fn booking(id: i64, user_id: i64, test_date_id: i64) -> bookings::Model {
        bookings::Model {
            id,
            user_id,
            test_date_id,
            created_at: Utc.with_ymd_and_hms(2025, 10, 17, 12, 0, 0).unwrap(),
        }
    }

    fn count(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("count", Value::BigInt(Some(n)))])
    }

    fn no_bookings() -> Vec<bookings::Model> {
        Vec::new()
    }

    fn statements(db: DatabaseConnection) -> String {
        format!("{:?}", db.into_transaction_log())
    }

    #[test]
    fn test_parse_ordering() {
        assert_eq!(
            parse_ordering(Some("-booked, date")).unwrap(),
            vec![
                (TestDateOrderKey::Booked, Order::Desc),
                (TestDateOrderKey::Date, Order::Asc)
            ]
        );
        assert_eq!(
            parse_ordering(None).unwrap(),
            vec![
                (TestDateOrderKey::Date, Order::Asc),
                (TestDateOrderKey::Time, Order::Asc)
            ]
        );
        assert!(parse_ordering(Some("password")).is_err());
    }

    #[test]
    fn test_parse_time_accepts_seconds() {
        assert_eq!(parse_time("09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(parse_time("09:30:00").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(parse_time("9.30").is_err());
    }

    #[tokio::test]
    async fn test_create_booking_succeeds_with_free_seat() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![slot(1, 40)]])
            .append_query_results([vec![count(3)]])
            .append_query_results([no_bookings()])
            .append_query_results([vec![booking(9, 5, 1)]])
            .into_connection();

        let resp = BookingService::new(db)
            .create_booking(5, CreateBookingRequest { test_date: 1 })
            .await
            .unwrap();
        assert_eq!(resp.id, 9);
        assert_eq!(resp.test_date_info.spots_left, 36);
        assert!(!resp.test_date_info.is_full);
        assert_eq!(resp.created_at, "2025-10-17 12:00");
    }

    #[tokio::test]
    async fn test_create_booking_rejects_full_slot() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![slot(1, 2)]])
            .append_query_results([vec![count(2)]])
            .into_connection();
        let service = BookingService::new(db.clone());

        let err = service
            .create_booking(5, CreateBookingRequest { test_date: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m == "No spots left for this date."));

        drop(service);
        let log = statements(db);
        assert_eq!(log.matches("INSERT INTO").count(), 0, "{log}");
        assert_eq!(log.matches("COMMIT").count(), 0, "{log}");
    }

    #[tokio::test]
    async fn test_create_booking_rejects_duplicate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![slot(1, 40)]])
            .append_query_results([vec![count(1)]])
            .append_query_results([vec![booking(3, 5, 1)]])
            .into_connection();
        let service = BookingService::new(db.clone());

        let err = service
            .create_booking(5, CreateBookingRequest { test_date: 1 })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::ValidationError(m) if m == "You have already booked this test date."
        ));

        drop(service);
        let log = statements(db);
        assert_eq!(log.matches("INSERT INTO").count(), 0, "{log}");
        assert_eq!(log.matches("COMMIT").count(), 0, "{log}");
    }

    #[tokio::test]
    async fn test_create_booking_unknown_test_date() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<test_dates::Model>::new()])
            .into_connection();

        let err = BookingService::new(db)
            .create_booking(5, CreateBookingRequest { test_date: 77 })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m.contains("\"77\"")));
    }

    #[tokio::test]
    async fn test_single_seat_slot_takes_one_booking() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // first user gets the seat
            .append_query_results([vec![slot(1, 1)]])
            .append_query_results([vec![count(0)]])
            .append_query_results([no_bookings()])
            .append_query_results([vec![booking(1, 10, 1)]])
            // second user finds it taken
            .append_query_results([vec![slot(1, 1)]])
            .append_query_results([vec![count(1)]])
            .into_connection();
        let service = BookingService::new(db.clone());

        let first = service
            .create_booking(10, CreateBookingRequest { test_date: 1 })
            .await
            .unwrap();
        assert_eq!(first.test_date_info.spots_left, 0);
        assert!(first.test_date_info.is_full);

        let second = service
            .create_booking(11, CreateBookingRequest { test_date: 1 })
            .await
            .unwrap_err();
        assert!(matches!(second, AppError::ValidationError(m) if m == SLOT_FULL));

        drop(service);
        let log = statements(db);
        assert_eq!(log.matches("INSERT INTO").count(), 1, "{log}");
        assert_eq!(log.matches("COMMIT").count(), 1, "{log}");
    }

    #[tokio::test]
    async fn test_admin_booking_search_treats_wildcards_literally() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count(0)]])
            .append_query_results([no_bookings()])
            .into_connection();
        let service = BookingService::new(db.clone());

        let page = service
            .admin_list_bookings(&AdminBookingQuery {
                q: Some(" A_B% ".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.data.is_empty());

        drop(service);
        let log = statements(db);
        assert!(log.contains(r#""%a\\_b\\%%""#), "{log}");
        assert!(log.contains("ESCAPE"), "{log}");
    }

    #[tokio::test]
    async fn test_list_test_dates_reports_availability() {
        let booked = BTreeMap::from([
            ("test_date_id", Value::BigInt(Some(2))),
            ("booked", Value::BigInt(Some(1))),
        ]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![slot(1, 40), slot(2, 1)]])
            .append_query_results([vec![booked]])
            .into_connection();

        let dates = BookingService::new(db).list_test_dates().await.unwrap();
        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0].spots_left, 40);
        assert!(!dates[0].is_full);
        assert_eq!(dates[1].spots_left, 0);
        assert!(dates[1].is_full);
    }

    #[tokio::test]
    async fn test_list_my_bookings_keeps_booking_order() {
        let mut later = slot(2, 40);
        later.date = NaiveDate::from_ymd_opt(2025, 12, 5).unwrap();
        later.time = None;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![booking(8, 5, 2), booking(4, 5, 1)]])
            .append_query_results([vec![slot(1, 40), later]])
            .into_connection();

        let items = BookingService::new(db).list_my_bookings(5).await.unwrap();
        assert_eq!(
            items,
            vec![
                BookingListItem {
                    date: "2025-12-05".into(),
                    time: None
                },
                BookingListItem {
                    date: "2025-11-01".into(),
                    time: Some("09:30".into())
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_create_test_date_rejects_zero_capacity() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = BookingService::new(db)
            .create_test_date(CreateTestDateRequest {
                date: "2025-11-01".into(),
                time: None,
                max_spots: Some(0),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_test_date_defaults_capacity() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![slot(3, test_dates::DEFAULT_MAX_SPOTS)]])
            .into_connection();
        let resp = BookingService::new(db)
            .create_test_date(CreateTestDateRequest {
                date: "2025-11-01".into(),
                time: Some("09:30".into()),
                max_spots: None,
            })
            .await
            .unwrap();
        assert_eq!(resp.max_spots, 40);
        assert_eq!(resp.spots_left, 40);
    }

    #[tokio::test]
    async fn test_delete_missing_test_date() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let err = BookingService::new(db).delete_test_date(4).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::contains_pattern;
use chrono::Utc;
use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set,
};

const NAME_MAX_LEN: usize = 100;

/// Trims a required name field and enforces its length.
pub(crate) fn clean_name(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::ValidationError(format!("{field} may not be blank.")));
    }
    if value.chars().count() > NAME_MAX_LEN {
        return Err(AppError::ValidationError(format!(
            "Ensure {field} has no more than {NAME_MAX_LEN} characters."
        )));
    }
    Ok(value.to_string())
}

/// Blank optional identity fields are stored as NULL so they never collide.
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fails with a field-specific message when another user already holds the
/// email, phone or passport id.
pub(crate) async fn ensure_unique_identity<C: ConnectionTrait>(
    db: &C,
    email: Option<&str>,
    phone: Option<&str>,
    passport_id: Option<&str>,
    exclude_id: Option<i64>,
) -> AppResult<()> {
    let mut any = Condition::any();
    let mut has_terms = false;
    if let Some(email) = email {
        any = any.add(users::Column::Email.eq(email));
        has_terms = true;
    }
    if let Some(phone) = phone {
        any = any.add(users::Column::Phone.eq(phone));
        has_terms = true;
    }
    if let Some(passport_id) = passport_id {
        any = any.add(users::Column::PassportId.eq(passport_id));
        has_terms = true;
    }
    if !has_terms {
        return Ok(());
    }

    let mut query = users::Entity::find().filter(any);
    if let Some(id) = exclude_id {
        query = query.filter(users::Column::Id.ne(id));
    }
    let clashes = query.all(db).await?;

    if let Some(email) = email
        && clashes.iter().any(|u| u.email == email)
    {
        return Err(AppError::ValidationError(
            "user with this email already exists.".to_string(),
        ));
    }
    if phone.is_some() && clashes.iter().any(|u| u.phone.as_deref() == phone) {
        return Err(AppError::ValidationError(
            "user with this phone already exists.".to_string(),
        ));
    }
    if passport_id.is_some()
        && clashes
            .iter()
            .any(|u| u.passport_id.as_deref() == passport_id)
    {
        return Err(AppError::ValidationError(
            "user with this passport id already exists.".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn find_user(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn get_profile(&self, user_id: i64) -> AppResult<UserResponse> {
        Ok(self.find_user(user_id).await?.into())
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        request: UpdateUserRequest,
    ) -> AppResult<UserResponse> {
        if request.first_name.is_none()
            && request.last_name.is_none()
            && request.phone.is_none()
            && request.passport_id.is_none()
            && request.is_bachelor.is_none()
        {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let first_name = request
            .first_name
            .as_deref()
            .map(|v| clean_name("first name", v))
            .transpose()?;
        let last_name = request
            .last_name
            .as_deref()
            .map(|v| clean_name("last name", v))
            .transpose()?;
        let phone = request.phone.map(|v| clean_optional(Some(v)));
        let passport_id = request.passport_id.map(|v| clean_optional(Some(v)));

        ensure_unique_identity(
            &self.pool,
            None,
            phone.as_ref().and_then(|p| p.as_deref()),
            passport_id.as_ref().and_then(|p| p.as_deref()),
            Some(user_id),
        )
        .await?;

        let mut model = self.find_user(user_id).await?.into_active_model();
        if let Some(v) = first_name {
            model.first_name = Set(v);
        }
        if let Some(v) = last_name {
            model.last_name = Set(v);
        }
        if let Some(v) = phone {
            model.phone = Set(v);
        }
        if let Some(v) = passport_id {
            model.passport_id = Set(v);
        }
        if let Some(v) = request.is_bachelor {
            model.is_bachelor = Set(v);
        }
        model.updated_at = Set(Some(Utc::now()));

        let updated = model.update(&self.pool).await?;
        Ok(updated.into())
    }

    /// Loads the caller and rejects anyone without staff rights.
    pub async fn require_staff(&self, user_id: i64) -> AppResult<users::Model> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("User not found".to_string()))?;
        if !user.is_active || !user.is_staff {
            return Err(AppError::Forbidden);
        }
        Ok(user)
    }

    pub async fn admin_list_users(
        &self,
        query: &AdminUserQuery,
    ) -> AppResult<PaginatedResponse<AdminUserResponse>> {
        let params = query.pagination();

        let mut select = users::Entity::find();
        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = contains_pattern(&q.to_lowercase());
            let mut any = Condition::any();
            for column in [
                users::Column::FirstName,
                users::Column::LastName,
                users::Column::Email,
                users::Column::Proctor,
                users::Column::PassportId,
            ] {
                any = any.add(Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone()));
            }
            select = select.filter(any);
        }
        if let Some(decision) = query.decision.clone() {
            select = select.filter(users::Column::Decision.eq(decision));
        }
        if let Some(v) = &query.payment_status {
            select = select.filter(users::Column::PaymentStatus.eq(v.as_str()));
        }
        if let Some(v) = &query.proctor {
            select = select.filter(users::Column::Proctor.eq(v.as_str()));
        }
        if let Some(v) = &query.slate_status {
            select = select.filter(users::Column::SlateStatus.eq(v.as_str()));
        }

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
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

        let models = select
            .order_by_desc(users::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            models.into_iter().map(Into::into).collect(),
            &params,
            total as u64,
        ))
    }

    pub async fn admin_update_user(
        &self,
        user_id: i64,
        request: AdminUpdateUserRequest,
    ) -> AppResult<AdminUserResponse> {
        for (field, score) in [
            ("listening_score", request.listening_score),
            ("gvr_score", request.gvr_score),
            ("total_score", request.total_score),
            ("writing_score", request.writing_score),
        ] {
            if score.is_some_and(|s| s < 0) {
                return Err(AppError::ValidationError(format!(
                    "{field} must be zero or greater."
                )));
            }
        }
        if request.cefr_level.as_deref().is_some_and(|c| c.chars().count() > 3) {
            return Err(AppError::ValidationError(
                "Ensure cefr_level has no more than 3 characters.".to_string(),
            ));
        }
        if request.amount_paid.is_some_and(|a| a < 0) {
            return Err(AppError::ValidationError(
                "amount_paid must be zero or greater.".to_string(),
            ));
        }

        let mut model = self.find_user(user_id).await?.into_active_model();
        if let Some(v) = request.payment_status {
            model.payment_status = Set(clean_optional(Some(v)));
        }
        if let Some(v) = request.attendance {
            model.attendance = Set(clean_optional(Some(v)));
        }
        if let Some(v) = request.proctor {
            model.proctor = Set(clean_optional(Some(v)));
        }
        if let Some(v) = request.listening_score {
            model.listening_score = Set(Some(v));
        }
        if let Some(v) = request.gvr_score {
            model.gvr_score = Set(Some(v));
        }
        if let Some(v) = request.total_score {
            model.total_score = Set(Some(v));
        }
        if let Some(v) = request.writing_score {
            model.writing_score = Set(Some(v));
        }
        if let Some(v) = request.cefr_level {
            model.cefr_level = Set(clean_optional(Some(v)));
        }
        if let Some(v) = request.slate_status {
            model.slate_status = Set(clean_optional(Some(v)));
        }
        if let Some(v) = request.decision {
            model.decision = Set(Some(v));
        }
        if let Some(v) = request.payment_provider {
            model.payment_provider = Set(Some(v));
        }
        if let Some(v) = request.transaction_id {
            model.transaction_id = Set(clean_optional(Some(v)));
        }
        if let Some(v) = request.amount_paid {
            model.amount_paid = Set(Some(v));
        }
        if let Some(v) = request.payment_status_auto {
            model.payment_status_auto = Set(v);
        }
        if let Some(v) = request.payment_date {
            model.payment_date = Set(Some(v));
        }
        if let Some(v) = request.is_active {
            model.is_active = Set(v);
        }
        if let Some(v) = request.is_staff {
            model.is_staff = Set(v);
        }
        model.updated_at = Set(Some(Utc::now()));

        let updated = model.update(&self.pool).await?;
        log::info!("Admin updated user {}", updated.id);
        Ok(updated.into())
    }

    /// Sets the same proctor on every listed user in one statement.
    pub async fn assign_proctor(
        &self,
        request: AssignProctorRequest,
    ) -> AppResult<AssignProctorResponse> {
        let proctor_name = clean_name("proctor name", &request.proctor_name)?;
        if request.user_ids.is_empty() {
            return Err(AppError::ValidationError(
                "Select at least one user.".to_string(),
            ));
        }

        let result = users::Entity::update_many()
            .col_expr(users::Column::Proctor, Expr::value(proctor_name.clone()))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.is_in(request.user_ids))
            .exec(&self.pool)
            .await?;

        log::info!(
            "Proctor \"{proctor_name}\" assigned to {} user(s)",
            result.rows_affected
        );
        Ok(AssignProctorResponse {
            updated: result.rows_affected,
            proctor_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("first name", "  Aziz ").unwrap(), "Aziz");
        assert!(clean_name("first name", "   ").is_err());
        assert!(clean_name("first name", &"x".repeat(101)).is_err());
    }

    #[test]
    fn test_clean_optional_blank_is_none() {
        assert_eq!(clean_optional(Some("  ".into())), None);
        assert_eq!(clean_optional(Some(" AB1 ".into())), Some("AB1".into()));
        assert_eq!(clean_optional(None), None);
    }

    #[tokio::test]
    async fn test_unique_identity_reports_clashing_field() {
        let mut taken = users::Model::sample(3, "other@x.com");
        taken.phone = Some("+998901112233".into());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![taken]])
            .into_connection();

        let err = ensure_unique_identity(&db, Some("me@x.com"), Some("+998901112233"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m.contains("phone")));
    }

    #[tokio::test]
    async fn test_unique_identity_without_terms_skips_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        assert!(ensure_unique_identity(&db, None, None, None, Some(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_require_staff_rejects_regular_user() {
        let mut user = users::Model::sample(1, "a@x.com");
        user.is_active = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .into_connection();

        let err = UserService::new(db).require_staff(1).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn test_require_staff_accepts_staff() {
        let mut user = users::Model::sample(1, "a@x.com");
        user.is_active = true;
        user.is_staff = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .into_connection();

        assert_eq!(UserService::new(db).require_staff(1).await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_assign_proctor_reports_updated_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();

        let resp = UserService::new(db)
            .assign_proctor(AssignProctorRequest {
                user_ids: vec![4, 5],
                proctor_name: " J. Smith ".into(),
            })
            .await
            .unwrap();
        assert_eq!(resp.updated, 2);
        assert_eq!(resp.proctor_name, "J. Smith");
    }

    #[tokio::test]
    async fn test_assign_proctor_requires_users() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = UserService::new(db)
            .assign_proctor(AssignProctorRequest {
                user_ids: vec![],
                proctor_name: "J. Smith".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}

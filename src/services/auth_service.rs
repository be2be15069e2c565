use crate::cache::CacheService;
use crate::config::CodesConfig;
use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::external::Mailer;
use crate::models::*;
use crate::services::user_service::{clean_name, clean_optional, ensure_unique_identity};
use crate::utils::*;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};

const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";
const USER_NOT_FOUND: &str = "User not found with this email.";

fn activation_key(email: &str) -> String {
    format!("activation:{email}")
}

fn password_reset_key(email: &str) -> String {
    format!("password_reset:{email}")
}

fn verification_key(email: &str) -> String {
    format!("verification:{email}")
}

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    mailer: Mailer,
    cache: CacheService,
    codes: CodesConfig,
}

impl AuthService {
    pub fn new(
        pool: DatabaseConnection,
        jwt_service: JwtService,
        mailer: Mailer,
        cache: CacheService,
        codes: CodesConfig,
    ) -> Self {
        Self {
            pool,
            jwt_service,
            mailer,
            cache,
            codes,
        }
    }

    /// Validates a sign-up and parks it in the cache until the mailed code comes back.
    /// No user row exists until [`AuthService::activate`] succeeds.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<RegisterResponse> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_password(&request.password)?;
        let first_name = clean_name("first name", &request.first_name)?;
        let last_name = clean_name("last name", &request.last_name)?;
        let phone = clean_optional(request.phone);
        let passport_id = clean_optional(request.passport_id);

        ensure_unique_identity(
            &self.pool,
            Some(&email),
            phone.as_deref(),
            passport_id.as_deref(),
            None,
        )
        .await?;

        let pending = PendingUser {
            first_name,
            last_name,
            email,
            phone,
            passport_id,
            is_bachelor: request.is_bachelor,
            password_hash: hash_password(&request.password)?,
        };
        let code = generate_six_digit_code();

        self.stage_activation(&pending, &code).await?;
        self.mailer
            .send_activation_code(&pending.email, &pending.first_name, &code)
            .await?;

        log::info!("Registration staged for {}", pending.email);
        Ok(RegisterResponse::from(&pending))
    }

    pub(crate) async fn stage_activation(&self, user: &PendingUser, code: &str) -> AppResult<()> {
        let staged = StagedActivation {
            user: user.clone(),
            activate_code: code.to_string(),
        };
        self.cache
            .set(
                &activation_key(&user.email),
                &staged,
                Some(self.codes.activation_ttl),
            )
            .await
    }

    /// Confirms a staged registration. The staged entry is consumed on success and
    /// kept on a wrong code so the user can retry until it expires.
    pub async fn activate(&self, request: ActivateRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        let key = activation_key(&email);

        let staged: StagedActivation = self.cache.get(&key).await.ok_or_else(|| {
            AppError::ValidationError("Activation data not found or expired.".to_string())
        })?;
        if staged.activate_code != request.activate_code {
            return Err(AppError::ValidationError(
                "Invalid activate code or email".to_string(),
            ));
        }

        let pending = staged.user;
        let user = match self.find_user_by_email(&email).await? {
            Some(existing) if existing.is_active => existing,
            Some(existing) => {
                let mut model = existing.into_active_model();
                model.is_active = Set(true);
                model.updated_at = Set(Some(Utc::now()));
                model.update(&self.pool).await?
            }
            None => {
                let now = Utc::now();
                users::ActiveModel {
                    email: Set(pending.email),
                    password_hash: Set(pending.password_hash),
                    first_name: Set(pending.first_name),
                    last_name: Set(pending.last_name),
                    phone: Set(pending.phone),
                    passport_id: Set(pending.passport_id),
                    is_bachelor: Set(pending.is_bachelor),
                    is_active: Set(true),
                    created_at: Set(Some(now)),
                    updated_at: Set(Some(now)),
                    ..Default::default()
                }
                .insert(&self.pool)
                .await
                .map_err(|e| match e.sql_err() {
                    Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                        AppError::ValidationError(
                            "user with this email already exists.".to_string(),
                        )
                    }
                    _ => e.into(),
                })?
            }
        };

        self.cache.delete(&key).await;
        log::info!("User {} activated", user.id);

        self.issue_tokens(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        let user = self
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::AuthError(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
        }
        if !user.is_active {
            return Err(AppError::AuthError(
                "Account is not active. Confirm your email first.".to_string(),
            ));
        }

        users::Entity::update_many()
            .col_expr(users::Column::LastLogin, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(user.id))
            .exec(&self.pool)
            .await?;

        log::info!("User {} logged in", user.id);
        self.issue_tokens(user)
    }

    pub async fn refresh_token(&self, request: RefreshRequest) -> AppResult<AccessTokenResponse> {
        let claims = self.jwt_service.verify_refresh_token(&request.refresh_token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::AuthError(INVALID_CREDENTIALS.to_string()))?;

        Ok(AccessTokenResponse {
            access_token: self.jwt_service.generate_access_token(user.id, &user.email)?,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    /// Mails a reset code; the password is only changed by [`AuthService::confirm_password_reset`].
    pub async fn request_password_reset(&self, request: EmailRequest) -> AppResult<SendCodeResponse> {
        let email = normalize_email(&request.email);
        let user = self
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::ValidationError(USER_NOT_FOUND.to_string()))?;

        let code = generate_six_digit_code();
        let ttl = self.codes.password_reset_ttl;
        self.cache
            .set(&password_reset_key(&email), &StagedCode { code: code.clone() }, Some(ttl))
            .await?;
        self.mailer.send_password_reset_code(&user.email, &code).await?;

        Ok(SendCodeResponse { expires_in: ttl })
    }

    pub async fn confirm_password_reset(&self, request: ResetPasswordConfirmRequest) -> AppResult<()> {
        let email = normalize_email(&request.email);
        let user = self
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::ValidationError(USER_NOT_FOUND.to_string()))?;

        let key = password_reset_key(&email);
        let staged: Option<StagedCode> = self.cache.get(&key).await;
        if staged.is_none_or(|s| s.code != request.activation_code) {
            return Err(AppError::ValidationError("Invalid activation code.".to_string()));
        }
        if request.new_password != request.confirm_password {
            return Err(AppError::ValidationError(
                "New password and confirm password do not match.".to_string(),
            ));
        }
        validate_password(&request.new_password)?;

        let mut model = user.into_active_model();
        model.password_hash = Set(hash_password(&request.new_password)?);
        model.updated_at = Set(Some(Utc::now()));
        let user = model.update(&self.pool).await?;

        self.cache.delete(&key).await;
        log::info!("Password reset for user {}", user.id);
        Ok(())
    }

    pub async fn send_verification_code(&self, request: EmailRequest) -> AppResult<SendCodeResponse> {
        let email = normalize_email(&request.email);
        if self.find_user_by_email(&email).await?.is_none() {
            return Err(AppError::ValidationError(USER_NOT_FOUND.to_string()));
        }

        let code = generate_six_digit_code();
        let ttl = self.codes.verification_ttl;
        self.cache
            .set(&verification_key(&email), &StagedCode { code: code.clone() }, Some(ttl))
            .await?;
        self.mailer.send_verification_code(&email, &code).await?;

        Ok(SendCodeResponse { expires_in: ttl })
    }

    /// A matching code is single use.
    pub async fn check_verification_code(&self, request: CheckVerificationCodeRequest) -> AppResult<()> {
        let email = normalize_email(&request.email);
        let key = verification_key(&email);

        let staged: StagedCode = self.cache.get(&key).await.ok_or_else(|| {
            AppError::ValidationError("Verification code not found or expired.".to_string())
        })?;
        if staged.code != request.code {
            return Err(AppError::ValidationError("Invalid verification code.".to_string()));
        }

        self.cache.delete(&key).await;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.pool)
            .await?)
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self.jwt_service.generate_access_token(user.id, &user.email)?;
        let refresh_token = self.jwt_service.generate_refresh_token(user.id, &user.email)?;
        Ok(AuthResponse {
            user: user.into(),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::fallback_only;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn service(pool: DatabaseConnection, cache: CacheService) -> AuthService {
        AuthService::new(
            pool,
            JwtService::new("test-secret", 300, 3600),
            Mailer::disabled(),
            cache,
            CodesConfig::default(),
        )
    }

    fn pending(email: &str) -> PendingUser {
        PendingUser {
            first_name: "Aziz".into(),
            last_name: "Karimov".into(),
            email: email.into(),
            phone: None,
            passport_id: Some("AA1234567".into()),
            is_bachelor: true,
            password_hash: "$2b$04$hash".into(),
        }
    }

    fn no_rows() -> Vec<users::Model> {
        Vec::new()
    }

    #[tokio::test]
    async fn test_register_stages_data_without_creating_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([no_rows()])
            .into_connection();
        let cache = fallback_only();
        let auth = service(db, cache.clone());

        let resp = auth
            .register(RegisterRequest {
                first_name: "Aziz".into(),
                last_name: "Karimov".into(),
                email: "aziz@Example.com".into(),
                phone: Some("  ".into()),
                passport_id: None,
                is_bachelor: false,
                password: "password123".into(),
            })
            .await
            .unwrap();
        assert_eq!(resp.email, "aziz@example.com");
        assert_eq!(resp.phone, None);

        let staged: StagedActivation = cache.get("activation:aziz@example.com").await.unwrap();
        assert_eq!(staged.activate_code.len(), 6);
        assert_ne!(staged.user.password_hash, "password123");
    }

    #[tokio::test]
    async fn test_register_rejects_taken_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![users::Model::sample(1, "aziz@example.com")]])
            .into_connection();
        let cache = fallback_only();
        let auth = service(db, cache.clone());

        let err = auth
            .register(RegisterRequest {
                first_name: "Aziz".into(),
                last_name: "Karimov".into(),
                email: "aziz@example.com".into(),
                phone: None,
                passport_id: None,
                is_bachelor: false,
                password: "password123".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m.contains("email")));
        let staged: Option<StagedActivation> = cache.get("activation:aziz@example.com").await;
        assert!(staged.is_none());
    }

    #[tokio::test]
    async fn test_activate_with_matching_code_creates_active_user() {
        let mut created = users::Model::sample(10, "aziz@example.com");
        created.is_active = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([no_rows()])
            .append_query_results([vec![created]])
            .into_connection();
        let cache = fallback_only();
        let auth = service(db, cache.clone());
        auth.stage_activation(&pending("aziz@example.com"), "123456")
            .await
            .unwrap();

        let resp = auth
            .activate(ActivateRequest {
                email: "aziz@example.com".into(),
                activate_code: "123456".into(),
            })
            .await
            .unwrap();
        assert_eq!(resp.user.id, 10);
        assert!(resp.user.is_active);
        assert!(!resp.access_token.is_empty());

        let staged: Option<StagedActivation> = cache.get("activation:aziz@example.com").await;
        assert!(staged.is_none());
    }

    #[tokio::test]
    async fn test_activate_reuses_existing_active_user() {
        let mut existing = users::Model::sample(7, "aziz@example.com");
        existing.is_active = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .into_connection();
        let cache = fallback_only();
        let auth = service(db.clone(), cache.clone());
        auth.stage_activation(&pending("aziz@example.com"), "123456")
            .await
            .unwrap();

        let resp = auth
            .activate(ActivateRequest {
                email: "aziz@example.com".into(),
                activate_code: "123456".into(),
            })
            .await
            .unwrap();
        assert_eq!(resp.user.id, 7);
        assert!(resp.user.is_active);
        assert!(!resp.refresh_token.is_empty());

        let staged: Option<StagedActivation> = cache.get("activation:aziz@example.com").await;
        assert!(staged.is_none());

        drop(auth);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("INSERT INTO"));
        assert!(!log.contains("UPDATE"));
    }

    #[tokio::test]
    async fn test_activate_with_wrong_code_keeps_staged_data() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let cache = fallback_only();
        let auth = service(db, cache.clone());
        auth.stage_activation(&pending("aziz@example.com"), "123456")
            .await
            .unwrap();

        let err = auth
            .activate(ActivateRequest {
                email: "aziz@example.com".into(),
                activate_code: "654321".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m == "Invalid activate code or email"));

        let staged: Option<StagedActivation> = cache.get("activation:aziz@example.com").await;
        assert!(staged.is_some());
    }

    #[tokio::test]
    async fn test_activate_without_staged_data() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let auth = service(db, fallback_only());

        let err = auth
            .activate(ActivateRequest {
                email: "ghost@example.com".into(),
                activate_code: "123456".into(),
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::ValidationError(m) if m == "Activation data not found or expired.")
        );
    }

    #[tokio::test]
    async fn test_login_rejects_inactive_account() {
        let mut user = users::Model::sample(1, "a@x.com");
        user.password_hash = hash_password("password123").unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .into_connection();

        let err = service(db, fallback_only())
            .login(LoginRequest {
                email: "a@x.com".into(),
                password: "password123".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthError(m) if m.contains("not active")));
    }

    #[tokio::test]
    async fn test_login_issues_tokens() {
        let mut user = users::Model::sample(1, "a@x.com");
        user.is_active = true;
        user.password_hash = hash_password("password123").unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let auth = service(db, fallback_only());

        let resp = auth
            .login(LoginRequest {
                email: "a@x.com".into(),
                password: "password123".into(),
            })
            .await
            .unwrap();
        let claims = auth.jwt_service.verify_refresh_token(&resp.refresh_token).unwrap();
        assert_eq!(claims.sub, "1");
    }

    #[tokio::test]
    async fn test_password_reset_requires_matching_passwords() {
        let user = users::Model::sample(1, "a@x.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .into_connection();
        let cache = fallback_only();
        cache
            .set("password_reset:a@x.com", &StagedCode { code: "111111".into() }, Some(60))
            .await
            .unwrap();

        let err = service(db, cache)
            .confirm_password_reset(ResetPasswordConfirmRequest {
                email: "a@x.com".into(),
                activation_code: "111111".into(),
                new_password: "password123".into(),
                confirm_password: "password124".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m.contains("do not match")));
    }

    #[tokio::test]
    async fn test_password_reset_rejects_wrong_code() {
        let user = users::Model::sample(1, "a@x.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .into_connection();

        let err = service(db, fallback_only())
            .confirm_password_reset(ResetPasswordConfirmRequest {
                email: "a@x.com".into(),
                activation_code: "111111".into(),
                new_password: "password123".into(),
                confirm_password: "password123".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m == "Invalid activation code."));
    }

    #[tokio::test]
    async fn test_verification_code_is_single_use() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let cache = fallback_only();
        cache
            .set("verification:a@x.com", &StagedCode { code: "222222".into() }, Some(60))
            .await
            .unwrap();
        let auth = service(db, cache);

        let check = || CheckVerificationCodeRequest {
            email: "a@x.com".into(),
            code: "222222".into(),
        };
        assert!(auth.check_verification_code(check()).await.is_ok());
        assert!(auth.check_verification_code(check()).await.is_err());
    }
}

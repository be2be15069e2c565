use crate::entities::user_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Accepts a code sent either as a JSON string or as a JSON number.
fn code_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(u64),
    }

    Ok(match Code::deserialize(deserializer)? {
        Code::Text(s) => s.trim().to_string(),
        Code::Number(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "Aziz")]
    pub first_name: String,
    #[schema(example = "Karimov")]
    pub last_name: String,
    #[schema(example = "aziz@example.com")]
    pub email: String,
    #[schema(example = "+998901234567")]
    pub phone: Option<String>,
    #[schema(example = "AA1234567")]
    pub passport_id: Option<String>,
    #[serde(default)]
    pub is_bachelor: bool,
    #[schema(example = "password123")]
    pub password: String,
}

/// Echo of an accepted registration. The password is never returned.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub passport_id: Option<String>,
    pub is_bachelor: bool,
}

/// Registration data held in the cache until the activation code is confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub passport_id: Option<String>,
    pub is_bachelor: bool,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedActivation {
    pub user: PendingUser,
    pub activate_code: String,
}

/// A short-lived code for password reset or verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedCode {
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActivateRequest {
    #[schema(example = "aziz@example.com")]
    pub email: String,
    #[serde(deserialize_with = "code_string")]
    #[schema(value_type = String, example = "123456")]
    pub activate_code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "aziz@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmailRequest {
    #[schema(example = "aziz@example.com")]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetPasswordConfirmRequest {
    pub email: String,
    #[serde(deserialize_with = "code_string")]
    #[schema(value_type = String, example = "123456")]
    pub activation_code: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckVerificationCodeRequest {
    pub email: String,
    #[serde(deserialize_with = "code_string")]
    #[schema(value_type = String, example = "123456")]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendCodeResponse {
    pub expires_in: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub passport_id: Option<String>,
    pub is_bachelor: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub passport_id: Option<String>,
    pub is_bachelor: bool,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

impl From<user_entity::Model> for UserResponse {
    fn from(user: user_entity::Model) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            image: user.image,
            passport_id: user.passport_id,
            is_bachelor: user.is_bachelor,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

impl From<&PendingUser> for RegisterResponse {
    fn from(user: &PendingUser) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            passport_id: user.passport_id.clone(),
            is_bachelor: user.is_bachelor,
        }
    }
}

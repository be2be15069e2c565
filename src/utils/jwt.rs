use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String, // "access" or "refresh"
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    refresh_token_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_expires_in: i64, refresh_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access_expires_in,
            refresh_token_expires_in: refresh_expires_in,
        }
    }

    pub fn generate_access_token(&self, user_id: i64, email: &str) -> AppResult<String> {
        self.generate(user_id, email, "access", self.access_token_expires_in)
    }

    pub fn generate_refresh_token(&self, user_id: i64, email: &str) -> AppResult<String> {
        self.generate(user_id, email, "refresh", self.refresh_token_expires_in)
    }

    fn generate(&self, user_id: i64, email: &str, token_type: &str, lifetime: i64) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(lifetime);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != "access" {
            return Err(AppError::AuthError("Invalid access token type".to_string()));
        }

        Ok(claims)
    }

    pub fn verify_refresh_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != "refresh" {
            return Err(AppError::AuthError("Invalid refresh token type".to_string()));
        }

        Ok(claims)
    }

    pub fn get_access_token_expires_in(&self) -> i64 {
        self.access_token_expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret", 300, 3600)
    }

    #[test]
    fn test_access_token_round_trip() {
        let jwt = service();
        let token = jwt.generate_access_token(7, "a@x.com").unwrap();
        let claims = jwt.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email, "a@x.com");
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let jwt = service();
        let access = jwt.generate_access_token(1, "a@x.com").unwrap();
        let refresh = jwt.generate_refresh_token(1, "a@x.com").unwrap();
        assert!(jwt.verify_refresh_token(&access).is_err());
        assert!(jwt.verify_access_token(&refresh).is_err());
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let token = JwtService::new("other", 300, 3600)
            .generate_access_token(1, "a@x.com")
            .unwrap();
        assert!(service().verify_access_token(&token).is_err());
    }
}

use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

pub fn validate_email(email: &str) -> AppResult<()> {
    if email.len() > 255 || !EMAIL_REGEX.is_match(email) {
        return Err(AppError::ValidationError(
            "Enter a valid email address.".to_string(),
        ));
    }
    Ok(())
}

/// Lowercases the domain part, leaving the local part untouched.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.uz").is_ok());
        assert!(validate_email("a@x").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" John@Example.COM "), "John@example.com");
        assert_eq!(normalize_email("plain"), "plain");
    }
}

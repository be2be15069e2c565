use crate::config::SmtpConfig;
use crate::error::{AppError, AppResult};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

#[derive(Clone)]
pub struct Mailer {
    delivery: Option<Delivery>,
}

#[derive(Clone)]
struct Delivery {
    transport: SmtpTransport,
    from: Mailbox,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> AppResult<Self> {
        if config.host.is_empty() {
            log::warn!("SMTP host not configured; outgoing mail will only be logged");
            return Ok(Self::disabled());
        }

        let from: Mailbox = format!("{} <{}>", config.sender_name, config.sender_email)
            .parse()
            .map_err(|e| AppError::ConfigError(format!("Invalid sender address: {e}")))?;

        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| AppError::ConfigError(format!("Invalid SMTP relay: {e}")))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            delivery: Some(Delivery { transport, from }),
        })
    }

    /// Logs messages instead of sending them.
    pub fn disabled() -> Self {
        Self { delivery: None }
    }

    pub async fn send(&self, to: &str, subject: &str, body: String) -> AppResult<()> {
        let Some(delivery) = self.delivery.clone() else {
            log::info!("Mail delivery disabled, dropping \"{subject}\" to {to}: {body}");
            return Ok(());
        };

        let recipient: Mailbox = to
            .parse()
            .map_err(|e| AppError::ValidationError(format!("Invalid recipient address: {e}")))?;
        let message = Message::builder()
            .from(delivery.from)
            .to(recipient)
            .subject(subject)
            .body(body)
            .map_err(|e| AppError::MailError(e.to_string()))?;

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || delivery.transport.send(&message))
            .await
            .map_err(|e| AppError::InternalError(format!("Mail task failed: {e}")))?
            .map_err(|e| AppError::MailError(e.to_string()))?;

        log::info!("Mail \"{subject}\" sent to {to}");
        Ok(())
    }

    pub async fn send_activation_code(&self, to: &str, first_name: &str, code: &str) -> AppResult<()> {
        let body = format!(
            "Hello {first_name},\n\nYour account activation code is: {code}\n\n\
             Enter it to confirm your email address.\n"
        );
        self.send(to, "Activate Your Account", body).await
    }

    pub async fn send_password_reset_code(&self, to: &str, code: &str) -> AppResult<()> {
        let body = format!(
            "Your password reset code is: {code}\n\n\
             If you did not request a password reset, you can ignore this email.\n"
        );
        self.send(to, "Password Reset Confirmation", body).await
    }

    pub async fn send_verification_code(&self, to: &str, code: &str) -> AppResult<()> {
        let body = format!("Your verification code is: {code}\n");
        self.send(to, "Your Verification Code", body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_mailer_accepts_messages() {
        let mailer = Mailer::disabled();
        assert!(mailer.send_activation_code("a@x.com", "A", "123456").await.is_ok());
    }

    #[test]
    fn test_empty_host_disables_delivery() {
        let mailer = Mailer::new(&SmtpConfig::default()).unwrap();
        assert!(mailer.delivery.is_none());
    }

    #[test]
    fn test_rejects_invalid_sender() {
        let config = SmtpConfig {
            host: "smtp.example.com".into(),
            sender_email: "not-an-address".into(),
            ..SmtpConfig::default()
        };
        assert!(Mailer::new(&config).is_err());
    }
}

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub codes: CodesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/1".to_string(),
        }
    }
}

/// Outbound mail. An empty `host` disables delivery; messages are logged instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub sender_name: String,
    pub sender_email: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: String::new(),
            password: String::new(),
            sender_name: "Aura Team".to_string(),
            sender_email: String::new(),
        }
    }
}

/// Lifetimes (seconds) of the short-lived codes staged in the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodesConfig {
    pub activation_ttl: u64,
    pub verification_ttl: u64,
    pub password_reset_ttl: u64,
}

impl Default for CodesConfig {
    fn default() -> Self {
        Self {
            activation_ttl: 1000,
            verification_ttl: 600,
            password_reset_ttl: 600,
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("Failed to parse config file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // no config file: environment variables and defaults only
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL").ok_or(
                    "DATABASE_URL is not set and no config.toml was found",
                )?;

                let codes = CodesConfig::default();
                let smtp = SmtpConfig::default();

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                        refresh_token_expires_in: get_env_parse(
                            "JWT_REFRESH_EXPIRES_IN",
                            2_592_000i64,
                        ),
                    },
                    redis: RedisConfig {
                        url: get_env("REDIS_URL").unwrap_or_else(|| RedisConfig::default().url),
                    },
                    smtp: SmtpConfig {
                        host: get_env("SMTP_HOST").unwrap_or_default(),
                        username: get_env("SMTP_USERNAME").unwrap_or_default(),
                        password: get_env("SMTP_PASSWORD").unwrap_or_default(),
                        sender_name: get_env("SMTP_SENDER_NAME").unwrap_or(smtp.sender_name),
                        sender_email: get_env("SMTP_SENDER_EMAIL").unwrap_or_default(),
                    },
                    codes: CodesConfig {
                        activation_ttl: get_env_parse("ACTIVATION_CODE_TTL", codes.activation_ttl),
                        verification_ttl: get_env_parse(
                            "VERIFICATION_CODE_TTL",
                            codes.verification_ttl,
                        ),
                        password_reset_ttl: get_env_parse(
                            "PASSWORD_RESET_CODE_TTL",
                            codes.password_reset_ttl,
                        ),
                    },
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // environment variables win over the file
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.refresh_token_expires_in = n;
        }
        if let Ok(v) = env::var("REDIS_URL") {
            config.redis.url = v;
        }
        if let Ok(v) = env::var("SMTP_HOST") {
            config.smtp.host = v;
        }
        if let Ok(v) = env::var("SMTP_USERNAME") {
            config.smtp.username = v;
        }
        if let Ok(v) = env::var("SMTP_PASSWORD") {
            config.smtp.password = v;
        }
        if let Ok(v) = env::var("SMTP_SENDER_NAME") {
            config.smtp.sender_name = v;
        }
        if let Ok(v) = env::var("SMTP_SENDER_EMAIL") {
            config.smtp.sender_email = v;
        }
        if let Ok(v) = env::var("ACTIVATION_CODE_TTL")
            && let Ok(n) = v.parse()
        {
            config.codes.activation_ttl = n;
        }
        if let Ok(v) = env::var("VERIFICATION_CODE_TTL")
            && let Ok(n) = v.parse()
        {
            config.codes.verification_ttl = n;
        }
        if let Ok(v) = env::var("PASSWORD_RESET_CODE_TTL")
            && let Ok(n) = v.parse()
        {
            config.codes.password_reset_ttl = n;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml_uses_section_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 8000

            [database]
            url = "postgres://localhost/aura"
            max_connections = 5

            [jwt]
            secret = "s"
            access_token_expires_in = 300
            refresh_token_expires_in = 86400
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.codes.activation_ttl, 1000);
        assert_eq!(config.codes.verification_ttl, 600);
        assert!(config.smtp.host.is_empty());
        assert_eq!(config.smtp.sender_name, "Aura Team");
    }
}

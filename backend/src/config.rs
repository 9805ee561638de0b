//! Runtime configuration, read from the process environment.
//!
//! A `.env` file in the working directory is loaded first when present; real
//! environment variables take precedence over it.

use log::warn;
use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_JWT_SECRET: &str = "fallback-secret-change-me";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Credentials for an account created at startup when it does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAccount {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub cors_allowed_origin: Option<String>,
    pub super_admin: Option<SeedAccount>,
    pub end_user: Option<SeedAccount>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw,
            })?,
            None => 4000,
        };

        let jwt_expires_in = match get("JWT_EXPIRES_IN") {
            Some(raw) => parse_duration(&raw).ok_or(ConfigError::Invalid {
                key: "JWT_EXPIRES_IN",
                value: raw,
            })?,
            None => Duration::from_secs(24 * 60 * 60),
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET is not set, using the built-in fallback secret");
            DEFAULT_JWT_SECRET.to_string()
        });

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            database_path: get("DATABASE_PATH").unwrap_or_else(|| "voters.sqlite".to_string()),
            jwt_secret,
            jwt_expires_in,
            cors_allowed_origin: get("CORS_ALLOWED_ORIGIN"),
            super_admin: seed_account(
                &get,
                "SUPER_ADMIN_EMAIL",
                "SUPER_ADMIN_PASSWORD",
                "superadmin@email.com",
            ),
            end_user: seed_account(&get, "END_USER_EMAIL", "END_USER_PASSWORD", "user@email.com"),
        })
    }
}

fn seed_account<G>(
    get: &G,
    email_key: &str,
    password_key: &str,
    default_email: &str,
) -> Option<SeedAccount>
where
    G: Fn(&str) -> Option<String>,
{
    let password = get(password_key)?;
    let email = get(email_key).unwrap_or_else(|| default_email.to_string());
    Some(SeedAccount {
        email: email.trim().to_lowercase(),
        password,
    })
}

/// Parses `90`, `90s`, `15m`, `24h` or `7d`.
fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (idx, c) if c.is_ascii_alphabetic() => (&raw[..idx], c),
        _ => (raw, 's'),
    };
    let amount: u64 = digits.parse().ok()?;
    let secs = match unit {
        's' => amount,
        'm' => amount.checked_mul(60)?,
        'h' => amount.checked_mul(60 * 60)?,
        'd' => amount.checked_mul(24 * 60 * 60)?,
        _ => return None,
    };
    (secs > 0).then(|| Duration::from_secs(secs))
}

//! Environment-driven application configuration.
//!
//! Centralises the handful of environment toggles so they are parsed and
//! defaulted in one place and can be tested in isolation against a mocked
//! environment.

use mockable::Env;
use tracing::warn;

use pagination::DEFAULT_PER_PAGE;

const DATABASE_URL_ENV: &str = "DATABASE_URL";
const SECRET_KEY_ENV: &str = "SECRET_KEY";
const POSTS_PER_PAGE_ENV: &str = "POSTS_PER_PAGE";
const ADMIN_EMAIL_ENV: &str = "ADMIN_EMAIL";

const DATABASE_URL_DEFAULT: &str = "app.db";
const SECRET_KEY_DEFAULT: &str = "you-will-never-guess";
const ADMIN_EMAIL_DEFAULT: &str = "admin@example.com";

/// Errors raised while validating application configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Name of the offending variable.
        name: &'static str,
        /// Raw value as received.
        value: String,
        /// Human-readable description of the accepted values.
        expected: &'static str,
    },
}

/// Application settings derived from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database path or URL.
    pub database_url: String,
    /// Key for signing password-reset tokens.
    pub secret_key: String,
    /// Page size for post feeds.
    pub posts_per_page: u32,
    /// From-address on system email.
    pub admin_email: String,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// `DATABASE_URL` and `SECRET_KEY` fall back to development defaults
    /// with a warning; `POSTS_PER_PAGE` must be numeric when present.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ConfigError> {
        let database_url = env.string(DATABASE_URL_ENV).unwrap_or_else(|| {
            warn!("DATABASE_URL not set; using local development database");
            DATABASE_URL_DEFAULT.to_owned()
        });

        let secret_key = env.string(SECRET_KEY_ENV).unwrap_or_else(|| {
            warn!("SECRET_KEY not set; using an insecure development key");
            SECRET_KEY_DEFAULT.to_owned()
        });

        let posts_per_page = match env.string(POSTS_PER_PAGE_ENV) {
            None => DEFAULT_PER_PAGE,
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: POSTS_PER_PAGE_ENV,
                value,
                expected: "a positive integer",
            })?,
        };

        let admin_email = env
            .string(ADMIN_EMAIL_ENV)
            .unwrap_or_else(|| ADMIN_EMAIL_DEFAULT.to_owned());

        Ok(Self {
            database_url,
            secret_key,
            posts_per_page,
            admin_email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::rstest;

    fn env_with(vars: Vec<(&'static str, &'static str)>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string().returning(move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned())
        });
        env
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_env(&env_with(Vec::new())).expect("defaults");
        assert_eq!(config.database_url, DATABASE_URL_DEFAULT);
        assert_eq!(config.secret_key, SECRET_KEY_DEFAULT);
        assert_eq!(config.posts_per_page, DEFAULT_PER_PAGE);
        assert_eq!(config.admin_email, ADMIN_EMAIL_DEFAULT);
    }

    #[rstest]
    fn explicit_values_win() {
        let config = AppConfig::from_env(&env_with(vec![
            ("DATABASE_URL", "/var/lib/app/app.db"),
            ("SECRET_KEY", "genuinely-secret"),
            ("POSTS_PER_PAGE", "25"),
            ("ADMIN_EMAIL", "ops@example.test"),
        ]))
        .expect("parsed");
        assert_eq!(config.database_url, "/var/lib/app/app.db");
        assert_eq!(config.secret_key, "genuinely-secret");
        assert_eq!(config.posts_per_page, 25);
        assert_eq!(config.admin_email, "ops@example.test");
    }

    #[rstest]
    fn non_numeric_page_size_is_rejected() {
        let err = AppConfig::from_env(&env_with(vec![("POSTS_PER_PAGE", "lots")]))
            .expect_err("rejected");
        assert!(matches!(err, ConfigError::InvalidEnv { name, .. } if name == "POSTS_PER_PAGE"));
    }
}

//! Server configuration, read once from the environment at startup.

use std::env;
use std::str::FromStr;

use anyhow::{Context, bail};
use devassist_auth::AuthConfig;
use devassist_db::{DbConfig, SeedAdmin};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Enables `POST /tickets/{id}/suggest`.
    pub ai_assist_enabled: bool,
    pub db: DbConfig,
    pub auth: AuthConfig,
    /// Administrator to provision at startup, if configured.
    pub seed_admin: Option<SeedAdmin>,
}

impl ServerConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET must be set")?;

        let db_defaults = DbConfig::default();
        let db = DbConfig {
            url: get("DATABASE_URL").unwrap_or(db_defaults.url),
            namespace: get("DB_NAMESPACE").unwrap_or(db_defaults.namespace),
            database: get("DB_DATABASE").unwrap_or(db_defaults.database),
            username: get("DB_USERNAME").unwrap_or(db_defaults.username),
            password: get("DB_PASSWORD").unwrap_or(db_defaults.password),
        };

        let auth_defaults = AuthConfig::default();
        let auth = AuthConfig {
            jwt_secret,
            jwt_issuer: get("JWT_ISSUER").unwrap_or(auth_defaults.jwt_issuer),
            access_token_lifetime_secs: parse_or(
                "ACCESS_TOKEN_TTL_SECS",
                get("ACCESS_TOKEN_TTL_SECS"),
                auth_defaults.access_token_lifetime_secs,
            )?,
            refresh_token_lifetime_secs: parse_or(
                "REFRESH_TOKEN_TTL_SECS",
                get("REFRESH_TOKEN_TTL_SECS"),
                auth_defaults.refresh_token_lifetime_secs,
            )?,
            pepper: get("PASSWORD_PEPPER"),
        };

        let seed_admin = match (get("SEED_ADMIN_EMAIL"), get("SEED_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedAdmin {
                email,
                password,
                name: get("SEED_ADMIN_NAME"),
            }),
            (None, None) => None,
            _ => bail!("SEED_ADMIN_EMAIL and SEED_ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            port: parse_or("PORT", get("PORT"), 3000)?,
            ai_assist_enabled: get("FEATURE_AI_ASSIST").is_some_and(|v| v == "true"),
            db,
            auth,
            seed_admin,
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {v}")),
        None => Ok(default),
    }
}

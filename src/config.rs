use std::{fmt::Display, str::FromStr};

use anyhow::Context;
use time::{macros::format_description, Date, OffsetDateTime, UtcOffset};
use tracing::info;

use crate::calc::{ConsumptionPolicy, DecimalSeparator};

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("unknown store backend: {other}"),
        }
    }
}

/// Settings that shape how feedings are derived and how days are bucketed.
#[derive(Debug, Clone)]
pub struct TrackingConfig {
    pub consumption_policy: ConsumptionPolicy,
    pub default_locale: String,
    pub local_offset: UtcOffset,
}

impl TrackingConfig {
    pub fn default_separator(&self) -> DecimalSeparator {
        DecimalSeparator::for_locale(&self.default_locale)
    }

    /// Separator for an explicit request locale, falling back to `DEFAULT_LOCALE`.
    pub fn separator_for(&self, locale: Option<&str>) -> DecimalSeparator {
        match locale {
            Some(tag) if !tag.trim().is_empty() => DecimalSeparator::for_locale(tag),
            _ => self.default_separator(),
        }
    }

    /// Offset from `utc_offset_minutes`, or the configured local offset.
    pub fn offset_for(&self, minutes: Option<i32>) -> anyhow::Result<UtcOffset> {
        match minutes {
            Some(m) => UtcOffset::from_whole_seconds(m.saturating_mul(60))
                .with_context(|| format!("utc_offset_minutes out of range: {m}")),
            None => Ok(self.local_offset),
        }
    }

    pub fn today(&self) -> Date {
        OffsetDateTime::now_utc().to_offset(self.local_offset).date()
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            consumption_policy: ConsumptionPolicy::default(),
            default_locale: "en".into(),
            local_offset: UtcOffset::UTC,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub tracking: TrackingConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store: StoreBackend = env_or("STORE_BACKEND", "postgres")?;
        let database_url = std::env::var("DATABASE_URL").ok();
        if store == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set when STORE_BACKEND=postgres");
        }

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "petfeed".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "petfeed-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", "60")?,
            refresh_ttl_minutes: env_or("JWT_REFRESH_TTL_MINUTES", "20160")?,
        };

        let tracking = TrackingConfig {
            consumption_policy: env_or("CONSUMPTION_POLICY", "refill_tracking")?,
            default_locale: std::env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".into()),
            local_offset: parse_offset(
                &std::env::var("LOCAL_UTC_OFFSET").unwrap_or_else(|_| "+00:00".into()),
            )?,
        };
        info!(
            store = ?store,
            policy = %tracking.consumption_policy,
            locale = %tracking.default_locale,
            offset = %tracking.local_offset,
            "configuration loaded"
        );

        Ok(Self {
            store,
            database_url,
            jwt,
            tracking,
        })
    }
}

fn env_or<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("invalid {key}={raw}: {e}"))
}

/// Parse `+HH:MM` / `-HH:MM`.
pub fn parse_offset(raw: &str) -> anyhow::Result<UtcOffset> {
    let format = format_description!("[offset_hour sign:mandatory]:[offset_minute]");
    UtcOffset::parse(raw.trim(), &format).with_context(|| format!("invalid UTC offset {raw}"))
}

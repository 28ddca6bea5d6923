use crate::error::{Error, Result};
use chrono::FixedOffset;
use dotenvy::dotenv;
use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub public_base_url: String,
    pub api_rps: u32,
    /// Key the rate limiter on `X-Forwarded-For` instead of the peer address.
    pub trust_forwarded_for: bool,
    pub uploads_dir: String,
    pub max_upload_bytes: usize,
    pub cors_allowed_origins: Vec<String>,
    pub outbound_timeout_secs: u64,
    pub interview: InterviewConfig,
    pub google: Option<GoogleConfig>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

/// Where and how long interview slots are placed.
#[derive(Debug, Clone)]
pub struct InterviewConfig {
    pub timezone_name: String,
    pub utc_offset: FixedOffset,
    pub slot_minutes: i64,
}

/// OAuth client used for both Calendar and Gmail.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub sender_email: String,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let utc_offset_raw = get_env_or("INTERVIEW_UTC_OFFSET", "+05:30");
        let utc_offset = parse_utc_offset(&utc_offset_raw).ok_or_else(|| {
            Error::Config(format!(
                "Invalid value for INTERVIEW_UTC_OFFSET: {}",
                utc_offset_raw
            ))
        })?;

        let google = match (
            get_env_opt("GOOGLE_CLIENT_ID"),
            get_env_opt("GOOGLE_CLIENT_SECRET"),
            get_env_opt("GOOGLE_REFRESH_TOKEN"),
            get_env_opt("GOOGLE_SENDER_EMAIL"),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token), Some(sender_email)) => {
                Some(GoogleConfig {
                    client_id,
                    client_secret,
                    refresh_token,
                    sender_email,
                })
            }
            _ => None,
        };

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env_opt("DATABASE_URL"),
            jwt_secret: get_env("JWT_SECRET")?,
            session_ttl_hours: get_env_range_or("SESSION_TTL_HOURS", 24 * 30, 1..=24 * 365)?,
            public_base_url: get_env("PUBLIC_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            api_rps: get_env_parse_or("API_RPS", 50)?,
            trust_forwarded_for: get_env_parse_or("TRUST_FORWARDED_FOR", false)?,
            uploads_dir: get_env_or("UPLOADS_DIR", "./uploads"),
            max_upload_bytes: get_env_parse_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            cors_allowed_origins: get_env_opt("CORS_ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            outbound_timeout_secs: get_env_range_or("OUTBOUND_TIMEOUT_SECS", 20, 1..=600)?,
            interview: InterviewConfig {
                timezone_name: get_env_or("INTERVIEW_TIMEZONE", "Asia/Kolkata"),
                utc_offset,
                slot_minutes: get_env_range_or("INTERVIEW_SLOT_MINUTES", 30, 1..=24 * 60)?,
            },
            google,
            gemini_api_key: get_env_opt("GEMINI_API_KEY"),
            gemini_model: get_env_or("GEMINI_MODEL", "gemini-1.5-flash"),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: Display,
{
    match get_env_opt(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
    }
}

fn get_env_range_or<T>(name: &str, default: T, range: RangeInclusive<T>) -> Result<T>
where
    T: std::str::FromStr + PartialOrd + Display,
    T::Err: Display,
{
    within(name, get_env_parse_or(name, default)?, &range)
}

fn within<T: PartialOrd + Display>(name: &str, value: T, range: &RangeInclusive<T>) -> Result<T> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(Error::Config(format!(
            "Invalid value for {}: {} is outside {}..={}",
            name,
            value,
            range.start(),
            range.end()
        )))
    }
}

/// Parses `+HH:MM` / `-HH:MM` (also `Z`) into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match raw.chars().next()? {
        '+' => (1, &raw[1..]),
        '-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

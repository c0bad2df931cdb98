use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use chrono::NaiveTime;
use chrono_tz::Tz;
use dotenvy::dotenv;

use crate::sheets::google::DEFAULT_API_BASE;

#[derive(Clone, Debug)]
pub enum StoreBackend {
    Google {
        spreadsheet_id: String,
        credentials_path: PathBuf,
        api_base: String,
        timeout: Duration,
    },
    /// Process-local spreadsheet, empty on every start.
    Memory,
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Clone, Debug)]
pub enum StorageBackend {
    Fs {
        root: String,
    },
    S3 {
        endpoint: String,
        bucket: String,
        region: String,
        access_key_id: String,
        secret_access_key: String,
    },
    Memory,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Prefix under which stored objects are publicly reachable.
    pub public_base_url: String,
    pub max_upload_bytes: usize,
}

#[derive(Clone, Debug)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub at: NaiveTime,
    pub timezone: Tz,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub api_prefix: String,
    pub store: StoreBackend,
    /// `None` disables email; notifications are only logged.
    pub smtp: Option<SmtpConfig>,
    pub storage: StorageConfig,
    pub reminder: ReminderConfig,

    pub notify_max_attempts: u32,
    pub notify_backoff: Duration,

    // Rate limiting
    pub rate_read_per_min: u32,
    pub rate_write_per_min: u32,
    pub rate_upload_per_min: u32,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

/// Reads settings from a key lookup so tests do not have to touch the process
/// environment.
struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn required(&self, name: &str) -> anyhow::Result<String> {
        self.get(name).ok_or_else(|| anyhow!("{name} must be set"))
    }

    fn or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, name: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow!("{name}: cannot parse '{raw}': {e}")),
            None => Ok(default),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let vars = Vars(lookup);

        let store = match vars.or("STORE_BACKEND", "google").to_ascii_lowercase().as_str() {
            "google" => StoreBackend::Google {
                spreadsheet_id: vars.required("SPREADSHEET_ID")?,
                credentials_path: PathBuf::from(vars.or("GOOGLE_CREDENTIALS_PATH", "credentials.json")),
                api_base: vars.or("SHEETS_API_BASE", DEFAULT_API_BASE),
                timeout: Duration::from_secs(vars.parsed("SHEETS_TIMEOUT_SECS", 30)?),
            },
            "memory" => StoreBackend::Memory,
            other => bail!("STORE_BACKEND must be 'google' or 'memory', got '{other}'"),
        };

        let smtp = match vars.get("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: vars.parsed("SMTP_PORT", 587)?,
                username: vars.required("SMTP_USERNAME")?,
                password: vars.required("SMTP_PASSWORD")?,
                from: vars.required("SMTP_FROM")?,
            }),
            None => None,
        };

        let storage_backend = match vars.or("STORAGE_BACKEND", "fs").to_ascii_lowercase().as_str() {
            "fs" => StorageBackend::Fs {
                root: vars.or("STORAGE_ROOT", "uploads"),
            },
            "s3" => StorageBackend::S3 {
                endpoint: vars.required("S3_ENDPOINT")?,
                bucket: vars.required("S3_BUCKET")?,
                region: vars.or("S3_REGION", "auto"),
                access_key_id: vars.required("S3_ACCESS_KEY_ID")?,
                secret_access_key: vars.required("S3_SECRET_ACCESS_KEY")?,
            },
            "memory" => StorageBackend::Memory,
            other => bail!("STORAGE_BACKEND must be 'fs', 's3' or 'memory', got '{other}'"),
        };
        let storage = StorageConfig {
            backend: storage_backend,
            public_base_url: vars.or("STORAGE_PUBLIC_URL", "http://localhost:8080/files"),
            max_upload_bytes: vars.parsed("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        };

        let reminder_time = vars.or("REMINDER_TIME", "21:00");
        let reminder = ReminderConfig {
            enabled: vars.parsed("REMINDER_ENABLED", true)?,
            at: NaiveTime::parse_from_str(&reminder_time, "%H:%M")
                .with_context(|| format!("REMINDER_TIME: expected HH:MM, got '{reminder_time}'"))?,
            timezone: vars
                .or("REMINDER_TIMEZONE", "Asia/Kolkata")
                .parse()
                .map_err(|e| anyhow!("REMINDER_TIMEZONE: {e}"))?,
        };

        Ok(Self {
            server_addr: vars.or("SERVER_ADDR", "127.0.0.1:8080"),
            api_prefix: vars.or("API_PREFIX", "/api"),
            store,
            smtp,
            storage,
            reminder,
            notify_max_attempts: vars.parsed("NOTIFY_MAX_ATTEMPTS", 3)?,
            notify_backoff: Duration::from_secs(vars.parsed("NOTIFY_BACKOFF_SECS", 5)?),
            rate_read_per_min: vars.parsed("RATE_READ_PER_MIN", 600)?,
            rate_write_per_min: vars.parsed("RATE_WRITE_PER_MIN", 120)?,
            rate_upload_per_min: vars.parsed("RATE_UPLOAD_PER_MIN", 20)?,
            log_dir: vars.or("LOG_DIR", "logs"),
            log_level: vars.parsed("LOG_LEVEL", tracing::Level::INFO)?,
        })
    }
}

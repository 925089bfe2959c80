use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::calendar::{CalendarKind, CalendarSource};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub events_file: PathBuf,
    pub employees_file: PathBuf,
    pub rules_file: PathBuf,
    /// Source calendars for PTO and meetings; unset IDs are simply absent.
    pub calendars: Vec<CalendarSource>,
    pub calendar_access_token: Option<String>,
    pub rollover_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let data_dir = PathBuf::from(optional_env("DATA_DIR").unwrap_or_else(|| "data".into()));
        let file_in_data = |key: &str, default: &str| {
            optional_env(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(default))
        };

        let mut calendars = Vec::new();
        if let Some(id) = optional_env("GOOGLE_PTO_CALENDAR_ID") {
            calendars.push(CalendarSource {
                id,
                kind: CalendarKind::Pto,
            });
        }
        if let Some(id) = optional_env("GOOGLE_MEETINGS_CALENDAR_ID") {
            calendars.push(CalendarSource {
                id,
                kind: CalendarKind::Meeting,
            });
        }

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            events_file: file_in_data("EVENTS_FILE", "events.json"),
            employees_file: file_in_data("EMPLOYEES_FILE", "employees.json"),
            rules_file: file_in_data("RULES_FILE", "rules.json"),
            calendars,
            calendar_access_token: optional_env("GOOGLE_CALENDAR_ACCESS_TOKEN"),
            rollover_enabled: parse_flag(optional_env("ROLLOVER_ENABLED").as_deref(), true),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank variables are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

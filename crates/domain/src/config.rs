use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Table store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Connection settings for the remote schedule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// OAuth client id presented when authenticating.
    #[serde(default)]
    pub client_id: String,
    /// Login authority URL presented when authenticating.
    #[serde(default)]
    pub authority: String,
    /// Workbook path holding the schedule table.
    #[serde(default = "d_table_path")]
    pub table_path: String,
    /// Name of the table inside the workbook.
    #[serde(default = "d_table_name")]
    pub table_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            authority: String::new(),
            table_path: d_table_path(),
            table_name: d_table_name(),
        }
    }
}

impl StoreConfig {
    /// Path of the rendered resource that downstream consumers watch.
    ///
    /// The workbook is published as JSON, so the refresh signal targets the
    /// `.json` twin of `table_path`.
    pub fn refresh_path(&self) -> String {
        match self.table_path.strip_suffix(".xlsx") {
            Some(stem) => format!("{stem}.json"),
            None => self.table_path.clone(),
        }
    }
}

fn d_table_path() -> String {
    "/.helix/crontab.xlsx".into()
}

fn d_table_name() -> String {
    "jobs".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scheduling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Scheduling behaviour: site identity, viewer timezone, edit horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Origin that published paths are joined against, e.g. `https://news.example.com`.
    #[serde(default)]
    pub site_origin: String,
    /// IANA timezone the viewer's wall-clock times are interpreted in.
    #[serde(default = "d_timezone")]
    pub timezone: String,
    /// Minimum lead time before a scheduled instant, in minutes. Edits
    /// inside this horizon race the table poller and are blocked.
    #[serde(default = "d_lead_time_minutes")]
    pub lead_time_minutes: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            site_origin: String::new(),
            timezone: d_timezone(),
            lead_time_minutes: d_lead_time_minutes(),
        }
    }
}

impl ScheduleConfig {
    /// Clamp `lead_time_minutes` to at least one minute.
    pub fn clamped(&self) -> Self {
        Self {
            lead_time_minutes: self.lead_time_minutes.max(1),
            ..self.clone()
        }
    }
}

fn d_timezone() -> String {
    "UTC".into()
}

fn d_lead_time_minutes() -> u64 {
    10
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.schedule.site_origin.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "schedule.site_origin".into(),
                message: "site_origin must not be empty".into(),
            });
        } else {
            match url::Url::parse(&self.schedule.site_origin) {
                Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
                Ok(u) => errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "schedule.site_origin".into(),
                    message: format!("unsupported scheme {:?} (use http or https)", u.scheme()),
                }),
                Err(e) => errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "schedule.site_origin".into(),
                    message: format!("not an absolute URL: {e}"),
                }),
            }
        }

        if self.schedule.timezone.parse::<chrono_tz::Tz>().is_err() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "schedule.timezone".into(),
                message: format!(
                    "invalid timezone {:?} — use IANA names like 'America/New_York' or 'UTC'",
                    self.schedule.timezone
                ),
            });
        }

        if self.schedule.lead_time_minutes == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "schedule.lead_time_minutes".into(),
                message: "lead time of 0 is clamped to 1 minute".into(),
            });
        }

        if self.store.table_path.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "store.table_path".into(),
                message: "table_path must not be empty".into(),
            });
        }

        if self.store.table_name.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "store.table_name".into(),
                message: "table_name must not be empty".into(),
            });
        }

        // Auth settings may legitimately be blank for in-process stores.
        if self.store.client_id.is_empty() || self.store.authority.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "store".into(),
                message: "client_id/authority are empty; remote stores will fail to authenticate"
                    .into(),
            });
        }

        errors
    }
}

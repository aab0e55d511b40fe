// src/config.rs

//! Environment-derived application configuration.
//!
//! Every option has a default; the only way startup fails is an integer,
//! boolean, or URL value that does not coerce.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AppError, Result};

/// Which piece of page state the watcher tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    /// The "Senast uppdaterad / granskad" date on the page.
    UpdatedDate,

    /// The list under the "Senaste publicerade ändringar" heading.
    ChangeList,
}

impl WatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchMode::UpdatedDate => "updated-date",
            WatchMode::ChangeList => "change-list",
        }
    }
}

impl FromStr for WatchMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "updated-date" | "date" => Ok(WatchMode::UpdatedDate),
            "change-list" | "changes" => Ok(WatchMode::ChangeList),
            other => Err(AppError::config(format!(
                "unknown watch mode '{other}' (expected 'updated-date' or 'change-list')"
            ))),
        }
    }
}

/// Root application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Polling behavior and page settings
    pub watch: WatchConfig,

    /// Outbound mail settings
    pub smtp: SmtpConfig,
}

/// Polling behavior and page settings.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Page to poll
    pub target_url: String,

    /// Loop delay in whole seconds
    pub poll_seconds: u64,

    /// Path to the persisted state document
    pub state_file: PathBuf,

    /// Which extraction/diff flavor runs
    pub mode: WatchMode,
}

/// Outbound mail transport and envelope settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Mail relay host
    pub host: String,

    /// Mail relay port
    pub port: u16,

    /// Auth username
    pub username: String,

    /// Auth password
    pub password: String,

    /// true = STARTTLS upgrade, false = implicit TLS from the start
    pub use_starttls: bool,

    /// Envelope sender
    pub from_email: String,

    /// Envelope recipients
    pub to_emails: Vec<String>,

    /// Literal tag prepended to notification subjects
    pub subject_prefix: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target_url = get("TARGET_URL").unwrap_or_else(defaults::target_url);
        url::Url::parse(&target_url)
            .map_err(|e| AppError::config(format!("TARGET_URL '{target_url}' is not a URL: {e}")))?;

        let state_name = get("STATE_FILE").unwrap_or_else(defaults::state_file);

        let mode = match get("WATCH_MODE") {
            Some(raw) => raw.parse()?,
            None => WatchMode::UpdatedDate,
        };

        let watch = WatchConfig {
            target_url,
            poll_seconds: parse_var(&get, "POLL_SECONDS", defaults::POLL_SECONDS)?,
            state_file: resolve_state_path(&state_name),
            mode,
        };

        let smtp = SmtpConfig {
            host: get("SMTP_HOST").unwrap_or_else(defaults::smtp_host),
            port: parse_var(&get, "SMTP_PORT", defaults::SMTP_PORT)?,
            username: get("SMTP_USER").unwrap_or_default(),
            password: get("SMTP_PASS").unwrap_or_default(),
            use_starttls: parse_bool_var(&get, "SMTP_USE_TLS", true)?,
            from_email: get("FROM_EMAIL").unwrap_or_default(),
            to_emails: split_recipients(&get("TO_EMAILS").unwrap_or_default()),
            subject_prefix: get("SUBJECT_PREFIX").unwrap_or_else(defaults::subject_prefix),
        };

        Ok(Self { watch, smtp })
    }
}

/// Parse an optional variable with `FromStr`, failing with a config error.
fn parse_var<T, F>(get: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("invalid {key} '{raw}': {e}"))),
        None => Ok(default),
    }
}

/// Parse an optional boolean variable accepting 1/true/yes and 0/false/no,
/// case-insensitively.
fn parse_bool_var<F>(get: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(AppError::config(format!(
                "invalid {key} '{raw}': expected one of 1/true/yes/0/false/no"
            ))),
        },
        None => Ok(default),
    }
}

/// Split a comma-separated recipient list, dropping empty fragments.
fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve the state file path.
///
/// A bare filename lands next to the running executable, so the watcher
/// keeps its state where it is deployed regardless of the working
/// directory it was launched from. Absolute paths are taken as-is.
fn resolve_state_path(name: &str) -> PathBuf {
    let path = Path::new(name);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(path)))
        .unwrap_or_else(|| path.to_path_buf())
}

mod defaults {
    pub const POLL_SECONDS: u64 = 600;
    pub const SMTP_PORT: u16 = 587;

    pub fn target_url() -> String {
        "https://bransch.trafikverket.se/for-dig-i-branschen/jarnvag/Underlag-till-linjebok/Andringar-i-linjebok/".into()
    }

    pub fn state_file() -> String {
        "page_state.json".into()
    }

    pub fn smtp_host() -> String {
        "smtp.gmail.com".into()
    }

    pub fn subject_prefix() -> String {
        "[Linjebok Watch]".into()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(config.watch.poll_seconds, 600);
        assert_eq!(config.watch.mode, WatchMode::UpdatedDate);
        assert!(config.watch.target_url.contains("trafikverket.se"));
        assert_eq!(config.smtp.host, "smtp.gmail.com");
        assert_eq!(config.smtp.port, 587);
        assert!(config.smtp.use_starttls);
        assert_eq!(config.smtp.subject_prefix, "[Linjebok Watch]");
        assert!(config.smtp.to_emails.is_empty());
    }

    #[test]
    fn poll_seconds_overrides_and_rejects_garbage() {
        let config = Config::from_vars(vars(&[("POLL_SECONDS", "30")])).unwrap();
        assert_eq!(config.watch.poll_seconds, 30);

        let err = Config::from_vars(vars(&[("POLL_SECONDS", "soon")]));
        assert!(matches!(err, Err(AppError::Config(_))));
    }

    #[test]
    fn bool_coercion_accepts_documented_spellings() {
        for raw in ["1", "true", "YES", "True"] {
            let config = Config::from_vars(vars(&[("SMTP_USE_TLS", raw)])).unwrap();
            assert!(config.smtp.use_starttls, "{raw} should coerce to true");
        }
        for raw in ["0", "false", "NO"] {
            let config = Config::from_vars(vars(&[("SMTP_USE_TLS", raw)])).unwrap();
            assert!(!config.smtp.use_starttls, "{raw} should coerce to false");
        }
        let err = Config::from_vars(vars(&[("SMTP_USE_TLS", "maybe")]));
        assert!(matches!(err, Err(AppError::Config(_))));
    }

    #[test]
    fn watch_mode_parses_both_flavors() {
        assert_eq!(
            "updated-date".parse::<WatchMode>().unwrap(),
            WatchMode::UpdatedDate
        );
        assert_eq!(
            "Change-List".parse::<WatchMode>().unwrap(),
            WatchMode::ChangeList
        );
        assert!("weekly-digest".parse::<WatchMode>().is_err());
    }

    #[test]
    fn recipients_split_on_commas() {
        let config =
            Config::from_vars(vars(&[("TO_EMAILS", "a@example.com, b@example.com,,")])).unwrap();
        assert_eq!(config.smtp.to_emails, vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn invalid_target_url_is_fatal() {
        let err = Config::from_vars(vars(&[("TARGET_URL", "not a url")]));
        assert!(matches!(err, Err(AppError::Config(_))));
    }

    #[test]
    fn absolute_state_file_is_kept_verbatim() {
        let config = Config::from_vars(vars(&[("STATE_FILE", "/var/lib/watch/state.json")])).unwrap();
        assert_eq!(
            config.watch.state_file,
            PathBuf::from("/var/lib/watch/state.json")
        );
    }
}

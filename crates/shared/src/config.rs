use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Utc};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::sources::{default_feed_sources, ArxivSettings, FeedSource};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const START_DATE_VAR: &str = "REPORT_START_DATE";
pub const END_DATE_VAR: &str = "REPORT_END_DATE";
pub const LANGUAGE_VAR: &str = "REPORT_LANGUAGE";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Inclusive publish-date window for collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn trailing_days(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: now - Duration::days(days),
            end: now,
        }
    }

    /// Resolve the optional date boundaries. Start counts from 00:00 UTC, end runs through 23:59:59 UTC.
    pub fn from_bounds(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<Self, ConfigError> {
        let end_of = |date: NaiveDate| {
            date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
                .and_utc()
        };
        let start_of = |date: NaiveDate| date.and_time(NaiveTime::MIN).and_utc();

        match (start, end) {
            (None, None) => Ok(Self::trailing_days(now, DEFAULT_WINDOW_DAYS)),
            (Some(start), None) => {
                if start_of(start) > now {
                    return Err(ConfigError::InvalidWindow {
                        start,
                        end: now.date_naive(),
                    });
                }
                Ok(Self {
                    start: start_of(start),
                    end: now,
                })
            }
            (None, Some(end)) => Ok(Self {
                start: start_of(end) - Duration::days(DEFAULT_WINDOW_DAYS),
                end: end_of(end),
            }),
            (Some(start), Some(end)) => {
                if start > end {
                    return Err(ConfigError::InvalidWindow { start, end });
                }
                Ok(Self {
                    start: start_of(start),
                    end: end_of(end),
                })
            }
        }
    }

    /// Items with no usable timestamp are always in range.
    pub fn contains(&self, published: Option<DateTime<Utc>>) -> bool {
        match published {
            Some(ts) => ts >= self.start && ts <= self.end,
            None => true,
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Fixed politeness sleeps between sequential requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub between_feeds: std::time::Duration,
    pub between_arxiv_queries: std::time::Duration,
    pub between_model_calls: std::time::Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            between_feeds: std::time::Duration::from_secs(1),
            between_arxiv_queries: std::time::Duration::from_secs(3),
            between_model_calls: std::time::Duration::from_secs(2),
        }
    }
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            between_feeds: std::time::Duration::ZERO,
            between_arxiv_queries: std::time::Duration::ZERO,
            between_model_calls: std::time::Duration::ZERO,
        }
    }
}

/// Everything a run needs, assembled once at start-up and handed to each stage.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub report_language: String,
    pub window: DateWindow,
    pub run_date: NaiveDate,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub feeds: Vec<FeedSource>,
    pub arxiv: ArxivSettings,
    pub pacing: Pacing,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let config = Self::from_lookup(|key| env::var(key).ok(), Utc::now())?;
        Ok(config)
    }

    /// Build a config from any key lookup. `now` anchors the default window.
    pub fn from_lookup<F>(lookup: F, now: DateTime<Utc>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let start = parse_date_var(START_DATE_VAR, non_empty(START_DATE_VAR))?;
        let end = parse_date_var(END_DATE_VAR, non_empty(END_DATE_VAR))?;
        let window = DateWindow::from_bounds(start, end, now)?;

        Ok(Self {
            gemini_api_key: non_empty(API_KEY_VAR).map(|v| v.trim().to_string()),
            gemini_model: non_empty(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: GEMINI_API_BASE.to_string(),
            report_language: non_empty(LANGUAGE_VAR).unwrap_or_else(|| "English".to_string()),
            window,
            run_date: now.with_timezone(&Local).date_naive(),
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            feeds: default_feed_sources(),
            arxiv: ArxivSettings::default(),
            pacing: Pacing::default(),
        })
    }

    /// The model credential, or the configuration error that names it.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.gemini_api_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential { var: API_KEY_VAR })
    }

    pub fn raw_news_path(&self) -> PathBuf {
        self.data_dir.join("raw_news.json")
    }

    pub fn report_path(&self) -> PathBuf {
        self.data_dir.join("analyzed_report.json")
    }

    /// Dated artifact path in the output directory, e.g. `space_report_20261014.pdf`.
    pub fn artifact_path(&self, extension: &str) -> PathBuf {
        self.output_dir.join(format!(
            "space_report_{}.{}",
            self.run_date.format("%Y%m%d"),
            extension
        ))
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/space-weekly-report/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("space-weekly-report").join(".env");
            if load_env_file(&config_path) {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if load_env_file(&home_path) {
                return;
            }
        }

        // If none found, that's okay - environment variables might be set system-wide
    }
}

/// Load one `.env` file. False when it is absent or unreadable.
fn load_env_file(path: &Path) -> bool {
    if path.exists() {
        if dotenvy::from_path(path).is_ok() {
            return true;
        }
    }
    false
}

fn parse_date_var(var: &'static str, value: Option<String>) -> Result<Option<NaiveDate>, ConfigError> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| ConfigError::InvalidDate { var, value: raw })
        })
        .transpose()
}

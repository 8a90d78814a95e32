use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::AppError;
use crate::pipeline::elevation::RetryPolicy;
use crate::pipeline::filter::ActivityFilter;
use crate::sources::{open_elevation, strava};

#[derive(Clone, Default)]
pub struct Credentials {
    access_token: Option<String>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub strava_api_base: String,
    pub strava_timeout: Duration,
    pub elevation_url: String,
    pub elevation_timeout: Duration,
    pub cache_path: PathBuf,
    pub refresh: bool,
    pub filter: ActivityFilter,
    pub skip_types: Vec<String>,
    pub export_dir: Option<PathBuf>,
    pub output_path: PathBuf,
    pub report_path: PathBuf,
    pub per_page: u32,
    pub retry: RetryPolicy,
    pub request_spacing: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let credentials = Credentials {
            access_token: env_string("STRAVA_ACCESS_TOKEN"),
        };

        let filter = ActivityFilter {
            since: env_date("ROUTEMAP_SINCE")?,
            until: env_date("ROUTEMAP_UNTIL")?,
            types: env_list("ROUTEMAP_TYPES"),
        };

        if let (Some(since), Some(until)) = (filter.since, filter.until) {
            if since > until {
                return Err(AppError::Config(format!(
                    "ROUTEMAP_SINCE ({since}) is after ROUTEMAP_UNTIL ({until})"
                )));
            }
        }

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: env_parse("ELEVATION_MAX_ATTEMPTS")?.unwrap_or(defaults.max_attempts),
            delay: env_millis("ELEVATION_RETRY_DELAY_MS")?.unwrap_or(defaults.delay),
        };

        let per_page = env_parse("ROUTEMAP_PER_PAGE")?.unwrap_or(200);
        if per_page == 0 {
            return Err(AppError::Config("ROUTEMAP_PER_PAGE must be positive".to_string()));
        }

        Ok(Self {
            credentials,
            strava_api_base: env_string("STRAVA_API_BASE")
                .unwrap_or_else(|| strava::DEFAULT_API_BASE.to_string()),
            strava_timeout: env_millis("STRAVA_TIMEOUT_MS")?.unwrap_or(strava::DEFAULT_TIMEOUT),
            elevation_url: env_string("ELEVATION_API_URL")
                .unwrap_or_else(|| open_elevation::DEFAULT_LOOKUP_URL.to_string()),
            elevation_timeout: env_millis("ELEVATION_TIMEOUT_MS")?
                .unwrap_or(open_elevation::DEFAULT_TIMEOUT),
            cache_path: env_string("ROUTEMAP_CACHE_PATH")
                .unwrap_or_else(|| "activities.json".to_string())
                .into(),
            refresh: env_bool("ROUTEMAP_REFRESH")?.unwrap_or(false),
            filter,
            skip_types: env_list("ROUTEMAP_SKIP_TYPES"),
            export_dir: env_string("ROUTEMAP_EXPORT_DIR").map(PathBuf::from),
            output_path: env_string("ROUTEMAP_OUTPUT")
                .unwrap_or_else(|| "routes.json".to_string())
                .into(),
            report_path: env_string("ROUTEMAP_REPORT")
                .unwrap_or_else(|| "gear_report.txt".to_string())
                .into(),
            per_page,
            retry,
            request_spacing: env_millis("ELEVATION_SPACING_MS")?
                .unwrap_or(Duration::from_millis(200)),
        })
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, AppError> {
    env_string(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| AppError::Config(format!("{key} has an invalid value: {value}")))
        })
        .transpose()
}

fn env_millis(key: &str) -> Result<Option<Duration>, AppError> {
    Ok(env_parse::<u64>(key)?.map(Duration::from_millis))
}

fn env_bool(key: &str) -> Result<Option<bool>, AppError> {
    env_string(key)
        .map(|value| match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::Config(format!("{key} must be true or false, got {value}"))),
        })
        .transpose()
}

fn env_list(key: &str) -> Vec<String> {
    env_string(key).map(|value| split_list(&value)).unwrap_or_default()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_date(key: &str) -> Result<Option<NaiveDate>, AppError> {
    env_string(key)
        .map(|value| {
            NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                .map_err(|_| AppError::Config(format!("{key} must be YYYY-MM-DD, got {value}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    // from_env reads the whole process environment
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const KEYS: [&str; 7] = [
        "ROUTEMAP_SINCE",
        "ROUTEMAP_UNTIL",
        "ROUTEMAP_REFRESH",
        "ROUTEMAP_PER_PAGE",
        "ELEVATION_MAX_ATTEMPTS",
        "ELEVATION_RETRY_DELAY_MS",
        "ELEVATION_TIMEOUT_MS",
    ];

    fn with_env<R>(vars: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for key in KEYS {
            std::env::remove_var(key);
        }
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let result = f();
        for (key, _) in vars {
            std::env::remove_var(key);
        }
        result
    }

    fn config_error(vars: &[(&str, &str)]) -> String {
        match with_env(vars, Config::from_env) {
            Err(AppError::Config(message)) => message,
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("expected a config error for {vars:?}"),
        }
    }

    #[test]
    fn lists_are_split_on_commas_and_trimmed() {
        assert_eq!(
            split_list(" GravelRide, ,MountainBikeRide ,Run"),
            vec!["GravelRide", "MountainBikeRide", "Run"]
        );
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = with_env(&[], Config::from_env).expect("config");

        assert!(!config.refresh);
        assert_eq!(config.per_page, 200);
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.elevation_timeout, open_elevation::DEFAULT_TIMEOUT);
    }

    #[test]
    fn valid_values_override_defaults() {
        let config = with_env(
            &[
                ("ROUTEMAP_REFRESH", "1"),
                ("ROUTEMAP_PER_PAGE", "50"),
                ("ELEVATION_MAX_ATTEMPTS", "3"),
                ("ELEVATION_TIMEOUT_MS", "2500"),
            ],
            Config::from_env,
        )
        .expect("config");

        assert!(config.refresh);
        assert_eq!(config.per_page, 50);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.elevation_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn since_after_until_is_rejected() {
        let message = config_error(&[
            ("ROUTEMAP_SINCE", "2024-06-02"),
            ("ROUTEMAP_UNTIL", "2024-06-01"),
        ]);
        assert!(message.contains("ROUTEMAP_SINCE"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config_error(&[("ELEVATION_MAX_ATTEMPTS", "ten")]).contains("ELEVATION_MAX_ATTEMPTS"));
        assert!(config_error(&[("ROUTEMAP_PER_PAGE", "-5")]).contains("ROUTEMAP_PER_PAGE"));
        assert!(config_error(&[("ROUTEMAP_PER_PAGE", "0")]).contains("ROUTEMAP_PER_PAGE"));
        assert!(config_error(&[("ROUTEMAP_REFRESH", "maybe")]).contains("ROUTEMAP_REFRESH"));
        assert!(config_error(&[("ROUTEMAP_SINCE", "2024-13-01")]).contains("ROUTEMAP_SINCE"));
    }
}

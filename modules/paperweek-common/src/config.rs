use std::env;
use std::path::PathBuf;

use tracing::info;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // AI providers
    pub openai_api_key: Option<String>,
    pub perplexity_api_key: Option<String>,

    // Publishing
    pub articles_webhook_url: String,
    pub event_webhook_url: Option<String>,

    // Trusted-source storage
    pub sources_path: PathBuf,

    // Weekly publication schedule
    pub post_hour: u8,
    pub timezone: String,
}

impl Config {
    /// Load configuration for the publishing service.
    /// Panics with a clear message if the channel webhook is missing.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            perplexity_api_key: optional_env("PERPLEXITY_API_KEY"),
            articles_webhook_url: required_env("ARTICLES_WEBHOOK_URL"),
            event_webhook_url: optional_env("EVENT_WEBHOOK_URL"),
            sources_path: sources_path_from_env(),
            post_hour: post_hour_from_env(),
            timezone: env::var("TIMEZONE").unwrap_or_else(|_| "Europe/Paris".to_string()),
        }
    }

    /// Load a minimal config for the admin CLI (no publish channel needed).
    pub fn admin_from_env() -> Self {
        Self {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            perplexity_api_key: optional_env("PERPLEXITY_API_KEY"),
            articles_webhook_url: env::var("ARTICLES_WEBHOOK_URL").unwrap_or_default(),
            event_webhook_url: optional_env("EVENT_WEBHOOK_URL"),
            sources_path: sources_path_from_env(),
            post_hour: post_hour_from_env(),
            timezone: env::var("TIMEZONE").unwrap_or_else(|_| "Europe/Paris".to_string()),
        }
    }

    /// Log the effective configuration without secrets.
    pub fn log_startup(&self) {
        info!(
            openai_key = self.openai_api_key.is_some(),
            perplexity_key = self.perplexity_api_key.is_some(),
            event_webhook = self.event_webhook_url.is_some(),
            sources_path = %self.sources_path.display(),
            post_hour = self.post_hour,
            timezone = %self.timezone,
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn sources_path_from_env() -> PathBuf {
    env::var("SOURCES_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/sources.json"))
}

/// Hour of day for the weekly post. Unset or unparseable values fall back
/// to 9; hours past 23 would produce an invalid cron expression.
fn post_hour_from_env() -> u8 {
    env::var("PAPER_POST_HOUR")
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .filter(|h| *h < 24)
        .unwrap_or(9)
}

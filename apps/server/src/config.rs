use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use holdersync_core::watchlist::SchedulerSettings;
use holdersync_provider::DEFAULT_PROVIDER_API_URL;

/// Credentials for the provider's webhook-management API.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub webhook_id: Option<String>,
    /// Shared secret re-sent on every webhook update.
    pub auth_header: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub log_format: String,
    /// Expected `Authorization` value on webhook deliveries.
    pub webhook_auth_header: Option<String>,
    /// Key for admin routes, sent as `x-admin-key`.
    pub admin_key: Option<String>,
    pub provider: ProviderConfig,
    pub scheduler: SchedulerSettings,
    pub startup_sync: bool,
    pub collection_mints: Vec<String>,
    pub collection_mints_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db_path: "./db/app.db".to_string(),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30_000),
            log_format: "text".to_string(),
            webhook_auth_header: None,
            admin_key: None,
            provider: ProviderConfig {
                api_url: DEFAULT_PROVIDER_API_URL.to_string(),
                api_key: None,
                webhook_id: None,
                auth_header: None,
            },
            scheduler: SchedulerSettings::default(),
            startup_sync: true,
            collection_mints: Vec::new(),
            collection_mints_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Config::default();

        let scheduler = SchedulerSettings {
            min_delay: Duration::from_secs(parse_var(
                "HS_WATCHLIST_MIN_DELAY_SECS",
                defaults.scheduler.min_delay.as_secs(),
            )?),
            max_pending: parse_var("HS_WATCHLIST_MAX_PENDING", defaults.scheduler.max_pending)?,
            retry_delay: Duration::from_secs(parse_var(
                "HS_WATCHLIST_RETRY_DELAY_SECS",
                defaults.scheduler.retry_delay.as_secs(),
            )?),
            credits_per_update: parse_var(
                "HS_WATCHLIST_CREDITS_PER_UPDATE",
                defaults.scheduler.credits_per_update,
            )?,
            extra_addresses: list_var("HS_WATCHLIST_EXTRA_ADDRESSES"),
        };

        Ok(Self {
            listen_addr: parse_var("HS_LISTEN_ADDR", defaults.listen_addr)?,
            db_path: std::env::var("HS_DB_PATH").unwrap_or(defaults.db_path),
            cors_allow: std::env::var("HS_CORS_ALLOW_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.cors_allow),
            request_timeout: Duration::from_millis(parse_var(
                "HS_REQUEST_TIMEOUT_MS",
                defaults.request_timeout.as_millis() as u64,
            )?),
            log_format: std::env::var("HS_LOG_FORMAT").unwrap_or(defaults.log_format),
            webhook_auth_header: optional_var("HS_WEBHOOK_AUTH_HEADER"),
            admin_key: optional_var("HS_ADMIN_KEY"),
            provider: ProviderConfig {
                api_url: std::env::var("HS_PROVIDER_API_URL")
                    .unwrap_or(defaults.provider.api_url),
                api_key: optional_var("HS_PROVIDER_API_KEY"),
                webhook_id: optional_var("HS_PROVIDER_WEBHOOK_ID"),
                auth_header: optional_var("HS_PROVIDER_AUTH_HEADER"),
            },
            scheduler,
            startup_sync: parse_var("HS_WATCHLIST_STARTUP_SYNC", defaults.startup_sync)?,
            collection_mints: list_var("HS_COLLECTION_MINTS"),
            collection_mints_file: optional_var("HS_COLLECTION_MINTS_FILE").map(PathBuf::from),
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn list_var(name: &str) -> Vec<String> {
    optional_var(name).map(|v| split_list(&v)).unwrap_or_default()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_var(name) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid {}: {}", name, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_trims_and_drops_empty() {
        assert_eq!(split_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scheduler.max_pending, 50);
        assert_eq!(config.scheduler.min_delay, Duration::from_secs(30));
        assert!(config.startup_sync);
        assert_eq!(config.provider.api_url, "https://api.helius.xyz");
    }
}

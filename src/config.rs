use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PLAYERS_CSV: &str = "data/players_data-2024_2025.csv";
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 5000;
const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub enabled: bool,
    pub base_url: Option<String>,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Base URL when the provider is switched on and configured.
    pub fn active_url(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.base_url.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub players_csv: PathBuf,
    pub provider: ProviderConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let players_csv = env::var("PLAYERS_CSV")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PLAYERS_CSV.to_string());
        let base_url = env::var("STATS_PROVIDER_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());
        let max_attempts = env::var("PROVIDER_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_ATTEMPTS)
            .clamp(1, 10);
        let retry_delay_ms = env::var("PROVIDER_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_DELAY_MS)
            .min(60_000);
        let timeout_secs = env::var("PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);

        Self {
            players_csv: PathBuf::from(players_csv),
            provider: ProviderConfig {
                enabled: env_bool("PROVIDER_ENABLED", true),
                base_url,
                max_attempts,
                retry_delay: Duration::from_millis(retry_delay_ms),
                timeout: Duration::from_secs(timeout_secs),
            },
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_provider_has_no_active_url() {
        let cfg = ProviderConfig {
            enabled: false,
            base_url: Some("https://stats.example".to_string()),
            max_attempts: 3,
            retry_delay: Duration::ZERO,
            timeout: Duration::from_secs(1),
        };
        assert_eq!(cfg.active_url(), None);
        let on = ProviderConfig { enabled: true, ..cfg };
        assert_eq!(on.active_url(), Some("https://stats.example"));
    }
}

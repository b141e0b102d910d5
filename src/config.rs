use clap::Parser;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid api url {url:?}: {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("health interval must be at least one second")]
    HealthIntervalTooShort,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "helpdesk", version, about = "Desktop chat client for the helpdesk assistant")]
pub struct ChatConfig {
    /// Base URL of the chat backend.
    #[arg(long, env = "HELPDESK_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Give up on a chat request after this many seconds. Unset means wait indefinitely.
    #[arg(long, env = "HELPDESK_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    #[arg(long, env = "HELPDESK_HEALTH_INTERVAL_SECS", default_value_t = 30)]
    pub health_interval_secs: u64,
}

impl ChatConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.api_url).map_err(|err| ConfigError::InvalidApiUrl {
            url: self.api_url.clone(),
            reason: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiUrl {
                url: self.api_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        if self.health_interval_secs == 0 {
            return Err(ConfigError::HealthIntervalTooShort);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatConfig, ConfigError, DEFAULT_API_URL};
    use clap::Parser;
    use std::time::Duration;

    #[test]
    fn defaults_are_valid() {
        let config = ChatConfig::try_parse_from(["helpdesk"]).expect("defaults should parse");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.health_interval(), Duration::from_secs(30));
        config.validate().expect("defaults should validate");
    }

    #[test]
    fn flags_override_defaults() {
        let config = ChatConfig::try_parse_from([
            "helpdesk",
            "--api-url",
            "https://support.example.com/",
            "--request-timeout-secs",
            "45",
        ])
        .expect("flags should parse");
        assert_eq!(config.api_url, "https://support.example.com/");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(45)));
        config.validate().expect("https url should validate");
    }

    #[test]
    fn rejects_non_http_urls() {
        for url in ["not a url", "ftp://example.com"] {
            let config = ChatConfig::try_parse_from(["helpdesk", "--api-url", url])
                .expect("flags should parse");
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidApiUrl { .. })
            ));
        }
    }

    #[test]
    fn rejects_zero_health_interval() {
        let config = ChatConfig::try_parse_from(["helpdesk", "--health-interval-secs", "0"])
            .expect("flags should parse");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::HealthIntervalTooShort)
        ));
    }
}

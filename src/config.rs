use std::env;
use std::net::SocketAddr;
use tracing::info;

use crate::error::ConsoleError;

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Configuration for the console service
#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    /// Base URL of the school API, without trailing slash.
    pub api_url: String,
    pub identity_api_key: String,
    pub identity_base_url: String,
    pub bind_addr: SocketAddr,
}

impl ConsoleConfig {
    pub fn new(api_url: impl Into<String>, identity_api_key: impl Into<String>) -> Self {
        Self {
            api_url: normalize_base(api_url.into()),
            identity_api_key: identity_api_key.into(),
            identity_base_url: DEFAULT_IDENTITY_BASE_URL.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }

    pub fn with_identity_base_url(mut self, url: impl Into<String>) -> Self {
        self.identity_base_url = normalize_base(url.into());
        self
    }

    /// Reads `API_URL` and `IDENTITY_API_KEY` (required) plus the optional
    /// `IDENTITY_BASE_URL` and `CONSOLE_BIND`.
    pub fn from_env() -> Result<Self, ConsoleError> {
        let api_url = required_var("API_URL")?;
        let key = required_var("IDENTITY_API_KEY")?;

        let identity_base_url =
            env::var("IDENTITY_BASE_URL").unwrap_or_else(|_| DEFAULT_IDENTITY_BASE_URL.to_string());
        let bind = env::var("CONSOLE_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|e| ConsoleError::Config(format!("invalid CONSOLE_BIND '{}': {}", bind, e)))?;

        info!("Loaded console configuration for API at {}", api_url);

        Ok(Self {
            bind_addr,
            ..Self::new(api_url, key).with_identity_base_url(identity_base_url)
        })
    }
}

fn required_var(name: &str) -> Result<String, ConsoleError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConsoleError::Config(format!("{} is not set", name))),
    }
}

fn normalize_base(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = ConsoleConfig::new("http://school.test/api/", "key")
            .with_identity_base_url("http://id.test/v1/");
        assert_eq!(config.api_url, "http://school.test/api");
        assert_eq!(config.identity_base_url, "http://id.test/v1");
        assert_eq!(config.bind_addr.port(), 3000);
    }
}

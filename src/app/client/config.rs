//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! shared by the search, metadata and download stages.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::http;

/// Configuration for the catalog HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Timeout for search pages and HEAD requests. Body downloads are not
    /// bounded by it.
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            tcp_nodelay: true,
            user_agent: http::USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Builds the HTTP client around a preloaded cookie jar
    pub fn build_http_client(&self, cookie_jar: Arc<Jar>) -> reqwest::Result<Client> {
        Client::builder()
            .cookie_provider(cookie_jar) // Session cookies authenticate HEAD and downloads
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str())
            .tcp_nodelay(self.tcp_nodelay)
            .redirect(Policy::limited(http::MAX_REDIRECTS))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert!(config.tcp_nodelay);
        assert_eq!(config.request_timeout, http::DEFAULT_TIMEOUT);
        assert!(config.user_agent.contains("AudioVault-Fetcher"));
    }

    #[test]
    fn test_http_client_with_custom_config() {
        let config = ClientConfig {
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            ..Default::default()
        };

        let result = config.build_http_client(Arc::new(Jar::default()));
        assert!(result.is_ok());
    }
}

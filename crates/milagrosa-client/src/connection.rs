//! HTTP connection to the La Milagrosa REST backend.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use tracing::info;

use crate::error::ClientError;

/// Configuration for reaching the REST backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, including the version prefix
    /// (e.g., `http://localhost:8080/api/v1`).
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".into(),
            request_timeout_secs: 15,
            user_agent: concat!("milagrosa/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

/// A configured HTTP client bound to one backend.
#[derive(Clone, Debug)]
pub struct ApiConnection {
    http: Client,
    base_url: String,
}

impl ApiConnection {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        info!(base_url = %base_url, "API connection configured");

        Ok(Self { http, base_url })
    }

    /// Absolute URL for a path relative to the API root.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }
}

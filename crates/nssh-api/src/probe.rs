//! Public IP discovery over a plain-text echo service

use std::net::IpAddr;

use async_trait::async_trait;
use reqwest::Client;

use nssh_core::{IpProbe, ProbeError};

/// Echo service answering with the caller's address
pub const CHECK_IP_URL: &str = "https://checkip.amazonaws.com/";

/// [`IpProbe`] backed by a single unauthenticated GET
#[derive(Debug, Clone)]
pub struct CheckIpProbe {
    http: Client,
    url: String,
}

impl CheckIpProbe {
    pub fn new() -> Self {
        Self::with_url(CHECK_IP_URL)
    }

    /// Probe against a different echo service
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
        }
    }
}

impl Default for CheckIpProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IpProbe for CheckIpProbe {
    async fn current_public_ip(&self) -> Result<IpAddr, ProbeError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProbeError::Status(response.status().to_string()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;
        let trimmed = body.trim();

        trimmed
            .parse()
            .map_err(|_| ProbeError::InvalidAddress(trimmed.to_string()))
    }
}

//! Outbound IP discovery trait

use std::net::IpAddr;

use async_trait::async_trait;

use crate::error::ProbeError;

/// Discovers the public address this host's traffic leaves from
#[async_trait]
pub trait IpProbe: Send + Sync {
    async fn current_public_ip(&self) -> Result<IpAddr, ProbeError>;
}

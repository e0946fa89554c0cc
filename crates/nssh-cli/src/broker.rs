//! Port mapping broker
//!
//! Reuses an existing mapping to the requested port when one of its source
//! ranges admits this host's public address; otherwise creates a new one.

use std::net::IpAddr;

use nssh_core::{Device, DeviceRecord, Directory, DirectoryError, IpProbe, PortMapping};

use crate::output::{print_info, print_success};

/// Finds or creates the port mapping a session dials through
pub struct MappingBroker<'a> {
    directory: &'a dyn Directory,
    probe: &'a dyn IpProbe,
}

impl<'a> MappingBroker<'a> {
    pub fn new(directory: &'a dyn Directory, probe: &'a dyn IpProbe) -> Self {
        Self { directory, probe }
    }

    /// Mapping to `port` on `device` that admits this host
    ///
    /// A new mapping lives for `duration_minutes`. Probe failures only
    /// disable reuse; listing and creation failures are returned.
    pub async fn find_or_create(
        &self,
        device: &Device,
        port: u16,
        duration_minutes: u64,
    ) -> Result<PortMapping, DirectoryError> {
        let id = device.identifier();
        print_info(&format!("Searching existing port mappings for {}:{}", id, port));

        let candidates: Vec<PortMapping> = self
            .directory
            .port_mappings_for(device)
            .await?
            .into_iter()
            .filter(|m| m.destination.port == port)
            .collect();
        print_info(&format!(
            "Found {} port mapping(s) for {}:{}",
            candidates.len(),
            id,
            port
        ));

        if let Some(mapping) = self.first_eligible(candidates).await {
            print_success("Found available port mapping");
            return Ok(mapping);
        }

        print_info(&format!(
            "No usable port mapping for {}:{}, creating one",
            id, port
        ));
        let mapping = self
            .directory
            .create_port_mapping(device, port, duration_minutes.saturating_mul(60))
            .await?;
        print_success("Created port mapping");
        Ok(mapping)
    }

    async fn first_eligible(&self, candidates: Vec<PortMapping>) -> Option<PortMapping> {
        if candidates.is_empty() {
            return None;
        }

        let ip = match self.probe.current_public_ip().await {
            Ok(ip) => ip,
            Err(e) => {
                tracing::debug!("Outbound IP probe failed, not reusing mappings: {}", e);
                return None;
            }
        };
        print_info(&format!("Current IP address is {}", ip));

        select_eligible(candidates, ip)
    }
}

/// First candidate with a source range containing `ip`
fn select_eligible(candidates: Vec<PortMapping>, ip: IpAddr) -> Option<PortMapping> {
    candidates.into_iter().find(|m| m.allows_source(ip))
}

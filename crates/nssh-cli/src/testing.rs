//! In-memory directory and probe for command tests

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use nssh_core::types::{Destination, SessionStatus, Source, Tags};
use nssh_core::{
    Device, DeviceId, DeviceRecord, Directory, DirectoryError, IpProbe, PortMapping, ProbeError,
    Subscriber,
};

pub fn device(id: &str, name: &str, online: bool) -> Device {
    Device::from(Subscriber {
        imsi: id.into(),
        subscription: "plan-D".into(),
        speed_class: "s1.standard".into(),
        session_status: SessionStatus { online, imsi: None },
        tags: Tags {
            name: Some(name.into()),
        },
    })
}

pub fn mapping(device_id: &str, port: u16, ranges: &[&str]) -> PortMapping {
    PortMapping {
        duration: 3600,
        endpoint: format!("{}.example:40022", device_id),
        hostname: format!("{}.example", device_id),
        port: 40022,
        destination: Destination {
            id: device_id.into(),
            port,
        },
        source: Source {
            ip_ranges: ranges.iter().map(|r| r.to_string()).collect(),
        },
        ..Default::default()
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    pub devices: Vec<Device>,
    pub mappings: Vec<PortMapping>,
    pub fail_create: bool,
    /// (device id, port, duration seconds) per create call
    pub created: Mutex<Vec<(String, u16, u64)>>,
}

impl FakeDirectory {
    pub fn created(&self) -> Vec<(String, u16, u64)> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn search_by_name(&self, name: &str) -> Result<Vec<Device>, DirectoryError> {
        Ok(self
            .devices
            .iter()
            .filter(|d| d.display_name() == Some(name))
            .cloned()
            .collect())
    }

    async fn list_all_online(&self) -> Result<Vec<Device>, DirectoryError> {
        Ok(self.devices.iter().filter(|d| d.is_online()).cloned().collect())
    }

    async fn get_by_id(&self, id: &DeviceId) -> Result<Device, DirectoryError> {
        self.devices
            .iter()
            .find(|d| d.identifier() == id.as_str())
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))
    }

    async fn list_port_mappings(&self) -> Result<Vec<PortMapping>, DirectoryError> {
        Ok(self.mappings.clone())
    }

    async fn port_mappings_for(&self, device: &Device) -> Result<Vec<PortMapping>, DirectoryError> {
        Ok(self
            .mappings
            .iter()
            .filter(|m| m.destination.id == device.identifier())
            .cloned()
            .collect())
    }

    async fn create_port_mapping(
        &self,
        device: &Device,
        port: u16,
        duration_secs: u64,
    ) -> Result<PortMapping, DirectoryError> {
        if self.fail_create {
            return Err(DirectoryError::Status {
                status: "400 Bad Request".into(),
                method: "POST".into(),
                url: "http://directory.test/v1/port_mappings".into(),
            });
        }
        self.created
            .lock()
            .unwrap()
            .push((device.identifier().to_string(), port, duration_secs));

        let mut created = mapping(device.identifier(), port, &["203.0.113.7/32"]);
        created.duration = duration_secs;
        Ok(created)
    }
}

/// Probe answering with a fixed address, or failing when there is none
#[derive(Default)]
pub struct FakeProbe {
    pub ip: Option<IpAddr>,
    pub calls: AtomicUsize,
}

impl FakeProbe {
    pub fn answering(ip: &str) -> Self {
        Self {
            ip: ip.parse().ok(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IpProbe for FakeProbe {
    async fn current_public_ip(&self) -> Result<IpAddr, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.ip
            .ok_or_else(|| ProbeError::Transport("connection refused".into()))
    }
}

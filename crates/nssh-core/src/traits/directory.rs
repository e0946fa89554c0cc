//! Device directory trait

use async_trait::async_trait;

use crate::error::DirectoryError;
use crate::types::{Device, DeviceId, DeviceRecord, PortMapping};

/// Abstraction over the cloud device directory and port mapping service
#[async_trait]
pub trait Directory: Send + Sync {
    /// All devices whose name tag matches `name`, online or not
    async fn search_by_name(&self, name: &str) -> Result<Vec<Device>, DirectoryError>;

    /// Devices whose name tag matches `name` and that are online
    async fn search_online_by_name(&self, name: &str) -> Result<Vec<Device>, DirectoryError> {
        let devices = self.search_by_name(name).await?;
        Ok(devices.into_iter().filter(|d| d.is_online()).collect())
    }

    /// Every online device, across all result pages
    async fn list_all_online(&self) -> Result<Vec<Device>, DirectoryError>;

    /// Fetch one device by identifier
    async fn get_by_id(&self, id: &DeviceId) -> Result<Device, DirectoryError>;

    /// All port mappings on the account
    async fn list_port_mappings(&self) -> Result<Vec<PortMapping>, DirectoryError>;

    /// Port mappings whose destination is `device`
    async fn port_mappings_for(&self, device: &Device) -> Result<Vec<PortMapping>, DirectoryError>;

    /// Create a mapping to `port` on `device` that lives for `duration_secs`
    async fn create_port_mapping(
        &self,
        device: &Device,
        port: u16,
        duration_secs: u64,
    ) -> Result<PortMapping, DirectoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SessionStatus, Subscriber};

    struct NameOnly(Vec<Device>);

    #[async_trait]
    impl Directory for NameOnly {
        async fn search_by_name(&self, _name: &str) -> Result<Vec<Device>, DirectoryError> {
            Ok(self.0.clone())
        }

        async fn list_all_online(&self) -> Result<Vec<Device>, DirectoryError> {
            Ok(Vec::new())
        }

        async fn get_by_id(&self, id: &DeviceId) -> Result<Device, DirectoryError> {
            Err(DirectoryError::NotFound(id.to_string()))
        }

        async fn list_port_mappings(&self) -> Result<Vec<PortMapping>, DirectoryError> {
            Ok(Vec::new())
        }

        async fn port_mappings_for(
            &self,
            _device: &Device,
        ) -> Result<Vec<PortMapping>, DirectoryError> {
            Ok(Vec::new())
        }

        async fn create_port_mapping(
            &self,
            _device: &Device,
            _port: u16,
            _duration_secs: u64,
        ) -> Result<PortMapping, DirectoryError> {
            Err(DirectoryError::Transport("read-only".into()))
        }
    }

    fn subscriber(imsi: &str, online: bool) -> Device {
        Device::from(Subscriber {
            imsi: imsi.into(),
            session_status: SessionStatus { online, imsi: None },
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_search_online_filters_offline() {
        let directory = NameOnly(vec![
            subscriber("1", true),
            subscriber("2", false),
            subscriber("3", true),
        ]);
        let online = directory.search_online_by_name("gw").await.unwrap();
        let ids: Vec<&str> = online.iter().map(|d| d.identifier()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}

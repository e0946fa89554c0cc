//! nssh-core: Core abstractions and configuration for nssh
//!
//! This crate provides the device and port mapping model, the traits the
//! session pipeline consumes (directory and outbound IP probe), address
//! resolution, and profile configuration shared by the API client, the
//! session bridge, and the CLI.

pub mod address;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use address::{resolve_address, select_single_online, DEFAULT_LOGIN};
pub use error::{ConfigError, DirectoryError, NsshError, ProbeError, ResolveError};
pub use traits::{Directory, IpProbe};
pub use types::{Device, DeviceId, DeviceRecord, PortMapping, Sim, Subscriber};

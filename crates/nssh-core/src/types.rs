//! Core domain types
//!
//! Devices come in two shapes depending on which directory API is in use:
//! the older subscriber records and the newer SIM records with nested
//! profiles. Both are exposed through [`DeviceRecord`] and wrapped in the
//! [`Device`] enum so the rest of the pipeline never cares which one it has.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use crate::config::serde_utils::null_as_default;

/// Shown in place of a missing device name
const UNKNOWN_NAME: &str = "Unknown";

/// Unique identifier for a device (IMSI or SIM ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub String);

impl DeviceId {
    /// Create a new device ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Read-only view of a device record, whichever API it came from
pub trait DeviceRecord {
    /// Directory key of the device
    fn identifier(&self) -> &str;

    /// Name tag, if one is set
    fn display_name(&self) -> Option<&str>;

    /// Whether the device currently has a data session
    fn is_online(&self) -> bool;

    /// Subscription (plan) label, empty when unknown
    fn subscription_label(&self) -> &str;

    /// Speed class label, empty when unknown
    fn speed_class(&self) -> &str;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStatus {
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub imsi: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Subscriber record from the older directory API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    #[serde(default)]
    pub imsi: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subscription: String,
    /// Speed class, e.g. `s1.4xfast`
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub speed_class: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_status: SessionStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Tags,
}

impl DeviceRecord for Subscriber {
    fn identifier(&self) -> &str {
        &self.imsi
    }

    fn display_name(&self) -> Option<&str> {
        self.tags.name.as_deref().filter(|n| !n.is_empty())
    }

    fn is_online(&self) -> bool {
        self.session_status.online
    }

    fn subscription_label(&self) -> &str {
        &self.subscription
    }

    fn speed_class(&self) -> &str {
        &self.speed_class
    }
}

/// Subscriber entry nested inside a SIM profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileSubscriber {
    #[serde(default)]
    pub imsi: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subscription: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimProfile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub primary_imsi: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subscribers: HashMap<String, ProfileSubscriber>,
}

/// SIM record from the newer directory API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sim {
    #[serde(default)]
    pub sim_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub speed_class: String,
    #[serde(default)]
    pub active_profile_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profiles: HashMap<String, SimProfile>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_status: SessionStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Tags,
}

impl DeviceRecord for Sim {
    fn identifier(&self) -> &str {
        &self.sim_id
    }

    fn display_name(&self) -> Option<&str> {
        self.tags.name.as_deref().filter(|n| !n.is_empty())
    }

    fn is_online(&self) -> bool {
        self.session_status.online
    }

    /// Active profile -> its primary IMSI -> that subscriber's plan
    fn subscription_label(&self) -> &str {
        self.active_profile_id
            .as_ref()
            .and_then(|id| self.profiles.get(id))
            .and_then(|profile| profile.subscribers.get(&profile.primary_imsi))
            .map(|subscriber| subscriber.subscription.as_str())
            .unwrap_or("")
    }

    fn speed_class(&self) -> &str {
        &self.speed_class
    }
}

/// A device known to the directory
///
/// Equality and hashing use the identifier only.
#[derive(Debug, Clone)]
pub enum Device {
    Sim(Sim),
    Subscriber(Subscriber),
}

impl Device {
    /// Identifier as a typed key
    pub fn id(&self) -> DeviceId {
        DeviceId::new(self.identifier())
    }

    /// Name, falling back to `Unknown`
    pub fn name_or_unknown(&self) -> &str {
        self.display_name().unwrap_or(UNKNOWN_NAME)
    }

    /// Title line for list widgets: identifier and name
    pub fn title(&self) -> String {
        format!("{} {}", self.identifier(), self.name_or_unknown())
    }

    /// Description line for list widgets: plan and speed class
    pub fn description(&self) -> String {
        format!("{} ({})", self.subscription_label(), self.speed_class())
    }

    /// Text a filter query is matched against
    pub fn filter_value(&self) -> String {
        format!(
            "{}{}{}{}",
            self.identifier(),
            self.subscription_label(),
            self.display_name().unwrap_or(""),
            self.speed_class()
        )
    }

    /// Whether the record has every field the picker shows
    pub fn is_complete(&self) -> bool {
        !self.identifier().is_empty()
            && !self.subscription_label().is_empty()
            && !self.speed_class().is_empty()
    }

    fn record(&self) -> &dyn DeviceRecord {
        match self {
            Device::Sim(sim) => sim as &dyn DeviceRecord,
            Device::Subscriber(subscriber) => subscriber as &dyn DeviceRecord,
        }
    }
}

impl DeviceRecord for Device {
    fn identifier(&self) -> &str {
        self.record().identifier()
    }

    fn display_name(&self) -> Option<&str> {
        self.record().display_name()
    }

    fn is_online(&self) -> bool {
        self.record().is_online()
    }

    fn subscription_label(&self) -> &str {
        self.record().subscription_label()
    }

    fn speed_class(&self) -> &str {
        self.record().speed_class()
    }
}

impl From<Sim> for Device {
    fn from(sim: Sim) -> Self {
        Device::Sim(sim)
    }
}

impl From<Subscriber> for Device {
    fn from(subscriber: Subscriber) -> Self {
        Device::Subscriber(subscriber)
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.identifier() == other.identifier()
    }
}

impl Eq for Device {}

impl Hash for Device {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier().hash(state);
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} / {} / {})",
            self.name_or_unknown(),
            self.identifier(),
            self.subscription_label(),
            self.speed_class()
        )
    }
}

/// Target side of a port mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDestination")]
pub struct Destination {
    /// `simId` when present, otherwise `imsi`
    #[serde(rename = "simId")]
    pub id: String,
    pub port: u16,
}

/// Destination as sent by either API; SIM-era responses may carry both keys
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDestination {
    #[serde(default)]
    sim_id: Option<String>,
    #[serde(default)]
    imsi: Option<String>,
    #[serde(default)]
    port: u16,
}

impl From<RawDestination> for Destination {
    fn from(raw: RawDestination) -> Self {
        let id = raw
            .sim_id
            .filter(|id| !id.is_empty())
            .or(raw.imsi)
            .unwrap_or_default();
        Self { id, port: raw.port }
    }
}

/// Source restriction of a port mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ip_ranges: Vec<String>,
}

/// Temporary, source-restricted TCP forwarding rule to a device port
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    /// Lifetime in seconds, counted from creation by the service
    #[serde(default)]
    pub duration: u64,
    /// `host:port` to dial
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub ip_address: String,
    /// Exposed port on the service side
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub tls_required: bool,
    pub destination: Destination,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: Source,
}

impl PortMapping {
    /// Address to dial, preferring the advertised endpoint
    pub fn address(&self) -> String {
        if self.endpoint.is_empty() {
            format!("{}:{}", self.hostname, self.port)
        } else {
            self.endpoint.clone()
        }
    }

    /// Whether any permitted source range contains `ip`
    ///
    /// Entries that are not `address/prefix` CIDR notation are skipped,
    /// including bare addresses.
    pub fn allows_source(&self, ip: IpAddr) -> bool {
        self.source.ip_ranges.iter().any(|range| {
            if !range.contains('/') {
                tracing::debug!("Skipping source range without prefix length {:?}", range);
                return false;
            }
            match range.parse::<IpNetwork>() {
                Ok(network) => network.contains(ip),
                Err(e) => {
                    tracing::debug!("Skipping unparsable source range {:?}: {}", range, e);
                    false
                }
            }
        })
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- Endpoint: {}:{}", self.hostname, self.port)?;
        writeln!(
            f,
            "- Destination: {}:{}",
            self.destination.id, self.destination.port
        )?;
        writeln!(f, "- Duration: {} hours", self.duration as f32 / 60.0 / 60.0)?;
        writeln!(f, "- Source: {}", self.source.ip_ranges.join(","))?;
        write!(f, "- TLS required: {}", self.tls_required)
    }
}

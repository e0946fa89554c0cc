//! Configuration management for nssh

mod profile;
pub mod serde_utils;

pub use profile::{
    default_profile_dir, load_profile, profile_path, Profile, DEFAULT_PROFILE_NAME,
    PROFILE_DIR_ENV,
};

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Which regional directory endpoint to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageType {
    /// Global coverage (`g`)
    Global,
    /// Japan coverage (`jp`)
    Japan,
}

impl CoverageType {
    /// Base URL of the directory API for this coverage
    pub fn api_endpoint(&self) -> &'static str {
        match self {
            CoverageType::Global => "https://g.api.soracom.io",
            CoverageType::Japan => "https://api.soracom.io",
        }
    }
}

impl FromStr for CoverageType {
    type Err = ConfigError;

    /// Matches on the first letter, so `g`, `global`, `j` and `jp` all work
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('j') {
            Ok(CoverageType::Japan)
        } else if s.starts_with('g') {
            Ok(CoverageType::Global)
        } else {
            Err(ConfigError::InvalidCoverageType(s.to_string()))
        }
    }
}

impl fmt::Display for CoverageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageType::Global => write!(f, "g"),
            CoverageType::Japan => write!(f, "jp"),
        }
    }
}

/// Which device representation the directory serves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiVersion {
    /// SIM records (`/query/sims`, `/port_mappings/sims`)
    #[default]
    Sims,
    /// Subscriber records (`/query/subscribers`, `/port_mappings/subscribers`)
    Subscribers,
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sims" | "sim" => Ok(ApiVersion::Sims),
            "subscribers" | "subscriber" => Ok(ApiVersion::Subscribers),
            _ => Err(ConfigError::InvalidApiVersion(s.to_string())),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::Sims => write!(f, "sims"),
            ApiVersion::Subscribers => write!(f, "subscribers"),
        }
    }
}

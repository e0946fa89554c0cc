//! Core error types for nssh

use std::path::PathBuf;
use thiserror::Error;

use crate::types::Device;

/// Top-level error type for the nssh ecosystem
#[derive(Error, Debug)]
pub enum NsshError {
    /// Directory service error
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Device resolution error
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Errors from the device directory and port mapping service
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// The service answered with a status of 400 or above
    #[error("{status}: {method} {url}")]
    Status {
        status: String,
        method: String,
        url: String,
    },

    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body did not match the expected shape
    #[error("Failed to decode {what}: {message}")]
    Decode { what: &'static str, message: String },

    /// Lookup by identifier returned nothing
    #[error("Device not found: {0}")]
    NotFound(String),

    /// The API key exchange was rejected or incomplete
    #[error("Authentication failed: {0}")]
    Auth(String),
}

/// Errors from the outbound IP probe
///
/// Always recoverable: callers degrade to "no IP filtering".
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Request could not be sent or the body could not be read
    #[error("Request failed: {0}")]
    Transport(String),

    /// Echo service answered with a failure status
    #[error("Unexpected status: {0}")]
    Status(String),

    /// Body is not an IP address literal
    #[error("Invalid IP address in response: {0:?}")]
    InvalidAddress(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither the override variable nor a home directory is available
    #[error("Cannot determine profile directory (set SORACOM_PROFILE_DIR)")]
    NoProfileDir,

    /// Profile file not found
    #[error("Profile not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Profile file could not be read
    #[error("Failed to read profile {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Profile file is not valid JSON
    #[error("Failed to parse profile {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Missing required field
    #[error("Missing required field '{field}' in {}", .path.display())]
    MissingField { path: PathBuf, field: &'static str },

    /// Coverage type is neither global nor Japan
    #[error("Invalid coverage type: {0}")]
    InvalidCoverageType(String),

    /// Unknown directory API variant
    #[error("Invalid API variant: {0} (expected 'sims' or 'subscribers')")]
    InvalidApiVersion(String),
}

/// Failure to narrow a name down to exactly one online device
#[derive(Error, Debug)]
pub enum ResolveError {
    /// No online device carries the name
    #[error("No online device named \"{0}\"")]
    NoOnlineDevice(String),

    /// More than one online device carries the name
    #[error("Multiple online devices named \"{}\" ({} matches)", .name, .devices.len())]
    Ambiguous { name: String, devices: Vec<Device> },
}

//! nssh-api: HTTP implementations of the nssh directory and probe traits
//!
//! [`SoracomClient`] speaks the SORACOM-style REST API (auth handshake,
//! device queries with continuation-key pagination, port mapping listing
//! and creation). [`CheckIpProbe`] asks a plain-text echo service for the
//! caller's public address.

mod client;
mod probe;

pub use client::{SoracomClient, NEXT_KEY_HEADER, TOKEN_TIMEOUT_SECONDS};
pub use probe::{CheckIpProbe, CHECK_IP_URL};

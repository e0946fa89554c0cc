//! nssh: SSH into cellular devices by name
//!
//! Resolves a device by its name tag, finds or creates a port mapping that
//! admits this host, and opens an interactive shell through it.

pub mod broker;
pub mod commands;
pub mod context;
pub mod output;
pub mod picker;

#[cfg(test)]
pub(crate) mod testing;

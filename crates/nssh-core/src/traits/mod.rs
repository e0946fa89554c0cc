//! Core trait definitions

mod directory;
mod probe;

pub use directory::Directory;
pub use probe::IpProbe;

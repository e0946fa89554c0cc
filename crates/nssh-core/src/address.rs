//! Target address parsing and device narrowing

use crate::error::ResolveError;
use crate::types::{Device, DeviceRecord};

/// Login used when the target has no `login@` prefix
pub const DEFAULT_LOGIN: &str = "pi";

/// Split `[login@]name` into a login and a device-name query
///
/// Splits on the first `@`. An empty prefix falls back to [`DEFAULT_LOGIN`].
pub fn resolve_address(arg: &str) -> (String, String) {
    match arg.split_once('@') {
        Some((login, name)) if !login.is_empty() => (login.to_string(), name.to_string()),
        Some((_, name)) => (DEFAULT_LOGIN.to_string(), name.to_string()),
        None => (DEFAULT_LOGIN.to_string(), arg.to_string()),
    }
}

/// Pick the single online device out of a name search result
pub fn select_single_online(devices: Vec<Device>, name: &str) -> Result<Device, ResolveError> {
    let mut online: Vec<Device> = devices.into_iter().filter(|d| d.is_online()).collect();

    match online.len() {
        0 => Err(ResolveError::NoOnlineDevice(name.to_string())),
        1 => Ok(online.remove(0)),
        _ => Err(ResolveError::Ambiguous {
            name: name.to_string(),
            devices: online,
        }),
    }
}

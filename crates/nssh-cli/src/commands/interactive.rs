//! Interactive command implementation

use anyhow::{Context, Result};

use nssh_core::{Device, DeviceRecord};

use super::{open_session, SessionArgs};
use crate::context::AppContext;
use crate::output::{print_info, print_warning};
use crate::picker::run_picker;

/// Pick an online device from a list and connect to it as `login`
pub async fn interactive_command(ctx: &AppContext, login: &str, args: &SessionArgs) -> Result<()> {
    let online = ctx
        .directory
        .list_all_online()
        .await
        .context("Failed to list online devices")?;
    let devices = pickable_devices(online);

    if devices.is_empty() {
        print_warning("No online devices");
        return Ok(());
    }

    let picked = tokio::task::spawn_blocking(move || run_picker(devices))
        .await
        .context("Device picker panicked")?
        .context("Device picker failed")?;

    let Some(device) = picked else {
        tracing::debug!("Picker cancelled");
        return Ok(());
    };

    print_info(&format!(
        "Selected {} ({})",
        device.name_or_unknown(),
        device.identifier()
    ));
    open_session(ctx, &device, login, args).await
}

/// Devices complete enough to be shown in the picker
fn pickable_devices(devices: Vec<Device>) -> Vec<Device> {
    devices.into_iter().filter(Device::is_complete).collect()
}

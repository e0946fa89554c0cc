//! List command implementation

use std::fmt::Write;

use anyhow::{Context, Result};

use nssh_core::{Device, DeviceId, Directory, DirectoryError, PortMapping};

use crate::context::AppContext;
use crate::output::format_port_mappings;

/// Execute the list command
///
/// Without a name every mapping is listed next to the device it targets;
/// with one, mappings are grouped under each device carrying the name.
pub async fn list_command(ctx: &AppContext, name: Option<&str>) -> Result<()> {
    let directory = ctx.directory.as_ref();

    match name {
        None => {
            let entries = collect_all(directory)
                .await
                .context("Failed to list port mappings")?;
            println!("{}", format_port_mappings(&entries));
        }
        Some(name) => {
            let groups = collect_by_name(directory, name)
                .await
                .with_context(|| format!("Failed to list port mappings for \"{}\"", name))?;
            print!("{}", render_by_name(&groups));
        }
    }

    Ok(())
}

/// Every mapping paired with its destination device
async fn collect_all(
    directory: &dyn Directory,
) -> Result<Vec<(Device, PortMapping)>, DirectoryError> {
    let mappings = directory.list_port_mappings().await?;
    tracing::debug!("Resolving {} port mapping destination(s)", mappings.len());

    let mut entries = Vec::with_capacity(mappings.len());
    for mapping in mappings {
        let device = directory
            .get_by_id(&DeviceId::new(mapping.destination.id.as_str()))
            .await?;
        entries.push((device, mapping));
    }
    Ok(entries)
}

/// Mappings of each device named `name`, online or not
async fn collect_by_name(
    directory: &dyn Directory,
    name: &str,
) -> Result<Vec<(Device, Vec<PortMapping>)>, DirectoryError> {
    let mut groups = Vec::new();
    for device in directory.search_by_name(name).await? {
        let mappings = directory.port_mappings_for(&device).await?;
        groups.push((device, mappings));
    }
    Ok(groups)
}

fn render_by_name(groups: &[(Device, Vec<PortMapping>)]) -> String {
    let mut out = String::new();
    for (device, mappings) in groups {
        if mappings.is_empty() {
            let _ = writeln!(out, "no port mapping for {}", device);
            continue;
        }
        let _ = writeln!(out, "{}", device);
        for (i, mapping) in mappings.iter().enumerate() {
            let _ = writeln!(out, "#{}:", i + 1);
            let _ = writeln!(out, "{}", mapping);
        }
    }
    out
}

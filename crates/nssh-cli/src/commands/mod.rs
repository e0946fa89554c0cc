//! CLI command implementations

mod connect;
mod interactive;
mod list;
mod version;

use std::path::PathBuf;

use anyhow::{Context, Result};

use nssh_core::{Device, DeviceRecord};

use crate::broker::MappingBroker;
use crate::context::AppContext;
use crate::output::{print_info, session_separator};

pub use connect::connect_command;
pub use interactive::interactive_command;
pub use list::list_command;
pub use version::{version_command, version_string};

/// Options shared by every command that opens a session
#[derive(Debug, Clone, clap::Args)]
pub struct SessionArgs {
    /// Private key used for authentication (prompts for a password otherwise)
    #[arg(short, long)]
    pub identity: Option<PathBuf>,

    /// Destination port on the device
    #[arg(short, long, default_value_t = 22)]
    pub port: u16,

    /// Lifetime of a newly created port mapping, in minutes
    #[arg(short, long, default_value_t = 60)]
    pub duration: u64,
}

/// Broker a mapping for `device` and run a shell through it
async fn open_session(
    ctx: &AppContext,
    device: &Device,
    login: &str,
    args: &SessionArgs,
) -> Result<()> {
    let broker = MappingBroker::new(ctx.directory.as_ref(), ctx.probe.as_ref());
    let mapping = broker
        .find_or_create(device, args.port, args.duration)
        .await
        .context("Failed to obtain a port mapping")?;

    print_info(&format!(
        "Connecting to {}:{} using following port mapping:",
        device.identifier(),
        args.port
    ));
    println!("{}", mapping);
    println!("{}", session_separator());

    let outcome = nssh_session::connect(login, args.identity.as_deref(), &mapping).await?;
    tracing::debug!("Session ended with status {:?}", outcome.exit_status);
    Ok(())
}

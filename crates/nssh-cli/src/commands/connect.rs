//! Connect command implementation

use anyhow::Result;

use nssh_core::{resolve_address, select_single_online, Device, Directory, NsshError, ResolveError};

use super::{open_session, SessionArgs};
use crate::context::AppContext;
use crate::output::{print_info, print_warning};

/// Execute the connect command for `[login@]name`
pub async fn connect_command(ctx: &AppContext, target: &str, args: &SessionArgs) -> Result<()> {
    let (login, name) = resolve_address(target);
    tracing::debug!("Resolved target {:?} to login {:?}, name {:?}", target, login, name);

    print_info(&format!("Searching online devices named \"{}\"", name));
    let device = resolve_device(ctx.directory.as_ref(), &name).await?;
    print_info(&format!("Found device {}", device));

    open_session(ctx, &device, &login, args).await
}

/// The one online device carrying `name`
///
/// Every match is listed before an ambiguity error is returned.
async fn resolve_device(directory: &dyn Directory, name: &str) -> Result<Device, NsshError> {
    let found = directory.search_by_name(name).await?;

    match select_single_online(found, name) {
        Ok(device) => Ok(device),
        Err(ResolveError::Ambiguous { name, devices }) => {
            for device in &devices {
                print_warning(&format!("- {}", device));
            }
            Err(ResolveError::Ambiguous { name, devices }.into())
        }
        Err(e) => Err(e.into()),
    }
}

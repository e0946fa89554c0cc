//! Per-invocation application context

use std::sync::Arc;

use nssh_api::{CheckIpProbe, SoracomClient};
use nssh_core::config::{default_profile_dir, load_profile, profile_path, ApiVersion};
use nssh_core::{Directory, IpProbe, NsshError};

/// Global options shared by every command that talks to the directory
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Overrides the profile's coverage type
    pub coverage_type: Option<String>,
    pub profile_name: String,
    pub api: ApiVersion,
}

/// Collaborators built once in `main` and handed to each command
#[derive(Clone)]
pub struct AppContext {
    pub directory: Arc<dyn Directory>,
    pub probe: Arc<dyn IpProbe>,
}

impl AppContext {
    pub fn new(directory: Arc<dyn Directory>, probe: Arc<dyn IpProbe>) -> Self {
        Self { directory, probe }
    }

    /// Load the profile, pick the endpoint and authenticate
    pub async fn from_options(options: &GlobalOptions) -> Result<Self, NsshError> {
        let path = profile_path(&default_profile_dir()?, &options.profile_name);
        let profile = load_profile(&path)?;
        let coverage = profile.coverage(options.coverage_type.as_deref())?;

        tracing::info!(
            "Using profile {} ({} coverage, {} API)",
            options.profile_name,
            coverage,
            options.api
        );
        let client = SoracomClient::login(&profile, coverage, options.api).await?;

        Ok(Self::new(Arc::new(client), Arc::new(CheckIpProbe::new())))
    }
}

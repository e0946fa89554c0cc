//! SSH connection to a port mapping endpoint

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use russh::client::{self, Config};
use russh::Disconnect;
use russh_keys::key::PublicKey;

use nssh_core::PortMapping;

use crate::auth::Credentials;
use crate::bridge::{resize_signals, LocalStdio, SessionBridge, SessionOutcome};
use crate::error::{AuthError, SessionError};
use crate::terminal::CrosstermTerminal;

/// Client-side SSH event handler
struct ClientHandler;

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    /// Accept any host key
    ///
    /// Mapping endpoints are short-lived and provisioned by the broker, so
    /// there is nothing stable to pin. The fingerprint is logged.
    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        tracing::debug!("Server host key: {}", server_public_key.fingerprint());
        Ok(true)
    }
}

/// Open an interactive shell as `login` on the device behind `mapping`
///
/// Authenticates with the key at `identity` when given, otherwise prompts
/// for a password. Blocks until the remote shell exits.
pub async fn connect(
    login: &str,
    identity: Option<&Path>,
    mapping: &PortMapping,
) -> Result<SessionOutcome, SessionError> {
    let address = mapping.address();
    let credentials = Credentials::resolve(identity, login, &address)?;

    tracing::debug!("Connecting to {}", address);
    let config = Arc::new(Config::default());
    let mut session = client::connect(config, address.as_str(), ClientHandler)
        .await
        .map_err(|e| SessionError::Dial {
            address: address.clone(),
            message: e.to_string(),
        })?;

    tracing::debug!("Authenticating as user '{}'", login);
    let authenticated = match credentials {
        Credentials::Password(password) => session.authenticate_password(login, password).await?,
        Credentials::PublicKey(key) => session.authenticate_publickey(login, key).await?,
    };
    if !authenticated {
        return Err(AuthError::Rejected(login.to_string()).into());
    }

    let mut channel = session
        .channel_open_session()
        .await
        .map_err(|e| SessionError::ChannelOpen(e.to_string()))?;

    let bridge = SessionBridge::new(Arc::new(CrosstermTerminal));
    let outcome = bridge
        .run(&mut channel, LocalStdio::process(), resize_signals())
        .await;

    if let Err(e) = session
        .disconnect(Disconnect::ByApplication, "", "en")
        .await
    {
        tracing::debug!("Disconnect failed: {}", e);
    }

    outcome
}

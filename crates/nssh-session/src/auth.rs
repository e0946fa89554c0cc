//! Credential loading and prompting

use std::path::Path;
use std::sync::Arc;

use russh_keys::key::KeyPair;

use crate::error::AuthError;

/// How the session authenticates to the device
pub enum Credentials {
    Password(String),
    PublicKey(Arc<KeyPair>),
}

impl Credentials {
    /// Key from `identity` when given, otherwise a password prompt
    pub fn resolve(identity: Option<&Path>, login: &str, address: &str) -> Result<Self, AuthError> {
        match identity {
            Some(path) => Self::from_identity(path),
            None => Self::prompt_password(login, address),
        }
    }

    /// Load a private key, asking for a passphrase if it is encrypted
    pub fn from_identity(path: &Path) -> Result<Self, AuthError> {
        if !path.exists() {
            return Err(AuthError::IdentityNotFound(path.to_path_buf()));
        }

        let invalid = |e: russh_keys::Error| AuthError::InvalidKey {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let key = match russh_keys::load_secret_key(path, None) {
            Ok(key) => key,
            Err(russh_keys::Error::KeyIsEncrypted) => {
                let passphrase =
                    rpassword::prompt_password(format!("Enter passphrase for {}: ", path.display()))
                        .map_err(AuthError::Prompt)?;
                russh_keys::load_secret_key(path, Some(&passphrase)).map_err(invalid)?
            }
            Err(e) => return Err(invalid(e)),
        };

        tracing::debug!("Loaded identity from {}", path.display());
        Ok(Credentials::PublicKey(Arc::new(key)))
    }

    /// Ask for a password on the controlling terminal, without echo
    pub fn prompt_password(login: &str, address: &str) -> Result<Self, AuthError> {
        let host = address
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or(address);
        let password = rpassword::prompt_password(format!("{}@{}'s password: ", login, host))
            .map_err(AuthError::Prompt)?;
        Ok(Credentials::Password(password))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Password(_) => write!(f, "Password(..)"),
            Credentials::PublicKey(_) => write!(f, "PublicKey(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_identity() {
        let err = Credentials::from_identity(Path::new("/nonexistent/id_ed25519")).unwrap_err();
        assert!(matches!(err, AuthError::IdentityNotFound(_)));
    }

    #[test]
    fn test_unparsable_identity() {
        let path = std::env::temp_dir().join(format!("nssh-bad-key-{}", std::process::id()));
        std::fs::write(&path, "this is not a private key\n").unwrap();

        let err = Credentials::from_identity(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, AuthError::InvalidKey { .. }));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let creds = Credentials::Password("hunter2".into());
        assert_eq!(format!("{:?}", creds), "Password(..)");
    }
}

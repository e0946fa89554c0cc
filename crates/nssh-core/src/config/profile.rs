//! Credential profiles
//!
//! Profiles are the JSON files the vendor CLI writes, one per profile name:
//! `<dir>/<name>.json` holding the auth key pair and a default coverage type.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::CoverageType;
use crate::error::ConfigError;

/// Environment variable that overrides the profile directory
pub const PROFILE_DIR_ENV: &str = "SORACOM_PROFILE_DIR";

/// Profile used when none is given on the command line
pub const DEFAULT_PROFILE_NAME: &str = "nssh";

/// Credentials and defaults loaded from a profile file
#[derive(Debug, Clone)]
pub struct Profile {
    pub auth_key_id: String,
    pub auth_key: String,
    pub coverage_type: Option<String>,
}

impl Profile {
    /// Coverage to use: the override if given, else the profile's own
    pub fn coverage(&self, override_type: Option<&str>) -> Result<CoverageType, ConfigError> {
        match override_type.filter(|s| !s.is_empty()) {
            Some(value) => value.parse(),
            None => self
                .coverage_type
                .as_deref()
                .ok_or_else(|| ConfigError::InvalidCoverageType(String::new()))?
                .parse(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProfile {
    auth_key_id: Option<String>,
    auth_key: Option<String>,
    coverage_type: Option<String>,
}

/// Directory holding profile files
///
/// `$SORACOM_PROFILE_DIR` when set and non-empty, otherwise `~/.soracom`.
pub fn default_profile_dir() -> Result<PathBuf, ConfigError> {
    profile_dir_from(std::env::var_os(PROFILE_DIR_ENV), dirs::home_dir())
}

fn profile_dir_from(
    override_dir: Option<OsString>,
    home: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => home
            .map(|h| h.join(".soracom"))
            .ok_or(ConfigError::NoProfileDir),
    }
}

/// Path of the named profile inside `dir`
pub fn profile_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.json", name))
}

/// Load a profile file
pub fn load_profile(path: &Path) -> Result<Profile, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let raw: RawProfile = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let missing = |field| ConfigError::MissingField {
        path: path.to_path_buf(),
        field,
    };

    tracing::debug!("Loaded profile from {}", path.display());

    Ok(Profile {
        auth_key_id: raw.auth_key_id.ok_or_else(|| missing("authKeyId"))?,
        auth_key: raw.auth_key.ok_or_else(|| missing("authKey"))?,
        coverage_type: raw.coverage_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_profile(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = profile_path(dir, name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_profile(
            dir.path(),
            "nssh",
            r#"{"authKeyId": "keyId-abc", "authKey": "secret-xyz", "coverageType": "jp"}"#,
        );

        let profile = load_profile(&path).unwrap();
        assert_eq!(profile.auth_key_id, "keyId-abc");
        assert_eq!(profile.auth_key, "secret-xyz");
        assert_eq!(profile.coverage(None).unwrap(), CoverageType::Japan);
        assert_eq!(profile.coverage(Some("g")).unwrap(), CoverageType::Global);
    }

    #[test]
    fn test_load_profile_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_profile(&profile_path(dir.path(), "absent")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_profile_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_profile(dir.path(), "broken", "{not json");
        assert!(matches!(
            load_profile(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_load_profile_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_profile(dir.path(), "partial", r#"{"authKeyId": "keyId-abc"}"#);
        let err = load_profile(&path).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "authKey", .. }));
    }

    #[test]
    fn test_coverage_required_without_override() {
        let profile = Profile {
            auth_key_id: "id".into(),
            auth_key: "key".into(),
            coverage_type: None,
        };
        assert!(profile.coverage(None).is_err());
        assert_eq!(profile.coverage(Some("jp")).unwrap(), CoverageType::Japan);
        assert!(profile.coverage(Some("")).is_err());
    }

    #[test]
    fn test_profile_dir_resolution() {
        let home = Some(PathBuf::from("/home/operator"));
        assert_eq!(
            profile_dir_from(Some("/etc/nssh".into()), home.clone()).unwrap(),
            PathBuf::from("/etc/nssh")
        );
        assert_eq!(
            profile_dir_from(Some("".into()), home.clone()).unwrap(),
            PathBuf::from("/home/operator/.soracom")
        );
        assert_eq!(
            profile_dir_from(None, home).unwrap(),
            PathBuf::from("/home/operator/.soracom")
        );
        assert!(matches!(
            profile_dir_from(None, None).unwrap_err(),
            ConfigError::NoProfileDir
        ));
    }

    #[test]
    fn test_profile_path() {
        assert_eq!(
            profile_path(Path::new("/p"), "work"),
            PathBuf::from("/p/work.json")
        );
    }
}

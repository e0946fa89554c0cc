//! Version command implementation

/// Release tag baked in at build time
const TAG: &str = match option_env!("NSSH_TAG") {
    Some(tag) => tag,
    None => env!("CARGO_PKG_VERSION"),
};

/// Commit baked in at build time
const COMMIT: &str = match option_env!("NSSH_COMMIT") {
    Some(commit) => commit,
    None => "tip",
};

/// `<tag> (<commit>)`
pub fn version_string() -> String {
    format!("{} ({})", TAG, COMMIT)
}

/// Execute the version command
pub fn version_command() {
    println!("{}", version_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string_shape() {
        let version = version_string();
        assert!(version.starts_with(TAG));
        assert!(version.ends_with(&format!("({})", COMMIT)));
        assert!(!TAG.is_empty());
    }
}

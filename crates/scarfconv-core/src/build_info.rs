//! Build metadata embedded by `build.rs`, shown by `scarfconv --version`.

/// Short git commit hash, suffixed with `-dirty` for uncommitted changes.
pub const GIT_HASH: &str = env!("SCARFCONV_GIT_HASH");

/// Unix epoch seconds at build time.
pub const BUILD_TIMESTAMP: &str = env!("SCARFCONV_BUILD_TIMESTAMP");

/// `debug` or `release`.
pub const BUILD_PROFILE: &str = env!("SCARFCONV_BUILD_PROFILE");

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version line such as `"0.1.0 (abc1234, release)"`.
pub fn version_string() -> String {
    format!("{VERSION} ({GIT_HASH}, {BUILD_PROFILE})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string_mentions_version_and_profile() {
        let v = version_string();
        assert!(v.starts_with(VERSION));
        assert!(v.contains(BUILD_PROFILE));
    }

    #[test]
    fn test_metadata_present() {
        assert!(!GIT_HASH.is_empty());
        assert!(BUILD_TIMESTAMP.parse::<u64>().is_ok());
    }
}

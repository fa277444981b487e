/// Build information captured at compile time by build.rs
pub struct BuildInfo;

impl BuildInfo {
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Build timestamp in YYYYMMDD.HHMMSS format
    pub fn build_timestamp() -> &'static str {
        env!("BUILD_TIMESTAMP")
    }

    /// Short git commit hash (first 7 characters)
    pub fn git_hash_short() -> &'static str {
        env!("GIT_HASH_SHORT")
    }

    /// Target platform (arch-os)
    pub fn target_platform() -> &'static str {
        env!("TARGET_PLATFORM")
    }

    /// Build profile (debug/release)
    pub fn build_profile() -> &'static str {
        env!("BUILD_PROFILE")
    }

    /// One-line banner for `--version` and the startup log
    pub fn summary() -> String {
        format!(
            "{} ({} {}, {} {})",
            Self::version(),
            Self::git_hash_short(),
            Self::build_timestamp(),
            Self::target_platform(),
            Self::build_profile()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_starts_with_version() {
        assert!(BuildInfo::summary().starts_with(BuildInfo::version()));
        assert_eq!(BuildInfo::build_timestamp().len(), "YYYYMMDD.HHMMSS".len());
    }
}

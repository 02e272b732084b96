//! Library for `e_release_fetcher`.
//!
//! Finds the latest published release of a RiseClipse validator on GitHub and
//! downloads versioned `.jar` artifacts.

pub mod e_release_download;
pub mod e_version;

pub use e_release_download::{FetchError, ReleaseFetcher};
pub use e_version::{ParseVersionError, VersionTriple};

/// Version of this library, used in the default User-Agent.
pub const LIB_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use crate::e_release_download::{download_version, get_latest_version};
    pub use crate::e_release_download::{FetchError, ReleaseFetcher, DEFAULT_BASE_URL};
    pub use crate::e_version::VersionTriple;
    pub use crate::user_agent::{get_user_agent, set_user_agent_override};
}

pub mod user_agent {
    use std::sync::OnceLock;
    static USER_AGENT_OVERRIDE: OnceLock<String> = OnceLock::new();

    /// Returns the current user agent string.
    /// Falls back to naming this library when no override was registered.
    pub fn get_user_agent() -> String {
        USER_AGENT_OVERRIDE.get().cloned().unwrap_or_else(|| {
            format!(
                "e_release_fetcher (https://crates.io/crates/e_release_fetcher) v{}",
                crate::LIB_VERSION
            )
        })
    }

    /// Sets the user agent string, usually to include the calling crate name.
    /// Only the first call has an effect.
    pub fn set_user_agent_override(ua: String) {
        let _ = USER_AGENT_OVERRIDE.set(ua);
    }
}

/// Registers the calling crate in the User-Agent sent to GitHub.
#[macro_export]
macro_rules! register_user_crate {
    () => {
        $crate::user_agent::set_user_agent_override(format!(
            "{} v{} [used by e_release_fetcher v{}]",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            $crate::LIB_VERSION
        ));
    };
}

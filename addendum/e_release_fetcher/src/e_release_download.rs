//! Module: e_release_download
//!
//! Queries the GitHub "latest release" page of a RiseClipse repository for the newest
//! version, and downloads the `.jar` attached to a given release.
//!
//! Both operations are plain blocking GETs. Nothing is retried; failures come back as a
//! [`FetchError`] and the caller decides whether that means "no result" or "skip".

use std::path::Path;
use std::time::Duration;

use log::{debug, error, info};

use crate::e_version::VersionTriple;

/// Where the RiseClipse repositories live.
pub const DEFAULT_BASE_URL: &str = "https://github.com/riseclipse";

/// Request timeout used unless overridden with [`ReleaseFetcher::with_timeout`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("getting {url} failed: {reason}")]
    Http { url: String, reason: String },
    #[error("getting {url} failed, error code: {status}")]
    Status { url: String, status: u16 },
    #[error("no <title> line found in {url}")]
    MissingTitle { url: String },
    #[error("release title does not name a version of {repository}: {title}")]
    UnexpectedTitle { repository: String, title: String },
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("network support is disabled (enable the `uses_reqwest` feature)")]
    Disabled,
}

/// Extracts the release version from the HTML of a GitHub release page.
///
/// The first line whose left-trimmed text starts with `<title>` must read
/// `<title>Release <repository> v<X.Y.Z> ...`.
///
/// ```
/// use e_release_fetcher::e_release_download::parse_release_title;
/// use e_release_fetcher::VersionTriple;
///
/// let html = "<html>\n  <title>Release demo v1.2.7 · riseclipse/demo · GitHub</title>\n";
/// assert_eq!(
///     parse_release_title(html, "demo").unwrap(),
///     Some(VersionTriple::new(1, 2, 7))
/// );
/// ```
pub fn parse_release_title(
    html: &str,
    repository: &str,
) -> Result<Option<VersionTriple>, FetchError> {
    let title = match html
        .lines()
        .map(str::trim_start)
        .find(|line| line.starts_with("<title>"))
    {
        Some(title) => title,
        None => return Ok(None),
    };
    let prefix = format!("<title>Release {} v", repository);
    let unexpected = || FetchError::UnexpectedTitle {
        repository: repository.to_string(),
        title: title.to_string(),
    };
    let rest = title.strip_prefix(&prefix).ok_or_else(unexpected)?;
    let token = rest.split_whitespace().next().ok_or_else(unexpected)?;
    token.parse().map(Some).map_err(|_| unexpected())
}

/// Blocking client for one RiseClipse release host.
#[derive(Debug, Clone)]
pub struct ReleaseFetcher {
    base_url: String,
    timeout: Duration,
}

impl Default for ReleaseFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseFetcher {
    pub fn new() -> Self {
        ReleaseFetcher {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Points the fetcher at another host (mirrors, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn release_page_url(&self, repository: &str) -> String {
        format!("{}/{}/releases/latest", self.base_url, repository)
    }

    /// `.../releases/download/<repository>-<version>/<name>-<version>.jar`
    pub fn download_url(&self, repository: &str, name: &str, version: &VersionTriple) -> String {
        format!(
            "{}/{}/releases/download/{}-{}/{}-{}.jar",
            self.base_url, repository, repository, version, name, version
        )
    }

    /// Retrieves the version of the latest release of `repository`.
    pub fn get_latest_version(&self, repository: &str) -> Result<VersionTriple, FetchError> {
        let url = self.release_page_url(repository);
        debug!("fetching latest release page {}", url);
        let result = self
            .get_text(&url)
            .and_then(|body| parse_release_title(&body, repository))
            .and_then(|version| version.ok_or(FetchError::MissingTitle { url }));
        if let Err(e) = &result {
            error!("{}", e);
        }
        result
    }

    /// Downloads `<name>-<version>.jar` from the `repository` release into `output`.
    /// Returns the number of bytes written.
    pub fn download_version(
        &self,
        repository: &str,
        name: &str,
        version: &VersionTriple,
        output: &Path,
    ) -> Result<u64, FetchError> {
        let url = self.download_url(repository, name, version);
        info!("downloading {} to {}", url, output.display());
        let bytes = match self.get_bytes(&url) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("{}", e);
                return Err(e);
            }
        };
        std::fs::write(output, &bytes).map_err(|source| FetchError::Io {
            path: output.display().to_string(),
            source,
        })?;
        Ok(bytes.len() as u64)
    }

    #[cfg(feature = "uses_reqwest")]
    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, FetchError> {
        let http_err = |e: reqwest::Error| FetchError::Http {
            url: url.to_string(),
            reason: e.to_string(),
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(crate::user_agent::get_user_agent())
            .build()
            .map_err(http_err)?;
        let resp = client.get(url).send().map_err(http_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }

    #[cfg(feature = "uses_reqwest")]
    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.get(url)?.text().map_err(|e| FetchError::Http {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    #[cfg(feature = "uses_reqwest")]
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.get(url)?
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::Http {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    #[cfg(not(feature = "uses_reqwest"))]
    fn get_text(&self, _url: &str) -> Result<String, FetchError> {
        Err(FetchError::Disabled)
    }

    #[cfg(not(feature = "uses_reqwest"))]
    fn get_bytes(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Disabled)
    }
}

/// Latest release of `repository` on the default host.
pub fn get_latest_version(repository: &str) -> Result<VersionTriple, FetchError> {
    ReleaseFetcher::new().get_latest_version(repository)
}

/// Downloads a release artifact from the default host.
pub fn download_version(
    repository: &str,
    name: &str,
    version: &VersionTriple,
    output: &Path,
) -> Result<u64, FetchError> {
    ReleaseFetcher::new().download_version(repository, name, version, output)
}

use std::fmt;
use std::str::FromStr;

/// A `major.minor.patch` release number.
///
/// Ordering is lexicographic on the three components, so the derived `Ord`
/// is exactly what version comparison needs.
///
/// # Example
/// ```
/// use e_release_fetcher::VersionTriple;
///
/// let current: VersionTriple = "1.2.7".parse().unwrap();
/// let latest = VersionTriple::new(1, 2, 10);
/// assert!(current < latest);
/// assert_eq!(latest.to_string(), "1.2.10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTriple {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl VersionTriple {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        VersionTriple {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a version of the form X.Y.Z")]
pub struct ParseVersionError(pub String);

impl FromStr for VersionTriple {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() != 3 {
            return Err(ParseVersionError(s.to_string()));
        }
        let parse = |p: &str| p.parse::<u32>().map_err(|_| ParseVersionError(s.to_string()));
        Ok(VersionTriple {
            major: parse(parts[0])?,
            minor: parse(parts[1])?,
            patch: parse(parts[2])?,
        })
    }
}

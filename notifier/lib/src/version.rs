//! Release version model.
//!
//! A [`Version`] is the `major.minor.patch` triple carried by a release tag.
//! Tags may carry a leading non-digit marker (`v1.2.3`, `release-1.2.3`,
//! `app-v1.2.3`); anything beyond the three numeric components, including
//! pre-release and build suffixes, is rejected.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A parsed release version.
///
/// Ordering and equality look only at `(major, minor, patch)`; the raw tag is
/// kept for display and links, so `v1.2.3 == 1.2.3`.
///
/// ## Examples
///
/// ```
/// use notifier_lib::Version;
///
/// let version = Version::parse("v1.4.2").unwrap();
/// assert_eq!((version.major(), version.minor(), version.patch()), (1, 4, 2));
/// assert_eq!(version.to_string(), "v1.4.2");
///
/// assert!(Version::parse("1.4").is_err());
/// assert!(Version::parse("v1.4.2-rc.1").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    raw: String,
}

impl Version {
    /// Parses a release tag such as `v1.2.3` or `1.2.3`.
    ///
    /// ## Errors
    ///
    /// Returns [`ParseError`] when the tag, after its prefix is stripped, is
    /// not exactly three dot-separated non-negative integers. A prefix made
    /// only of `-` signs (`-1.2.3`) or holding a path separator
    /// (`release/1.2.3`) is rejected as well.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let numeric = raw.trim_start_matches(|c: char| !c.is_ascii_digit());
        let prefix = &raw[..raw.len() - numeric.len()];
        if prefix.contains('/') || (!prefix.is_empty() && prefix.chars().all(|c| c == '-')) {
            return Err(ParseError::malformed(raw));
        }

        let parsed = semver::Version::parse(numeric).map_err(|_| ParseError::malformed(raw))?;
        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(ParseError::malformed(raw));
        }

        Ok(Self {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            raw: raw.to_string(),
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// The tag exactly as it was parsed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns `true` when both versions share `(major, minor)`, i.e. they
    /// differ at most by a patch bump.
    pub fn same_minor_line(&self, other: &Version) -> bool {
        self.major == other.major && self.minor == other.minor
    }

    fn components(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.components() == other.components()
    }
}

impl Eq for Version {}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components().cmp(&other.components())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Strips the `refs/<kind>/` prefix from a git ref.
///
/// Inputs that are not refs are returned unchanged.
///
/// ## Examples
///
/// ```
/// use notifier_lib::tag_from_ref;
///
/// assert_eq!(tag_from_ref("refs/tags/v1.2.3"), "v1.2.3");
/// assert_eq!(tag_from_ref("refs/heads/release/1.0.0"), "release/1.0.0");
/// assert_eq!(tag_from_ref("v1.2.3"), "v1.2.3");
/// ```
pub fn tag_from_ref(git_ref: &str) -> &str {
    match git_ref.strip_prefix("refs/") {
        Some(rest) => rest.split_once('/').map_or("", |(_, tag)| tag),
        None => git_ref,
    }
}

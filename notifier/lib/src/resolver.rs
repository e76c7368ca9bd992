//! Previous minor/major release resolution.
//!
//! Walks a newest-first history and returns the first release that is older
//! than the current one and sits on a different `(major, minor)` line. Patch
//! predecessors of the current release are passed over.

use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::github::ReleaseHost;
use crate::scanner::{ReleaseHistoryScanner, ReleaseRecord};
use crate::version::Version;

/// Outcome of a previous-release search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    /// Nearest earlier release with a different major or minor component.
    Found(Version),
    /// No such release within the examined history.
    NotFound,
}

impl ResolutionResult {
    /// The previous release, if one was found.
    pub fn found(&self) -> Option<&Version> {
        match self {
            Self::Found(version) => Some(version),
            Self::NotFound => None,
        }
    }
}

fn qualifies(current: &Version, candidate: &Version) -> bool {
    candidate < current && !candidate.same_minor_line(current)
}

/// Resolves the previous minor/major release from an in-memory history.
///
/// `history` is taken in the order given; it is never re-sorted.
///
/// ## Examples
///
/// ```
/// use notifier_lib::{resolve, ReleaseRecord, ResolutionResult, Version};
///
/// let current = Version::parse("2.3.2").unwrap();
/// let history = ["2.3.1", "2.3.0", "2.2.5", "2.0.0"]
///     .iter()
///     .enumerate()
///     .map(|(position, raw)| ReleaseRecord { version: Version::parse(raw).unwrap(), position });
///
/// let previous = resolve(&current, history);
/// assert_eq!(previous, ResolutionResult::Found(Version::parse("2.2.5").unwrap()));
/// ```
pub fn resolve<I>(current: &Version, history: I) -> ResolutionResult
where
    I: IntoIterator<Item = ReleaseRecord>,
{
    history
        .into_iter()
        .find(|record| qualifies(current, &record.version))
        .map_or(ResolutionResult::NotFound, |record| {
            ResolutionResult::Found(record.version)
        })
}

/// Resolves the previous minor/major release by driving `scanner`.
///
/// Stops pulling from the host as soon as an answer is known.
///
/// ## Errors
///
/// Returns [`TransportError`] if the scanner cannot fetch a page before an
/// answer is reached.
pub async fn resolve_scan<H: ReleaseHost>(
    current: &Version,
    mut scanner: ReleaseHistoryScanner<'_, H>,
) -> Result<ResolutionResult, TransportError> {
    while let Some(record) = scanner.next_record().await? {
        if qualifies(current, &record.version) {
            info!(
                previous = %record.version,
                position = record.position,
                "previous release identified"
            );
            return Ok(ResolutionResult::Found(record.version));
        }
        debug!(candidate = %record.version, "not a previous minor or major release");
    }

    if scanner.limit_reached() {
        warn!(
            lookback_limit = scanner.options().lookback_limit,
            "lookback limit reached without finding a previous minor or major release"
        );
    } else {
        info!(examined = scanner.yielded(), "no previous minor or major release in history");
    }

    Ok(ResolutionResult::NotFound)
}

//! Bounded, lazy walk over a repository's release history.
//!
//! The scanner pulls pages from a [`ReleaseHost`] only when the previous page
//! has been consumed, parses each tag, and stops after `lookback_limit`
//! parseable releases. Drafts and tags that are not `major.minor.patch`
//! versions are skipped without counting against the limit.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::TransportError;
use crate::github::{MAX_PAGE_SIZE, ReleaseEntry, ReleaseHost};
use crate::version::Version;

/// Default number of parseable releases examined before giving up.
pub const DEFAULT_LOOKBACK_LIMIT: usize = 20;

/// Default number of releases requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Bounds for a history scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Maximum number of parseable releases yielded.
    pub lookback_limit: usize,
    /// Releases requested per page; clamped to `1..=100`.
    pub page_size: u32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            lookback_limit: DEFAULT_LOOKBACK_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ScanOptions {
    fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// One parsed release from the history, with its 0-based position among the
/// yielded records (newest first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub version: Version,
    pub position: usize,
}

/// Lazy, non-restartable iterator over a repository's releases.
///
/// ## Examples
///
/// ```rust,no_run
/// use notifier_lib::{GitHubClient, ReleaseHistoryScanner, ScanOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GitHubClient::new("https://api.github.com", "ghp_xxx");
/// let mut scanner = ReleaseHistoryScanner::new(&client, "tokio-rs/tokio", ScanOptions::default());
///
/// while let Some(record) = scanner.next_record().await? {
///     println!("{}: {}", record.position, record.version);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ReleaseHistoryScanner<'a, H> {
    host: &'a H,
    repository: &'a str,
    options: ScanOptions,
    next_page: u32,
    pending: VecDeque<ReleaseEntry>,
    yielded: usize,
    last_page_seen: bool,
}

impl<'a, H: ReleaseHost> ReleaseHistoryScanner<'a, H> {
    pub fn new(host: &'a H, repository: &'a str, options: ScanOptions) -> Self {
        Self {
            host,
            repository,
            options,
            next_page: 1,
            pending: VecDeque::new(),
            yielded: 0,
            last_page_seen: false,
        }
    }

    /// Returns the next parseable release, newest first, or `None` once the
    /// history or the lookback limit is exhausted.
    ///
    /// ## Errors
    ///
    /// Returns the host's [`TransportError`] when a page cannot be fetched.
    /// The scanner is finished afterwards and yields `None`.
    pub async fn next_record(&mut self) -> Result<Option<ReleaseRecord>, TransportError> {
        while !self.limit_reached() {
            let Some(entry) = self.pending.pop_front() else {
                if self.last_page_seen {
                    return Ok(None);
                }
                self.fetch_next_page().await?;
                continue;
            };

            if entry.draft {
                debug!(tag = %entry.tag_name, "skipping draft release");
                continue;
            }

            match Version::parse(&entry.tag_name) {
                Ok(version) => {
                    let record = ReleaseRecord {
                        version,
                        position: self.yielded,
                    };
                    self.yielded += 1;
                    return Ok(Some(record));
                }
                Err(err) => debug!(%err, "skipping release with unparseable tag"),
            }
        }

        Ok(None)
    }

    /// Whether `lookback_limit` records have been yielded.
    pub fn limit_reached(&self) -> bool {
        self.yielded >= self.options.lookback_limit
    }

    /// Number of records yielded so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    pub fn options(&self) -> ScanOptions {
        self.options
    }

    async fn fetch_next_page(&mut self) -> Result<(), TransportError> {
        let page = self.next_page;
        let per_page = self.options.effective_page_size();

        let entries = match self
            .host
            .list_releases(self.repository, page, per_page)
            .await
        {
            Ok(entries) => entries,
            Err(err) => {
                self.last_page_seen = true;
                return Err(err);
            }
        };

        debug!(page, count = entries.len(), "fetched release page");

        self.next_page += 1;
        if entries.len() < per_page as usize {
            self.last_page_seen = true;
        }
        self.pending.extend(entries);

        Ok(())
    }
}

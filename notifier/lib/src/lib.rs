//! Release notification library.
//!
//! Announces a new release in a Slack channel together with the nearest
//! earlier release on a different major or minor line, so readers can tell a
//! patch from a feature release at a glance.
//!
//! ## Pipeline
//!
//! - [`Version`] / [`tag_from_ref`] - parse the triggering tag
//! - [`ReleaseHistoryScanner`] - bounded, lazy walk over the release history
//! - [`resolve`] / [`resolve_scan`] - find the previous minor or major release
//! - [`compose`] - format the Slack message
//! - [`Notifier`] - runs the whole pipeline
//!
//! ## Collaborators
//!
//! - [`ReleaseHost`] / [`GitHubClient`] - paginated release listing
//! - [`ChatDelivery`] / [`SlackClient`] - message delivery
//!
//! ## Examples
//!
//! ```rust,no_run
//! use notifier_lib::{GitHubClient, Notifier, ReleaseEvent, ScanOptions, SlackClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let github = GitHubClient::new("https://api.github.com", "ghp_xxx");
//! let slack = SlackClient::new("https://slack.com/api/", "xoxb-xxx", "C0123456");
//!
//! let event = ReleaseEvent {
//!     actor: "octocat".into(),
//!     repository: "acme/widget".into(),
//!     git_ref: "refs/tags/v1.5.0".into(),
//!     event_name: "release".into(),
//!     activity: "published".into(),
//!     server_url: "https://github.com".into(),
//! };
//!
//! let notification = Notifier::new(github, slack)
//!     .with_options(ScanOptions::default())
//!     .notify(&event)
//!     .await?;
//! println!("{}", notification.message);
//! # Ok(())
//! # }
//! ```

mod compose;
mod error;
mod github;
mod notifier;
mod resolver;
mod scanner;
mod slack;
mod version;

pub use compose::compose;
pub use error::{NotifierError, ParseError, Result, TransportError};
pub use github::{GitHubClient, MAX_PAGE_SIZE, ReleaseEntry, ReleaseHost};
pub use notifier::{Notification, Notifier, ReleaseEvent};
pub use resolver::{ResolutionResult, resolve, resolve_scan};
pub use scanner::{
    DEFAULT_LOOKBACK_LIMIT, DEFAULT_PAGE_SIZE, ReleaseHistoryScanner, ReleaseRecord, ScanOptions,
};
pub use slack::{ChatDelivery, DEFAULT_SLACK_API_URL, SlackClient};
pub use version::{Version, tag_from_ref};

//! End-to-end notification pipeline.
//!
//! ref → [`Version`] → history scan → previous release → message → chat.
//! Any failure aborts before anything is delivered.

use tracing::info;

use crate::compose::compose;
use crate::error::Result;
use crate::github::ReleaseHost;
use crate::resolver::{ResolutionResult, resolve_scan};
use crate::scanner::{ReleaseHistoryScanner, ScanOptions};
use crate::slack::ChatDelivery;
use crate::version::{Version, tag_from_ref};

/// Metadata of the release event that triggered the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEvent {
    /// User who triggered the event.
    pub actor: String,
    /// Repository in `owner/name` form.
    pub repository: String,
    /// Git ref of the release, e.g. `refs/tags/v1.2.3`.
    pub git_ref: String,
    /// Name of the triggering event, e.g. `release`.
    pub event_name: String,
    /// Human description of what happened, e.g. `published`.
    pub activity: String,
    /// Web UI base URL, e.g. `https://github.com`.
    pub server_url: String,
}

/// A composed notification and the versions it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub current: Version,
    pub previous: ResolutionResult,
    pub message: String,
}

/// Runs the release notification pipeline against a release host and a chat
/// destination.
#[derive(Debug)]
pub struct Notifier<H, C> {
    host: H,
    chat: C,
    options: ScanOptions,
}

impl<H: ReleaseHost, C: ChatDelivery> Notifier<H, C> {
    pub fn new(host: H, chat: C) -> Self {
        Self {
            host,
            chat,
            options: ScanOptions::default(),
        }
    }

    /// Sets the history scan bounds.
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolves the previous release and composes the message without
    /// delivering it.
    ///
    /// ## Errors
    ///
    /// - [`NotifierError::Parse`](crate::NotifierError::Parse) if the event's ref is not a version
    /// - [`NotifierError::Transport`](crate::NotifierError::Transport) if the release host fails
    #[tracing::instrument(skip_all, fields(repository = %event.repository, git_ref = %event.git_ref))]
    pub async fn prepare(&self, event: &ReleaseEvent) -> Result<Notification> {
        let current = Version::parse(tag_from_ref(&event.git_ref))?;
        info!(current = %current, event = %event.event_name, "processing current release");

        let scanner = ReleaseHistoryScanner::new(&self.host, &event.repository, self.options);
        let previous = resolve_scan(&current, scanner).await?;

        let message = compose(
            &event.server_url,
            &event.repository,
            &previous,
            &current,
            &event.actor,
            &event.activity,
        );

        Ok(Notification {
            current,
            previous,
            message,
        })
    }

    /// Prepares the notification and hands it to the chat destination.
    ///
    /// ## Errors
    ///
    /// Everything [`prepare`](Self::prepare) returns, plus
    /// [`NotifierError::Transport`](crate::NotifierError::Transport) if delivery fails.
    pub async fn notify(&self, event: &ReleaseEvent) -> Result<Notification> {
        let notification = self.prepare(event).await?;
        self.chat.deliver(&notification.message).await?;
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NotifierError, TransportError};
    use crate::scanner::tests::PagedHost;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingChat {
        sent: RefCell<Vec<String>>,
        fail: bool,
    }

    impl ChatDelivery for RecordingChat {
        async fn deliver(&self, message: &str) -> std::result::Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::Slack("invalid_auth".into()));
            }
            self.sent.borrow_mut().push(message.to_string());
            Ok(())
        }
    }

    fn event(git_ref: &str) -> ReleaseEvent {
        ReleaseEvent {
            actor: "octocat".into(),
            repository: "acme/widget".into(),
            git_ref: git_ref.into(),
            event_name: "release".into(),
            activity: "published".into(),
            server_url: "https://github.com".into(),
        }
    }

    #[tokio::test]
    async fn notifies_with_previous_release() {
        let host = PagedHost::new(&["v1.5.0", "v1.4.9", "v1.4.0"]);
        let notifier = Notifier::new(host, RecordingChat::default());

        let notification = notifier.notify(&event("refs/tags/v1.5.0")).await.unwrap();

        assert_eq!(notification.current.raw(), "v1.5.0");
        assert_eq!(notification.previous.found().map(Version::raw), Some("v1.4.9"));
        assert_eq!(*notifier.chat.sent.borrow(), [notification.message.clone()]);
        assert!(notification.message.contains("compare/v1.4.9...v1.5.0"));
    }

    #[tokio::test]
    async fn notifies_without_previous_release() {
        let host = PagedHost::new(&["v0.1.1", "v0.1.0"]);
        let notifier = Notifier::new(host, RecordingChat::default());

        let notification = notifier.notify(&event("refs/tags/v0.1.1")).await.unwrap();

        assert_eq!(notification.previous, ResolutionResult::NotFound);
        assert_eq!(notifier.chat.sent.borrow().len(), 1);
    }

    #[tokio::test]
    async fn malformed_current_tag_is_fatal_and_sends_nothing() {
        let host = PagedHost::new(&["v1.0.0"]);
        let notifier = Notifier::new(host, RecordingChat::default());

        let err = notifier.notify(&event("refs/heads/main")).await.unwrap_err();

        assert!(matches!(err, NotifierError::Parse(ref e) if e.input == "main"));
        assert!(notifier.host.pages_requested().is_empty());
        assert!(notifier.chat.sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn host_failure_sends_nothing() {
        let host = PagedHost::new(&["v1.0.0"]).failing_on(1);
        let notifier = Notifier::new(host, RecordingChat::default());

        let err = notifier.notify(&event("refs/tags/v1.1.0")).await.unwrap_err();

        assert!(matches!(
            err,
            NotifierError::Transport(TransportError::RateLimitExceeded)
        ));
        assert!(notifier.chat.sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_reported() {
        let host = PagedHost::new(&["v1.0.0"]);
        let chat = RecordingChat {
            fail: true,
            ..Default::default()
        };
        let notifier = Notifier::new(host, chat);

        let err = notifier.notify(&event("refs/tags/v1.1.0")).await.unwrap_err();
        assert!(matches!(err, NotifierError::Transport(TransportError::Slack(_))));
    }

    #[tokio::test]
    async fn respects_lookback_limit() {
        let host = PagedHost::new(&["1.2.2", "1.2.1", "1.2.0", "1.1.0"]);
        let notifier = Notifier::new(host, RecordingChat::default()).with_options(ScanOptions {
            lookback_limit: 3,
            page_size: 2,
        });

        let notification = notifier.prepare(&event("1.2.3")).await.unwrap();

        assert_eq!(notification.previous, ResolutionResult::NotFound);
        assert_eq!(notifier.host.pages_requested(), [1, 2]);
        assert!(notifier.chat.sent.borrow().is_empty());
    }
}

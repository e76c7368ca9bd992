//! Slack message composition.
//!
//! Messages use Slack mrkdwn: links are written `<url|label>` and the
//! characters `&`, `<` and `>` in free text must be escaped. Values placed
//! inside a link target are percent-encoded instead, so a `|` or `>` in an
//! actor name or tag cannot end the link early.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::resolver::ResolutionResult;
use crate::version::Version;

/// Characters left as-is in a single URL path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Like [`PATH_SEGMENT`], but keeps the `/` of `owner/name`.
const REPOSITORY_PATH: &AsciiSet = &PATH_SEGMENT.remove(b'/');

/// Escapes free text for Slack mrkdwn and folds it onto one line.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace(['\r', '\n'], " ")
}

/// Formats the release notification for `current`.
///
/// The message links the release's tag page, the repository and the actor,
/// quotes the activity, and names the previous minor or major release
/// together with a compare link when one was found.
///
/// ## Examples
///
/// ```
/// use notifier_lib::{compose, ResolutionResult, Version};
///
/// let current = Version::parse("v1.5.0").unwrap();
/// let previous = ResolutionResult::Found(Version::parse("v1.4.9").unwrap());
///
/// let message = compose("https://github.com", "acme/widget", &previous, &current, "octocat", "published");
/// assert!(message.contains("<https://github.com/acme/widget/releases/tag/v1.5.0|acme/widget v1.5.0>"));
/// assert!(message.contains("<https://github.com/acme/widget/compare/v1.4.9...v1.5.0|compare>"));
/// ```
pub fn compose(
    server_url: &str,
    repository: &str,
    previous: &ResolutionResult,
    current: &Version,
    actor: &str,
    activity: &str,
) -> String {
    let server = escape(server_url.trim_end_matches('/'));
    let repo_url = format!(
        "{server}/{}",
        utf8_percent_encode(repository, REPOSITORY_PATH)
    );
    let repo_label = escape(repository);
    let current_tag = utf8_percent_encode(current.raw(), PATH_SEGMENT);
    let current_label = escape(current.raw());

    let previous_part = match previous {
        ResolutionResult::Found(prev) => {
            let prev_tag = utf8_percent_encode(prev.raw(), PATH_SEGMENT);
            format!(
                "previous minor or major release: <{repo_url}/releases/tag/{prev_tag}|{}> \
                 (<{repo_url}/compare/{prev_tag}...{current_tag}|compare>)",
                escape(prev.raw()),
            )
        }
        ResolutionResult::NotFound => "no previous minor or major release found".to_string(),
    };

    format!(
        "*<{repo_url}/releases/tag/{current_tag}|{repo_label} {current_label}>* - \
         <{server}/{actor_path}|{actor_label}> performed activity \"{activity}\" \
         on <{repo_url}|{repo_label}> - {previous_part}",
        actor_path = utf8_percent_encode(actor, PATH_SEGMENT),
        actor_label = escape(actor),
        activity = escape(activity),
    )
}

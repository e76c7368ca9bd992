//! Release notifier CLI - announces a published release in Slack

use clap::{ArgAction, Parser};
use notifier_lib::{
    ChatDelivery, DEFAULT_LOOKBACK_LIMIT, DEFAULT_PAGE_SIZE, DEFAULT_SLACK_API_URL, GitHubClient,
    MAX_PAGE_SIZE, Notifier, NotifierError, ReleaseEvent, ReleaseHost, ScanOptions, SlackClient,
    TransportError,
};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Announce a published release in Slack, noting the previous minor or major release.
///
/// Every option falls back to the environment variable GitHub Actions (or the
/// workflow) provides, so inside a workflow the binary usually runs without
/// arguments.
#[derive(Debug, Parser)]
#[command(name = "release-notifier", version)]
#[command(about = "Announce a published release in Slack with its previous minor or major release", long_about = None)]
struct Cli {
    /// User who triggered the release
    #[arg(long, env = "GITHUB_ACTOR")]
    actor: Option<String>,

    /// Repository in owner/name form
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// Git ref of the release (e.g. refs/tags/v1.2.3)
    #[arg(long = "ref", env = "GITHUB_REF", value_name = "REF")]
    git_ref: Option<String>,

    /// Name of the triggering event
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    event: Option<String>,

    /// Description of the activity (e.g. published)
    #[arg(long, env = "GH_EVENT_ACTIVITY")]
    activity: Option<String>,

    /// GitHub web UI base URL
    #[arg(long, env = "GITHUB_SERVER_URL", value_name = "URL")]
    server_url: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", value_name = "URL")]
    github_api_url: Option<String>,

    /// Token used to list releases
    #[arg(long, env = "GH_API_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    github_token: Option<String>,

    /// Slack Web API base URL
    #[arg(long, env = "SLACK_API_URL", default_value = DEFAULT_SLACK_API_URL, value_name = "URL")]
    slack_api_url: String,

    /// Slack bot token (not needed with --dry-run)
    #[arg(long, env = "SLACK_API_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    slack_token: Option<String>,

    /// Slack channel ID (not needed with --dry-run)
    #[arg(long, env = "SLACK_CHANNEL_ID", value_name = "CHANNEL")]
    slack_channel: Option<String>,

    /// Maximum number of releases examined when looking for the previous release
    #[arg(long, env = "RELEASE_LOOKBACK_LIMIT", default_value_t = DEFAULT_LOOKBACK_LIMIT)]
    lookback_limit: usize,

    /// Releases requested per GitHub API page
    #[arg(
        long,
        env = "RELEASE_PAGE_SIZE",
        default_value_t = DEFAULT_PAGE_SIZE,
        value_parser = clap::value_parser!(u32).range(1..=MAX_PAGE_SIZE as i64)
    )]
    page_size: u32,

    /// Print the message to stdout instead of posting it to Slack
    #[arg(long)]
    dry_run: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = ArgAction::Count)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("value should not be empty: {0}")]
    MissingValue(&'static str),

    #[error(transparent)]
    Notify(#[from] NotifierError),
}

/// Where the composed message goes.
#[derive(Debug, PartialEq, Eq)]
enum Delivery {
    Slack {
        api_url: String,
        token: String,
        channel: String,
    },
    DryRun,
}

/// Validated run configuration.
#[derive(Debug)]
struct Settings {
    event: ReleaseEvent,
    github_api_url: String,
    github_token: String,
    delivery: Delivery,
    options: ScanOptions,
}

fn required(value: Option<String>, name: &'static str) -> Result<String, CliError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CliError::MissingValue(name)),
    }
}

impl Cli {
    fn into_settings(self) -> Result<Settings, CliError> {
        let event = ReleaseEvent {
            actor: required(self.actor, "--actor (GITHUB_ACTOR)")?,
            repository: required(self.repository, "--repository (GITHUB_REPOSITORY)")?,
            git_ref: required(self.git_ref, "--ref (GITHUB_REF)")?,
            event_name: required(self.event, "--event (GITHUB_EVENT_NAME)")?,
            activity: required(self.activity, "--activity (GH_EVENT_ACTIVITY)")?,
            server_url: required(self.server_url, "--server-url (GITHUB_SERVER_URL)")?,
        };
        let github_api_url = required(self.github_api_url, "--github-api-url (GITHUB_API_URL)")?;
        let github_token = required(self.github_token, "--github-token (GH_API_TOKEN)")?;

        let delivery = if self.dry_run {
            Delivery::DryRun
        } else {
            Delivery::Slack {
                api_url: required(Some(self.slack_api_url), "--slack-api-url (SLACK_API_URL)")?,
                token: required(self.slack_token, "--slack-token (SLACK_API_TOKEN)")?,
                channel: required(self.slack_channel, "--slack-channel (SLACK_CHANNEL_ID)")?,
            }
        };

        Ok(Settings {
            event,
            github_api_url,
            github_token,
            delivery,
            options: ScanOptions {
                lookback_limit: self.lookback_limit,
                page_size: self.page_size,
            },
        })
    }
}

/// Prints the message instead of delivering it.
struct StdoutChat;

impl ChatDelivery for StdoutChat {
    async fn deliver(&self, message: &str) -> Result<(), TransportError> {
        println!("{message}");
        Ok(())
    }
}

/// Initialize tracing subscriber based on verbosity and output format
fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG wins over the -v flags
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,notifier_lib=info,release_notifier=info".to_string(),
            2 => "info,notifier_lib=debug,release_notifier=debug".to_string(),
            _ => "debug,notifier_lib=trace,release_notifier=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        // stdout is reserved for --dry-run output
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(false)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

async fn send<H: ReleaseHost, C: ChatDelivery>(
    notifier: Notifier<H, C>,
    event: &ReleaseEvent,
) -> Result<(), CliError> {
    let notification = notifier.notify(event).await?;
    info!(
        current = %notification.current,
        previous = ?notification.previous.found().map(|v| v.raw()),
        "release notification sent"
    );
    Ok(())
}

#[tracing::instrument(skip_all)]
async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = cli.into_settings()?;
    let github = GitHubClient::new(settings.github_api_url, settings.github_token);

    match settings.delivery {
        Delivery::Slack {
            api_url,
            token,
            channel,
        } => {
            let slack = SlackClient::new(api_url, token, channel);
            let notifier = Notifier::new(github, slack).with_options(settings.options);
            send(notifier, &settings.event).await
        }
        Delivery::DryRun => {
            let notifier = Notifier::new(github, StdoutChat).with_options(settings.options);
            send(notifier, &settings.event).await
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.json);

    if let Err(e) = run(cli).await {
        error!(error = %e, "release notification failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

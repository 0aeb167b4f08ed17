//! satwatch - command-line client for the satellite monitoring service.
//!
//! Wraps the session-aware API client: log in once, then query detections,
//! alerts, investigations and statistics. Expired access tokens are
//! refreshed transparently; when the session cannot be recovered the
//! command exits with a prompt to log in again.

mod commands;
mod output;

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use satwatch_core::api::endpoints::DEFAULT_ANALYSIS_MONTHS;
use satwatch_core::config::{Config, TokenStoreKind};
use satwatch_core::models::{AlertStatus, ValidationStatus};
use satwatch_core::{ApiClient, ApiError};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use output::Output;

// ============================================================================
// Constants
// ============================================================================

/// Prefix for the daily rolling log file in the cache directory
const LOG_FILE_PREFIX: &str = "satwatch.log";

/// Exit status when the session ended and the user must log in again
const EXIT_SESSION_ENDED: u8 = 2;

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "satwatch", version, about = "Command-line client for the satellite monitoring service")]
struct Cli {
    /// API base URL (overrides SATWATCH_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Where tokens are kept: memory, file or keyring
    #[arg(long, global = true, value_parser = parse_store)]
    store: Option<TokenStoreKind>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the stored tokens
    Logout,
    /// Show the session and a dashboard overview
    Status,
    /// Show the account profile
    Profile,
    /// List satellite images
    Images {
        /// Only images captured recently
        #[arg(long)]
        recent: bool,
    },
    /// Run a new analysis on recent imagery
    Analyze {
        /// How many months of imagery to analyse
        #[arg(long, default_value_t = DEFAULT_ANALYSIS_MONTHS)]
        months: u32,
    },
    /// List anomaly detections
    Detections {
        /// Only detections with confidence of 80% or more
        #[arg(long, conflicts_with_all = ["status", "page"])]
        high_confidence: bool,
        /// Filter by validation status (e.g. detected, confirmed, false-positive)
        #[arg(long, value_parser = parse_validation_status)]
        status: Option<ValidationStatus>,
        /// Page number, starting at 1
        #[arg(long)]
        page: Option<u32>,
    },
    /// Set the validation status of a detection
    Validate {
        id: i64,
        /// validated, confirmed or false-positive
        #[arg(value_parser = parse_review_status)]
        status: ValidationStatus,
    },
    /// List alerts, most severe first
    Alerts {
        #[command(flatten)]
        filter: AlertFilter,
    },
    /// Change the status of an alert
    AlertStatus {
        id: i64,
        #[arg(value_parser = parse_alert_status)]
        status: AlertStatus,
        /// Assign the alert to this user id
        #[arg(long)]
        assign: Option<i64>,
    },
    /// List field investigations
    Investigations {
        #[command(flatten)]
        filter: InvestigationFilter,
    },
    /// Show field agents and their workload
    Agents,
    /// List monitored regions
    Regions,
    /// List financial risk assessments
    Risks {
        #[arg(long)]
        high_impact: bool,
    },
    /// Show the audit event log
    Events {
        #[command(flatten)]
        view: EventView,
    },
    /// Show statistics
    Stats {
        #[arg(value_enum, default_value_t = StatsView::Dashboard)]
        view: StatsView,
        /// Look-back window for trends
        #[arg(long)]
        days: Option<u32>,
    },
    /// Interpret the spectral indices of an image
    Spectral {
        image_id: i64,
        /// Earlier image of the same area to compare against
        #[arg(long)]
        reference: Option<i64>,
    },
    /// List generated reports
    Reports,
}

#[derive(Debug, Clone, Copy, Args)]
#[group(multiple = false)]
pub(crate) struct AlertFilter {
    /// Only active alerts
    #[arg(long)]
    pub active: bool,
    /// Only critical alerts
    #[arg(long)]
    pub critical: bool,
}

#[derive(Debug, Clone, Copy, Args)]
#[group(multiple = false)]
pub(crate) struct InvestigationFilter {
    /// Only investigations waiting for an agent
    #[arg(long)]
    pub pending: bool,
    /// Only investigations assigned to me
    #[arg(long)]
    pub mine: bool,
}

#[derive(Debug, Clone, Copy, Args)]
#[group(multiple = false)]
pub(crate) struct EventView {
    /// Events from the last 24 hours
    #[arg(long)]
    pub recent: bool,
    /// Event counts grouped by type
    #[arg(long)]
    pub by_type: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum StatsView {
    Dashboard,
    Summary,
    Trends,
    Financial,
}

fn parse_store(s: &str) -> Result<TokenStoreKind, String> {
    s.parse::<TokenStoreKind>().map_err(|e| e.to_string())
}

fn parse_validation_status(s: &str) -> Result<ValidationStatus, String> {
    ValidationStatus::from_str(s).ok_or_else(|| {
        format!("unknown status '{}' (expected detected, validated, confirmed or false-positive)", s)
    })
}

/// Only review outcomes can be set by hand
fn parse_review_status(s: &str) -> Result<ValidationStatus, String> {
    match ValidationStatus::from_str(s) {
        Some(status) if status.is_review_outcome() => Ok(status),
        Some(status) => Err(format!("'{}' is set by the detector and cannot be chosen", status)),
        None => Err(format!(
            "unknown status '{}' (expected validated, confirmed or false-positive)",
            s
        )),
    }
}

fn parse_alert_status(s: &str) -> Result<AlertStatus, String> {
    AlertStatus::from_str(s).ok_or_else(|| {
        format!("unknown status '{}' (expected active, acknowledged, resolved or false-alarm)", s)
    })
}

// ============================================================================
// Entry point
// ============================================================================

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` controls the level (default `warn`). Logs go to stderr and,
/// when the cache directory is usable, to a daily rolling file there.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match config.cache_dir() {
        Ok(dir) if std::fs::create_dir_all(&dir).is_ok() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn build_client(cli: &Cli, config: &Config) -> Result<ApiClient> {
    let store = config.open_token_store()?;
    match cli.api_url.as_deref() {
        Some(url) => ApiClient::with_timeout(
            url,
            store,
            Duration::from_secs(config.request_timeout_secs),
        ),
        None => ApiClient::from_config(config, store),
    }
}

async fn run(cli: Cli, mut config: Config) -> Result<()> {
    if let Some(store) = cli.store {
        config.token_store = store;
    }
    let client = build_client(&cli, &config)?;
    info!(api = client.base_url(), store = ?config.token_store, "satwatch starting");

    commands::dispatch(cli.command, &client, &config, Output::new(cli.json)).await
}

/// True when the failure means the user has to log in again
fn is_session_ended(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ApiError>())
        .any(|e| e.is_session_ended())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let _guard = init_tracing(&config);
    if let Some(e) = config_error {
        warn!(error = %e, "Ignoring unreadable config file, using defaults");
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_session_ended(&e) => {
            eprintln!("Session ended. Run `satwatch login` to sign in again.");
            ExitCode::from(EXIT_SESSION_ENDED)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["satwatch", "alerts", "--critical", "--json", "--store", "memory"])
            .expect("parse");
        assert!(cli.json);
        assert_eq!(cli.store, Some(TokenStoreKind::Memory));
        match cli.command {
            Command::Alerts { filter } => {
                assert!(filter.critical);
                assert!(!filter.active);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_alert_filters_are_exclusive() {
        assert!(Cli::try_parse_from(["satwatch", "alerts", "--active", "--critical"]).is_err());
    }

    #[test]
    fn test_parse_validation_status_argument() {
        let cli = Cli::try_parse_from(["satwatch", "validate", "12", "false-positive"]).expect("parse");
        match cli.command {
            Command::Validate { id, status } => {
                assert_eq!(id, 12);
                assert_eq!(status, ValidationStatus::FalsePositive);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["satwatch", "validate", "12", "maybe"]).is_err());
    }

    #[test]
    fn test_validate_rejects_detected() {
        assert!(Cli::try_parse_from(["satwatch", "validate", "12", "detected"]).is_err());
        assert!(parse_review_status("DETECTED").is_err());
        assert_eq!(parse_review_status("confirmed"), Ok(ValidationStatus::Confirmed));

        // Still a valid filter when listing
        let cli = Cli::try_parse_from(["satwatch", "detections", "--status", "detected"]).expect("parse");
        assert!(matches!(
            cli.command,
            Command::Detections { status: Some(ValidationStatus::Detected), .. }
        ));
    }

    #[test]
    fn test_alert_status_with_assignee() {
        let cli = Cli::try_parse_from(["satwatch", "alert-status", "3", "acknowledged", "--assign", "8"])
            .expect("parse");
        match cli.command {
            Command::AlertStatus { id, status, assign } => {
                assert_eq!(id, 3);
                assert_eq!(status, AlertStatus::Acknowledged);
                assert_eq!(assign, Some(8));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_stats_defaults_to_dashboard() {
        let cli = Cli::try_parse_from(["satwatch", "stats"]).expect("parse");
        assert!(matches!(cli.command, Command::Stats { view: StatsView::Dashboard, days: None }));

        let cli = Cli::try_parse_from(["satwatch", "stats", "trends", "--days", "7"]).expect("parse");
        assert!(matches!(cli.command, Command::Stats { view: StatsView::Trends, days: Some(7) }));
    }

    #[test]
    fn test_analyze_default_window() {
        let cli = Cli::try_parse_from(["satwatch", "analyze"]).expect("parse");
        assert!(matches!(cli.command, Command::Analyze { months } if months == DEFAULT_ANALYSIS_MONTHS));
    }

    #[test]
    fn test_session_end_is_found_through_context() {
        let err = anyhow::Error::new(ApiError::Unauthorized).context("Failed to load alerts");
        assert!(is_session_ended(&err));

        let other = anyhow::Error::new(ApiError::InvalidCredentials);
        assert!(!is_session_ended(&other));
    }
}

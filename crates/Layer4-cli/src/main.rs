//! castdesk CLI - Main entry point

mod cli;
mod clipboard;
mod format;
mod tui;

use castdesk_api::{
    day_end, day_start, ApiError, ArtifactKind, HttpTaskApi, StatusFilter, TaskFilter, Visibility,
};
use castdesk_foundation::{ConsoleConfig, Error as FoundationError, JsonStore};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE: &str = "castdesk.log";

/// castdesk - terminal console for podcast processing tasks
#[derive(Parser, Debug)]
#[command(name = "castdesk")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Backend base URL (overrides env and config)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token for the backend (overrides env and config)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive task list (default)
    Tui,
    /// List one page of tasks
    List {
        /// all, pending, processing, completed, failed
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
        /// all, public, private
        #[arg(short, long, default_value = "all")]
        visibility: Visibility,
        /// Title keyword
        #[arg(long, default_value = "")]
        title: String,
        /// Source URL keyword
        #[arg(long, default_value = "")]
        url: String,
        /// Created on or after (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        /// Created on or before (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        /// Ignore the default one-month window
        #[arg(long, conflicts_with_all = ["from", "to"])]
        all_dates: bool,
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Rows per page (default: config pageSize)
        #[arg(short, long)]
        rows: Option<u32>,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one task
    Show {
        task_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Submit a source URL for processing
    Create {
        url: String,
        /// Make the task public
        #[arg(long)]
        public: bool,
    },
    /// Change title and/or visibility
    Edit {
        task_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "private")]
        public: bool,
        #[arg(long)]
        private: bool,
    },
    /// Delete a task
    Delete { task_id: String },
    /// Re-queue a failed task
    Retry { task_id: String },
    /// Download an artifact
    Download {
        task_id: String,
        /// audio-cn, audio-en, subtitle-cn, subtitle-en
        #[arg(value_parser = parse_artifact)]
        artifact: ArtifactKind,
        /// Target directory (default: config downloadDir)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Poll a task until it completes or fails
    Watch {
        task_id: String,
        /// Seconds between polls (default: config pollIntervalSecs)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Print the effective configuration
    Config {
        /// Write it to the global config file
        #[arg(long)]
        save: bool,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    format::parse_day(value).ok_or_else(|| format!("expected YYYY-MM-DD, got '{}'", value))
}

fn parse_artifact(value: &str) -> Result<ArtifactKind, String> {
    ArtifactKind::from_slug(value.trim()).ok_or_else(|| {
        let known: Vec<&str> = ArtifactKind::ALL.iter().map(|k| k.slug()).collect();
        format!("unknown artifact '{}', expected one of {}", value, known.join(", "))
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Tui);
    let interactive = matches!(command, Command::Tui);

    init_logging(args.debug, interactive)?;

    // Load configuration: global → project → env → CLI flags
    let mut config = ConsoleConfig::load()?;
    if let Some(base_url) = args.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(token) = args.token {
        config = config.with_api_token(token);
    }
    config.validate()?;
    tracing::debug!(base_url = config.base_url(), "Configuration loaded");

    if let Command::Config { save } = command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        if save {
            config.save_global()?;
            println!("\n✓ Saved to global config");
        }
        return Ok(());
    }

    if interactive {
        tui::theme::set_theme(tui::theme::Theme::from_name(config.theme_name()));
        return tui::run(&config).await;
    }

    let api = HttpTaskApi::from_config(&config)?;
    let result = match command {
        Command::List {
            status,
            visibility,
            title,
            url,
            from,
            to,
            all_dates,
            page,
            rows,
            json,
        } => {
            let mut filter = if all_dates || from.is_some() || to.is_some() {
                TaskFilter::default()
            } else {
                TaskFilter::with_default_range(&Local::now())
            };
            filter.status = status;
            filter.visibility = visibility;
            filter.title_keyword = title;
            filter.url_keyword = url;
            filter.start_date = from.map(|d| day_start(&Local, d)).or(filter.start_date);
            filter.end_date = to.map(|d| day_end(&Local, d)).or(filter.end_date);

            let rows = rows.unwrap_or_else(|| config.page_size());
            cli::list(&api, filter, page.saturating_sub(1), rows, json).await
        }
        Command::Show { task_id, json } => cli::show(&api, &task_id, json).await,
        Command::Create { url, public } => cli::create(&api, &url, public).await,
        Command::Edit {
            task_id,
            title,
            public,
            private,
        } => {
            let is_public = match (public, private) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            if title.is_none() && is_public.is_none() {
                anyhow::bail!("Nothing to change: pass --title, --public or --private");
            }
            cli::edit(&api, &task_id, title, is_public).await
        }
        Command::Delete { task_id } => cli::delete(&api, &task_id).await,
        Command::Retry { task_id } => cli::retry(&api, &task_id).await,
        Command::Download {
            task_id,
            artifact,
            dir,
        } => {
            let dir = dir.unwrap_or_else(|| config.download_dir());
            cli::download(&api, &task_id, artifact, &dir).await
        }
        Command::Watch { task_id, interval } => {
            let every = interval
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.poll_interval());
            cli::watch(&api, &task_id, every).await
        }
        Command::Tui | Command::Config { .. } => Ok(()),
    };
    result.map_err(|err| match err.downcast::<ApiError>() {
        Ok(api_err) => explain_api_error(api_err),
        Err(other) => other,
    })
}

/// Backend refusals print the backend's message alone; transport failures
/// say the command can be retried
fn explain_api_error(err: ApiError) -> anyhow::Error {
    let message = err.user_message();
    let err = FoundationError::from(err);
    if err.is_retryable() {
        anyhow::anyhow!("{} ({}), check the connection and retry", message, err)
    } else if err.is_user_facing() {
        anyhow::anyhow!(message)
    } else {
        anyhow::Error::new(err).context(message)
    }
}

/// stderr for one-shot commands; a log file for the TUI so the
/// alternate screen stays clean
fn init_logging(debug: bool, interactive: bool) -> anyhow::Result<()> {
    let log_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if interactive {
        let store = JsonStore::global()?;
        store.ensure_dir()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(store.file_path(LOG_FILE))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_default_is_tui() {
        let args = Args::try_parse_from(["castdesk"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn test_list_arguments() {
        let args = Args::try_parse_from([
            "castdesk", "list", "--status", "failed", "-v", "public", "--from", "2024-05-01",
            "--base-url", "http://tasks.local",
        ])
        .unwrap();
        assert_eq!(args.base_url.as_deref(), Some("http://tasks.local"));
        let Some(Command::List {
            status,
            visibility,
            from,
            ..
        }) = args.command
        else {
            panic!("expected list");
        };
        assert_eq!(status, StatusFilter::Failed);
        assert_eq!(visibility, Visibility::Public);
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn test_explain_api_error() {
        use castdesk_api::Operation;

        let err = explain_api_error(ApiError::from_response(
            Operation::Retry,
            400,
            r#"{"detail":"Only failed tasks can be retried"}"#,
        ));
        assert_eq!(format!("{:#}", err), "Only failed tasks can be retried");

        let err = explain_api_error(ApiError::network(Operation::List, "connection refused"));
        let text = err.to_string();
        assert!(text.starts_with("Failed to fetch task list"));
        assert!(text.contains("connection refused"));
        assert!(text.ends_with("retry"));

        let err = explain_api_error(ApiError::io(Operation::Download, "disk full"));
        assert_eq!(err.to_string(), "Failed to download file");
        assert!(format!("{:#}", err).contains("disk full"));
    }

    #[test]
    fn test_rejects_bad_artifact_and_date() {
        assert!(Args::try_parse_from(["castdesk", "download", "t1", "video"]).is_err());
        assert!(Args::try_parse_from(["castdesk", "list", "--from", "May 1"]).is_err());
        assert!(Args::try_parse_from(["castdesk", "edit", "t1", "--public", "--private"]).is_err());

        let args = Args::try_parse_from(["castdesk", "download", "t1", "subtitle-en"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Command::Download {
                artifact: ArtifactKind::SubtitleEn,
                ..
            })
        ));
    }
}

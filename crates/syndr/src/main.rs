//! syndr - SyndrDB command-line client and end-to-end test runner.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use syndr_core::logging::{init_logging, log_dir, LogConfig};
use syndr_core::models::{ConnectionConfig, SessionOptions};
use syndr_core::services::DatabaseDriver;
use syndr_core::{SyndrError, SyndrSettings, SyndrState};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "syndr - SyndrDB client and end-to-end test runner",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Directory holding E2E-*-tests.json files
    #[arg(long, env = "SYNDR_TESTS_DIR", default_value = "./data")]
    tests_dir: PathBuf,

    /// Database selected before tests run
    #[arg(long, default_value = syndr_core::state::DEFAULT_TEST_DATABASE)]
    test_database: String,

    /// Seconds to wait for each query reply
    #[arg(long, default_value_t = 30)]
    query_timeout: u64,

    /// Log filter, e.g. "syndr_core=trace"
    #[arg(long)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    /// Server hostname
    #[arg(long, env = "SYNDR_HOST", default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(short, long, env = "SYNDR_PORT", default_value_t = 1776)]
    port: u16,

    /// Database to authenticate against
    #[arg(short, long, env = "SYNDR_DATABASE", default_value = "primary")]
    database: String,

    /// Username
    #[arg(short, long, env = "SYNDR_USER", default_value = "root")]
    user: String,

    /// Password
    #[arg(long, env = "SYNDR_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute one query and print the result as JSON
    Query {
        /// Query text, sent verbatim
        text: String,
    },
    /// List test definitions and registered procedures
    List,
    /// Run test procedures by name and print results and a summary
    Run {
        /// Procedure names, run in the given order
        #[arg(required = true)]
        names: Vec<String>,

        /// Category reported in the summary
        #[arg(long, default_value = "Selected")]
        category: String,
    },
    /// Check that the server accepts the credentials
    Ping,
}

impl Cli {
    fn settings(&self) -> SyndrSettings {
        SyndrSettings {
            test_database: self.test_database.clone(),
            tests_dir: self.tests_dir.clone(),
            session: SessionOptions {
                query_timeout: Duration::from_secs(self.query_timeout),
                ..SessionOptions::default()
            },
        }
    }

    fn connection_config(&self, options: SessionOptions) -> Result<ConnectionConfig> {
        let args = &self.connection;
        ConnectionConfig::builder()
            .name(args.host.clone())
            .hostname(args.host.clone())
            .port(args.port)
            .database(args.database.clone())
            .username(args.user.clone())
            .password(args.password.clone())
            .options(options)
            .build()
            .map_err(anyhow::Error::msg)
            .context("Invalid connection settings")
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::new(log_dir());
    if let Some(filter) = &cli.log {
        log_config = log_config.with_filter(filter.clone());
    }
    let _logging_guard = init_logging(log_config);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "syndr failed");
            for line in error_report(&e) {
                eprintln!("{line}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command succeeded.
async fn run(cli: Cli) -> Result<bool> {
    let state = SyndrState::new(cli.settings());

    match &cli.command {
        Command::List => {
            list(&state);
            Ok(true)
        }
        Command::Ping => {
            let config = cli.connection_config(state.settings().session.clone())?;
            let url = config.display_url();
            let ok = state.driver().test_connection(config).await;
            println!("{}", json!({ "url": url, "reachable": ok }));
            Ok(ok)
        }
        Command::Query { text } => {
            connect(&cli, &state).await?;
            let outcome = state.driver().execute_query(text).await;
            state.shutdown().await;

            let result = outcome?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(result.success)
        }
        Command::Run { names, category } => {
            connect(&cli, &state).await?;
            let mut runner = state.runner();
            let summary = runner.run_selected(category, names.as_slice()).await;
            state.shutdown().await;

            for result in runner.results() {
                println!("{}", serde_json::to_string(result)?);
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(summary.all_passed())
        }
    }
}

async fn connect(cli: &Cli, state: &SyndrState) -> Result<()> {
    let config = cli.connection_config(state.settings().session.clone())?;
    let url = config.display_url();
    if !state.driver().connect(config).await? {
        bail!("Could not connect to {url}");
    }
    tracing::info!(url = %url, "Connected");
    Ok(())
}

fn list(state: &SyndrState) {
    match state.load_catalog() {
        Ok(catalog) => {
            for file in catalog.files() {
                println!("{}", file.file_name);
                for entry in &file.tests {
                    let known = state.procedures().contains(&entry.run_all_command);
                    let marker = if known { " " } else { "?" };
                    println!("  {marker} {:<60} {}", entry.run_all_command, entry.description);
                }
            }
        }
        Err(e) => tracing::warn!(error = %e, "No test definitions loaded"),
    }

    println!("procedures");
    for info in state.procedures().list() {
        let marker = if info.implemented { "*" } else { " " };
        println!("  {marker} {:<60} {}", info.name, info.description.unwrap_or_default());
    }
}

/// Render a top-level failure, with hint and detail for client errors.
fn error_report(error: &anyhow::Error) -> Vec<String> {
    let Some(syndr_error) = error.downcast_ref::<SyndrError>() else {
        return vec![format!("Error: {error:#}")];
    };

    let info = syndr_error.to_error_info();
    let mut lines = vec![format!("{}: {}", info.error_type, info.message)];
    if let Some(hint) = info.hint {
        lines.push(format!("  hint: {hint}"));
    }
    if let Some(detail) = info.technical_detail {
        lines.push(format!("  detail: {detail}"));
    }
    lines
}

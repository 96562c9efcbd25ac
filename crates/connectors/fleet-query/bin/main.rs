//! The fleet-query service binary.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use fleet_query::routes::create_router;
use fleet_query::state::{self, State};
use fleet_query_configuration::environment::ProcessEnvironment;
use fleet_query_configuration::{ConnectionUri, Secret};
use query_engine_execution::memory::InMemoryDataSource;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve list requests over HTTP.
    Serve {
        /// The directory holding `configuration.json`.
        #[arg(long, env = "FLEET_QUERY_CONFIGURATION", value_name = "DIRECTORY")]
        configuration: PathBuf,
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
        /// Serve the records of a JSON dataset from memory instead of connecting to
        /// PostgreSQL.
        #[arg(long, value_name = "FILE")]
        dataset: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
        log_format: LogFormat,
    },
    /// Print the JSON schema of the configuration file.
    PrintSchema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::PrintSchema => {
            let schema = fleet_query_configuration::configuration_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
        Command::Serve {
            configuration,
            port,
            dataset,
            log_format,
        } => {
            init_tracing(log_format);
            let state = create_state(&configuration, dataset.as_deref()).await?;
            serve(state, port).await
        }
    }
}

fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fleet_query=info,query_engine_execution=info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match log_format {
        LogFormat::Pretty => subscriber.with_target(false).init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

async fn create_state(configuration_dir: &Path, dataset: Option<&Path>) -> anyhow::Result<State> {
    let mut parsed = fleet_query_configuration::parse_configuration(configuration_dir)
        .await
        .with_context(|| format!("reading configuration from {}", configuration_dir.display()))?;
    let registry = prometheus::Registry::new();

    match dataset {
        None => {
            let configuration =
                fleet_query_configuration::make_runtime_configuration(parsed, ProcessEnvironment)?;
            Ok(state::create_state(configuration, registry).await?)
        }
        Some(dataset) => {
            // The in-memory data source never connects.
            parsed.connection_uri = ConnectionUri(Secret::Plain(String::new()));
            let configuration =
                fleet_query_configuration::make_runtime_configuration(parsed, ProcessEnvironment)?;
            let contents = tokio::fs::read_to_string(dataset)
                .await
                .with_context(|| format!("reading dataset {}", dataset.display()))?;
            let data_source = InMemoryDataSource::from_json(serde_json::from_str(&contents)?)
                .with_context(|| format!("decoding dataset {}", dataset.display()))?;
            tracing::info!(dataset = %dataset.display(), "serving records from memory");
            Ok(state::create_state_with_data_source(
                configuration,
                Arc::new(data_source),
                registry,
            )?)
        }
    }
}

async fn serve(state: State, port: u16) -> anyhow::Result<()> {
    let address = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%address, "starting server");

    axum::Server::bind(&address)
        .serve(create_router(state).into_make_service())
        .with_graceful_shutdown(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                tracing::error!(%error, "unable to listen for shutdown signal");
            }
        })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

//! # Command Line Interface
//!
//! `checkmysugar` with no subcommand trains and serves, like `checkmysugar serve`.
//! `checkmysugar train` only fits the model and writes the snapshot.
//!
//! Every option can also be set through a `CHECKMYSUGAR_*` environment variable.

use crate::api::{AppState, create_router};
use crate::bootstrap::{self, DEFAULT_DATA_URL, DataSource};
use crate::error::Result;
use checkmysugar_core::{FeatureSchema, ForestParams, MaxFeatures, RandomForest};
use clap::{Args, Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

// =============================================================================
// ARGUMENTS
// =============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "checkmysugar",
    version,
    about = "Diabetes risk prediction form backed by a random forest",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Options for the default `serve` command.
    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Train the model and serve the prediction form (default).
    Serve(ServeArgs),
    /// Train the model and write the snapshot without serving.
    Train(TrainArgs),
}

/// Where to read training data from.
#[derive(Debug, Clone, Args)]
pub struct DataArgs {
    /// URL of the headerless training CSV.
    #[arg(long, env = "CHECKMYSUGAR_DATA_URL", default_value = DEFAULT_DATA_URL)]
    pub data_url: String,

    /// Local CSV file to train on instead of the URL.
    #[arg(long, env = "CHECKMYSUGAR_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Timeout for the dataset download.
    #[arg(long, default_value_t = 30)]
    pub fetch_timeout_secs: u64,
}

impl DataArgs {
    pub fn source(&self) -> DataSource {
        match &self.data_file {
            Some(path) => DataSource::File(path.clone()),
            None => DataSource::Url(self.data_url.clone()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Forest hyperparameters.
#[derive(Debug, Clone, Args)]
pub struct ModelArgs {
    /// Number of trees in the forest.
    #[arg(long, default_value_t = checkmysugar_core::forest::DEFAULT_TREES)]
    pub trees: usize,

    /// Base seed for bootstrap sampling.
    #[arg(long, default_value_t = checkmysugar_core::forest::DEFAULT_SEED)]
    pub seed: u64,

    /// Maximum tree depth (unlimited when omitted).
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Feature columns per tree: `all`, `sqrt`, or a count.
    #[arg(long, default_value_t = MaxFeatures::All)]
    pub max_features: MaxFeatures,
}

impl ModelArgs {
    pub fn params(&self) -> ForestParams {
        ForestParams::new()
            .n_trees(self.trees)
            .seed(self.seed)
            .max_depth(self.max_depth)
            .max_features(self.max_features)
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "CHECKMYSUGAR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind.
    #[arg(long, env = "CHECKMYSUGAR_PORT", default_value_t = 5000)]
    pub port: u16,

    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Where to write the model snapshot after training.
    #[arg(long, env = "CHECKMYSUGAR_SNAPSHOT", default_value = "model.bin")]
    pub snapshot: PathBuf,

    /// Skip writing the model snapshot.
    #[arg(long)]
    pub no_snapshot: bool,

    /// Serve a previously written snapshot instead of training.
    #[arg(long, env = "CHECKMYSUGAR_FROM_SNAPSHOT")]
    pub from_snapshot: Option<PathBuf>,

    /// Do not open a browser tab once the server is listening.
    #[arg(long, env = "CHECKMYSUGAR_NO_BROWSER")]
    pub no_browser: bool,

    /// Delay before opening the browser.
    #[arg(long, default_value_t = 1000)]
    pub browser_delay_ms: u64,
}

#[derive(Debug, Clone, Args)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Snapshot output path.
    #[arg(long, short, default_value = "model.bin")]
    pub output: PathBuf,
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Fetch, train and write the snapshot. Any failure is returned.
pub async fn cmd_train(args: &TrainArgs) -> Result<()> {
    let schema = FeatureSchema::pima();
    schema.validate()?;

    let text = bootstrap::fetch_dataset(&args.data.source(), args.data.timeout()).await?;
    let (forest, summary) = bootstrap::train_model(schema, text, args.model.params()).await?;
    bootstrap::write_snapshot(&args.output, &schema, &forest).await?;

    println!(
        "Trained {} trees on {} rows ({}% training accuracy) -> {}",
        summary.trees,
        summary.rows,
        summary.accuracy_percent,
        args.output.display()
    );
    Ok(())
}

/// Build the model, start the server, and run until Ctrl+C.
pub async fn cmd_serve(args: &ServeArgs) -> Result<()> {
    let schema = FeatureSchema::pima();
    schema.validate()?;

    let forest = resolve_model(args, &schema).await?;
    let state = Arc::new(AppState::new(schema, Arc::new(forest)));
    let app = create_router(state);

    let ip: IpAddr = args.host.parse()?;
    let listener = tokio::net::TcpListener::bind(SocketAddr::new(ip, args.port)).await?;
    let url = format!("http://{}", listener.local_addr()?);

    println!("App running at: {url}");
    info!(url = %url, pid = std::process::id(), "Server listening");

    if !args.no_browser {
        bootstrap::open_browser(url, Duration::from_millis(args.browser_delay_ms));
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

/// Load the snapshot if asked to, otherwise train and (best effort) persist.
pub async fn resolve_model(args: &ServeArgs, schema: &FeatureSchema) -> Result<RandomForest> {
    if let Some(path) = &args.from_snapshot {
        return bootstrap::load_snapshot(path, schema).await;
    }

    let text = bootstrap::fetch_dataset(&args.data.source(), args.data.timeout()).await?;
    let (forest, _) = bootstrap::train_model(*schema, text, args.model.params()).await?;

    if !args.no_snapshot {
        if let Err(err) = bootstrap::write_snapshot(&args.snapshot, schema, &forest).await {
            warn!(error = %err, "Continuing without model snapshot");
        }
    }
    Ok(forest)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Could not install Ctrl+C handler, running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server");
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve_args() {
        let cli = Cli::try_parse_from(["checkmysugar"]).ok();
        let serve = cli.as_ref().map(|c| (&c.serve.host, c.serve.port, c.command.is_none()));
        assert_eq!(serve, Some((&"127.0.0.1".to_string(), 5000, true)));
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from([
            "checkmysugar",
            "serve",
            "--port",
            "8080",
            "--no-browser",
            "--data-file",
            "pima.csv",
            "--trees",
            "10",
        ])
        .ok();

        let args = cli.and_then(|c| match c.command {
            Some(Commands::Serve(args)) => Some(args),
            _ => None,
        });
        assert_eq!(args.as_ref().map(|a| a.port), Some(8080));
        assert_eq!(args.as_ref().map(|a| a.no_browser), Some(true));
        assert_eq!(
            args.as_ref().map(|a| a.data.source()),
            Some(DataSource::File(PathBuf::from("pima.csv")))
        );
        assert_eq!(args.map(|a| a.model.params().n_trees), Some(10));
    }

    #[test]
    fn train_output_parses() {
        let cli = Cli::try_parse_from(["checkmysugar", "train", "-o", "out.bin", "--seed", "7"]).ok();
        let output = cli.and_then(|c| match c.command {
            Some(Commands::Train(args)) => Some((args.output, args.model.seed)),
            _ => None,
        });
        assert_eq!(output, Some((PathBuf::from("out.bin"), 7)));
    }

    #[test]
    fn max_features_flag_parses() {
        let cli = Cli::try_parse_from(["checkmysugar", "train", "--max-features", "sqrt"]).ok();
        let max_features = cli.and_then(|c| match c.command {
            Some(Commands::Train(args)) => Some(args.model.params().max_features),
            _ => None,
        });
        assert_eq!(max_features, Some(MaxFeatures::Sqrt));
    }

    #[test]
    fn max_features_defaults_to_all() {
        let cli = Cli::try_parse_from(["checkmysugar"]).ok();
        assert_eq!(cli.map(|c| c.serve.model.max_features), Some(MaxFeatures::All));
    }

    #[test]
    fn bad_max_features_rejected() {
        assert!(Cli::try_parse_from(["checkmysugar", "--max-features", "half"]).is_err());
    }

    #[test]
    fn url_is_default_source() {
        let cli = Cli::try_parse_from(["checkmysugar"]).ok();
        let source = cli.map(|c| c.serve.data.source());
        assert_eq!(source, Some(DataSource::Url(DEFAULT_DATA_URL.to_string())));
    }
}

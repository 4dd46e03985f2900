//! quiz-report server binary
//!
//! Loads configuration, opens the database and serves the REST API until
//! SIGINT/SIGTERM.

use clap::Parser;
use quiz_report::{Config, QuizReporter, run_with_shutdown};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quiz-report", about = "Quiz session report server", version)]
struct Cli {
    /// JSON configuration file (defaults apply when omitted)
    #[arg(env = "QUIZ_REPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured database path
    #[arg(long)]
    database: Option<PathBuf>,

    /// Override the configured bind address (e.g. 0.0.0.0:8080)
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "quiz-report exited with an error");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> quiz_report::Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration");
            Config::from_file(path).await?
        }
        None => Config::default(),
    };

    if let Some(database) = cli.database {
        config.persistence.database_path = database;
    }
    if let Some(bind) = cli.bind {
        config.api.bind_address = bind;
    }

    let reporter = QuizReporter::new(config).await?;
    run_with_shutdown(reporter).await
}

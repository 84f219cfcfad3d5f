use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use backend_bootstrap::cli;
use backend_bootstrap::context::AppContext;
use backend_infrastructure::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "gatecheck-backend")]
#[command(about = "Event check-in backend: rosters, QR tickets and gate scans", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Upload a roster CSV and print the issued tickets
    Import {
        csv: PathBuf,
        #[arg(long)]
        operator: Option<String>,
    },
    /// Write every ticket QR code into a ZIP archive
    Export {
        out: PathBuf,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        grouped: bool,
    },
    /// Gate session reading scanned tokens from stdin
    Scan {
        #[arg(long)]
        operator: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AppConfig::load_from(path).await?,
        None => AppConfig::load().await?,
    };
    let _log_guard = backend_bootstrap::logging::init(&config);

    let context = AppContext::new(&config).await?;
    let state = context.state;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => backend_bootstrap::run_server(state).await,
        Command::Import { csv, operator } => {
            let operator = cli::resolve_operator(&state, operator);
            cli::run_import(&state, &csv, &operator).await.map(|_| ())
        }
        Command::Export {
            out,
            contact,
            grouped,
        } => cli::run_export(&state, &out, contact, grouped).await.map(|_| ()),
        Command::Scan { operator } => {
            let operator = cli::resolve_operator(&state, operator);
            info!("starting gate session as {}", operator);
            cli::run_stdin_scan(state, operator).await
        }
    }
}

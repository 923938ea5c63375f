use clap::{Args, Parser, Subcommand};
use foodcard::application::Services;
use foodcard::application::orders::OrderDesk;
use foodcard::config::Config;
use foodcard::domain::ports::SharedNotifier;
use foodcard::infrastructure::Stores;
use foodcard::infrastructure::notifier::LogNotifier;
use foodcard::interfaces::csv::outcome_writer::OutcomeWriter;
use foodcard::interfaces::csv::scan_reader::ScanReader;
use foodcard::interfaces::http::{AppState, router};
use foodcard::interfaces::scan::{ScanIngest, ScanTicket};
use foodcard::interfaces::seed::SeedFile;
use foodcard::telemetry;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone)]
struct StorageArgs {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// JSON file with accounts and orders to load before starting.
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Milliseconds an operation waits for a busy account before giving up.
    #[arg(long)]
    lock_timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the wallet HTTP API.
    Serve {
        /// Listen address, overrides FOODCARD_BIND.
        #[arg(long)]
        bind: Option<String>,

        #[command(flatten)]
        storage: StorageArgs,
    },
    /// Settle a CSV of scanner events (`station,payload`) and print one outcome per row.
    Scan {
        /// Input scans CSV file
        input: PathBuf,

        #[command(flatten)]
        storage: StorageArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Command::Serve { bind, storage } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            let services = prepare(&mut config, &storage).await?;
            serve(&config, services).await
        }
        Command::Scan { input, storage } => {
            let services = prepare(&mut config, &storage).await?;
            replay_scans(&input, services).await
        }
    }
}

async fn prepare(config: &mut Config, storage: &StorageArgs) -> Result<Services> {
    if let Some(ms) = storage.lock_timeout_ms {
        config.lock_timeout = Duration::from_millis(ms);
    }

    let stores = Stores::open(storage.db_path.as_deref()).into_diagnostic()?;
    let notifier: SharedNotifier = Arc::new(LogNotifier);
    let services = Services::new(&stores, notifier, config);

    if let Some(path) = &storage.seed {
        let desk = OrderDesk::new(Arc::clone(&stores.accounts), Arc::clone(&stores.orders));
        SeedFile::load(path)?.apply(&stores.accounts, &desk).await?;
    }
    Ok(services)
}

async fn serve(config: &Config, services: Services) -> Result<()> {
    let app = router(AppState::new(services));
    let listener = TcpListener::bind(&config.bind).await.into_diagnostic()?;
    info!("Server running on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    info!("Server shut down");
    Ok(())
}

async fn replay_scans(input: &Path, services: Services) -> Result<()> {
    let scanner = ScanIngest::new(Arc::clone(&services.engine));
    let file = File::open(input).into_diagnostic()?;
    let reader = ScanReader::new(file);

    let stdout = io::stdout();
    let mut writer = OutcomeWriter::new(stdout.lock());
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                error!("Error reading scan: {e}");
                continue;
            }
        };
        match ScanTicket::decode(&record.payload) {
            Ok(ticket) => {
                let outcome = scanner.settle_ticket(&ticket).await;
                if let Err(e) = &outcome {
                    info!(station = ?record.station, order = %ticket.order_id, reason = e.reason(), "scan rejected");
                }
                writer
                    .write(Some(ticket.order_id.as_str()), &outcome)
                    .into_diagnostic()?;
            }
            Err(e) => {
                info!(station = ?record.station, reason = e.reason(), "scan rejected");
                writer.write(None, &Err(e)).into_diagnostic()?;
            }
        }
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

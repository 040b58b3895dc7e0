use campuslend::application::engine::MarketEngine;
use campuslend::domain::ports::MarketStores;
use campuslend::infrastructure::feed::BroadcastChangeFeed;
use campuslend::infrastructure::in_memory;
use campuslend::infrastructure::payment::OfflinePaymentGateway;
use campuslend::interfaces::csv::event_reader::EventReader;
use campuslend::interfaces::csv::report_writer::ReportWriter;
use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Report {
    Requests,
    Profiles,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input marketplace events CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Which final-state report to print
    #[arg(long, value_enum, default_value = "requests")]
    report: Report,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let stores = open_stores(cli.db_path)?;
    let engine = MarketEngine::new(
        stores,
        Box::new(BroadcastChangeFeed::new(256)),
        Box::new(OfflinePaymentGateway::new()),
    );

    // Process events
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = EventReader::new(file);
    for event_result in reader.events() {
        match event_result {
            Ok(event) => {
                if let Err(e) = engine.process_event(event).await {
                    eprintln!("Error processing event: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading event: {}", e);
            }
        }
    }

    // Collect final state from engine
    let snapshot = engine.into_results().await.into_diagnostic()?;

    // Output final state
    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    match cli.report {
        Report::Requests => writer.write_requests(snapshot.requests).into_diagnostic()?,
        Report::Profiles => writer.write_profiles(snapshot.profiles).into_diagnostic()?,
    }

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<MarketStores> {
    use campuslend::infrastructure::rocksdb::RocksMarketStore;

    match db_path {
        Some(path) => {
            let store = RocksMarketStore::open(path).into_diagnostic()?;
            Ok(store.into_stores())
        }
        None => Ok(in_memory::stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<MarketStores> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory::stores())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("campuslend=info"));

    // Diagnostics go to stderr so the CSV report on stdout stays clean
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

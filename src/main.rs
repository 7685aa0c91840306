use std::{env, fs::File, path::Path};

use chrono::Utc;
use tracing_subscriber::EnvFilter;

use settlement_engine::{
    audit::LogAudit, dlq::LogDlq, ingestion::CsvReader, notify::LogNotifier, Engine,
    InMemoryStore, PlatformSettings, SeedFixture,
};

/// Usage: `settlement_engine <events.csv> [accounts.json] [--daemon]`
///
/// Processes the order-event file, runs a settlement pass for anything
/// already due, and prints the balance report. With `--daemon` the
/// periodic settlement scheduler keeps running until Ctrl-C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut paths = Vec::new();
    let mut daemon = false;
    for arg in env::args().skip(1) {
        if arg == "--daemon" {
            daemon = true;
        } else {
            paths.push(arg);
        }
    }
    let events_path = paths
        .first()
        .ok_or("usage: settlement_engine <events.csv> [accounts.json] [--daemon]")?;

    let settings = PlatformSettings::from_env();
    let mut store = InMemoryStore::new(settings.shard_count);
    if let Some(fixture_path) = paths.get(1) {
        let fixture: SeedFixture = serde_json::from_reader(File::open(Path::new(fixture_path))?)?;
        store.load_fixture(fixture);
    }

    let events = File::open(Path::new(events_path))?;
    let ingestion = CsvReader::new(events)?;
    let mut engine = Engine::new(
        ingestion,
        store,
        LogDlq::default(),
        LogAudit::default(),
        LogNotifier::default(),
        settings,
    );

    engine.process().await?;

    let report = engine.settle_due(Utc::now());
    tracing::info!(
        settled = report.settled,
        failed = report.failed,
        "initial settlement pass done"
    );

    engine.flush();

    if daemon {
        tokio::select! {
            _ = engine.run_scheduler() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
            }
        }
    }

    Ok(())
}

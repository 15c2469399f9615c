use crate::errors::Result;
use crate::locations::get_log_dir;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, Registry};

pub fn init_logging(
    storage_dir: &Path,
    debug: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_file = get_log_location(storage_dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let default_level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    // sled reports through the `log` facade
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Unable to forward log records to tracing: {}", e);
    }

    let formatter = BunyanFormattingLayer::new("sakura".into(), non_blocking);
    let stdout = debug.then(|| BunyanFormattingLayer::new("sakura".into(), std::io::stdout));

    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatter)
        .with(stdout);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("A global tracing subscriber was already installed: {}", e);
    }

    Ok(guard)
}

fn get_log_location(storage_dir: &Path) -> Result<PathBuf> {
    let log_dir = get_log_dir(storage_dir)?;
    let timestamp = Utc::now().format("%Y-%m-%d-%H-%M-%S");
    let log_file = log_dir.join(format!("sakura-{}.log", timestamp));
    clean_logfiles(&log_dir)?;
    Ok(log_file)
}

fn clean_logfiles(log_dir: &Path) -> Result<()> {
    // Logfiles from more than 30 days ago are deleted
    for file in std::fs::read_dir(log_dir)? {
        let file = file?;
        let modified = file.metadata()?.modified()?;
        let modified: chrono::DateTime<Utc> = chrono::DateTime::from(modified);
        let duration = Utc::now().signed_duration_since(modified);
        if duration.num_days() > 30 {
            std::fs::remove_file(file.path())?;
        }
    }
    Ok(())
}

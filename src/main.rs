use clap::Parser;
use sakura_server::config::DeskConfig;
use sakura_server::errors::Result;
use sakura_server::locations::{
    get_config_file, get_database_dir, get_default_socket, get_storage_dir,
};
use sakura_server::log::init_logging;
use sakura_server::server::Server;
use sakura_server::session::Session;
use sakura_server::storage::SledStore;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

// Allow the server to return its version with a --version flag
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
struct Opts {
    #[clap(short, long)]
    version: bool,
    #[clap(short, long)]
    debug: bool,
    /// Unix socket to listen on (defaults to ~/.sakura.sock)
    #[clap(short, long)]
    socket: Option<PathBuf>,
    /// Where the session database, logs and config live
    #[clap(long)]
    storage_dir: Option<PathBuf>,
    /// Config file (defaults to config.json in the storage directory)
    #[clap(short, long)]
    config: Option<PathBuf>,
}

async fn run(opts: Opts) -> Result<()> {
    let storage_dir = get_storage_dir(opts.storage_dir.as_deref())?;
    let _guard = init_logging(&storage_dir, opts.debug)?;

    let config_file = opts
        .config
        .unwrap_or_else(|| get_config_file(&storage_dir));
    let config = DeskConfig::load(&config_file)?;

    let store = SledStore::open(&get_database_dir(&storage_dir), config.storage.clone())?;
    store.init_storage(chrono::Utc::now());
    let store = Arc::new(store);

    let session = Arc::new(Mutex::new(Session::new(store.clone(), &config)));
    let socket = match opts.socket {
        Some(socket) => socket,
        None => get_default_socket()?,
    };
    let srv = Server::new(session, socket);
    srv.start().await?;
    store.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let opts: Opts = Opts::parse();
    if opts.version {
        println!("{}", VERSION);
        return ExitCode::SUCCESS;
    }
    match run(opts).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sakura_server: {}", e);
            ExitCode::FAILURE
        }
    }
}

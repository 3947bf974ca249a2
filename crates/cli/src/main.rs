//! # CLI
//!
//! The network-facing binary for the storage engine: a `server` subcommand
//! that listens for commands over TCP, and a `connect` subcommand that talks
//! to one as a line-REPL client.
//!
//! ```text
//! $ cli server --storage_location data/
//! $ cli connect
//! connected to 127.0.0.1:65432
//! put name alice
//! OK
//! get name
//! alice
//! exit
//! ```

mod adapter;
mod client;
mod server;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use config::EngineConfig;
use engine::Engine;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 65432;
const DEFAULT_STORAGE_LOCATION: &str = "storage/";

#[derive(Parser)]
#[command(name = "cli", about = "Embeddable LSM-tree key-value store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a storage node listening for commands over TCP.
    Server {
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, default_value = DEFAULT_STORAGE_LOCATION)]
        storage_location: String,
    },
    /// Start an interactive client connected to a running server.
    Connect {
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Server {
            host,
            port,
            storage_location,
        } => {
            let config = EngineConfig::default().with_storage_dir(storage_location);
            let engine: Arc<Engine> = Engine::open(config)?;
            server::run(engine, &host, port)
        }
        Command::Connect { host, port } => client::run(&host, port),
    }
}

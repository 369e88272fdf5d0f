mod config;
mod console;
mod core_blocks;
mod error;
mod host;
mod plugin_manager;
mod server;

use std::io::BufRead;

use config::ServerConfig;
use console::ConsoleCommand;
use server::Server;
use tracing::{error, info, warn};

fn main() {
    let config = match ServerConfig::load("server.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load server.toml: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "{} v{} starting (hotbar: {} slots, plugin configs in {}/)",
        config.server.name,
        env!("CARGO_PKG_VERSION"),
        config.server.hotbar_size,
        config.plugins.directory
    );

    let mut server = Server::new(&config);
    if let Err(e) = server.start() {
        error!("Failed to enable plugins: {e}");
        std::process::exit(1);
    }
    info!("Ready. Type `help` for commands.");

    // Console: one command per line until `stop` or end of input.
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read console input: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match ConsoleCommand::parse(&line) {
            Ok(command) => {
                if !server.run_command(command) {
                    break;
                }
            }
            Err(e) => warn!("{e}"),
        }
    }

    info!("Shutting down...");
    server.stop();
    info!("Server shut down.");
}

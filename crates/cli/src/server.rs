//! The `server` subcommand: a thread-per-connection TCP listener over the
//! command adapter.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use engine::Engine;

use crate::adapter;

/// Per-connection socket read timeout: a silent peer is dropped rather than
/// pinning a worker thread forever.
const CONNECTION_READ_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Runs the server loop, accepting connections until the process is killed.
/// Each connection gets its own worker thread; `engine` is shared via `Arc`
/// so foreground operations from different connections may run
/// concurrently.
pub fn run(engine: Arc<Engine>, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind((host, port))
        .map_err(|e| anyhow::anyhow!("failed to bind {host}:{port}: {e}"))?;
    log::info!("server listening on {host}:{port}");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || handle_connection(engine, stream));
            }
            Err(e) => log::warn!("failed to accept connection: {e}"),
        }
    }

    Ok(())
}

fn handle_connection(engine: Arc<Engine>, mut stream: TcpStream) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "<unknown>".to_string());
    log::debug!("connection opened: {peer}");

    if let Err(e) = stream.set_read_timeout(Some(CONNECTION_READ_TIMEOUT)) {
        log::warn!("failed to set read timeout for {peer}: {e}");
        return;
    }

    let mut buf = [0u8; 1024];
    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                log::debug!("connection {peer} read failed: {e}");
                break;
            }
        };

        let line = String::from_utf8_lossy(&buf[..n]);
        let line = line.trim_end_matches(['\r', '\n']);
        if line == "exit" {
            break;
        }

        let reply = adapter::dispatch(&engine, line);
        if let Err(e) = stream.write_all(reply.as_bytes()) {
            log::debug!("connection {peer} write failed: {e}");
            break;
        }
    }

    log::debug!("connection closed: {peer}");
}

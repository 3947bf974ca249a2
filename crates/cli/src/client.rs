//! The `connect` subcommand: a line-REPL client.

use std::io::{self, BufRead, Read, Write};
use std::net::TcpStream;

pub fn run(host: &str, port: u16) -> anyhow::Result<()> {
    let mut stream = TcpStream::connect((host, port))
        .map_err(|e| anyhow::anyhow!("failed to connect to {host}:{port}: {e}"))?;
    println!("connected to {host}:{port}");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        stream.write_all(line.as_bytes())?;
        if line.trim() == "exit" {
            break;
        }

        let mut buf = [0u8; 1024];
        let n = stream.read(&mut buf)?;
        if n == 0 {
            println!("connection closed by server");
            break;
        }
        println!("{}", String::from_utf8_lossy(&buf[..n]));
    }

    Ok(())
}

//! CLI entry point for the Flotilla battleship server.
//!
//! Usage:
//!   flotilla-server <bind-ip> <port> <log-path>
//!
//! Events are logged both to stderr and, append-only, to the given log
//! file. Invalid arguments print the usage line and exit non-zero.

use std::fs::OpenOptions;
use std::net::IpAddr;
use std::process::ExitCode;
use std::sync::Arc;

use flotilla::FlotillaServer;
use tracing_subscriber::fmt::writer::MakeWriterExt;

struct CliArgs {
    bind_ip: IpAddr,
    port: u16,
    log_path: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let Some(cli) = parse_args(&args) else {
        eprintln!(
            "usage: {} <bind-ip> <port> <log-path>",
            args.first().map(String::as_str).unwrap_or("flotilla-server")
        );
        return ExitCode::FAILURE;
    };

    let log_file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_path)
    {
        Ok(file) => file,
        Err(error) => {
            eprintln!("failed to open log file {}: {error}", cli.log_path);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_writer(Arc::new(log_file).and(std::io::stderr))
        .with_ansi(false)
        .init();

    let bind_addr = format!("{}:{}", cli.bind_ip, cli.port);
    let server = match FlotillaServer::builder().bind(&bind_addr).build().await
    {
        Ok(server) => server,
        Err(error) => {
            tracing::error!(%bind_addr, %error, "failed to start server");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%bind_addr, log = %cli.log_path, "server started");

    // Run until the process is told to stop. On Ctrl-C the acceptor
    // stops taking new clients; in-flight sessions see their sockets
    // close when the process exits.
    tokio::select! {
        result = server.run() => {
            if let Err(error) = result {
                tracing::error!(%error, "server stopped with error");
                return ExitCode::FAILURE;
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received, stopping");
        }
    }
    ExitCode::SUCCESS
}

/// Parses the three positional arguments. Returns `None` on any
/// problem — wrong count, unparseable IP, port outside 1-65535.
fn parse_args(args: &[String]) -> Option<CliArgs> {
    if args.len() != 4 {
        return None;
    }
    let bind_ip: IpAddr = args[1].parse().ok()?;
    let port: u16 = args[2].parse().ok().filter(|&port| port != 0)?;
    Some(CliArgs {
        bind_ip,
        port,
        log_path: args[3].clone(),
    })
}

//! txlink Server
//!
//! Serves either protocol variant on a TCP listening socket.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use txlink::{Config, ProtocolVariant, Server};

/// txlink server
#[derive(Parser, Debug)]
#[command(name = "txlink-server")]
#[command(about = "TCP transaction/file-transfer protocol server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "127.0.0.1:8888")]
    listen: String,

    /// Protocol variant to serve
    #[arg(long, value_enum, default_value = "transaction")]
    protocol: Variant,

    /// Directory served by the file-transfer variant
    #[arg(long, default_value = "files")]
    files_dir: PathBuf,

    /// Response-template config file (JSON)
    #[arg(long)]
    response_config: Option<PathBuf>,

    /// Maximum concurrent connections
    #[arg(long, default_value_t = 1024)]
    max_connections: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    Transaction,
    FileTransfer,
}

fn main() -> txlink::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut builder = Config::builder()
        .listen_addr(args.listen)
        .max_connections(args.max_connections)
        .files_dir(args.files_dir)
        .protocol(match args.protocol {
            Variant::Transaction => ProtocolVariant::Transaction,
            Variant::FileTransfer => ProtocolVariant::FileTransfer,
        });
    if let Some(path) = args.response_config {
        builder = builder.response_config(path);
    }

    let server = Server::bind(builder.build())?;
    tracing::info!("txlink-server v{}", txlink::VERSION);
    server.run()
}

//! txlink CLI Client
//!
//! Command-line interface for exercising a txlink server: transaction
//! exchanges against the transaction variant, listing and downloads
//! against the file-transfer variant.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use txlink::{ClientConfig, Reply, TransferClient, TxClient};

/// txlink CLI
#[derive(Parser, Debug)]
#[command(name = "txlink-cli")]
#[command(about = "CLI for the txlink protocol")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8888")]
    server: String,

    /// Sender node id written into request headers
    #[arg(long, default_value = "CLIENT")]
    sender: String,

    /// Receiver node id written into request headers
    #[arg(long, default_value = "SERVER")]
    receiver: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a sign-in request
    Signin {
        /// Request payload
        data: String,
    },

    /// Send a QUERY business request
    Query {
        /// Request payload
        data: String,
    },

    /// Send an UPDATE business request
    Update {
        /// Request payload
        data: String,
    },

    /// Send a DELETE business request
    Delete {
        /// Request payload
        data: String,
    },

    /// Send a business request with a custom transaction code
    Business {
        /// Transaction code (7 bytes max on the wire)
        code: String,

        /// Request payload
        data: String,
    },

    /// List files offered by a file-transfer server
    ListFiles,

    /// Download a file from a file-transfer server
    Download {
        /// Remote file name
        file: String,

        /// Output path (defaults to downloads/<file>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> txlink::Result<()> {
    let config = ClientConfig {
        server_addr: args.server.clone(),
        sender_node_id: args.sender.clone(),
        receiver_node_id: args.receiver.clone(),
        ..ClientConfig::default()
    };

    match args.command {
        Commands::Signin { data } => {
            let client = TxClient::connect(config)?;
            print_reply(client.sign_in(&data)?);
            client.disconnect()
        }
        Commands::Query { data } => {
            let client = TxClient::connect(config)?;
            print_reply(client.query(&data)?);
            client.disconnect()
        }
        Commands::Update { data } => {
            let client = TxClient::connect(config)?;
            print_reply(client.update(&data)?);
            client.disconnect()
        }
        Commands::Delete { data } => {
            let client = TxClient::connect(config)?;
            print_reply(client.delete(&data)?);
            client.disconnect()
        }
        Commands::Business { code, data } => {
            let client = TxClient::connect(config)?;
            print_reply(client.send_business(&code, &data)?);
            client.disconnect()
        }
        Commands::ListFiles => {
            let client = TransferClient::connect(config)?;
            let entries = client.list_files()?;
            if entries.is_empty() {
                println!("(no files)");
            }
            for entry in &entries {
                println!("{:>12}  {}", entry.size, entry.name);
            }
            client.disconnect()
        }
        Commands::Download { file, output } => {
            let client = TransferClient::connect(config)?;
            let data = client.download(&file)?;

            let path = match output {
                Some(path) => path,
                None => {
                    let dir = PathBuf::from("downloads");
                    if !dir.exists() {
                        fs::create_dir_all(&dir)?;
                    }
                    dir.join(&file)
                }
            };
            fs::write(&path, &data)?;
            println!("saved {} bytes to {}", data.len(), path.display());
            client.disconnect()
        }
    }
}

fn print_reply(reply: Reply) {
    let outcome = if reply.is_success() { "success" } else { "failed" };
    println!("status: {}", outcome);
    println!("{}", reply.data);
}

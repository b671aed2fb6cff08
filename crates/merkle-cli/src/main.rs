mod client;
mod leaves;

use anyhow::Result;
use clap::{Parser, Subcommand};
use engine::merkle_root;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::leaves::{LeafArgs, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "merkle")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the Merkle root of the given leaves locally.
    Root {
        #[command(flatten)]
        leaves: LeafArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Hex)]
        output: OutputFormat,
    },

    /// Ask a merkled server for the root of the given leaves.
    Remote {
        /// Server base URL, e.g. http://127.0.0.1:8080
        #[arg(long)]
        server: String,
        #[command(flatten)]
        leaves: LeafArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Hex)]
        output: OutputFormat,
        /// Recompute the root locally and fail if it differs from the server's.
        #[arg(long)]
        verify: bool,
    },

    /// Check that a merkled server is up.
    Health {
        #[arg(long)]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Root { leaves, output } => {
            let leaves = leaves.collect()?;
            debug!(leaf_count = leaves.len(), "computing root locally");
            let root = merkle_root(&leaves)?;
            println!("{}", output.render(&root));
        }

        Command::Remote {
            server,
            leaves,
            output,
            verify,
        } => {
            let leaves = leaves.collect()?;
            let c = client::MerkledClient::new(server);
            let resp = c.merkle_root(&leaves).await?;
            let root = if verify {
                let root = client::verify_response(&resp, &leaves)?;
                info!("server root matches local computation");
                root
            } else {
                resp.root()?
            };
            println!("{}", output.render(&root));
        }

        Command::Health { server } => {
            let c = client::MerkledClient::new(server);
            println!("{}", c.health().await?);
        }
    }

    Ok(())
}

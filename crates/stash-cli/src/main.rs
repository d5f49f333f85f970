//! Stash CLI: command-line access to the configured object bucket.
//!
//! Set S3_BUCKET, S3_PUBLIC_URL, and (for the S3 backend) S3_ACCESS_KEY,
//! S3_SECRET_KEY, S3_REGION, S3_API_URL. A `.env` file is read if present.

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use stash_cli::{format_entry, init_tracing};
use stash_core::StorageConfig;
use stash_storage::create_client;
use tokio::io::AsyncWriteExt;

#[derive(Parser)]
#[command(name = "stash", about = "Object storage CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local file to {location}/{filename}
    Put {
        /// Path to the file to upload
        source: std::path::PathBuf,
        /// Key prefix
        location: String,
        /// Object name under the prefix
        filename: String,
    },
    /// Download {location}/{filename}
    Get {
        /// Key prefix
        location: String,
        /// Object name under the prefix
        filename: String,
        /// Write the object here instead of stdout
        #[arg(long, short)]
        output: Option<std::path::PathBuf>,
    },
    /// Delete {location}/{filename}
    Delete {
        /// Key prefix
        location: String,
        /// Object name under the prefix
        filename: String,
    },
    /// List the first page of the bucket
    List {
        /// Regular expression matched against object keys
        #[arg(long, default_value = "")]
        filter: String,
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let config = StorageConfig::from_env().context(
        "Failed to load storage configuration. Set S3_BUCKET, S3_PUBLIC_URL and the S3_* credentials",
    )?;
    let client = create_client(&config).context("Failed to create storage client")?;

    match cli.command {
        Commands::Put {
            source,
            location,
            filename,
        } => {
            let url = client.put(&source, &location, &filename).await?;
            println!("{}", url);
        }
        Commands::Get {
            location,
            filename,
            output,
        } => {
            let fetched = client.get(&location, &filename).await?;
            tracing::info!(url = %fetched.public_url, "Fetching object");

            let mut writer: Box<dyn tokio::io::AsyncWrite + Unpin> = match output {
                Some(ref path) => Box::new(
                    tokio::fs::File::create(path)
                        .await
                        .with_context(|| format!("Create {}", path.display()))?,
                ),
                None => Box::new(tokio::io::stdout()),
            };

            let mut body = fetched.body;
            while let Some(chunk) = body.next().await {
                let chunk = chunk.context("Read object body")?;
                writer.write_all(&chunk).await.context("Write object body")?;
            }
            writer.flush().await.context("Flush output")?;
        }
        Commands::Delete { location, filename } => {
            client.delete(&location, &filename).await?;
            tracing::info!(location = %location, filename = %filename, "Object deleted");
        }
        Commands::List { filter, json } => {
            let listing = client.list(&filter).await?;
            if json {
                let entries = listing.into_entries();
                let out = serde_json::to_string_pretty(&entries).context("Serialize listing")?;
                println!("{}", out);
            } else {
                for entry in listing.iter() {
                    println!("{}", format_entry(entry));
                }
            }
        }
    }

    Ok(())
}

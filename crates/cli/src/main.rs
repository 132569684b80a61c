//! Depot command-line client.

mod api_client;

use anyhow::{Context, Result};
use api_client::ApiClient;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Depot - client for the LAN file service
#[derive(Parser, Debug)]
#[command(name = "depot")]
#[command(version, about, long_about = None)]
struct Args {
    /// Server API base URL
    #[arg(long, env = "DEPOT_SERVER", default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Bearer token, when the server requires one
    #[arg(long, env = "DEPOT_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a local file
    Upload {
        /// Path of the file to upload
        path: PathBuf,
        /// Name to store it under (defaults to the file's basename)
        #[arg(long)]
        name: Option<String>,
    },
    /// Download a file
    Download {
        /// Stored filename
        name: String,
        /// Where to save it (defaults to the stored name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List stored files, newest first
    List,
    /// Delete a file
    Delete {
        /// Stored filename
        name: String,
    },
    /// Show name, size, and modification time for a file
    Info {
        /// Stored filename
        name: String,
    },
    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = ApiClient::new(&args.server, args.token)?;

    match args.command {
        Command::Upload { path, name } => {
            let name = match name {
                Some(name) => name,
                None => path
                    .file_name()
                    .context("upload path has no file name")?
                    .to_string_lossy()
                    .to_string(),
            };
            let data = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let stored = client.upload(&name, data).await?;
            println!(
                "uploaded {} ({}) as {}",
                path.display(),
                format_size(stored.size_bytes),
                stored.name
            );
        }
        Command::Download { name, output } => {
            let dest = output.unwrap_or_else(|| PathBuf::from(&name));
            let written = client.download_to(&name, &dest).await?;
            println!("downloaded {} ({}) to {}", name, format_size(written), dest.display());
        }
        Command::List => {
            let files = client.list().await?;
            if files.is_empty() {
                println!("no files on server");
                return Ok(());
            }
            println!("{:<40} {:>10}  {}", "NAME", "SIZE", "MODIFIED");
            for entry in files {
                println!(
                    "{:<40} {:>10}  {}",
                    entry.name,
                    format_size(entry.size),
                    entry.modified
                );
            }
        }
        Command::Delete { name } => {
            let deleted = client.delete(&name).await?;
            println!("deleted {}", deleted.name);
        }
        Command::Info { name } => {
            let entry = client.info(&name).await?;
            println!("name:     {}", entry.name);
            println!("size:     {}", format_size(entry.size));
            println!("modified: {}", entry.modified);
        }
        Command::Health => {
            let health = client.health().await?;
            println!("{health}");
        }
    }

    Ok(())
}

/// Format a byte count for humans.
fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}

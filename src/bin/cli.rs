// Tunegrab - Playlist-aware music downloader
// Copyright (C) 2026 Tunegrab contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Headless driver for the tunegrab core

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tunegrab::api::{Authenticator, CatalogProvider, HttpCatalog};
use tunegrab::config::ConfigStore;
use tunegrab::download::{DownloadOutcome, DownloadService, SessionRegistry, TrackRequest};
use tunegrab::events::{ChannelSink, ConsoleSink, LOG_EVENT, PROGRESS_EVENT};
use tunegrab::file::{delete_track, list_known_tracks, DeleteOutcome};
use tunegrab::provision::provision_tools;

#[derive(Parser)]
#[command(name = "tunegrab-cli")]
#[command(about = "Playlist-aware music downloader", long_about = None)]
struct Cli {
    /// Bearer token for catalog commands (or TUNEGRAB_TOKEN)
    #[arg(long, global = true, env = "TUNEGRAB_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store client credentials and the download root
    Configure {
        #[arg(long)]
        client_id: String,
        #[arg(long)]
        client_secret: String,
        /// Directory downloads are sorted into, one folder per playlist
        #[arg(long)]
        download_path: String,
    },
    /// Run the interactive OAuth login and print the bearer token
    Login,
    /// List the user's playlists (including Liked Songs)
    Playlists,
    /// List the tracks of one playlist ("liked" for saved tracks)
    Tracks {
        playlist_id: String,
    },
    /// Download one track into a playlist folder (Ctrl-C cancels)
    Download {
        /// Logical track name, e.g. "Artist - Title"
        track: String,
        #[arg(long)]
        playlist: String,
    },
    /// List every downloaded track under the download root
    List,
    /// Delete a downloaded track from one playlist folder
    Delete {
        track: String,
        #[arg(long)]
        playlist: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let store = ConfigStore::open_default()?;

    match cli.command {
        Commands::Configure {
            client_id,
            client_secret,
            download_path,
        } => {
            let mut config = store.load()?;
            config.client_id = client_id;
            config.client_secret = client_secret;
            config.download_path = download_path;
            store.save(&config)?;
            println!("Configuration saved to {}", store.path().display());
        }

        Commands::Login => {
            let config = store.load()?;
            if !config.has_credentials() {
                bail!("no client credentials configured; run `configure` first");
            }
            let auth = Authenticator::new(config.client_id, config.client_secret);
            let token = auth.login(&ConsoleSink).await?;
            println!("{token}");
            eprintln!("Export as TUNEGRAB_TOKEN for catalog commands.");
        }

        Commands::Playlists => {
            let catalog = catalog_from(cli.token)?;
            for playlist in catalog.list_playlists().await? {
                println!("{}\t{} ({} tracks)", playlist.id, playlist.name, playlist.track_count);
            }
        }

        Commands::Tracks { playlist_id } => {
            let catalog = catalog_from(cli.token)?;
            for name in catalog.list_tracks(&playlist_id).await? {
                println!("{name}");
            }
        }

        Commands::Download { track, playlist } => {
            let config = store.load()?;
            let root = config
                .download_root()
                .context("no download path configured; run `configure` first")?;

            let tools = provision_tools(&tunegrab::config::app_dir()?)?;
            tools.verify()?;

            let registry = Arc::new(SessionRegistry::new());
            let (sink, mut events) = ChannelSink::new();
            let service = DownloadService::new(tools, root, Arc::clone(&registry), Arc::new(sink));

            let printer = tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    match event.name.as_str() {
                        LOG_EVENT => println!("{}", event.payload.as_str().unwrap_or_default()),
                        PROGRESS_EVENT => {
                            println!(
                                "  {}%  {}",
                                event.payload["percent"],
                                event.payload["song"].as_str().unwrap_or_default()
                            );
                        }
                        _ => {}
                    }
                }
            });

            let cancel_registry = Arc::clone(&registry);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("cancelling...");
                    if let Err(e) = cancel_registry.request_cancel().await {
                        eprintln!("cancel failed: {e}");
                    }
                }
            });

            let outcome = service
                .download(&TrackRequest {
                    track_name: track,
                    playlist_name: playlist,
                })
                .await;
            drop(service);
            let _ = printer.await;

            match outcome {
                DownloadOutcome::Completed => println!("done"),
                DownloadOutcome::Cancelled => {
                    println!("cancelled");
                    std::process::exit(130);
                }
                DownloadOutcome::Failed(detail) => bail!("download failed: {detail}"),
            }
        }

        Commands::List => {
            let config = store.load()?;
            let root = config
                .download_root()
                .context("no download path configured; run `configure` first")?;
            let mut names = list_known_tracks(&root).await;
            names.sort();
            for name in names {
                println!("{name}");
            }
        }

        Commands::Delete { track, playlist } => {
            let config = store.load()?;
            let root = config
                .download_root()
                .context("no download path configured; run `configure` first")?;
            match delete_track(&root, &track, &playlist).await {
                DeleteOutcome::Deleted => println!("deleted"),
                DeleteOutcome::NotFound => {
                    println!("not found");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn catalog_from(token: Option<String>) -> anyhow::Result<HttpCatalog> {
    let token = token.context("no bearer token; run `login` and set TUNEGRAB_TOKEN")?;
    Ok(HttpCatalog::new(token))
}

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


//! Playlist-aware music downloader core
//!
//! Authenticates against a streaming catalog, lists playlists and liked
//! tracks, and fetches matching audio through an external `yt-dlp` helper
//! (transcoding to MP3 via `ffmpeg`), sorting output into per-playlist
//! folders. Download sessions report structured progress events and support
//! cooperative cancellation through a shared [`download::SessionRegistry`].

pub mod api;
pub mod config;
pub mod download;
pub mod error;
pub mod events;
pub mod file;
pub mod provision;

pub use api::{Authenticator, CatalogProvider, HttpCatalog, Playlist};
pub use config::{Config, ConfigStore};
pub use download::{DownloadOutcome, DownloadService, SessionRegistry, TrackRequest};
pub use error::{Result, TunegrabError};
pub use events::EventSink;
pub use file::{delete_track, list_known_tracks, sanitize_file_name, DeleteOutcome};

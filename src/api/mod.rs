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


//! Streaming-catalog API client
//!
//! Authentication (OAuth authorization-code flow over a loopback listener)
//! and read-only catalog queries: the user's playlists and the tracks they
//! contain, flattened to logical `"Artist - Title"` names for the download
//! and library subsystems.

pub mod auth;
pub mod catalog;

// Re-export commonly used types
pub use auth::Authenticator;
pub use catalog::{CatalogProvider, HttpCatalog, Playlist, LIKED_PLAYLIST_ID};

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


//! On-disk library handling
//!
//! Path sanitizing, fuzzy matching between catalog track names and the
//! filenames the fetch helper invents, and the scanner that lists or deletes
//! downloaded tracks under the download root.

pub mod matcher;
pub mod paths;
pub mod scanner;

// Re-export commonly used items
pub use matcher::track_matches;
pub use paths::sanitize_file_name;
pub use scanner::{delete_track, list_known_tracks, DeleteOutcome};

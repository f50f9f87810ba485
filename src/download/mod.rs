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


//! Download orchestration
//!
//! One [`session::DownloadService`] invocation drives one external
//! fetch-helper process for one track: argument construction, spawn,
//! line-by-line progress parsing, exit classification. Cancellation arrives
//! concurrently through the shared [`registry::SessionRegistry`], which
//! kills the helper; the closing output stream then unwinds the session.

pub mod progress;
pub mod registry;
pub mod session;

// Re-export commonly used types
pub use progress::{parse_percent, ProgressEvent};
pub use registry::SessionRegistry;
pub use session::{DownloadOutcome, DownloadService, TrackRequest};

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


//! Progress extraction from raw helper output
//!
//! The fetch helper's only structured signal is lines containing a
//! percentage, e.g. `[download]  42.5% of 3.00MiB`. Everything else on the
//! stream is diagnostic text. Values are not monotonic; the helper restarts
//! its counter when it retries a fragment, and consumers must tolerate that.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref PERCENT_RE: Regex = Regex::new(r"(\d+(?:\.\d+)?)%").expect("valid percent regex");
}

/// One progress update for a running download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// Logical track name the session was started with
    pub song: String,
    /// Completion percentage, 0-100, possibly regressing between events
    pub percent: u32,
}

impl ProgressEvent {
    pub fn new(song: &str, percent: f64) -> Self {
        Self {
            song: song.to_string(),
            percent: percent.clamp(0.0, 100.0) as u32,
        }
    }
}

/// Extract the first percentage from a line of helper output
///
/// Recognizes `<digits>%` and `<digits>.<digits>%`; anything else yields
/// `None`, never an error.
pub fn parse_percent(line: &str) -> Option<f64> {
    let captures = PERCENT_RE.captures(line)?;
    captures[1].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fractional_percent() {
        assert_eq!(parse_percent("[download]  42.5% of 3.00MiB"), Some(42.5));
    }

    #[test]
    fn parses_integer_percent() {
        assert_eq!(parse_percent("[download] 100% of 3.00MiB in 00:02"), Some(100.0));
    }

    #[test]
    fn takes_the_first_percent_on_the_line() {
        assert_eq!(parse_percent("at 10% then 90%"), Some(10.0));
    }

    #[test]
    fn line_without_percent_yields_none() {
        assert_eq!(parse_percent("no percent here"), None);
        assert_eq!(parse_percent("[youtube] extracting formats"), None);
        assert_eq!(parse_percent(""), None);
    }

    #[test]
    fn stray_percent_sign_yields_none() {
        assert_eq!(parse_percent("100 % done"), None);
        assert_eq!(parse_percent("...% of"), None);
    }

    #[test]
    fn event_percent_is_clamped_and_truncated() {
        assert_eq!(ProgressEvent::new("s", 42.9).percent, 42);
        assert_eq!(ProgressEvent::new("s", 150.0).percent, 100);
        assert_eq!(ProgressEvent::new("s", -3.0).percent, 0);
    }
}

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


//! Fuzzy matching between catalog track names and on-disk filenames
//!
//! The fetch helper names files after its own title metadata, which rarely
//! equals the catalog's "Artist - Title" byte for byte (extra tags,
//! punctuation differences, truncation). Instead of exact equality we
//! require a majority of the title's significant words to appear in the
//! candidate filename.

/// Decide whether a logical track name and an on-disk file stem denote the
/// same song
///
/// The search phrase is the part of `logical_name` after the first `" - "`
/// separator (the title); when that yields no significant words the whole
/// name is used instead. A match requires the lowercased `candidate_stem` to
/// contain at least half (rounded up) of the distinct significant words as
/// substrings. An empty word list never matches.
pub fn track_matches(logical_name: &str, candidate_stem: &str) -> bool {
    let mut words = significant_words(title_of(logical_name));
    if words.is_empty() {
        words = significant_words(logical_name);
    }
    if words.is_empty() {
        return false;
    }

    let candidate = candidate_stem.to_lowercase();
    let hits = words.iter().filter(|w| candidate.contains(w.as_str())).count();

    // Majority threshold: 2 of 3, 2 of 4, 3 of 5. Load-bearing heuristic,
    // keep the integer formula as-is.
    hits >= (words.len() + 1) / 2
}

/// Title part of an "Artist - Title" name, or the whole string
fn title_of(name: &str) -> &str {
    match name.split_once(" - ") {
        Some((_, title)) => title,
        None => name,
    }
}

/// Distinct lowercase words of length > 2
///
/// Anything outside `[a-z0-9 ]` becomes a space before splitting, so
/// punctuation and non-ASCII characters act as word boundaries.
fn significant_words(phrase: &str) -> Vec<String> {
    let normalized: String = phrase
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut words: Vec<String> = Vec::new();
    for word in normalized.split_whitespace() {
        if word.len() > 2 && !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
    }
    words
}

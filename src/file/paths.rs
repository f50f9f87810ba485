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


//! Filesystem-safe name handling

/// Characters that are invalid in file or directory names on at least one
/// supported platform
const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Map an arbitrary display string to a filesystem-safe name
///
/// Every invalid character becomes `_`, then surrounding whitespace is
/// trimmed. Total and idempotent; never fails.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_invalid_characters() {
        assert_eq!(sanitize_file_name("My: Mix"), "My_ Mix");
        assert_eq!(sanitize_file_name("a/b\\c|d"), "a_b_c_d");
        assert_eq!(sanitize_file_name("<?>*\":"), "______");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(sanitize_file_name("  Chill Beats  "), "Chill Beats");
        assert_eq!(sanitize_file_name(" : "), "_");
    }

    #[test]
    fn output_never_contains_invalid_characters() {
        let hostile = "a<b>c:d\"e/f\\g|h?i*j";
        let clean = sanitize_file_name(hostile);
        assert!(!clean.contains(|c| INVALID_CHARS.contains(&c)));
    }

    #[test]
    fn is_idempotent() {
        for input in ["My: Mix", "  padded  ", "plain", "s/l/a/s/h"] {
            let once = sanitize_file_name(input);
            assert_eq!(sanitize_file_name(&once), once);
        }
    }

    #[test]
    fn leaves_valid_names_untouched() {
        assert_eq!(sanitize_file_name("Valid Name"), "Valid Name");
    }
}

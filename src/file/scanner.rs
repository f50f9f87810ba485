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


//! Library scanner for the download root
//!
//! Walks the download directory to list logically-known tracks and to delete
//! a specific track scoped to one playlist folder. There is no persisted
//! index; every scan recomputes from the filesystem. Walk errors are a fact
//! of life on partially-inaccessible trees, so they are skipped per entry
//! (logged at debug level) and never abort a scan.

use crate::file::matcher::track_matches;
use crate::file::paths::sanitize_file_name;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;

/// Result of a scoped track deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// At least one matching file was removed
    Deleted,
    /// No matching file was found (or none could be removed)
    NotFound,
}

/// List the logical names of all downloaded tracks under `root`
///
/// Every `.mp3` file (case-insensitive extension) anywhere below `root`
/// yields its file stem, case preserved, in no particular order. An
/// unreadable or missing root yields an empty list.
pub async fn list_known_tracks(root: &Path) -> Vec<String> {
    let mut names = Vec::new();
    collect_tracks(root.to_path_buf(), &mut names).await;
    names
}

fn collect_tracks<'a>(
    dir: PathBuf,
    out: &'a mut Vec<String>,
) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
    Box::pin(async move {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                return;
            }
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    if path.is_dir() {
                        collect_tracks(path, out).await;
                    } else if is_mp3(&path) {
                        if let Some(stem) = file_stem(&path) {
                            out.push(stem);
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                    break;
                }
            }
        }
    })
}

/// Delete the on-disk file(s) for a track inside one playlist folder
///
/// A file qualifies when its stem fuzzy-matches `logical_name` (see
/// [`track_matches`]) and its full path contains the sanitized playlist
/// name, so the same song under another playlist survives. The walk does
/// not stop at the first hit; every qualifying file is removed. Removal
/// failures are logged and skipped.
pub async fn delete_track(root: &Path, logical_name: &str, playlist_name: &str) -> DeleteOutcome {
    let playlist_marker = sanitize_file_name(playlist_name).to_lowercase();
    let mut removed = false;
    delete_matching(root.to_path_buf(), logical_name, &playlist_marker, &mut removed).await;
    if removed {
        DeleteOutcome::Deleted
    } else {
        DeleteOutcome::NotFound
    }
}

fn delete_matching<'a>(
    dir: PathBuf,
    logical_name: &'a str,
    playlist_marker: &'a str,
    removed: &'a mut bool,
) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
    Box::pin(async move {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                return;
            }
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    if path.is_dir() {
                        delete_matching(path, logical_name, playlist_marker, removed).await;
                        continue;
                    }
                    if !is_mp3(&path) {
                        continue;
                    }
                    let stem = match file_stem(&path) {
                        Some(stem) => stem.to_lowercase(),
                        None => continue,
                    };
                    if !track_matches(logical_name, &stem) {
                        continue;
                    }
                    if !path
                        .to_string_lossy()
                        .to_lowercase()
                        .contains(playlist_marker)
                    {
                        continue;
                    }
                    match fs::remove_file(&path).await {
                        Ok(()) => {
                            tracing::info!(file = %path.display(), "deleted track file");
                            *removed = true;
                        }
                        Err(e) => {
                            tracing::warn!(file = %path.display(), error = %e, "could not delete track file");
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                    break;
                }
            }
        }
    })
}

fn is_mp3(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.unwrap();
        }
        fs::write(path, b"mp3 bytes").await.unwrap();
    }

    #[tokio::test]
    async fn lists_mp3_stems_case_insensitively() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.mp3")).await;
        touch(&dir.path().join("b.MP3")).await;
        touch(&dir.path().join("c.txt")).await;

        let mut names = list_known_tracks(dir.path()).await;
        names.sort();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn walks_nested_playlist_folders() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("Mix One/Song.mp3")).await;
        touch(&dir.path().join("Mix Two/Deeper/Other Song.mp3")).await;

        let mut names = list_known_tracks(dir.path()).await;
        names.sort();
        assert_eq!(names, vec!["Other Song".to_string(), "Song".to_string()]);
    }

    #[tokio::test]
    async fn missing_root_yields_empty_list() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("never-created");
        assert!(list_known_tracks(&gone).await.is_empty());
    }

    #[tokio::test]
    async fn delete_is_scoped_to_the_playlist_folder() {
        let dir = TempDir::new().unwrap();
        let in_a = dir.path().join("PlaylistA/Song One.mp3");
        let in_b = dir.path().join("PlaylistB/Song One.mp3");
        touch(&in_a).await;
        touch(&in_b).await;

        let outcome = delete_track(dir.path(), "Artist - Song One", "PlaylistA").await;

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(!in_a.exists());
        assert!(in_b.exists());
    }

    #[tokio::test]
    async fn delete_unknown_song_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let kept = dir.path().join("PlaylistA/Song One.mp3");
        touch(&kept).await;

        let outcome = delete_track(dir.path(), "Artist - Completely Different", "PlaylistA").await;

        assert_eq!(outcome, DeleteOutcome::NotFound);
        assert!(kept.exists());
    }

    #[tokio::test]
    async fn delete_removes_every_match_in_scope() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("PlaylistA/Song One.mp3");
        let second = dir.path().join("PlaylistA/Song One (Lyrics).mp3");
        touch(&first).await;
        touch(&second).await;

        let outcome = delete_track(dir.path(), "Artist - Song One", "PlaylistA").await;

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(!first.exists());
        assert!(!second.exists());
    }

    #[tokio::test]
    async fn delete_scopes_via_sanitized_playlist_name() {
        let dir = TempDir::new().unwrap();
        // "My: Mix" sanitizes to "My_ Mix", which is the on-disk folder name.
        let file = dir.path().join("My_ Mix/Song One.mp3");
        touch(&file).await;

        let outcome = delete_track(dir.path(), "Artist - Song One", "My: Mix").await;

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(!file.exists());
    }
}

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


//! Read-only catalog queries
//!
//! Lists the user's playlists and flattens a playlist's tracks into logical
//! `"Artist - Title"` names, the form the matcher and the download session
//! work with. The saved-tracks library is exposed as a pseudo-playlist with
//! the fixed id [`LIKED_PLAYLIST_ID`]. Pagination (pages of 50) is handled
//! here; callers always see one complete Vec.

use crate::error::{Result, TunegrabError};
use async_trait::async_trait;
use serde::Deserialize;

const API_BASE: &str = "https://api.spotify.com/v1";
const PAGE_SIZE: u32 = 50;

/// Pseudo-playlist id for the user's saved tracks
pub const LIKED_PLAYLIST_ID: &str = "liked";

/// One playlist as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub track_count: u32,
}

/// Source of playlists and their tracks
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn list_playlists(&self) -> Result<Vec<Playlist>>;

    /// Logical track names of one playlist, `"liked"` for saved tracks
    async fn list_tracks(&self, playlist_id: &str) -> Result<Vec<String>>;
}

/// Catalog provider backed by the service's HTTP API
pub struct HttpCatalog {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, API_BASE.to_string())
    }

    /// Test seam: same client against a different endpoint root
    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TunegrabError::api_failed(
                format!("catalog request failed with status {status}"),
                Some(status.as_u16()),
                Some(path.to_string()),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TunegrabError::InvalidApiResponse(format!("{path}: {e}")))
    }

    async fn collect_pages<P, F>(&self, path: &str, mut extract: F) -> Result<Vec<String>>
    where
        P: serde::de::DeserializeOwned + Paged,
        F: FnMut(P, &mut Vec<String>),
    {
        let mut names = Vec::new();
        let mut offset = 0u32;
        loop {
            let page: P = self
                .get_json(&format!("{path}?limit={PAGE_SIZE}&offset={offset}"))
                .await?;
            let total = page.total();
            let count = page.len();
            extract(page, &mut names);

            if count == 0 {
                break;
            }
            offset += count;
            if offset >= total {
                break;
            }
        }
        Ok(names)
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalog {
    async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        let saved: SavedTracksPage = self.get_json("/me/tracks?limit=1&offset=0").await?;
        let mut playlists = vec![Playlist {
            id: LIKED_PLAYLIST_ID.to_string(),
            name: "Liked Songs".to_string(),
            track_count: saved.total,
        }];

        let mut offset = 0u32;
        loop {
            let page: PlaylistsPage = self
                .get_json(&format!("/me/playlists?limit={PAGE_SIZE}&offset={offset}"))
                .await?;
            let total = page.total;
            let count = page.items.len() as u32;
            playlists.extend(page.items.into_iter().map(|item| Playlist {
                id: item.id,
                name: item.name,
                track_count: item.tracks.total,
            }));

            if count == 0 {
                break;
            }
            offset += count;
            if offset >= total {
                break;
            }
        }
        Ok(playlists)
    }

    async fn list_tracks(&self, playlist_id: &str) -> Result<Vec<String>> {
        if playlist_id == LIKED_PLAYLIST_ID {
            self.collect_pages("/me/tracks", |page: SavedTracksPage, out| {
                out.extend(page.items.into_iter().map(|e| display_name(&e.track)));
            })
            .await
        } else {
            let path = format!("/playlists/{playlist_id}/tracks");
            self.collect_pages(&path, |page: PlaylistTracksPage, out| {
                out.extend(
                    page.items
                        .into_iter()
                        .filter_map(|e| e.track)
                        .map(|t| display_name(&t)),
                );
            })
            .await
        }
    }
}

/// Logical name used everywhere downstream of the catalog
fn display_name(track: &TrackInfo) -> String {
    let artist = track
        .artists
        .first()
        .map(|a| a.name.as_str())
        .unwrap_or("Unknown Artist");
    format!("{} - {}", artist, track.name)
}

trait Paged {
    fn total(&self) -> u32;
    fn len(&self) -> u32;
}

// Wire format of the catalog API, reduced to the fields we read.

#[derive(Debug, Deserialize)]
struct PlaylistsPage {
    items: Vec<PlaylistItem>,
    total: u32,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    id: String,
    name: String,
    tracks: TrackCount,
}

#[derive(Debug, Deserialize)]
struct TrackCount {
    total: u32,
}

#[derive(Debug, Deserialize)]
struct SavedTracksPage {
    items: Vec<SavedEntry>,
    total: u32,
}

#[derive(Debug, Deserialize)]
struct SavedEntry {
    track: TrackInfo,
}

#[derive(Debug, Deserialize)]
struct PlaylistTracksPage {
    items: Vec<PlaylistEntry>,
    total: u32,
}

/// `track` can be null for items removed from the service's catalog
#[derive(Debug, Deserialize)]
struct PlaylistEntry {
    track: Option<TrackInfo>,
}

#[derive(Debug, Deserialize)]
struct TrackInfo {
    name: String,
    artists: Vec<ArtistInfo>,
}

#[derive(Debug, Deserialize)]
struct ArtistInfo {
    name: String,
}

impl Paged for SavedTracksPage {
    fn total(&self) -> u32 {
        self.total
    }
    fn len(&self) -> u32 {
        self.items.len() as u32
    }
}

impl Paged for PlaylistTracksPage {
    fn total(&self) -> u32 {
        self.total
    }
    fn len(&self) -> u32 {
        self.items.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_uses_the_first_artist() {
        let track: TrackInfo = serde_json::from_value(serde_json::json!({
            "name": "Song Title",
            "artists": [{"name": "Main Artist"}, {"name": "Featured"}],
        }))
        .unwrap();
        assert_eq!(display_name(&track), "Main Artist - Song Title");
    }

    #[test]
    fn display_name_tolerates_missing_artists() {
        let track: TrackInfo = serde_json::from_value(serde_json::json!({
            "name": "Orphan Song",
            "artists": [],
        }))
        .unwrap();
        assert_eq!(display_name(&track), "Unknown Artist - Orphan Song");
    }

    #[test]
    fn playlist_page_parses_the_fields_we_need() {
        let page: PlaylistsPage = serde_json::from_value(serde_json::json!({
            "items": [
                {"id": "p1", "name": "Chill Beats", "tracks": {"total": 42},
                 "owner": {"id": "u"}, "public": true},
            ],
            "total": 1,
            "limit": 50,
            "offset": 0,
        }))
        .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "p1");
        assert_eq!(page.items[0].tracks.total, 42);
    }

    #[test]
    fn removed_tracks_deserialize_as_none() {
        let page: PlaylistTracksPage = serde_json::from_value(serde_json::json!({
            "items": [
                {"track": null},
                {"track": {"name": "Kept", "artists": [{"name": "A"}]}},
            ],
            "total": 2,
        }))
        .unwrap();
        let names: Vec<String> = page
            .items
            .into_iter()
            .filter_map(|e| e.track)
            .map(|t| display_name(&t))
            .collect();
        assert_eq!(names, vec!["A - Kept".to_string()]);
    }
}

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


//! Error types for tunegrab
//!
//! A single `thiserror` enum covers the whole crate, categorized by domain
//! (catalog API, configuration, filesystem, helper process). Pure query
//! operations (scanner, matcher, percent parser) never surface errors;
//! mutating operations return either this error type or an explicit outcome
//! enum (`DownloadOutcome`, `DeleteOutcome`).

use thiserror::Error;

/// Result type alias using our TunegrabError type
pub type Result<T> = std::result::Result<T, TunegrabError>;

/// Main error type for tunegrab
#[derive(Error, Debug)]
pub enum TunegrabError {
    // ===== Catalog API =====

    /// Authentication with the catalog service failed
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Generic API request failure
    #[error("API request failed: {message}")]
    ApiRequestFailed {
        message: String,
        /// HTTP status code if available
        status_code: Option<u16>,
        /// API endpoint that failed
        endpoint: Option<String>,
    },

    /// API returned invalid or unexpected response format
    #[error("invalid API response: {0}")]
    InvalidApiResponse(String),

    // ===== Configuration =====

    /// Configuration is missing or incomplete (no credentials, no download root)
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    // ===== Filesystem =====

    /// Generic file I/O error with path context
    #[error("file I/O error: {0}")]
    FileIoError(String),

    /// Invalid or unusable path
    #[error("invalid path: {0}")]
    InvalidPath(String),

    // ===== Helper process =====

    /// The audio-fetch helper binary is missing or unrunnable
    #[error("helper not found: {0}")]
    HelperNotFound(String),

    /// Helper process could not be spawned
    #[error("failed to spawn helper: {0}")]
    SpawnFailed(String),

    /// A download session is already running (single-flight violation)
    #[error("a download is already in progress")]
    DownloadInProgress,

    /// Termination signal could not be delivered
    #[error("failed to terminate download process: {0}")]
    KillFailed(String),

    // ===== External library errors =====

    /// HTTP client error from reqwest
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TunegrabError {
    /// Create an ApiRequestFailed error
    pub fn api_failed<S: Into<String>>(
        message: S,
        status_code: Option<u16>,
        endpoint: Option<String>,
    ) -> Self {
        TunegrabError::ApiRequestFailed {
            message: message.into(),
            status_code,
            endpoint,
        }
    }

    /// Check if error is due to authentication
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            TunegrabError::AuthenticationFailed(_)
                | TunegrabError::ApiRequestFailed {
                    status_code: Some(401),
                    ..
                }
        )
    }

    /// Get user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            TunegrabError::HelperNotFound(name) => {
                format!(
                    "{name} is required but was not found. Re-run provisioning or place it next to the executable."
                )
            }
            TunegrabError::ConfigurationError(msg) => {
                format!("Configuration incomplete: {msg}. Run `configure` first.")
            }
            TunegrabError::AuthenticationFailed(msg) => {
                format!("Login failed: {msg}. Please check your credentials and try again.")
            }
            TunegrabError::DownloadInProgress => {
                "Another download is still running. Wait for it to finish or cancel it.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

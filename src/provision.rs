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


//! First-run provisioning of the helper executables
//!
//! The audio-fetch (`yt-dlp`) and transcode (`ffmpeg`) helpers ship in a
//! `binaries/` directory next to the application executable. On first run
//! they are copied into the per-user application directory so later updates
//! of the application do not disturb a working toolchain. Copying is
//! skipped for helpers already present in the target directory.

use crate::error::{Result, TunegrabError};
use std::path::{Path, PathBuf};

#[cfg(windows)]
const FETCH_HELPER: &str = "yt-dlp.exe";
#[cfg(not(windows))]
const FETCH_HELPER: &str = "yt-dlp";

#[cfg(windows)]
const TRANSCODE_HELPER: &str = "ffmpeg.exe";
#[cfg(not(windows))]
const TRANSCODE_HELPER: &str = "ffmpeg";

/// Directory next to the executable holding bundled helpers
const BUNDLE_DIR_NAME: &str = "binaries";

/// Resolved locations of the two helper executables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    /// Audio-fetch helper (yt-dlp)
    pub fetcher: PathBuf,
    /// Audio-transcode helper (ffmpeg), passed to the fetcher
    pub transcoder: PathBuf,
}

impl ToolPaths {
    /// Expected helper locations inside an application directory
    pub fn in_dir(app_dir: &Path) -> Self {
        Self {
            fetcher: app_dir.join(FETCH_HELPER),
            transcoder: app_dir.join(TRANSCODE_HELPER),
        }
    }

    /// Error out unless both helpers exist on disk
    pub fn verify(&self) -> Result<()> {
        for (name, path) in [(FETCH_HELPER, &self.fetcher), (TRANSCODE_HELPER, &self.transcoder)] {
            if !path.exists() {
                return Err(TunegrabError::HelperNotFound(name.to_string()));
            }
        }
        Ok(())
    }
}

/// Copy bundled helpers into `app_dir`, returning their final paths
///
/// Helpers already present in `app_dir` are left untouched. A helper that is
/// missing from both the bundle and `app_dir` is reported per-tool so the
/// caller can surface which binary the user must supply.
pub fn provision_tools(app_dir: &Path) -> Result<ToolPaths> {
    let bundle_dir = bundle_dir()?;
    let tools = ToolPaths::in_dir(app_dir);

    for (name, target) in [(FETCH_HELPER, &tools.fetcher), (TRANSCODE_HELPER, &tools.transcoder)] {
        if target.exists() {
            continue;
        }
        let source = bundle_dir.join(name);
        if !source.exists() {
            tracing::warn!(helper = name, bundle = %bundle_dir.display(), "bundled helper missing");
            continue;
        }
        copy_helper(&source, target)?;
        tracing::info!(helper = name, target = %target.display(), "helper provisioned");
    }

    Ok(tools)
}

fn bundle_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| TunegrabError::FileIoError(format!("locate executable: {e}")))?;
    let base = exe
        .parent()
        .ok_or_else(|| TunegrabError::InvalidPath("executable has no parent directory".into()))?;
    Ok(base.join(BUNDLE_DIR_NAME))
}

fn copy_helper(source: &Path, target: &Path) -> Result<()> {
    std::fs::copy(source, target).map_err(|e| {
        TunegrabError::FileIoError(format!(
            "copy {} -> {}: {}",
            source.display(),
            target.display(),
            e
        ))
    })?;
    mark_executable(target)
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| TunegrabError::FileIoError(format!("chmod {}: {}", path.display(), e)))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn verify_reports_missing_fetcher() {
        let dir = TempDir::new().unwrap();
        let tools = ToolPaths::in_dir(dir.path());
        let err = tools.verify().unwrap_err();
        assert!(matches!(err, TunegrabError::HelperNotFound(name) if name == FETCH_HELPER));
    }

    #[test]
    fn verify_accepts_present_helpers() {
        let dir = TempDir::new().unwrap();
        let tools = ToolPaths::in_dir(dir.path());
        std::fs::write(&tools.fetcher, b"stub").unwrap();
        std::fs::write(&tools.transcoder, b"stub").unwrap();
        tools.verify().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn copy_helper_marks_target_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src-bin");
        let target = dir.path().join("dst-bin");
        std::fs::write(&source, b"#!/bin/sh\n").unwrap();

        copy_helper(&source, &target).unwrap();

        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}

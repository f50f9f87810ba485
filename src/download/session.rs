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


//! Download session state machine
//!
//! One call to [`DownloadService::download`] is one session:
//! `Starting → Running → {Completed, Cancelled, Failed}`. The session owns
//! the helper process for its whole life; the shared [`SessionRegistry`]
//! only ever sees a weak handle, used by concurrent cancel requests. The
//! run loop reads the helper's stdout and stderr line by line until both
//! close, then waits for the exit status. Whether a non-zero exit means
//! "cancelled" or "failed" is decided by the registry's cancellation flag,
//! not by the exit code; a killed helper and a broken one exit the same way.

use crate::download::progress::{parse_percent, ProgressEvent};
use crate::download::registry::{ProcessHandle, SessionRegistry};
use crate::error::Result;
use crate::events::{EventSink, PROGRESS_EVENT};
use crate::file::paths::sanitize_file_name;
use crate::provision::ToolPaths;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::Mutex as TokioMutex;

/// What one download session is asked to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRequest {
    /// Logical track name, typically "Artist - Title"
    pub track_name: String,
    /// Playlist the track belongs to; becomes the target folder name
    pub playlist_name: String,
}

/// Terminal state of a download session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Helper exited successfully; the file is in place
    Completed,
    /// Helper was killed after a cancel request
    Cancelled,
    /// Anything else, with a human-readable detail line
    Failed(String),
}

/// Runs download sessions against the external fetch helper
pub struct DownloadService {
    tools: ToolPaths,
    download_root: PathBuf,
    registry: Arc<SessionRegistry>,
    events: Arc<dyn EventSink>,
}

impl DownloadService {
    pub fn new(
        tools: ToolPaths,
        download_root: PathBuf,
        registry: Arc<SessionRegistry>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            tools,
            download_root,
            registry,
            events,
        }
    }

    /// Shared registry, for wiring cancel requests from other tasks
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Ask the active session (if any) to stop
    pub async fn request_cancel(&self) -> Result<()> {
        self.registry.request_cancel().await
    }

    /// Run one download session to its terminal state
    ///
    /// Never returns an error; every way a session can go wrong is a
    /// [`DownloadOutcome::Failed`] so the caller always gets exactly one
    /// terminal state per request.
    pub async fn download(&self, request: &TrackRequest) -> DownloadOutcome {
        // Checked again at registration; this early exit keeps a rejected
        // session from resetting the active session's cancel flag.
        if self.registry.has_active_session() {
            let detail = crate::error::TunegrabError::DownloadInProgress.to_string();
            self.events.log(&format!("Download error: {detail}"));
            return DownloadOutcome::Failed(detail);
        }

        let target_dir = self.target_dir(&request.playlist_name);
        if let Err(e) = tokio::fs::create_dir_all(&target_dir).await {
            let detail = format!("could not create {}: {}", target_dir.display(), e);
            self.events.log(&format!("Download error: {detail}"));
            return DownloadOutcome::Failed(detail);
        }

        self.events
            .log(&format!("Starting download: {}", request.track_name));

        // A cancel left over from the previous session must not kill this
        // one; anything set after this point is aimed at us.
        self.registry.reset_cancel_flag();

        let mut child = match Command::new(&self.tools.fetcher)
            .args(self.helper_args(request, &target_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                let detail = format!("could not start {}: {}", self.tools.fetcher.display(), e);
                self.events.log(&format!("Download error: {detail}"));
                return DownloadOutcome::Failed(detail);
            }
        };

        // Pipes come out before the child goes behind the shared mutex, so
        // the read loop never competes with cancellers for the lock.
        let stdout = child.stdout.take().expect("stdout was piped");
        let stderr = child.stderr.take().expect("stderr was piped");
        let handle: ProcessHandle = Arc::new(TokioMutex::new(child));

        if let Err(e) = self.registry.register(&handle) {
            let _ = handle.lock().await.start_kill();
            let _ = handle.lock().await.wait().await;
            let detail = e.to_string();
            self.events.log(&format!("Download error: {detail}"));
            return DownloadOutcome::Failed(detail);
        }

        let last_error = self.pump_output(&request.track_name, stdout, stderr).await;

        let status = Self::await_exit(&handle).await;
        self.registry.clear();

        match status {
            Ok(status) if status.success() => {
                self.events
                    .log(&format!("Download finished: {}", request.track_name));
                DownloadOutcome::Completed
            }
            _ if self.registry.is_cancelling() => {
                self.events
                    .log(&format!("Download cancelled: {}", request.track_name));
                DownloadOutcome::Cancelled
            }
            Ok(status) => {
                let detail = last_error
                    .unwrap_or_else(|| format!("helper exited with status {status}"));
                self.events.log(&format!("Download error: {detail}"));
                DownloadOutcome::Failed(detail)
            }
            Err(e) => {
                let detail = format!("could not collect helper exit status: {e}");
                self.events.log(&format!("Download error: {detail}"));
                DownloadOutcome::Failed(detail)
            }
        }
    }

    /// Collect the exit status without monopolizing the shared handle
    ///
    /// A helper can close both pipes and keep running (a lingering
    /// transcode grandchild, a detached phase), so the mutex must stay
    /// available to cancellers for as long as the process lives. Polling
    /// `try_wait` in short lock acquisitions keeps every lock hold brief;
    /// a kill delivered between polls is picked up on the next one.
    async fn await_exit(handle: &ProcessHandle) -> std::io::Result<std::process::ExitStatus> {
        loop {
            let polled = handle.lock().await.try_wait();
            match polled {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => tokio::time::sleep(Duration::from_millis(50)).await,
                Err(e) => return Err(e),
            }
        }
    }

    /// Read both helper pipes to EOF, emitting progress along the way
    ///
    /// Returns the last `ERROR:`-prefixed line seen, the helper's own
    /// diagnostic for the eventual failure report.
    async fn pump_output(
        &self,
        track_name: &str,
        stdout: tokio::process::ChildStdout,
        stderr: tokio::process::ChildStderr,
    ) -> Option<String> {
        let mut out_lines = BufReader::new(stdout).lines();
        let mut err_lines = BufReader::new(stderr).lines();
        let mut out_open = true;
        let mut err_open = true;
        let mut last_error = None;

        while out_open || err_open {
            tokio::select! {
                line = out_lines.next_line(), if out_open => match line {
                    Ok(Some(line)) => self.handle_line(track_name, &line, &mut last_error),
                    _ => out_open = false,
                },
                line = err_lines.next_line(), if err_open => match line {
                    Ok(Some(line)) => self.handle_line(track_name, &line, &mut last_error),
                    _ => err_open = false,
                },
            }
        }
        last_error
    }

    fn handle_line(&self, track_name: &str, line: &str, last_error: &mut Option<String>) {
        tracing::debug!(helper_output = line);
        if line.starts_with("ERROR:") {
            *last_error = Some(line.to_string());
        }
        if let Some(percent) = parse_percent(line) {
            let event = ProgressEvent::new(track_name, percent);
            self.events.emit(PROGRESS_EVENT, json!(event));
        }
    }

    fn target_dir(&self, playlist_name: &str) -> PathBuf {
        self.download_root.join(sanitize_file_name(playlist_name))
    }

    fn helper_args(&self, request: &TrackRequest, target_dir: &Path) -> Vec<String> {
        let output_template = target_dir.join("%(title)s.%(ext)s");
        vec![
            "--newline".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            "mp3".to_string(),
            "--ignore-errors".to_string(),
            "--no-playlist".to_string(),
            "--ffmpeg-location".to_string(),
            self.tools.transcoder.display().to_string(),
            "--output".to_string(),
            output_template.display().to_string(),
            format!("ytsearch1:{}", request.track_name),
        ]
    }
}

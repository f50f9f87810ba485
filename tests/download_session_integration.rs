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

//! End-to-end download session tests against a stub fetch helper
//!
//! The helper is a shell script standing in for yt-dlp, so these are
//! unix-only. Each test drives a full session: spawn, progress parsing,
//! exit classification, registry bookkeeping.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;
use tunegrab::download::{DownloadOutcome, DownloadService, SessionRegistry, TrackRequest};
use tunegrab::events::{ChannelSink, Event, LOG_EVENT, PROGRESS_EVENT};
use tunegrab::provision::ToolPaths;

/// Write an executable stub helper script into `dir`
fn stub_helper(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("yt-dlp");
    let script = format!("#!/bin/sh\n{body}\n");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

struct Harness {
    service: DownloadService,
    registry: Arc<SessionRegistry>,
    events: UnboundedReceiver<Event>,
    _dir: TempDir,
}

fn harness(script_body: &str) -> Harness {
    let dir = TempDir::new().unwrap();
    let fetcher = stub_helper(dir.path(), script_body);
    let root = dir.path().join("music");
    let registry = Arc::new(SessionRegistry::new());
    let (sink, events) = ChannelSink::new();
    let service = DownloadService::new(
        ToolPaths {
            fetcher,
            transcoder: dir.path().join("ffmpeg"),
        },
        root,
        Arc::clone(&registry),
        Arc::new(sink),
    );
    Harness {
        service,
        registry,
        events,
        _dir: dir,
    }
}

fn request() -> TrackRequest {
    TrackRequest {
        track_name: "Artist - Song Title".to_string(),
        playlist_name: "Test Playlist".to_string(),
    }
}

fn drain(events: &mut UnboundedReceiver<Event>) -> Vec<Event> {
    let mut all = Vec::new();
    while let Ok(event) = events.try_recv() {
        all.push(event);
    }
    all
}

#[tokio::test]
async fn successful_helper_run_completes_with_progress_events() {
    let mut h = harness(
        r#"echo '[youtube] searching'
echo '[download]  10.0% of 3.00MiB'
echo '[download]  55.5% of 3.00MiB'
echo '[download] 100% of 3.00MiB in 00:02'
exit 0"#,
    );

    let outcome = h.service.download(&request()).await;

    assert_eq!(outcome, DownloadOutcome::Completed);
    assert!(!h.registry.has_active_session());

    let events = drain(&mut h.events);
    let percents: Vec<u64> = events
        .iter()
        .filter(|e| e.name == PROGRESS_EVENT)
        .map(|e| e.payload["percent"].as_u64().unwrap())
        .collect();
    assert_eq!(percents, vec![10, 55, 100]);
    for event in events.iter().filter(|e| e.name == PROGRESS_EVENT) {
        assert_eq!(event.payload["song"], "Artist - Song Title");
    }

    let logs: Vec<&str> = events
        .iter()
        .filter(|e| e.name == LOG_EVENT)
        .map(|e| e.payload.as_str().unwrap())
        .collect();
    assert!(logs.iter().any(|l| l.starts_with("Starting download:")));
    assert!(logs.iter().any(|l| l.starts_with("Download finished:")));
}

#[tokio::test]
async fn failing_helper_reports_its_last_error_line() {
    let mut h = harness(
        r#"echo '[download]   5.0% of 3.00MiB'
echo 'ERROR: first problem' >&2
echo 'ERROR: no video results' >&2
exit 1"#,
    );

    let outcome = h.service.download(&request()).await;

    match outcome {
        DownloadOutcome::Failed(detail) => assert_eq!(detail, "ERROR: no video results"),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(!h.registry.has_active_session());

    let logs: Vec<Event> = drain(&mut h.events)
        .into_iter()
        .filter(|e| e.name == LOG_EVENT)
        .collect();
    assert!(logs
        .iter()
        .any(|e| e.payload.as_str().unwrap().starts_with("Download error:")));
}

#[tokio::test]
async fn failure_without_error_line_reports_the_exit_status() {
    let h = harness("exit 3");

    let outcome = h.service.download(&request()).await;

    match outcome {
        DownloadOutcome::Failed(detail) => assert!(detail.contains("status")),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn cancel_during_the_run_classifies_as_cancelled() {
    // The stub loops in short sleeps so a SIGKILL leaves no long-lived
    // orphan holding the pipes open.
    let h = harness(
        r#"i=0
while [ $i -lt 200 ]; do
  echo "[download]  1.${i}% of 3.00MiB"
  sleep 0.1
  i=$((i+1))
done"#,
    );
    let Harness {
        service,
        registry,
        mut events,
        ..
    } = h;

    let session = tokio::spawn(async move { service.download(&request()).await });

    // First progress event proves the helper is running and registered.
    loop {
        let event = events.recv().await.expect("session ended early");
        if event.name == PROGRESS_EVENT {
            break;
        }
    }

    registry.request_cancel().await.unwrap();
    let outcome = session.await.unwrap();

    assert_eq!(outcome, DownloadOutcome::Cancelled);
    assert!(!registry.has_active_session());
}

#[tokio::test]
async fn cancel_after_the_pipes_close_still_kills_promptly() {
    // The stub hands its output fds away and lingers, so the session sees
    // EOF long before process exit. A cancel in that window must be
    // delivered immediately, not after the helper exits on its own.
    let h = harness(
        r#"echo '[download]  10.0% of 3.00MiB'
exec >/dev/null 2>&1
sleep 10
exit 0"#,
    );
    let Harness {
        service,
        registry,
        mut events,
        ..
    } = h;

    let session = tokio::spawn(async move { service.download(&request()).await });

    loop {
        let event = events.recv().await.expect("session ended early");
        if event.name == PROGRESS_EVENT {
            break;
        }
    }
    // Give the streams a moment to reach EOF.
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    tokio::time::timeout(
        std::time::Duration::from_secs(2),
        registry.request_cancel(),
    )
    .await
    .expect("cancel blocked on the session's exit wait")
    .unwrap();

    let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), session)
        .await
        .expect("session did not terminate after the kill")
        .unwrap();
    assert_eq!(outcome, DownloadOutcome::Cancelled);
    assert!(!registry.has_active_session());
}

#[tokio::test]
async fn concurrent_download_is_rejected_while_one_is_running() {
    let h = harness(
        r#"i=0
while [ $i -lt 100 ]; do
  echo "[download]  2.0% of 3.00MiB"
  sleep 0.1
  i=$((i+1))
done"#,
    );
    let Harness {
        service,
        registry,
        mut events,
        ..
    } = h;
    let service = Arc::new(service);

    let first = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.download(&request()).await })
    };

    loop {
        let event = events.recv().await.expect("session ended early");
        if event.name == PROGRESS_EVENT {
            break;
        }
    }

    let second = service
        .download(&TrackRequest {
            track_name: "Other Artist - Other Song".to_string(),
            playlist_name: "Other".to_string(),
        })
        .await;
    match second {
        DownloadOutcome::Failed(detail) => assert!(detail.contains("in progress")),
        other => panic!("expected Failed, got {other:?}"),
    }

    // The first session is unaffected by the rejection.
    registry.request_cancel().await.unwrap();
    assert_eq!(first.await.unwrap(), DownloadOutcome::Cancelled);
}

#[tokio::test]
async fn helper_receives_the_fetcher_argument_contract() {
    let dir = TempDir::new().unwrap();
    let args_file = dir.path().join("seen-args");
    let h = {
        // Record the arguments, then succeed.
        let body = format!("printf '%s\\n' \"$@\" > {}\nexit 0", args_file.display());
        let fetcher = stub_helper(dir.path(), &body);
        let root = dir.path().join("music");
        let registry = Arc::new(SessionRegistry::new());
        let (sink, events) = ChannelSink::new();
        let service = DownloadService::new(
            ToolPaths {
                fetcher,
                transcoder: dir.path().join("ffmpeg"),
            },
            root.clone(),
            Arc::clone(&registry),
            Arc::new(sink),
        );
        (service, events, root)
    };
    let (service, _events, root) = h;

    let outcome = service.download(&request()).await;
    assert_eq!(outcome, DownloadOutcome::Completed);

    let args = std::fs::read_to_string(&args_file).unwrap();
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(args[0], "--newline");
    assert!(args.contains(&"--extract-audio"));
    assert!(args.contains(&"--no-playlist"));
    assert_eq!(*args.last().unwrap(), "ytsearch1:Artist - Song Title");

    let output_at = args.iter().position(|a| *a == "--output").unwrap();
    assert!(args[output_at + 1].contains("Test Playlist"));

    // The playlist folder exists even though the stub wrote nothing into it.
    assert!(root.join("Test Playlist").is_dir());
}

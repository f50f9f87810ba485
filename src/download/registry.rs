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


//! Shared state linking a running download to its cancellation requests
//!
//! At most one helper process runs at a time. The registry holds a weak
//! handle to that process plus the cancellation flag; the session that
//! spawned the process owns the strong handle, so a crashed or finished
//! session can never leave a live entry behind.

use crate::error::{Result, TunegrabError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::process::Child;
use tokio::sync::Mutex as TokioMutex;

/// Handle to the helper process of the active session
pub type ProcessHandle = Arc<TokioMutex<Child>>;

/// Registry of the (single) active download session
///
/// The flag outlives the process handle on purpose: a session checks it
/// after the helper exits to tell a cancellation from a genuine failure,
/// and a cancel request that races with process exit must still be
/// observable at that point.
pub struct SessionRegistry {
    active: Mutex<Weak<TokioMutex<Child>>>,
    cancel_requested: AtomicBool,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(Weak::new()),
            cancel_requested: AtomicBool::new(false),
        }
    }

    /// Register a freshly spawned helper as the active session
    ///
    /// Fails with [`TunegrabError::DownloadInProgress`] while a previous
    /// registration is still alive. The cancellation flag is deliberately
    /// left alone; a cancel that raced in between spawn and registration
    /// must stay observable. Sessions reset the flag before they spawn.
    pub fn register(&self, handle: &ProcessHandle) -> Result<()> {
        let mut active = self.active.lock().expect("registry lock poisoned");
        if active.strong_count() > 0 {
            return Err(TunegrabError::DownloadInProgress);
        }
        *active = Arc::downgrade(handle);
        Ok(())
    }

    /// Forget any cancel request from a previous session
    pub fn reset_cancel_flag(&self) {
        self.cancel_requested.store(false, Ordering::SeqCst);
    }

    /// Drop the registration once the session is over, any outcome
    pub fn clear(&self) {
        let mut active = self.active.lock().expect("registry lock poisoned");
        *active = Weak::new();
    }

    /// Request cancellation of the active download
    ///
    /// Sets the flag first, then kills the helper if one is still running.
    /// With no live session the flag is latched and this is a benign
    /// success; a session currently between spawn and register will see the
    /// flag and classify as cancelled once its process is killed. Only a
    /// kill that cannot be delivered is an error.
    pub async fn request_cancel(&self) -> Result<()> {
        self.cancel_requested.store(true, Ordering::SeqCst);

        let handle = {
            let active = self.active.lock().expect("registry lock poisoned");
            active.upgrade()
        };

        let handle = match handle {
            Some(handle) => handle,
            None => {
                tracing::debug!("cancel requested with no active download");
                return Ok(());
            }
        };

        let mut child = handle.lock().await;
        child
            .start_kill()
            .map_err(|e| TunegrabError::KillFailed(e.to_string()))?;
        tracing::info!("kill signal sent to active download helper");
        Ok(())
    }

    /// Whether a cancel was requested since the last
    /// [`reset_cancel_flag`](Self::reset_cancel_flag)
    pub fn is_cancelling(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    /// Whether a session is currently registered
    pub fn has_active_session(&self) -> bool {
        self.active
            .lock()
            .expect("registry lock poisoned")
            .strong_count()
            > 0
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

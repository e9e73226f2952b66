//! Background export
//!
//! Runs [`export_files`] on one dedicated thread so a caller with its own
//! event loop is not blocked. Progress snapshots arrive over a channel that
//! holds at most one pending snapshot; when the caller does not keep up, newer
//! snapshots are dropped until it reads again.

use std::sync::mpsc::{sync_channel, Receiver};
use std::thread::{self, JoinHandle};

use super::control::ExportControl;
use super::export::{export_files, ExportSummary};
use crate::config::ExportRequest;
use crate::error::Result;

/// Progress snapshots buffered while nobody reads them.
const PROGRESS_BACKLOG: usize = 1;

pub struct ExportHandle {
    control: ExportControl,
    progress: Receiver<ExportSummary>,
    thread: JoinHandle<Result<ExportSummary>>,
}

impl ExportHandle {
    /// Ask the export to stop before its next record.
    pub fn stop(&self) {
        self.control.request_stop();
    }

    pub fn control(&self) -> &ExportControl {
        &self.control
    }

    pub fn progress(&self) -> &Receiver<ExportSummary> {
        &self.progress
    }

    /// True once the worker has returned; [`join`](Self::join) will not block.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the export to finish. A panic on the worker is resumed here.
    pub fn join(self) -> Result<ExportSummary> {
        match self.thread.join() {
            Ok(result) => result,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}

pub fn spawn_export(request: ExportRequest) -> Result<ExportHandle> {
    spawn_export_with(request, ExportControl::new())
}

/// Like [`spawn_export`], with a caller-provided stop flag.
pub fn spawn_export_with(request: ExportRequest, control: ExportControl) -> Result<ExportHandle> {
    let (tx, rx) = sync_channel::<ExportSummary>(PROGRESS_BACKLOG);
    let worker_control = control.clone();

    let thread = thread::Builder::new()
        .name("blastsieve-export".to_string())
        .spawn(move || {
            export_files(&request, &worker_control, |summary| {
                // A full buffer or a dropped receiver never holds up the export.
                let _ = tx.try_send(*summary);
            })
        })?;

    Ok(ExportHandle {
        control,
        progress: rx,
        thread,
    })
}

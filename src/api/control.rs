use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Stop flag shared between an export and whoever started it.
///
/// The exporter checks the flag before pulling each record; a record that is
/// already being written is always finished.
#[derive(Debug, Clone, Default)]
pub struct ExportControl {
    stop: Arc<AtomicBool>,
}

impl ExportControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

//! Process-wide output capture.
//!
//! While an [`OutputCapture`] is held, everything passed to [`emit`] is
//! buffered instead of being written to stdout. Only one capture can be
//! active in the process at a time. Dropping the handle releases the slot,
//! so a build that fails mid-pipeline never leaves output redirected.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

static SLOT: Mutex<Option<Vec<u8>>> = Mutex::new(None);

#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("output capture is already active")]
    AlreadyActive,
}

/// Handle to the active capture.
#[derive(Debug)]
pub struct OutputCapture {
    released: bool,
}

impl OutputCapture {
    /// Start capturing output.
    pub fn acquire() -> Result<Self, CaptureError> {
        let mut slot = SLOT.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(CaptureError::AlreadyActive);
        }
        *slot = Some(Vec::new());
        Ok(Self { released: false })
    }

    /// Stop capturing and return everything emitted since `acquire`.
    pub fn release(mut self) -> String {
        self.released = true;
        take_slot()
    }
}

impl Drop for OutputCapture {
    fn drop(&mut self) {
        if !self.released {
            take_slot();
        }
    }
}

fn take_slot() -> String {
    let bytes = SLOT
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
        .unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Write output through the capture, or straight to stdout when none is active.
pub fn emit(bytes: &[u8]) {
    let mut slot = SLOT.lock().unwrap_or_else(PoisonError::into_inner);
    match slot.as_mut() {
        Some(buffer) => buffer.extend_from_slice(bytes),
        None => {
            drop(slot);
            let _ = std::io::stdout().write_all(bytes);
        }
    }
}

/// Whether a capture is currently active.
pub fn is_active() -> bool {
    SLOT.lock().unwrap_or_else(PoisonError::into_inner).is_some()
}

/// Serializes tests that touch the process-wide slot.
#[cfg(test)]
pub(crate) fn serial() -> std::sync::MutexGuard<'static, ()> {
    static SERIAL: Mutex<()> = Mutex::new(());
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

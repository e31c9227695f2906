//! Per-kind request supersession.
//!
//! Each request kind (geocoder, place details, places) owns one slot. A slot
//! is a generation counter plus the task handle of the in-flight work.
//! Beginning a new request bumps the generation and aborts the previous
//! task; a completion may only commit state while its captured generation is
//! still current. Both halves matter: abort stops superseded work promptly,
//! the generation check guarantees a late completion can never overwrite
//! state written on behalf of a newer request.

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub(crate) struct RequestSlot {
    seq: u64,
    handle: Option<JoinHandle<()>>,
}

impl RequestSlot {
    /// Supersedes any in-flight request and returns the new generation token.
    pub fn begin(&mut self) -> u64 {
        self.seq += 1;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.seq
    }

    /// Cancels any in-flight request without starting a new one.
    pub fn cancel(&mut self) {
        let _ = self.begin();
    }

    /// Stores the task handle for the given generation. If a newer request
    /// began in the meantime the handle is aborted immediately.
    pub fn attach(&mut self, token: u64, handle: JoinHandle<()>) {
        if self.seq == token {
            self.handle = Some(handle);
        } else {
            handle.abort();
        }
    }

    /// Whether the given generation is still the latest.
    pub fn is_current(&self, token: u64) -> bool {
        self.seq == token
    }
}

//! Delivery Scheduler
//!
//! Emits a complete text as an ordered series of growing prefixes, one chunk per
//! clock tick. Each delivery runs as its own task and is controlled through a
//! [`CancelHandle`].
//!
//! Guarantees per delivery:
//! - `on_chunk` receives strictly growing prefixes of the full text with no gaps
//!   or repeats; `on_done` runs once, after the final chunk.
//! - Once [`CancelHandle::cancel`] returns, neither callback runs again. Emission
//!   and cancellation serialize on a per-delivery gate, so a tick that is already
//!   emitting finishes before `cancel` returns and a later tick sees the flag.

use parking_lot::ReentrantMutex;
use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::debug;

pub mod clock;

pub use clock::{Clock, ManualClock, TokioClock};

/// Pacing for a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliverySettings {
    /// Minimum interval between chunks.
    pub interval: Duration,
    /// Characters emitted per tick (at least one).
    pub chars_per_tick: usize,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5),
            chars_per_tick: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Active,
    Cancelled,
    Finished,
}

// Reentrant so a callback may cancel its own delivery without deadlocking.
struct DeliveryGate {
    state: ReentrantMutex<Cell<GateState>>,
}

impl DeliveryGate {
    fn new() -> Self {
        Self {
            state: ReentrantMutex::new(Cell::new(GateState::Active)),
        }
    }

    /// Run `emit` if the delivery is still active. Returns whether delivery
    /// should continue.
    fn emit(&self, emit: impl FnOnce()) -> bool {
        let state = self.state.lock();
        if state.get() != GateState::Active {
            return false;
        }
        emit();
        state.get() == GateState::Active
    }

    fn finish(&self, on_done: impl FnOnce()) {
        let state = self.state.lock();
        if state.get() == GateState::Active {
            state.set(GateState::Finished);
            on_done();
        }
    }

    fn cancel(&self) -> bool {
        let state = self.state.lock();
        if state.get() == GateState::Active {
            state.set(GateState::Cancelled);
            true
        } else {
            false
        }
    }

    fn get(&self) -> GateState {
        self.state.lock().get()
    }
}

/// Handle to one running delivery.
#[derive(Clone)]
pub struct CancelHandle {
    gate: Arc<DeliveryGate>,
    abort: AbortHandle,
}

impl CancelHandle {
    /// Stop the delivery. No callback runs after this returns.
    ///
    /// Returns `false` if the delivery had already finished or been cancelled.
    pub fn cancel(&self) -> bool {
        let cancelled = self.gate.cancel();
        self.abort.abort();
        cancelled
    }

    pub fn is_cancelled(&self) -> bool {
        self.gate.get() == GateState::Cancelled
    }

    pub fn is_finished(&self) -> bool {
        self.gate.get() == GateState::Finished
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle")
            .field("state", &self.gate.get())
            .finish()
    }
}

/// Spawns paced deliveries on the current tokio runtime.
#[derive(Clone)]
pub struct DeliveryScheduler {
    clock: Arc<dyn Clock>,
    settings: DeliverySettings,
}

impl DeliveryScheduler {
    pub fn new(clock: Arc<dyn Clock>, settings: DeliverySettings) -> Self {
        Self { clock, settings }
    }

    /// Scheduler on the tokio timer.
    pub fn with_tokio_clock(settings: DeliverySettings) -> Self {
        Self::new(Arc::new(TokioClock), settings)
    }

    pub fn settings(&self) -> DeliverySettings {
        self.settings
    }

    /// Start delivering `full_text`.
    ///
    /// `on_chunk` is called with the prefix delivered so far after every tick;
    /// `on_done` after the last chunk. An empty text completes without ticking.
    /// Must be called from within a tokio runtime.
    pub fn start_delivery<C, D>(&self, full_text: Arc<str>, mut on_chunk: C, on_done: D) -> CancelHandle
    where
        C: FnMut(&str) + Send + 'static,
        D: FnOnce() + Send + 'static,
    {
        let gate = Arc::new(DeliveryGate::new());
        let task_gate = Arc::clone(&gate);
        let clock = Arc::clone(&self.clock);
        let settings = self.settings;

        let task = tokio::spawn(async move {
            let total = full_text.len();
            debug!(total_bytes = total, "Delivery started");
            for end in chunk_boundaries(&full_text, settings.chars_per_tick) {
                clock.tick(settings.interval).await;
                if !task_gate.emit(|| on_chunk(&full_text[..end])) {
                    debug!(delivered_bytes = end, total_bytes = total, "Delivery stopped");
                    return;
                }
            }
            task_gate.finish(on_done);
            debug!(total_bytes = total, "Delivery finished");
        });

        CancelHandle {
            gate,
            abort: task.abort_handle(),
        }
    }
}

/// Byte offsets at which successive chunks end.
///
/// Every offset falls on a char boundary; the last equals `text.len()`.
pub fn chunk_boundaries(text: &str, chars_per_tick: usize) -> impl Iterator<Item = usize> + '_ {
    let step = chars_per_tick.max(1);
    text.char_indices()
        .map(|(offset, ch)| offset + ch.len_utf8())
        .enumerate()
        .filter(move |(count, end)| (count + 1) % step == 0 || *end == text.len())
        .map(|(_, end)| end)
}

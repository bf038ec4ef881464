use crate::layers::events::{EventDispatcher, LayerEvent};
use crate::timing::clock::Clock;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug)]
struct SchedulerState {
    /// Clock reading at which the pending change fires
    deadline: Option<Duration>,
    window: Duration,
    fired: u64,
}

/// Coalesces bursts of redraw requests into a single `Change` event.
///
/// Every [`request`](RedrawScheduler::request) pushes the deadline out to one
/// quiet window past the current time. Nothing fires on its own: the owner
/// calls [`fire_due`](RedrawScheduler::fire_due) from its tick. Clones share
/// state, which is how the imagery service's listener reaches the scheduler.
#[derive(Clone)]
pub struct RedrawScheduler {
    state: Arc<Mutex<SchedulerState>>,
    clock: Arc<dyn Clock>,
    dispatcher: EventDispatcher,
}

impl RedrawScheduler {
    pub fn new(clock: Arc<dyn Clock>, window: Duration, dispatcher: EventDispatcher) -> Self {
        Self {
            state: Arc::new(Mutex::new(SchedulerState {
                deadline: None,
                window,
                fired: 0,
            })),
            clock,
            dispatcher,
        }
    }

    fn state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn request(&self) {
        let now = self.clock.now();
        let mut state = self.state();
        state.deadline = Some(now + state.window);
    }

    /// Drops a pending firing; a no-op when nothing is pending
    pub fn cancel(&self) {
        if self.state().deadline.take().is_some() {
            log::debug!("pending redraw cancelled");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state().deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.state().deadline
    }

    /// Emits the pending change if its quiet window has elapsed
    pub fn fire_due(&self) -> bool {
        let now = self.clock.now();
        {
            let mut state = self.state();
            match state.deadline {
                Some(deadline) if deadline <= now => {
                    state.deadline = None;
                    state.fired += 1;
                }
                _ => return false,
            }
        }

        log::debug!("debounced redraw fired");
        self.dispatcher.emit(LayerEvent::Change);
        true
    }

    /// How many times a debounced change has been emitted
    pub fn fired_count(&self) -> u64 {
        self.state().fired
    }

    pub fn window(&self) -> Duration {
        self.state().window
    }

    /// Changes the quiet window for future requests; a pending deadline is kept
    pub fn set_window(&self, window: Duration) {
        self.state().window = window;
    }
}

impl fmt::Debug for RedrawScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("RedrawScheduler")
            .field("window", &state.window)
            .field("deadline", &state.deadline)
            .field("fired", &state.fired)
            .finish()
    }
}

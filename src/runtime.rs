//! Tokio integration: drives a layer's fades and debounced redraws from a
//! background task instead of the host's own event loop.

use crate::layers::viewfield::ViewfieldLayer;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running frame driver. The task stops when the handle is
/// cancelled or dropped.
#[derive(Debug)]
pub struct FrameDriver {
    handle: JoinHandle<()>,
}

impl FrameDriver {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for FrameDriver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Ticks `layer` every `period` on the current tokio runtime.
///
/// Must be called from within a runtime. The driver gives up if the layer's
/// lock is poisoned.
pub fn spawn_frame_driver(layer: Arc<Mutex<ViewfieldLayer>>, period: Duration) -> FrameDriver {
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            let fired = match layer.lock() {
                Ok(mut guard) => guard.tick(),
                Err(_) => {
                    log::warn!("viewfield layer lock poisoned, stopping frame driver");
                    break;
                }
            };
            if fired {
                log::trace!("frame driver tick fired");
            }
        }
    });

    FrameDriver { handle }
}

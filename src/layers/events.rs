//! Notifications the layer emits to its host application.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Events emitted to the host. The host reacts to `Change` by scheduling a
/// redraw of the map, which in turn calls the layer's `draw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerEvent {
    Change,
}

type EventListener = Box<dyn Fn(&LayerEvent) + Send + Sync>;

/// Fans layer events out to a channel and to registered callbacks.
///
/// The channel holds at most one event: `Change` carries no payload, so a
/// change already waiting stands in for any emitted after it. Clones share the same channel and listener list. Listeners run on the
/// emitting thread and must not emit from inside the callback.
#[derive(Clone)]
pub struct EventDispatcher {
    sender: Sender<LayerEvent>,
    receiver: Receiver<LayerEvent>,
    listeners: Arc<Mutex<Vec<EventListener>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(1);
        Self {
            sender,
            receiver,
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn emit(&self, event: LayerEvent) {
        // Full means an undrained change is already queued
        let _ = self.sender.try_send(event);

        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for listener in listeners.iter() {
            listener(&event);
        }
    }

    /// The layer's event queue. Receivers are clones of one queue, so each
    /// event is delivered to only one of them.
    pub fn receiver(&self) -> Receiver<LayerEvent> {
        self.receiver.clone()
    }

    pub fn on_event<F>(&self, listener: F)
    where
        F: Fn(&LayerEvent) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Box::new(listener));
    }

    /// Number of events waiting in the queue
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("pending", &self.receiver.len())
            .finish_non_exhaustive()
    }
}

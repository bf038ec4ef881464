//! Binding to the external street-level imagery provider.
//!
//! The provider is looked up through an injected [`ServiceRegistry`] rather
//! than global state. [`ServiceBinding`] tracks whether it is currently
//! available and keeps exactly one "images loaded" subscription on it,
//! wired to the layer's debounced redraw.

use crate::core::geo::Point;
use crate::layers::viewfield::marker::ImageMarker;
use crate::timing::debounce::RedrawScheduler;
use crate::traits::{HostMap, Projection};
use std::fmt;
use std::sync::Arc;

/// Notifications an imagery service publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceEvent {
    /// A batch of image metadata finished loading
    ImagesLoaded,
}

/// Handle returned by [`ImageryService::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

pub type ServiceListener = Box<dyn Fn() + Send + Sync>;

/// The street-level imagery provider, as consumed by the layer.
///
/// Fetching, caching and the full-screen viewer all live behind this trait.
/// Calls are fire-and-forget from the layer's perspective.
pub trait ImageryService: Send + Sync {
    /// Markers for the images currently known inside the projected viewport
    fn images(&self, projection: &dyn Projection, dimensions: Point) -> Vec<ImageMarker>;

    /// Key of the highlighted image, if any
    fn selected_image(&self) -> Option<String>;

    fn select_image(&self, key: Option<&str>);

    /// Requests image metadata for the viewport; completion is announced
    /// through [`ServiceEvent::ImagesLoaded`]
    fn load_images(&self, projection: &dyn Projection, dimensions: Point);

    fn load_viewer(&self, host: &dyn HostMap);

    fn hide_viewer(&self);

    fn update_viewer(&self, key: &str, host: &dyn HostMap);

    fn show_viewer(&self);

    fn subscribe(&self, event: ServiceEvent, listener: ServiceListener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Looks up the imagery provider. Returns `None` while it is unavailable.
pub trait ServiceRegistry: Send + Sync {
    fn imagery(&self) -> Option<Arc<dyn ImageryService>>;
}

impl<F> ServiceRegistry for F
where
    F: Fn() -> Option<Arc<dyn ImageryService>> + Send + Sync,
{
    fn imagery(&self) -> Option<Arc<dyn ImageryService>> {
        self()
    }
}

/// Lazily (re)binds the imagery provider as its availability changes
pub struct ServiceBinding {
    registry: Arc<dyn ServiceRegistry>,
    handle: Option<Arc<dyn ImageryService>>,
    subscription: Option<SubscriptionId>,
    scheduler: RedrawScheduler,
}

impl ServiceBinding {
    pub fn new(registry: Arc<dyn ServiceRegistry>, scheduler: RedrawScheduler) -> Self {
        Self {
            registry,
            handle: None,
            subscription: None,
            scheduler,
        }
    }

    /// Returns the bound provider, binding or releasing it first if its
    /// availability changed since the last call
    pub fn acquire(&mut self) -> Option<Arc<dyn ImageryService>> {
        match (self.registry.imagery(), self.handle.as_ref()) {
            (Some(available), Some(bound)) if Arc::ptr_eq(&available, bound) => {}
            (Some(available), _) => {
                // A different provider instance replaces the bound one
                self.release();
                self.bind(available);
            }
            (None, Some(_)) => self.release(),
            (None, None) => {}
        }
        self.handle.clone()
    }

    fn bind(&mut self, service: Arc<dyn ImageryService>) {
        let scheduler = self.scheduler.clone();
        let id = service.subscribe(
            ServiceEvent::ImagesLoaded,
            Box::new(move || scheduler.request()),
        );
        log::info!("imagery service bound (subscription {})", id.0);

        self.subscription = Some(id);
        self.handle = Some(service);
    }

    /// Unsubscribes from and drops the bound provider, if any
    pub fn release(&mut self) {
        let Some(service) = self.handle.take() else {
            return;
        };
        if let Some(id) = self.subscription.take() {
            service.unsubscribe(id);
        }
        log::info!("imagery service released");
    }

    /// The provider bound by the last [`acquire`](Self::acquire), without re-checking
    pub fn handle(&self) -> Option<&Arc<dyn ImageryService>> {
        self.handle.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.handle.is_some()
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }
}

impl Drop for ServiceBinding {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ServiceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceBinding")
            .field("bound", &self.handle.is_some())
            .field("subscription", &self.subscription)
            .finish()
    }
}

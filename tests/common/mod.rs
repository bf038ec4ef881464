//! Shared fakes for the integration tests: an in-memory imagery service, a
//! registry that can drop it, and a host map that records re-centering.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use viewfield::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Images { zoom: f64, dimensions: Point },
    LoadImages,
    LoadViewer,
    HideViewer,
    UpdateViewer(String),
    ShowViewer,
    Select(Option<String>),
}

/// Imagery service backed by a fixed marker list
#[derive(Default)]
pub struct MockService {
    markers: Mutex<Vec<ImageMarker>>,
    selected: Mutex<Option<String>>,
    calls: Mutex<Vec<Call>>,
    listeners: Mutex<Vec<(SubscriptionId, ServiceListener)>>,
    next_subscription: AtomicU64,
}

impl MockService {
    pub fn with_markers(markers: Vec<ImageMarker>) -> Arc<Self> {
        let service = Self::default();
        *service.markers.lock().unwrap() = markers;
        Arc::new(service)
    }

    pub fn set_markers(&self, markers: Vec<ImageMarker>) {
        *self.markers.lock().unwrap() = markers;
    }

    /// Simulates a finished metadata batch
    pub fn announce_loaded(&self) {
        for (_, listener) in self.listeners.lock().unwrap().iter() {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ImageryService for MockService {
    fn images(&self, projection: &dyn Projection, dimensions: Point) -> Vec<ImageMarker> {
        self.record(Call::Images {
            zoom: projection.zoom(),
            dimensions,
        });
        self.markers.lock().unwrap().clone()
    }

    fn selected_image(&self) -> Option<String> {
        self.selected.lock().unwrap().clone()
    }

    fn select_image(&self, key: Option<&str>) {
        self.record(Call::Select(key.map(str::to_string)));
        *self.selected.lock().unwrap() = key.map(str::to_string);
    }

    fn load_images(&self, _projection: &dyn Projection, _dimensions: Point) {
        self.record(Call::LoadImages);
    }

    fn load_viewer(&self, _host: &dyn HostMap) {
        self.record(Call::LoadViewer);
    }

    fn hide_viewer(&self) {
        self.record(Call::HideViewer);
    }

    fn update_viewer(&self, key: &str, _host: &dyn HostMap) {
        self.record(Call::UpdateViewer(key.to_string()));
    }

    fn show_viewer(&self) {
        self.record(Call::ShowViewer);
    }

    fn subscribe(&self, _event: ServiceEvent, listener: ServiceListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        self.listeners.lock().unwrap().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.lock().unwrap().retain(|(sub, _)| *sub != id);
    }
}

/// Registry whose service can be swapped out or removed mid-test
#[derive(Default)]
pub struct MockRegistry {
    service: Mutex<Option<Arc<MockService>>>,
}

impl MockRegistry {
    pub fn providing(service: &Arc<MockService>) -> Arc<Self> {
        Arc::new(Self {
            service: Mutex::new(Some(service.clone())),
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, service: Option<&Arc<MockService>>) {
        *self.service.lock().unwrap() = service.cloned();
    }
}

impl ServiceRegistry for MockRegistry {
    fn imagery(&self) -> Option<Arc<dyn ImageryService>> {
        self.service
            .lock()
            .unwrap()
            .clone()
            .map(|service| service as Arc<dyn ImageryService>)
    }
}

/// Host map that remembers every re-center request
#[derive(Default)]
pub struct MockHost {
    pub eased: Mutex<Vec<(LatLng, Duration)>>,
}

impl HostMap for MockHost {
    fn center_ease(&self, location: LatLng, duration: Duration) {
        self.eased.lock().unwrap().push((location, duration));
    }
}

/// A layer wired to the fakes on a manual clock
pub struct Harness {
    pub layer: ViewfieldLayer,
    pub clock: ManualClock,
    pub service: Arc<MockService>,
    pub registry: Arc<MockRegistry>,
    pub host: Arc<MockHost>,
    pub viewport: Viewport,
    pub target: RenderContext,
}

pub const CENTER: LatLng = LatLng {
    lat: 47.6062,
    lng: -122.3321,
};

impl Harness {
    pub fn new(markers: Vec<ImageMarker>) -> Self {
        let service = MockService::with_markers(markers);
        let registry = MockRegistry::providing(&service);
        Self::with_registry(service, registry)
    }

    pub fn with_registry(service: Arc<MockService>, registry: Arc<MockRegistry>) -> Self {
        let clock = ManualClock::new();
        let host = Arc::new(MockHost::default());
        let layer = ViewfieldLayer::builder(registry.clone(), host.clone())
            .with_clock(Arc::new(clock.clone()))
            .build()
            .unwrap();

        Self {
            layer,
            clock,
            service,
            registry,
            host,
            viewport: Viewport::new(CENTER, 16.0, Point::new(800.0, 600.0)),
            target: RenderContext::new(800, 600),
        }
    }

    /// One host frame
    pub fn draw(&mut self) -> RenderOutcome {
        self.target.begin_frame();
        self.layer.draw(&mut self.target, &self.viewport)
    }

    pub fn advance(&mut self, ms: u64) -> bool {
        self.clock.advance(Duration::from_millis(ms));
        self.layer.tick()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.layer.markers().map(|m| m.key.clone()).collect();
        keys.sort();
        keys
    }
}

/// Images spread a little east of [`CENTER`]
pub fn sample_markers(keys: &[&str]) -> Vec<ImageMarker> {
    keys.iter()
        .enumerate()
        .map(|(i, key)| {
            ImageMarker::new(
                *key,
                LatLng::new(CENTER.lat, CENTER.lng + 0.001 * (i as f64 + 1.0)),
            )
            .with_camera_angle(90.0 * i as f64)
        })
        .collect()
}

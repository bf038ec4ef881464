use fxhash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use viewfield::prelude::*;

/// Imagery service that "downloads" a new ring of images every time the
/// layer asks for more, and announces each batch to its listeners.
#[derive(Default)]
struct InMemoryImagery {
    images: Mutex<FxHashMap<String, ImageMarker>>,
    selected: Mutex<Option<String>>,
    listeners: Mutex<Vec<(SubscriptionId, ServiceListener)>>,
    next_subscription: AtomicU64,
    batches: AtomicU64,
}

impl InMemoryImagery {
    fn load_ring(&self, center: LatLng) {
        let batch = self.batches.fetch_add(1, Ordering::SeqCst);
        if batch >= 4 {
            return;
        }

        let radius = 0.0005 * (batch + 1) as f64;
        let mut images = self.images.lock().unwrap_or_else(|e| e.into_inner());
        for step in 0..8 {
            let heading = step as f64 * 45.0;
            let location = LatLng::new(
                center.lat + radius * heading.to_radians().cos(),
                center.lng + radius * heading.to_radians().sin(),
            );
            let key = format!("img-{batch}-{step}");
            images.insert(
                key.clone(),
                ImageMarker::new(key, location).with_camera_angle(heading + 12.5),
            );
        }
        drop(images);

        for (_, listener) in self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
        {
            listener();
        }
    }
}

impl ImageryService for InMemoryImagery {
    fn images(&self, projection: &dyn Projection, dimensions: Point) -> Vec<ImageMarker> {
        let images = self.images.lock().unwrap_or_else(|e| e.into_inner());
        let mut visible: Vec<ImageMarker> = images
            .values()
            .filter(|image| {
                let p = projection.project(&image.location);
                p.x >= 0.0 && p.y >= 0.0 && p.x <= dimensions.x && p.y <= dimensions.y
            })
            .cloned()
            .collect();
        visible.sort_by(|a, b| a.key.cmp(&b.key));
        visible
    }

    fn selected_image(&self) -> Option<String> {
        self.selected.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn select_image(&self, key: Option<&str>) {
        *self.selected.lock().unwrap_or_else(|e| e.into_inner()) = key.map(str::to_string);
    }

    fn load_images(&self, projection: &dyn Projection, dimensions: Point) {
        let center = projection.unproject(&dimensions.multiply(0.5));
        self.load_ring(center);
    }

    fn load_viewer(&self, _host: &dyn HostMap) {
        log::info!("viewer loaded");
    }

    fn hide_viewer(&self) {
        log::info!("viewer hidden");
    }

    fn update_viewer(&self, key: &str, _host: &dyn HostMap) {
        log::info!("viewer now showing {key}");
    }

    fn show_viewer(&self) {
        log::info!("viewer shown");
    }

    fn subscribe(&self, _event: ServiceEvent, listener: ServiceListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(sub, _)| *sub != id);
    }
}

struct ConsoleHost;

impl HostMap for ConsoleHost {
    fn center_ease(&self, location: LatLng, duration: Duration) {
        log::info!(
            "easing map to ({:.5}, {:.5}) over {:?}",
            location.lat,
            location.lng,
            duration
        );
    }
}

fn frame(layer: &Arc<Mutex<ViewfieldLayer>>, target: &mut RenderContext, viewport: &Viewport) {
    target.begin_frame();
    let outcome = layer
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .draw(target, viewport);
    log::debug!(
        "frame: {outcome:?}, {} glyphs queued",
        target.drawing_queue.len()
    );
}

async fn run_frames(
    layer: &Arc<Mutex<ViewfieldLayer>>,
    target: &mut RenderContext,
    viewport: &Viewport,
    total: Duration,
) {
    let step = Duration::from_millis(50);
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
        frame(layer, target, viewport);
        tokio::time::sleep(step).await;
        elapsed += step;
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let service: Arc<InMemoryImagery> = Arc::new(InMemoryImagery::default());
    let provider = service.clone();
    let registry: Arc<dyn ServiceRegistry> =
        Arc::new(move || Some(provider.clone() as Arc<dyn ImageryService>));

    let layer = ViewfieldLayer::builder(registry, Arc::new(ConsoleHost))
        .with_id("street-imagery")
        .build()?;
    let layer = Arc::new(Mutex::new(layer));
    let _driver = spawn_frame_driver(layer.clone(), Duration::from_millis(16));

    let mut viewport = Viewport::try_new(
        LatLng::new(47.6062, -122.3321),
        16.0,
        Point::new(1200.0, 800.0),
    )?;
    let mut target = RenderContext::new(1200, 800);

    layer
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .set_enabled(true);
    run_frames(&layer, &mut target, &viewport, Duration::from_millis(3_000)).await;
    log::info!(
        "after loading: {} markers",
        layer.lock().unwrap_or_else(|e| e.into_inner()).marker_count()
    );

    let clicked = layer
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .click_at(viewport.size.multiply(0.5));
    log::info!("click at center hit {clicked:?}");

    viewport.set_zoom(11.5);
    frame(&layer, &mut target, &viewport);
    log::info!(
        "zoomed out to {}: {} markers",
        viewport.zoom,
        layer.lock().unwrap_or_else(|e| e.into_inner()).marker_count()
    );

    viewport.set_zoom(16.0);
    layer
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .set_enabled(false);
    run_frames(&layer, &mut target, &viewport, Duration::from_millis(800)).await;

    let layer = layer.lock().unwrap_or_else(|e| e.into_inner());
    log::info!(
        "disabled: state {:?}, {} markers, displayed {}",
        layer.visibility_state(),
        layer.marker_count(),
        layer.is_displayed()
    );

    Ok(())
}

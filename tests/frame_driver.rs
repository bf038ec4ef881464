#![cfg(feature = "tokio-runtime")]

mod common;

use common::{sample_markers, MockHost, MockRegistry, MockService};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use viewfield::prelude::*;

fn instant_layer(service: &Arc<MockService>) -> ViewfieldLayer {
    ViewfieldLayer::builder(
        MockRegistry::providing(service),
        Arc::new(MockHost::default()),
    )
    .with_profile(ViewfieldProfile::Instant)
    .build()
    .unwrap()
}

#[cfg(test)]
mod frame_driver_tests {
    use super::*;

    #[tokio::test]
    async fn test_driver_completes_fade_and_redraw() {
        let service = MockService::with_markers(sample_markers(&["a", "b"]));
        let layer = Arc::new(Mutex::new(instant_layer(&service)));
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = changes.clone();
        layer.lock().unwrap().on_change(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let driver = spawn_frame_driver(layer.clone(), Duration::from_millis(5));
        {
            let mut guard = layer.lock().unwrap();
            guard.set_enabled(true);
            let mut target = RenderContext::new(800, 600);
            let viewport = Viewport::new(common::CENTER, 16.0, Point::new(800.0, 600.0));
            guard.draw(&mut target, &viewport);
        }

        tokio::time::sleep(Duration::from_millis(150)).await;

        {
            let guard = layer.lock().unwrap();
            assert_eq!(guard.visibility_state(), VisibilityState::Shown);
            assert!(!guard.redraw_pending());
            assert_eq!(guard.marker_count(), 2);
        }
        // The toggle itself, then the debounced redraw after the fade
        assert!(changes.load(Ordering::SeqCst) >= 2);

        driver.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(driver.is_finished());
    }

    #[tokio::test]
    async fn test_dropping_driver_stops_ticking() {
        let service = MockService::with_markers(vec![]);
        let layer = Arc::new(Mutex::new(instant_layer(&service)));

        let driver = spawn_frame_driver(layer.clone(), Duration::from_millis(5));
        drop(driver);

        layer.lock().unwrap().set_enabled(true);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(
            layer.lock().unwrap().visibility_state(),
            VisibilityState::Showing
        );
    }
}

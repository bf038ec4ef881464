mod common;

use common::{sample_markers, Call, Harness, CENTER};
use std::collections::HashMap;
use viewfield::constants::{CENTER_EASE_DURATION, CONTAINER_CLASS};
use viewfield::layers::viewfield::EntityId;
use viewfield::prelude::*;

fn enabled(markers: Vec<ImageMarker>) -> Harness {
    let mut h = Harness::new(markers);
    h.layer.set_enabled(true);
    h
}

fn entity_ids(h: &Harness) -> HashMap<String, EntityId> {
    h.layer.markers().map(|m| (m.key.clone(), m.id)).collect()
}

#[cfg(test)]
mod zoom_gate_tests {
    use super::*;

    #[test]
    fn test_zooming_below_threshold_clears_markers() {
        let mut h = enabled(sample_markers(&["a", "b", "c"]));
        h.viewport.set_zoom(12.0);
        assert!(matches!(
            h.draw(),
            RenderOutcome::Rendered { entered: 3, .. }
        ));

        let queries = h.service.count(|c| matches!(c, Call::Images { .. }));
        h.viewport.set_zoom(11.9);
        assert_eq!(h.draw(), RenderOutcome::BelowMinZoom { removed: 3 });
        assert_eq!(h.layer.marker_count(), 0);
        assert_eq!(h.target.commands_in(CONTAINER_CLASS).count(), 0);
        assert_eq!(
            h.service.count(|c| matches!(c, Call::Images { .. })),
            queries
        );

        // Still mounted, but hidden until the gate passes again
        assert!(h.layer.has_container());
        assert!(!h.layer.is_displayed());

        h.viewport.set_zoom(12.0);
        assert!(matches!(
            h.draw(),
            RenderOutcome::Rendered { entered: 3, .. }
        ));
        assert!(h.layer.is_displayed());
    }

    #[test]
    fn test_custom_min_zoom_from_options() {
        let mut h = enabled(sample_markers(&["a"]));
        let mut options = h.layer.options();
        options["min_zoom"] = serde_json::json!(17.0);
        h.layer.set_options(options).unwrap();

        h.viewport.set_zoom(16.5);
        assert_eq!(h.draw(), RenderOutcome::BelowMinZoom { removed: 0 });
        h.viewport.set_zoom(17.0);
        assert!(matches!(h.draw(), RenderOutcome::Rendered { .. }));
    }
}

#[cfg(test)]
mod diff_tests {
    use super::*;

    #[test]
    fn test_unchanged_data_keeps_entities() {
        let mut h = enabled(sample_markers(&["a", "b", "c"]));
        h.draw();
        let before = entity_ids(&h);

        assert_eq!(
            h.draw(),
            RenderOutcome::Rendered {
                entered: 0,
                updated: 3,
                exited: 0
            }
        );
        assert_eq!(entity_ids(&h), before);
    }

    #[test]
    fn test_changed_data_splits_enter_update_exit() {
        let mut h = enabled(sample_markers(&["a", "b", "c"]));
        h.draw();
        let before = entity_ids(&h);

        h.service.set_markers(sample_markers(&["b", "c", "d"]));
        assert_eq!(
            h.draw(),
            RenderOutcome::Rendered {
                entered: 1,
                updated: 2,
                exited: 1
            }
        );

        let after = entity_ids(&h);
        assert_eq!(after["b"], before["b"]);
        assert_eq!(after["c"], before["c"]);
        assert!(!after.contains_key("a"));
        assert!(!before.values().any(|id| *id == after["d"]));
    }

    #[test]
    fn test_panning_moves_updated_markers() {
        let mut h = enabled(vec![ImageMarker::new("a", CENTER)]);
        h.draw();
        let before = h.layer.markers().next().unwrap().transform.translate;

        h.viewport
            .set_center(LatLng::new(CENTER.lat, CENTER.lng - 0.001));
        h.draw();
        let after = h.layer.markers().next().unwrap().transform.translate;
        assert!(after.x > before.x);
        assert!((after.y - before.y).abs() < 1e-6);
    }
}

#[cfg(test)]
mod glyph_tests {
    use super::*;

    #[test]
    fn test_heading_is_floored_into_rotation() {
        let mut h = enabled(vec![ImageMarker::new("a", CENTER).with_camera_angle(47.8)]);
        h.draw();

        let DrawCommand::Viewfield { transform, .. } =
            h.target.commands_in(CONTAINER_CLASS).next().unwrap();
        assert_eq!(transform.rotation, Some(47));
        assert!((transform.translate.x - 400.0).abs() < 1e-6);
        assert!((transform.translate.y - 300.0).abs() < 1e-6);
        assert!(transform.to_string().ends_with(" rotate(47,0,0)"));
    }

    #[test]
    fn test_marker_without_heading_is_translated_only() {
        let mut h = enabled(vec![ImageMarker::new("a", CENTER)]);
        h.draw();

        let marker = h.layer.markers().next().unwrap();
        assert_eq!(marker.transform.rotation, None);
        assert!(!marker.transform.to_string().contains("rotate"));
    }

    #[test]
    fn test_selected_image_is_highlighted() {
        let mut h = enabled(sample_markers(&["a", "b"]));
        h.service.select_image(Some("b"));
        h.draw();

        let selected: Vec<_> = h
            .target
            .commands_in(CONTAINER_CLASS)
            .filter_map(|command| match command {
                DrawCommand::Viewfield { key, selected, .. } => selected.then(|| key.clone()),
            })
            .collect();
        assert_eq!(selected, vec!["b".to_string()]);
    }
}

#[cfg(test)]
mod query_tests {
    use super::*;

    #[test]
    fn test_dimensions_default_to_viewport_size() {
        let mut h = enabled(sample_markers(&["a"]));
        h.draw();
        assert!(h.service.calls().contains(&Call::Images {
            zoom: 16.0,
            dimensions: Point::new(800.0, 600.0),
        }));
    }

    #[test]
    fn test_explicit_dimensions_reach_the_service() {
        let mut h = enabled(sample_markers(&["a"]));
        h.layer.set_dimensions(Point::new(320.0, 240.0)).unwrap();
        h.draw();

        assert_eq!(h.layer.dimensions(), Point::new(320.0, 240.0));
        assert!(h.service.calls().contains(&Call::Images {
            zoom: 16.0,
            dimensions: Point::new(320.0, 240.0),
        }));
    }

    #[test]
    fn test_render_requests_more_metadata_after_reading() {
        let mut h = enabled(sample_markers(&["a"]));
        h.service.clear_calls();
        h.draw();

        let calls = h.service.calls();
        let read = calls
            .iter()
            .position(|c| matches!(c, Call::Images { .. }))
            .unwrap();
        let load = calls.iter().position(|c| *c == Call::LoadImages).unwrap();
        assert!(read < load);
    }
}

#[cfg(test)]
mod click_tests {
    use super::*;

    #[test]
    fn test_click_recenters_and_opens_viewer() {
        let mut h = enabled(sample_markers(&["a", "b"]));
        h.draw();
        h.service.clear_calls();

        assert!(h.layer.click("b"));

        let eased = h.host.eased.lock().unwrap().clone();
        let b = h.layer.markers().find(|m| m.key == "b").unwrap().location;
        assert_eq!(eased, vec![(b, CENTER_EASE_DURATION)]);
        assert_eq!(
            h.service.calls(),
            vec![
                Call::Select(Some("b".to_string())),
                Call::UpdateViewer("b".to_string()),
                Call::ShowViewer,
            ]
        );
    }

    #[test]
    fn test_click_on_unknown_key_does_nothing() {
        let mut h = enabled(sample_markers(&["a"]));
        h.draw();
        h.service.clear_calls();

        assert!(!h.layer.click("zzz"));
        assert!(h.service.calls().is_empty());
        assert!(h.host.eased.lock().unwrap().is_empty());
    }

    #[test]
    fn test_click_at_hits_marker_dot() {
        let mut h = enabled(vec![ImageMarker::new("here", CENTER)]);
        h.draw();

        assert_eq!(
            h.layer.click_at(Point::new(402.0, 301.0)),
            Some("here".to_string())
        );
        assert_eq!(h.layer.click_at(Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_click_at_ignores_hidden_container() {
        let mut h = Harness::new(vec![ImageMarker::new("here", CENTER)]);
        h.draw();
        assert_eq!(h.layer.click_at(Point::new(400.0, 300.0)), None);
    }
}

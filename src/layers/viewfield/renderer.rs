//! Keyed reconciliation of the imagery service's markers against the
//! marker entities already in the layer container.

use crate::core::geo::Point;
use crate::layers::viewfield::gate::ZoomGate;
use crate::layers::viewfield::marker::{EntityId, ImageMarker, MarkerTransform, ViewfieldMarker};
use crate::layers::viewfield::service::ImageryService;
use crate::traits::Projection;
use fxhash::{FxHashMap, FxHashSet};

/// Marker entities keyed by image key, in the order of the last data pull
#[derive(Debug, Clone, Default)]
pub struct RenderedMarkerSet {
    markers: FxHashMap<String, ViewfieldMarker>,
    order: Vec<String>,
}

impl RenderedMarkerSet {
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.markers.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&ViewfieldMarker> {
        self.markers.get(key)
    }

    /// Entities in draw order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ViewfieldMarker> {
        self.order.iter().filter_map(|key| self.markers.get(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Removes every entity, returning how many there were
    pub fn clear(&mut self) -> usize {
        let removed = self.markers.len();
        self.markers.clear();
        self.order.clear();
        removed
    }
}

/// Create/update/remove lists produced by [`reconcile`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerDiff {
    /// New keys, to be created
    pub enter: Vec<ImageMarker>,
    /// Keys already rendered, to be refreshed in place
    pub update: Vec<ImageMarker>,
    /// Rendered keys missing from the new data, to be removed
    pub exit: Vec<String>,
}

impl MarkerDiff {
    pub fn is_empty(&self) -> bool {
        self.enter.is_empty() && self.update.is_empty() && self.exit.is_empty()
    }
}

/// Diffs the rendered set against fresh data by key.
///
/// Keys must be unique within one pull; a repeated key keeps its first
/// occurrence and the rest are dropped.
pub fn reconcile(previous: &RenderedMarkerSet, next: Vec<ImageMarker>) -> MarkerDiff {
    let mut diff = MarkerDiff::default();
    let mut seen = FxHashSet::default();

    for marker in next {
        if !seen.insert(marker.key.clone()) {
            log::warn!("duplicate image key {} in one pull, ignoring", marker.key);
            continue;
        }
        if previous.contains(&marker.key) {
            diff.update.push(marker);
        } else {
            diff.enter.push(marker);
        }
    }

    diff.exit = previous
        .keys()
        .filter(|key| !seen.contains(*key))
        .map(str::to_string)
        .collect();

    diff
}

/// The layer's group in the host scene, plus the marker entities inside it
#[derive(Debug, Clone)]
pub struct LayerContainer {
    pub class: String,
    /// Display flag; a hidden container keeps its entities but draws nothing
    pub display: bool,
    pub markers: RenderedMarkerSet,
}

impl LayerContainer {
    pub fn new(class: impl Into<String>, display: bool) -> Self {
        Self {
            class: class.into(),
            display,
            markers: RenderedMarkerSet::default(),
        }
    }

    pub fn edit_on(&mut self) {
        self.display = true;
    }

    /// Removes every marker entity and hides the container
    pub fn edit_off(&mut self) -> usize {
        self.display = false;
        self.markers.clear()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The layer is disabled; nothing was touched
    Disabled,
    /// No imagery service is available; the container is gone
    NoProvider,
    /// Zoomed out past the gate; all markers were cleared
    BelowMinZoom { removed: usize },
    Rendered {
        entered: usize,
        updated: usize,
        exited: usize,
    },
}

#[derive(Debug, Clone)]
pub struct MarkerRenderer {
    gate: ZoomGate,
    next_entity: u64,
}

impl MarkerRenderer {
    pub fn new(gate: ZoomGate) -> Self {
        Self {
            gate,
            next_entity: 0,
        }
    }

    pub fn gate(&self) -> &ZoomGate {
        &self.gate
    }

    pub fn set_gate(&mut self, gate: ZoomGate) {
        self.gate = gate;
    }

    /// One render pass over an enabled layer with a bound service
    pub fn render(
        &mut self,
        container: &mut LayerContainer,
        service: &dyn ImageryService,
        projection: &dyn Projection,
        dimensions: Point,
    ) -> RenderOutcome {
        if !self.gate.passes(projection.zoom()) {
            let removed = container.edit_off();
            if removed > 0 {
                log::debug!(
                    "zoom {:.2} below {}, cleared {} markers",
                    projection.zoom(),
                    self.gate.min_zoom(),
                    removed
                );
            }
            return RenderOutcome::BelowMinZoom { removed };
        }

        container.edit_on();

        let data = service.images(projection, dimensions);
        let selected = service.selected_image();
        let diff = reconcile(&container.markers, data);
        let outcome = RenderOutcome::Rendered {
            entered: diff.enter.len(),
            updated: diff.update.len(),
            exited: diff.exit.len(),
        };
        self.apply(&mut container.markers, diff, selected.as_deref(), projection);

        service.load_images(projection, dimensions);

        log::debug!("viewfield render: {outcome:?}");
        outcome
    }

    fn apply(
        &mut self,
        set: &mut RenderedMarkerSet,
        diff: MarkerDiff,
        selected: Option<&str>,
        projection: &dyn Projection,
    ) {
        for key in &diff.exit {
            set.markers.remove(key);
        }

        let mut order = Vec::with_capacity(diff.enter.len() + diff.update.len());

        for marker in diff.update {
            if let Some(entity) = set.markers.get_mut(&marker.key) {
                entity.transform = MarkerTransform::for_marker(&marker, projection);
                entity.selected = selected == Some(marker.key.as_str());
                entity.location = marker.location;
                entity.camera_angle = marker.camera_angle;
            }
            order.push(marker.key);
        }

        for marker in diff.enter {
            self.next_entity += 1;
            let entity = ViewfieldMarker {
                id: EntityId(self.next_entity),
                transform: MarkerTransform::for_marker(&marker, projection),
                selected: selected == Some(marker.key.as_str()),
                key: marker.key.clone(),
                location: marker.location,
                camera_angle: marker.camera_angle,
            };
            set.markers.insert(marker.key.clone(), entity);
            order.push(marker.key);
        }

        set.order = order;
    }
}

impl Default for MarkerRenderer {
    fn default() -> Self {
        Self::new(ZoomGate::default())
    }
}

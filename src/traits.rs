//! Trait seams between the viewfield layer and the application hosting it.

use crate::{
    core::{
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    layers::base::LayerType,
    rendering::context::RenderContext,
    Result,
};
use std::time::Duration;

/// Maps geographic coordinates onto the host's container pixels.
///
/// Owned by the host map; the layer and the imagery service only read it.
pub trait Projection {
    fn project(&self, lat_lng: &LatLng) -> Point;

    fn unproject(&self, point: &Point) -> LatLng;

    /// The (fractional) zoom level this projection was computed for
    fn zoom(&self) -> f64;
}

impl Projection for Viewport {
    fn project(&self, lat_lng: &LatLng) -> Point {
        self.lat_lng_to_pixel(lat_lng)
    }

    fn unproject(&self, point: &Point) -> LatLng {
        self.pixel_to_lat_lng(point)
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }
}

/// The map-editing application the layer lives in.
///
/// Passed to the imagery service when it builds or updates its viewer, and
/// asked to re-center when a marker is clicked.
pub trait HostMap: Send + Sync {
    /// Animate the map center to `location` over `duration`
    fn center_ease(&self, location: LatLng, duration: Duration);
}

/// Operations every map layer exposes to the host's layer stack
pub trait LayerOperations {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn layer_type(&self) -> LayerType;

    fn z_index(&self) -> i32;

    fn set_z_index(&mut self, z_index: i32);

    /// Current opacity, including any running fade
    fn opacity(&self) -> f32;

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Per-frame draw into the host's render target
    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()>;

    fn options(&self) -> serde_json::Value;

    fn set_options(&mut self, options: serde_json::Value) -> Result<()>;

    fn as_any(&self) -> &dyn std::any::Any;

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

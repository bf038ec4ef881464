use crate::core::constants::MIN_MARKER_ZOOM;

/// Minimum-zoom threshold below which no markers are drawn at all.
///
/// Only the integer part of the zoom counts, so 11.99 is still zoom 11.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomGate {
    min_zoom: f64,
}

impl ZoomGate {
    pub fn new(min_zoom: f64) -> Self {
        Self { min_zoom }
    }

    pub fn passes(&self, zoom: f64) -> bool {
        zoom.is_finite() && zoom.floor() >= self.min_zoom
    }

    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }
}

impl Default for ZoomGate {
    fn default() -> Self {
        Self::new(MIN_MARKER_ZOOM)
    }
}

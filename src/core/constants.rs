//! Layer-wide constants for the viewfield imagery overlay.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

use std::time::Duration;

/// Square tile size the projection is expressed in.
pub const TILE_SIZE: u32 = 256;

/// Deepest zoom a viewport accepts.
pub const MAX_ZOOM: f64 = 24.0;

/// Markers are suppressed entirely below this (integer) zoom.
pub const MIN_MARKER_ZOOM: f64 = 12.0;

/// Quiet window a redraw request waits for before a change is emitted.
pub const REDRAW_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Duration of the fade-in/fade-out when the layer is toggled.
pub const FADE_DURATION: Duration = Duration::from_millis(500);

/// Duration of the eased re-center when a marker is clicked.
pub const CENTER_EASE_DURATION: Duration = Duration::from_millis(250);

/// Class of the container group the layer mounts into the host scene.
pub const CONTAINER_CLASS: &str = "layer-viewfield-images";

/// Class of each marker group inside the container.
pub const MARKER_CLASS: &str = "viewfield-group";

/// Wedge outline of a viewfield, pointing up before heading rotation.
pub const VIEWFIELD_PATH: &str = "M 6,9 C 8,8.4 8,8.4 10,9 L 16,-2 C 12,-5 4,-5 0,-2 z";

/// Scale applied to the wedge path.
pub const VIEWFIELD_SCALE: f64 = 1.5;

/// Offset applied to the wedge path before scaling, centering it over the point.
pub const VIEWFIELD_OFFSET: (f64, f64) = (-8.0, -13.0);

/// Extent of the raw wedge path: (min_x, min_y, max_x, max_y).
pub const VIEWFIELD_PATH_EXTENT: (f64, f64, f64, f64) = (0.0, -5.0, 16.0, 9.0);

/// Radius of the dot drawn at the capture location.
pub const VIEWFIELD_DOT_RADIUS: f64 = 6.0;

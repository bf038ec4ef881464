use crate::core::constants::{
    MARKER_CLASS, VIEWFIELD_DOT_RADIUS, VIEWFIELD_OFFSET, VIEWFIELD_PATH, VIEWFIELD_PATH_EXTENT,
    VIEWFIELD_SCALE,
};
use crate::core::geo::{LatLng, Point};
use crate::traits::Projection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One piece of street-level imagery as reported by the imagery service.
///
/// Recomputed from the service on every render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMarker {
    pub key: String,
    pub location: LatLng,
    /// Compass heading of the camera in degrees
    #[serde(default, alias = "ca")]
    pub camera_angle: Option<f64>,
}

impl ImageMarker {
    pub fn new(key: impl Into<String>, location: LatLng) -> Self {
        Self {
            key: key.into(),
            location,
            camera_angle: None,
        }
    }

    pub fn with_camera_angle(mut self, degrees: f64) -> Self {
        self.camera_angle = Some(degrees);
        self
    }
}

/// Placement of a marker glyph in container pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerTransform {
    pub translate: Point,
    /// Whole degrees, rotated about the marker's own origin
    pub rotation: Option<i64>,
}

impl MarkerTransform {
    pub fn for_marker(marker: &ImageMarker, projection: &dyn Projection) -> Self {
        Self {
            translate: projection.project(&marker.location),
            rotation: marker
                .camera_angle
                .filter(|angle| angle.is_finite())
                .map(|angle| angle.floor() as i64),
        }
    }

    /// Screen point expressed in the glyph's own (unrotated) frame
    pub fn to_local(&self, screen: &Point) -> Point {
        let local = screen.subtract(&self.translate);
        match self.rotation {
            Some(degrees) => local.rotate(-(degrees as f64)),
            None => local,
        }
    }
}

/// Renders as an SVG transform attribute
impl fmt::Display for MarkerTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "translate({},{})", self.translate.x, self.translate.y)?;
        if let Some(degrees) = self.rotation {
            write!(f, " rotate({degrees},0,0)")?;
        }
        Ok(())
    }
}

/// The fixed shape every marker is drawn with: a wedge showing the camera's
/// field of view, over a dot at the capture location.
pub struct ViewfieldGlyph;

impl ViewfieldGlyph {
    /// Class of each marker's group inside the layer container
    pub const CLASS: &'static str = MARKER_CLASS;
    pub const PATH: &'static str = VIEWFIELD_PATH;
    pub const DOT_RADIUS: f64 = VIEWFIELD_DOT_RADIUS;

    /// SVG transform placing the wedge path relative to the marker origin
    pub fn path_transform() -> String {
        format!(
            "scale({s},{s}),translate({},{})",
            VIEWFIELD_OFFSET.0,
            VIEWFIELD_OFFSET.1,
            s = VIEWFIELD_SCALE
        )
    }

    /// Wedge extent in the glyph frame: (min, max)
    pub fn wedge_bounds() -> (Point, Point) {
        let (min_x, min_y, max_x, max_y) = VIEWFIELD_PATH_EXTENT;
        let place = |x: f64, y: f64| {
            Point::new(x + VIEWFIELD_OFFSET.0, y + VIEWFIELD_OFFSET.1).multiply(VIEWFIELD_SCALE)
        };
        (place(min_x, min_y), place(max_x, max_y))
    }

    /// Hit test in the glyph frame
    pub fn contains(local: &Point) -> bool {
        if local.distance_to(&Point::default()) <= Self::DOT_RADIUS {
            return true;
        }
        let (min, max) = Self::wedge_bounds();
        local.x >= min.x && local.x <= max.x && local.y >= min.y && local.y <= max.y
    }
}

/// Stable identity of a rendered marker entity. Survives re-renders as long
/// as the marker's key stays in the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// A marker entity currently in the layer's container
#[derive(Debug, Clone, PartialEq)]
pub struct ViewfieldMarker {
    pub id: EntityId,
    pub key: String,
    pub location: LatLng,
    pub camera_angle: Option<f64>,
    pub transform: MarkerTransform,
    pub selected: bool,
}

impl ViewfieldMarker {
    pub fn hit(&self, screen: &Point) -> bool {
        ViewfieldGlyph::contains(&self.transform.to_local(screen))
    }
}

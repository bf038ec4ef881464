use crate::core::constants::{MAX_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, Point};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const EARTH_RADIUS: f64 = 6378137.0;
const MAX_LATITUDE: f64 = 85.0511287798;

/// The host map's current view: center, zoom and screen dimensions.
///
/// The layer never mutates a viewport; it only reads the projection and
/// zoom the host hands it on each draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current (fractional) zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(0.0, MAX_ZOOM),
            size,
            min_zoom: 0.0,
            max_zoom: MAX_ZOOM,
        }
    }

    /// Fallible constructor for host input that may not be trustworthy
    pub fn try_new(center: LatLng, zoom: f64, size: Point) -> Result<Self> {
        if !center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "center out of range: {}, {}",
                center.lat, center.lng
            )));
        }
        if !zoom.is_finite() {
            return Err(MapError::InvalidCoordinates(format!(
                "zoom must be finite, got {zoom}"
            )));
        }
        if !size.is_finite() || size.x < 0.0 || size.y < 0.0 {
            return Err(MapError::InvalidCoordinates(format!(
                "invalid viewport size {}x{}",
                size.x, size.y
            )));
        }
        Ok(Self::new(center, zoom, size))
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(
            center.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            center.lng.clamp(-180.0, 180.0),
        );
    }

    /// Sets the zoom level, clamping to the allowed range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Web Mercator (EPSG:3857) projection to world pixels at the given zoom
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let scale = TILE_SIZE as f64 * 2_f64.powf(zoom.unwrap_or(self.zoom));

        let x = lat_lng.lng.to_radians() * EARTH_RADIUS;
        let lat = lat_lng.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let y = (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() * EARTH_RADIUS;

        let circumference = 2.0 * PI * EARTH_RADIUS;
        Point::new(
            (x + PI * EARTH_RADIUS) / circumference * scale,
            (-y + PI * EARTH_RADIUS) / circumference * scale,
        )
    }

    /// Inverse of [`Viewport::project`]
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let scale = TILE_SIZE as f64 * 2_f64.powf(zoom.unwrap_or(self.zoom));
        let circumference = 2.0 * PI * EARTH_RADIUS;

        let x = (pixel.x / scale) * circumference - PI * EARTH_RADIUS;
        let y = PI * EARTH_RADIUS - (pixel.y / scale) * circumference;

        let lng = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();

        LatLng::new(lat, lng)
    }

    /// Geographical coordinate to container pixel coordinate
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let origin = self.project(&self.center, None);
        self.project(lat_lng, None)
            .subtract(&origin)
            .add(&self.size.multiply(0.5))
    }

    /// Container pixel coordinate back to a geographical coordinate
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let origin = self.project(&self.center, None);
        let world = pixel.subtract(&self.size.multiply(0.5)).add(&origin);
        self.unproject(&world, None)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_projects_to_middle_of_container() {
        let viewport = Viewport::new(
            LatLng::new(40.7128, -74.0060),
            16.0,
            Point::new(800.0, 600.0),
        );

        let pixel = viewport.lat_lng_to_pixel(&viewport.center);
        assert!((pixel.x - 400.0).abs() < 1e-6);
        assert!((pixel.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_pixel_round_trip() {
        let viewport = Viewport::new(LatLng::new(51.5, -0.12), 14.0, Point::new(512.0, 512.0));
        let corner = viewport.pixel_to_lat_lng(&Point::new(10.0, 20.0));
        let back = viewport.lat_lng_to_pixel(&corner);

        assert!((back.x - 10.0).abs() < 1e-6);
        assert!((back.y - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = Viewport::default();
        viewport.min_zoom = 2.0;
        viewport.max_zoom = 15.0;

        viewport.set_zoom(1.0);
        assert_eq!(viewport.zoom, 2.0);

        viewport.set_zoom(20.0);
        assert_eq!(viewport.zoom, 15.0);
    }

    #[test]
    fn test_try_new_rejects_non_finite_zoom() {
        let result = Viewport::try_new(LatLng::new(0.0, 0.0), f64::NAN, Point::new(1.0, 1.0));
        assert!(matches!(result, Err(MapError::InvalidCoordinates(_))));
    }
}

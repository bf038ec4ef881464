//! Configuration for the viewfield imagery layer
//!
//! Presets are exposed through [`ViewfieldProfile`]; anything else can be
//! expressed as a custom [`ViewfieldLayerConfig`], built in code or loaded
//! from JSON.

use crate::animation::interpolation::EasingFunction;
use crate::core::constants::{
    CENTER_EASE_DURATION, CONTAINER_CLASS, FADE_DURATION, MIN_MARKER_ZOOM, REDRAW_DEBOUNCE,
};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewfieldProfile {
    /// Timings matching an interactive editor
    #[default]
    Standard,
    /// Near-zero fades and debounce, for headless rendering and snapshots
    Instant,
    Custom(ViewfieldLayerConfig),
}

impl ViewfieldProfile {
    pub fn resolve(&self) -> ViewfieldLayerConfig {
        match self {
            Self::Standard => ViewfieldLayerConfig::default(),
            Self::Instant => ViewfieldLayerConfig {
                redraw_debounce_ms: 1,
                fade_duration_ms: 1,
                center_ease_duration_ms: 1,
                ..ViewfieldLayerConfig::default()
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewfieldLayerConfig {
    /// Markers render only when `floor(zoom) >= min_zoom`
    pub min_zoom: f64,
    pub redraw_debounce_ms: u64,
    pub fade_duration_ms: u64,
    pub fade_easing: EasingFunction,
    pub center_ease_duration_ms: u64,
    /// Class of the container mounted into the host scene
    pub container_class: String,
}

impl Default for ViewfieldLayerConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_MARKER_ZOOM,
            redraw_debounce_ms: REDRAW_DEBOUNCE.as_millis() as u64,
            fade_duration_ms: FADE_DURATION.as_millis() as u64,
            fade_easing: EasingFunction::Linear,
            center_ease_duration_ms: CENTER_EASE_DURATION.as_millis() as u64,
            container_class: CONTAINER_CLASS.to_string(),
        }
    }
}

impl ViewfieldLayerConfig {
    /// Parses and validates a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_zoom.is_finite() || self.min_zoom < 0.0 {
            return Err(MapError::Config(format!(
                "min_zoom must be a non-negative number, got {}",
                self.min_zoom
            )));
        }
        if self.redraw_debounce_ms == 0 {
            return Err(MapError::Config("redraw_debounce_ms must be > 0".into()));
        }
        if self.fade_duration_ms == 0 {
            return Err(MapError::Config("fade_duration_ms must be > 0".into()));
        }
        if self.container_class.trim().is_empty() {
            return Err(MapError::Config("container_class must not be empty".into()));
        }
        Ok(())
    }

    pub fn with_min_zoom(mut self, min_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self
    }

    pub fn with_redraw_debounce(mut self, window: Duration) -> Self {
        self.redraw_debounce_ms = window.as_millis() as u64;
        self
    }

    pub fn with_fade_duration(mut self, duration: Duration) -> Self {
        self.fade_duration_ms = duration.as_millis() as u64;
        self
    }

    pub fn with_fade_easing(mut self, easing: EasingFunction) -> Self {
        self.fade_easing = easing;
        self
    }

    pub fn with_container_class(mut self, class: impl Into<String>) -> Self {
        self.container_class = class.into();
        self
    }

    pub fn redraw_debounce(&self) -> Duration {
        Duration::from_millis(self.redraw_debounce_ms)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }

    pub fn center_ease_duration(&self) -> Duration {
        Duration::from_millis(self.center_ease_duration_ms)
    }
}

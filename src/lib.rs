//! # viewfield
//!
//! A street-level imagery overlay for 2D map canvases.
//!
//! The layer draws one directional marker per image an external imagery
//! service reports in view. It hides markers below a minimum zoom, fades in
//! and out when toggled, coalesces bursts of "images loaded" notifications
//! into a single debounced redraw, and hands marker clicks back to the
//! service's viewer.
//!
//! Hosts plug in through three traits:
//! - [`ServiceRegistry`] resolves the imagery service, which may come and go,
//! - [`HostMap`] lets the layer re-center the map,
//! - [`Clock`] supplies time, so tests can run on a [`ManualClock`].

pub mod animation;
pub mod core;
pub mod layers;
pub mod prelude;
pub mod rendering;
#[cfg(feature = "tokio-runtime")]
pub mod runtime;
pub mod timing;
pub mod traits;

pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{ViewfieldLayerConfig, ViewfieldProfile},
    geo::{LatLng, Point},
    viewport::Viewport,
};

pub use layers::{
    base::{LayerProperties, LayerTrait, LayerType},
    events::{EventDispatcher, LayerEvent},
    viewfield::{
        ImageMarker, ImageryService, LayerState, RenderOutcome, ServiceEvent, ServiceRegistry,
        SubscriptionId, ViewfieldLayer, ViewfieldLayerBuilder, VisibilityState,
    },
};

pub use rendering::{ContainerState, DrawCommand, RenderContext};

pub use timing::{Clock, ManualClock, RedrawScheduler, SystemClock};

pub use traits::{HostMap, Projection};

#[cfg(feature = "tokio-runtime")]
pub use runtime::{spawn_frame_driver, FrameDriver};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Error = MapError;

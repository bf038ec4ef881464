//! Prelude module for common viewfield types and traits
//!
//! `use viewfield::prelude::*;` brings in the layer, its host-facing traits
//! and the geometry types they take.

pub use crate::core::{
    config::{ViewfieldLayerConfig, ViewfieldProfile},
    geo::{LatLng, Point},
    viewport::Viewport,
};

pub use crate::layers::{
    base::{LayerTrait, LayerType},
    events::LayerEvent,
    viewfield::{
        ImageMarker, ImageryService, RenderOutcome, ServiceEvent, ServiceListener,
        ServiceRegistry, SubscriptionId, ViewfieldLayer, VisibilityState,
    },
};

pub use crate::animation::EasingFunction;
pub use crate::rendering::{DrawCommand, RenderContext};
pub use crate::timing::{Clock, ManualClock, SystemClock};
pub use crate::traits::{HostMap, Projection};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::{spawn_frame_driver, FrameDriver};

pub use crate::{Error as MapError, Result};

pub use std::{sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

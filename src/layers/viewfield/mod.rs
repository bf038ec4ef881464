//! Street-level imagery layer.
//!
//! Draws one directional "viewfield" marker per image the imagery service
//! knows about in the current viewport. The layer binds the service lazily,
//! suppresses markers below a minimum zoom, fades in and out when toggled,
//! and coalesces the service's load notifications into debounced redraws.
//!
//! The host drives it with three calls:
//! - [`ViewfieldLayer::draw`] on every frame,
//! - [`ViewfieldLayer::tick`] from its event loop, to run fades and the debounce,
//! - [`ViewfieldLayer::set_enabled`] when the user toggles the layer.
//!
//! It answers with [`LayerEvent::Change`] whenever the map should be redrawn.

pub mod gate;
pub mod marker;
pub mod renderer;
pub mod service;
pub mod visibility;

pub use gate::ZoomGate;
pub use marker::{EntityId, ImageMarker, MarkerTransform, ViewfieldGlyph, ViewfieldMarker};
pub use renderer::{
    reconcile, LayerContainer, MarkerDiff, MarkerRenderer, RenderOutcome, RenderedMarkerSet,
};
pub use service::{
    ImageryService, ServiceBinding, ServiceEvent, ServiceListener, ServiceRegistry,
    SubscriptionId,
};
pub use visibility::{VisibilityController, VisibilityOutcome, VisibilityState};

use crate::core::config::{ViewfieldLayerConfig, ViewfieldProfile};
use crate::core::geo::Point;
use crate::core::viewport::Viewport;
use crate::layers::base::{LayerProperties, LayerTrait, LayerType};
use crate::layers::events::{EventDispatcher, LayerEvent};
use crate::rendering::context::{ContainerState, DrawCommand, RenderContext};
use crate::timing::clock::{Clock, SystemClock};
use crate::timing::debounce::RedrawScheduler;
use crate::traits::HostMap;
use crate::{MapError, Result};
use crossbeam_channel::Receiver;
use std::sync::Arc;

/// Per-instance toggles. `initialized` flips to true once, on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerState {
    pub enabled: bool,
    pub initialized: bool,
}

pub struct ViewfieldLayer {
    properties: LayerProperties,
    config: ViewfieldLayerConfig,
    state: LayerState,
    binding: ServiceBinding,
    scheduler: RedrawScheduler,
    visibility: VisibilityController,
    renderer: MarkerRenderer,
    /// Present iff the imagery service was available at the last draw
    container: Option<LayerContainer>,
    dimensions: Option<Point>,
    host: Arc<dyn HostMap>,
    clock: Arc<dyn Clock>,
    dispatcher: EventDispatcher,
}

impl ViewfieldLayer {
    /// A layer with default settings on the wall clock
    pub fn new(registry: Arc<dyn ServiceRegistry>, host: Arc<dyn HostMap>) -> Self {
        Self::from_parts(
            LayerProperties::new(
                "viewfield-images".to_string(),
                "Street-level imagery".to_string(),
                LayerType::Viewfield,
            ),
            ViewfieldLayerConfig::default(),
            registry,
            host,
            Arc::new(SystemClock::new()),
        )
    }

    pub fn builder(
        registry: Arc<dyn ServiceRegistry>,
        host: Arc<dyn HostMap>,
    ) -> ViewfieldLayerBuilder {
        ViewfieldLayerBuilder::new(registry, host)
    }

    fn from_parts(
        properties: LayerProperties,
        config: ViewfieldLayerConfig,
        registry: Arc<dyn ServiceRegistry>,
        host: Arc<dyn HostMap>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let dispatcher = EventDispatcher::new();
        let scheduler =
            RedrawScheduler::new(clock.clone(), config.redraw_debounce(), dispatcher.clone());

        let mut layer = Self {
            properties,
            binding: ServiceBinding::new(registry, scheduler.clone()),
            scheduler,
            visibility: VisibilityController::new(config.fade_duration(), config.fade_easing),
            renderer: MarkerRenderer::new(ZoomGate::new(config.min_zoom)),
            container: None,
            dimensions: None,
            config,
            state: LayerState::default(),
            host,
            clock,
            dispatcher,
        };
        layer.initialize();
        layer
    }

    /// One-time setup; later calls leave the layer untouched
    pub fn initialize(&mut self) {
        if self.state.initialized {
            return;
        }
        self.state.enabled = false;
        self.state.initialized = true;
        log::debug!("viewfield layer {} initialized", self.properties.id);
    }

    pub fn enabled(&self) -> bool {
        self.state.enabled
    }

    /// Toggles the layer, fading it in or out, and notifies the host
    pub fn set_enabled(&mut self, enabled: bool) {
        self.state.enabled = enabled;

        let now = self.clock.now();
        let service = self.binding.acquire();
        if enabled {
            self.visibility.show(
                service.as_deref(),
                self.host.as_ref(),
                self.container.as_mut(),
                now,
            );
        } else {
            self.visibility
                .hide(service.as_deref(), &self.scheduler, now);
        }

        log::info!(
            "viewfield layer {}",
            if enabled { "enabled" } else { "disabled" }
        );
        self.dispatcher.emit(LayerEvent::Change);
    }

    /// Whether the imagery service is available right now
    pub fn supported(&mut self) -> bool {
        self.binding.acquire().is_some()
    }

    /// Viewport size used for service queries; zero until set
    pub fn dimensions(&self) -> Point {
        self.dimensions.unwrap_or_default()
    }

    pub fn set_dimensions(&mut self, dimensions: Point) -> Result<()> {
        if !dimensions.is_finite() || dimensions.x < 0.0 || dimensions.y < 0.0 {
            return Err(MapError::InvalidCoordinates(format!(
                "invalid layer dimensions {}x{}",
                dimensions.x, dimensions.y
            )));
        }
        self.dimensions = Some(dimensions);
        Ok(())
    }

    /// Per-frame entry point: mounts or removes the container to match the
    /// service's availability, renders the markers, and queues them into
    /// `target`.
    pub fn draw(&mut self, target: &mut RenderContext, viewport: &Viewport) -> RenderOutcome {
        let service = self.binding.acquire();

        match (&service, self.container.is_some()) {
            (Some(_), false) => {
                self.container = Some(LayerContainer::new(
                    self.config.container_class.clone(),
                    self.state.enabled,
                ));
                self.visibility.reset(self.state.enabled);
                log::debug!("mounted container {}", self.config.container_class);
            }
            (None, true) => {
                self.container = None;
                log::debug!("imagery service unavailable, container removed");
            }
            _ => {}
        }

        // Unset dimensions fall back to the whole viewport
        let dimensions = self.dimensions.unwrap_or(viewport.size);
        let outcome = if !self.state.enabled {
            RenderOutcome::Disabled
        } else if let (Some(service), Some(container)) =
            (service.as_deref(), self.container.as_mut())
        {
            self.renderer
                .render(container, service, viewport, dimensions)
        } else {
            RenderOutcome::NoProvider
        };

        self.queue_into(target);
        outcome
    }

    fn queue_into(&self, target: &mut RenderContext) {
        let Some(container) = &self.container else {
            target.unmount(&self.config.container_class);
            return;
        };

        let opacity = self.visibility.opacity(self.clock.now());
        target.mount(
            &container.class,
            ContainerState {
                display: container.display,
                opacity,
            },
        );
        if !container.display {
            return;
        }
        for marker in container.markers.iter() {
            target.push(DrawCommand::Viewfield {
                container: container.class.clone(),
                key: marker.key.clone(),
                transform: marker.transform,
                selected: marker.selected,
                opacity,
            });
        }
    }

    /// Runs due fade completions and the debounced redraw. Returns true if
    /// anything fired.
    pub fn tick(&mut self) -> bool {
        let mut fired = false;

        if let Some(outcome) = self.visibility.update(self.clock.now()) {
            // A completion that disagrees with the enabled flag is stale
            match outcome {
                VisibilityOutcome::Shown if self.state.enabled => self.scheduler.request(),
                VisibilityOutcome::Hidden if !self.state.enabled => {
                    if let Some(container) = self.container.as_mut() {
                        let removed = container.edit_off();
                        log::debug!("fade-out finished, removed {removed} markers");
                    }
                }
                _ => log::debug!("ignored {outcome:?} fade completion"),
            }
            fired = true;
        }

        self.scheduler.fire_due() || fired
    }

    /// Selects the image under `key`: re-centers the map on it and opens it
    /// in the service's viewer. Returns false if the service is unavailable
    /// or no such marker is rendered.
    pub fn click(&mut self, key: &str) -> bool {
        let Some(service) = self.binding.acquire() else {
            return false;
        };
        let Some(location) = self
            .container
            .as_ref()
            .and_then(|container| container.markers.get(key))
            .map(|marker| marker.location)
        else {
            return false;
        };

        self.host
            .center_ease(location, self.config.center_ease_duration());
        service.select_image(Some(key));
        service.update_viewer(key, self.host.as_ref());
        service.show_viewer();

        log::info!("selected image {key}");
        true
    }

    /// Clicks the topmost marker under a container pixel, if any
    pub fn click_at(&mut self, point: Point) -> Option<String> {
        let key = self
            .container
            .as_ref()
            .filter(|container| container.display)?
            .markers
            .iter()
            .rev()
            .find(|marker| marker.hit(&point))?
            .key
            .clone();

        self.click(&key).then_some(key)
    }

    /// The layer's `Change` queue; holds at most one undrained change
    pub fn events(&self) -> Receiver<LayerEvent> {
        self.dispatcher.receiver()
    }

    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.dispatcher.on_event(move |event| match event {
            LayerEvent::Change => listener(),
        });
    }

    pub fn state(&self) -> LayerState {
        self.state
    }

    pub fn config(&self) -> &ViewfieldLayerConfig {
        &self.config
    }

    pub fn visibility_state(&self) -> VisibilityState {
        self.visibility.state()
    }

    pub fn has_container(&self) -> bool {
        self.container.is_some()
    }

    /// The container's display flag; false without a container
    pub fn is_displayed(&self) -> bool {
        self.container
            .as_ref()
            .map(|container| container.display)
            .unwrap_or(false)
    }

    pub fn markers(&self) -> impl Iterator<Item = &ViewfieldMarker> {
        self.container
            .iter()
            .flat_map(|container| container.markers.iter())
    }

    pub fn marker_count(&self) -> usize {
        self.container
            .as_ref()
            .map(|container| container.markers.len())
            .unwrap_or(0)
    }

    pub fn redraw_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn service_bound(&self) -> bool {
        self.binding.is_bound()
    }

    fn apply_config(&mut self, config: ViewfieldLayerConfig) -> Result<()> {
        config.validate()?;
        if config.container_class != self.config.container_class {
            return Err(MapError::Config(
                "container_class cannot change after the layer is built".into(),
            ));
        }

        self.renderer.set_gate(ZoomGate::new(config.min_zoom));
        self.scheduler.set_window(config.redraw_debounce());
        self.visibility
            .set_timing(config.fade_duration(), config.fade_easing);
        self.config = config;
        Ok(())
    }
}

impl LayerTrait for ViewfieldLayer {
    fn id(&self) -> &str {
        &self.properties.id
    }

    fn name(&self) -> &str {
        &self.properties.name
    }

    fn layer_type(&self) -> LayerType {
        self.properties.layer_type
    }

    fn z_index(&self) -> i32 {
        self.properties.z_index
    }

    fn set_z_index(&mut self, z_index: i32) {
        self.properties.z_index = z_index;
    }

    fn opacity(&self) -> f32 {
        self.visibility.opacity(self.clock.now()) as f32
    }

    fn is_visible(&self) -> bool {
        self.state.enabled && self.is_displayed()
    }

    fn set_visible(&mut self, visible: bool) {
        if visible != self.state.enabled {
            self.set_enabled(visible);
        }
    }

    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        self.draw(context, viewport);
        Ok(())
    }

    fn options(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }

    fn set_options(&mut self, options: serde_json::Value) -> Result<()> {
        let config: ViewfieldLayerConfig = serde_json::from_value(options)?;
        self.apply_config(config)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Fluent construction of a [`ViewfieldLayer`]
pub struct ViewfieldLayerBuilder {
    registry: Arc<dyn ServiceRegistry>,
    host: Arc<dyn HostMap>,
    id: String,
    name: String,
    z_index: i32,
    clock: Option<Arc<dyn Clock>>,
    profile: ViewfieldProfile,
    dimensions: Option<Point>,
}

impl ViewfieldLayerBuilder {
    pub fn new(registry: Arc<dyn ServiceRegistry>, host: Arc<dyn HostMap>) -> Self {
        Self {
            registry,
            host,
            id: "viewfield-images".to_string(),
            name: "Street-level imagery".to_string(),
            z_index: 0,
            clock: None,
            profile: ViewfieldProfile::default(),
            dimensions: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Time source for fades and the debounce; defaults to the wall clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_profile(mut self, profile: ViewfieldProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_config(self, config: ViewfieldLayerConfig) -> Self {
        self.with_profile(ViewfieldProfile::Custom(config))
    }

    pub fn with_dimensions(mut self, dimensions: Point) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn build(self) -> Result<ViewfieldLayer> {
        let config = self.profile.resolve();
        config.validate()?;

        let mut properties = LayerProperties::new(self.id, self.name, LayerType::Viewfield);
        properties.z_index = self.z_index;

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()));
        let mut layer =
            ViewfieldLayer::from_parts(properties, config, self.registry, self.host, clock);
        if let Some(dimensions) = self.dimensions {
            layer.set_dimensions(dimensions)?;
        }
        Ok(layer)
    }
}

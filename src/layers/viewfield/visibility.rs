use crate::animation::interpolation::EasingFunction;
use crate::animation::transitions::{FadeDirection, FadeManager, TransitionToken};
use crate::layers::viewfield::renderer::LayerContainer;
use crate::layers::viewfield::service::ImageryService;
use crate::timing::debounce::RedrawScheduler;
use crate::traits::HostMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
    Hidden,
    Showing,
    Shown,
    Hiding,
}

/// What the owner must do now that a fade has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityOutcome {
    /// Fade-in done: schedule a redraw
    Shown,
    /// Fade-out done: clear the markers and turn the display flag off
    Hidden,
}

/// Shown/hidden lifecycle of the layer, with fades in between.
///
/// Each `show`/`hide` starts a fresh fade and invalidates the one in flight,
/// so only the latest request ever completes.
#[derive(Debug)]
pub struct VisibilityController {
    fades: FadeManager,
    state: VisibilityState,
    duration: Duration,
    easing: EasingFunction,
}

impl VisibilityController {
    pub fn new(duration: Duration, easing: EasingFunction) -> Self {
        Self {
            fades: FadeManager::new(),
            state: VisibilityState::Hidden,
            duration,
            easing,
        }
    }

    pub fn state(&self) -> VisibilityState {
        self.state
    }

    /// Container opacity at `now`; fully opaque when no fade has run
    pub fn opacity(&self, now: Duration) -> f64 {
        self.fades
            .current()
            .map(|fade| fade.opacity_at(now))
            .unwrap_or(1.0)
    }

    pub fn is_transitioning(&self) -> bool {
        self.fades.has_active_transition()
    }

    /// Prepares the provider's viewer and fades the layer in.
    ///
    /// Without a provider there is nothing to fade, but a fade-out still in
    /// flight is dropped so it cannot hide the re-enabled layer later.
    pub fn show(
        &mut self,
        service: Option<&dyn ImageryService>,
        host: &dyn HostMap,
        container: Option<&mut LayerContainer>,
        now: Duration,
    ) -> Option<TransitionToken> {
        let Some(service) = service else {
            self.fades.clear();
            self.state = VisibilityState::Shown;
            return None;
        };
        service.load_viewer(host);

        if let Some(container) = container {
            container.edit_on();
        }

        let token = self
            .fades
            .start(FadeDirection::In, 0.0, self.duration, self.easing, now);
        self.state = VisibilityState::Showing;
        log::debug!("viewfield layer fading in (token {})", token.raw());
        Some(token)
    }

    /// Tears down the provider's viewer, cancels any pending redraw and fades
    /// the layer out from wherever its opacity currently is.
    ///
    /// Markers stay in place until the fade-out completes.
    pub fn hide(
        &mut self,
        service: Option<&dyn ImageryService>,
        scheduler: &RedrawScheduler,
        now: Duration,
    ) -> TransitionToken {
        if let Some(service) = service {
            service.hide_viewer();
        }
        scheduler.cancel();

        let from = self.opacity(now);
        let token = self
            .fades
            .start(FadeDirection::Out, from, self.duration, self.easing, now);
        self.state = VisibilityState::Hiding;
        log::debug!("viewfield layer fading out (token {})", token.raw());
        token
    }

    /// Advances the running fade, reporting its outcome once it completes
    pub fn update(&mut self, now: Duration) -> Option<VisibilityOutcome> {
        let completion = self.fades.update(now)?;
        let outcome = match completion.direction {
            FadeDirection::In => {
                self.state = VisibilityState::Shown;
                VisibilityOutcome::Shown
            }
            FadeDirection::Out => {
                self.state = VisibilityState::Hidden;
                VisibilityOutcome::Hidden
            }
        };
        log::debug!(
            "viewfield fade finished (token {}): {:?}",
            completion.token.raw(),
            outcome
        );
        Some(outcome)
    }

    /// Forgets any finished fade so a freshly mounted container starts opaque.
    /// A fade still in flight is left alone.
    pub fn reset(&mut self, enabled: bool) {
        if self.fades.has_active_transition() {
            return;
        }
        self.fades = FadeManager::new();
        self.state = if enabled {
            VisibilityState::Shown
        } else {
            VisibilityState::Hidden
        };
    }

    pub fn set_timing(&mut self, duration: Duration, easing: EasingFunction) {
        self.duration = duration;
        self.easing = easing;
    }
}

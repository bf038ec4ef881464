use crate::animation::interpolation::{EasingFunction, Interpolation};
use std::time::Duration;

/// Identifies one started transition. Completion is only honoured for the
/// token the manager currently holds; anything older has been superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionToken(u64);

impl TransitionToken {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    In,
    Out,
}

impl FadeDirection {
    fn target(&self) -> f64 {
        match self {
            FadeDirection::In => 1.0,
            FadeDirection::Out => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Running,
    Completed,
    Cancelled,
}

/// An opacity tween on the layer container
#[derive(Debug, Clone)]
pub struct FadeTransition {
    pub token: TransitionToken,
    pub direction: FadeDirection,
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
    pub easing: EasingFunction,
    pub state: TransitionState,
    /// Clock reading when the fade started
    started_at: Duration,
}

impl FadeTransition {
    fn new(
        token: TransitionToken,
        direction: FadeDirection,
        from: f64,
        duration: Duration,
        easing: EasingFunction,
        started_at: Duration,
    ) -> Self {
        Self {
            token,
            direction,
            from: from.clamp(0.0, 1.0),
            to: direction.target(),
            duration,
            easing,
            state: TransitionState::Running,
            started_at,
        }
    }

    /// Progress in `[0, 1]` at clock reading `now`
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn opacity_at(&self, now: Duration) -> f64 {
        match self.state {
            TransitionState::Completed => self.to,
            _ => Interpolation::ease(self.from, self.to, self.progress(now), self.easing),
        }
    }

    /// Advances to `now`; returns true exactly once, on the update that completes it
    fn update(&mut self, now: Duration) -> bool {
        if self.state != TransitionState::Running {
            return false;
        }
        if self.progress(now) >= 1.0 {
            self.state = TransitionState::Completed;
            return true;
        }
        false
    }

    fn stop(&mut self) {
        if self.state == TransitionState::Running {
            self.state = TransitionState::Cancelled;
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            TransitionState::Completed | TransitionState::Cancelled
        )
    }
}

/// A finished fade, reported once by [`FadeManager::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeCompletion {
    pub token: TransitionToken,
    pub direction: FadeDirection,
}

/// Runs at most one fade at a time. Starting a fade always interrupts the
/// running one, whose completion is then never reported.
#[derive(Debug, Default)]
pub struct FadeManager {
    current: Option<FadeTransition>,
    next_token: u64,
}

impl FadeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(
        &mut self,
        direction: FadeDirection,
        from: f64,
        duration: Duration,
        easing: EasingFunction,
        now: Duration,
    ) -> TransitionToken {
        if let Some(current) = self.current.as_mut() {
            if !current.is_finished() {
                log::debug!(
                    "fade {:?} (token {}) superseded by fade {:?}",
                    current.direction,
                    current.token.0,
                    direction
                );
            }
            current.stop();
        }

        self.next_token += 1;
        let token = TransitionToken(self.next_token);
        self.current = Some(FadeTransition::new(
            token, direction, from, duration, easing, now,
        ));
        token
    }

    /// Advances the running fade and reports its completion, if it just completed
    pub fn update(&mut self, now: Duration) -> Option<FadeCompletion> {
        let transition = self.current.as_mut()?;
        if transition.update(now) {
            return Some(FadeCompletion {
                token: transition.token,
                direction: transition.direction,
            });
        }
        None
    }

    pub fn is_current(&self, token: TransitionToken) -> bool {
        self.current.as_ref().map(|t| t.token) == Some(token)
    }

    pub fn has_active_transition(&self) -> bool {
        self.current
            .as_ref()
            .map(|t| !t.is_finished())
            .unwrap_or(false)
    }

    pub fn current(&self) -> Option<&FadeTransition> {
        self.current.as_ref()
    }

    /// Drops the current fade without reporting it; opacity reads as fully
    /// opaque afterwards
    pub fn clear(&mut self) {
        if let Some(current) = self.current.take() {
            if !current.is_finished() {
                log::debug!(
                    "fade {:?} (token {}) dropped",
                    current.direction,
                    current.token.0
                );
            }
        }
    }
}

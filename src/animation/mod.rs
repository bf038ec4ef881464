pub mod interpolation;
pub mod transitions;

pub use interpolation::{EasingFunction, Interpolation};
pub use transitions::{
    FadeCompletion, FadeDirection, FadeManager, FadeTransition, TransitionState, TransitionToken,
};

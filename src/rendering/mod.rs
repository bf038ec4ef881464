pub mod context;

pub use context::{ContainerState, DrawCommand, RenderContext};

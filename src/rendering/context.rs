use crate::layers::viewfield::marker::MarkerTransform;
use fxhash::FxHashMap;

/// Style of a container group mounted this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerState {
    pub display: bool,
    pub opacity: f64,
}

/// Commands a layer issues to the render context
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// One viewfield glyph: the wedge path and the location dot
    Viewfield {
        container: String,
        key: String,
        transform: MarkerTransform,
        selected: bool,
        opacity: f64,
    },
}

/// The selection a layer draws into: the set of mounted layer containers and
/// the glyphs queued for the current frame.
///
/// Containers persist across frames; the drawing queue is cleared by
/// [`RenderContext::begin_frame`].
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    pub drawing_queue: Vec<DrawCommand>,
    containers: FxHashMap<String, ContainerState>,
}

impl RenderContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
            containers: FxHashMap::default(),
        }
    }

    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
    }

    /// Mounts (or restyles) a container. Returns true if it was newly created.
    pub fn mount(&mut self, class: &str, state: ContainerState) -> bool {
        self.containers.insert(class.to_string(), state).is_none()
    }

    /// Removes a container and everything queued into it this frame
    pub fn unmount(&mut self, class: &str) -> bool {
        self.drawing_queue.retain(|command| match command {
            DrawCommand::Viewfield { container, .. } => container != class,
        });
        self.containers.remove(class).is_some()
    }

    pub fn container(&self, class: &str) -> Option<&ContainerState> {
        self.containers.get(class)
    }

    pub fn has_container(&self, class: &str) -> bool {
        self.containers.contains_key(class)
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.drawing_queue.push(command);
    }

    /// Commands queued into one container, in draw order
    pub fn commands_in<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a DrawCommand> {
        self.drawing_queue.iter().filter(move |command| match command {
            DrawCommand::Viewfield { container, .. } => container == class,
        })
    }
}

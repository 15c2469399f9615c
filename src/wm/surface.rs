use serde::Serialize;

use super::geometry::Geometry;
use super::{WindowContent, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExitTransition {
    Animated { millis: u64 },
    Immediate,
}

/// One change to apply to the visual side of the desktop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceCommand {
    Mount {
        id: WindowId,
        title: String,
        geometry: Geometry,
        z_index: u64,
        content: WindowContent,
    },
    Place {
        id: WindowId,
        geometry: Geometry,
    },
    Stack {
        id: WindowId,
        z_index: u64,
    },
    Show {
        id: WindowId,
    },
    Hide {
        id: WindowId,
    },
    /// Marks `id` as the only active window.
    Activate {
        id: WindowId,
    },
    SetMaximized {
        id: WindowId,
        maximized: bool,
    },
    Unmount {
        id: WindowId,
        transition: ExitTransition,
    },
    TaskbarAdd {
        id: WindowId,
        title: String,
    },
    TaskbarRemove {
        id: WindowId,
    },
    TaskbarActive {
        id: WindowId,
    },
    TaskbarInactive {
        id: WindowId,
    },
    TaskbarClear,
}

/// Anything able to host positioned, stacked window frames with a title
/// region, three controls and a scrollable content area.
pub trait RenderSurface: Send {
    fn apply(&mut self, command: SurfaceCommand);
}

/// Buffers commands until the front-end collects them.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Vec<SurfaceCommand>,
}

impl CommandQueue {
    pub fn pending(&self) -> &[SurfaceCommand] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.pending)
    }
}

impl RenderSurface for CommandQueue {
    fn apply(&mut self, command: SurfaceCommand) {
        self.pending.push(command);
    }
}

// Window manager for the desktop. Owns every window record and the taskbar,
// and reports each visual change to a render surface. Operations on an id
// that is not open do nothing.

mod drag;
mod geometry;
mod surface;
mod taskbar;

pub use drag::{DragState, PointerEvent, PointerKind, PointerSource, PointerTarget};
pub use geometry::{Geometry, OpenOptions, Viewport, NARROW_BREAKPOINT};
pub use surface::{CommandQueue, ExitTransition, RenderSurface, SurfaceCommand};
pub use taskbar::{Taskbar, TaskbarEntry};

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

const BASE_Z_INDEX: u64 = 100;
const CLOSE_TRANSITION_MS: u64 = 200;

/// Window ids are handed out in creation order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "win_{}", self.0)
    }
}

impl FromStr for WindowId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("win_").unwrap_or(s).parse().map(WindowId)
    }
}

impl Serialize for WindowId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What goes in the content area: a named component the front-end builds for
/// the window, or literal markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum WindowContent {
    Component(String),
    Markup(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Minimize,
    Maximize,
    Close,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowRecord {
    pub id: WindowId,
    pub app_id: String,
    pub title: String,
    pub geometry: Geometry,
    pub minimized: bool,
    pub maximized: bool,
    pub saved_geometry: Option<Geometry>,
    pub z_index: u64,
    pub content: WindowContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PointerOutcome {
    pub prevent_default: bool,
}

pub struct WindowManager<S: RenderSurface> {
    windows: Vec<WindowRecord>,
    taskbar: Taskbar,
    surface: S,
    viewport: Viewport,
    z_counter: u64,
    next_id: u64,
    active: Option<WindowId>,
    drag: Option<(WindowId, DragState)>,
}

impl<S: RenderSurface> WindowManager<S> {
    pub fn new(surface: S, viewport: Viewport) -> WindowManager<S> {
        WindowManager {
            windows: Vec::new(),
            taskbar: Taskbar::default(),
            surface,
            viewport,
            z_counter: BASE_Z_INDEX,
            next_id: 1,
            active: None,
            drag: None,
        }
    }

    pub fn windows(&self) -> &[WindowRecord] {
        &self.windows
    }

    pub fn window(&self, id: WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| w.id == id)
    }

    fn window_mut(&mut self, id: WindowId) -> Option<&mut WindowRecord> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    pub fn active(&self) -> Option<WindowId> {
        self.active
    }

    pub fn taskbar(&self) -> &Taskbar {
        &self.taskbar
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn next_z_index(&mut self) -> u64 {
        self.z_counter += 1;
        self.z_counter
    }

    #[instrument(skip(self, content))]
    pub fn open(
        &mut self,
        app_id: &str,
        title: &str,
        content: WindowContent,
        options: &OpenOptions,
    ) -> WindowId {
        let id = WindowId(self.next_id);
        self.next_id += 1;

        let title = if title.is_empty() {
            "Application".to_string()
        } else {
            title.to_string()
        };
        let geometry = geometry::initial_geometry(&self.viewport, self.windows.len(), options);
        let z_index = self.next_z_index();

        self.surface.apply(SurfaceCommand::Mount {
            id,
            title: title.clone(),
            geometry,
            z_index,
            content: content.clone(),
        });
        self.windows.push(WindowRecord {
            id,
            app_id: app_id.to_string(),
            title: title.clone(),
            geometry,
            minimized: false,
            maximized: false,
            saved_geometry: None,
            z_index,
            content,
        });

        self.taskbar.add(id, &title);
        self.surface.apply(SurfaceCommand::TaskbarAdd { id, title });

        tracing::info!("Opened window {} for {}", id, app_id);
        self.focus(id);
        id
    }

    #[instrument(skip(self))]
    pub fn focus(&mut self, id: WindowId) {
        if self.window(id).is_none() {
            return;
        }
        let z_index = self.next_z_index();
        let mut restored = false;
        if let Some(window) = self.window_mut(id) {
            restored = window.minimized;
            window.minimized = false;
            window.z_index = z_index;
        }
        if restored {
            self.surface.apply(SurfaceCommand::Show { id });
        }
        self.surface.apply(SurfaceCommand::Stack { id, z_index });
        self.active = Some(id);
        self.surface.apply(SurfaceCommand::Activate { id });
        self.taskbar.set_active(id);
        self.surface.apply(SurfaceCommand::TaskbarActive { id });
    }

    #[instrument(skip(self))]
    pub fn minimize(&mut self, id: WindowId) {
        let Some(window) = self.window_mut(id) else {
            return;
        };
        window.minimized = true;
        self.surface.apply(SurfaceCommand::Hide { id });
        self.taskbar.deactivate(id);
        self.surface.apply(SurfaceCommand::TaskbarInactive { id });
        if self.active == Some(id) {
            self.active = None;
        }
        if matches!(self.drag, Some((dragged, _)) if dragged == id) {
            self.drag = None;
        }
    }

    /// Toggles between the safe-area fill and the geometry saved on the way in.
    #[instrument(skip(self))]
    pub fn maximize(&mut self, id: WindowId) {
        let viewport = self.viewport;
        let Some(window) = self.window_mut(id) else {
            return;
        };
        if !window.maximized {
            window.saved_geometry = Some(window.geometry);
            window.geometry = geometry::maximized_geometry(&viewport);
            window.maximized = true;
        } else {
            if let Some(saved) = window.saved_geometry.take() {
                window.geometry = saved;
            }
            window.maximized = false;
        }
        let (geometry, maximized) = (window.geometry, window.maximized);
        self.surface.apply(SurfaceCommand::SetMaximized { id, maximized });
        self.surface.apply(SurfaceCommand::Place { id, geometry });
    }

    #[instrument(skip(self))]
    pub fn close(&mut self, id: WindowId) {
        let Some(pos) = self.windows.iter().position(|w| w.id == id) else {
            return;
        };
        self.surface.apply(SurfaceCommand::Unmount {
            id,
            transition: ExitTransition::Animated {
                millis: CLOSE_TRANSITION_MS,
            },
        });
        self.windows.remove(pos);
        if self.taskbar.remove(id) {
            self.surface.apply(SurfaceCommand::TaskbarRemove { id });
        }
        if self.active == Some(id) {
            self.active = None;
        }
        if matches!(self.drag, Some((dragged, _)) if dragged == id) {
            self.drag = None;
        }
        tracing::info!("Closed window {}", id);
    }

    #[instrument(skip(self))]
    pub fn close_all(&mut self) {
        for window in self.windows.drain(..) {
            self.surface.apply(SurfaceCommand::Unmount {
                id: window.id,
                transition: ExitTransition::Immediate,
            });
        }
        self.taskbar.clear();
        self.surface.apply(SurfaceCommand::TaskbarClear);
        self.active = None;
        self.drag = None;
    }

    /// A click on the window's taskbar entry hides it when it is the visible
    /// active window and brings it forward otherwise.
    pub fn taskbar_click(&mut self, id: WindowId) {
        let visible = self.window(id).map(|w| !w.minimized).unwrap_or(false);
        if self.active == Some(id) && visible {
            self.minimize(id);
        } else {
            self.focus(id);
        }
    }

    pub fn activate_control(&mut self, id: WindowId, control: Control) {
        match control {
            Control::Minimize => self.minimize(id),
            Control::Maximize => self.maximize(id),
            Control::Close => self.close(id),
        }
    }

    pub fn pointer_down(&mut self, id: WindowId, event: &PointerEvent) -> PointerOutcome {
        let Some(geometry) = self.window(id).map(|w| w.geometry) else {
            return PointerOutcome::default();
        };
        tracing::debug!("Pointer down on {} from {:?}", id, event.source);
        let transition = drag::step(DragState::Idle, geometry, event);
        if transition.focus {
            self.focus(id);
        }
        self.drag = match transition.state {
            DragState::Idle => None,
            state => Some((id, state)),
        };
        PointerOutcome {
            prevent_default: transition.prevent_default,
        }
    }

    /// Follows an active drag. Events other than moves leave the drag alone.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> PointerOutcome {
        if event.kind != PointerKind::Move {
            return PointerOutcome::default();
        }
        let Some((id, state)) = self.drag else {
            return PointerOutcome::default();
        };
        let Some(window) = self.window_mut(id) else {
            self.drag = None;
            return PointerOutcome::default();
        };
        let transition = drag::step(state, window.geometry, event);
        let moved = transition.geometry != window.geometry;
        window.geometry = transition.geometry;
        if moved {
            self.surface.apply(SurfaceCommand::Place {
                id,
                geometry: transition.geometry,
            });
        }
        self.drag = Some((id, transition.state));
        PointerOutcome {
            prevent_default: transition.prevent_default,
        }
    }

    pub fn pointer_up(&mut self, event: &PointerEvent) -> PointerOutcome {
        if let Some((id, state)) = self.drag.take() {
            if let Some(window) = self.window(id) {
                let transition = drag::step(state, window.geometry, event);
                tracing::debug!("Drag of {} ended at {:?}", id, transition.geometry);
            }
        }
        PointerOutcome::default()
    }
}

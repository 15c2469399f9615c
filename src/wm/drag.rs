// Title-bar dragging as a pure transition: current drag state, current geometry
// and one pointer event in, next state and geometry out. Works the same for
// mouse and touch and knows nothing about the surface.

use serde::{Deserialize, Serialize};

use super::geometry::Geometry;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// Which part of the window a press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerTarget {
    Title,
    Control,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub source: PointerSource,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub target: Option<PointerTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        origin_x: f64,
        origin_y: f64,
        initial_x: f64,
        initial_y: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: DragState,
    pub geometry: Geometry,
    /// The press should raise the window.
    pub focus: bool,
    /// The host must not treat the event as a scroll gesture.
    pub prevent_default: bool,
}

pub fn step(state: DragState, geometry: Geometry, event: &PointerEvent) -> Transition {
    let unchanged = Transition {
        state,
        geometry,
        focus: false,
        prevent_default: false,
    };
    match event.kind {
        PointerKind::Down => match event.target {
            Some(PointerTarget::Title) => Transition {
                state: DragState::Dragging {
                    origin_x: event.x,
                    origin_y: event.y,
                    initial_x: geometry.x,
                    initial_y: geometry.y,
                },
                focus: true,
                ..unchanged
            },
            // controls and content raise the window but never start a drag
            _ => Transition {
                state: DragState::Idle,
                focus: true,
                ..unchanged
            },
        },
        PointerKind::Move => match state {
            DragState::Idle => unchanged,
            DragState::Dragging {
                origin_x,
                origin_y,
                initial_x,
                initial_y,
            } => Transition {
                geometry: Geometry {
                    x: initial_x + (event.x - origin_x),
                    y: initial_y + (event.y - origin_y),
                    ..geometry
                },
                prevent_default: true,
                ..unchanged
            },
        },
        PointerKind::Up => Transition {
            state: DragState::Idle,
            ..unchanged
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> Geometry {
        Geometry {
            x: 100.0,
            y: 50.0,
            width: 600.0,
            height: 400.0,
        }
    }

    fn event(kind: PointerKind, x: f64, y: f64, target: Option<PointerTarget>) -> PointerEvent {
        PointerEvent {
            kind,
            source: PointerSource::Touch,
            x,
            y,
            target,
        }
    }

    #[test]
    fn title_press_then_move_follows_pointer_delta() {
        let down = step(
            DragState::Idle,
            geometry(),
            &event(PointerKind::Down, 150.0, 60.0, Some(PointerTarget::Title)),
        );
        assert!(down.focus);
        let moved = step(
            down.state,
            down.geometry,
            &event(PointerKind::Move, 170.0, 40.0, None),
        );
        assert_eq!(moved.geometry.x, 120.0);
        assert_eq!(moved.geometry.y, 30.0);
        assert_eq!(moved.geometry.width, 600.0);
        assert!(moved.prevent_default);

        // deltas are measured from the press, not the previous move
        let again = step(
            moved.state,
            moved.geometry,
            &event(PointerKind::Move, 160.0, 70.0, None),
        );
        assert_eq!(again.geometry.x, 110.0);
        assert_eq!(again.geometry.y, 60.0);
    }

    #[test]
    fn control_press_focuses_without_dragging() {
        let down = step(
            DragState::Idle,
            geometry(),
            &event(PointerKind::Down, 150.0, 60.0, Some(PointerTarget::Control)),
        );
        assert!(down.focus);
        assert_eq!(down.state, DragState::Idle);
        let moved = step(
            down.state,
            down.geometry,
            &event(PointerKind::Move, 300.0, 300.0, None),
        );
        assert_eq!(moved.geometry, geometry());
        assert!(!moved.prevent_default);
    }

    #[test]
    fn release_ends_the_drag() {
        let down = step(
            DragState::Idle,
            geometry(),
            &event(PointerKind::Down, 0.0, 0.0, Some(PointerTarget::Title)),
        );
        let up = step(down.state, down.geometry, &event(PointerKind::Up, 0.0, 0.0, None));
        assert_eq!(up.state, DragState::Idle);
        let moved = step(up.state, up.geometry, &event(PointerKind::Move, 50.0, 50.0, None));
        assert_eq!(moved.geometry, geometry());
    }
}

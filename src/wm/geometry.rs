use serde::{Deserialize, Serialize};

/// Viewports narrower than this get the phone layout.
pub const NARROW_BREAKPOINT: f64 = 768.0;

const WIDE_WIDTH: f64 = 600.0;
const WIDE_HEIGHT: f64 = 400.0;
const CASCADE_STEP: f64 = 30.0;
const CASCADE_X: f64 = 100.0;
const CASCADE_Y: f64 = 50.0;

// Safe area of a maximized window. The bottom inset leaves room for the dock.
const MAX_INSET: f64 = 10.0;
const DOCK_RESERVE: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

impl Viewport {
    pub fn is_narrow(&self) -> bool {
        self.width < NARROW_BREAKPOINT
    }
}

/// Caller overrides for a new window. Unset or non-positive sizes fall back to the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenOptions {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Where a new window goes when `open_count` windows are already open.
pub fn initial_geometry(viewport: &Viewport, open_count: usize, options: &OpenOptions) -> Geometry {
    let step = CASCADE_STEP * open_count as f64;
    let (default_width, default_height) = if viewport.is_narrow() {
        (viewport.width * 0.9, viewport.height * 0.6)
    } else {
        (WIDE_WIDTH, WIDE_HEIGHT)
    };
    let default_x = if viewport.is_narrow() {
        (viewport.width - default_width) / 2.0
    } else {
        CASCADE_X + step
    };

    Geometry {
        x: options.x.unwrap_or(default_x),
        y: options.y.unwrap_or(CASCADE_Y + step),
        width: options.width.filter(|w| *w > 0.0).unwrap_or(default_width),
        height: options.height.filter(|h| *h > 0.0).unwrap_or(default_height),
    }
}

pub fn maximized_geometry(viewport: &Viewport) -> Geometry {
    Geometry {
        x: MAX_INSET,
        y: MAX_INSET,
        width: viewport.width - 2.0 * MAX_INSET,
        height: viewport.height - DOCK_RESERVE,
    }
}

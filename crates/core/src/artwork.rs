//! Icon artwork as data.
//!
//! A drawing is an ordered list of [`DrawOp`]s in the 512×512 logical space.
//! [`render`] interprets a list onto a [`Canvas`]; [`MONITOR`] is the built-in
//! retro desktop monitor icon. Changing the artwork means editing the table,
//! not the drawing primitives.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::{BevelColors, Canvas, Color};
use crate::error::Result;

/// Half-open logical rectangle `[x1,x2) × [y1,y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Rect { x1, y1, x2, y2 }
    }
}

/// One drawing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    /// Opaque filled rectangle
    Fill { rect: Rect, color: Color },
    /// Raised two-tone border drawn inside `rect`
    Bevel {
        rect: Rect,
        thickness: i32,
        #[serde(default)]
        colors: BevelColors,
    },
}

impl DrawOp {
    pub fn apply(&self, canvas: &mut Canvas) {
        match *self {
            DrawOp::Fill { rect, color } => {
                canvas.fill_rect(rect.x1, rect.y1, rect.x2, rect.y2, color)
            }
            DrawOp::Bevel { rect, thickness, colors } => {
                canvas.draw_beveled_rect(rect.x1, rect.y1, rect.x2, rect.y2, thickness, colors)
            }
        }
    }
}

/// Apply `ops` to `canvas` in order.
pub fn render(ops: &[DrawOp], canvas: &mut Canvas) {
    for op in ops {
        op.apply(canvas);
    }
}

/// Render the built-in monitor icon onto a fresh canvas.
pub fn compose_icon(size: u32) -> Result<Canvas> {
    let mut canvas = Canvas::new(size)?;
    render(MONITOR, &mut canvas);
    debug!(size, ops = MONITOR.len(), "composed icon");
    Ok(canvas)
}

/// A named, serializable drawing script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub name: String,
    pub ops: Vec<DrawOp>,
}

impl Script {
    /// The built-in monitor artwork as an owned script.
    pub fn monitor() -> Self {
        Script { name: "monitor".to_string(), ops: MONITOR.to_vec() }
    }

    pub fn render(&self, canvas: &mut Canvas) {
        render(&self.ops, canvas);
    }
}

// ─── Palette ────────────────────────────────────────────────────────────────

const SILVER: Color = Color::rgb(192, 192, 192);
const BEZEL: Color = Color::rgb(48, 48, 48);
const DESKTOP_TEAL: Color = Color::rgb(0, 128, 128);
const TITLE_NAVY: Color = Color::rgb(0, 0, 128);
const TITLE_HIGHLIGHT: Color = Color::rgb(16, 132, 208);
const TEXT_GRAY: Color = Color::rgb(128, 128, 128);
const LOGO_RED: Color = Color::rgb(242, 80, 34);
const LOGO_GREEN: Color = Color::rgb(127, 186, 0);
const LOGO_BLUE: Color = Color::rgb(0, 164, 239);
const LOGO_YELLOW: Color = Color::rgb(255, 185, 0);
const POWER_LED: Color = Color::rgb(0, 200, 0);

const fn fill(x1: i32, y1: i32, x2: i32, y2: i32, color: Color) -> DrawOp {
    DrawOp::Fill { rect: Rect::new(x1, y1, x2, y2), color }
}

const fn bevel(x1: i32, y1: i32, x2: i32, y2: i32, thickness: i32) -> DrawOp {
    DrawOp::Bevel { rect: Rect::new(x1, y1, x2, y2), thickness, colors: BevelColors::CLASSIC }
}

/// Retro desktop monitor: body, bezel, desktop with a small window,
/// taskbar with a start swatch, stand, base and power LED.
pub const MONITOR: &[DrawOp] = &[
    // Monitor body
    fill(32, 32, 480, 384, SILVER),
    bevel(32, 32, 480, 384, 12),
    // Bezel and desktop
    fill(64, 64, 448, 336, BEZEL),
    fill(80, 80, 432, 320, DESKTOP_TEAL),
    // Window: title bar, highlight, close box, body
    fill(128, 104, 384, 132, TITLE_NAVY),
    fill(132, 108, 260, 116, TITLE_HIGHLIGHT),
    fill(356, 108, 378, 128, SILVER),
    fill(128, 132, 384, 256, Color::WHITE),
    // Placeholder text lines
    fill(144, 148, 352, 160, TEXT_GRAY),
    fill(144, 172, 320, 184, TEXT_GRAY),
    fill(144, 196, 360, 208, TEXT_GRAY),
    fill(144, 220, 296, 232, TEXT_GRAY),
    // Taskbar and start swatch
    fill(80, 288, 432, 320, SILVER),
    fill(88, 294, 100, 303, LOGO_RED),
    fill(100, 294, 112, 303, LOGO_GREEN),
    fill(88, 303, 100, 312, LOGO_BLUE),
    fill(100, 303, 112, 312, LOGO_YELLOW),
    // Stand and base
    fill(208, 384, 304, 432, SILVER),
    bevel(208, 384, 304, 432, 8),
    fill(128, 432, 384, 480, SILVER),
    bevel(128, 432, 384, 480, 8),
    // Power LED
    fill(424, 352, 440, 368, POWER_LED),
];

//! Typed input events exchanged with content frames.
//!
//! Each kind carries exactly the position fields it needs, so translating
//! between frame-local and window-absolute space is a single exhaustive
//! match instead of patching arbitrary payload fields.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventKind {
    #[default]
    Down,
    Up,
    Char,
}

/// Keyboard event for the native input pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// DOM key name, e.g. `"Enter"` or `"a"`.
    pub key: String,
    #[serde(default)]
    pub key_code: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char: Option<char>,
    #[serde(default)]
    pub phase: KeyEventKind,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn down(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            key_code: 0,
            char: None,
            phase: KeyEventKind::Down,
            modifiers: Modifiers::default(),
        }
    }
}

fn one() -> u32 {
    1
}

/// An event bound to one frame, with positions in that frame's space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FrameEvent {
    Click {
        #[serde(default)]
        button: MouseButton,
        at: Point,
        #[serde(default = "one")]
        click_count: u32,
        #[serde(default)]
        modifiers: Modifiers,
    },
    MouseDown {
        #[serde(default)]
        button: MouseButton,
        at: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    MouseUp {
        #[serde(default)]
        button: MouseButton,
        at: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    MouseMove {
        at: Point,
    },
    MouseEnter {
        at: Point,
    },
    MouseLeave {
        at: Point,
    },
    ContextMenu {
        at: Point,
        /// Target URL when the menu opens over a link.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        link: Option<String>,
    },
    Scroll {
        at: Point,
        #[serde(default)]
        delta_x: f64,
        #[serde(default)]
        delta_y: f64,
    },
    SelectionSpan {
        start: Point,
        end: Point,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Drag {
        #[serde(default)]
        button: MouseButton,
        start: Point,
        end: Point,
    },
    /// Replace the word under `at` in an editable field, e.g. a spelling fix.
    InputCorrection {
        at: Point,
        replacement: String,
    },
    Key(KeyEvent),
}

impl FrameEvent {
    pub fn click(x: f64, y: f64) -> Self {
        FrameEvent::Click {
            button: MouseButton::Left,
            at: Point::new(x, y),
            click_count: 1,
            modifiers: Modifiers::default(),
        }
    }

    /// Stable kind name, matching the serde tag.
    pub fn kind(&self) -> &'static str {
        match self {
            FrameEvent::Click { .. } => "click",
            FrameEvent::MouseDown { .. } => "mouse-down",
            FrameEvent::MouseUp { .. } => "mouse-up",
            FrameEvent::MouseMove { .. } => "mouse-move",
            FrameEvent::MouseEnter { .. } => "mouse-enter",
            FrameEvent::MouseLeave { .. } => "mouse-leave",
            FrameEvent::ContextMenu { .. } => "context-menu",
            FrameEvent::Scroll { .. } => "scroll",
            FrameEvent::SelectionSpan { .. } => "selection-span",
            FrameEvent::Drag { .. } => "drag",
            FrameEvent::InputCorrection { .. } => "input-correction",
            FrameEvent::Key(_) => "key",
        }
    }

    /// The point used for hit-testing; the start point for spans.
    pub fn anchor(&self) -> Option<Point> {
        match self {
            FrameEvent::Click { at, .. }
            | FrameEvent::MouseDown { at, .. }
            | FrameEvent::MouseUp { at, .. }
            | FrameEvent::MouseMove { at }
            | FrameEvent::MouseEnter { at }
            | FrameEvent::MouseLeave { at }
            | FrameEvent::ContextMenu { at, .. }
            | FrameEvent::Scroll { at, .. }
            | FrameEvent::InputCorrection { at, .. } => Some(*at),
            FrameEvent::SelectionSpan { start, .. } | FrameEvent::Drag { start, .. } => Some(*start),
            FrameEvent::Key(_) => None,
        }
    }

    pub fn is_positional(&self) -> bool {
        self.anchor().is_some()
    }

    /// Apply `f` to every position field. Deltas and payloads are untouched.
    pub fn map_points(&mut self, f: impl Fn(Point) -> Point) {
        match self {
            FrameEvent::Click { at, .. }
            | FrameEvent::MouseDown { at, .. }
            | FrameEvent::MouseUp { at, .. }
            | FrameEvent::MouseMove { at }
            | FrameEvent::MouseEnter { at }
            | FrameEvent::MouseLeave { at }
            | FrameEvent::ContextMenu { at, .. }
            | FrameEvent::Scroll { at, .. }
            | FrameEvent::InputCorrection { at, .. } => *at = f(*at),
            FrameEvent::SelectionSpan { start, end, .. } | FrameEvent::Drag { start, end, .. } => {
                *start = f(*start);
                *end = f(*end);
            }
            FrameEvent::Key(_) => {}
        }
    }

    /// Shift every position by `offset`.
    pub fn offset_by(&mut self, offset: Point) {
        self.map_points(|p| p + offset);
    }
}

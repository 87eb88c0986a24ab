//! Toolkit-agnostic input: events the host forwards, and the gesture state
//! machine the controller tracks between pointer-down and pointer-up.

use crate::geometry::{Point, Size};
use crate::model::TableId;

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Primary-button drag pans instead of grabbing a table.
    pub fn pans(self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` number.
    pub fn from_dom(button: i16) -> Option<Self> {
        match button {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// Vertical wheel / trackpad scroll delta in pixels; positive `dy` scrolls
/// down. Horizontal scrolling is not used.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelDelta {
    pub dy: f64,
}

/// Discrete commands from host buttons or menus.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Parse the given schema text and replace the diagram.
    Generate(String),
    ZoomIn,
    ZoomOut,
    ResetZoom,
    /// Zoom 1.0 and no pan.
    ResetView,
    /// Drop the current diagram.
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        position: Point,
        button: Button,
        modifiers: Modifiers,
    },
    PointerMove {
        position: Point,
    },
    PointerUp {
        position: Point,
        button: Button,
    },
    /// `position` is the cursor when the host knows it; otherwise zoom
    /// focuses on the viewport centre.
    Wheel {
        position: Option<Point>,
        delta: WheelDelta,
    },
    /// The visible canvas area changed size.
    Resize {
        size: Size,
    },
    Command(Command),
}

/// Pointer cursor the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    /// Over a draggable table header.
    Grab,
    Grabbing,
    Move,
}

impl Cursor {
    /// CSS `cursor` value.
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::Move => "move",
        }
    }
}

/// The active gesture. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    #[default]
    Idle,
    Panning {
        /// Pointer position at the previous event.
        last_screen: Point,
    },
    DraggingTable {
        id: TableId,
        /// Pointer minus the table's screen origin at grab time.
        drag_offset: Point,
        /// Pointer position at the previous event.
        last_screen: Point,
    },
}

impl InputState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

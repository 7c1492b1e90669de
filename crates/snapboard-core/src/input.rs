//! Pointer input as delivered by the host, already in workspace coordinates.

use crate::element::ElementId;
use crate::group::GroupId;
use crate::handles::Anchor;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn toggles_selection(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What the pointer went down on, as resolved by the host's hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PointerTarget {
    Element { id: ElementId },
    ElementHandle { id: ElementId, anchor: Anchor },
    GroupHandle { group: GroupId, anchor: Anchor },
    Canvas,
}

/// Pointer event type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum PointerEvent {
    Down {
        position: Point,
        target: PointerTarget,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. } | PointerEvent::Move { position } | PointerEvent::Up { position } => {
                *position
            }
        }
    }
}

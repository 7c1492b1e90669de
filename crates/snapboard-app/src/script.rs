//! Recorded input scripts.
//!
//! A script is a JSON array of steps, for example:
//!
//! ```json
//! [
//!   { "step": "pointer", "event": { "type": "down", "position": { "x": 10, "y": 10 },
//!                                   "target": { "kind": "canvas" } } },
//!   { "step": "queue_move", "position": { "x": 200, "y": 150 } },
//!   { "step": "frame" },
//!   { "step": "key", "key": "G", "ctrl": true }
//! ]
//! ```

use kurbo::Point;
use serde::{Deserialize, Serialize};
use snapboard_core::PointerEvent;

/// One recorded input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "step")]
pub enum ScriptStep {
    /// Delivered straight to the engine's dispatcher.
    Pointer { event: PointerEvent },
    /// A pointer move held until the next `frame` step.
    QueueMove { position: Point },
    /// End of a display frame: apply the queued move.
    Frame,
    /// A keyboard shortcut.
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
    },
}

pub fn parse_script(json: &str) -> Result<Vec<ScriptStep>, serde_json::Error> {
    serde_json::from_str(json)
}

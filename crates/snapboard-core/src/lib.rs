//! Snapboard Core Library
//!
//! Platform-agnostic interaction engine for the Snapboard canvas: an ordered
//! element store, alignment snapping, drag and resize sessions, multi-select
//! and proportional group transforms.

pub mod config;
pub mod element;
pub mod engine;
pub mod error;
pub mod events;
pub mod frame;
pub mod geometry;
pub mod group;
pub mod handles;
pub mod input;
pub mod selection;
pub mod session;
pub mod snap;
pub mod store;

pub use config::{EngineConfig, PlacementConfig};
pub use element::{Element, ElementDraft, ElementId, ElementPatch, LayoutRecord};
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use events::{EngineEvent, Hooks, Listener};
pub use frame::{MoveCoalescer, PendingMove};
pub use group::{Group, GroupId, GroupManager, RelativePlacement, ResizeConstraints};
pub use handles::{Anchor, ResizeHandle, bounds_handles, hit_test_handles};
pub use input::{Modifiers, PointerEvent, PointerTarget};
pub use selection::Selection;
pub use session::{Interaction, InteractionKind};
pub use snap::{
    DragSnap, Orientation, SnapBox, SnapKind, SnapLine, SnapLineId, SnapRule, compute_drag_snap, compute_resize_snap,
    snap_to_grid,
};
pub use store::ElementStore;

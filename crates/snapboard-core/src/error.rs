//! Error types for engine operations.

use crate::element::ElementId;
use crate::group::GroupId;
use crate::handles::Anchor;
use crate::session::InteractionKind;
use thiserror::Error;

/// Engine errors.
///
/// None of these are fatal: every failure leaves the engine in the state it
/// was in before the call, and the caller may retry with valid input.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Element not found: {0}")]
    UnknownElement(ElementId),
    #[error("Group not found: {0}")]
    UnknownGroup(GroupId),
    #[error("Grouping needs at least 2 elements, {found} resolved")]
    InsufficientSelection { found: usize },
    #[error("Bounds are degenerate or not finite")]
    DegenerateBounds,
    #[error("Another interaction is active: {0:?}")]
    InteractionActive(InteractionKind),
    #[error("Anchor {0:?} is not supported here")]
    UnsupportedAnchor(Anchor),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Layout error: {0}")]
    Layout(serde_json::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

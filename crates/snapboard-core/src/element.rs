//! Canvas elements and their plain-record forms.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an element.
pub type ElementId = Uuid;

/// A rectangular element on the workspace.
///
/// Elements are plain geometry plus content. Interaction bookkeeping lives in
/// the session state, never on the element itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub(crate) id: ElementId,
    /// Top-left corner, workspace-local.
    pub position: Point,
    /// Width of the element.
    pub width: f64,
    /// Height of the element.
    pub height: f64,
    /// Opaque display payload.
    pub content: String,
}

impl Element {
    /// Create a new element with a fresh ID.
    pub fn new(position: Point, width: f64, height: f64, content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), position, width, height, content)
    }

    /// Create an element with a specific ID (layout import).
    pub fn with_id(id: ElementId, position: Point, width: f64, height: f64, content: impl Into<String>) -> Self {
        Self {
            id,
            position,
            width,
            height,
            content: content.into(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Axis-aligned bounds of the element.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size())
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Replace position and size from a bounds rectangle.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.position = Point::new(bounds.x0, bounds.y0);
        self.width = bounds.width();
        self.height = bounds.height();
    }

    /// Apply a patch. Returns false (and changes nothing) if the patch would
    /// produce non-finite coordinates or a non-positive size.
    pub fn apply(&mut self, patch: &ElementPatch) -> bool {
        let x = patch.x.unwrap_or(self.position.x);
        let y = patch.y.unwrap_or(self.position.y);
        let width = patch.width.unwrap_or(self.width);
        let height = patch.height.unwrap_or(self.height);
        if !valid_geometry(x, y, width, height) {
            return false;
        }
        self.position = Point::new(x, y);
        self.width = width;
        self.height = height;
        if let Some(content) = &patch.content {
            self.content.clone_from(content);
        }
        true
    }

    /// The plain persistence record for this element.
    pub fn to_record(&self) -> LayoutRecord {
        LayoutRecord {
            id: self.id,
            x: self.position.x,
            y: self.position.y,
            width: self.width,
            height: self.height,
            content: self.content.clone(),
        }
    }
}

/// Finite coordinates and a strictly positive, finite size.
pub fn valid_geometry(x: f64, y: f64, width: f64, height: f64) -> bool {
    x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0
}

/// A partial element handed to the store; missing fields get defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementDraft {
    pub id: Option<ElementId>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub content: Option<String>,
}

impl ElementDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn id(mut self, id: ElementId) -> Self {
        self.id = Some(id);
        self
    }
}

impl From<LayoutRecord> for ElementDraft {
    fn from(record: LayoutRecord) -> Self {
        Self {
            id: Some(record.id),
            x: Some(record.x),
            y: Some(record.y),
            width: Some(record.width),
            height: Some(record.height),
            content: Some(record.content),
        }
    }
}

/// Field updates for an existing element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub content: Option<String>,
}

impl ElementPatch {
    /// A patch that moves and resizes to `bounds`.
    pub fn bounds(bounds: Rect) -> Self {
        Self {
            x: Some(bounds.x0),
            y: Some(bounds.y0),
            width: Some(bounds.width()),
            height: Some(bounds.height()),
            content: None,
        }
    }

    /// A patch that only moves.
    pub fn position(position: Point) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            ..Self::default()
        }
    }
}

/// Plain geometry record exchanged with the host at the persistence boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub content: String,
}

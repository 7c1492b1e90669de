//! Alignment snapping between a moving box and its neighbours.

use crate::element::ElementId;
use crate::geometry::within;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction a guide line is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// What produced a guide, for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapKind {
    Edge,
    Center,
    SizeMatch,
}

/// One snap test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapRule {
    CenterX,
    CenterY,
    Left,
    Right,
    Top,
    Bottom,
    WidthMatch,
    HeightMatch,
}

impl SnapRule {
    /// Alignment tests in evaluation order. Later matches on the same axis
    /// override earlier ones.
    pub const ALIGNMENT: [SnapRule; 6] = [
        SnapRule::CenterX,
        SnapRule::CenterY,
        SnapRule::Left,
        SnapRule::Right,
        SnapRule::Top,
        SnapRule::Bottom,
    ];

    pub fn orientation(self) -> Orientation {
        match self {
            SnapRule::CenterX | SnapRule::Left | SnapRule::Right | SnapRule::HeightMatch => Orientation::Vertical,
            SnapRule::CenterY | SnapRule::Top | SnapRule::Bottom | SnapRule::WidthMatch => Orientation::Horizontal,
        }
    }

    pub fn kind(self) -> SnapKind {
        match self {
            SnapRule::CenterX | SnapRule::CenterY => SnapKind::Center,
            SnapRule::Left | SnapRule::Right | SnapRule::Top | SnapRule::Bottom => SnapKind::Edge,
            SnapRule::WidthMatch | SnapRule::HeightMatch => SnapKind::SizeMatch,
        }
    }

    /// The coordinate (or dimension) of `rect` this rule compares.
    fn coordinate(self, rect: Rect) -> f64 {
        match self {
            SnapRule::CenterX => rect.center().x,
            SnapRule::CenterY => rect.center().y,
            SnapRule::Left => rect.x0,
            SnapRule::Right => rect.x1,
            SnapRule::Top => rect.y0,
            SnapRule::Bottom => rect.y1,
            SnapRule::WidthMatch => rect.width(),
            SnapRule::HeightMatch => rect.height(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            SnapRule::CenterX => "center-x",
            SnapRule::CenterY => "center-y",
            SnapRule::Left => "left",
            SnapRule::Right => "right",
            SnapRule::Top => "top",
            SnapRule::Bottom => "bottom",
            SnapRule::WidthMatch => "width-match",
            SnapRule::HeightMatch => "height-match",
        }
    }
}

/// Identifies a guide by the rule and the element it aligns with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapLineId {
    pub rule: SnapRule,
    pub target: ElementId,
}

impl fmt::Display for SnapLineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.rule.name(), self.target)
    }
}

/// A render-only alignment guide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapLine {
    pub id: SnapLineId,
    pub orientation: Orientation,
    /// x for vertical lines, y for horizontal lines.
    pub position: f64,
    /// Extent along the other axis as (start, end).
    pub span: (f64, f64),
    pub kind: SnapKind,
}

/// A box taking part in snapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapBox {
    pub id: ElementId,
    pub bounds: Rect,
}

impl SnapBox {
    pub fn new(id: ElementId, bounds: Rect) -> Self {
        Self { id, bounds }
    }
}

/// Result of snapping a drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSnap {
    /// Corrected top-left of the moving box.
    pub position: Point,
    pub guides: Vec<SnapLine>,
}

impl DragSnap {
    pub fn is_snapped(&self) -> bool {
        !self.guides.is_empty()
    }
}

fn alignment_guide(rule: SnapRule, moving: Rect, target: &SnapBox) -> SnapLine {
    let span = match rule.orientation() {
        Orientation::Vertical => (moving.y0.min(target.bounds.y0), moving.y1.max(target.bounds.y1)),
        Orientation::Horizontal => (moving.x0.min(target.bounds.x0), moving.x1.max(target.bounds.x1)),
    };
    SnapLine {
        id: SnapLineId { rule, target: target.id },
        orientation: rule.orientation(),
        position: rule.coordinate(target.bounds),
        span,
        kind: rule.kind(),
    }
}

/// Snap a dragged box against `others`.
///
/// Every candidate is tested against the box at its uncorrected position, in
/// the order given, with the six alignment rules. Each match adds a guide
/// and overwrites the corrected coordinate on its axis, so the last match
/// per axis wins. Candidates sharing the moving box's id are skipped.
pub fn compute_drag_snap(moving: SnapBox, others: &[SnapBox], snap_distance: f64) -> DragSnap {
    let bounds = moving.bounds;
    let mut position = bounds.origin();
    let mut guides = Vec::new();

    for other in others.iter().filter(|other| other.id != moving.id) {
        for rule in SnapRule::ALIGNMENT {
            let current = rule.coordinate(bounds);
            let target = rule.coordinate(other.bounds);
            if !within(current, target, snap_distance) {
                continue;
            }
            let correction = target - current;
            match rule.orientation() {
                Orientation::Vertical => position.x = bounds.x0 + correction,
                Orientation::Horizontal => position.y = bounds.y0 + correction,
            }
            guides.push(alignment_guide(rule, bounds, other));
        }
    }

    DragSnap { position, guides }
}

/// Guides for a box being resized. Nothing is corrected.
///
/// Runs the six alignment rules plus width and height matching. A width
/// match is drawn as a horizontal line along the moving box's bottom edge, a
/// height match as a vertical line along its right edge.
pub fn compute_resize_snap(moving: SnapBox, others: &[SnapBox], snap_distance: f64) -> Vec<SnapLine> {
    let bounds = moving.bounds;
    let mut guides = Vec::new();

    for other in others.iter().filter(|other| other.id != moving.id) {
        for rule in SnapRule::ALIGNMENT {
            if within(rule.coordinate(bounds), rule.coordinate(other.bounds), snap_distance) {
                guides.push(alignment_guide(rule, bounds, other));
            }
        }

        for rule in [SnapRule::WidthMatch, SnapRule::HeightMatch] {
            if !within(rule.coordinate(bounds), rule.coordinate(other.bounds), snap_distance) {
                continue;
            }
            let (position, span) = match rule.orientation() {
                Orientation::Horizontal => (bounds.y1, (bounds.x0, bounds.x1)),
                Orientation::Vertical => (bounds.x1, (bounds.y0, bounds.y1)),
            };
            guides.push(SnapLine {
                id: SnapLineId { rule, target: other.id },
                orientation: rule.orientation(),
                position,
                span,
                kind: SnapKind::SizeMatch,
            });
        }
    }

    guides
}

/// Round a value to the nearest multiple of `grid_size`. Non-positive grids
/// leave the value alone.
pub fn snap_to_grid(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return value;
    }
    (value / grid_size).round() * grid_size
}

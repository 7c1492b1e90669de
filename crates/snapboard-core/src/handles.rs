//! Resize anchors and handle geometry.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// The handle a resize is driven from.
///
/// A corner anchor moves the two edges that meet at it, an edge anchor moves
/// only its own edge, and `Center` scales uniformly about the middle (group
/// resize only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
    Center,
}

impl Anchor {
    /// All anchors in handle order: corners, edge midpoints, center.
    pub const ALL: [Anchor; 9] = [
        Anchor::NW,
        Anchor::NE,
        Anchor::SW,
        Anchor::SE,
        Anchor::N,
        Anchor::S,
        Anchor::E,
        Anchor::W,
        Anchor::Center,
    ];

    pub fn moves_west(self) -> bool {
        matches!(self, Anchor::W | Anchor::NW | Anchor::SW)
    }

    pub fn moves_east(self) -> bool {
        matches!(self, Anchor::E | Anchor::NE | Anchor::SE)
    }

    pub fn moves_north(self) -> bool {
        matches!(self, Anchor::N | Anchor::NW | Anchor::NE)
    }

    pub fn moves_south(self) -> bool {
        matches!(self, Anchor::S | Anchor::SW | Anchor::SE)
    }

    /// Whether dragging this anchor changes the width.
    pub fn resizes_width(self) -> bool {
        self.moves_west() || self.moves_east() || self == Anchor::Center
    }

    /// Whether dragging this anchor changes the height.
    pub fn resizes_height(self) -> bool {
        self.moves_north() || self.moves_south() || self == Anchor::Center
    }

    /// Convert a pointer delta into size growth.
    ///
    /// Dragging a west or north handle outward (negative delta) grows the box.
    /// Axes the anchor does not own get zero growth. `Center` returns the raw
    /// delta; callers turn it into a uniform scale.
    pub fn growth_from_pointer(self, delta: Vec2) -> Vec2 {
        if self == Anchor::Center {
            return delta;
        }
        let x = if self.moves_west() {
            -delta.x
        } else if self.moves_east() {
            delta.x
        } else {
            0.0
        };
        let y = if self.moves_north() {
            -delta.y
        } else if self.moves_south() {
            delta.y
        } else {
            0.0
        };
        Vec2::new(x, y)
    }

    /// Position a box of `size` so the edges this anchor does not move stay
    /// where they are in `rect`. `Center` keeps the center fixed.
    pub fn place(self, rect: Rect, size: Size) -> Rect {
        let center = rect.center();
        let x0 = if self == Anchor::Center {
            center.x - size.width / 2.0
        } else if self.moves_west() {
            rect.x1 - size.width
        } else {
            rect.x0
        };
        let y0 = if self == Anchor::Center {
            center.y - size.height / 2.0
        } else if self.moves_north() {
            rect.y1 - size.height
        } else {
            rect.y0
        };
        Rect::from_origin_size(Point::new(x0, y0), size)
    }

    /// Where this anchor's handle sits on `rect`.
    pub fn point_on(self, rect: Rect) -> Point {
        let center = rect.center();
        let x = if self.moves_west() {
            rect.x0
        } else if self.moves_east() {
            rect.x1
        } else {
            center.x
        };
        let y = if self.moves_north() {
            rect.y0
        } else if self.moves_south() {
            rect.y1
        } else {
            center.y
        };
        Point::new(x, y)
    }

    /// Conventional cursor name for the handle.
    pub fn cursor(self) -> &'static str {
        match self {
            Anchor::N => "n-resize",
            Anchor::S => "s-resize",
            Anchor::E => "e-resize",
            Anchor::W => "w-resize",
            Anchor::NE => "ne-resize",
            Anchor::NW => "nw-resize",
            Anchor::SE => "se-resize",
            Anchor::SW => "sw-resize",
            Anchor::Center => "move",
        }
    }
}

/// A group resize handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeHandle {
    /// Which anchor the handle drives.
    pub anchor: Anchor,
    /// Center of the handle in workspace coordinates.
    pub position: Point,
    /// The square the handle occupies.
    pub rect: Rect,
}

impl ResizeHandle {
    pub fn new(anchor: Anchor, position: Point, size: f64) -> Self {
        let half = size / 2.0;
        Self {
            anchor,
            position,
            rect: Rect::new(position.x - half, position.y - half, position.x + half, position.y + half),
        }
    }

    /// Check if a point hits this handle (edges inclusive).
    pub fn hit_test(&self, point: Point) -> bool {
        point.x >= self.rect.x0 && point.x <= self.rect.x1 && point.y >= self.rect.y0 && point.y <= self.rect.y1
    }
}

/// The nine handles of a bounding box, in `Anchor::ALL` order.
pub fn bounds_handles(bounds: Rect, size: f64) -> Vec<ResizeHandle> {
    Anchor::ALL
        .iter()
        .map(|&anchor| ResizeHandle::new(anchor, anchor.point_on(bounds), size))
        .collect()
}

/// Find which handle (if any) is hit at the given point.
pub fn hit_test_handles(handles: &[ResizeHandle], point: Point) -> Option<Anchor> {
    handles.iter().find(|handle| handle.hit_test(point)).map(|handle| handle.anchor)
}

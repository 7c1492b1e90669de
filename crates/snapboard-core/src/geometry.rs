//! Bounding-box arithmetic shared by the sessions and the group manager.

use crate::handles::Anchor;
use kurbo::{Point, Rect, Size, Vec2};

/// Union of a sequence of boxes. `None` if empty or any coordinate is not finite.
pub fn union_bounds<I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    let mut result: Option<Rect> = None;
    for rect in rects {
        result = Some(match result {
            Some(r) => r.union(rect),
            None => rect,
        });
    }
    result.filter(is_finite)
}

pub fn is_finite(rect: &Rect) -> bool {
    rect.x0.is_finite() && rect.y0.is_finite() && rect.x1.is_finite() && rect.y1.is_finite()
}

/// Zero-area or non-finite.
pub fn is_degenerate(rect: &Rect) -> bool {
    !is_finite(rect) || rect.width() <= 0.0 || rect.height() <= 0.0
}

/// Clamp a box origin so the box stays inside `[0, container]` on both axes.
///
/// When the box is larger than the container the origin is pinned to 0.
pub fn clamp_origin(origin: Point, size: Size, container: Size) -> Point {
    Point::new(
        origin.x.min(container.width - size.width).max(0.0),
        origin.y.min(container.height - size.height).max(0.0),
    )
}

/// Reduce `delta` so that translating `bounds` by it keeps the whole box
/// inside the container.
pub fn clamp_translation(bounds: Rect, delta: Vec2, container: Size) -> Vec2 {
    let target = clamp_origin(bounds.origin() + delta, bounds.size(), container);
    target - bounds.origin()
}

/// Mean of a set of points.
pub fn centroid<I>(points: I) -> Option<Point>
where
    I: IntoIterator<Item = Point>,
{
    let mut sum = Vec2::ZERO;
    let mut count = 0usize;
    for point in points {
        sum += point.to_vec2();
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some((sum / count as f64).to_point())
}

/// Strict proximity test used by all snap rules.
pub fn within(a: f64, b: f64, distance: f64) -> bool {
    (a - b).abs() < distance
}

/// Grow `rect` by `growth` from `anchor`, keeping the anchor's fixed edges in place.
///
/// Growth on an axis the anchor does not own is ignored.
pub fn resize_by_growth(rect: Rect, anchor: Anchor, growth: Vec2) -> Rect {
    let width = if anchor.resizes_width() { rect.width() + growth.x } else { rect.width() };
    let height = if anchor.resizes_height() { rect.height() + growth.y } else { rect.height() };
    anchor.place(rect, Size::new(width, height))
}

/// Bring a freshly resized box back to rest.
///
/// Width/height below `min` are raised with the anchor's fixed edge kept in
/// place. A box that crosses the container origin gives up the overflow from
/// its size instead of sliding, so the opposite edge stays put. Far edges are
/// trimmed to the container, and if that undercuts the minimum the box slides
/// back inside.
pub fn settle_resized(rect: Rect, anchor: Anchor, min: Size, container: Size) -> Rect {
    let size = Size::new(rect.width().max(min.width), rect.height().max(min.height));
    let placed = anchor.place(rect, size);

    let mut x0 = placed.x0;
    let mut y0 = placed.y0;
    let mut width = placed.width();
    let mut height = placed.height();

    if x0 < 0.0 {
        width += x0;
        x0 = 0.0;
    }
    if y0 < 0.0 {
        height += y0;
        y0 = 0.0;
    }
    if x0 + width > container.width {
        width = container.width - x0;
    }
    if y0 + height > container.height {
        height = container.height - y0;
    }

    if width < min.width {
        width = min.width;
        x0 = x0.min(container.width - width).max(0.0);
    }
    if height < min.height {
        height = min.height;
        y0 = y0.min(container.height - height).max(0.0);
    }

    Rect::from_origin_size(Point::new(x0, y0), Size::new(width, height))
}

//! Groups: element sets whose relative layout survives group transforms.

use crate::element::ElementId;
use crate::error::{EngineError, EngineResult};
use crate::geometry::{is_degenerate, union_bounds};
use crate::handles::{Anchor, ResizeHandle, bounds_handles, hit_test_handles};
use crate::snap::snap_to_grid;
use crate::store::ElementStore;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

/// Smallest group box, as a fraction of the box at creation.
pub const GROUP_MIN_SCALE: f64 = 0.1;
/// Largest group box, as a multiple of the box at creation.
pub const GROUP_MAX_SCALE: f64 = 5.0;
/// A member never gets wider or taller than this share of the group box.
pub const MEMBER_MAX_FRACTION: f64 = 0.8;
/// Floor on member size after a group resize.
pub const MEMBER_MIN_SIZE: Size = Size::new(20.0, 15.0);

/// A member's slot inside the group box, as fractions of `initial_bounds`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativePlacement {
    pub element: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RelativePlacement {
    fn capture(element: ElementId, bounds: Rect, group: Rect) -> Self {
        Self {
            element,
            x: (bounds.x0 - group.x0) / group.width(),
            y: (bounds.y0 - group.y0) / group.height(),
            width: bounds.width() / group.width(),
            height: bounds.height() / group.height(),
        }
    }

    /// Absolute geometry of this slot inside `group`, with the member size
    /// limits applied. Any size the limits take away (or add) is split evenly
    /// on both sides so the member stays centred in its slot.
    pub fn resolve(&self, group: Rect) -> Rect {
        let raw = Size::new(self.width * group.width(), self.height * group.height());
        let width = raw.width.min(group.width() * MEMBER_MAX_FRACTION).max(MEMBER_MIN_SIZE.width);
        let height = raw.height.min(group.height() * MEMBER_MAX_FRACTION).max(MEMBER_MIN_SIZE.height);
        let origin = Point::new(
            group.x0 + self.x * group.width() + (raw.width - width) / 2.0,
            group.y0 + self.y * group.height() + (raw.height - height) / 2.0,
        );
        Rect::from_origin_size(origin, Size::new(width, height))
    }
}

/// A group record. Membership and placements are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub(crate) id: GroupId,
    members: Vec<ElementId>,
    initial_bounds: Rect,
    placements: Vec<RelativePlacement>,
}

impl Group {
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Member ids in creation order.
    pub fn members(&self) -> &[ElementId] {
        &self.members
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.members.contains(&element)
    }

    /// Union of the members' boxes when the group was created.
    pub fn initial_bounds(&self) -> Rect {
        self.initial_bounds
    }

    pub fn placements(&self) -> &[RelativePlacement] {
        &self.placements
    }
}

/// Options for [`GroupManager::constrained_resize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConstraints {
    /// Keep the live width/height ratio; the larger delta drives.
    pub maintain_aspect_ratio: bool,
    /// Round the target size to multiples of `grid_size`.
    pub snap_to_grid: bool,
    pub grid_size: f64,
    /// Scale limits relative to the group's initial bounds.
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ResizeConstraints {
    fn default() -> Self {
        Self {
            maintain_aspect_ratio: false,
            snap_to_grid: false,
            grid_size: 10.0,
            min_scale: GROUP_MIN_SCALE,
            max_scale: GROUP_MAX_SCALE,
        }
    }
}

/// Owns every group, in creation order.
///
/// Geometry always lives in the element store; the manager only keeps the
/// fractional placements it needs to replay resizes.
#[derive(Debug, Clone, Default)]
pub struct GroupManager {
    groups: Vec<Group>,
}

impl GroupManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn get(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    fn require(&self, id: GroupId) -> EngineResult<&Group> {
        self.get(id).ok_or(EngineError::UnknownGroup(id))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Create a group from `ids`.
    ///
    /// Unknown ids and repeats are dropped. Fails without side effects if
    /// fewer than two elements resolve or their union is degenerate.
    pub fn create(&mut self, store: &ElementStore, ids: &[ElementId]) -> EngineResult<GroupId> {
        let mut members: Vec<ElementId> = Vec::with_capacity(ids.len());
        for &id in ids {
            if store.contains(id) && !members.contains(&id) {
                members.push(id);
            }
        }
        if members.len() < 2 {
            return Err(EngineError::InsufficientSelection { found: members.len() });
        }

        let boxes: Vec<(ElementId, Rect)> = members
            .iter()
            .filter_map(|&id| store.get(id).map(|element| (id, element.bounds())))
            .collect();
        let initial_bounds = union_bounds(boxes.iter().map(|&(_, bounds)| bounds)).ok_or(EngineError::DegenerateBounds)?;
        if is_degenerate(&initial_bounds) {
            return Err(EngineError::DegenerateBounds);
        }

        let placements = boxes
            .iter()
            .map(|&(id, bounds)| RelativePlacement::capture(id, bounds, initial_bounds))
            .collect();
        let group = Group {
            id: Uuid::new_v4(),
            members,
            initial_bounds,
            placements,
        };
        let id = group.id;
        log::debug!("Created group {id} with {} members, bounds {initial_bounds:?}", group.members.len());
        self.groups.push(group);
        Ok(id)
    }

    /// Delete a group record. Members keep their current geometry.
    pub fn ungroup(&mut self, id: GroupId) -> EngineResult<Group> {
        let index = self
            .groups
            .iter()
            .position(|group| group.id == id)
            .ok_or(EngineError::UnknownGroup(id))?;
        log::debug!("Ungrouped {id}");
        Ok(self.groups.remove(index))
    }

    /// Delete every group containing any of `elements`. Returns the removed ids.
    pub fn ungroup_containing(&mut self, elements: &[ElementId]) -> Vec<GroupId> {
        let mut removed = Vec::new();
        self.groups.retain(|group| {
            let hit = elements.iter().any(|&element| group.contains(element));
            if hit {
                removed.push(group.id);
            }
            !hit
        });
        if !removed.is_empty() {
            log::debug!("Ungrouped {} groups", removed.len());
        }
        removed
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// First group (in creation order) containing `element`.
    pub fn group_of(&self, element: ElementId) -> Option<GroupId> {
        self.groups.iter().find(|group| group.contains(element)).map(Group::id)
    }

    /// Members that still exist in the store, in member order.
    pub fn members(&self, store: &ElementStore, id: GroupId) -> Vec<ElementId> {
        self.get(id)
            .map(|group| group.members.iter().copied().filter(|&member| store.contains(member)).collect())
            .unwrap_or_default()
    }

    /// Live bounds of the resolvable members.
    pub fn bounds(&self, store: &ElementStore, id: GroupId) -> Option<Rect> {
        let group = self.get(id)?;
        union_bounds(group.members.iter().filter_map(|&member| store.get(member)).map(|element| element.bounds()))
    }

    fn live_bounds(&self, store: &ElementStore, id: GroupId) -> EngineResult<Rect> {
        self.require(id)?;
        let bounds = self.bounds(store, id).ok_or(EngineError::DegenerateBounds)?;
        if is_degenerate(&bounds) {
            return Err(EngineError::DegenerateBounds);
        }
        Ok(bounds)
    }

    /// Translate every member by `delta`.
    pub fn move_group(&self, store: &mut ElementStore, id: GroupId, delta: Vec2) -> EngineResult<()> {
        let group = self.require(id)?;
        for &member in &group.members {
            if let Some(element) = store.get_mut(member) {
                element.position += delta;
            }
        }
        log::trace!("Moved group {id} by {delta:?}");
        Ok(())
    }

    /// Resize the group's live box by `growth` from `anchor`.
    ///
    /// Positive growth always enlarges. Returns the new group box.
    pub fn resize(&self, store: &mut ElementStore, id: GroupId, growth: Vec2, anchor: Anchor) -> EngineResult<Rect> {
        let base = self.live_bounds(store, id)?;
        self.resize_from(store, id, base, growth, anchor)
    }

    /// Resize as if the group box were `base`. Sessions use this with the box
    /// captured at start so repeated moves don't compound.
    pub(crate) fn resize_from(
        &self,
        store: &mut ElementStore,
        id: GroupId,
        base: Rect,
        growth: Vec2,
        anchor: Anchor,
    ) -> EngineResult<Rect> {
        let group = self.require(id)?;
        if is_degenerate(&base) {
            return Err(EngineError::DegenerateBounds);
        }

        let target = if anchor == Anchor::Center {
            let scale = (1.0 + growth.x / base.width()).min(1.0 + growth.y / base.height());
            Size::new(base.width() * scale, base.height() * scale)
        } else {
            Size::new(
                base.width() + if anchor.resizes_width() { growth.x } else { 0.0 },
                base.height() + if anchor.resizes_height() { growth.y } else { 0.0 },
            )
        };
        if !target.width.is_finite() || !target.height.is_finite() {
            return Err(EngineError::InvalidGeometry(format!("group size {target:?}")));
        }

        let initial = group.initial_bounds.size();
        let size = Size::new(
            target.width.clamp(initial.width * GROUP_MIN_SCALE, initial.width * GROUP_MAX_SCALE),
            target.height.clamp(initial.height * GROUP_MIN_SCALE, initial.height * GROUP_MAX_SCALE),
        );
        let next = anchor.place(base, size);

        for placement in &group.placements {
            if let Some(element) = store.get_mut(placement.element) {
                element.set_bounds(placement.resolve(next));
            }
        }
        log::debug!("Resized group {id} from {anchor:?}: {base:?} -> {next:?}");
        Ok(next)
    }

    /// Resize from a pointer movement on `anchor`'s handle.
    pub fn smart_resize(
        &self,
        store: &mut ElementStore,
        id: GroupId,
        start: Point,
        current: Point,
        anchor: Anchor,
    ) -> EngineResult<Rect> {
        let base = self.live_bounds(store, id)?;
        self.smart_resize_from(store, id, base, current - start, anchor)
    }

    pub(crate) fn smart_resize_from(
        &self,
        store: &mut ElementStore,
        id: GroupId,
        base: Rect,
        pointer_delta: Vec2,
        anchor: Anchor,
    ) -> EngineResult<Rect> {
        let growth = if anchor == Anchor::Center {
            if is_degenerate(&base) {
                return Err(EngineError::DegenerateBounds);
            }
            let scale = (1.0 + pointer_delta.x / base.width()).min(1.0 + pointer_delta.y / base.height());
            Vec2::new(base.width() * (scale - 1.0), base.height() * (scale - 1.0))
        } else {
            anchor.growth_from_pointer(pointer_delta)
        };
        self.resize_from(store, id, base, growth, anchor)
    }

    /// Resize with optional aspect lock, grid rounding and scale limits.
    pub fn constrained_resize(
        &self,
        store: &mut ElementStore,
        id: GroupId,
        growth: Vec2,
        anchor: Anchor,
        constraints: &ResizeConstraints,
    ) -> EngineResult<Rect> {
        let base = self.live_bounds(store, id)?;
        let initial = self.require(id)?.initial_bounds.size();

        let mut width = base.width() + growth.x;
        let mut height = base.height() + growth.y;

        if constraints.maintain_aspect_ratio {
            let aspect = base.width() / base.height();
            if growth.x.abs() > growth.y.abs() {
                height = width / aspect;
            } else {
                width = height * aspect;
            }
        }

        if constraints.snap_to_grid {
            width = snap_to_grid(width, constraints.grid_size);
            height = snap_to_grid(height, constraints.grid_size);
        }

        let scale_x = width / initial.width;
        let scale_y = height / initial.height;
        let in_range = |scale: f64| scale >= constraints.min_scale && scale <= constraints.max_scale;
        if !in_range(scale_x) || !in_range(scale_y) {
            let scale = scale_x.min(scale_y).max(constraints.min_scale).min(constraints.max_scale);
            width = initial.width * scale;
            height = initial.height * scale;
        }

        let final_growth = Vec2::new(width - base.width(), height - base.height());
        self.resize_from(store, id, base, final_growth, anchor)
    }

    /// The nine handles on the group's live bounds. Empty if it has none.
    pub fn handles(&self, store: &ElementStore, id: GroupId, handle_size: f64) -> Vec<ResizeHandle> {
        self.bounds(store, id)
            .map(|bounds| bounds_handles(bounds, handle_size))
            .unwrap_or_default()
    }

    /// Which of the group's handles (if any) `point` falls on.
    pub fn handle_at(&self, store: &ElementStore, id: GroupId, point: Point, handle_size: f64) -> Option<Anchor> {
        hit_test_handles(&self.handles(store, id, handle_size), point)
    }
}

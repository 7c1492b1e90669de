//! Interaction sessions and the single current-interaction state.

use crate::element::{Element, ElementId};
use crate::error::EngineResult;
use crate::geometry::{centroid, clamp_origin, clamp_translation, resize_by_growth, settle_resized};
use crate::group::{GroupId, GroupManager};
use crate::handles::Anchor;
use crate::snap::{SnapBox, SnapLine, compute_drag_snap, compute_resize_snap};
use crate::store::ElementStore;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Discriminant of [`Interaction`], cheap to copy into errors and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Idle,
    Dragging,
    Resizing,
    MultiDragging,
    GroupDragging,
    GroupResizing,
    Marquee,
}

/// The one interaction in progress. Only the active session writes geometry.
#[derive(Debug, Clone, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging(DragSession),
    Resizing(ResizeSession),
    MultiDragging(MultiDragSession),
    GroupDragging(GroupDragSession),
    GroupResizing(GroupResizeSession),
    Marquee(MarqueeSession),
}

impl Interaction {
    pub fn kind(&self) -> InteractionKind {
        match self {
            Interaction::Idle => InteractionKind::Idle,
            Interaction::Dragging(_) => InteractionKind::Dragging,
            Interaction::Resizing(_) => InteractionKind::Resizing,
            Interaction::MultiDragging(_) => InteractionKind::MultiDragging,
            Interaction::GroupDragging(_) => InteractionKind::GroupDragging,
            Interaction::GroupResizing(_) => InteractionKind::GroupResizing,
            Interaction::Marquee(_) => InteractionKind::Marquee,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// Put every element this session touched back where it started.
    pub fn restore(&self, store: &mut ElementStore) {
        match self {
            Interaction::Idle | Interaction::Marquee(_) => {}
            Interaction::Dragging(session) => restore_bounds(store, &[(session.element, session.start_bounds)]),
            Interaction::Resizing(session) => restore_bounds(store, &[(session.element, session.start_bounds)]),
            Interaction::MultiDragging(session) => {
                for member in &session.members {
                    if let Some(element) = store.get_mut(member.element) {
                        element.position = member.start;
                    }
                }
            }
            Interaction::GroupDragging(session) => restore_bounds(store, &session.snapshot),
            Interaction::GroupResizing(session) => restore_bounds(store, &session.snapshot),
        }
    }
}

fn restore_bounds(store: &mut ElementStore, snapshot: &[(ElementId, Rect)]) {
    for &(id, bounds) in snapshot {
        if let Some(element) = store.get_mut(id) {
            element.set_bounds(bounds);
        }
    }
}

fn member_snapshot(groups: &GroupManager, store: &ElementStore, group: GroupId) -> Vec<(ElementId, Rect)> {
    groups
        .members(store, group)
        .into_iter()
        .filter_map(|id| store.get(id).map(|element| (id, element.bounds())))
        .collect()
}

/// Every element except `moving`, in store order, as snap candidates.
fn snap_candidates(store: &ElementStore, moving: ElementId) -> Vec<SnapBox> {
    store
        .elements_ordered()
        .filter(|element| element.id() != moving)
        .map(|element| SnapBox::new(element.id(), element.bounds()))
        .collect()
}

/// Single-element drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub element: ElementId,
    /// Pointer position minus element origin at start.
    pub pointer_offset: Vec2,
    pub start_bounds: Rect,
}

impl DragSession {
    pub fn begin(element: &Element, pointer: Point) -> Self {
        Self {
            element: element.id(),
            pointer_offset: pointer - element.position,
            start_bounds: element.bounds(),
        }
    }

    /// Move the element under `pointer`: clamp, snap, clamp again, commit.
    ///
    /// `snap_distance` of `None` disables snapping. Returns the committed
    /// bounds and the guides to draw, or `None` if the element is gone.
    pub fn update(
        &self,
        store: &mut ElementStore,
        pointer: Point,
        container: Size,
        snap_distance: Option<f64>,
    ) -> Option<(Rect, Vec<SnapLine>)> {
        let size = store.get(self.element)?.size();
        let clamped = clamp_origin(pointer - self.pointer_offset, size, container);

        let (position, guides) = match snap_distance {
            Some(distance) => {
                let moving = SnapBox::new(self.element, Rect::from_origin_size(clamped, size));
                let snap = compute_drag_snap(moving, &snap_candidates(store, self.element), distance);
                (clamp_origin(snap.position, size, container), snap.guides)
            }
            None => (clamped, Vec::new()),
        };

        let element = store.get_mut(self.element)?;
        element.position = position;
        Some((element.bounds(), guides))
    }
}

/// Single-element resize from one of the eight edge/corner anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub element: ElementId,
    pub anchor: Anchor,
    pub start_pointer: Point,
    pub start_bounds: Rect,
}

impl ResizeSession {
    pub fn begin(element: &Element, pointer: Point, anchor: Anchor) -> Self {
        Self {
            element: element.id(),
            anchor,
            start_pointer: pointer,
            start_bounds: element.bounds(),
        }
    }

    /// Resize from the start geometry by the total pointer movement, settle
    /// against the minimum size and container, then collect display guides.
    pub fn update(
        &self,
        store: &mut ElementStore,
        pointer: Point,
        container: Size,
        min_size: Size,
        snap_distance: Option<f64>,
    ) -> Option<(Rect, Vec<SnapLine>)> {
        let growth = self.anchor.growth_from_pointer(pointer - self.start_pointer);
        let raw = resize_by_growth(self.start_bounds, self.anchor, growth);
        let bounds = settle_resized(raw, self.anchor, min_size, container);

        store.get_mut(self.element)?.set_bounds(bounds);
        let guides = match snap_distance {
            Some(distance) => {
                compute_resize_snap(SnapBox::new(self.element, bounds), &snap_candidates(store, self.element), distance)
            }
            None => Vec::new(),
        };
        Some((bounds, guides))
    }
}

/// One member of a multi-drag, as it was at start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberStart {
    pub element: ElementId,
    pub start: Point,
    pub center: Point,
}

/// Rigid translation of the selected elements.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiDragSession {
    pub members: Vec<MemberStart>,
    /// Mean of the members' centers at start.
    pub start_centroid: Point,
    /// Pointer position minus `start_centroid`.
    pub pointer_offset: Vec2,
    /// Member pressed without modifiers. A release with no movement narrows
    /// the selection to it.
    pub clicked: Option<ElementId>,
}

impl MultiDragSession {
    /// `None` if none of `ids` resolve.
    pub fn begin(store: &ElementStore, ids: &[ElementId], pointer: Point) -> Option<Self> {
        let members: Vec<MemberStart> = ids
            .iter()
            .filter_map(|&id| store.get(id))
            .map(|element| MemberStart {
                element: element.id(),
                start: element.position,
                center: element.center(),
            })
            .collect();
        let start_centroid = centroid(members.iter().map(|member| member.center))?;
        Some(Self {
            members,
            start_centroid,
            pointer_offset: pointer - start_centroid,
            clicked: None,
        })
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.members.iter().map(|member| member.element).collect()
    }

    /// Whether every member is still at its start position.
    pub fn is_unmoved(&self, store: &ElementStore) -> bool {
        self.members
            .iter()
            .all(|member| store.get(member.element).is_none_or(|element| element.position == member.start))
    }

    /// Apply the centroid displacement to every member's start position.
    ///
    /// Each member is clamped to the container on its own, so members at a
    /// wall stop while the rest keep moving and spacing can change.
    pub fn update(&self, store: &mut ElementStore, pointer: Point, container: Size) -> Vec2 {
        let delta = (pointer - self.pointer_offset) - self.start_centroid;
        for member in &self.members {
            if let Some(element) = store.get_mut(member.element) {
                element.position = clamp_origin(member.start + delta, element.size(), container);
            }
        }
        delta
    }
}

/// Dragging a whole group by one of its members.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDragSession {
    pub group: GroupId,
    pub start_pointer: Point,
    pub start_bounds: Rect,
    /// Translation already applied to the members.
    pub applied: Vec2,
    pub snapshot: Vec<(ElementId, Rect)>,
}

impl GroupDragSession {
    pub fn begin(groups: &GroupManager, store: &ElementStore, group: GroupId, pointer: Point) -> Option<Self> {
        let start_bounds = groups.bounds(store, group)?;
        Some(Self {
            group,
            start_pointer: pointer,
            start_bounds,
            applied: Vec2::ZERO,
            snapshot: member_snapshot(groups, store, group),
        })
    }

    /// Move the group with the pointer. The group box is clamped to the
    /// container as one body, so member spacing never changes.
    pub fn update(
        &mut self,
        groups: &GroupManager,
        store: &mut ElementStore,
        pointer: Point,
        container: Size,
    ) -> EngineResult<Vec2> {
        let total = clamp_translation(self.start_bounds, pointer - self.start_pointer, container);
        let step = total - self.applied;
        if step != Vec2::ZERO {
            groups.move_group(store, self.group, step)?;
            self.applied = total;
        }
        Ok(total)
    }
}

/// Resizing a group from one of its nine handles.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupResizeSession {
    pub group: GroupId,
    pub anchor: Anchor,
    pub start_pointer: Point,
    pub start_bounds: Rect,
    pub snapshot: Vec<(ElementId, Rect)>,
}

impl GroupResizeSession {
    pub fn begin(
        groups: &GroupManager,
        store: &ElementStore,
        group: GroupId,
        pointer: Point,
        anchor: Anchor,
    ) -> Option<Self> {
        let start_bounds = groups.bounds(store, group)?;
        Some(Self {
            group,
            anchor,
            start_pointer: pointer,
            start_bounds,
            snapshot: member_snapshot(groups, store, group),
        })
    }

    /// Replay the total pointer movement against the box captured at start.
    pub fn update(&self, groups: &GroupManager, store: &mut ElementStore, pointer: Point) -> EngineResult<Rect> {
        groups.smart_resize_from(store, self.group, self.start_bounds, pointer - self.start_pointer, self.anchor)
    }
}

/// Rubber-band selection on empty canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarqueeSession {
    pub origin: Point,
    pub current: Point,
    /// Add hits to the existing selection instead of replacing it.
    pub additive: bool,
}

impl MarqueeSession {
    pub fn begin(origin: Point, additive: bool) -> Self {
        Self {
            origin,
            current: origin,
            additive,
        }
    }

    pub fn update(&mut self, pointer: Point) {
        self.current = pointer;
    }

    /// The normalised marquee rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.origin, self.current)
    }

    /// Elements lying entirely inside the marquee, in store order.
    pub fn hits(&self, store: &ElementStore) -> Vec<ElementId> {
        let rect = self.rect();
        store
            .elements_ordered()
            .filter(|element| {
                let bounds = element.bounds();
                bounds.x0 >= rect.x0 && bounds.x1 <= rect.x1 && bounds.y0 >= rect.y0 && bounds.y1 <= rect.y1
            })
            .map(Element::id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlacementConfig;
    use crate::element::ElementDraft;

    const CONTAINER: Size = Size::new(1000.0, 1000.0);
    const MIN: Size = Size::new(50.0, 30.0);

    fn store() -> ElementStore {
        ElementStore::new(PlacementConfig {
            seed: Some(11),
            ..PlacementConfig::default()
        })
    }

    fn add(store: &mut ElementStore, x: f64, y: f64, w: f64, h: f64) -> ElementId {
        store.add(ElementDraft::new().at(x, y).sized(w, h)).unwrap().id()
    }

    #[test]
    fn test_drag_keeps_pointer_offset() {
        let mut store = store();
        let id = add(&mut store, 100.0, 100.0, 120.0, 80.0);
        let session = DragSession::begin(store.get(id).unwrap(), Point::new(110.0, 120.0));
        let (bounds, guides) = session.update(&mut store, Point::new(310.0, 220.0), CONTAINER, Some(10.0)).unwrap();
        assert_eq!(bounds.origin(), Point::new(300.0, 200.0));
        assert!(guides.is_empty());
    }

    #[test]
    fn test_drag_clamps_to_container() {
        let mut store = store();
        let id = add(&mut store, 100.0, 100.0, 120.0, 80.0);
        let session = DragSession::begin(store.get(id).unwrap(), Point::new(100.0, 100.0));
        let (bounds, _) = session.update(&mut store, Point::new(-50.0, 2000.0), CONTAINER, None).unwrap();
        assert_eq!(bounds.origin(), Point::new(0.0, 920.0));
    }

    #[test]
    fn test_drag_snap_scenario() {
        let mut store = store();
        let a = add(&mut store, 100.0, 100.0, 120.0, 80.0);
        add(&mut store, 100.0, 300.0, 120.0, 80.0);
        let session = DragSession::begin(store.get(a).unwrap(), Point::new(100.0, 100.0));
        let (bounds, guides) = session.update(&mut store, Point::new(103.0, 100.0), CONTAINER, Some(10.0)).unwrap();
        assert_eq!(bounds.x0, 100.0);
        assert!(!guides.is_empty());
    }

    #[test]
    fn test_snap_result_is_reclamped() {
        let mut store = store();
        let a = add(&mut store, 0.0, 100.0, 100.0, 50.0);
        // Centre alignment with the neighbour would pull A to x = -5.
        add(&mut store, -55.0, 400.0, 200.0, 50.0);
        let session = DragSession::begin(store.get(a).unwrap(), Point::new(0.0, 100.0));
        let (bounds, guides) = session.update(&mut store, Point::new(0.0, 100.0), CONTAINER, Some(10.0)).unwrap();
        assert_eq!(guides.len(), 1);
        assert_eq!(bounds.x0, 0.0);
    }

    #[test]
    fn test_resize_nw_scenario() {
        let mut store = store();
        let id = add(&mut store, 0.0, 0.0, 100.0, 100.0);
        let session = ResizeSession::begin(store.get(id).unwrap(), Point::new(0.0, 0.0), Anchor::NW);
        let (bounds, _) = session.update(&mut store, Point::new(20.0, 20.0), CONTAINER, MIN, None).unwrap();
        assert_eq!(bounds, Rect::new(20.0, 20.0, 100.0, 100.0));
    }

    #[test]
    fn test_resize_is_absolute_from_start() {
        let mut store = store();
        let id = add(&mut store, 100.0, 100.0, 100.0, 100.0);
        let session = ResizeSession::begin(store.get(id).unwrap(), Point::new(200.0, 200.0), Anchor::SE);
        session.update(&mut store, Point::new(260.0, 230.0), CONTAINER, MIN, None);
        let (bounds, _) = session.update(&mut store, Point::new(210.0, 210.0), CONTAINER, MIN, None).unwrap();
        assert_eq!(bounds, Rect::new(100.0, 100.0, 210.0, 210.0));
    }

    #[test]
    fn test_resize_min_and_overflow() {
        let mut store = store();
        let id = add(&mut store, 10.0, 10.0, 100.0, 100.0);
        let session = ResizeSession::begin(store.get(id).unwrap(), Point::new(10.0, 10.0), Anchor::NW);
        // Outward past the origin: overflow is absorbed, far corner stays.
        let (bounds, _) = session.update(&mut store, Point::new(-40.0, -40.0), CONTAINER, MIN, None).unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 110.0, 110.0));
        // Inward past the minimum: far corner still stays.
        let (bounds, _) = session.update(&mut store, Point::new(100.0, 100.0), CONTAINER, MIN, None).unwrap();
        assert_eq!(bounds, Rect::new(60.0, 80.0, 110.0, 110.0));
    }

    #[test]
    fn test_resize_guides_include_size_match() {
        let mut store = store();
        let id = add(&mut store, 0.0, 0.0, 100.0, 100.0);
        add(&mut store, 500.0, 500.0, 120.0, 40.0);
        let session = ResizeSession::begin(store.get(id).unwrap(), Point::new(100.0, 100.0), Anchor::E);
        let (_, guides) = session.update(&mut store, Point::new(118.0, 100.0), CONTAINER, MIN, Some(10.0)).unwrap();
        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0].kind, crate::snap::SnapKind::SizeMatch);
    }

    #[test]
    fn test_multi_drag_is_rigid() {
        let mut store = store();
        let a = add(&mut store, 0.0, 0.0, 20.0, 20.0);
        let b = add(&mut store, 50.0, 50.0, 20.0, 20.0);
        let session = MultiDragSession::begin(&store, &[a, b], Point::new(40.0, 40.0)).unwrap();
        assert_eq!(session.start_centroid, Point::new(35.0, 35.0));
        let delta = session.update(&mut store, Point::new(50.0, 50.0), CONTAINER);
        assert_eq!(delta, Vec2::new(10.0, 10.0));
        assert_eq!(store.get(a).unwrap().position, Point::new(10.0, 10.0));
        assert_eq!(store.get(b).unwrap().position, Point::new(60.0, 60.0));
    }

    #[test]
    fn test_multi_drag_per_member_clamp_breaks_rigidity() {
        let mut store = store();
        let a = add(&mut store, 0.0, 0.0, 20.0, 20.0);
        let b = add(&mut store, 50.0, 50.0, 20.0, 20.0);
        let session = MultiDragSession::begin(&store, &[a, b], Point::new(35.0, 35.0)).unwrap();
        session.update(&mut store, Point::new(15.0, 35.0), CONTAINER);
        // A hits the left wall and stops; B keeps moving, so spacing shrinks.
        assert_eq!(store.get(a).unwrap().position, Point::new(0.0, 0.0));
        assert_eq!(store.get(b).unwrap().position, Point::new(30.0, 50.0));
    }

    #[test]
    fn test_group_drag_clamps_as_whole() {
        let mut store = store();
        let a = add(&mut store, 10.0, 10.0, 20.0, 20.0);
        let b = add(&mut store, 60.0, 60.0, 20.0, 20.0);
        let mut groups = GroupManager::new();
        let group = groups.create(&store, &[a, b]).unwrap();
        let mut session = GroupDragSession::begin(&groups, &store, group, Point::new(20.0, 20.0)).unwrap();
        session.update(&groups, &mut store, Point::new(0.0, 30.0), CONTAINER).unwrap();
        assert_eq!(store.get(a).unwrap().position, Point::new(0.0, 20.0));
        assert_eq!(store.get(b).unwrap().position, Point::new(50.0, 70.0));

        Interaction::GroupDragging(session).restore(&mut store);
        assert_eq!(store.get(a).unwrap().position, Point::new(10.0, 10.0));
        assert_eq!(store.get(b).unwrap().position, Point::new(60.0, 60.0));
    }

    #[test]
    fn test_group_resize_does_not_compound() {
        let mut store = store();
        let a = add(&mut store, 0.0, 0.0, 40.0, 30.0);
        let b = add(&mut store, 60.0, 50.0, 40.0, 30.0);
        let mut groups = GroupManager::new();
        let group = groups.create(&store, &[a, b]).unwrap();
        let session = GroupResizeSession::begin(&groups, &store, group, Point::new(100.0, 80.0), Anchor::SE).unwrap();
        session.update(&groups, &mut store, Point::new(150.0, 120.0)).unwrap();
        let bounds = session.update(&groups, &mut store, Point::new(150.0, 120.0)).unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 150.0, 120.0));
    }

    #[test]
    fn test_marquee_selects_fully_contained() {
        let mut store = store();
        let inside = add(&mut store, 10.0, 10.0, 50.0, 50.0);
        add(&mut store, 80.0, 80.0, 50.0, 50.0);
        let mut marquee = MarqueeSession::begin(Point::new(100.0, 100.0), false);
        marquee.update(Point::new(0.0, 0.0));
        assert_eq!(marquee.rect(), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(marquee.hits(&store), vec![inside]);
    }

    #[test]
    fn test_interaction_kind() {
        assert_eq!(Interaction::default().kind(), InteractionKind::Idle);
        let marquee = Interaction::Marquee(MarqueeSession::begin(Point::ZERO, false));
        assert_eq!(marquee.kind(), InteractionKind::Marquee);
    }
}

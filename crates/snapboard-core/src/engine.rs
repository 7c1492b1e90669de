//! The interaction engine: store, groups, selection and the active session.

use crate::config::EngineConfig;
use crate::element::{Element, ElementDraft, ElementId, ElementPatch, LayoutRecord};
use crate::error::{EngineError, EngineResult};
use crate::events::{EngineEvent, Hooks, Listener};
use crate::frame::MoveCoalescer;
use crate::group::{Group, GroupId, GroupManager, ResizeConstraints};
use crate::handles::{Anchor, ResizeHandle};
use crate::input::{PointerEvent, PointerTarget};
use crate::selection::Selection;
use crate::session::{
    DragSession, GroupDragSession, GroupResizeSession, Interaction, InteractionKind, MarqueeSession, MultiDragSession,
    ResizeSession,
};
use crate::snap::SnapLine;
use crate::store::ElementStore;
use kurbo::{Point, Rect, Size, Vec2};

/// Single-threaded layout engine driven by workspace-local pointer input.
///
/// At most one interaction is active at a time. While one is, direct
/// group transforms are refused so that only the session writes geometry.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    store: ElementStore,
    groups: GroupManager,
    selection: Selection,
    interaction: Interaction,
    guides: Vec<SnapLine>,
    frame: MoveCoalescer,
    hooks: Hooks,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let store = ElementStore::new(config.placement.clone());
        Self {
            config,
            store,
            groups: GroupManager::new(),
            selection: Selection::new(),
            interaction: Interaction::Idle,
            guides: Vec::new(),
            frame: MoveCoalescer::new(),
            hooks: Hooks::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.config.snap_enabled = enabled;
    }

    /// Register a listener for lifecycle events.
    pub fn subscribe(&mut self, listener: Listener) {
        self.hooks.subscribe(listener);
    }

    // --- Observable state ---

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn groups(&self) -> &GroupManager {
        &self.groups
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Guides produced by the last drag or resize move.
    pub fn guides(&self) -> &[SnapLine] {
        &self.guides
    }

    /// Queued moves superseded before a frame applied them.
    pub fn coalesced_moves(&self) -> u64 {
        self.frame.coalesced()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn interaction_kind(&self) -> InteractionKind {
        self.interaction.kind()
    }

    /// Elements in paint order (back to front).
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.store.elements_ordered()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.store.get(id)
    }

    fn ensure_idle(&self) -> EngineResult<()> {
        match self.interaction.kind() {
            InteractionKind::Idle => Ok(()),
            kind => Err(EngineError::InteractionActive(kind)),
        }
    }

    fn selection_changed(&mut self) {
        let selected = self.selection.ids().to_vec();
        log::debug!("Selection changed: {} selected", selected.len());
        self.hooks.emit(EngineEvent::SelectionChanged { selected });
    }

    // --- Element store ---

    pub fn add_element(&mut self, draft: ElementDraft) -> Option<ElementId> {
        self.store.add(draft).map(Element::id)
    }

    pub fn add_elements<I>(&mut self, drafts: I) -> Vec<ElementId>
    where
        I: IntoIterator<Item = ElementDraft>,
    {
        self.store.add_elements(drafts)
    }

    /// Whether the store may be edited directly. Refused edits are logged.
    fn store_writable(&self, operation: &str) -> bool {
        match self.ensure_idle() {
            Ok(()) => true,
            Err(err) => {
                log::warn!("{operation} refused: {err}");
                false
            }
        }
    }

    /// Remove an element and drop it from the selection. Refused while an
    /// interaction is active.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        if !self.store_writable("Remove") || !self.store.remove(id) {
            return false;
        }
        if self.selection.remove(id) {
            self.selection_changed();
        }
        true
    }

    /// Patch an element. Refused while an interaction is active.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        self.store_writable("Update") && self.store.update(id, patch)
    }

    pub fn duplicate_element(&mut self, id: ElementId) -> Option<ElementId> {
        if !self.store_writable("Duplicate") {
            return None;
        }
        self.store.duplicate(id).map(Element::id)
    }

    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        self.store_writable("Reorder") && self.store.bring_to_front(id)
    }

    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        self.store_writable("Reorder") && self.store.send_to_back(id)
    }

    /// Cancel any session, then drop all elements, groups and the selection.
    pub fn clear(&mut self) {
        self.reset();
        self.store.clear();
    }

    /// Cancel the active session (restoring its start geometry), then drop
    /// groups, selection and any queued move.
    fn reset(&mut self) {
        self.cancel_interaction();
        self.frame.discard();
        self.guides.clear();
        self.groups.clear();
        if self.selection.clear() {
            self.selection_changed();
        }
    }

    pub fn export_layout(&self) -> Vec<LayoutRecord> {
        self.store.export_layout()
    }

    /// Replace everything with `records`. Groups and selection are dropped.
    pub fn import_layout(&mut self, records: Vec<LayoutRecord>) -> usize {
        self.reset();
        self.store.import_layout(records)
    }

    pub fn export_json(&self) -> EngineResult<String> {
        self.store.export_json().map_err(EngineError::Layout)
    }

    pub fn import_json(&mut self, json: &str) -> EngineResult<usize> {
        let records: Vec<LayoutRecord> = serde_json::from_str(json).map_err(EngineError::Layout)?;
        Ok(self.import_layout(records))
    }

    pub fn generate_test_elements(&mut self, count: usize) -> Vec<ElementId> {
        self.reset();
        self.store.generate_test_elements(count)
    }

    // --- Selection ---

    /// Replace the selection with one element.
    pub fn select(&mut self, id: ElementId) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        let changed = self.selection.select(id);
        if changed {
            self.selection_changed();
        }
        changed
    }

    pub fn add_to_selection(&mut self, id: ElementId) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        let changed = self.selection.add(id);
        if changed {
            self.selection_changed();
        }
        changed
    }

    /// Flip one element's membership. Returns whether it is selected afterwards.
    pub fn toggle_selection(&mut self, id: ElementId) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        let selected = self.selection.toggle(id);
        self.selection_changed();
        selected
    }

    pub fn select_many(&mut self, ids: &[ElementId]) -> bool {
        let known: Vec<ElementId> = ids.iter().copied().filter(|&id| self.store.contains(id)).collect();
        let changed = self.selection.replace(known);
        if changed {
            self.selection_changed();
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.selection_changed();
        }
        changed
    }

    // --- Sessions ---

    /// Start dragging from `id`.
    ///
    /// A grouped element drags its whole group; a member of a multi-element
    /// selection drags the selection; anything else drags alone and is
    /// raised to the top.
    pub fn start_drag(&mut self, id: ElementId, pointer: Point) -> EngineResult<InteractionKind> {
        self.ensure_idle()?;
        let element = self.store.get(id).ok_or(EngineError::UnknownElement(id))?;

        if let Some(group) = self.groups.group_of(id) {
            let session =
                GroupDragSession::begin(&self.groups, &self.store, group, pointer).ok_or(EngineError::DegenerateBounds)?;
            log::debug!("Group drag started on {group}");
            self.guides.clear();
            self.interaction = Interaction::GroupDragging(session);
            self.hooks.emit(EngineEvent::GroupDragStarted { group });
            return Ok(InteractionKind::GroupDragging);
        }

        if self.selection.len() > 1 && self.selection.contains(id) {
            self.start_multi_drag(pointer)?;
            return Ok(InteractionKind::MultiDragging);
        }

        let session = DragSession::begin(element, pointer);
        self.store.bring_to_front(id);
        log::debug!("Drag started on {id}");
        self.guides.clear();
        self.interaction = Interaction::Dragging(session);
        self.hooks.emit(EngineEvent::DragStarted { element: id });
        Ok(InteractionKind::Dragging)
    }

    /// Start resizing `id` from an edge or corner anchor.
    pub fn start_resize(&mut self, id: ElementId, pointer: Point, anchor: Anchor) -> EngineResult<()> {
        self.ensure_idle()?;
        if anchor == Anchor::Center {
            return Err(EngineError::UnsupportedAnchor(anchor));
        }
        let element = self.store.get(id).ok_or(EngineError::UnknownElement(id))?;
        let session = ResizeSession::begin(element, pointer, anchor);
        log::debug!("Resize started on {id} from {anchor:?}");
        self.guides.clear();
        self.interaction = Interaction::Resizing(session);
        self.hooks.emit(EngineEvent::ResizeStarted { element: id, anchor });
        Ok(())
    }

    /// Start a rigid drag of the current selection.
    pub fn start_multi_drag(&mut self, pointer: Point) -> EngineResult<()> {
        self.ensure_idle()?;
        let ids = self.selection.ids().to_vec();
        let session = MultiDragSession::begin(&self.store, &ids, pointer)
            .ok_or(EngineError::InsufficientSelection { found: 0 })?;
        let elements = session.ids();
        log::debug!("Multi-drag started with {} elements", elements.len());
        self.guides.clear();
        self.interaction = Interaction::MultiDragging(session);
        self.hooks.emit(EngineEvent::MultiDragStarted { elements });
        Ok(())
    }

    pub fn start_group_resize(&mut self, group: GroupId, pointer: Point, anchor: Anchor) -> EngineResult<()> {
        self.ensure_idle()?;
        if self.groups.get(group).is_none() {
            return Err(EngineError::UnknownGroup(group));
        }
        let session = GroupResizeSession::begin(&self.groups, &self.store, group, pointer, anchor)
            .ok_or(EngineError::DegenerateBounds)?;
        log::debug!("Group resize started on {group} from {anchor:?}");
        self.guides.clear();
        self.interaction = Interaction::GroupResizing(session);
        self.hooks.emit(EngineEvent::GroupResizeStarted { group, anchor });
        Ok(())
    }

    /// Start a rubber-band selection. `additive` keeps the current selection.
    pub fn begin_marquee(&mut self, pointer: Point, additive: bool) -> EngineResult<()> {
        self.ensure_idle()?;
        self.guides.clear();
        self.interaction = Interaction::Marquee(MarqueeSession::begin(pointer, additive));
        Ok(())
    }

    /// The live marquee rectangle, if one is being drawn.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match &self.interaction {
            Interaction::Marquee(session) => Some(session.rect()),
            _ => None,
        }
    }

    /// Feed a pointer move to whichever session is active. Supersedes any
    /// queued move. A no-op when idle.
    pub fn on_move(&mut self, pointer: Point, container: Size) -> EngineResult<()> {
        self.frame.discard();
        self.apply_move(pointer, container)
    }

    /// Feed a move to an active element resize. Returns `false` and leaves
    /// the layout untouched when no resize is active.
    pub fn on_resize_move(&mut self, pointer: Point, container: Size) -> EngineResult<bool> {
        self.move_expecting(InteractionKind::Resizing, pointer, container)
    }

    pub fn on_multi_drag(&mut self, pointer: Point, container: Size) -> EngineResult<bool> {
        self.move_expecting(InteractionKind::MultiDragging, pointer, container)
    }

    /// Group resize is not clamped, so no container is needed.
    pub fn update_group_resize(&mut self, pointer: Point) -> EngineResult<bool> {
        self.move_expecting(InteractionKind::GroupResizing, pointer, Size::ZERO)
    }

    pub fn update_marquee(&mut self, pointer: Point) -> EngineResult<bool> {
        self.move_expecting(InteractionKind::Marquee, pointer, Size::ZERO)
    }

    fn move_expecting(&mut self, expected: InteractionKind, pointer: Point, container: Size) -> EngineResult<bool> {
        let kind = self.interaction.kind();
        if kind != expected {
            log::debug!("{expected:?} move ignored while {kind:?}");
            return Ok(false);
        }
        self.on_move(pointer, container).map(|_| true)
    }

    fn apply_move(&mut self, pointer: Point, container: Size) -> EngineResult<()> {
        let snap_distance = self.config.snap_enabled.then_some(self.config.snap_distance);
        match &mut self.interaction {
            Interaction::Idle => {}
            Interaction::Dragging(session) => {
                if let Some((bounds, guides)) = session.update(&mut self.store, pointer, container, snap_distance) {
                    log::trace!("Drag {} -> {bounds:?} ({} guides)", session.element, guides.len());
                    self.guides = guides;
                    self.hooks.emit(EngineEvent::DragMoved {
                        element: session.element,
                        bounds,
                    });
                }
            }
            Interaction::Resizing(session) => {
                let min_size = self.config.min_size();
                if let Some((bounds, guides)) =
                    session.update(&mut self.store, pointer, container, min_size, snap_distance)
                {
                    log::trace!("Resize {} -> {bounds:?}", session.element);
                    self.guides = guides;
                    self.hooks.emit(EngineEvent::ResizeMoved {
                        element: session.element,
                        bounds,
                    });
                }
            }
            Interaction::MultiDragging(session) => {
                let delta = session.update(&mut self.store, pointer, container);
                log::trace!("Multi-drag delta {delta:?}");
                self.hooks.emit(EngineEvent::MultiDragMoved { delta });
            }
            Interaction::GroupDragging(session) => {
                let delta = session.update(&self.groups, &mut self.store, pointer, container)?;
                self.hooks.emit(EngineEvent::GroupDragMoved {
                    group: session.group,
                    delta,
                });
            }
            Interaction::GroupResizing(session) => {
                let bounds = session.update(&self.groups, &mut self.store, pointer)?;
                self.hooks.emit(EngineEvent::GroupResized {
                    group: session.group,
                    bounds,
                });
            }
            Interaction::Marquee(session) => session.update(pointer),
        }
        Ok(())
    }

    /// Queue a move for the next frame. Only the latest queued move survives.
    pub fn queue_pointer_move(&mut self, pointer: Point, container: Size) {
        self.frame.queue(pointer, container);
    }

    /// Apply the queued move, if any.
    pub fn flush_frame(&mut self) -> EngineResult<()> {
        match self.frame.take() {
            Some(pending) => self.apply_move(pending.pointer, pending.container),
            None => Ok(()),
        }
    }

    /// Finish the active session, whatever it is. Any queued move is applied
    /// first. Returns the kind that ended, or `None` if idle.
    pub fn end_interaction(&mut self) -> EngineResult<Option<InteractionKind>> {
        let flushed = self.flush_frame();
        let interaction = std::mem::take(&mut self.interaction);
        self.guides.clear();
        let kind = interaction.kind();

        match interaction {
            Interaction::Idle => return flushed.map(|_| None),
            Interaction::Dragging(session) => {
                let bounds = self.bounds_or(session.element, session.start_bounds);
                self.hooks.emit(EngineEvent::DragEnded {
                    element: session.element,
                    bounds,
                });
            }
            Interaction::Resizing(session) => {
                let bounds = self.bounds_or(session.element, session.start_bounds);
                self.hooks.emit(EngineEvent::ResizeEnded {
                    element: session.element,
                    bounds,
                });
            }
            Interaction::MultiDragging(session) => {
                self.hooks.emit(EngineEvent::MultiDragEnded { elements: session.ids() });
                if let Some(id) = session.clicked.filter(|_| session.is_unmoved(&self.store)) {
                    if self.selection.select(id) {
                        self.selection_changed();
                    }
                }
            }
            Interaction::GroupDragging(session) => {
                self.hooks.emit(EngineEvent::GroupDragEnded { group: session.group });
            }
            Interaction::GroupResizing(session) => {
                self.hooks.emit(EngineEvent::GroupResizeEnded { group: session.group });
            }
            Interaction::Marquee(session) => {
                let hits = session.hits(&self.store);
                let changed = if session.additive {
                    hits.into_iter().fold(false, |changed, id| self.selection.add(id) | changed)
                } else {
                    self.selection.replace(hits)
                };
                if changed {
                    self.selection_changed();
                }
            }
        }
        log::debug!("{kind:?} ended");
        flushed.map(|_| Some(kind))
    }

    fn bounds_or(&self, id: ElementId, fallback: Rect) -> Rect {
        self.store.get(id).map_or(fallback, Element::bounds)
    }

    fn end_expecting(&mut self, expected: &[InteractionKind]) -> EngineResult<bool> {
        if !expected.contains(&self.interaction.kind()) {
            return Ok(false);
        }
        self.end_interaction().map(|kind| kind.is_some())
    }

    /// End a drag started with [`Engine::start_drag`], whichever way it was routed.
    pub fn end_drag(&mut self) -> EngineResult<bool> {
        self.end_expecting(&[
            InteractionKind::Dragging,
            InteractionKind::MultiDragging,
            InteractionKind::GroupDragging,
        ])
    }

    pub fn end_resize(&mut self) -> EngineResult<bool> {
        self.end_expecting(&[InteractionKind::Resizing])
    }

    pub fn end_multi_drag(&mut self) -> EngineResult<bool> {
        self.end_expecting(&[InteractionKind::MultiDragging])
    }

    pub fn end_group_resize(&mut self) -> EngineResult<bool> {
        self.end_expecting(&[InteractionKind::GroupResizing])
    }

    pub fn end_marquee(&mut self) -> EngineResult<bool> {
        self.end_expecting(&[InteractionKind::Marquee])
    }

    /// Abandon the active session and restore every element it touched.
    pub fn cancel_interaction(&mut self) -> bool {
        let interaction = std::mem::take(&mut self.interaction);
        if interaction.is_idle() {
            return false;
        }
        self.frame.discard();
        self.guides.clear();
        interaction.restore(&mut self.store);
        let kind = interaction.kind();
        log::debug!("{kind:?} cancelled");
        self.hooks.emit(EngineEvent::InteractionCancelled { kind });
        true
    }

    // --- Input dispatch ---

    /// Route one pointer event.
    ///
    /// Pointer-down picks the session from its target: element bodies drag
    /// (after updating the selection), element handles resize, group handles
    /// resize the group and empty canvas starts a marquee. Moves go to the
    /// active session; pointer-up applies any queued move and ends it.
    pub fn handle_pointer(&mut self, event: PointerEvent, container: Size) -> EngineResult<()> {
        match event {
            PointerEvent::Down {
                position,
                target,
                modifiers,
            } => match target {
                PointerTarget::Element { id } => {
                    if !self.store.contains(id) {
                        return Err(EngineError::UnknownElement(id));
                    }
                    if modifiers.toggles_selection() {
                        if !self.toggle_selection(id) {
                            return Ok(());
                        }
                        return self.start_drag(id, position).map(|_| ());
                    }
                    if !self.selection.contains(id) {
                        self.select(id);
                    }
                    self.start_drag(id, position)?;
                    if let Interaction::MultiDragging(session) = &mut self.interaction {
                        session.clicked = Some(id);
                    }
                    Ok(())
                }
                PointerTarget::ElementHandle { id, anchor } => self.start_resize(id, position, anchor),
                PointerTarget::GroupHandle { group, anchor } => self.start_group_resize(group, position, anchor),
                PointerTarget::Canvas => {
                    self.ensure_idle()?;
                    let additive = modifiers.toggles_selection();
                    if !additive {
                        self.clear_selection();
                    }
                    self.begin_marquee(position, additive)
                }
            },
            PointerEvent::Move { position } => self.on_move(position, container),
            PointerEvent::Up { .. } => self.end_interaction().map(|_| ()),
        }
    }

    // --- Groups ---

    /// Group `ids`. Selection is left as it is.
    pub fn try_create_group(&mut self, ids: &[ElementId]) -> EngineResult<GroupId> {
        let group = self.groups.create(&self.store, ids)?;
        self.hooks.emit(EngineEvent::GroupCreated { group });
        Ok(group)
    }

    /// Like [`Engine::try_create_group`], with failures logged and dropped.
    pub fn create_group(&mut self, ids: &[ElementId]) -> Option<GroupId> {
        match self.try_create_group(ids) {
            Ok(group) => Some(group),
            Err(err) => {
                log::warn!("Group not created: {err}");
                None
            }
        }
    }

    pub fn group_selected(&mut self) -> EngineResult<GroupId> {
        let ids = self.selection.ids().to_vec();
        self.try_create_group(&ids)
    }

    /// Delete a group. Refused while an interaction is active.
    pub fn ungroup(&mut self, group: GroupId) -> bool {
        if let Err(err) = self.ensure_idle() {
            log::warn!("Ungroup refused: {err}");
            return false;
        }
        match self.groups.ungroup(group) {
            Ok(_) => {
                self.hooks.emit(EngineEvent::GroupRemoved { group });
                true
            }
            Err(_) => false,
        }
    }

    /// Ungroup every group containing a selected element, then clear the selection.
    pub fn ungroup_selected(&mut self) -> EngineResult<Vec<GroupId>> {
        self.ensure_idle()?;
        let removed = self.groups.ungroup_containing(self.selection.ids());
        for &group in &removed {
            self.hooks.emit(EngineEvent::GroupRemoved { group });
        }
        self.clear_selection();
        Ok(removed)
    }

    pub fn group(&self, group: GroupId) -> Option<&Group> {
        self.groups.get(group)
    }

    pub fn group_of(&self, element: ElementId) -> Option<GroupId> {
        self.groups.group_of(element)
    }

    pub fn group_members(&self, group: GroupId) -> Vec<ElementId> {
        self.groups.members(&self.store, group)
    }

    pub fn group_bounds(&self, group: GroupId) -> Option<Rect> {
        self.groups.bounds(&self.store, group)
    }

    pub fn move_group(&mut self, group: GroupId, delta: Vec2) -> EngineResult<()> {
        self.ensure_idle()?;
        self.groups.move_group(&mut self.store, group, delta)
    }

    pub fn resize_group(&mut self, group: GroupId, growth: Vec2, anchor: Anchor) -> EngineResult<Rect> {
        self.ensure_idle()?;
        self.groups.resize(&mut self.store, group, growth, anchor)
    }

    pub fn smart_resize_group(
        &mut self,
        group: GroupId,
        start: Point,
        current: Point,
        anchor: Anchor,
    ) -> EngineResult<Rect> {
        self.ensure_idle()?;
        self.groups.smart_resize(&mut self.store, group, start, current, anchor)
    }

    pub fn constrained_resize_group(
        &mut self,
        group: GroupId,
        growth: Vec2,
        anchor: Anchor,
        constraints: &ResizeConstraints,
    ) -> EngineResult<Rect> {
        self.ensure_idle()?;
        self.groups.constrained_resize(&mut self.store, group, growth, anchor, constraints)
    }

    pub fn group_handles(&self, group: GroupId) -> Vec<ResizeHandle> {
        self.groups.handles(&self.store, group, self.config.handle_size)
    }

    pub fn handle_at(&self, group: GroupId, point: Point) -> Option<Anchor> {
        self.groups.handle_at(&self.store, group, point, self.config.handle_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlacementConfig;
    use crate::input::Modifiers;
    use crate::snap::{Orientation, SnapKind};
    use std::cell::RefCell;
    use std::rc::Rc;
    use uuid::Uuid;

    const CONTAINER: Size = Size::new(1000.0, 800.0);

    fn engine() -> Engine {
        Engine::new(EngineConfig {
            placement: PlacementConfig {
                seed: Some(5),
                ..PlacementConfig::default()
            },
            ..EngineConfig::default()
        })
    }

    fn add(engine: &mut Engine, x: f64, y: f64, w: f64, h: f64) -> ElementId {
        engine.add_element(ElementDraft::new().at(x, y).sized(w, h)).unwrap()
    }

    fn record_events(engine: &mut Engine) -> Rc<RefCell<Vec<EngineEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        engine.subscribe(Box::new(move |event| sink.borrow_mut().push(event.clone())));
        events
    }

    fn down(position: Point, target: PointerTarget) -> PointerEvent {
        PointerEvent::Down {
            position,
            target,
            modifiers: Modifiers::default(),
        }
    }

    #[test]
    fn test_snap_scenario_through_engine() {
        let mut engine = engine();
        let a = add(&mut engine, 100.0, 100.0, 120.0, 80.0);
        add(&mut engine, 100.0, 300.0, 120.0, 80.0);

        engine.start_drag(a, Point::new(150.0, 150.0)).unwrap();
        engine.on_move(Point::new(153.0, 150.0), CONTAINER).unwrap();

        assert_eq!(engine.element(a).unwrap().position.x, 100.0);
        let edges: Vec<_> = engine
            .guides()
            .iter()
            .filter(|g| g.orientation == Orientation::Vertical && g.kind == SnapKind::Edge && g.position == 100.0)
            .collect();
        assert_eq!(edges.len(), 1);

        assert!(engine.end_drag().unwrap());
        assert!(engine.guides().is_empty());
        assert_eq!(engine.interaction_kind(), InteractionKind::Idle);
    }

    #[test]
    fn test_snapping_can_be_disabled() {
        let mut engine = engine();
        let a = add(&mut engine, 100.0, 100.0, 120.0, 80.0);
        add(&mut engine, 100.0, 300.0, 120.0, 80.0);
        engine.set_snap_enabled(false);
        engine.start_drag(a, Point::new(100.0, 100.0)).unwrap();
        engine.on_move(Point::new(103.0, 100.0), CONTAINER).unwrap();
        assert_eq!(engine.element(a).unwrap().position.x, 103.0);
        assert!(engine.guides().is_empty());
    }

    #[test]
    fn test_drag_brings_to_front() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 60.0, 40.0);
        let b = add(&mut engine, 300.0, 300.0, 60.0, 40.0);
        engine.start_drag(a, Point::new(10.0, 10.0)).unwrap();
        assert_eq!(engine.store().order(), &[b, a]);
    }

    #[test]
    fn test_sessions_are_exclusive() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 60.0, 40.0);
        engine.start_drag(a, Point::ZERO).unwrap();
        let err = engine.start_resize(a, Point::ZERO, Anchor::SE).unwrap_err();
        assert!(matches!(err, EngineError::InteractionActive(InteractionKind::Dragging)));
        assert!(matches!(
            engine.begin_marquee(Point::ZERO, false),
            Err(EngineError::InteractionActive(_))
        ));
        // Ending the wrong kind does nothing.
        assert!(!engine.end_resize().unwrap());
        assert!(engine.end_drag().unwrap());
    }

    #[test]
    fn test_resize_rejects_center_and_unknown() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 60.0, 40.0);
        assert!(matches!(
            engine.start_resize(a, Point::ZERO, Anchor::Center),
            Err(EngineError::UnsupportedAnchor(Anchor::Center))
        ));
        assert!(matches!(
            engine.start_resize(Uuid::new_v4(), Point::ZERO, Anchor::SE),
            Err(EngineError::UnknownElement(_))
        ));
        assert!(engine.interaction().is_idle());
    }

    #[test]
    fn test_resize_nw_scenario_through_engine() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 100.0, 100.0);
        engine.start_resize(a, Point::ZERO, Anchor::NW).unwrap();
        assert!(engine.on_resize_move(Point::new(20.0, 20.0), CONTAINER).unwrap());
        assert!(engine.end_resize().unwrap());
        assert_eq!(engine.element(a).unwrap().bounds(), Rect::new(20.0, 20.0, 100.0, 100.0));
    }

    #[test]
    fn test_multi_drag_routed_from_start_drag() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 20.0, 20.0);
        let b = add(&mut engine, 50.0, 50.0, 20.0, 20.0);
        engine.select_many(&[a, b]);
        let kind = engine.start_drag(a, Point::new(10.0, 10.0)).unwrap();
        assert_eq!(kind, InteractionKind::MultiDragging);
        assert!(engine.on_multi_drag(Point::new(20.0, 20.0), CONTAINER).unwrap());
        assert!(engine.end_multi_drag().unwrap());
        assert_eq!(engine.element(a).unwrap().position, Point::new(10.0, 10.0));
        assert_eq!(engine.element(b).unwrap().position, Point::new(60.0, 60.0));
    }

    #[test]
    fn test_multi_drag_needs_selection() {
        let mut engine = engine();
        assert!(matches!(
            engine.start_multi_drag(Point::ZERO),
            Err(EngineError::InsufficientSelection { found: 0 })
        ));
    }

    #[test]
    fn test_group_drag_routed_from_start_drag() {
        let mut engine = engine();
        let a = add(&mut engine, 100.0, 100.0, 40.0, 30.0);
        let b = add(&mut engine, 200.0, 200.0, 40.0, 30.0);
        let group = engine.create_group(&[a, b]).unwrap();
        let kind = engine.start_drag(b, Point::new(210.0, 210.0)).unwrap();
        assert_eq!(kind, InteractionKind::GroupDragging);
        engine.on_move(Point::new(230.0, 200.0), CONTAINER).unwrap();
        engine.end_drag().unwrap();
        assert_eq!(engine.element(a).unwrap().position, Point::new(120.0, 90.0));
        assert_eq!(engine.group_bounds(group), Some(Rect::new(120.0, 90.0, 260.0, 220.0)));
    }

    #[test]
    fn test_group_resize_session() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 40.0, 30.0);
        let b = add(&mut engine, 60.0, 50.0, 40.0, 30.0);
        let group = engine.create_group(&[a, b]).unwrap();
        let events = record_events(&mut engine);

        let handle = engine.handle_at(group, Point::new(100.0, 80.0)).unwrap();
        assert_eq!(handle, Anchor::SE);
        engine.start_group_resize(group, Point::new(100.0, 80.0), handle).unwrap();
        assert!(engine.update_group_resize(Point::new(200.0, 160.0)).unwrap());
        assert!(engine.end_group_resize().unwrap());

        assert_eq!(engine.group_bounds(group), Some(Rect::new(0.0, 0.0, 200.0, 160.0)));
        let events = events.borrow();
        assert!(matches!(events[0], EngineEvent::GroupResizeStarted { .. }));
        assert!(matches!(events.last(), Some(EngineEvent::GroupResizeEnded { .. })));
    }

    #[test]
    fn test_direct_group_ops_refused_during_session() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 40.0, 30.0);
        let b = add(&mut engine, 60.0, 50.0, 40.0, 30.0);
        let c = add(&mut engine, 500.0, 500.0, 40.0, 30.0);
        let group = engine.create_group(&[a, b]).unwrap();
        engine.start_drag(c, Point::new(500.0, 500.0)).unwrap();
        assert!(engine.move_group(group, Vec2::new(5.0, 5.0)).is_err());
        assert!(engine.resize_group(group, Vec2::ZERO, Anchor::SE).is_err());
        assert!(!engine.ungroup(group));
        engine.end_drag().unwrap();
        assert!(engine.ungroup(group));
    }

    #[test]
    fn test_create_group_failure_leaves_selection() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 40.0, 30.0);
        engine.select(a);
        assert!(engine.group_selected().is_err());
        assert!(engine.create_group(&[a]).is_none());
        assert_eq!(engine.selection().ids(), &[a]);
        assert!(engine.groups().is_empty());
    }

    #[test]
    fn test_ungroup_selected() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 40.0, 30.0);
        let b = add(&mut engine, 60.0, 50.0, 40.0, 30.0);
        engine.select_many(&[a, b]);
        let group = engine.group_selected().unwrap();
        assert_eq!(engine.group_of(a), Some(group));
        assert_eq!(engine.ungroup_selected().unwrap(), vec![group]);
        assert!(engine.selection().is_empty());
        assert_eq!(engine.group_of(a), None);
    }

    #[test]
    fn test_cancel_restores_start() {
        let mut engine = engine();
        let a = add(&mut engine, 100.0, 100.0, 100.0, 100.0);
        let events = record_events(&mut engine);
        engine.start_resize(a, Point::new(200.0, 200.0), Anchor::SE).unwrap();
        engine.on_move(Point::new(300.0, 260.0), CONTAINER).unwrap();
        assert!(engine.cancel_interaction());
        assert_eq!(engine.element(a).unwrap().bounds(), Rect::new(100.0, 100.0, 200.0, 200.0));
        assert!(!engine.cancel_interaction());
        assert_eq!(
            events.borrow().last(),
            Some(&EngineEvent::InteractionCancelled {
                kind: InteractionKind::Resizing
            })
        );
    }

    #[test]
    fn test_coalesced_moves_flush_on_up() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 50.0, 50.0);
        engine.handle_pointer(down(Point::ZERO, PointerTarget::Element { id: a }), CONTAINER).unwrap();
        engine.queue_pointer_move(Point::new(300.0, 300.0), CONTAINER);
        engine.queue_pointer_move(Point::new(400.0, 410.0), CONTAINER);
        // Nothing applied until the frame is flushed.
        assert_eq!(engine.element(a).unwrap().position, Point::ZERO);
        assert_eq!(engine.coalesced_moves(), 1);
        engine.handle_pointer(PointerEvent::Up { position: Point::new(400.0, 410.0) }, CONTAINER).unwrap();
        assert_eq!(engine.element(a).unwrap().position, Point::new(400.0, 410.0));
        assert!(engine.interaction().is_idle());
    }

    #[test]
    fn test_flush_frame_applies_once() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 50.0, 50.0);
        engine.start_drag(a, Point::ZERO).unwrap();
        engine.queue_pointer_move(Point::new(30.0, 30.0), CONTAINER);
        engine.flush_frame().unwrap();
        assert_eq!(engine.element(a).unwrap().position, Point::new(30.0, 30.0));
        engine.flush_frame().unwrap();
        assert_eq!(engine.element(a).unwrap().position, Point::new(30.0, 30.0));
    }

    #[test]
    fn test_dispatch_click_replaces_and_modifier_toggles() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 50.0, 50.0);
        let b = add(&mut engine, 200.0, 0.0, 50.0, 50.0);
        let up = PointerEvent::Up { position: Point::ZERO };

        engine.handle_pointer(down(Point::ZERO, PointerTarget::Element { id: a }), CONTAINER).unwrap();
        engine.handle_pointer(up, CONTAINER).unwrap();
        assert_eq!(engine.selection().ids(), &[a]);

        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        engine
            .handle_pointer(
                PointerEvent::Down {
                    position: Point::new(200.0, 0.0),
                    target: PointerTarget::Element { id: b },
                    modifiers: ctrl,
                },
                CONTAINER,
            )
            .unwrap();
        assert_eq!(engine.interaction_kind(), InteractionKind::MultiDragging);
        engine.handle_pointer(up, CONTAINER).unwrap();
        assert_eq!(engine.selection().ids(), &[a, b]);

        // Toggling off does not start a drag.
        engine
            .handle_pointer(
                PointerEvent::Down {
                    position: Point::ZERO,
                    target: PointerTarget::Element { id: a },
                    modifiers: ctrl,
                },
                CONTAINER,
            )
            .unwrap();
        assert!(engine.interaction().is_idle());
        assert_eq!(engine.selection().ids(), &[b]);

        // Plain click on an unselected element replaces.
        engine.handle_pointer(down(Point::ZERO, PointerTarget::Element { id: a }), CONTAINER).unwrap();
        engine.handle_pointer(up, CONTAINER).unwrap();
        assert_eq!(engine.selection().ids(), &[a]);
    }

    #[test]
    fn test_plain_click_narrows_multi_selection() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 50.0, 50.0);
        let b = add(&mut engine, 200.0, 0.0, 50.0, 50.0);
        let c = add(&mut engine, 400.0, 0.0, 50.0, 50.0);
        let events = record_events(&mut engine);
        engine.select_many(&[a, b, c]);

        engine.handle_pointer(down(Point::new(210.0, 10.0), PointerTarget::Element { id: b }), CONTAINER).unwrap();
        assert_eq!(engine.interaction_kind(), InteractionKind::MultiDragging);
        engine.handle_pointer(PointerEvent::Up { position: Point::new(210.0, 10.0) }, CONTAINER).unwrap();

        assert_eq!(engine.selection().ids(), &[b]);
        assert_eq!(engine.element(a).unwrap().position, Point::ZERO);
        assert_eq!(
            events.borrow().last(),
            Some(&EngineEvent::SelectionChanged { selected: vec![b] })
        );
    }

    #[test]
    fn test_moved_multi_drag_keeps_selection() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 50.0, 50.0);
        let b = add(&mut engine, 200.0, 0.0, 50.0, 50.0);
        engine.select_many(&[a, b]);

        engine.handle_pointer(down(Point::new(210.0, 10.0), PointerTarget::Element { id: b }), CONTAINER).unwrap();
        engine.handle_pointer(PointerEvent::Move { position: Point::new(260.0, 60.0) }, CONTAINER).unwrap();
        engine.handle_pointer(PointerEvent::Up { position: Point::new(260.0, 60.0) }, CONTAINER).unwrap();

        assert_eq!(engine.selection().ids(), &[a, b]);
        assert_eq!(engine.element(a).unwrap().position, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_dispatch_marquee() {
        let mut engine = engine();
        let a = add(&mut engine, 10.0, 10.0, 50.0, 50.0);
        let b = add(&mut engine, 100.0, 100.0, 50.0, 50.0);
        add(&mut engine, 400.0, 400.0, 50.0, 50.0);
        engine.select(a);

        engine.handle_pointer(down(Point::new(5.0, 5.0), PointerTarget::Canvas), CONTAINER).unwrap();
        assert!(engine.selection().is_empty());
        engine.handle_pointer(PointerEvent::Move { position: Point::new(200.0, 200.0) }, CONTAINER).unwrap();
        assert_eq!(engine.marquee_rect(), Some(Rect::new(5.0, 5.0, 200.0, 200.0)));
        engine.handle_pointer(PointerEvent::Up { position: Point::new(200.0, 200.0) }, CONTAINER).unwrap();
        assert_eq!(engine.selection().ids(), &[a, b]);
        assert_eq!(engine.marquee_rect(), None);
    }

    #[test]
    fn test_dispatch_handles() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 100.0, 100.0);
        engine
            .handle_pointer(
                down(Point::new(100.0, 100.0), PointerTarget::ElementHandle { id: a, anchor: Anchor::SE }),
                CONTAINER,
            )
            .unwrap();
        assert_eq!(engine.interaction_kind(), InteractionKind::Resizing);
        engine.handle_pointer(PointerEvent::Move { position: Point::new(150.0, 120.0) }, CONTAINER).unwrap();
        engine.handle_pointer(PointerEvent::Up { position: Point::new(150.0, 120.0) }, CONTAINER).unwrap();
        assert_eq!(engine.element(a).unwrap().size(), Size::new(150.0, 120.0));

        let unknown = Uuid::new_v4();
        assert!(matches!(
            engine.handle_pointer(down(Point::ZERO, PointerTarget::Element { id: unknown }), CONTAINER),
            Err(EngineError::UnknownElement(_))
        ));
    }

    #[test]
    fn test_hooks_for_drag_lifecycle() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 50.0, 50.0);
        let events = record_events(&mut engine);
        engine.select(a);
        engine.start_drag(a, Point::ZERO).unwrap();
        engine.on_move(Point::new(10.0, 0.0), CONTAINER).unwrap();
        engine.end_drag().unwrap();

        let events = events.borrow();
        assert!(matches!(events[0], EngineEvent::SelectionChanged { .. }));
        assert_eq!(events[1], EngineEvent::DragStarted { element: a });
        assert!(matches!(events[2], EngineEvent::DragMoved { .. }));
        assert_eq!(
            events[3],
            EngineEvent::DragEnded {
                element: a,
                bounds: Rect::new(10.0, 0.0, 60.0, 50.0)
            }
        );
    }

    #[test]
    fn test_import_drops_groups_and_selection() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 40.0, 30.0);
        let b = add(&mut engine, 60.0, 50.0, 40.0, 30.0);
        engine.select_many(&[a, b]);
        engine.group_selected().unwrap();
        let json = engine.export_json().unwrap();

        assert_eq!(engine.import_json(&json).unwrap(), 2);
        assert!(engine.groups().is_empty());
        assert!(engine.selection().is_empty());
        assert!(engine.element(a).is_some());
        assert!(matches!(engine.import_json("[{]"), Err(EngineError::Layout(_))));
    }

    #[test]
    fn test_store_writes_refused_during_drag() {
        let mut engine = engine();
        let a = add(&mut engine, 100.0, 100.0, 100.0, 80.0);
        let b = add(&mut engine, 400.0, 400.0, 100.0, 80.0);
        engine.start_drag(a, Point::new(150.0, 140.0)).unwrap();

        let wide = ElementPatch {
            width: Some(5000.0),
            ..ElementPatch::default()
        };
        assert!(!engine.update_element(a, &wide));
        assert!(!engine.remove_element(b));
        assert!(engine.duplicate_element(a).is_none());
        assert!(!engine.send_to_back(a));
        assert_eq!(engine.store().len(), 2);

        engine.on_move(Point::new(990.0, 790.0), CONTAINER).unwrap();
        let bounds = engine.element(a).unwrap().bounds();
        assert_eq!(bounds.size(), Size::new(100.0, 80.0));
        assert!(bounds.x1 <= CONTAINER.width && bounds.y1 <= CONTAINER.height);

        engine.end_drag().unwrap();
        assert!(engine.update_element(a, &wide));
    }

    #[test]
    fn test_clear_and_import_cancel_active_session() {
        let mut engine = engine();
        let a = add(&mut engine, 100.0, 100.0, 100.0, 80.0);
        let layout = engine.export_layout();
        let events = record_events(&mut engine);

        engine.start_drag(a, Point::new(150.0, 140.0)).unwrap();
        engine.on_move(Point::new(450.0, 440.0), CONTAINER).unwrap();
        assert_eq!(engine.import_layout(layout), 1);
        assert!(engine.interaction().is_idle());
        assert!(events.borrow().contains(&EngineEvent::InteractionCancelled {
            kind: InteractionKind::Dragging
        }));

        events.borrow_mut().clear();
        engine.start_drag(a, Point::new(150.0, 140.0)).unwrap();
        engine.clear();
        assert!(engine.interaction().is_idle());
        assert!(engine.store().is_empty());
        assert!(events.borrow().contains(&EngineEvent::InteractionCancelled {
            kind: InteractionKind::Dragging
        }));
    }

    #[test]
    fn test_named_updates_ignore_other_sessions() {
        let mut engine = engine();
        let a = add(&mut engine, 100.0, 100.0, 100.0, 80.0);
        engine.start_drag(a, Point::new(150.0, 140.0)).unwrap();
        engine.on_move(Point::new(350.0, 340.0), CONTAINER).unwrap();
        let before = engine.element(a).unwrap().bounds();

        assert!(!engine.update_group_resize(Point::new(300.0, 300.0)).unwrap());
        assert!(!engine.update_marquee(Point::new(300.0, 300.0)).unwrap());
        assert!(!engine.on_resize_move(Point::new(300.0, 300.0), CONTAINER).unwrap());
        assert!(!engine.on_multi_drag(Point::new(300.0, 300.0), CONTAINER).unwrap());

        assert_eq!(engine.element(a).unwrap().bounds(), before);
        assert_eq!(engine.interaction_kind(), InteractionKind::Dragging);
    }

    #[test]
    fn test_remove_element_deselects() {
        let mut engine = engine();
        let a = add(&mut engine, 0.0, 0.0, 40.0, 30.0);
        engine.select(a);
        assert!(engine.remove_element(a));
        assert!(engine.selection().is_empty());
        assert!(!engine.remove_element(a));
    }
}

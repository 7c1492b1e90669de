//! Element store: the ordered collection of elements.

use crate::config::PlacementConfig;
use crate::element::{Element, ElementDraft, ElementId, ElementPatch, LayoutRecord, valid_geometry};
use kurbo::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use uuid::Uuid;

/// Owns every element on the workspace.
///
/// Paint and hit-test priority follow `z_order`: the first id is the
/// bottom-most element, the last id is the top-most.
#[derive(Debug)]
pub struct ElementStore {
    elements: HashMap<ElementId, Element>,
    /// Z-order of elements (back to front).
    z_order: Vec<ElementId>,
    placement: PlacementConfig,
    rng: StdRng,
    /// Numbering for default content, reset by `clear`.
    counter: usize,
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new(PlacementConfig::default())
    }
}

impl ElementStore {
    pub fn new(placement: PlacementConfig) -> Self {
        let rng = match placement.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            elements: HashMap::new(),
            z_order: Vec::new(),
            placement,
            rng,
            counter: 0,
        }
    }

    pub fn placement(&self) -> &PlacementConfig {
        &self.placement
    }

    /// Add an element, filling in whatever the draft leaves out.
    ///
    /// Missing position falls at a random spot in the upper-left of the
    /// viewport, missing size is the default size. A draft id that is already
    /// taken is replaced by a fresh one. Returns `None` if the resulting
    /// geometry is invalid.
    pub fn add(&mut self, draft: ElementDraft) -> Option<&Element> {
        self.counter += 1;
        let (max_x, max_y) = self.placement.max_origin();
        let x = match draft.x {
            Some(x) => x,
            None => (self.rng.random::<f64>() * self.placement.scatter_span.width + self.placement.edge_margin).min(max_x),
        };
        let y = match draft.y {
            Some(y) => y,
            None => (self.rng.random::<f64>() * self.placement.scatter_span.height + self.placement.edge_margin).min(max_y),
        };
        let width = draft.width.unwrap_or(self.placement.default_size.width);
        let height = draft.height.unwrap_or(self.placement.default_size.height);
        if !valid_geometry(x, y, width, height) {
            log::warn!("Rejected element with invalid geometry ({x}, {y}, {width}, {height})");
            return None;
        }

        let id = match draft.id {
            Some(id) if !self.elements.contains_key(&id) => id,
            _ => Uuid::new_v4(),
        };
        let content = draft.content.unwrap_or_else(|| format!("Element {}", self.counter));
        Some(self.insert(Element::with_id(id, Point::new(x, y), width, height, content)))
    }

    /// Add several drafts in order. Returns the ids that were added.
    pub fn add_elements<I>(&mut self, drafts: I) -> Vec<ElementId>
    where
        I: IntoIterator<Item = ElementDraft>,
    {
        drafts
            .into_iter()
            .filter_map(|draft| self.add(draft).map(Element::id))
            .collect()
    }

    fn insert(&mut self, element: Element) -> &Element {
        let id = element.id;
        self.z_order.push(id);
        self.elements.entry(id).or_insert(element)
    }

    /// Remove an element. Returns false if it did not exist.
    pub fn remove(&mut self, id: ElementId) -> bool {
        if self.elements.remove(&id).is_none() {
            return false;
        }
        self.z_order.retain(|&element_id| element_id != id);
        true
    }

    /// Patch an element in place. Returns false for unknown ids or invalid geometry.
    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        match self.elements.get_mut(&id) {
            Some(element) => element.apply(patch),
            None => false,
        }
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Remove every element and reset default numbering.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.z_order.clear();
        self.counter = 0;
    }

    /// Copy an element, offset down and to the right, on top of everything.
    pub fn duplicate(&mut self, id: ElementId) -> Option<&Element> {
        let original = self.elements.get(&id)?;
        let offset = self.placement.duplicate_offset;
        let copy = Element::new(
            Point::new(original.position.x + offset, original.position.y + offset),
            original.width,
            original.height,
            format!("{} (copy)", original.content),
        );
        Some(self.insert(copy))
    }

    /// Move an element to the top of the paint order.
    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        if !self.elements.contains_key(&id) {
            return false;
        }
        self.z_order.retain(|&element_id| element_id != id);
        self.z_order.push(id);
        true
    }

    /// Move an element to the bottom of the paint order.
    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        if !self.elements.contains_key(&id) {
            return false;
        }
        self.z_order.retain(|&element_id| element_id != id);
        self.z_order.insert(0, id);
        true
    }

    /// Elements in paint order (back to front).
    pub fn elements_ordered(&self) -> impl Iterator<Item = &Element> {
        self.z_order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Element ids in paint order.
    pub fn order(&self) -> &[ElementId] {
        &self.z_order
    }

    /// Top-most element containing `point`.
    pub fn element_at(&self, point: Point) -> Option<ElementId> {
        self.z_order
            .iter()
            .rev()
            .find(|id| self.elements.get(id).is_some_and(|element| element.bounds().contains(point)))
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Plain records in paint order.
    pub fn export_layout(&self) -> Vec<LayoutRecord> {
        self.elements_ordered().map(Element::to_record).collect()
    }

    /// Replace the whole store with `records`. Records with invalid geometry
    /// are skipped. Returns how many were imported.
    pub fn import_layout(&mut self, records: Vec<LayoutRecord>) -> usize {
        self.clear();
        let total = records.len();
        let imported = self.add_elements(records.into_iter().map(ElementDraft::from)).len();
        if imported < total {
            log::warn!("Skipped {} layout records with invalid geometry", total - imported);
        }
        log::info!("Imported {imported} elements");
        imported
    }

    /// Serialize the layout records to JSON.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.export_layout())
    }

    /// Replace the store from a JSON array of layout records.
    pub fn import_json(&mut self, json: &str) -> Result<usize, serde_json::Error> {
        let records: Vec<LayoutRecord> = serde_json::from_str(json)?;
        Ok(self.import_layout(records))
    }

    /// Replace the store with `count` default-sized elements.
    ///
    /// When `count` fits the viewport grid the elements are laid out row by
    /// row at the cell pitch; otherwise they are scattered at random. Either
    /// way every origin stays within the default placement bounds.
    pub fn generate_test_elements(&mut self, count: usize) -> Vec<ElementId> {
        self.clear();
        let (max_x, max_y) = self.placement.max_origin();
        let capacity = self.placement.grid_capacity();
        let (columns, _) = self.placement.grid_dimensions();
        let use_grid = count <= capacity && columns > 0;
        log::info!(
            "Generating {count} test elements with {} layout (grid capacity {capacity}, max origin {max_x}x{max_y})",
            if use_grid { "grid" } else { "random" }
        );

        let size = self.placement.default_size;
        let mut ids = Vec::with_capacity(count);
        for index in 0..count {
            let (x, y) = if use_grid {
                let row = (index / columns) as f64;
                let column = (index % columns) as f64;
                (
                    column * self.placement.cell_pitch.width + self.placement.grid_margin,
                    row * self.placement.cell_pitch.height + self.placement.grid_margin,
                )
            } else {
                (self.rng.random::<f64>() * max_x, self.rng.random::<f64>() * max_y)
            };
            let position = Point::new(x.min(max_x).max(0.0), y.min(max_y).max(0.0));
            let element = Element::new(position, size.width, size.height, format!("Test element {}", index + 1));
            ids.push(self.insert(element).id());
        }
        ids
    }
}

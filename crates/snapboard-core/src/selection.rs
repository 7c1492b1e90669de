//! The selection set.

use crate::element::ElementId;

/// Selected element ids in the order they were selected.
///
/// This is the only selection in the engine; drag routing, grouping and
/// marquee all read and write it through the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    /// Replace the selection with a single element.
    pub fn select(&mut self, id: ElementId) -> bool {
        if self.ids.len() == 1 && self.ids[0] == id {
            return false;
        }
        self.ids.clear();
        self.ids.push(id);
        true
    }

    /// Add an element if it is not already selected.
    pub fn add(&mut self, id: ElementId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn remove(&mut self, id: ElementId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&selected| selected != id);
        self.ids.len() != before
    }

    /// Flip membership. Returns whether the element is selected afterwards.
    pub fn toggle(&mut self, id: ElementId) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    /// Replace the whole selection. Duplicates are dropped.
    pub fn replace<I>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = ElementId>,
    {
        let mut next: Vec<ElementId> = Vec::new();
        for id in ids {
            if !next.contains(&id) {
                next.push(id);
            }
        }
        if next == self.ids {
            return false;
        }
        self.ids = next;
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.ids.is_empty() {
            return false;
        }
        self.ids.clear();
        true
    }

    /// Drop ids for which `keep` returns false.
    pub fn retain<F>(&mut self, keep: F) -> bool
    where
        F: FnMut(&ElementId) -> bool,
    {
        let before = self.ids.len();
        self.ids.retain(keep);
        self.ids.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_select_replaces() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        assert!(selection.select(a));
        assert!(!selection.select(a));
        assert!(selection.select(b));
        assert_eq!(selection.ids(), &[b]);
    }

    #[test]
    fn test_toggle() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.select(a);
        assert!(selection.toggle(b));
        assert_eq!(selection.ids(), &[a, b]);
        assert!(!selection.toggle(a));
        assert_eq!(selection.ids(), &[b]);
    }

    #[test]
    fn test_replace_dedupes() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        assert!(selection.replace([a, b, a]));
        assert_eq!(selection.len(), 2);
        assert!(!selection.replace([a, b]));
    }

    #[test]
    fn test_clear_and_retain() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        assert!(!selection.clear());
        selection.replace([a, b]);
        assert!(selection.retain(|&id| id != a));
        assert_eq!(selection.ids(), &[b]);
        assert!(selection.clear());
        assert!(selection.is_empty());
    }
}

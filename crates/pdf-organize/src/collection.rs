//! The editable page/image collection
//!
//! Holds the ordered items that make up the output document and the transient
//! selection the edit operations act on. Display position is the page number;
//! there is no separate page-number field.

use crate::types::{ItemId, Rotation};
use log::{debug, warn};
use std::collections::HashSet;

/// One page or image in the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    /// Index into the source registry
    pub source_index: usize,
    /// Page (or image) position within the original source
    pub original_index: usize,
    /// Additional clockwise rotation chosen by the user
    pub rotation: Rotation,
    /// Rotation the source page already carries
    pub base_rotation: Rotation,
    /// Preview computed once at load time, never rotated
    pub thumbnail: Option<String>,
}

impl Item {
    pub fn new(id: ItemId, source_index: usize, original_index: usize) -> Self {
        Self {
            id,
            source_index,
            original_index,
            rotation: Rotation::None,
            base_rotation: Rotation::None,
            thumbnail: None,
        }
    }

    pub fn with_base_rotation(mut self, rotation: Rotation) -> Self {
        self.base_rotation = rotation;
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// Absolute orientation of the exported page.
    pub fn effective_rotation(&self) -> Rotation {
        self.base_rotation.combine(self.rotation)
    }
}

/// Ordered items plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    items: Vec<Item>,
    selection: HashSet<ItemId>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// 1-based display position, which is also the output page number.
    pub fn page_number(&self, id: &ItemId) -> Option<usize> {
        self.position(id).map(|idx| idx + 1)
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    // -------------------------------------------------------------------------
    // Order
    // -------------------------------------------------------------------------

    /// Append items at the tail, keeping their relative order.
    ///
    /// Items whose id is already present are dropped with a warning so the
    /// order never holds duplicates. Returns the number of items appended.
    pub fn append(&mut self, new_items: impl IntoIterator<Item = Item>) -> usize {
        let mut seen: HashSet<ItemId> = self.items.iter().map(|item| item.id.clone()).collect();
        let mut appended = 0;

        for item in new_items {
            if !seen.insert(item.id.clone()) {
                warn!("Dropping item with duplicate id {}", item.id);
                continue;
            }
            self.items.push(item);
            appended += 1;
        }

        appended
    }

    /// Move `id` to the position `target` currently occupies.
    ///
    /// Items in between shift by one; everything else keeps its relative
    /// order. Returns false (and does nothing) when the ids are equal or
    /// either is absent.
    pub fn reorder(&mut self, id: &ItemId, target: &ItemId) -> bool {
        if id == target {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(id), self.position(target)) else {
            return false;
        };

        let item = self.items.remove(from);
        self.items.insert(to, item);
        debug!("Moved item {} from position {} to {}", id, from + 1, to + 1);
        true
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Replace the selection with `{id}`, or toggle `id` when `additive`.
    ///
    /// Ids not present in the collection are ignored.
    pub fn toggle_selection(&mut self, id: &ItemId, additive: bool) {
        if self.position(id).is_none() {
            return;
        }

        if !additive {
            self.selection.clear();
            self.selection.insert(id.clone());
        } else if !self.selection.remove(id) {
            self.selection.insert(id.clone());
        }
    }

    pub fn select_all(&mut self) {
        self.selection = self.items.iter().map(|item| item.id.clone()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: &ItemId) -> bool {
        self.selection.contains(id)
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    /// Selected items in display order.
    pub fn selected_items(&self) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .filter(|item| self.selection.contains(&item.id))
    }

    // -------------------------------------------------------------------------
    // Edits on the selection
    // -------------------------------------------------------------------------

    /// Turn every selected item a quarter turn counter-clockwise.
    pub fn rotate_selected(&mut self) -> usize {
        let mut rotated = 0;
        for item in &mut self.items {
            if self.selection.contains(&item.id) {
                item.rotation = item.rotation.rotated_counter_clockwise();
                rotated += 1;
            }
        }
        rotated
    }

    /// Remove every selected item and clear the selection.
    pub fn delete_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }

        let before = self.items.len();
        let selection = std::mem::take(&mut self.selection);
        self.items.retain(|item| !selection.contains(&item.id));
        before - self.items.len()
    }

    /// Drop all items and the selection (session reset).
    pub fn clear(&mut self) {
        self.items.clear();
        self.selection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(collection: &Collection) -> Vec<&str> {
        collection.items().iter().map(|item| item.id.as_str()).collect()
    }

    fn sample(n: usize) -> Collection {
        let mut collection = Collection::new();
        collection.append((0..n).map(|i| Item::new(ItemId::new(format!("i{i}")), 0, i)));
        collection
    }

    #[test]
    fn reorder_forward_and_back() {
        let mut collection = sample(4);
        assert!(collection.reorder(&ItemId::new("i0"), &ItemId::new("i2")));
        assert_eq!(ids(&collection), ["i1", "i2", "i0", "i3"]);
        assert!(collection.reorder(&ItemId::new("i3"), &ItemId::new("i1")));
        assert_eq!(ids(&collection), ["i3", "i1", "i2", "i0"]);
    }

    #[test]
    fn toggle_ignores_unknown_ids() {
        let mut collection = sample(2);
        collection.toggle_selection(&ItemId::new("nope"), false);
        assert!(!collection.has_selection());
    }
}

//! Holder for the fetched item catalog.

use crate::data::Item;

/// The list of candidate items fetched once per search session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemCatalog {
    items: Vec<Item>,
}

impl ItemCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the catalog contents with a freshly fetched list.
    pub fn replace(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    /// All items, in fetch order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items that carry coordinates.
    pub fn geo_tagged(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.location.is_some())
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if there is nothing to search for.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

//! Ordered catalog of playable items

use super::{ItemId, PlayableItem};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Ordered, immutable sequence of playable items
///
/// Insertion order is playback order for next/previous when shuffle is off.
/// Cloning is cheap; the items are shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PlayableItem>", into = "Vec<PlayableItem>")]
pub struct Catalog {
    items: Arc<[PlayableItem]>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids
    pub fn new(items: Vec<PlayableItem>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(&item.id) {
                return Err(CoreError::DuplicateItem(item.id.clone()));
            }
        }

        Ok(Self {
            items: items.into(),
        })
    }

    /// Catalog with no items
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlayableItem> {
        self.items.get(index)
    }

    /// Index of the item with the given id
    pub fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayableItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[PlayableItem] {
        &self.items
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            items: Arc::from(Vec::new()),
        }
    }
}

impl TryFrom<Vec<PlayableItem>> for Catalog {
    type Error = CoreError;

    fn try_from(items: Vec<PlayableItem>) -> Result<Self> {
        Self::new(items)
    }
}

impl From<Catalog> for Vec<PlayableItem> {
    fn from(catalog: Catalog) -> Self {
        catalog.items.to_vec()
    }
}

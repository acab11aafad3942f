//! Favorites and playlist persistence over an injected key-value store
//!
//! The UI layer keeps a listener's favorite tracks and named playlists in
//! whatever string store the platform offers (browser local storage, a
//! settings table, a file). Values are JSON-serialized lists of item ids.
//!
//! # Example
//!
//! ```rust
//! use halaqa_core::{Favorites, MemoryStore};
//!
//! let mut favorites = Favorites::new(MemoryStore::default(), "quran");
//! assert!(favorites.toggle(&"018".into()).unwrap());
//! assert!(favorites.contains(&"018".into()).unwrap());
//! ```

use crate::error::{CoreError, Result};
use crate::types::ItemId;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Key prefix for favorites lists
pub const FAVORITES_PREFIX: &str = "favorites";

/// Key prefix for playlists
pub const PLAYLISTS_PREFIX: &str = "playlists";

/// String key-value store capability
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Read a JSON value, treating a corrupt entry as absent
///
/// Stores written by older builds of the portal may hold values in other
/// shapes; those are logged and replaced on the next write.
fn read_json<S, T>(store: &S, key: &str) -> Option<T>
where
    S: KeyValueStore + ?Sized,
    T: serde::de::DeserializeOwned,
{
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring unreadable value under {}: {}", key, e);
            None
        }
    }
}

fn write_json<S, T>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: serde::Serialize,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, raw)
}

/// Favorite items for one player, persisted under `favorites.<scope>`
#[derive(Debug)]
pub struct Favorites<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> Favorites<S> {
    /// Favorites scoped to one player (e.g. "quran", "nasheeds")
    pub fn new(store: S, scope: &str) -> Self {
        Self {
            store,
            key: format!("{}.{}", FAVORITES_PREFIX, scope),
        }
    }

    /// All favorites, oldest first
    pub fn list(&self) -> Result<Vec<ItemId>> {
        Ok(read_json(&self.store, &self.key).unwrap_or_default())
    }

    pub fn contains(&self, id: &ItemId) -> Result<bool> {
        Ok(self.list()?.contains(id))
    }

    /// Add or remove an item; returns whether it is now a favorite
    pub fn toggle(&mut self, id: &ItemId) -> Result<bool> {
        let mut ids = self.list()?;
        let now_favorite = if let Some(pos) = ids.iter().position(|x| x == id) {
            ids.remove(pos);
            false
        } else {
            ids.push(id.clone());
            true
        };

        write_json(&mut self.store, &self.key, &ids)?;
        debug!("Favorite {} -> {}", id, now_favorite);
        Ok(now_favorite)
    }

    /// Give the store back
    pub fn into_inner(self) -> S {
        self.store
    }
}

/// Named playlists for one player, persisted under `playlists.<scope>`
#[derive(Debug)]
pub struct Playlists<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> Playlists<S> {
    pub fn new(store: S, scope: &str) -> Self {
        Self {
            store,
            key: format!("{}.{}", PLAYLISTS_PREFIX, scope),
        }
    }

    fn load(&self) -> BTreeMap<String, Vec<ItemId>> {
        read_json(&self.store, &self.key).unwrap_or_default()
    }

    /// Playlist names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.load().into_keys().collect()
    }

    /// Create an empty playlist; existing playlists are left untouched
    pub fn create(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::invalid_input("Playlist name cannot be empty"));
        }

        let mut all = self.load();
        all.entry(name.to_string()).or_default();
        write_json(&mut self.store, &self.key, &all)
    }

    pub fn items(&self, name: &str) -> Result<Vec<ItemId>> {
        self.load()
            .remove(name)
            .ok_or_else(|| CoreError::PlaylistNotFound(name.to_string()))
    }

    /// Append an item; adding an item already in the playlist is a no-op
    pub fn add(&mut self, name: &str, id: ItemId) -> Result<()> {
        let mut all = self.load();
        let items = all
            .get_mut(name)
            .ok_or_else(|| CoreError::PlaylistNotFound(name.to_string()))?;

        if !items.contains(&id) {
            items.push(id);
        }
        write_json(&mut self.store, &self.key, &all)
    }

    /// Remove an item; returns whether it was present
    pub fn remove(&mut self, name: &str, id: &ItemId) -> Result<bool> {
        let mut all = self.load();
        let items = all
            .get_mut(name)
            .ok_or_else(|| CoreError::PlaylistNotFound(name.to_string()))?;

        let before = items.len();
        items.retain(|x| x != id);
        let removed = items.len() != before;

        write_json(&mut self.store, &self.key, &all)?;
        Ok(removed)
    }

    pub fn delete(&mut self, name: &str) -> Result<()> {
        let mut all = self.load();
        if all.remove(name).is_none() {
            return Err(CoreError::PlaylistNotFound(name.to_string()));
        }
        write_json(&mut self.store, &self.key, &all)
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

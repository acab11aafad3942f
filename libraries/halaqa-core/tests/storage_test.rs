//! Integration tests for catalogs and the favorites/playlist store

use halaqa_core::{
    Catalog, CoreError, Favorites, ItemId, KeyValueStore, MemoryStore, PlayableItem, Playlists,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z0-9]{1,6}", 0..30)
}

proptest! {
    /// Property: a catalog of unique ids finds every item at its position
    #[test]
    fn catalog_positions_match_insertion_order(raw in ids()) {
        let mut seen = HashSet::new();
        let unique: Vec<String> = raw.into_iter().filter(|id| seen.insert(id.clone())).collect();

        let catalog = Catalog::new(
            unique.iter().map(|id| PlayableItem::new(id.as_str(), id.to_uppercase())).collect(),
        ).unwrap();

        prop_assert_eq!(catalog.len(), unique.len());
        for (index, id) in unique.iter().enumerate() {
            prop_assert_eq!(catalog.position_of(&ItemId::new(id.as_str())), Some(index));
        }
    }

    /// Property: toggling the same id twice leaves favorites unchanged
    #[test]
    fn double_toggle_is_identity(existing in ids(), target in "[a-z0-9]{1,6}") {
        let mut favorites = Favorites::new(MemoryStore::default(), "quran");
        for id in &existing {
            if !favorites.contains(&ItemId::new(id.as_str())).unwrap() {
                favorites.toggle(&ItemId::new(id.as_str())).unwrap();
            }
        }
        let before = favorites.list().unwrap();

        let target = ItemId::new(target);
        let first = favorites.toggle(&target).unwrap();
        let second = favorites.toggle(&target).unwrap();

        prop_assert_ne!(first, second);
        let mut after = favorites.list().unwrap();
        let mut before_sorted = before;
        after.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        before_sorted.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        prop_assert_eq!(after, before_sorted);
    }

    /// Property: playlists never hold the same item twice
    #[test]
    fn playlist_adds_deduplicate(raw in ids()) {
        let mut playlists = Playlists::new(MemoryStore::default(), "nasheeds");
        playlists.create("Road trip").unwrap();
        for id in &raw {
            playlists.add("Road trip", ItemId::new(id.as_str())).unwrap();
        }

        let items = playlists.items("Road trip").unwrap();
        let distinct: HashSet<&str> = items.iter().map(|id| id.as_str()).collect();
        prop_assert_eq!(distinct.len(), items.len());
    }
}

#[test]
fn scopes_do_not_share_entries() {
    let mut quran = Favorites::new(MemoryStore::default(), "quran");
    quran.toggle(&ItemId::new("001")).unwrap();

    let mut podcasts = Favorites::new(quran.into_inner(), "podcasts");
    assert!(!podcasts.contains(&ItemId::new("001")).unwrap());
    podcasts.toggle(&ItemId::new("ep-12")).unwrap();

    let store = podcasts.into_inner();
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("favorites.quran").as_deref(), Some("[\"001\"]"));
}

#[test]
fn playlists_survive_store_handoff() {
    let mut playlists = Playlists::new(MemoryStore::default(), "quran");
    playlists.create("Juz Amma").unwrap();
    playlists.add("Juz Amma", ItemId::new("078")).unwrap();
    playlists.add("Juz Amma", ItemId::new("114")).unwrap();
    playlists.create("Morning").unwrap();

    let reopened = Playlists::new(playlists.into_inner(), "quran");
    assert_eq!(reopened.names(), vec!["Juz Amma".to_string(), "Morning".to_string()]);
    assert_eq!(
        reopened.items("Juz Amma").unwrap(),
        vec![ItemId::new("078"), ItemId::new("114")]
    );
}

#[test]
fn corrupt_entries_read_as_empty() {
    let mut store = MemoryStore::default();
    store.set("favorites.quran", "not json".to_string()).unwrap();

    let mut favorites = Favorites::new(store, "quran");
    assert!(favorites.list().unwrap().is_empty());

    // Next write replaces the corrupt value
    favorites.toggle(&ItemId::new("036")).unwrap();
    assert_eq!(favorites.list().unwrap(), vec![ItemId::new("036")]);
}

#[test]
fn missing_playlist_is_reported() {
    let mut playlists = Playlists::new(MemoryStore::default(), "quran");
    assert!(matches!(
        playlists.add("Nope", ItemId::new("001")),
        Err(CoreError::PlaylistNotFound(name)) if name == "Nope"
    ));
    assert!(matches!(
        playlists.create("   "),
        Err(CoreError::InvalidInput(_))
    ));
}

#[test]
fn catalog_deserializes_and_rejects_duplicates() {
    let json = r#"[{"id":"001","title":"Al-Fatiha"},{"id":"002","title":"Al-Baqarah","kind":"recitation"}]"#;
    let catalog: Catalog = serde_json::from_str(json).unwrap();
    assert_eq!(catalog.len(), 2);

    let duplicate = r#"[{"id":"001","title":"A"},{"id":"001","title":"B"}]"#;
    assert!(serde_json::from_str::<Catalog>(duplicate).is_err());
}

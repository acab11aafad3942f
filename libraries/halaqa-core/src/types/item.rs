//! Playable item type

use super::ItemId;
use serde::{Deserialize, Serialize};

/// What kind of audio an item is
///
/// The UI uses this to pick a player variant; the session controller
/// treats every kind the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Quran recitation (one surah or juz)
    Recitation,
    /// Nasheed track
    Nasheed,
    /// Podcast episode
    Podcast,
    /// Live stream, no known duration
    LiveStream,
    #[default]
    Other,
}

/// One audio track in a catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayableItem {
    /// Stable key, unique within a catalog
    pub id: ItemId,

    /// Display title
    pub title: String,

    /// Reciter, munshid or host
    pub artist: Option<String>,

    /// Advisory duration in seconds
    ///
    /// The authoritative duration comes from the playback output once the
    /// source has loaded.
    pub duration_hint: Option<f64>,

    /// Resolved audio URL, absent until the catalog provider resolves it
    pub source_url: Option<String>,

    /// Player variant hint
    #[serde(default)]
    pub kind: ItemKind,
}

impl PlayableItem {
    /// Create an item with only an id and a title
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: None,
            duration_hint: None,
            source_url: None,
            kind: ItemKind::Other,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_duration_hint(mut self, seconds: f64) -> Self {
        self.duration_hint = Some(seconds);
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether the item is an open-ended stream
    pub fn is_live(&self) -> bool {
        self.kind == ItemKind::LiveStream
    }
}

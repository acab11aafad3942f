//! Halaqa Player Core
//!
//! Platform-agnostic types, collaborator traits, and error handling shared by
//! the portal's audio players (Quran recitation, nasheeds, podcasts, live
//! streams).
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `PlayableItem`, `ItemId`, `Catalog`
//! - **Collaborator Traits**: `PlaybackOutput`, `CatalogProvider`, `KeyValueStore`
//! - **Persistence Helpers**: `Favorites`, `Playlists` over any `KeyValueStore`
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use halaqa_core::types::{Catalog, PlayableItem};
//!
//! let catalog = Catalog::new(vec![
//!     PlayableItem::new("001", "Al-Fatiha").with_duration_hint(47.0),
//!     PlayableItem::new("002", "Al-Baqarah"),
//! ])
//! .unwrap();
//!
//! assert_eq!(catalog.len(), 2);
//! assert_eq!(catalog.position_of(&"002".into()), Some(1));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod storage;
pub mod traits;
pub mod types;

pub use error::{CoreError, Result};
pub use storage::{Favorites, KeyValueStore, MemoryStore, Playlists};
pub use traits::{CatalogProvider, LoadTicket, PlaybackOutput, SourceResolution, UrlTemplateProvider};
pub use types::{Catalog, ItemId, ItemKind, PlayableItem};

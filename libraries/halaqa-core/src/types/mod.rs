mod catalog;
mod ids;
mod item;

pub use catalog::Catalog;
pub use ids::ItemId;
pub use item::{ItemKind, PlayableItem};

/// Collaborator traits for Halaqa Player
///
/// The session controller talks to exactly two outside parties: the
/// playback output that renders audio and the catalog provider that turns
/// an item into a playable URL. Both are consumed through these traits so the
/// controller runs unchanged against a browser audio element bridge, a native
/// decoder, or a test double.
use crate::types::{ItemId, PlayableItem};
use serde::{Deserialize, Serialize};

/// Audio output primitive
///
/// Commands are fire-and-forget. The output reports what actually happened
/// through events the owner feeds back into the controller, echoing the
/// `generation` passed to the `load_source` call that produced them.
pub trait PlaybackOutput: Send {
    /// Start loading a new source, abandoning whatever was loaded before
    fn load_source(&mut self, url: &str, generation: u64);

    /// Start or resume producing audio
    fn play(&mut self);

    /// Stop advancing, keep the source loaded
    fn pause(&mut self);

    /// Jump to a position in seconds
    fn seek(&mut self, seconds: f64);

    /// Output gain in [0, 1]
    fn set_volume(&mut self, volume: f64);

    /// Playback speed multiplier
    fn set_playback_rate(&mut self, rate: f64);

    /// Detach listeners and free the device
    ///
    /// Called once when the owning controller is disposed.
    fn release(&mut self) {}
}

/// Identifies one `load()` request
///
/// Deferred resolutions hand the ticket back so the controller can tell
/// whether the load it belongs to is still current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadTicket {
    /// Load generation the resolution belongs to
    pub generation: u64,
    /// Catalog index being loaded
    pub index: usize,
    /// Item being loaded
    pub item_id: ItemId,
}

/// Outcome of asking the provider for a source URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceResolution {
    /// URL available now
    Ready(String),
    /// The provider will answer later through the owner's event loop
    Deferred,
    /// The item cannot be resolved
    Failed(String),
}

/// Resolves playable URLs for catalog items
pub trait CatalogProvider: Send {
    fn resolve_source_url(&mut self, item: &PlayableItem, ticket: &LoadTicket)
        -> SourceResolution;
}

impl<F> CatalogProvider for F
where
    F: FnMut(&PlayableItem, &LoadTicket) -> SourceResolution + Send,
{
    fn resolve_source_url(
        &mut self,
        item: &PlayableItem,
        ticket: &LoadTicket,
    ) -> SourceResolution {
        self(item, ticket)
    }
}

/// Provider that builds URLs from a template
///
/// `{id}` in the template is replaced with the item id, e.g.
/// `https://audio.example.org/alafasy/{id}.mp3`.
#[derive(Debug, Clone)]
pub struct UrlTemplateProvider {
    template: String,
}

impl UrlTemplateProvider {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl CatalogProvider for UrlTemplateProvider {
    fn resolve_source_url(
        &mut self,
        item: &PlayableItem,
        _ticket: &LoadTicket,
    ) -> SourceResolution {
        if !self.template.contains("{id}") {
            return SourceResolution::Failed(format!(
                "URL template has no {{id}} placeholder: {}",
                self.template
            ));
        }
        SourceResolution::Ready(self.template.replace("{id}", item.id.as_str()))
    }
}

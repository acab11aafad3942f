//! Halaqa Player - Media Session
//!
//! Platform-agnostic media session controller for Halaqa Player.
//!
//! This crate provides:
//! - One controller per player widget, bound to one catalog and one output
//! - Confirmation-based status (`Playing` only after the output says so)
//! - Stale-load protection through generation-tagged output events
//! - Sequential and shuffle advance, repeat-one, bounded end-of-track retry
//! - Volume, mute and playback rate with clamping
//! - Snapshot subscriptions and an async tokio driver
//!
//! # Architecture
//!
//! `halaqa-playback` never touches a device. Audio rendering is behind
//! [`halaqa_core::PlaybackOutput`]; URL lookup is behind
//! [`halaqa_core::CatalogProvider`]. The controller is a synchronous state
//! machine: the owner feeds it commands and [`OutputEvent`]s, and it answers
//! with commands to the output and state snapshots to subscribers.
//!
//! # Example: Driving a Session
//!
//! ```rust
//! use halaqa_core::{Catalog, LoadTicket, PlayableItem, PlaybackOutput, SourceResolution};
//! use halaqa_playback::{MediaSessionController, OutputEvent, SessionConfig, SessionStatus};
//!
//! struct Silent;
//!
//! impl PlaybackOutput for Silent {
//!     fn load_source(&mut self, _url: &str, _generation: u64) {}
//!     fn play(&mut self) {}
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, _seconds: f64) {}
//!     fn set_volume(&mut self, _volume: f64) {}
//!     fn set_playback_rate(&mut self, _rate: f64) {}
//! }
//!
//! let provider = |item: &PlayableItem, _: &LoadTicket| {
//!     SourceResolution::Ready(format!("https://audio.example.org/{}.mp3", item.id))
//! };
//! let mut session = MediaSessionController::new(Silent, provider, &SessionConfig::default());
//!
//! let catalog = Catalog::new(vec![
//!     PlayableItem::new("001", "Al-Fatiha"),
//!     PlayableItem::new("002", "Al-Baqarah"),
//! ])
//! .unwrap();
//! session.load(catalog, 0);
//! session.play();
//!
//! // The output reports back, tagged with the load generation
//! let generation = session.generation();
//! session.handle_output_event(OutputEvent::metadata_loaded(generation, 47.0));
//! session.handle_output_event(OutputEvent::playing(generation));
//!
//! assert_eq!(session.status(), SessionStatus::Playing);
//! ```

mod advance;
mod config;
mod controller;
mod driver;
mod error;
mod events;
mod subscribers;
pub mod types;
mod volume;

// Public exports
pub use advance::{IndexPicker, RandomPicker};
pub use config::{SessionConfig, ENV_PREFIX, MAX_END_OF_TRACK_RETRIES};
pub use controller::MediaSessionController;
pub use driver::{session_channel, SessionCommand, SessionHandle, SessionInbox};
pub use error::{PlaybackError, Result, SessionError};
pub use events::{OutputEvent, OutputEventKind};
pub use subscribers::{Listener, SubscriptionId};
pub use types::{
    PlayOutcome, SessionState, SessionStatus, VolumeCurve, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE,
};

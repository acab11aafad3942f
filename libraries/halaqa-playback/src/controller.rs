//! Media session controller - core orchestration
//!
//! Mediates between a catalog, one playback output and the caller's intent,
//! keeping `SessionState` in line with what the output actually reports.
//!
//! Commands never flip status optimistically (seek excepted): `play()` sends
//! the command and the session becomes `Playing` when the output confirms.
//! Every load bumps the generation counter; output events and deferred URL
//! resolutions tagged with an older generation are dropped.

use crate::{
    advance::{next_index, previous_index, IndexPicker, RandomPicker},
    config::{SessionConfig, MAX_END_OF_TRACK_RETRIES},
    error::SessionError,
    events::{OutputEvent, OutputEventKind},
    subscribers::{Listener, Subscribers, SubscriptionId},
    types::{PlayOutcome, SessionState, SessionStatus, POSITION_EPSILON},
    volume::{clamp_playback_rate, Volume},
};
use halaqa_core::{
    Catalog, CatalogProvider, LoadTicket, PlayableItem, PlaybackOutput, SourceResolution,
};
use tracing::{debug, info, warn};

/// Why the current load was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadOrigin {
    /// Explicit load, skip, selection or retry
    User,

    /// Automatic advance after the previous item ended
    EndOfTrack { retries_left: u32 },
}

/// Playback session for one catalog and one output
///
/// Owns the output exclusively. Dropping the controller (or calling
/// [`dispose`](Self::dispose)) releases the output and every subscriber.
pub struct MediaSessionController {
    catalog: Catalog,
    state: SessionState,

    output: Box<dyn PlaybackOutput>,
    provider: Box<dyn CatalogProvider>,
    picker: Box<dyn IndexPicker>,

    volume: Volume,
    subscribers: Subscribers,
    last_published: Option<SessionState>,

    load_origin: LoadOrigin,
    // Waiting on a deferred URL for the current generation
    awaiting_resolution: bool,
    // play() arrived while loading
    play_pending: bool,
    status_before_buffering: SessionStatus,
    max_end_of_track_retries: u32,

    disposed: bool,
}

impl MediaSessionController {
    /// Create a controller bound to `output`
    ///
    /// Applies the configured volume and playback rate to the output right
    /// away. The catalog starts empty.
    pub fn new<O, P>(output: O, provider: P, config: &SessionConfig) -> Self
    where
        O: PlaybackOutput + 'static,
        P: CatalogProvider + 'static,
    {
        let mut volume = Volume::new(config.volume, config.volume_curve);
        volume.set_muted(config.muted);

        let playback_rate = clamp_playback_rate(config.playback_rate).unwrap_or(1.0);

        let state = SessionState {
            volume: volume.level(),
            muted: volume.is_muted(),
            playback_rate,
            repeat_one: config.repeat_one,
            shuffle: config.shuffle,
            ..SessionState::default()
        };

        let mut controller = Self {
            catalog: Catalog::empty(),
            state,
            output: Box::new(output),
            provider: Box::new(provider),
            picker: Box::new(RandomPicker::new()),
            volume,
            subscribers: Subscribers::new(),
            last_published: None,
            load_origin: LoadOrigin::User,
            awaiting_resolution: false,
            play_pending: false,
            status_before_buffering: SessionStatus::Idle,
            max_end_of_track_retries: config
                .max_end_of_track_retries
                .min(MAX_END_OF_TRACK_RETRIES),
            disposed: false,
        };

        controller.output.set_volume(controller.volume.gain());
        controller.output.set_playback_rate(playback_rate);
        controller
    }

    /// Replace the shuffle picker
    pub fn with_picker(mut self, picker: impl IndexPicker + 'static) -> Self {
        self.picker = Box::new(picker);
        self
    }

    // ===== Loading =====

    /// Replace the catalog and load the item at `start_index`
    ///
    /// The index is clamped to the catalog. An empty catalog leaves the
    /// session `Idle` with nothing current. Any load still in flight is
    /// superseded.
    pub fn load(&mut self, catalog: Catalog, start_index: usize) {
        if self.disposed {
            return;
        }

        info!(
            "Loading catalog of {} items at index {}",
            catalog.len(),
            start_index
        );
        self.catalog = catalog;
        self.load_index(start_index, LoadOrigin::User);
    }

    /// Jump to an index in the current catalog and start playing
    ///
    /// Returns `false` when the index is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if self.disposed || index >= self.catalog.len() {
            return false;
        }

        self.load_index(index, LoadOrigin::User);
        self.play();
        true
    }

    /// Reload the current item and play it
    pub fn retry(&mut self) -> PlayOutcome {
        if self.disposed {
            return PlayOutcome::Ignored;
        }
        let Some(index) = self.state.current_index else {
            return PlayOutcome::Ignored;
        };

        info!("Retrying item at index {}", index);
        self.load_index(index, LoadOrigin::User);
        self.play()
    }

    /// Deliver a deferred URL resolution
    ///
    /// Returns `false` when the ticket belongs to a superseded load.
    pub fn complete_source_resolution(
        &mut self,
        ticket: &LoadTicket,
        result: std::result::Result<String, String>,
    ) -> bool {
        if self.disposed
            || !self.awaiting_resolution
            || ticket.generation != self.state.generation
        {
            debug!(
                "Discarding source resolution for {} (generation {}, current {})",
                ticket.item_id, ticket.generation, self.state.generation
            );
            return false;
        }

        self.awaiting_resolution = false;
        match result {
            Ok(url) => self.issue_load(&url),
            Err(reason) => self.fail_load(reason),
        }
        true
    }

    /// Returns the origin for the next attempt when the provider failed
    /// synchronously on an end-of-track load with retries left.
    fn load_index(&mut self, index: usize, origin: LoadOrigin) -> Option<LoadOrigin> {
        self.state.generation += 1;
        self.load_origin = origin;
        self.play_pending = false;
        self.awaiting_resolution = false;
        self.state.position_seconds = 0.0;
        self.state.duration_seconds = None;

        if self.catalog.is_empty() {
            self.state.current_index = None;
            self.state.current_item = None;
            self.state.status = SessionStatus::Idle;
            self.publish();
            return None;
        }

        let catalog = self.catalog.clone();
        let index = index.min(catalog.len() - 1);
        let item = &catalog.items()[index];

        self.state.current_index = Some(index);
        self.state.current_item = Some(item.id.clone());
        self.state.status = SessionStatus::Idle;

        let resolution = match &item.source_url {
            Some(url) => SourceResolution::Ready(url.clone()),
            None => {
                let ticket = LoadTicket {
                    generation: self.state.generation,
                    index,
                    item_id: item.id.clone(),
                };
                self.provider.resolve_source_url(item, &ticket)
            }
        };

        match resolution {
            SourceResolution::Ready(url) => {
                self.issue_load(&url);
                None
            }
            SourceResolution::Deferred => {
                debug!(
                    "Waiting on source URL for {} (generation {})",
                    item.id, self.state.generation
                );
                self.awaiting_resolution = true;
                self.state.status = SessionStatus::Loading;
                self.publish();
                None
            }
            SourceResolution::Failed(reason) => self.record_load_failure(reason),
        }
    }

    fn issue_load(&mut self, url: &str) {
        debug!("Opening {} (generation {})", url, self.state.generation);
        self.state.status = SessionStatus::Loading;
        self.output.load_source(url, self.state.generation);
        self.output.set_volume(self.volume.gain());
        self.output.set_playback_rate(self.state.playback_rate);
        self.publish();
    }

    fn fail_load(&mut self, reason: String) {
        if let Some(origin) = self.record_load_failure(reason) {
            self.advance(origin);
        }
    }

    /// Surface a load failure; returns the origin for the next attempt when
    /// an end-of-track advance still has retries left
    fn record_load_failure(&mut self, reason: String) -> Option<LoadOrigin> {
        let item = self.state.current_item.clone()?;

        let origin = self.load_origin;
        let error = match origin {
            LoadOrigin::User => SessionError::Load { item, reason },
            LoadOrigin::EndOfTrack { .. } => SessionError::EndOfTrackLoad { item, reason },
        };
        warn!("{}", error);

        self.state.status = SessionStatus::Errored;
        self.state.last_error = Some(error);
        self.play_pending = false;
        self.awaiting_resolution = false;
        self.publish();

        match origin {
            LoadOrigin::EndOfTrack { retries_left } if retries_left > 0 => {
                info!("Skipping unplayable item, {} retries left", retries_left - 1);
                Some(LoadOrigin::EndOfTrack {
                    retries_left: retries_left - 1,
                })
            }
            LoadOrigin::EndOfTrack { .. } => {
                warn!("Stopping after consecutive load failures");
                None
            }
            LoadOrigin::User => None,
        }
    }

    // ===== Playback Control =====

    /// Ask the output to start or resume
    ///
    /// Does not change status; `Playing` follows the output's confirmation.
    pub fn play(&mut self) -> PlayOutcome {
        if self.disposed || self.state.current_index.is_none() {
            return PlayOutcome::Ignored;
        }

        match self.state.status {
            SessionStatus::Ready | SessionStatus::Paused => {
                self.output.play();
                PlayOutcome::Requested
            }
            SessionStatus::Ended => {
                // Replay a finished item from the top
                self.output.seek(0.0);
                self.state.position_seconds = 0.0;
                self.output.play();
                self.publish();
                PlayOutcome::Requested
            }
            SessionStatus::Loading => {
                self.play_pending = true;
                PlayOutcome::Deferred
            }
            SessionStatus::Buffering => {
                if self.status_before_buffering == SessionStatus::Playing {
                    PlayOutcome::Ignored
                } else {
                    self.output.play();
                    PlayOutcome::Requested
                }
            }
            SessionStatus::Playing | SessionStatus::Idle => PlayOutcome::Ignored,
            SessionStatus::Errored => match &self.state.last_error {
                Some(error) => PlayOutcome::Rejected(error.clone()),
                None => PlayOutcome::Ignored,
            },
        }
    }

    /// Ask the output to pause
    ///
    /// No-op unless playing, buffering or waiting to play after a load.
    pub fn pause(&mut self) {
        if self.disposed {
            return;
        }

        match self.state.status {
            SessionStatus::Playing | SessionStatus::Buffering => self.output.pause(),
            SessionStatus::Loading => self.play_pending = false,
            _ => {}
        }
    }

    /// Pause and rewind to the start
    ///
    /// Leaves the session `Ready` when an item is loaded, `Idle` otherwise.
    /// A load in flight keeps going but will not auto-play. An `Errored`
    /// session stays `Errored` until a retry or another load.
    pub fn stop(&mut self) {
        if self.disposed {
            return;
        }

        self.play_pending = false;

        let status = self.state.status;
        if matches!(status, SessionStatus::Playing | SessionStatus::Buffering) {
            self.output.pause();
        }

        if status.is_loaded() {
            self.output.seek(0.0);
            self.state.position_seconds = 0.0;
            self.state.status = SessionStatus::Ready;
        } else if status == SessionStatus::Errored {
            self.state.position_seconds = 0.0;
        } else if status != SessionStatus::Loading {
            self.state.position_seconds = 0.0;
            self.state.status = SessionStatus::Idle;
        }

        self.publish();
    }

    /// Jump to a position in seconds
    ///
    /// Clamped to `[0, duration]`, or to `>= 0` while the duration is
    /// unknown. The position is updated immediately.
    pub fn seek(&mut self, target_seconds: f64) {
        if self.disposed || target_seconds.is_nan() {
            return;
        }
        if !self.state.status.is_loaded() {
            debug!("Ignoring seek while {:?}", self.state.status);
            return;
        }

        let mut target = target_seconds.max(0.0);
        if let Some(duration) = self.state.duration_seconds {
            target = target.min(duration);
        }
        if !target.is_finite() {
            return;
        }

        self.output.seek(target);
        self.state.position_seconds = target;

        if self.state.status == SessionStatus::Ended
            && !matches!(self.state.duration_seconds, Some(d) if target >= d)
        {
            self.state.status = SessionStatus::Paused;
        }

        self.publish();
    }

    /// Move to the next item and play it
    ///
    /// Always moves, even with repeat-one on.
    pub fn skip_next(&mut self) {
        if self.disposed {
            return;
        }
        self.advance(LoadOrigin::User);
    }

    /// Move to the previous item and play it
    ///
    /// Strictly sequential: shuffle does not apply to "previous".
    pub fn skip_previous(&mut self) {
        if self.disposed {
            return;
        }

        let Some(index) = previous_index(self.state.current_index, self.catalog.len()) else {
            return;
        };

        debug!("Skipping back to index {}", index);
        self.load_index(index, LoadOrigin::User);
        self.play();
    }

    fn advance(&mut self, mut origin: LoadOrigin) {
        loop {
            let Some(index) = next_index(
                self.state.current_index,
                self.catalog.len(),
                self.state.shuffle,
                self.picker.as_mut(),
            ) else {
                return;
            };

            debug!("Advancing to index {}", index);
            match self.load_index(index, origin) {
                Some(next) => origin = next,
                None => break,
            }
        }
        self.play();
    }

    fn on_track_ended(&mut self) {
        if self.state.repeat_one {
            debug!("Repeating current item");
            self.seek(0.0);
            self.play();
        } else {
            // One attempt per remaining item in sequential order at most
            let others = u32::try_from(self.catalog.len().saturating_sub(2)).unwrap_or(u32::MAX);
            self.advance(LoadOrigin::EndOfTrack {
                retries_left: self.max_end_of_track_retries.min(others),
            });
        }
    }

    // ===== Volume, Rate, Modes =====

    /// Set volume in [0, 1]; NaN is ignored
    pub fn set_volume(&mut self, volume: f64) {
        if self.disposed || !self.volume.set_level(volume) {
            return;
        }

        self.state.volume = self.volume.level();
        self.output.set_volume(self.volume.gain());
        self.publish();
    }

    /// Mute or unmute, keeping the volume level
    pub fn set_muted(&mut self, muted: bool) {
        if self.disposed {
            return;
        }

        self.volume.set_muted(muted);
        self.state.muted = muted;
        self.output.set_volume(self.volume.gain());
        self.publish();
    }

    /// Set playback speed, clamped to [0.25, 4.0]; NaN is ignored
    pub fn set_playback_rate(&mut self, rate: f64) {
        if self.disposed {
            return;
        }
        let Some(rate) = clamp_playback_rate(rate) else {
            return;
        };

        self.state.playback_rate = rate;
        self.output.set_playback_rate(rate);
        self.publish();
    }

    pub fn set_repeat_one(&mut self, repeat_one: bool) {
        if self.disposed {
            return;
        }
        self.state.repeat_one = repeat_one;
        self.publish();
    }

    pub fn set_shuffle(&mut self, shuffle: bool) {
        if self.disposed {
            return;
        }
        self.state.shuffle = shuffle;
        self.publish();
    }

    // ===== Output Events =====

    /// Apply an event raised by the playback output
    ///
    /// Events from a superseded load are dropped.
    pub fn handle_output_event(&mut self, event: OutputEvent) {
        if self.disposed {
            return;
        }
        if event.generation != self.state.generation {
            debug!(
                "Discarding {:?} from stale load (generation {}, current {})",
                event.kind, event.generation, self.state.generation
            );
            return;
        }

        let status = self.state.status;
        match event.kind {
            OutputEventKind::LoadStart => {
                if status == SessionStatus::Idle {
                    self.state.status = SessionStatus::Loading;
                }
            }
            OutputEventKind::MetadataLoaded { duration_seconds } => {
                self.state.duration_seconds =
                    duration_seconds.filter(|d| d.is_finite() && *d >= 0.0);
                self.clamp_position();

                if status == SessionStatus::Loading && !self.awaiting_resolution {
                    self.state.status = SessionStatus::Ready;
                    self.state.last_error = None;
                    info!(
                        "Loaded {:?} ({:?}s)",
                        self.state.current_item, self.state.duration_seconds
                    );

                    if self.play_pending {
                        self.play_pending = false;
                        self.output.play();
                    }
                }
            }
            OutputEventKind::Buffering { active: true } => {
                if matches!(
                    status,
                    SessionStatus::Playing | SessionStatus::Paused | SessionStatus::Ready
                ) {
                    self.status_before_buffering = status;
                    self.state.status = SessionStatus::Buffering;
                }
            }
            OutputEventKind::Buffering { active: false } => {
                if status == SessionStatus::Buffering {
                    self.state.status = self.status_before_buffering;
                }
            }
            OutputEventKind::Playing => {
                if matches!(
                    status,
                    SessionStatus::Ready
                        | SessionStatus::Paused
                        | SessionStatus::Buffering
                        | SessionStatus::Ended
                        | SessionStatus::Loading
                ) {
                    if status == SessionStatus::Loading {
                        self.state.last_error = None;
                    }
                    self.play_pending = false;
                    self.state.status = SessionStatus::Playing;
                }
            }
            OutputEventKind::Paused => {
                if matches!(status, SessionStatus::Playing | SessionStatus::Buffering) {
                    self.state.status = SessionStatus::Paused;
                }
            }
            OutputEventKind::TimeUpdate { position_seconds } => {
                if position_seconds.is_finite() && status.is_loaded() {
                    self.state.position_seconds = position_seconds.max(0.0);
                    self.clamp_position();
                }
            }
            OutputEventKind::Error { message } => match status {
                SessionStatus::Loading => {
                    self.fail_load(message);
                    return;
                }
                SessionStatus::Errored | SessionStatus::Idle => {
                    debug!("Ignoring output error while {:?}: {}", status, message);
                }
                _ => self.fail_playback(message),
            },
            OutputEventKind::Ended => {
                if status.is_loaded() && status != SessionStatus::Ended {
                    if let Some(duration) = self.state.duration_seconds {
                        self.state.position_seconds = duration;
                    }
                    self.state.status = SessionStatus::Ended;
                    self.publish();
                    self.on_track_ended();
                    return;
                }
            }
        }

        self.publish();
    }

    fn fail_playback(&mut self, reason: String) {
        let Some(item) = self.state.current_item.clone() else {
            return;
        };

        let error = SessionError::Playback { item, reason };
        warn!("{}", error);

        // No auto-advance: a broken catalog must not be skipped through silently
        self.state.status = SessionStatus::Errored;
        self.state.last_error = Some(error);
        self.play_pending = false;
    }

    fn clamp_position(&mut self) {
        if let Some(duration) = self.state.duration_seconds {
            if self.state.position_seconds > duration + POSITION_EPSILON {
                debug!(
                    "Position {} past duration {}",
                    self.state.position_seconds, duration
                );
            }
            self.state.position_seconds = self.state.position_seconds.min(duration);
        }
    }

    // ===== Subscriptions =====

    /// Register a listener for state snapshots
    ///
    /// The listener receives the current snapshot immediately, then one per
    /// change.
    pub fn subscribe(&mut self, mut listener: Listener) -> SubscriptionId {
        listener(&self.state);
        self.last_published = Some(self.state.clone());
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn publish(&mut self) {
        if self.last_published.as_ref() == Some(&self.state) {
            return;
        }
        self.last_published = Some(self.state.clone());
        self.subscribers.notify(&self.state);
    }

    // ===== State Queries =====

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_item(&self) -> Option<&PlayableItem> {
        self.state
            .current_index
            .and_then(|index| self.catalog.get(index))
    }

    pub fn generation(&self) -> u64 {
        self.state.generation
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ===== Teardown =====

    /// Release the output and every subscriber
    ///
    /// Idempotent. Later operations and events are ignored.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        self.disposed = true;
        self.state.generation += 1;
        self.play_pending = false;
        self.awaiting_resolution = false;
        self.subscribers.clear();
        self.output.release();
        info!("Media session disposed");
    }
}

impl Drop for MediaSessionController {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for MediaSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSessionController")
            .field("catalog_len", &self.catalog.len())
            .field("state", &self.state)
            .field("subscribers", &self.subscribers)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halaqa_core::ItemId;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Load(String, u64),
        Play,
        Pause,
        Seek(f64),
        Volume(f64),
        Rate(f64),
        Release,
    }

    #[derive(Clone, Default)]
    struct Output {
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl Output {
        fn take(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    impl PlaybackOutput for Output {
        fn load_source(&mut self, url: &str, generation: u64) {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Load(url.to_string(), generation));
        }
        fn play(&mut self) {
            self.calls.lock().unwrap().push(Call::Play);
        }
        fn pause(&mut self) {
            self.calls.lock().unwrap().push(Call::Pause);
        }
        fn seek(&mut self, seconds: f64) {
            self.calls.lock().unwrap().push(Call::Seek(seconds));
        }
        fn set_volume(&mut self, volume: f64) {
            self.calls.lock().unwrap().push(Call::Volume(volume));
        }
        fn set_playback_rate(&mut self, rate: f64) {
            self.calls.lock().unwrap().push(Call::Rate(rate));
        }
        fn release(&mut self) {
            self.calls.lock().unwrap().push(Call::Release);
        }
    }

    fn provider(item: &PlayableItem, _ticket: &LoadTicket) -> SourceResolution {
        SourceResolution::Ready(format!("mem://{}", item.id))
    }

    fn catalog(n: usize) -> Catalog {
        Catalog::new(
            (0..n)
                .map(|i| PlayableItem::new(format!("t{}", i), format!("Track {}", i)))
                .collect(),
        )
        .unwrap()
    }

    fn controller() -> (MediaSessionController, Output) {
        let output = Output::default();
        let controller =
            MediaSessionController::new(output.clone(), provider, &SessionConfig::default());
        output.take();
        (controller, output)
    }

    /// Load `index` and bring it to Ready with the given duration
    fn ready(controller: &mut MediaSessionController, index: usize, duration: f64) {
        controller.load(catalog(3), index);
        let generation = controller.generation();
        controller.handle_output_event(OutputEvent::metadata_loaded(generation, duration));
    }

    #[test]
    fn new_applies_initial_volume_and_rate() {
        let output = Output::default();
        let config = SessionConfig {
            volume: 0.5,
            playback_rate: 1.5,
            ..SessionConfig::default()
        };
        let _controller = MediaSessionController::new(output.clone(), provider, &config);

        assert_eq!(output.take(), vec![Call::Volume(0.5), Call::Rate(1.5)]);
    }

    #[test]
    fn load_issues_tagged_load_command() {
        let (mut controller, output) = controller();
        controller.load(catalog(3), 1);

        let state = controller.snapshot();
        assert_eq!(state.status, SessionStatus::Loading);
        assert_eq!(state.current_index, Some(1));
        assert_eq!(state.current_item, Some(ItemId::new("t1")));
        assert_eq!(output.take()[0], Call::Load("mem://t1".to_string(), 1));
    }

    #[test]
    fn load_clamps_start_index() {
        let (mut controller, _output) = controller();
        controller.load(catalog(3), 10);
        assert_eq!(controller.snapshot().current_index, Some(2));
    }

    #[test]
    fn empty_catalog_is_idle_not_error() {
        let (mut controller, output) = controller();
        controller.load(Catalog::empty(), 0);

        let state = controller.snapshot();
        assert_eq!(state.status, SessionStatus::Idle);
        assert_eq!(state.current_index, None);
        assert!(state.last_error.is_none());
        assert_eq!(controller.play(), PlayOutcome::Ignored);
        assert!(output.take().is_empty());
    }

    #[test]
    fn item_url_skips_provider() {
        let output = Output::default();
        let mut controller = MediaSessionController::new(
            output.clone(),
            |_: &PlayableItem, _: &LoadTicket| SourceResolution::Failed("unused".to_string()),
            &SessionConfig::default(),
        );
        let catalog =
            Catalog::new(vec![PlayableItem::new("a", "A").with_source_url("https://x/a.mp3")])
                .unwrap();

        controller.load(catalog, 0);
        assert_eq!(controller.status(), SessionStatus::Loading);
    }

    #[test]
    fn play_waits_for_confirmation() {
        let (mut controller, output) = controller();
        controller.load(catalog(2), 0);
        controller.handle_output_event(OutputEvent::metadata_loaded(1, 30.0));
        output.take();

        assert_eq!(controller.play(), PlayOutcome::Requested);
        assert_eq!(controller.status(), SessionStatus::Ready);
        assert_eq!(output.take(), vec![Call::Play]);

        controller.handle_output_event(OutputEvent::playing(1));
        assert_eq!(controller.status(), SessionStatus::Playing);
    }

    #[test]
    fn play_while_loading_is_deferred() {
        let (mut controller, output) = controller();
        controller.load(catalog(2), 0);
        output.take();

        assert_eq!(controller.play(), PlayOutcome::Deferred);
        assert!(output.take().is_empty());

        controller.handle_output_event(OutputEvent::metadata_loaded(1, 30.0));
        assert_eq!(output.take(), vec![Call::Play]);
    }

    #[test]
    fn pause_then_confirmation() {
        let (mut controller, output) = controller();
        ready(&mut controller, 0, 30.0);
        controller.handle_output_event(OutputEvent::playing(controller.generation()));
        output.take();

        controller.pause();
        assert_eq!(output.take(), vec![Call::Pause]);
        assert_eq!(controller.status(), SessionStatus::Playing);

        controller.handle_output_event(OutputEvent::paused(controller.generation()));
        assert_eq!(controller.status(), SessionStatus::Paused);

        // Already paused
        controller.pause();
        assert!(output.take().is_empty());
    }

    #[test]
    fn stop_rewinds_to_ready() {
        let (mut controller, output) = controller();
        ready(&mut controller, 0, 30.0);
        let generation = controller.generation();
        controller.handle_output_event(OutputEvent::playing(generation));
        controller.handle_output_event(OutputEvent::time_update(generation, 12.0));
        output.take();

        controller.stop();
        assert_eq!(output.take(), vec![Call::Pause, Call::Seek(0.0)]);

        let state = controller.snapshot();
        assert_eq!(state.status, SessionStatus::Ready);
        assert_eq!(state.position_seconds, 0.0);

        // Late pause confirmation does not undo the stop
        controller.handle_output_event(OutputEvent::paused(generation));
        assert_eq!(controller.status(), SessionStatus::Ready);
    }

    #[test]
    fn stop_without_item_is_idle() {
        let (mut controller, _output) = controller();
        controller.stop();
        assert_eq!(controller.status(), SessionStatus::Idle);
    }

    #[test]
    fn seek_clamps_to_duration() {
        let (mut controller, output) = controller();
        ready(&mut controller, 0, 200.0);
        output.take();

        controller.seek(-5.0);
        assert_eq!(controller.snapshot().position_seconds, 0.0);

        controller.seek(500.0);
        assert_eq!(controller.snapshot().position_seconds, 200.0);

        controller.seek(f64::NAN);
        assert_eq!(controller.snapshot().position_seconds, 200.0);

        assert_eq!(output.take(), vec![Call::Seek(0.0), Call::Seek(200.0)]);
    }

    #[test]
    fn seek_with_unknown_duration_only_floors() {
        let (mut controller, _output) = controller();
        controller.load(catalog(1), 0);
        let generation = controller.generation();
        controller.handle_output_event(OutputEvent::new(
            generation,
            OutputEventKind::MetadataLoaded {
                duration_seconds: None,
            },
        ));

        controller.seek(5000.0);
        assert_eq!(controller.snapshot().position_seconds, 5000.0);

        controller.seek(f64::INFINITY);
        assert_eq!(controller.snapshot().position_seconds, 5000.0);
    }

    #[test]
    fn seek_from_ended_pauses_unless_at_end() {
        let (mut controller, output) = controller();
        ready(&mut controller, 0, 30.0);
        controller.state.status = SessionStatus::Ended;
        controller.state.position_seconds = 30.0;
        output.take();

        controller.seek(45.0);
        assert_eq!(controller.status(), SessionStatus::Ended);
        assert_eq!(controller.snapshot().position_seconds, 30.0);

        controller.seek(10.0);
        assert_eq!(controller.status(), SessionStatus::Paused);
        assert_eq!(controller.snapshot().position_seconds, 10.0);
        assert_eq!(output.take(), vec![Call::Seek(30.0), Call::Seek(10.0)]);
    }

    #[test]
    fn seek_before_load_is_ignored() {
        let (mut controller, output) = controller();
        controller.load(catalog(1), 0);
        output.take();

        controller.seek(10.0);
        assert!(output.take().is_empty());
    }

    #[test]
    fn volume_and_rate_clamp_and_forward() {
        let (mut controller, output) = controller();

        controller.set_volume(1.5);
        controller.set_playback_rate(0.1);
        controller.set_volume(f64::NAN);
        controller.set_playback_rate(f64::NAN);

        let state = controller.snapshot();
        assert_eq!(state.volume, 1.0);
        assert_eq!(state.playback_rate, 0.25);
        assert_eq!(output.take(), vec![Call::Volume(1.0), Call::Rate(0.25)]);
    }

    #[test]
    fn mute_forwards_zero_and_restores() {
        let (mut controller, output) = controller();
        controller.set_volume(0.7);
        controller.set_muted(true);
        controller.set_muted(false);

        assert_eq!(
            output.take(),
            vec![Call::Volume(0.7), Call::Volume(0.0), Call::Volume(0.7)]
        );
        assert!(!controller.snapshot().muted);
    }

    #[test]
    fn buffering_round_trip_restores_status() {
        let (mut controller, _output) = controller();
        ready(&mut controller, 0, 60.0);
        let generation = controller.generation();
        controller.handle_output_event(OutputEvent::playing(generation));

        controller.handle_output_event(OutputEvent::buffering(generation, true));
        assert_eq!(controller.status(), SessionStatus::Buffering);

        controller.handle_output_event(OutputEvent::buffering(generation, false));
        assert_eq!(controller.status(), SessionStatus::Playing);
    }

    #[test]
    fn time_updates_clamp_to_duration() {
        let (mut controller, _output) = controller();
        ready(&mut controller, 0, 10.0);
        let generation = controller.generation();

        controller.handle_output_event(OutputEvent::time_update(generation, 10.02));
        assert_eq!(controller.snapshot().position_seconds, 10.0);

        controller.handle_output_event(OutputEvent::time_update(generation, f64::NAN));
        assert_eq!(controller.snapshot().position_seconds, 10.0);
    }

    #[test]
    fn playback_error_does_not_advance() {
        let (mut controller, output) = controller();
        ready(&mut controller, 0, 60.0);
        let generation = controller.generation();
        controller.handle_output_event(OutputEvent::playing(generation));
        output.take();

        controller.handle_output_event(OutputEvent::error(generation, "stream dropped"));

        let state = controller.snapshot();
        assert_eq!(state.status, SessionStatus::Errored);
        assert_eq!(state.current_index, Some(0));
        assert!(matches!(state.last_error, Some(SessionError::Playback { .. })));
        assert!(output.take().is_empty());

        assert!(matches!(controller.play(), PlayOutcome::Rejected(_)));
    }

    #[test]
    fn retry_clears_error_after_successful_load() {
        let (mut controller, _output) = controller();
        ready(&mut controller, 0, 60.0);
        controller.handle_output_event(OutputEvent::error(controller.generation(), "boom"));

        assert_eq!(controller.retry(), PlayOutcome::Deferred);
        controller.handle_output_event(OutputEvent::metadata_loaded(controller.generation(), 60.0));

        let state = controller.snapshot();
        assert_eq!(state.status, SessionStatus::Ready);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn select_out_of_range_is_rejected() {
        let (mut controller, _output) = controller();
        controller.load(catalog(2), 0);
        assert!(!controller.select(2));
        assert_eq!(controller.snapshot().current_index, Some(0));
    }

    #[test]
    fn subscribe_delivers_current_then_changes() {
        let (mut controller, _output) = controller();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let id = controller.subscribe(Box::new(move |state: &SessionState| {
            sink.lock().unwrap().push(state.status);
        }));
        controller.load(catalog(1), 0);
        controller.handle_output_event(OutputEvent::metadata_loaded(1, 5.0));

        assert!(controller.unsubscribe(id));
        controller.set_shuffle(true);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                SessionStatus::Idle,
                SessionStatus::Loading,
                SessionStatus::Ready
            ]
        );
    }

    #[test]
    fn unchanged_state_is_not_republished() {
        let (mut controller, _output) = controller();
        let count = Arc::new(Mutex::new(0));
        let counter = count.clone();
        controller.subscribe(Box::new(move |_: &SessionState| {
            *counter.lock().unwrap() += 1;
        }));

        controller.set_repeat_one(true);
        controller.set_repeat_one(true);
        controller.pause();

        // Initial delivery + one change
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn subscribe_counts_as_published() {
        let (mut controller, _output) = controller();
        let count = Arc::new(Mutex::new(0));
        let counter = count.clone();
        controller.subscribe(Box::new(move |_: &SessionState| {
            *counter.lock().unwrap() += 1;
        }));

        // Same snapshot the listener was handed on subscribe
        controller.set_repeat_one(false);
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn stop_keeps_errored_session_errored() {
        let (mut controller, output) = controller();
        ready(&mut controller, 0, 30.0);
        controller.handle_output_event(OutputEvent::time_update(1, 12.0));
        controller.handle_output_event(OutputEvent::error(1, "device lost"));
        output.take();

        controller.stop();

        let state = controller.snapshot();
        assert_eq!(state.status, SessionStatus::Errored);
        assert_eq!(state.current_index, Some(0));
        assert_eq!(state.position_seconds, 0.0);
        assert!(state.last_error.is_some());
        assert!(output.take().is_empty());
        assert!(matches!(controller.play(), PlayOutcome::Rejected(_)));
    }

    #[test]
    fn dispose_releases_once_and_ignores_events() {
        let (mut controller, output) = controller();
        controller.load(catalog(2), 0);
        let generation = controller.generation();
        output.take();

        controller.dispose();
        controller.dispose();
        controller.handle_output_event(OutputEvent::metadata_loaded(generation, 10.0));
        controller.skip_next();

        assert!(controller.is_disposed());
        assert_eq!(output.take(), vec![Call::Release]);
        assert_eq!(controller.status(), SessionStatus::Loading);
    }

    #[test]
    fn drop_releases_output() {
        let (controller, output) = controller();
        drop(controller);
        assert_eq!(output.take(), vec![Call::Release]);
    }
}

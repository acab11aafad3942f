//! Async session driver
//!
//! Runs a [`MediaSessionController`] on a tokio task. Caller commands, output
//! events and deferred source resolutions all travel through one mpsc queue,
//! so they are applied strictly in arrival order. State snapshots are
//! published on a watch channel after every command that changes them.
//!
//! ```no_run
//! use halaqa_core::{Catalog, PlayableItem, UrlTemplateProvider};
//! use halaqa_playback::{session_channel, MediaSessionController, SessionConfig};
//! # use halaqa_core::PlaybackOutput;
//! # struct Speaker;
//! # impl PlaybackOutput for Speaker {
//! #     fn load_source(&mut self, _: &str, _: u64) {}
//! #     fn play(&mut self) {}
//! #     fn pause(&mut self) {}
//! #     fn seek(&mut self, _: f64) {}
//! #     fn set_volume(&mut self, _: f64) {}
//! #     fn set_playback_rate(&mut self, _: f64) {}
//! # }
//!
//! # async fn demo() -> halaqa_playback::Result<()> {
//! let (handle, inbox) = session_channel(64);
//! let controller = MediaSessionController::new(
//!     Speaker,
//!     UrlTemplateProvider::new("https://audio.example.org/{id}.mp3"),
//!     &SessionConfig::default(),
//! );
//! inbox.spawn(controller);
//!
//! let catalog = Catalog::new(vec![PlayableItem::new("001", "Al-Fatiha")])?;
//! handle.load(catalog, 0).await?;
//! handle.play().await?;
//! # Ok(())
//! # }
//! ```

use crate::{
    controller::MediaSessionController,
    error::{PlaybackError, Result},
    events::OutputEvent,
    types::{PlayOutcome, SessionState},
};
use halaqa_core::{Catalog, LoadTicket};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Commands processed by the driver task
#[derive(Debug)]
pub enum SessionCommand {
    /// Replace the catalog and load an item
    Load { catalog: Catalog, start_index: usize },

    /// Start or resume playback
    Play {
        reply: Option<oneshot::Sender<PlayOutcome>>,
    },

    /// Pause playback
    Pause,

    /// Pause and rewind
    Stop,

    /// Seek to position (in seconds)
    Seek(f64),

    /// Skip to next item
    SkipNext,

    /// Go to previous item
    SkipPrevious,

    /// Jump to a catalog index
    Select {
        index: usize,
        reply: Option<oneshot::Sender<bool>>,
    },

    /// Reload the current item
    Retry {
        reply: Option<oneshot::Sender<PlayOutcome>>,
    },

    /// Set volume (0.0-1.0)
    SetVolume(f64),

    SetMuted(bool),

    SetPlaybackRate(f64),

    SetRepeatOne(bool),

    SetShuffle(bool),

    /// Event raised by the playback output
    Output(OutputEvent),

    /// Answer to a deferred source lookup
    SourceResolved {
        ticket: LoadTicket,
        result: std::result::Result<String, String>,
    },

    /// Dispose the controller and stop the task
    Shutdown,
}

/// Create a connected handle/inbox pair
///
/// `capacity` bounds the command queue (minimum 1).
pub fn session_channel(capacity: usize) -> (SessionHandle, SessionInbox) {
    let (command_tx, command_rx) = mpsc::channel(capacity.max(1));
    let (state_tx, state_rx) = watch::channel(SessionState::default());

    (
        SessionHandle {
            command_tx,
            state_rx,
        },
        SessionInbox {
            command_rx,
            state_tx,
        },
    )
}

/// Cloneable front end to a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    state_rx: watch::Receiver<SessionState>,
}

impl SessionHandle {
    /// Queue a raw command
    pub async fn send(&self, command: SessionCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| PlaybackError::DriverClosed)
    }

    pub async fn load(&self, catalog: Catalog, start_index: usize) -> Result<()> {
        self.send(SessionCommand::Load {
            catalog,
            start_index,
        })
        .await
    }

    /// Request playback and wait for the controller's immediate answer
    ///
    /// The answer is not a confirmation; watch the state for `Playing`.
    pub async fn play(&self) -> Result<PlayOutcome> {
        let (reply, answer) = oneshot::channel();
        self.send(SessionCommand::Play { reply: Some(reply) })
            .await?;
        answer.await.map_err(|_| PlaybackError::DriverClosed)
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(SessionCommand::Pause).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(SessionCommand::Stop).await
    }

    pub async fn seek(&self, seconds: f64) -> Result<()> {
        self.send(SessionCommand::Seek(seconds)).await
    }

    pub async fn skip_next(&self) -> Result<()> {
        self.send(SessionCommand::SkipNext).await
    }

    pub async fn skip_previous(&self) -> Result<()> {
        self.send(SessionCommand::SkipPrevious).await
    }

    /// Jump to `index`; `false` when it is out of range
    pub async fn select(&self, index: usize) -> Result<bool> {
        let (reply, answer) = oneshot::channel();
        self.send(SessionCommand::Select {
            index,
            reply: Some(reply),
        })
        .await?;
        answer.await.map_err(|_| PlaybackError::DriverClosed)
    }

    pub async fn retry(&self) -> Result<PlayOutcome> {
        let (reply, answer) = oneshot::channel();
        self.send(SessionCommand::Retry { reply: Some(reply) })
            .await?;
        answer.await.map_err(|_| PlaybackError::DriverClosed)
    }

    pub async fn set_volume(&self, volume: f64) -> Result<()> {
        self.send(SessionCommand::SetVolume(volume)).await
    }

    pub async fn set_muted(&self, muted: bool) -> Result<()> {
        self.send(SessionCommand::SetMuted(muted)).await
    }

    pub async fn set_playback_rate(&self, rate: f64) -> Result<()> {
        self.send(SessionCommand::SetPlaybackRate(rate)).await
    }

    pub async fn set_repeat_one(&self, repeat_one: bool) -> Result<()> {
        self.send(SessionCommand::SetRepeatOne(repeat_one)).await
    }

    pub async fn set_shuffle(&self, shuffle: bool) -> Result<()> {
        self.send(SessionCommand::SetShuffle(shuffle)).await
    }

    /// Forward an event from the playback output
    pub async fn output_event(&self, event: OutputEvent) -> Result<()> {
        self.send(SessionCommand::Output(event)).await
    }

    /// Forward an output event from a non-async context
    ///
    /// Fails with `DriverClosed` if the driver is gone and with
    /// `QueueFull` if the queue has no room.
    pub fn try_output_event(&self, event: OutputEvent) -> Result<()> {
        self.command_tx
            .try_send(SessionCommand::Output(event))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => PlaybackError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => PlaybackError::DriverClosed,
            })
    }

    /// Complete a source lookup the provider deferred
    pub async fn resolve_source(
        &self,
        ticket: LoadTicket,
        result: std::result::Result<String, String>,
    ) -> Result<()> {
        self.send(SessionCommand::SourceResolved { ticket, result })
            .await
    }

    /// Latest published state
    pub fn snapshot(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    /// Receiver that wakes on every published change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Ask the driver to dispose the controller and exit
    pub async fn shutdown(&self) -> Result<()> {
        self.send(SessionCommand::Shutdown).await
    }

    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }
}

/// Receiving side of a session, consumed by [`run`](Self::run)
#[derive(Debug)]
pub struct SessionInbox {
    command_rx: mpsc::Receiver<SessionCommand>,
    state_tx: watch::Sender<SessionState>,
}

impl SessionInbox {
    /// Run the driver on a new tokio task
    pub fn spawn(self, controller: MediaSessionController) -> JoinHandle<()> {
        tokio::spawn(self.run(controller))
    }

    /// Process commands until shutdown or until every handle is dropped
    ///
    /// A provider holding a handle clone keeps the queue open; send
    /// `Shutdown` to stop in that case.
    pub async fn run(mut self, mut controller: MediaSessionController) {
        info!("Session driver started");
        self.publish(&controller);

        while let Some(command) = self.command_rx.recv().await {
            if matches!(command, SessionCommand::Shutdown) {
                debug!("Shutdown requested");
                break;
            }

            apply(&mut controller, command);
            self.publish(&controller);
        }

        controller.dispose();
        self.publish(&controller);
        info!("Session driver stopped");
    }

    fn publish(&self, controller: &MediaSessionController) {
        let snapshot = controller.snapshot();
        self.state_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

fn apply(controller: &mut MediaSessionController, command: SessionCommand) {
    match command {
        SessionCommand::Load {
            catalog,
            start_index,
        } => controller.load(catalog, start_index),
        SessionCommand::Play { reply } => {
            let outcome = controller.play();
            if let Some(reply) = reply {
                let _ = reply.send(outcome);
            }
        }
        SessionCommand::Pause => controller.pause(),
        SessionCommand::Stop => controller.stop(),
        SessionCommand::Seek(seconds) => controller.seek(seconds),
        SessionCommand::SkipNext => controller.skip_next(),
        SessionCommand::SkipPrevious => controller.skip_previous(),
        SessionCommand::Select { index, reply } => {
            let selected = controller.select(index);
            if let Some(reply) = reply {
                let _ = reply.send(selected);
            }
        }
        SessionCommand::Retry { reply } => {
            let outcome = controller.retry();
            if let Some(reply) = reply {
                let _ = reply.send(outcome);
            }
        }
        SessionCommand::SetVolume(volume) => controller.set_volume(volume),
        SessionCommand::SetMuted(muted) => controller.set_muted(muted),
        SessionCommand::SetPlaybackRate(rate) => controller.set_playback_rate(rate),
        SessionCommand::SetRepeatOne(repeat_one) => controller.set_repeat_one(repeat_one),
        SessionCommand::SetShuffle(shuffle) => controller.set_shuffle(shuffle),
        SessionCommand::Output(event) => controller.handle_output_event(event),
        SessionCommand::SourceResolved { ticket, result } => {
            controller.complete_source_resolution(&ticket, result);
        }
        SessionCommand::Shutdown => {}
    }
}

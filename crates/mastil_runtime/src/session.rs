//! The session task.
//!
//! One task owns the game. Player commands arrive on an mpsc channel, clock
//! ticks come from [`ClockTimers`], and both are handled one at a time in
//! the same loop. After every handled step the task forwards sound cues and
//! publishes a fresh snapshot.

use mastil_core::building::{BuildingId, Element};
use mastil_core::error::GameError;
use mastil_core::events::GameEvent;
use mastil_core::game::Game;
use mastil_core::snapshot::GameSnapshot;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::audio::{play_or_warn, AudioSink};
use crate::timers::ClockTimers;
use crate::{Result, RuntimeError};

const COMMAND_BUFFER: usize = 64;

/// Input accepted by a running session.
#[derive(Debug)]
pub enum SessionCommand {
    /// Register the player and start the game.
    Setup {
        /// Player name.
        name: String,
        /// Player element.
        element: Element,
        /// Receives the setup result.
        reply: oneshot::Sender<std::result::Result<(), GameError>>,
    },
    /// Click a building.
    Click(BuildingId),
    /// Clear the selection.
    Deselect,
    /// Send half of `source` to `target`.
    Send {
        /// Source building.
        source: BuildingId,
        /// Target building.
        target: BuildingId,
    },
    /// Upgrade a player building.
    Upgrade(BuildingId),
    /// Pause or resume.
    Pause(bool),
    /// Raise or lower the playtime gate.
    PlaytimeGate(bool),
    /// Restart with the same player.
    Restart,
    /// Stop the session.
    Shutdown,
}

/// Handle to a running session.
///
/// Dropping the handle closes the command channel, which stops the task.
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<GameSnapshot>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Spawn a session task owning `game`.
    #[must_use]
    pub fn spawn(game: Game, audio: Box<dyn AudioSink>) -> Self {
        let started = Instant::now();
        let (commands, inbox) = mpsc::channel(COMMAND_BUFFER);
        let (publisher, snapshots) = watch::channel(game.snapshot(0));
        let timers = ClockTimers::new(game.config(), started);

        let session = Session {
            game,
            timers,
            started,
            audio,
            publisher,
        };
        let task = tokio::spawn(session.run(inbox));

        Self {
            commands,
            snapshots,
            task,
        }
    }

    /// Queue a command.
    pub async fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| RuntimeError::SessionClosed)
    }

    /// Register the player and wait for the result.
    pub async fn setup(&self, name: &str, element: Element) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(SessionCommand::Setup {
            name: name.to_owned(),
            element,
            reply,
        })
        .await?;
        response.await.map_err(|_| RuntimeError::SessionClosed)??;
        Ok(())
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified on every new snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshots.clone()
    }

    /// Stop the session and wait for the task to finish.
    pub async fn shutdown(self) -> Result<()> {
        // A closed channel means the task is already stopping.
        let _ = self.commands.send(SessionCommand::Shutdown).await;
        self.task.await.map_err(|_| RuntimeError::SessionClosed)
    }
}

enum Step {
    Command(Option<SessionCommand>),
    Clock(mastil_core::clock::Clock),
}

struct Session {
    game: Game,
    timers: ClockTimers,
    started: Instant,
    audio: Box<dyn AudioSink>,
    publisher: watch::Sender<GameSnapshot>,
}

impl Session {
    async fn run(mut self, mut inbox: mpsc::Receiver<SessionCommand>) {
        tracing::info!("session started");
        loop {
            let step = tokio::select! {
                command = inbox.recv() => Step::Command(command),
                clock = self.timers.tick() => Step::Clock(clock),
            };

            match step {
                Step::Command(None | Some(SessionCommand::Shutdown)) => break,
                Step::Command(Some(command)) => self.apply(command),
                Step::Clock(clock) => {
                    let now = self.now_ms();
                    self.game.run_clock(clock, now);
                }
            }
            self.flush();
        }
        tracing::info!("session stopped");
    }

    fn apply(&mut self, command: SessionCommand) {
        let now = self.now_ms();
        match command {
            SessionCommand::Setup {
                name,
                element,
                reply,
            } => {
                let result = self.game.handle_player_setup(&name, element, now);
                if result.is_ok() {
                    self.timers.reset(Instant::now());
                }
                // The caller may have stopped waiting.
                let _ = reply.send(result);
            }
            SessionCommand::Click(id) => {
                self.game.select_building(&id, now);
            }
            SessionCommand::Deselect => self.game.deselect(),
            SessionCommand::Send { source, target } => {
                if let Err(err) = self.game.send_units(&source, &target, now) {
                    tracing::debug!(%source, %target, %err, "send rejected");
                }
            }
            SessionCommand::Upgrade(id) => {
                if let Err(err) = self.game.upgrade_building(&id, now) {
                    tracing::debug!(building = %id, %err, "upgrade rejected");
                }
            }
            SessionCommand::Pause(paused) => self.game.set_paused(paused),
            SessionCommand::PlaytimeGate(active) => self.game.set_playtime_gate(active),
            SessionCommand::Restart => {
                self.game.restart_game(now);
                self.timers.reset(Instant::now());
            }
            SessionCommand::Shutdown => {}
        }
    }

    fn flush(&mut self) {
        for event in self.game.drain_events() {
            match event {
                GameEvent::Sound(cue) => play_or_warn(self.audio.as_mut(), cue),
                other => tracing::trace!(event = ?other, "game event"),
            }
        }
        let snapshot = self.game.snapshot(self.now_ms());
        self.publisher.send_replace(snapshot);
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

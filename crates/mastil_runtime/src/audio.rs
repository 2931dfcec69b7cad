//! Sound cue side channel.
//!
//! The session forwards every [`SoundCue`] to an [`AudioSink`]. Playback
//! failures are logged and dropped; they never reach the game.

use mastil_core::events::SoundCue;
use thiserror::Error;

/// Why a cue could not be played.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    /// No output device is available.
    #[error("No audio device available")]
    NoDevice,

    /// The backend refused the cue.
    #[error("Audio playback failed: {0}")]
    Playback(String),
}

/// Plays sound cues.
pub trait AudioSink: Send {
    /// Play `cue` once.
    fn play(&mut self, cue: SoundCue) -> Result<(), AudioError>;
}

/// Sink that only logs cues.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAudio;

impl AudioSink for TracingAudio {
    fn play(&mut self, cue: SoundCue) -> Result<(), AudioError> {
        tracing::debug!(?cue, "sound cue");
        Ok(())
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _cue: SoundCue) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Play `cue` on `sink`, swallowing failures.
pub fn play_or_warn(sink: &mut dyn AudioSink, cue: SoundCue) {
    if let Err(err) = sink.play(cue) {
        tracing::warn!(?cue, %err, "audio playback failed");
    }
}

//! Speech playback state and voice settings.
//!
//! No audio is produced here. [`Playback`] tracks which controls are valid
//! at any moment so a front end driving a speech engine can reject a pause
//! while idle or a resume while already playing, and [`VoiceSettings`] keeps
//! the engine parameters inside the ranges speech engines accept.
//!
//! # Example
//!
//! ```rust
//! use readaloud_core::{Playback, PlaybackState};
//!
//! let mut playback = Playback::new();
//! playback.play("Body here").unwrap();
//! playback.pause().unwrap();
//! assert_eq!(playback.state(), PlaybackState::Paused);
//! assert!(playback.pause().is_err());
//! playback.stop().unwrap();
//! assert_eq!(playback.state(), PlaybackState::Idle);
//! ```

use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// A control applied to [`Playback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackAction {
    Play,
    Pause,
    Resume,
    Stop,
}

impl fmt::Display for PlaybackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackAction::Play => "play",
            PlaybackAction::Pause => "pause",
            PlaybackAction::Resume => "resume",
            PlaybackAction::Stop => "stop",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("cannot {action} while {from}")]
    InvalidTransition { from: PlaybackState, action: PlaybackAction },

    #[error("nothing to speak")]
    EmptyText,
}

/// Engine parameters for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceSettings {
    pitch: f32,
    rate: f32,
    volume: f32,
    lang: String,
    voice: Option<String>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self { pitch: 1.3, rate: 1.2, volume: 1.0, lang: "en-US".to_string(), voice: None }
    }
}

impl VoiceSettings {
    pub const PITCH_RANGE: (f32, f32) = (0.0, 2.0);
    pub const RATE_RANGE: (f32, f32) = (0.5, 2.0);

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn voice(&self) -> Option<&str> {
        self.voice.as_deref()
    }

    /// Sets the pitch, clamped to [`Self::PITCH_RANGE`].
    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = clamp(pitch, Self::PITCH_RANGE, self.pitch);
    }

    /// Sets the rate, clamped to [`Self::RATE_RANGE`].
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = clamp(rate, Self::RATE_RANGE, self.rate);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp(volume, (0.0, 1.0), self.volume);
    }

    pub fn set_lang(&mut self, lang: impl Into<String>) {
        self.lang = lang.into();
    }

    pub fn set_voice(&mut self, voice: Option<String>) {
        self.voice = voice;
    }

    /// Chooses the first English voice when none is selected yet.
    ///
    /// `voices` is a list of `(name, language tag)` pairs as reported by the
    /// speech engine. Returns the selected voice, if any.
    pub fn pick_voice<'v, I>(&mut self, voices: I) -> Option<&str>
    where
        I: IntoIterator<Item = (&'v str, &'v str)>,
    {
        if self.voice.is_none() {
            self.voice = voices
                .into_iter()
                .find(|(_, lang)| lang.starts_with("en"))
                .map(|(name, _)| name.to_string());
        }
        self.voice.as_deref()
    }
}

/// NaN keeps the previous value.
fn clamp(value: f32, (min, max): (f32, f32), previous: f32) -> f32 {
    if value.is_nan() { previous } else { value.clamp(min, max) }
}

/// Playback controller for a single text.
#[derive(Debug, Clone)]
pub struct Playback {
    state: PlaybackState,
    text: Option<String>,
    settings: VoiceSettings,
}

impl Default for Playback {
    fn default() -> Self {
        Self::new()
    }
}

impl Playback {
    pub fn new() -> Self {
        Self::with_settings(VoiceSettings::default())
    }

    pub fn with_settings(settings: VoiceSettings) -> Self {
        Self { state: PlaybackState::Idle, text: None, settings }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Text of the current utterance; `None` when idle.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn settings(&self) -> &VoiceSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut VoiceSettings {
        &mut self.settings
    }

    /// Starts speaking `text`, cancelling whatever was playing or paused.
    pub fn play(&mut self, text: impl Into<String>) -> Result<(), PlaybackError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(PlaybackError::EmptyText);
        }

        if self.state != PlaybackState::Idle {
            tracing::debug!(from = %self.state, "cancelling current utterance");
        }
        self.text = Some(text);
        self.state = PlaybackState::Playing;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        self.transition(PlaybackAction::Pause, PlaybackState::Playing, PlaybackState::Paused)
    }

    pub fn resume(&mut self) -> Result<(), PlaybackError> {
        self.transition(PlaybackAction::Resume, PlaybackState::Paused, PlaybackState::Playing)
    }

    pub fn stop(&mut self) -> Result<(), PlaybackError> {
        if self.state == PlaybackState::Idle {
            return Err(PlaybackError::InvalidTransition { from: self.state, action: PlaybackAction::Stop });
        }
        self.reset();
        Ok(())
    }

    /// The engine reported the end of the utterance, or an error.
    pub fn finish(&mut self) {
        self.reset();
    }

    fn transition(&mut self, action: PlaybackAction, from: PlaybackState, to: PlaybackState) -> Result<(), PlaybackError> {
        if self.state != from {
            return Err(PlaybackError::InvalidTransition { from: self.state, action });
        }
        self.state = to;
        Ok(())
    }

    fn reset(&mut self) {
        self.state = PlaybackState::Idle;
        self.text = None;
    }
}

//! Channel slots and the identifiers used to address them.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::traits::audio::{AudioBackend, PlayerId};

/// Number of independent sound effect channels.
pub const EFFECT_CHANNEL_COUNT: usize = 4;

/// Names the audio to play: a bundled resource name or a file path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SoundSource {
    /// File name with extension, looked up through the resolver.
    Resource(String),
    /// Path used as-is.
    Path(PathBuf),
}

impl SoundSource {
    pub fn resource(name: impl Into<String>) -> Self {
        Self::Resource(name.into())
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// The text recorded as the channel's current sound.
    pub fn identifier(&self) -> Cow<'_, str> {
        match self {
            Self::Resource(name) => Cow::Borrowed(name.as_str()),
            Self::Path(path) => path.to_string_lossy(),
        }
    }
}

impl fmt::Display for SoundSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

impl From<&str> for SoundSource {
    fn from(name: &str) -> Self {
        Self::Resource(name.to_string())
    }
}

impl From<String> for SoundSource {
    fn from(name: String) -> Self {
        Self::Resource(name)
    }
}

impl From<&Path> for SoundSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for SoundSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

/// Selects a sound effect channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EffectChannel {
    /// Every channel. Only valid for stopping.
    All,
    #[default]
    Channel01,
    Channel02,
    Channel03,
    Channel04,
}

impl EffectChannel {
    /// The playable channels in slot order.
    pub const ALL_CONCRETE: [EffectChannel; EFFECT_CHANNEL_COUNT] = [
        EffectChannel::Channel01,
        EffectChannel::Channel02,
        EffectChannel::Channel03,
        EffectChannel::Channel04,
    ];

    /// Slot index, `None` for [`EffectChannel::All`].
    pub fn index(self) -> Option<usize> {
        match self {
            Self::All => None,
            Self::Channel01 => Some(0),
            Self::Channel02 => Some(1),
            Self::Channel03 => Some(2),
            Self::Channel04 => Some(3),
        }
    }

    /// Channel from its 1-based number.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Channel01),
            2 => Some(Self::Channel02),
            3 => Some(Self::Channel03),
            4 => Some(Self::Channel04),
            _ => None,
        }
    }
}

impl fmt::Display for EffectChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(index) => write!(f, "channel{:02}", index + 1),
            None => f.write_str("all"),
        }
    }
}

/// Why an effect's completion callback ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The effect played to the end.
    Completed,
    /// Playback could not start or the backend reported an error.
    Failed,
    /// The request was not played: effects disabled or `All` targeted.
    Skipped,
}

/// Called once when an effect finishes.
pub type FinishCallback = Box<dyn FnOnce(FinishReason) + Send + 'static>;

pub(crate) fn notify(callback: Option<FinishCallback>, reason: FinishReason) {
    if let Some(callback) = callback {
        callback(reason);
    }
}

/// Stop and release `player`, logging backend errors.
pub(crate) fn release_player<A: AudioBackend>(backend: &mut A, player: PlayerId) {
    if let Err(e) = backend.stop(player) {
        warn!(player = player.0, "Failed to stop player: {e:#}");
    }
}

/// Music, ambient or weather slot: one looping player and its resource.
#[derive(Debug, Default)]
pub(crate) struct LoopingSlot {
    current: Option<String>,
    player: Option<PlayerId>,
}

impl LoopingSlot {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn player(&self) -> Option<PlayerId> {
        self.player
    }

    pub fn is_current(&self, identifier: &str) -> bool {
        self.current.as_deref() == Some(identifier)
    }

    /// Take ownership of an already started player.
    pub fn attach(&mut self, identifier: String, player: PlayerId) {
        self.current = Some(identifier);
        self.player = Some(player);
    }

    pub fn release<A: AudioBackend>(&mut self, backend: &mut A) {
        if let Some(player) = self.player.take() {
            release_player(backend, player);
        }
        self.current = None;
    }
}

/// One sound effect channel.
#[derive(Default)]
pub(crate) struct EffectSlot {
    current: Option<String>,
    player: Option<PlayerId>,
    on_finished: Option<FinishCallback>,
}

impl EffectSlot {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn player(&self) -> Option<PlayerId> {
        self.player
    }

    pub fn attach(
        &mut self,
        identifier: String,
        player: PlayerId,
        on_finished: Option<FinishCallback>,
    ) {
        self.current = Some(identifier);
        self.player = Some(player);
        self.on_finished = on_finished;
    }

    /// Detach the callback for a finish event of `player`.
    /// Returns `None` if the event belongs to another player.
    pub fn finish(&mut self, player: PlayerId) -> Option<Option<FinishCallback>> {
        if self.player != Some(player) {
            return None;
        }
        Some(self.on_finished.take())
    }

    /// Stop and release the player. A pending callback is dropped unfired.
    pub fn release<A: AudioBackend>(&mut self, backend: &mut A) {
        if let Some(player) = self.player.take() {
            release_player(backend, player);
        }
        self.current = None;
        self.on_finished = None;
    }
}

impl fmt::Debug for EffectSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectSlot")
            .field("current", &self.current)
            .field("player", &self.player)
            .field("has_callback", &self.on_finished.is_some())
            .finish()
    }
}

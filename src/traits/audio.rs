use std::path::Path;

use anyhow::Result;

/// Handle for referencing a player created by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(pub u64);

/// Number of extra passes a player makes after the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loops {
    /// Play `1 + n` times, then finish.
    Finite(u32),
    /// Repeat until stopped.
    Infinite,
}

impl Loops {
    /// Play a single time.
    pub const ONCE: Loops = Loops::Finite(0);
}

impl Default for Loops {
    fn default() -> Self {
        Self::ONCE
    }
}

/// A player reached the end of its playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishEvent {
    pub player: PlayerId,
    /// `false` when the backend gave up because of a playback error.
    pub success: bool,
}

/// Abstraction over native audio players.
/// Implementations: AudioDriver (kira), MockBackend (testing).
pub trait AudioBackend {
    /// Build a player for the audio file at `path`.
    /// Fails when the file can't be read or decoded.
    fn create_player(&mut self, path: &Path) -> Result<PlayerId>;

    /// Set volume (0.0..=1.0).
    fn set_volume(&mut self, id: PlayerId, volume: f32) -> Result<()>;
    fn set_loops(&mut self, id: PlayerId, loops: Loops) -> Result<()>;

    fn play(&mut self, id: PlayerId) -> Result<()>;

    /// Stop playback and release the player. Unknown ids are ignored.
    fn stop(&mut self, id: PlayerId) -> Result<()>;

    fn is_playing(&self, id: PlayerId) -> bool;

    /// Drain the finish events recorded since the previous call.
    fn poll_finished(&mut self) -> Vec<FinishEvent>;

    fn dispose(&mut self) -> Result<()>;
}

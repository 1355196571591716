//! Test doubles for the audio backend and resource lookup.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::traits::audio::{AudioBackend, FinishEvent, Loops, PlayerId};

/// Root that [`bundle`] resolves names under.
pub const BUNDLE_ROOT: &str = "/bundle";

/// Resolves every name under [`BUNDLE_ROOT`] except those starting with `missing`.
pub fn bundle(name: &str) -> Option<PathBuf> {
    if name.starts_with("missing") {
        None
    } else {
        Some(Path::new(BUNDLE_ROOT).join(name))
    }
}

/// Backend calls in the order they were made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(PathBuf),
    Play(PlayerId),
    Stop(PlayerId),
}

#[derive(Debug, Clone)]
pub struct MockPlayer {
    pub path: PathBuf,
    pub volume: f32,
    pub loops: Loops,
    pub playing: bool,
}

/// Records every call; players live until stopped.
#[derive(Debug, Default)]
pub struct MockBackend {
    next_id: u64,
    pub players: HashMap<u64, MockPlayer>,
    pub calls: Vec<Call>,
    /// Paths whose player construction fails.
    pub undecodable: HashSet<PathBuf>,
    /// When set, `set_volume` and `set_loops` fail.
    pub fail_configure: bool,
    /// When set, `play` fails.
    pub fail_play: bool,
    pending: Vec<FinishEvent>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    pub fn created(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Create(_)))
            .count()
    }

    pub fn stopped(&self) -> Vec<PlayerId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Stop(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.players.len()
    }

    /// The live player for `path`, if any.
    pub fn player_for(&self, path: &Path) -> Option<(PlayerId, &MockPlayer)> {
        self.players
            .iter()
            .find(|(_, p)| p.path == path)
            .map(|(&id, p)| (PlayerId(id), p))
    }

    /// Report `id` as finished on the next poll.
    pub fn finish(&mut self, id: PlayerId, success: bool) {
        if let Some(player) = self.players.get_mut(&id.0) {
            player.playing = false;
        }
        self.pending.push(FinishEvent {
            player: id,
            success,
        });
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut MockPlayer> {
        self.players
            .get_mut(&id.0)
            .ok_or_else(|| anyhow!("Player not found: {:?}", id))
    }
}

impl AudioBackend for MockBackend {
    fn create_player(&mut self, path: &Path) -> Result<PlayerId> {
        self.calls.push(Call::Create(path.to_path_buf()));
        if self.undecodable.contains(path) {
            return Err(anyhow!("Failed to decode {}", path.display()));
        }
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.players.insert(
            id,
            MockPlayer {
                path: path.to_path_buf(),
                volume: 1.0,
                loops: Loops::ONCE,
                playing: false,
            },
        );
        Ok(PlayerId(id))
    }

    fn set_volume(&mut self, id: PlayerId, volume: f32) -> Result<()> {
        if self.fail_configure {
            return Err(anyhow!("Player rejected volume"));
        }
        self.player_mut(id)?.volume = volume;
        Ok(())
    }

    fn set_loops(&mut self, id: PlayerId, loops: Loops) -> Result<()> {
        if self.fail_configure {
            return Err(anyhow!("Player rejected loop count"));
        }
        self.player_mut(id)?.loops = loops;
        Ok(())
    }

    fn play(&mut self, id: PlayerId) -> Result<()> {
        self.calls.push(Call::Play(id));
        if self.fail_play {
            return Err(anyhow!("Output device unavailable"));
        }
        self.player_mut(id)?.playing = true;
        Ok(())
    }

    fn stop(&mut self, id: PlayerId) -> Result<()> {
        self.calls.push(Call::Stop(id));
        self.players.remove(&id.0);
        Ok(())
    }

    fn is_playing(&self, id: PlayerId) -> bool {
        self.players.get(&id.0).is_some_and(|p| p.playing)
    }

    fn poll_finished(&mut self) -> Vec<FinishEvent> {
        std::mem::take(&mut self.pending)
    }

    fn dispose(&mut self) -> Result<()> {
        self.players.clear();
        Ok(())
    }
}

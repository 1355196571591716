use std::collections::HashMap;
use std::path::Path;

use anyhow::{Result, anyhow};
use kira::sound::PlaybackState;
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::{AudioManager, AudioManagerSettings, Decibels, DefaultBackend, Tween};
use tracing::warn;

use crate::traits::audio::{AudioBackend, FinishEvent, Loops, PlayerId};

/// One decoded sound plus its playback state.
struct Voice {
    data: StaticSoundData,
    handle: Option<StaticSoundHandle>,
    volume: f32,
    loops: Loops,
    /// Passes left before a finite loop reports finished.
    remaining: u32,
    finished: bool,
}

impl Voice {
    fn sound_data(&self) -> StaticSoundData {
        let data = self.data.clone().volume(amplitude_to_decibels(self.volume));
        match self.loops {
            Loops::Infinite => data.loop_region(..),
            Loops::Finite(_) => data,
        }
    }
}

/// Audio driver backed by kira.
pub struct AudioDriver {
    manager: AudioManager<DefaultBackend>,
    /// Players keyed by PlayerId.
    voices: HashMap<u64, Voice>,
    /// Next player ID to assign.
    next_id: u64,
}

impl AudioDriver {
    /// Create a new audio driver on the default output device.
    pub fn new() -> Result<Self> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| anyhow!("Failed to create audio manager: {e}"))?;
        Ok(Self {
            manager,
            voices: HashMap::new(),
            next_id: 1,
        })
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl AudioBackend for AudioDriver {
    fn create_player(&mut self, path: &Path) -> Result<PlayerId> {
        let data = StaticSoundData::from_file(path)
            .map_err(|e| anyhow!("Failed to load sound {}: {e}", path.display()))?;
        let id = self.alloc_id();
        self.voices.insert(
            id,
            Voice {
                data,
                handle: None,
                volume: 1.0,
                loops: Loops::ONCE,
                remaining: 0,
                finished: false,
            },
        );
        Ok(PlayerId(id))
    }

    fn set_volume(&mut self, id: PlayerId, volume: f32) -> Result<()> {
        let voice = self
            .voices
            .get_mut(&id.0)
            .ok_or_else(|| anyhow!("Player not found: {:?}", id))?;
        voice.volume = volume.clamp(0.0, 1.0);
        if let Some(handle) = voice.handle.as_mut() {
            handle.set_volume(amplitude_to_decibels(voice.volume), Tween::default());
        }
        Ok(())
    }

    fn set_loops(&mut self, id: PlayerId, loops: Loops) -> Result<()> {
        let voice = self
            .voices
            .get_mut(&id.0)
            .ok_or_else(|| anyhow!("Player not found: {:?}", id))?;
        voice.loops = loops;
        Ok(())
    }

    fn play(&mut self, id: PlayerId) -> Result<()> {
        let voice = self
            .voices
            .get_mut(&id.0)
            .ok_or_else(|| anyhow!("Player not found: {:?}", id))?;
        if let Some(mut handle) = voice.handle.take() {
            handle.stop(Tween::default());
        }
        voice.remaining = match voice.loops {
            Loops::Finite(n) => n,
            Loops::Infinite => 0,
        };
        voice.finished = false;
        let handle = self
            .manager
            .play(voice.sound_data())
            .map_err(|e| anyhow!("Failed to play sound: {e}"))?;
        voice.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self, id: PlayerId) -> Result<()> {
        if let Some(mut voice) = self.voices.remove(&id.0) {
            if let Some(mut handle) = voice.handle.take() {
                handle.stop(Tween::default());
            }
        }
        Ok(())
    }

    fn is_playing(&self, id: PlayerId) -> bool {
        self.voices
            .get(&id.0)
            .and_then(|v| v.handle.as_ref())
            .is_some_and(|h| h.state() == PlaybackState::Playing)
    }

    fn poll_finished(&mut self) -> Vec<FinishEvent> {
        let mut events = Vec::new();
        for (&id, voice) in self.voices.iter_mut() {
            if voice.finished {
                continue;
            }
            let stopped = voice
                .handle
                .as_ref()
                .is_some_and(|h| h.state() == PlaybackState::Stopped);
            if !stopped {
                continue;
            }

            if voice.remaining > 0 {
                voice.remaining -= 1;
                match self.manager.play(voice.sound_data()) {
                    Ok(handle) => {
                        voice.handle = Some(handle);
                        continue;
                    }
                    Err(e) => {
                        warn!(player = id, "Failed to restart looping sound: {e}");
                        voice.finished = true;
                        events.push(FinishEvent {
                            player: PlayerId(id),
                            success: false,
                        });
                        continue;
                    }
                }
            }

            voice.finished = true;
            events.push(FinishEvent {
                player: PlayerId(id),
                success: true,
            });
        }
        events
    }

    fn dispose(&mut self) -> Result<()> {
        for (_, mut voice) in self.voices.drain() {
            if let Some(mut handle) = voice.handle.take() {
                handle.stop(Tween::default());
            }
        }
        Ok(())
    }
}

/// Convert a linear gain (0.0..=1.0) to kira's decibel volume.
fn amplitude_to_decibels(amplitude: f32) -> Decibels {
    if amplitude <= 0.0 {
        Decibels::SILENCE
    } else {
        Decibels(20.0 * amplitude.log10())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // AudioDriver needs an output device, so only the pure helpers are tested here.

    #[test]
    fn full_volume_is_unity_gain() {
        assert_eq!(amplitude_to_decibels(1.0), Decibels(0.0));
    }

    #[test]
    fn zero_volume_is_silence() {
        assert_eq!(amplitude_to_decibels(0.0), Decibels::SILENCE);
        assert_eq!(amplitude_to_decibels(-0.5), Decibels::SILENCE);
    }

    #[test]
    fn loop_volume_attenuates() {
        let db = amplitude_to_decibels(0.3);
        assert!((db.0 - -10.457).abs() < 0.01);
    }

    #[test]
    fn player_id_equality() {
        assert_eq!(PlayerId(1), PlayerId(1));
        assert_ne!(PlayerId(1), PlayerId(2));
    }
}

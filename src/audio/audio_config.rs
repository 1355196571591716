use serde::{Deserialize, Serialize};

/// Volume levels used by the sound manager.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundManagerConfig {
    /// Volume for music, ambience and weather (0.0 - 1.0).
    pub loop_volume: f32,
    /// Volume for one-shot effects (0.0 - 1.0).
    pub effect_volume: f32,
}

impl Default for SoundManagerConfig {
    fn default() -> Self {
        Self {
            loop_volume: 0.30,
            effect_volume: 1.0,
        }
    }
}

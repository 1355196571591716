//! Audio subsystem using kira.
//!
//! This module provides:
//! - [`SoundManager`]: Music, ambience, weather and effect channels
//! - [`AudioDriver`]: Kira-backed native players
//! - [`DirectoryResolver`]: Finds named sounds in asset directories
//! - [`SoundManagerConfig`]: Channel volume levels

mod audio_config;
mod audio_driver;
mod channel;
mod manager;
mod resolver;

pub use audio_config::SoundManagerConfig;
pub use audio_driver::AudioDriver;
pub use channel::{EFFECT_CHANNEL_COUNT, EffectChannel, FinishCallback, FinishReason, SoundSource};
pub use manager::{SharedSoundManager, SoundManager, update_shared};
pub use resolver::{DirectoryResolver, ResourceResolver};

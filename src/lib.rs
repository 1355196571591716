pub mod audio;
pub mod config;
pub mod traits;
pub mod util;

#[cfg(test)]
mod test_utils;

pub use audio::{EffectChannel, FinishReason, SoundManager, SoundSource};
pub use util::error::SoundError;

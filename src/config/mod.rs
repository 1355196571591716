pub mod settings;

pub use settings::{JsonSettingsStore, MemorySettingsStore, SettingsStore, SoundSettings};

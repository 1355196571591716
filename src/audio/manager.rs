use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::audio_config::SoundManagerConfig;
use super::channel::{
    EFFECT_CHANNEL_COUNT, EffectChannel, EffectSlot, FinishCallback, FinishReason, LoopingSlot,
    SoundSource, notify, release_player,
};
use super::resolver::ResourceResolver;
use crate::config::settings::{MemorySettingsStore, SettingsStore, SoundSettings};
use crate::traits::audio::{AudioBackend, Loops, PlayerId};
use crate::util::error::SoundError;

/// A manager shared between threads.
pub type SharedSoundManager<B> = Arc<Mutex<SoundManager<B>>>;

/// The three looping channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopChannel {
    Music,
    Ambient,
    Weather,
}

impl LoopChannel {
    fn category(self) -> &'static str {
        match self {
            Self::Music => "start_music",
            Self::Ambient => "play_ambient",
            Self::Weather => "play_weather",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Music => "background music",
            Self::Ambient => "background sound",
            Self::Weather => "background weather",
        }
    }
}

/// Plays background music, ambience, weather and four channels of effects.
///
/// Music, ambience and weather loop until stopped and ignore requests for the
/// sound they are already playing. Effects play once and may carry a callback,
/// which runs from [`SoundManager::update`] on the caller's thread.
///
/// Failed requests are logged and leave the current playback untouched.
pub struct SoundManager<B: AudioBackend> {
    backend: B,
    resolver: Box<dyn ResourceResolver + Send>,
    store: Box<dyn SettingsStore + Send>,
    settings: SoundSettings,
    config: SoundManagerConfig,
    music: LoopingSlot,
    ambient: LoopingSlot,
    weather: LoopingSlot,
    effects: [EffectSlot; EFFECT_CHANNEL_COUNT],
}

impl<B: AudioBackend> SoundManager<B> {
    /// Create a manager with default toggles that are kept in memory only.
    pub fn new<R>(backend: B, resolver: R) -> Self
    where
        R: ResourceResolver + Send + 'static,
    {
        Self {
            backend,
            resolver: Box::new(resolver),
            store: Box::new(MemorySettingsStore::new()),
            settings: SoundSettings::default(),
            config: SoundManagerConfig::default(),
            music: LoopingSlot::default(),
            ambient: LoopingSlot::default(),
            weather: LoopingSlot::default(),
            effects: Default::default(),
        }
    }

    /// Load the toggles from `store` and save later changes back to it.
    /// Falls back to defaults when the store can't be read.
    pub fn with_settings_store<S>(mut self, store: S) -> Self
    where
        S: SettingsStore + Send + 'static,
    {
        self.settings = match store.load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(category = "settings", "Unable to load sound settings, using defaults: {e:#}");
                SoundSettings::default()
            }
        };
        self.store = Box::new(store);
        self
    }

    pub fn with_config(mut self, config: SoundManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Wrap in a mutex for use from several threads.
    pub fn into_shared(self) -> SharedSoundManager<B> {
        Arc::new(Mutex::new(self))
    }

    // --- toggles ---

    pub fn settings(&self) -> SoundSettings {
        self.settings
    }

    pub fn config(&self) -> SoundManagerConfig {
        self.config
    }

    /// Enable or disable background music. Does not stop current music.
    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.settings.play_background_music = enabled;
        self.persist();
    }

    /// Enable or disable ambient and weather sounds. Does not stop current sounds.
    pub fn set_background_sounds_enabled(&mut self, enabled: bool) {
        self.settings.play_background_sounds = enabled;
        self.persist();
    }

    pub fn set_effects_enabled(&mut self, enabled: bool) {
        self.settings.play_sound_effects = enabled;
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.settings) {
            error!(category = "settings", "Unable to save sound settings: {e:#}");
        }
    }

    // --- looping channels ---

    /// Start looping background music. No-op if `source` is already playing.
    ///
    /// A source that can't be found, decoded or configured leaves the current
    /// music playing. The old music is stopped before the new one starts, so if
    /// the backend then refuses to play, the slot ends up empty.
    pub fn start_music(&mut self, source: impl Into<SoundSource>) {
        self.start_looping(LoopChannel::Music, source.into());
    }

    /// Start a looping ambient sound. No-op if `source` is already playing.
    /// Failures behave as for [`SoundManager::start_music`].
    pub fn play_ambient(&mut self, source: impl Into<SoundSource>) {
        self.start_looping(LoopChannel::Ambient, source.into());
    }

    /// Start a looping weather sound. No-op if `source` is already playing.
    /// Failures behave as for [`SoundManager::start_music`].
    pub fn play_weather(&mut self, source: impl Into<SoundSource>) {
        self.start_looping(LoopChannel::Weather, source.into());
    }

    pub fn stop_music(&mut self) {
        self.music.release(&mut self.backend);
    }

    pub fn stop_ambient(&mut self) {
        self.ambient.release(&mut self.backend);
    }

    pub fn stop_weather(&mut self) {
        self.weather.release(&mut self.backend);
    }

    pub fn current_music(&self) -> Option<&str> {
        self.music.current()
    }

    pub fn current_ambient(&self) -> Option<&str> {
        self.ambient.current()
    }

    pub fn current_weather(&self) -> Option<&str> {
        self.weather.current()
    }

    pub fn is_music_playing(&self) -> bool {
        self.loop_playing(LoopChannel::Music)
    }

    pub fn is_ambient_playing(&self) -> bool {
        self.loop_playing(LoopChannel::Ambient)
    }

    pub fn is_weather_playing(&self) -> bool {
        self.loop_playing(LoopChannel::Weather)
    }

    fn loop_playing(&self, channel: LoopChannel) -> bool {
        self.loop_slot(channel)
            .player()
            .is_some_and(|player| self.backend.is_playing(player))
    }

    fn loop_enabled(&self, channel: LoopChannel) -> bool {
        match channel {
            LoopChannel::Music => self.settings.play_background_music,
            LoopChannel::Ambient | LoopChannel::Weather => self.settings.play_background_sounds,
        }
    }

    fn loop_slot(&self, channel: LoopChannel) -> &LoopingSlot {
        match channel {
            LoopChannel::Music => &self.music,
            LoopChannel::Ambient => &self.ambient,
            LoopChannel::Weather => &self.weather,
        }
    }

    fn start_looping(&mut self, channel: LoopChannel, source: SoundSource) {
        if !self.loop_enabled(channel) {
            debug!(category = channel.category(), resource = %source, "Disabled, ignoring request");
            return;
        }

        let identifier = source.identifier().into_owned();
        if self.loop_slot(channel).is_current(&identifier) {
            return;
        }

        let player = match self.create_player(&source) {
            Ok(player) => player,
            Err(e) => {
                error!(category = channel.category(), resource = %source, "Unable to play {}: {e}", channel.label());
                return;
            }
        };

        if let Err(e) = configure_player(&mut self.backend, player, Loops::Infinite, self.config.loop_volume) {
            release_player(&mut self.backend, player);
            error!(
                category = channel.category(),
                resource = %source,
                "Unable to play {}: {}",
                channel.label(),
                SoundError::construction(identifier, e)
            );
            return;
        }

        let slot = match channel {
            LoopChannel::Music => &mut self.music,
            LoopChannel::Ambient => &mut self.ambient,
            LoopChannel::Weather => &mut self.weather,
        };
        slot.release(&mut self.backend);

        if let Err(e) = self.backend.play(player) {
            release_player(&mut self.backend, player);
            error!(
                category = channel.category(),
                resource = %source,
                "Unable to play {}: {}",
                channel.label(),
                SoundError::construction(identifier, e)
            );
            return;
        }

        info!(category = channel.category(), resource = %source, "Playing {}", channel.label());
        slot.attach(identifier, player);
    }

    // --- effects ---

    /// Play an effect once on `channel`, replacing whatever that channel plays.
    /// [`EffectChannel::All`] is rejected.
    ///
    /// A source that can't be found, decoded or configured leaves the channel's
    /// current effect and its callback in place. If the backend refuses to play
    /// after the old effect was stopped, the channel ends up empty.
    pub fn play_effect(&mut self, source: impl Into<SoundSource>, channel: EffectChannel) {
        self.start_effect(source.into(), channel, None);
    }

    /// Like [`SoundManager::play_effect`], calling `on_finished` exactly once when
    /// the effect ends, fails, or is not played at all.
    ///
    /// The callback is dropped without running if the effect is stopped or
    /// replaced first. `Skipped` and construction failures are reported before
    /// this returns; finished playback is reported from [`SoundManager::update`].
    pub fn play_effect_then<F>(
        &mut self,
        source: impl Into<SoundSource>,
        channel: EffectChannel,
        on_finished: F,
    ) where
        F: FnOnce(FinishReason) + Send + 'static,
    {
        self.start_effect(source.into(), channel, Some(Box::new(on_finished)));
    }

    /// Stop one effect channel, or every channel for [`EffectChannel::All`].
    pub fn stop_effect(&mut self, channel: EffectChannel) {
        match channel.index() {
            Some(index) => self.effects[index].release(&mut self.backend),
            None => {
                for slot in self.effects.iter_mut() {
                    slot.release(&mut self.backend);
                }
            }
        }
    }

    /// The sound loaded on a concrete effect channel.
    pub fn current_effect(&self, channel: EffectChannel) -> Option<&str> {
        channel.index().and_then(|i| self.effects[i].current())
    }

    /// Whether the effect on `channel` is still audible.
    /// For [`EffectChannel::All`], whether any effect is.
    pub fn is_effect_playing(&self, channel: EffectChannel) -> bool {
        let playing = |slot: &EffectSlot| {
            slot.player()
                .is_some_and(|player| self.backend.is_playing(player))
        };
        match channel.index() {
            Some(index) => playing(&self.effects[index]),
            None => self.effects.iter().any(playing),
        }
    }

    fn start_effect(
        &mut self,
        source: SoundSource,
        channel: EffectChannel,
        on_finished: Option<FinishCallback>,
    ) {
        if !self.settings.play_sound_effects {
            debug!(category = "play_effect", resource = %source, "Effects disabled, ignoring request");
            notify(on_finished, FinishReason::Skipped);
            return;
        }

        let Some(index) = channel.index() else {
            debug!(category = "play_effect", resource = %source, "Effects must target a single channel");
            notify(on_finished, FinishReason::Skipped);
            return;
        };

        let player = match self.create_player(&source) {
            Ok(player) => player,
            Err(e) => {
                error!(category = "play_effect", resource = %source, %channel, "Unable to play sound effect: {e}");
                notify(on_finished, FinishReason::Failed);
                return;
            }
        };

        if let Err(e) = configure_player(&mut self.backend, player, Loops::ONCE, self.config.effect_volume) {
            release_player(&mut self.backend, player);
            let e = SoundError::construction(source.identifier(), e);
            error!(category = "play_effect", resource = %source, %channel, "Unable to play sound effect: {e}");
            notify(on_finished, FinishReason::Failed);
            return;
        }

        self.effects[index].release(&mut self.backend);

        if let Err(e) = self.backend.play(player) {
            release_player(&mut self.backend, player);
            let e = SoundError::construction(source.identifier(), e);
            error!(category = "play_effect", resource = %source, %channel, "Unable to play sound effect: {e}");
            notify(on_finished, FinishReason::Failed);
            return;
        }

        debug!(category = "play_effect", resource = %source, %channel, "Playing sound effect");
        self.effects[index].attach(source.identifier().into_owned(), player, on_finished);
    }

    // --- shared ---

    /// Deliver finish events from the backend to effect callbacks.
    ///
    /// Call regularly from the thread that should run the callbacks, e.g. once
    /// per frame. Returns how many callbacks ran.
    ///
    /// For a [`SharedSoundManager`] use [`update_shared`], which releases the
    /// lock before the callbacks run.
    pub fn update(&mut self) -> usize {
        run_finished(self.take_finished())
    }

    /// Collect the callbacks of effects that finished since the last call,
    /// without running them.
    pub fn take_finished(&mut self) -> Vec<(FinishCallback, FinishReason)> {
        let mut finished = Vec::new();
        for event in self.backend.poll_finished() {
            let callback = self
                .effects
                .iter_mut()
                .find_map(|slot| slot.finish(event.player));

            match callback {
                Some(Some(callback)) => {
                    let reason = if event.success {
                        FinishReason::Completed
                    } else {
                        FinishReason::Failed
                    };
                    finished.push((callback, reason));
                }
                Some(None) => {}
                None => {
                    debug!(player = event.player.0, success = event.success, "Finish event for an untracked player");
                }
            }
        }
        finished
    }

    /// Stop music, ambience, weather and every effect channel.
    pub fn stop_all(&mut self) {
        self.stop_music();
        self.stop_ambient();
        self.stop_weather();
        self.stop_effect(EffectChannel::All);
    }

    /// Get a reference to the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Get a mutable reference to the underlying backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Resolve `source` and build a player for it.
    fn create_player(&mut self, source: &SoundSource) -> Result<PlayerId, SoundError> {
        let path = self.locate(source)?;
        self.backend
            .create_player(&path)
            .map_err(|e| SoundError::construction(source.identifier(), e))
    }

    fn locate(&self, source: &SoundSource) -> Result<PathBuf, SoundError> {
        match source {
            SoundSource::Resource(name) => self
                .resolver
                .resolve(name)
                .ok_or_else(|| SoundError::not_found(name.as_str())),
            SoundSource::Path(path) => Ok(path.clone()),
        }
    }

    #[cfg(test)]
    fn owned_players(&self) -> Vec<PlayerId> {
        [&self.music, &self.ambient, &self.weather]
            .iter()
            .filter_map(|slot| slot.player())
            .chain(self.effects.iter().filter_map(EffectSlot::player))
            .collect()
    }
}

impl<B: AudioBackend> Drop for SoundManager<B> {
    fn drop(&mut self) {
        self.stop_all();
        if let Err(e) = self.backend.dispose() {
            warn!("Failed to dispose audio backend: {e:#}");
        }
    }
}

/// [`SoundManager::update`] for a shared manager. The lock is held only while
/// finish events are collected, so callbacks may lock the manager again, e.g.
/// to chain the next effect.
pub fn update_shared<B: AudioBackend>(shared: &SharedSoundManager<B>) -> usize {
    let finished = shared.lock().take_finished();
    run_finished(finished)
}

fn run_finished(finished: Vec<(FinishCallback, FinishReason)>) -> usize {
    let count = finished.len();
    for (callback, reason) in finished {
        callback(reason);
    }
    count
}

/// Apply volume and loop count to a freshly created player.
fn configure_player<B: AudioBackend>(
    backend: &mut B,
    player: PlayerId,
    loops: Loops,
    volume: f32,
) -> Result<()> {
    backend.set_volume(player, volume)?;
    backend.set_loops(player, loops)
}

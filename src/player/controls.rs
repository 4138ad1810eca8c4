use tracing::debug;

use super::engine::{FullscreenHost, PlaybackEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaybackRate {
    Half,
    ThreeQuarters,
    Normal,
    OneAndQuarter,
    OneAndHalf,
    Double,
}

impl PlaybackRate {
    pub(crate) const ALL: [Self; 6] = [
        Self::Half,
        Self::ThreeQuarters,
        Self::Normal,
        Self::OneAndQuarter,
        Self::OneAndHalf,
        Self::Double,
    ];

    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Self::Half => 0.5,
            Self::ThreeQuarters => 0.75,
            Self::Normal => 1.0,
            Self::OneAndQuarter => 1.25,
            Self::OneAndHalf => 1.5,
            Self::Double => 2.0,
        }
    }

    /// Only exact members of the fixed set are accepted.
    pub(crate) fn from_f64(value: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|rate| rate.as_f64() == value)
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Half => "0.5x",
            Self::ThreeQuarters => "0.75x",
            Self::Normal => "1x",
            Self::OneAndQuarter => "1.25x",
            Self::OneAndHalf => "1.5x",
            Self::Double => "2x",
        }
    }
}

/// Transport state: `{Paused, Playing}` with mute and fullscreen as
/// orthogonal flags. Every transition is mirrored to the engine.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlaybackState {
    playing: bool,
    volume: f64,
    muted: bool,
    rate: PlaybackRate,
    fullscreen: bool,
    audible_volume: f64,
}

impl PlaybackState {
    pub(crate) fn new(autoplay: bool) -> Self {
        Self {
            playing: autoplay,
            volume: 1.0,
            muted: false,
            rate: PlaybackRate::Normal,
            fullscreen: false,
            audible_volume: 1.0,
        }
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.playing
    }

    pub(crate) fn volume(&self) -> f64 {
        self.volume
    }

    pub(crate) fn is_muted(&self) -> bool {
        self.muted
    }

    pub(crate) fn rate(&self) -> PlaybackRate {
        self.rate
    }

    pub(crate) fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Pushes the whole state to a freshly loaded engine.
    pub(crate) fn apply_to(&self, engine: &mut impl PlaybackEngine) {
        engine.set_volume(self.volume);
        engine.set_muted(self.muted);
        engine.set_rate(self.rate.as_f64());
        if self.playing {
            engine.play();
        } else {
            engine.pause();
        }
    }

    pub(crate) fn toggle_play(&mut self, engine: &mut impl PlaybackEngine) {
        self.set_playing(!self.playing, engine);
    }

    pub(crate) fn set_playing(&mut self, playing: bool, engine: &mut impl PlaybackEngine) {
        self.playing = playing;
        if playing {
            engine.play();
        } else {
            engine.pause();
        }
    }

    pub(crate) fn set_volume(&mut self, volume: f64, engine: &mut impl PlaybackEngine) {
        if !volume.is_finite() {
            debug!(volume, "ignoring non-finite volume");
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.volume = volume;
        self.muted = volume == 0.0;
        if volume > 0.0 {
            self.audible_volume = volume;
        }
        engine.set_volume(volume);
        engine.set_muted(self.muted);
    }

    /// Unmuting at a stored volume of zero brings back the last audible level.
    pub(crate) fn toggle_mute(&mut self, engine: &mut impl PlaybackEngine) {
        self.muted = !self.muted;
        if !self.muted && self.volume == 0.0 {
            self.volume = self.audible_volume;
            engine.set_volume(self.volume);
        }
        engine.set_muted(self.muted);
    }

    /// Returns `false` and leaves the rate untouched for values outside the set.
    pub(crate) fn set_playback_rate(
        &mut self,
        rate: f64,
        engine: &mut impl PlaybackEngine,
    ) -> bool {
        let Some(rate) = PlaybackRate::from_f64(rate) else {
            debug!(rate, "rejecting playback rate outside the supported set");
            return false;
        };
        self.rate = rate;
        engine.set_rate(rate.as_f64());
        true
    }

    /// Only asks the host; the flag follows its confirmation.
    pub(crate) fn request_fullscreen_toggle(&self, host: &mut dyn FullscreenHost) {
        if self.fullscreen {
            host.request_exit();
        } else {
            host.request_enter();
        }
    }

    pub(crate) fn on_fullscreen_change(&mut self, active: bool) {
        self.fullscreen = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::tests::{EngineCommand, FakeEngine, FakeHost};

    #[test]
    fn volume_sets_mute_exactly_at_zero() {
        let mut engine = FakeEngine::default();
        let mut state = PlaybackState::new(true);

        for volume in [0.0, 0.01, 0.5, 1.0, 0.0, 0.99] {
            state.set_volume(volume, &mut engine);
            assert_eq!(state.is_muted(), volume == 0.0, "volume {volume}");
            assert_eq!(state.volume(), volume);
        }
    }

    #[test]
    fn volume_is_clamped_and_garbage_rejected() {
        let mut engine = FakeEngine::default();
        let mut state = PlaybackState::new(true);

        state.set_volume(1.7, &mut engine);
        assert_eq!(state.volume(), 1.0);
        state.set_volume(-0.2, &mut engine);
        assert_eq!(state.volume(), 0.0);
        assert!(state.is_muted());

        let before = engine.commands.len();
        state.set_volume(f64::NAN, &mut engine);
        assert_eq!(state.volume(), 0.0);
        assert_eq!(engine.commands.len(), before);
    }

    #[test]
    fn unsupported_rates_are_rejected() {
        let mut engine = FakeEngine::default();
        let mut state = PlaybackState::new(true);
        assert!(state.set_playback_rate(1.5, &mut engine));

        for rate in [0.0, 0.25, 1.1, 3.0, 16.0, -1.0, f64::NAN] {
            assert!(!state.set_playback_rate(rate, &mut engine));
            assert_eq!(state.rate(), PlaybackRate::OneAndHalf);
        }
        assert_eq!(
            engine
                .commands
                .iter()
                .filter(|command| matches!(command, EngineCommand::Rate(_)))
                .count(),
            1
        );
    }

    #[test]
    fn unmute_restores_last_audible_volume() {
        let mut engine = FakeEngine::default();
        let mut state = PlaybackState::new(true);
        state.set_volume(0.4, &mut engine);
        state.set_volume(0.0, &mut engine);
        assert!(state.is_muted());

        state.toggle_mute(&mut engine);
        assert!(!state.is_muted());
        assert_eq!(state.volume(), 0.4);
    }

    #[test]
    fn mute_toggle_keeps_stored_volume() {
        let mut engine = FakeEngine::default();
        let mut state = PlaybackState::new(true);
        state.set_volume(0.7, &mut engine);
        state.toggle_mute(&mut engine);
        assert!(state.is_muted());
        assert_eq!(state.volume(), 0.7);
        assert_eq!(engine.commands.last(), Some(&EngineCommand::Muted(true)));
    }

    #[test]
    fn fullscreen_follows_host_confirmation_only() {
        let mut host = FakeHost::default();
        let mut state = PlaybackState::new(false);

        state.request_fullscreen_toggle(&mut host);
        assert_eq!(host.enter_requests, 1);
        assert!(!state.is_fullscreen());

        state.on_fullscreen_change(true);
        state.request_fullscreen_toggle(&mut host);
        assert_eq!(host.exit_requests, 1);
        assert!(state.is_fullscreen());
    }
}

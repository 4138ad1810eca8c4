use std::time::Instant;

use tracing::{debug, info, warn};

use super::controls::PlaybackState;
use super::engine::{EngineEvent, FullscreenHost, PlaybackEngine};
use super::episode::{EndOfStream, EpisodeContext, EpisodeNavigator, NavigationRequest};
use super::history::{KeyValueStore, WatchHistory};
use super::progress::ProgressState;
use super::source::{QualitySource, RESOLUTION_FAILED_MESSAGE, SourceError, Subtitle, VideoSource};
use super::visibility::ControlsVisibility;

const VOLUME_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Menu {
    Closed,
    Speed,
    Quality,
}

#[derive(Debug, Clone)]
enum Phase {
    Ready {
        qualities: Vec<QualitySource>,
        active: usize,
        subtitles: Vec<Subtitle>,
    },
    Failed {
        message: String,
    },
    Closed,
}

/// One mounted watch view: a resolved source driving an engine, plus the
/// timers and history writes that belong to this episode only.
///
/// Control operations are no-ops unless the session is ready. After a
/// navigation request or teardown the session is closed for good.
#[derive(Debug)]
pub(crate) struct WatchSession<E, S> {
    context: EpisodeContext,
    engine: E,
    history: WatchHistory<S>,
    phase: Phase,
    playback: PlaybackState,
    progress: ProgressState,
    visibility: ControlsVisibility,
    navigator: EpisodeNavigator,
    menu: Menu,
}

impl<E: PlaybackEngine, S: KeyValueStore> WatchSession<E, S> {
    pub(crate) fn mount(
        context: EpisodeContext,
        resolution: Result<VideoSource, SourceError>,
        mut engine: E,
        history: WatchHistory<S>,
        autoplay: bool,
        now: Instant,
    ) -> Self {
        let resolved = resolution.and_then(|source| {
            let qualities = source.playable();
            if qualities.is_empty() {
                return Err(SourceError::Empty {
                    title_id: context.movie_id().to_string(),
                    episode: context.current(),
                });
            }
            Ok((qualities, source.subtitles))
        });

        let (phase, playback) = match resolved {
            Ok((qualities, subtitles)) => {
                let playback = PlaybackState::new(autoplay);
                engine.load(&qualities[0].url);
                playback.apply_to(&mut engine);
                info!(
                    movie_id = context.movie_id(),
                    episode = context.current(),
                    quality = %qualities[0].quality,
                    autoplay,
                    "watch session mounted"
                );
                let phase = Phase::Ready {
                    qualities,
                    active: 0,
                    subtitles,
                };
                (phase, playback)
            }
            Err(err) => {
                warn!(
                    movie_id = context.movie_id(),
                    episode = context.current(),
                    %err,
                    "video source unavailable"
                );
                let phase = Phase::Failed {
                    message: RESOLUTION_FAILED_MESSAGE.to_string(),
                };
                (phase, PlaybackState::new(false))
            }
        };

        let mut session = Self {
            context,
            engine,
            history,
            phase,
            playback,
            progress: ProgressState::default(),
            visibility: ControlsVisibility::default(),
            navigator: EpisodeNavigator::default(),
            menu: Menu::Closed,
        };
        if session.is_ready() {
            session.touch(now);
        }
        session
    }

    pub(crate) fn context(&self) -> &EpisodeContext {
        &self.context
    }

    pub(crate) fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub(crate) fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub(crate) fn menu(&self) -> Menu {
        self.menu
    }

    pub(crate) fn engine(&self) -> &E {
        &self.engine
    }

    pub(crate) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    #[cfg(test)]
    pub(crate) fn history(&self) -> &WatchHistory<S> {
        &self.history
    }

    pub(crate) fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready { .. })
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Closed)
    }

    pub(crate) fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub(crate) fn controls_visible(&self) -> bool {
        self.visibility.is_visible()
    }

    pub(crate) fn auto_advance_pending(&self) -> bool {
        self.navigator.auto_advance_pending()
    }

    pub(crate) fn qualities(&self) -> &[QualitySource] {
        match &self.phase {
            Phase::Ready { qualities, .. } => qualities.as_slice(),
            _ => &[],
        }
    }

    pub(crate) fn active_quality(&self) -> Option<&QualitySource> {
        match &self.phase {
            Phase::Ready {
                qualities, active, ..
            } => qualities.get(*active),
            _ => None,
        }
    }

    pub(crate) fn subtitles(&self) -> &[Subtitle] {
        match &self.phase {
            Phase::Ready { subtitles, .. } => subtitles.as_slice(),
            _ => &[],
        }
    }

    /// An open menu or an unfinished scrub keeps the overlay on screen, so the
    /// progress bar is still there when the gesture is released.
    fn overlay_pinned(&self) -> bool {
        self.menu != Menu::Closed || self.progress.is_seeking()
    }

    fn touch(&mut self, now: Instant) {
        self.visibility
            .on_activity(self.playback.is_playing(), self.overlay_pinned(), now);
    }

    pub(crate) fn pointer_moved(&mut self, now: Instant) {
        if self.is_ready() {
            self.touch(now);
        }
    }

    pub(crate) fn pointer_left(&mut self, now: Instant) {
        if self.is_ready() {
            self.visibility.on_pointer_leave(
                self.playback.is_playing(),
                self.overlay_pinned(),
                now,
            );
        }
    }

    pub(crate) fn toggle_play(&mut self, now: Instant) {
        if !self.is_ready() {
            return;
        }
        self.playback.toggle_play(&mut self.engine);
        self.touch(now);
    }

    pub(crate) fn set_volume(&mut self, volume: f64) {
        if self.is_ready() {
            self.playback.set_volume(volume, &mut self.engine);
        }
    }

    pub(crate) fn step_volume(&mut self, up: bool) {
        let delta = if up { VOLUME_STEP } else { -VOLUME_STEP };
        let target = ((self.playback.volume() + delta) * 10.0).round() / 10.0;
        self.set_volume(target);
    }

    pub(crate) fn toggle_mute(&mut self) {
        if self.is_ready() {
            self.playback.toggle_mute(&mut self.engine);
        }
    }

    /// Accepted rates also close the speed menu.
    pub(crate) fn set_playback_rate(&mut self, rate: f64, now: Instant) -> bool {
        if !self.is_ready() || !self.playback.set_playback_rate(rate, &mut self.engine) {
            return false;
        }
        if self.menu == Menu::Speed {
            self.close_menu(now);
        }
        true
    }

    pub(crate) fn toggle_speed_menu(&mut self, now: Instant) {
        self.toggle_menu(Menu::Speed, now);
    }

    pub(crate) fn toggle_quality_menu(&mut self, now: Instant) {
        self.toggle_menu(Menu::Quality, now);
    }

    fn toggle_menu(&mut self, menu: Menu, now: Instant) {
        if !self.is_ready() {
            return;
        }
        if self.menu == menu {
            self.close_menu(now);
        } else {
            self.menu = menu;
            self.visibility.on_menu_opened();
        }
    }

    pub(crate) fn close_menu(&mut self, now: Instant) {
        if self.menu == Menu::Closed {
            return;
        }
        self.menu = Menu::Closed;
        self.touch(now);
    }

    /// Reloads the engine with another quality and returns to the same position.
    pub(crate) fn select_quality(&mut self, index: usize, now: Instant) -> bool {
        let Phase::Ready {
            qualities, active, ..
        } = &mut self.phase
        else {
            return false;
        };
        let Some(source) = qualities.get(index) else {
            return false;
        };
        if *active != index {
            *active = index;
            debug!(quality = %source.quality, "switching quality");
            self.engine.load(&source.url);
            self.playback.apply_to(&mut self.engine);
            self.engine.seek(self.progress.played());
        }
        if self.menu == Menu::Quality {
            self.close_menu(now);
        }
        true
    }

    pub(crate) fn toggle_fullscreen(&mut self, host: &mut dyn FullscreenHost) {
        if self.is_ready() {
            self.playback.request_fullscreen_toggle(host);
        }
    }

    /// Host confirmation of a fullscreen change; a denied request never arrives.
    pub(crate) fn on_fullscreen_change(&mut self, active: bool) {
        self.playback.on_fullscreen_change(active);
    }

    pub(crate) fn scrub_start(&mut self, now: Instant) {
        if !self.is_ready() {
            return;
        }
        self.progress.scrub_start();
        self.touch(now);
    }

    pub(crate) fn scrub_input(&mut self, fraction: f64) {
        if self.is_ready() {
            self.progress.scrub_input(fraction);
        }
    }

    pub(crate) fn scrub_commit(&mut self, fraction: f64, now: Instant) {
        if !self.is_ready() || !self.progress.is_seeking() {
            return;
        }
        let fraction = self.progress.scrub_commit(fraction);
        self.engine.seek(fraction);
        self.touch(now);
    }

    /// Keyboard seek, expressed as a complete scrub gesture.
    pub(crate) fn seek_by(&mut self, delta_seconds: f64, now: Instant) {
        if !self.is_ready() {
            return;
        }
        let Some(fraction) = self.progress.fraction_after(delta_seconds) else {
            return;
        };
        self.scrub_start(now);
        self.scrub_commit(fraction, now);
    }

    pub(crate) fn handle_engine_event(&mut self, event: EngineEvent, now: Instant) {
        if !self.is_ready() {
            return;
        }
        match event {
            EngineEvent::Progress {
                played,
                played_seconds,
                loaded,
            } => {
                self.progress
                    .on_engine_progress(played, played_seconds, loaded);
            }
            EngineEvent::Duration(seconds) => self.progress.on_duration(seconds),
            EngineEvent::Ended => match self.navigator.on_ended(&self.context, now) {
                EndOfStream::AdvanceScheduled => {
                    info!(
                        movie_id = self.context.movie_id(),
                        episode = self.context.current(),
                        "episode ended, auto-advance scheduled"
                    );
                }
                EndOfStream::AlreadyScheduled => {}
                EndOfStream::Finished => {
                    info!(movie_id = self.context.movie_id(), "final episode ended");
                    self.playback.set_playing(false, &mut self.engine);
                    self.touch(now);
                }
            },
        }
    }

    /// Fires due timers. A due auto-advance yields the navigation it issued.
    pub(crate) fn tick(&mut self, now: Instant) -> Option<NavigationRequest> {
        if !self.is_ready() {
            return None;
        }
        self.visibility.tick(now);
        if self.navigator.tick(now) {
            return self.next();
        }
        None
    }

    pub(crate) fn previous(&mut self) -> Option<NavigationRequest> {
        let target = self.context.previous_target()?;
        self.navigate(target)
    }

    pub(crate) fn next(&mut self) -> Option<NavigationRequest> {
        let target = self.context.next_target()?;
        self.navigate(target)
    }

    fn navigate(&mut self, episode: u32) -> Option<NavigationRequest> {
        if !self.is_ready() {
            return None;
        }
        let movie_id = self.context.movie_id().to_string();
        self.history.record(&movie_id, episode, 0.0);
        info!(%movie_id, from = self.context.current(), to = episode, "navigating to episode");
        self.teardown();
        Some(NavigationRequest { movie_id, episode })
    }

    /// Cancels both timers and stops playback. Safe to call repeatedly.
    pub(crate) fn teardown(&mut self) {
        self.visibility.cancel();
        self.navigator.cancel();
        self.menu = Menu::Closed;
        if self.is_ready() {
            self.engine.pause();
        }
        self.phase = Phase::Closed;
    }

    pub(crate) fn into_parts(mut self) -> (E, WatchHistory<S>) {
        self.teardown();
        (self.engine, self.history)
    }
}

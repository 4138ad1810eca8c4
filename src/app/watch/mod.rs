mod host;
mod input;
mod render;
mod sim;
mod terminal;

#[cfg(test)]
mod tests;

use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, info};

use crate::catalog::Title;
use crate::player::controls::PlaybackRate;
use crate::player::{
    EpisodeContext, KeyValueStore, Menu, NavigationRequest, SourceError, SourceResolver,
    VideoSource, WatchHistory, WatchSession,
};

use self::host::TerminalFullscreen;
use self::input::map_event;
use self::render::{Hitboxes, draw_watch};
use self::sim::SimulatedEngine;
use self::terminal::TerminalSession;

pub(crate) use self::input::Input;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub(crate) type Store = Box<dyn KeyValueStore>;
pub(crate) type SharedResolver = Arc<dyn SourceResolver + Send + Sync>;
type Session = WatchSession<SimulatedEngine, Store>;

pub(crate) enum Stage {
    Loading {
        engine: SimulatedEngine,
        history: WatchHistory<Store>,
    },
    Mounted(Session),
}

#[derive(Debug)]
pub(crate) struct Resolution {
    generation: u64,
    result: Result<VideoSource, SourceError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

/// The watch page: owns the current session and plays the routing layer,
/// remounting a fresh session for every navigation request.
pub(crate) struct WatchView {
    title: &'static Title,
    context: EpisodeContext,
    stage: Option<Stage>,
    menu_cursor: usize,
    status: String,
    fullscreen: TerminalFullscreen,
    autoplay: bool,
    resolver: SharedResolver,
    generation: u64,
    tx: mpsc::Sender<Resolution>,
    rx: mpsc::Receiver<Resolution>,
}

impl WatchView {
    pub(crate) fn new(
        title: &'static Title,
        context: EpisodeContext,
        history: WatchHistory<Store>,
        engine: SimulatedEngine,
        resolver: SharedResolver,
        autoplay: bool,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut view = Self {
            title,
            status: status_info(&format!("Loading episode {}...", context.current())),
            context,
            stage: Some(Stage::Loading { engine, history }),
            menu_cursor: 0,
            fullscreen: TerminalFullscreen::default(),
            autoplay,
            resolver,
            generation: 0,
            tx,
            rx,
        };
        view.request_source();
        view
    }

    pub(crate) fn context(&self) -> &EpisodeContext {
        &self.context
    }

    #[cfg(test)]
    pub(crate) fn status(&self) -> &str {
        &self.status
    }

    pub(crate) fn session(&self) -> Option<&Session> {
        match self.stage.as_ref() {
            Some(Stage::Mounted(session)) => Some(session),
            _ => None,
        }
    }

    fn menu_open(&self) -> bool {
        self.session()
            .is_some_and(|session| session.menu() != Menu::Closed)
    }

    fn scrubbing(&self) -> bool {
        self.session()
            .is_some_and(|session| session.progress().is_seeking())
    }

    /// Fire-and-forget resolution on a worker thread; the answer is tagged with
    /// the generation it was requested for.
    fn request_source(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        let resolver = Arc::clone(&self.resolver);
        let movie_id = self.context.movie_id().to_string();
        let episode = self.context.current();
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let result = resolver.resolve(&movie_id, episode);
            let _ = tx.send(Resolution { generation, result });
        });
    }

    pub(crate) fn drain_resolutions(&mut self, now: Instant) {
        while let Ok(resolution) = self.rx.try_recv() {
            self.receive(resolution, now);
        }
    }

    #[cfg(test)]
    pub(crate) fn wait_for_resolution(&mut self, timeout: Duration, now: Instant) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(resolution) => {
                self.receive(resolution, now);
                true
            }
            Err(_) => false,
        }
    }

    fn receive(&mut self, resolution: Resolution, now: Instant) {
        if resolution.generation != self.generation {
            debug!(
                generation = resolution.generation,
                current = self.generation,
                "discarding stale source resolution"
            );
            return;
        }
        match self.stage.take() {
            Some(Stage::Loading { engine, history }) => {
                let mut session = WatchSession::mount(
                    self.context.clone(),
                    resolution.result,
                    engine,
                    history,
                    self.autoplay,
                    now,
                );
                session.on_fullscreen_change(self.fullscreen.is_active());
                self.status = if session.is_ready() {
                    status_info(&format!(
                        "Watching {} episode {}.",
                        self.title.title,
                        self.context.current()
                    ))
                } else {
                    status_error("Video unavailable.")
                };
                self.stage = Some(Stage::Mounted(session));
            }
            other => self.stage = other,
        }
    }

    /// Advances the engine, confirms host changes and fires due timers.
    pub(crate) fn pump(&mut self, now: Instant) {
        let Some(Stage::Mounted(session)) = self.stage.as_mut() else {
            return;
        };
        let events = session.engine_mut().advance(now);
        for event in events {
            session.handle_engine_event(event, now);
        }
        if let Some(active) = self.fullscreen.take_change() {
            session.on_fullscreen_change(active);
        }
        if let Some(request) = session.tick(now) {
            self.navigate(request);
        }
    }

    pub(crate) fn apply(&mut self, input: Input, now: Instant) -> Flow {
        if input == Input::Quit {
            return Flow::Quit;
        }
        let Some(Stage::Mounted(session)) = self.stage.as_mut() else {
            return Flow::Continue;
        };
        if !matches!(input, Input::Ignore | Input::PointerLeft) {
            session.pointer_moved(now);
        }

        let mut navigation = None;
        match input {
            Input::TogglePlay => session.toggle_play(now),
            Input::ToggleMute => session.toggle_mute(),
            Input::Volume { up } => session.step_volume(up),
            Input::Seek(delta) => session.seek_by(delta, now),
            Input::SpeedMenu => {
                session.toggle_speed_menu(now);
                let current = session.playback().rate();
                self.menu_cursor = PlaybackRate::ALL
                    .iter()
                    .position(|rate| *rate == current)
                    .unwrap_or(0);
            }
            Input::QualityMenu => {
                session.toggle_quality_menu(now);
                let active = session.active_quality().map(|source| source.quality.clone());
                self.menu_cursor = session
                    .qualities()
                    .iter()
                    .position(|source| Some(&source.quality) == active.as_ref())
                    .unwrap_or(0);
            }
            Input::Fullscreen => session.toggle_fullscreen(&mut self.fullscreen),
            Input::NextEpisode => {
                navigation = session.next();
                if navigation.is_none() && session.is_ready() {
                    self.status = status_info("No next episode available.");
                }
            }
            Input::PreviousEpisode => {
                navigation = session.previous();
                if navigation.is_none() && session.is_ready() {
                    self.status = status_info("No previous episode available.");
                }
            }
            Input::CloseMenu => {
                if session.menu() != Menu::Closed {
                    session.close_menu(now);
                } else if self.fullscreen.is_active() {
                    session.toggle_fullscreen(&mut self.fullscreen);
                }
            }
            Input::MenuMove { down } => {
                let len = match session.menu() {
                    Menu::Speed => PlaybackRate::ALL.len(),
                    Menu::Quality => session.qualities().len(),
                    Menu::Closed => 0,
                };
                if len > 0 {
                    self.menu_cursor = if down {
                        (self.menu_cursor + 1).min(len - 1)
                    } else {
                        self.menu_cursor.saturating_sub(1)
                    };
                }
            }
            Input::MenuSelect => match session.menu() {
                Menu::Speed => {
                    if let Some(rate) = PlaybackRate::ALL.get(self.menu_cursor) {
                        session.set_playback_rate(rate.as_f64(), now);
                    }
                }
                Menu::Quality => {
                    session.select_quality(self.menu_cursor, now);
                }
                Menu::Closed => {}
            },
            Input::PointerLeft => session.pointer_left(now),
            Input::ScrubStart(fraction) => {
                session.scrub_start(now);
                session.scrub_input(fraction);
            }
            Input::ScrubInput(fraction) => session.scrub_input(fraction),
            Input::ScrubCommit(fraction) => session.scrub_commit(fraction, now),
            Input::PointerMoved | Input::Quit | Input::Ignore => {}
        }

        if let Some(request) = navigation {
            self.navigate(request);
        }
        Flow::Continue
    }

    fn navigate(&mut self, request: NavigationRequest) {
        let next_context = match self.context.for_request(&request) {
            Ok(context) => context,
            Err(err) => {
                self.status = status_error(&format!("Navigation rejected: {err}"));
                return;
            }
        };
        match self.stage.take() {
            Some(Stage::Mounted(session)) => {
                let (engine, history) = session.into_parts();
                self.stage = Some(Stage::Loading { engine, history });
            }
            other => {
                self.stage = other;
                return;
            }
        }
        info!(
            movie_id = %request.movie_id,
            episode = request.episode,
            "remounting watch view"
        );
        self.context = next_context;
        self.menu_cursor = 0;
        self.status = status_info(&format!("Loading episode {}...", request.episode));
        self.request_source();
    }

    /// Unmount: cancels every pending timer of the current session.
    pub(crate) fn close(&mut self) {
        if let Some(Stage::Mounted(session)) = self.stage.as_mut() {
            session.teardown();
        }
    }
}

pub(crate) fn run_watch(
    title: &'static Title,
    context: EpisodeContext,
    history: WatchHistory<Store>,
    resolver: SharedResolver,
    sim_duration: Duration,
    autoplay: bool,
) -> Result<EpisodeContext> {
    let mut terminal_session = TerminalSession::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;

    let engine = SimulatedEngine::new(sim_duration);
    let mut view = WatchView::new(title, context, history, engine, resolver, autoplay);
    let mut hitboxes = Hitboxes::default();

    loop {
        let now = Instant::now();
        view.drain_resolutions(now);
        view.pump(now);
        terminal.draw(|frame| hitboxes = draw_watch(frame, &view))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let event = event::read()?;
        let input = map_event(
            &event,
            view.menu_open(),
            hitboxes.progress_bar,
            view.scrubbing(),
        );
        if view.apply(input, Instant::now()) == Flow::Quit {
            break;
        }
    }

    view.close();
    terminal.show_cursor()?;
    terminal_session.leave()?;
    Ok(view.context().clone())
}

pub(crate) fn status_info(msg: &str) -> String {
    format!("INFO: {msg}")
}

pub(crate) fn status_error(msg: &str) -> String {
    format!("ERROR: {msg}")
}

#[cfg(test)]
pub(crate) fn simulated_engine(duration: Duration) -> SimulatedEngine {
    SimulatedEngine::new(duration)
}

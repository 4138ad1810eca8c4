/// Command surface of the underlying playback engine.
///
/// The player core never reads engine state; everything it learns arrives as
/// an [`EngineEvent`] handed to the session by the host.
pub(crate) trait PlaybackEngine {
    fn load(&mut self, url: &str);
    fn play(&mut self);
    fn pause(&mut self);
    /// `fraction` is a position in `[0, 1]` of the total duration.
    fn seek(&mut self, fraction: f64);
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
    fn set_rate(&mut self, rate: f64);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum EngineEvent {
    Progress {
        played: f64,
        played_seconds: f64,
        loaded: f64,
    },
    Duration(f64),
    Ended,
}

/// Host capability for presenting the player container exclusively.
///
/// Requests may be denied; the outcome is reported back through
/// `WatchSession::on_fullscreen_change`.
pub(crate) trait FullscreenHost {
    fn request_enter(&mut self);
    fn request_exit(&mut self);
}

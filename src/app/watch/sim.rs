use std::time::{Duration, Instant};

use tracing::debug;

use crate::player::{EngineEvent, PlaybackEngine};

/// Seconds of media the fake buffer stays ahead of the playhead.
const BUFFER_AHEAD_SECS: f64 = 30.0;

/// Clock-driven stand-in for a real decoder. It reports duration once per
/// load, progress on every advance, and end-of-stream once per pass.
#[derive(Debug)]
pub(crate) struct SimulatedEngine {
    duration: f64,
    url: Option<String>,
    playing: bool,
    rate: f64,
    volume: f64,
    muted: bool,
    position: f64,
    last_advance: Option<Instant>,
    duration_reported: bool,
    ended: bool,
}

impl SimulatedEngine {
    pub(crate) fn new(duration: Duration) -> Self {
        Self {
            duration: duration.as_secs_f64().max(1.0),
            url: None,
            playing: false,
            rate: 1.0,
            volume: 1.0,
            muted: false,
            position: 0.0,
            last_advance: None,
            duration_reported: false,
            ended: false,
        }
    }

    pub(crate) fn audible_level(&self) -> f64 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Moves the playhead by the wall time since the previous call.
    pub(crate) fn advance(&mut self, now: Instant) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if self.url.is_none() {
            return events;
        }

        let elapsed = self
            .last_advance
            .map(|last| now.saturating_duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last_advance = Some(now);

        if !self.duration_reported {
            self.duration_reported = true;
            events.push(EngineEvent::Duration(self.duration));
        }

        if self.ended {
            return events;
        }
        if self.playing {
            self.position = (self.position + elapsed * self.rate).min(self.duration);
        }
        events.push(EngineEvent::Progress {
            played: self.position / self.duration,
            played_seconds: self.position,
            loaded: ((self.position + BUFFER_AHEAD_SECS) / self.duration).min(1.0),
        });
        if self.position >= self.duration {
            self.ended = true;
            self.playing = false;
            events.push(EngineEvent::Ended);
        }
        events
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn load(&mut self, url: &str) {
        debug!(url, "simulated engine loading");
        self.url = Some(url.to_string());
        self.position = 0.0;
        self.last_advance = None;
        self.duration_reported = false;
        self.ended = false;
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, fraction: f64) {
        self.position = fraction.clamp(0.0, 1.0) * self.duration;
        self.ended = false;
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_until_loaded() {
        let mut engine = SimulatedEngine::new(Duration::from_secs(60));
        assert!(engine.advance(Instant::now()).is_empty());
    }

    #[test]
    fn reports_duration_once_then_progress_scaled_by_rate() {
        let start = Instant::now();
        let mut engine = SimulatedEngine::new(Duration::from_secs(100));
        engine.load("sim://clip");
        engine.set_rate(2.0);
        engine.play();

        let first = engine.advance(start);
        assert_eq!(first[0], EngineEvent::Duration(100.0));

        let second = engine.advance(start + Duration::from_secs(5));
        assert_eq!(
            second,
            vec![EngineEvent::Progress {
                played: 0.1,
                played_seconds: 10.0,
                loaded: 0.4,
            }]
        );
    }

    #[test]
    fn paused_engine_holds_position() {
        let start = Instant::now();
        let mut engine = SimulatedEngine::new(Duration::from_secs(100));
        engine.load("sim://clip");
        engine.advance(start);
        engine.advance(start + Duration::from_secs(30));

        let events = engine.advance(start + Duration::from_secs(60));
        assert!(matches!(
            events[0],
            EngineEvent::Progress { played_seconds, .. } if played_seconds == 0.0
        ));
    }

    #[test]
    fn ends_once_at_duration() {
        let start = Instant::now();
        let mut engine = SimulatedEngine::new(Duration::from_secs(10));
        engine.load("sim://clip");
        engine.play();
        engine.advance(start);

        let events = engine.advance(start + Duration::from_secs(12));
        assert_eq!(events.last(), Some(&EngineEvent::Ended));
        assert!(engine.advance(start + Duration::from_secs(13)).is_empty());

        engine.seek(0.5);
        engine.play();
        let events = engine.advance(start + Duration::from_secs(14));
        assert!(matches!(
            events[0],
            EngineEvent::Progress { played_seconds, .. } if played_seconds == 6.0
        ));
    }
}

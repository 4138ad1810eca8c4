use super::time::format_time;

/// Playback position as reported by the engine, reconciled with user scrubbing.
///
/// While a scrub gesture is in progress the bar follows the pointer only;
/// engine reports arriving in that window are dropped, not queued.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ProgressState {
    played: f64,
    played_seconds: f64,
    loaded: f64,
    duration: f64,
    seeking: bool,
}

impl ProgressState {
    pub(crate) fn played(&self) -> f64 {
        self.played
    }

    pub(crate) fn played_seconds(&self) -> f64 {
        self.played_seconds
    }

    pub(crate) fn loaded(&self) -> f64 {
        self.loaded
    }

    #[cfg(test)]
    pub(crate) fn duration(&self) -> f64 {
        self.duration
    }

    pub(crate) fn is_seeking(&self) -> bool {
        self.seeking
    }

    /// Returns `false` when the report was dropped because a scrub is active.
    pub(crate) fn on_engine_progress(
        &mut self,
        played: f64,
        played_seconds: f64,
        loaded: f64,
    ) -> bool {
        if self.seeking {
            return false;
        }
        self.played = clamp_fraction(played);
        self.played_seconds = if played_seconds.is_finite() {
            played_seconds.max(0.0)
        } else {
            0.0
        };
        self.loaded = clamp_fraction(loaded);
        true
    }

    pub(crate) fn on_duration(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds >= 0.0 {
            self.duration = seconds;
        }
    }

    pub(crate) fn scrub_start(&mut self) {
        self.seeking = true;
    }

    pub(crate) fn scrub_input(&mut self, fraction: f64) {
        if self.seeking {
            self.played = clamp_fraction(fraction);
        }
    }

    /// Ends the gesture and returns the fraction the engine should seek to.
    pub(crate) fn scrub_commit(&mut self, fraction: f64) -> f64 {
        let fraction = clamp_fraction(fraction);
        self.seeking = false;
        self.played = fraction;
        self.played_seconds = self.seconds_at(fraction);
        fraction
    }

    /// Fraction for a position `delta` seconds away from the current one, or
    /// `None` while the duration is still unknown.
    pub(crate) fn fraction_after(&self, delta: f64) -> Option<f64> {
        if self.duration <= 0.0 {
            return None;
        }
        let target = (self.played_seconds + delta).clamp(0.0, self.duration);
        Some(target / self.duration)
    }

    pub(crate) fn seconds_at(&self, fraction: f64) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        clamp_fraction(fraction) * self.duration
    }

    /// While scrubbing, the elapsed label follows the pointer.
    pub(crate) fn elapsed_label(&self) -> String {
        if self.seeking {
            format_time(self.seconds_at(self.played))
        } else {
            format_time(self.played_seconds)
        }
    }

    pub(crate) fn duration_label(&self) -> String {
        format_time(self.duration)
    }
}

fn clamp_fraction(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_reports_apply_when_not_seeking() {
        let mut progress = ProgressState::default();
        assert!(progress.on_engine_progress(0.25, 30.0, 0.5));
        assert_eq!(progress.played(), 0.25);
        assert_eq!(progress.played_seconds(), 30.0);
        assert_eq!(progress.loaded(), 0.5);
    }

    #[test]
    fn engine_reports_are_dropped_while_scrubbing() {
        let mut progress = ProgressState::default();
        progress.on_duration(100.0);
        progress.scrub_start();
        progress.scrub_input(0.8);

        for step in 0..5 {
            assert!(!progress.on_engine_progress(0.1 * step as f64, step as f64, 1.0));
        }
        assert_eq!(progress.played(), 0.8);
        assert_eq!(progress.elapsed_label(), "1:20");

        assert_eq!(progress.scrub_commit(0.6), 0.6);
        assert!(!progress.is_seeking());
        assert_eq!(progress.played(), 0.6);
        assert_eq!(progress.played_seconds(), 60.0);
    }

    #[test]
    fn scrub_input_is_ignored_outside_a_gesture() {
        let mut progress = ProgressState::default();
        progress.scrub_input(0.9);
        assert_eq!(progress.played(), 0.0);
    }

    #[test]
    fn zero_duration_never_divides() {
        let mut progress = ProgressState::default();
        assert_eq!(progress.seconds_at(0.5), 0.0);
        assert_eq!(progress.fraction_after(10.0), None);
        assert_eq!(progress.duration_label(), "0:00");
        progress.scrub_start();
        progress.scrub_commit(0.7);
        assert_eq!(progress.elapsed_label(), "0:00");
    }

    #[test]
    fn duration_is_last_write_wins_and_rejects_garbage() {
        let mut progress = ProgressState::default();
        progress.on_duration(120.0);
        progress.on_duration(121.5);
        progress.on_duration(-1.0);
        progress.on_duration(f64::NAN);
        assert_eq!(progress.duration(), 121.5);
    }

    #[test]
    fn relative_seek_clamps_to_bounds() {
        let mut progress = ProgressState::default();
        progress.on_duration(100.0);
        progress.on_engine_progress(0.95, 95.0, 1.0);
        assert_eq!(progress.fraction_after(10.0), Some(1.0));
        assert_eq!(progress.fraction_after(-200.0), Some(0.0));
    }
}

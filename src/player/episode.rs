use std::time::{Duration, Instant};

use thiserror::Error;

use super::timer::Deadline;

pub(crate) const AUTO_ADVANCE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum EpisodeError {
    #[error("title id must not be empty")]
    EmptyTitle,
    #[error("episode {episode} is outside 1..={total}")]
    OutOfRange { episode: u32, total: u32 },
    #[error("title must have at least one episode")]
    NoEpisodes,
}

/// Identity of the episode being watched. Fixed for the lifetime of a mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EpisodeContext {
    movie_id: String,
    current: u32,
    total: u32,
}

impl EpisodeContext {
    pub(crate) fn new(
        movie_id: impl Into<String>,
        current: u32,
        total: u32,
    ) -> Result<Self, EpisodeError> {
        let movie_id = movie_id.into();
        if movie_id.trim().is_empty() {
            return Err(EpisodeError::EmptyTitle);
        }
        if total == 0 {
            return Err(EpisodeError::NoEpisodes);
        }
        if current == 0 || current > total {
            return Err(EpisodeError::OutOfRange {
                episode: current,
                total,
            });
        }
        Ok(Self {
            movie_id,
            current,
            total,
        })
    }

    pub(crate) fn movie_id(&self) -> &str {
        &self.movie_id
    }

    pub(crate) fn current(&self) -> u32 {
        self.current
    }

    pub(crate) fn total(&self) -> u32 {
        self.total
    }

    pub(crate) fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub(crate) fn has_next(&self) -> bool {
        self.current < self.total
    }

    pub(crate) fn previous_target(&self) -> Option<u32> {
        self.has_previous().then(|| self.current - 1)
    }

    pub(crate) fn next_target(&self) -> Option<u32> {
        self.has_next().then(|| self.current + 1)
    }

    /// Context the routing layer mounts for `request`.
    pub(crate) fn for_request(&self, request: &NavigationRequest) -> Result<Self, EpisodeError> {
        Self::new(request.movie_id.clone(), request.episode, self.total)
    }
}

/// "Navigate to the watch view for (title, episode)", handed to the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NavigationRequest {
    pub(crate) movie_id: String,
    pub(crate) episode: u32,
}

/// Outcome of an end-of-stream notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndOfStream {
    AdvanceScheduled,
    AlreadyScheduled,
    Finished,
}

/// Owns the pending auto-advance for one mount.
#[derive(Debug, Clone, Default)]
pub(crate) struct EpisodeNavigator {
    auto_advance: Deadline,
}

impl EpisodeNavigator {
    pub(crate) fn auto_advance_pending(&self) -> bool {
        self.auto_advance.is_armed()
    }

    pub(crate) fn on_ended(&mut self, context: &EpisodeContext, now: Instant) -> EndOfStream {
        if !context.has_next() {
            return EndOfStream::Finished;
        }
        if self.auto_advance.is_armed() {
            return EndOfStream::AlreadyScheduled;
        }
        self.auto_advance.arm(now, AUTO_ADVANCE_DELAY);
        EndOfStream::AdvanceScheduled
    }

    /// Returns `true` once, when the auto-advance delay has elapsed.
    pub(crate) fn tick(&mut self, now: Instant) -> bool {
        self.auto_advance.fire_if_due(now)
    }

    pub(crate) fn cancel(&mut self) -> bool {
        self.auto_advance.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_contexts() {
        assert_eq!(
            EpisodeContext::new("x", 0, 10),
            Err(EpisodeError::OutOfRange {
                episode: 0,
                total: 10
            })
        );
        assert_eq!(
            EpisodeContext::new("x", 11, 10),
            Err(EpisodeError::OutOfRange {
                episode: 11,
                total: 10
            })
        );
        assert_eq!(EpisodeContext::new("x", 1, 0), Err(EpisodeError::NoEpisodes));
        assert_eq!(EpisodeContext::new("  ", 1, 1), Err(EpisodeError::EmptyTitle));
    }

    #[test]
    fn bounds_drive_previous_and_next() {
        let first = EpisodeContext::new("x", 1, 3).expect("valid context");
        assert_eq!(first.previous_target(), None);
        assert_eq!(first.next_target(), Some(2));

        let last = EpisodeContext::new("x", 3, 3).expect("valid context");
        assert_eq!(last.previous_target(), Some(2));
        assert_eq!(last.next_target(), None);

        let single = EpisodeContext::new("x", 1, 1).expect("valid context");
        assert!(!single.has_previous());
        assert!(!single.has_next());
    }

    #[test]
    fn end_of_stream_schedules_one_advance() {
        let start = Instant::now();
        let context = EpisodeContext::new("x", 2, 5).expect("valid context");
        let mut navigator = EpisodeNavigator::default();

        assert_eq!(
            navigator.on_ended(&context, start),
            EndOfStream::AdvanceScheduled
        );
        assert_eq!(
            navigator.on_ended(&context, start + Duration::from_millis(1500)),
            EndOfStream::AlreadyScheduled
        );
        assert!(!navigator.tick(start + Duration::from_millis(1999)));
        assert!(navigator.tick(start + AUTO_ADVANCE_DELAY));
        assert!(!navigator.tick(start + Duration::from_secs(10)));
    }

    #[test]
    fn end_of_last_episode_finishes() {
        let context = EpisodeContext::new("x", 5, 5).expect("valid context");
        let mut navigator = EpisodeNavigator::default();
        assert_eq!(
            navigator.on_ended(&context, Instant::now()),
            EndOfStream::Finished
        );
        assert!(!navigator.auto_advance_pending());
    }
}

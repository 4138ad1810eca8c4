//! Headless player core: transport state, progress reconciliation, overlay
//! visibility, episode navigation and watch history. Hosts feed it input,
//! engine events and the current `Instant`; timers never read the clock.

pub(crate) mod controls;
pub(crate) mod engine;
pub(crate) mod episode;
pub(crate) mod history;
pub(crate) mod progress;
pub(crate) mod session;
pub(crate) mod source;
pub(crate) mod time;
pub(crate) mod timer;
pub(crate) mod visibility;


pub(crate) use engine::{EngineEvent, FullscreenHost, PlaybackEngine};
pub(crate) use episode::{EpisodeContext, NavigationRequest};
pub(crate) use history::{KeyValueStore, WatchHistory};
pub(crate) use session::{Menu, WatchSession};
pub(crate) use source::{SourceError, SourceResolver, VideoSource};

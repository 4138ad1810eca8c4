use tracing::debug;

use crate::player::FullscreenHost;

/// Terminal "fullscreen": the player panel takes the whole screen and the
/// surrounding chrome is hidden. Requests are confirmed on the next loop
/// iteration, like an asynchronous host change notification.
#[derive(Debug, Default)]
pub(crate) struct TerminalFullscreen {
    active: bool,
    pending: Option<bool>,
}

impl TerminalFullscreen {
    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    /// Applies a pending request and returns the new state if it changed.
    pub(crate) fn take_change(&mut self) -> Option<bool> {
        let wanted = self.pending.take()?;
        if wanted == self.active {
            return None;
        }
        self.active = wanted;
        debug!(active = wanted, "fullscreen changed");
        Some(wanted)
    }
}

impl FullscreenHost for TerminalFullscreen {
    fn request_enter(&mut self) {
        self.pending = Some(true);
    }

    fn request_exit(&mut self) {
        self.pending = Some(false);
    }
}

use std::time::{Duration, Instant};

use super::timer::Deadline;

pub(crate) const HIDE_DELAY: Duration = Duration::from_millis(3000);
pub(crate) const LEAVE_HIDE_DELAY: Duration = Duration::from_millis(2000);

/// Whether the transport overlay is shown, with its single pending hide timer.
///
/// Nothing is armed while paused or while the overlay is pinned (a menu is
/// open or a scrub gesture is in progress).
#[derive(Debug, Clone)]
pub(crate) struct ControlsVisibility {
    visible: bool,
    hide: Deadline,
}

impl Default for ControlsVisibility {
    fn default() -> Self {
        Self {
            visible: true,
            hide: Deadline::default(),
        }
    }
}

impl ControlsVisibility {
    pub(crate) fn is_visible(&self) -> bool {
        self.visible
    }

    #[cfg(test)]
    pub(crate) fn hide_pending(&self) -> bool {
        self.hide.is_armed()
    }

    /// Pointer movement, play/pause and seek gestures all land here.
    pub(crate) fn on_activity(&mut self, playing: bool, pinned: bool, now: Instant) {
        self.visible = true;
        self.hide.cancel();
        if playing && !pinned {
            self.hide.arm(now, HIDE_DELAY);
        }
    }

    pub(crate) fn on_pointer_leave(&mut self, playing: bool, pinned: bool, now: Instant) {
        if playing && !pinned {
            self.hide.arm(now, LEAVE_HIDE_DELAY);
        }
    }

    /// Opening a menu pins the overlay until the menu closes.
    pub(crate) fn on_menu_opened(&mut self) {
        self.visible = true;
        self.hide.cancel();
    }

    /// Returns `true` when this tick hid the overlay.
    pub(crate) fn tick(&mut self, now: Instant) -> bool {
        if self.hide.fire_if_due(now) {
            self.visible = false;
            return true;
        }
        false
    }

    pub(crate) fn cancel(&mut self) {
        self.hide.cancel();
    }
}

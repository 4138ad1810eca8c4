use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

const SEEK_STEP_SECS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Input {
    Quit,
    TogglePlay,
    ToggleMute,
    Volume { up: bool },
    Seek(f64),
    SpeedMenu,
    QualityMenu,
    Fullscreen,
    NextEpisode,
    PreviousEpisode,
    CloseMenu,
    MenuMove { down: bool },
    MenuSelect,
    PointerMoved,
    PointerLeft,
    ScrubStart(f64),
    ScrubInput(f64),
    ScrubCommit(f64),
    Ignore,
}

/// Translates a terminal event. Any key also counts as pointer activity; the
/// caller reports that separately.
pub(crate) fn map_event(
    event: &Event,
    menu_open: bool,
    progress_bar: Option<Rect>,
    scrubbing: bool,
) -> Input {
    match event {
        Event::Key(key) => map_key(key, menu_open),
        Event::Mouse(mouse) => map_mouse(mouse, progress_bar, scrubbing),
        Event::FocusLost => Input::PointerLeft,
        Event::FocusGained => Input::PointerMoved,
        _ => Input::Ignore,
    }
}

fn map_key(key: &KeyEvent, menu_open: bool) -> Input {
    if key.kind != KeyEventKind::Press {
        return Input::Ignore;
    }
    if menu_open {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => return Input::MenuMove { down: false },
            KeyCode::Down | KeyCode::Char('j') => return Input::MenuMove { down: true },
            KeyCode::Enter => return Input::MenuSelect,
            KeyCode::Esc => return Input::CloseMenu,
            _ => {}
        }
    }
    match key.code {
        KeyCode::Char('q') => Input::Quit,
        KeyCode::Char(' ') => Input::TogglePlay,
        KeyCode::Char('m') => Input::ToggleMute,
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => Input::Volume { up: true },
        KeyCode::Char('-') | KeyCode::Down => Input::Volume { up: false },
        KeyCode::Left => Input::Seek(-SEEK_STEP_SECS),
        KeyCode::Right => Input::Seek(SEEK_STEP_SECS),
        KeyCode::Char('s') => Input::SpeedMenu,
        KeyCode::Char('o') => Input::QualityMenu,
        KeyCode::Char('f') => Input::Fullscreen,
        KeyCode::Char('n') => Input::NextEpisode,
        KeyCode::Char('p') => Input::PreviousEpisode,
        KeyCode::Esc => Input::CloseMenu,
        _ => Input::PointerMoved,
    }
}

fn map_mouse(mouse: &MouseEvent, progress_bar: Option<Rect>, scrubbing: bool) -> Input {
    let over_bar = progress_bar.filter(|bar| contains(*bar, mouse.column, mouse.row));
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => match over_bar {
            Some(bar) => Input::ScrubStart(fraction_at(bar, mouse.column)),
            None => Input::PointerMoved,
        },
        MouseEventKind::Drag(MouseButton::Left) if scrubbing => match progress_bar {
            Some(bar) => Input::ScrubInput(fraction_at(bar, mouse.column)),
            None => Input::PointerMoved,
        },
        MouseEventKind::Up(MouseButton::Left) if scrubbing => match progress_bar {
            Some(bar) => Input::ScrubCommit(fraction_at(bar, mouse.column)),
            None => Input::PointerMoved,
        },
        MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Up(_) => {
            Input::PointerMoved
        }
        _ => Input::Ignore,
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Horizontal position within `bar` as a fraction; columns outside clamp.
pub(crate) fn fraction_at(bar: Rect, column: u16) -> f64 {
    if bar.width <= 1 {
        return 0.0;
    }
    let offset = column.saturating_sub(bar.x).min(bar.width - 1);
    f64::from(offset) / f64::from(bar.width - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseEvent};

    const BAR: Rect = Rect::new(10, 20, 11, 1);

    fn press(code: KeyCode, menu_open: bool) -> Input {
        let event = Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
        map_event(&event, menu_open, None, false)
    }

    fn left(kind: fn(MouseButton) -> MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: kind(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn pointer(mouse: MouseEvent, scrubbing: bool) -> Input {
        map_event(&Event::Mouse(mouse), false, Some(BAR), scrubbing)
    }

    #[test]
    fn transport_keys() {
        assert_eq!(press(KeyCode::Char(' '), false), Input::TogglePlay);
        assert_eq!(press(KeyCode::Right, false), Input::Seek(10.0));
        assert_eq!(press(KeyCode::Char('n'), false), Input::NextEpisode);
        assert_eq!(press(KeyCode::Char('x'), false), Input::PointerMoved);
    }

    #[test]
    fn arrows_drive_open_menu() {
        assert_eq!(press(KeyCode::Down, true), Input::MenuMove { down: true });
        assert_eq!(press(KeyCode::Enter, true), Input::MenuSelect);
        assert_eq!(press(KeyCode::Down, false), Input::Volume { up: false });
    }

    #[test]
    fn focus_changes_map_to_pointer_enter_and_leave() {
        let lost = map_event(&Event::FocusLost, false, None, false);
        let gained = map_event(&Event::FocusGained, false, None, false);
        assert_eq!(lost, Input::PointerLeft);
        assert_eq!(gained, Input::PointerMoved);
    }

    #[test]
    fn scrub_gesture_on_progress_bar() {
        let down = left(MouseEventKind::Down, 15, 20);
        let drag = left(MouseEventKind::Drag, 40, 3);
        let up = left(MouseEventKind::Up, 10, 20);
        assert_eq!(pointer(down, false), Input::ScrubStart(0.5));
        assert_eq!(pointer(drag, true), Input::ScrubInput(1.0));
        assert_eq!(pointer(up, true), Input::ScrubCommit(0.0));
    }

    #[test]
    fn release_without_a_scrub_is_plain_activity() {
        let up = left(MouseEventKind::Up, 15, 20);
        assert_eq!(pointer(up, false), Input::PointerMoved);
    }

    #[test]
    fn clicks_off_the_bar_are_activity() {
        let off_bar = left(MouseEventKind::Down, 15, 5);
        let moved = MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(pointer(off_bar, false), Input::PointerMoved);
        assert_eq!(pointer(moved, false), Input::PointerMoved);
    }

    #[test]
    fn fraction_handles_narrow_bars() {
        assert_eq!(fraction_at(Rect::new(0, 0, 1, 1), 0), 0.0);
        assert_eq!(fraction_at(Rect::new(5, 0, 5, 1), 2), 0.0);
        assert_eq!(fraction_at(Rect::new(5, 0, 5, 1), 9), 1.0);
    }
}

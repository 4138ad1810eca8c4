use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Terminal;
use ratatui::backend::TestBackend;

use super::input::map_event;
use super::render::{Hitboxes, draw_watch};
use super::sim::SimulatedEngine;
use super::{Input, Store, WatchView};
use crate::catalog;
use crate::player::history::MemoryStore;
use crate::player::source::MockSourceResolver;
use crate::player::visibility::HIDE_DELAY;
use crate::player::{EpisodeContext, WatchHistory};

fn mounted_view(now: Instant) -> WatchView {
    let title = catalog::lookup("kiem-lai").expect("catalog title");
    let context = EpisodeContext::new(title.id, 2, title.total_episodes).expect("valid episode");
    let mut view = WatchView::new(
        title,
        context,
        WatchHistory::new(Box::new(MemoryStore::default()) as Store),
        SimulatedEngine::new(Duration::from_secs(600)),
        Arc::new(MockSourceResolver),
        true,
    );
    assert!(view.wait_for_resolution(Duration::from_secs(5), now));
    view
}

fn draw(terminal: &mut Terminal<TestBackend>, view: &WatchView) -> Hitboxes {
    let mut hitboxes = Hitboxes::default();
    terminal
        .draw(|frame| hitboxes = draw_watch(frame, view))
        .expect("draw frame");
    hitboxes
}

fn left_button(kind: fn(MouseButton) -> MouseEventKind, column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind: kind(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

fn map(view: &WatchView, event: &Event, hitboxes: Hitboxes) -> Input {
    map_event(
        event,
        view.menu_open(),
        hitboxes.progress_bar,
        view.scrubbing(),
    )
}

#[test]
fn drag_on_the_progress_bar_seeks_once_on_release() {
    let start = Instant::now();
    let mut view = mounted_view(start);
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("test terminal");
    view.pump(start);

    let hitboxes = draw(&mut terminal, &view);
    let bar = hitboxes.progress_bar.expect("bar drawn while controls show");
    let down = left_button(MouseEventKind::Down, bar.x, bar.y);
    let press = map(&view, &down, hitboxes);
    assert_eq!(press, Input::ScrubStart(0.0));
    view.apply(press, start);

    let end = bar.x + bar.width - 1;
    let moved = left_button(MouseEventKind::Drag, end, bar.y);
    let drag = map(&view, &moved, hitboxes);
    assert_eq!(drag, Input::ScrubInput(1.0));
    view.apply(drag, start);
    assert_eq!(
        view.session().map(|session| session.progress().played()),
        Some(1.0)
    );

    let up = left_button(MouseEventKind::Up, bar.x, bar.y);
    let release = map(&view, &up, hitboxes);
    assert_eq!(release, Input::ScrubCommit(0.0));
    view.apply(release, start);

    let session = view.session().expect("session mounted");
    assert!(!session.progress().is_seeking());
    assert_eq!(session.progress().played(), 0.0);
}

#[test]
fn holding_a_scrub_past_the_hide_delay_still_commits_on_release() {
    let start = Instant::now();
    let mut view = mounted_view(start);
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("test terminal");
    view.pump(start);

    let hitboxes = draw(&mut terminal, &view);
    let bar = hitboxes.progress_bar.expect("bar drawn while controls show");
    let column = bar.x + bar.width / 2;
    let down = left_button(MouseEventKind::Down, column, bar.y);
    let press = map(&view, &down, hitboxes);
    assert!(matches!(press, Input::ScrubStart(_)));
    view.apply(press, start);

    let held = start + HIDE_DELAY + Duration::from_millis(100);
    view.pump(held);
    let hitboxes = draw(&mut terminal, &view);
    assert!(
        view.session()
            .is_some_and(|session| session.controls_visible())
    );
    assert_eq!(hitboxes.progress_bar, Some(bar));

    let up = left_button(MouseEventKind::Up, column, bar.y);
    let release = map(&view, &up, hitboxes);
    assert!(matches!(release, Input::ScrubCommit(_)));
    view.apply(release, held);

    let session = view.session().expect("session mounted");
    assert!(!session.progress().is_seeking());
    assert!(session.playback().is_playing());
}

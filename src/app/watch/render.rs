use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Gauge, Padding, Paragraph, Wrap};

use crate::player::controls::PlaybackRate;
use crate::player::{Menu, WatchSession};

use super::super::display::{format_episode_position, format_progress_percent, truncate};
use super::sim::SimulatedEngine;
use super::{Stage, Store, WatchView};

const ACCENT: Color = Color::Rgb(110, 170, 255);
const MUTED_TEXT: Color = Color::Rgb(185, 195, 210);
const HELP: &str =
    "space play  ←/→ seek  +/- vol  m mute  s speed  o quality  n/p episode  f full  q quit";

/// Screen regions the input mapper needs for hit testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Hitboxes {
    pub(super) progress_bar: Option<Rect>,
}

pub(super) fn draw_watch(frame: &mut Frame, view: &WatchView) -> Hitboxes {
    let bg = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(bg, frame.area());

    let player_area = if view.fullscreen.is_active() {
        frame.area()
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(frame.area());
        draw_header(frame, view, chunks[0]);
        draw_status(frame, view, chunks[2]);
        chunks[1]
    };

    let block = panel_block(format!(
        " {} · {} ",
        truncate(view.title.title, 40),
        format_episode_position(view.context.current(), view.context.total())
    ));
    let inner = block.inner(player_area);
    frame.render_widget(block, player_area);

    match view.stage.as_ref() {
        Some(Stage::Mounted(session)) => match session.error_message() {
            Some(message) => {
                draw_error(frame, inner, message, view.title.title);
                Hitboxes::default()
            }
            None => draw_player(frame, inner, session, view.menu_cursor),
        },
        Some(Stage::Loading { .. }) | None => {
            let loading = Paragraph::new(format!(
                "Loading episode {}...",
                view.context.current()
            ))
            .alignment(Alignment::Center)
            .style(Style::default().fg(MUTED_TEXT));
            frame.render_widget(loading, vertical_center(inner, 1));
            Hitboxes::default()
        }
    }
}

fn draw_header(frame: &mut Frame, view: &WatchView, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "REELWATCH",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(
            view.title.title,
            Style::default().fg(Color::Rgb(230, 230, 230)),
        ),
        Span::raw("   "),
        Span::styled(view.title.other_name, Style::default().fg(MUTED_TEXT)),
    ]))
    .alignment(Alignment::Center)
    .block(panel_block("Now Watching".to_string()));
    frame.render_widget(header, area);
}

fn draw_status(frame: &mut Frame, view: &WatchView, area: Rect) {
    let line = Line::from(vec![
        Span::styled(view.status.clone(), status_style(&view.status)),
        Span::raw("   "),
        Span::styled(HELP, Style::default().fg(MUTED_TEXT)),
    ]);
    let status = Paragraph::new(line).block(panel_block("Status".to_string()));
    frame.render_widget(status, area);
}

fn draw_error(frame: &mut Frame, area: Rect, message: &str, title: &str) {
    let text = format!("{message}\n\n← Back to {title}: press q");
    let error = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(
            Style::default()
                .fg(Color::Rgb(255, 145, 120))
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(error, vertical_center(area, 3));
}

fn draw_player(
    frame: &mut Frame,
    area: Rect,
    session: &WatchSession<SimulatedEngine, Store>,
    menu_cursor: usize,
) -> Hitboxes {
    let controls_visible = session.controls_visible();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(if controls_visible { 2 } else { 1 }),
        ])
        .split(area);

    draw_screen(frame, chunks[0], session);

    if !controls_visible {
        let hint = Paragraph::new("Press any key or move the mouse to show controls")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Rgb(90, 100, 115)));
        frame.render_widget(hint, chunks[1]);
        return Hitboxes::default();
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(chunks[1]);
    let bar_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(9),
            Constraint::Min(10),
            Constraint::Length(9),
        ])
        .split(rows[0]);

    let progress = session.progress();
    frame.render_widget(
        Paragraph::new(progress.elapsed_label()).alignment(Alignment::Right),
        bar_row[0],
    );
    let bar = Gauge::default()
        .gauge_style(Style::default().fg(ACCENT).bg(Color::Rgb(40, 45, 55)))
        .ratio(progress.played())
        .label(format_progress_percent(progress.played()))
        .use_unicode(true);
    frame.render_widget(bar, bar_row[1]);
    frame.render_widget(Paragraph::new(progress.duration_label()), bar_row[2]);

    frame.render_widget(
        Paragraph::new(controls_line(session)).alignment(Alignment::Center),
        rows[1],
    );

    match session.menu() {
        Menu::Closed => {}
        Menu::Speed => {
            let current = session.playback().rate();
            let items: Vec<(String, bool)> = PlaybackRate::ALL
                .into_iter()
                .map(|rate| (rate.label().to_string(), rate == current))
                .collect();
            draw_menu(frame, area, "Speed", &items, menu_cursor);
        }
        Menu::Quality => {
            let active = session.active_quality().map(|source| source.quality.clone());
            let items: Vec<(String, bool)> = session
                .qualities()
                .iter()
                .map(|source| {
                    let is_active = active.as_deref() == Some(source.quality.as_str());
                    (source.quality.clone(), is_active)
                })
                .collect();
            draw_menu(frame, area, "Quality", &items, menu_cursor);
        }
    }

    Hitboxes {
        progress_bar: Some(bar_row[1]),
    }
}

fn draw_screen(frame: &mut Frame, area: Rect, session: &WatchSession<SimulatedEngine, Store>) {
    let playback = session.playback();
    let state = if playback.is_playing() {
        "▶  PLAYING"
    } else {
        "❚❚  PAUSED"
    };
    let quality = session
        .active_quality()
        .map(|source| source.quality.as_str())
        .unwrap_or("-");
    let mut lines = vec![
        Line::from(Span::styled(
            state,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "{quality} · buffered {} · {} subtitle track(s) · audio {}",
                format_progress_percent(session.progress().loaded()),
                session.subtitles().len(),
                format_progress_percent(session.engine().audible_level())
            ),
            Style::default().fg(MUTED_TEXT),
        )),
    ];
    if session.auto_advance_pending() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Next episode starting shortly...",
            Style::default().fg(Color::Yellow),
        )));
    }
    let height = lines.len() as u16;
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        vertical_center(area, height),
    );
}

fn controls_line(session: &WatchSession<SimulatedEngine, Store>) -> Line<'static> {
    let playback = session.playback();
    let context = session.context();
    let volume = if playback.is_muted() || playback.volume() == 0.0 {
        " MUTED ".to_string()
    } else {
        format!(" VOL {} ", format_progress_percent(playback.volume()))
    };
    let quality = session
        .active_quality()
        .map(|source| format!(" {} ", source.quality))
        .unwrap_or_else(|| " - ".to_string());
    let fullscreen = if playback.is_fullscreen() {
        " EXIT FULL "
    } else {
        " FULL "
    };

    Line::from(vec![
        Span::styled(" ⏮ PREV ", pill(context.has_previous(), false)),
        Span::raw(" "),
        Span::styled(
            if playback.is_playing() {
                " ❚❚ PAUSE "
            } else {
                " ▶ PLAY "
            },
            pill(true, true),
        ),
        Span::raw(" "),
        Span::styled(volume, pill(true, false)),
        Span::raw(" "),
        Span::styled(format!(" {} ", playback.rate().label()), pill(true, false)),
        Span::raw(" "),
        Span::styled(quality, pill(true, false)),
        Span::raw(" "),
        Span::styled(" NEXT ⏭ ", pill(context.has_next(), false)),
        Span::raw(" "),
        Span::styled(fullscreen, pill(true, false)),
    ])
}

fn draw_menu(
    frame: &mut Frame,
    area: Rect,
    title: &'static str,
    items: &[(String, bool)],
    cursor: usize,
) {
    let width = 18.min(area.width);
    let height = (items.len() as u16 + 2).min(area.height);
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + area.height.saturating_sub(height + 2),
        width,
        height,
    );
    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .map(|(idx, (label, active))| {
            let marker = if *active { "● " } else { "  " };
            let style = if idx == cursor {
                Style::default()
                    .bg(ACCENT)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Rgb(230, 235, 242))
            };
            Line::from(Span::styled(format!("{marker}{label}"), style))
        })
        .collect();

    frame.render_widget(Clear, popup);
    let menu = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(160, 190, 235)))
            .title(title)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(menu, popup);
}

fn panel_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(125, 135, 150)))
        .title(title)
}

fn pill(enabled: bool, primary: bool) -> Style {
    if !enabled {
        Style::default()
            .bg(Color::Rgb(40, 45, 55))
            .fg(Color::Rgb(90, 100, 115))
    } else if primary {
        Style::default()
            .bg(ACCENT)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .bg(Color::Rgb(72, 82, 96))
            .fg(Color::Rgb(230, 235, 242))
    }
}

fn status_style(status: &str) -> Style {
    if status.starts_with("ERROR:") {
        Style::default()
            .fg(Color::Rgb(255, 145, 120))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Rgb(205, 165, 255))
    }
}

fn vertical_center(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect::new(
        area.x,
        area.y + area.height.saturating_sub(height) / 2,
        area.width,
        height,
    )
}

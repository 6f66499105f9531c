//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::App;
use crate::audio::PlaybackState;
use crate::config::{ControlsSettings, UiSettings};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "play selected");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next song");
    // H/L is filled dynamically from config.
    map.insert("0-9", "jump to 0-90%");
    map.insert("+/-", "volume");
    map.insert("a", "add files");
    map.insert("s", "stop");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating the seek step.
fn controls_text(seek_step_percent: f64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "enter", "space/p", "h/l", "H/L", "0-9", "+/-", "a", "s", "gg/G", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] seek -/+{}%", seek_step_percent))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

fn now_playing_text(app: &App) -> String {
    let Some(name) = app.now_playing.as_deref() else {
        return "No song selected".to_string();
    };
    let state = match app.playback {
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
        PlaybackState::Stopped => "Stopped",
    };
    format!(
        "{} • {} • Volume: {:.0}%",
        name,
        state,
        app.volume * 100.0
    )
}

fn padded(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let now_playing = Paragraph::new(now_playing_text(app)).block(padded(" now playing "));
    frame.render_widget(now_playing, chunks[1]);

    // Position slider with elapsed/total labels.
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .gauge_style(Style::default().add_modifier(Modifier::BOLD))
        .ratio(app.progress.clamp(0.0, 1.0))
        .label(format!("{} / {}", app.elapsed_label, app.total_label));
    frame.render_widget(gauge, chunks[2]);

    // Playlist
    {
        // Center the selected item when possible by creating a visible window.
        // Only build ListItems for the visible window.
        let total = app.entries.len();
        let list_height = chunks[3].height.saturating_sub(2) as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = app.entries[start..end]
            .iter()
            .map(|name| ListItem::new(name.as_str()))
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" playlist "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[3], &mut state);
    }

    let status_text = match &app.status {
        Some(msg) => msg.clone(),
        None if !app.has_tracks() => "Playlist is empty: press [a] to add files".to_string(),
        None => format!("{} track(s)", app.entries.len()),
    };
    let status = Paragraph::new(status_text)
        .block(padded(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[4]);

    let footer = Paragraph::new(controls_text(controls_settings.seek_step_percent))
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}

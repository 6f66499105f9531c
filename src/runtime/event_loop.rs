use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use log::{debug, info};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{PlaybackState, PlayerEvent};
use crate::config;
use crate::library::collect_tracks;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::PlaybackController;
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Last playing index the cursor was moved to.
    pub last_followed: Option<usize>,
    /// Last-known values as emitted to MPRIS.
    pub last_mpris_index: Option<usize>,
    pub last_mpris_playback: PlaybackState,
    pub last_mpris_volume: f32,
}

/// What the loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    PickFiles,
    Quit,
}

/// Main terminal event loop: drains player events, redraws, then handles
/// MPRIS commands and key presses. Returns `Ok(())` when shutdown is requested.
#[allow(clippy::too_many_arguments)]
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController,
    player_rx: &mpsc::Receiver<PlayerEvent>,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(ev) = player_rx.try_recv() {
            controller.handle_event(ev, app);
        }

        sync_app(app, controller, state);

        if controller.current_index() != state.last_mpris_index
            || controller.state() != state.last_mpris_playback
            || controller.volume() != state.last_mpris_volume
        {
            update_mpris(mpris, controller);
            state.last_mpris_index = controller.current_index();
            state.last_mpris_playback = controller.state();
            state.last_mpris_volume = controller.volume();
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app, controller) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key_event(key, settings, app, controller, state) {
                    KeyOutcome::Continue => {}
                    KeyOutcome::Quit => break,
                    KeyOutcome::PickFiles => {
                        pick_files(settings, app, controller);
                        // The native dialog may have drawn over the terminal.
                        terminal.clear()?;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Mirror controller state into the view model and move the cursor to a
/// newly playing track when `follow_playback` is on.
pub fn sync_app(app: &mut App, controller: &PlaybackController, state: &mut EventLoopState) {
    app.playback = controller.state();
    app.volume = controller.volume();

    let current = controller.current_index();
    if current != state.last_followed {
        state.last_followed = current;
        if let Some(idx) = current {
            if app.follow_playback && app.selected != idx {
                app.set_selected(idx);
            }
        }
    }
}

/// Apply a media-key command. Returns `true` when the app should quit.
pub fn handle_control_cmd(
    cmd: ControlCmd,
    app: &mut App,
    controller: &mut PlaybackController,
) -> bool {
    debug!("control command: {cmd:?}");
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => match controller.state() {
            PlaybackState::Paused => controller.toggle_play_pause(app),
            PlaybackState::Stopped => {
                if app.has_tracks() {
                    controller.select_song(app.selected, app);
                }
            }
            PlaybackState::Playing => {}
        },
        ControlCmd::Pause => {
            if controller.state() == PlaybackState::Playing {
                controller.toggle_play_pause(app);
            }
        }
        ControlCmd::PlayPause => controller.toggle_play_pause(app),
        ControlCmd::Stop => controller.stop(app),
        ControlCmd::Next => controller.next(app),
        ControlCmd::Prev => controller.previous(app),
        ControlCmd::SetVolume(v) => controller.set_volume(v as f32),
    }
    false
}

pub fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController,
    state: &mut EventLoopState,
) -> KeyOutcome {
    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return KeyOutcome::Quit,
        KeyCode::Char('a') => return KeyOutcome::PickFiles,
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => {
            if app.has_tracks() {
                controller.select_song(app.selected, app);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => controller.toggle_play_pause(app),
        KeyCode::Char('l') => controller.next(app),
        KeyCode::Char('h') => controller.previous(app),
        KeyCode::Char('s') => controller.stop(app),
        KeyCode::Char('L') => {
            controller.seek_relative(settings.controls.seek_step_percent / 100.0, app);
        }
        KeyCode::Char('H') => {
            controller.seek_relative(-settings.controls.seek_step_percent / 100.0, app);
        }
        KeyCode::Char(c @ '0'..='9') => {
            let tenths = f64::from(c.to_digit(10).unwrap_or(0));
            controller.seek(tenths / 10.0, app);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            controller.set_volume(controller.volume() + settings.controls.volume_step);
            app.volume = controller.volume();
        }
        KeyCode::Char('-') => {
            controller.set_volume(controller.volume() - settings.controls.volume_step);
            app.volume = controller.volume();
        }
        _ => {}
    }

    KeyOutcome::Continue
}

/// Open the native file picker and append the chosen files to the playlist.
fn pick_files(settings: &config::Settings, app: &mut App, controller: &mut PlaybackController) {
    let extensions: Vec<&str> = settings
        .library
        .extensions
        .iter()
        .map(String::as_str)
        .collect();
    let Some(paths) = rfd::FileDialog::new()
        .set_title("Add audio files")
        .add_filter("Audio Files", &extensions)
        .pick_files()
    else {
        debug!("file picker cancelled");
        return;
    };

    let tracks = collect_tracks(&paths, &settings.library);
    info!("picked {} file(s), {} playable", paths.len(), tracks.len());
    if tracks.is_empty() {
        app.set_status("No playable files selected");
        return;
    }
    controller.add_tracks(tracks, app);
}

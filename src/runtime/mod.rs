use std::env;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::{error, info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{AudioEngine, AudioOutput, PlayerEvent};
use crate::logging;
use crate::mpris::ControlCmd;
use crate::player::PlaybackController;

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_problem) = settings::load_settings();
    logging::init(&settings.logging);
    if let Some(msg) = config_problem {
        warn!("{msg}");
        eprintln!("spindle: {msg}");
    }

    let output = match AudioOutput::open() {
        Ok(o) => o,
        Err(e) => {
            error!("{e}");
            eprintln!("spindle: {e}");
            return Err(e.into());
        }
    };
    let engine: Arc<dyn AudioEngine> = Arc::new(output.engine());

    let (player_tx, player_rx) = mpsc::channel::<PlayerEvent>();
    let mut controller = PlaybackController::new(engine, player_tx, &settings.playback);

    let mut app = App::new();
    app.follow_playback = settings.ui.follow_playback;

    let paths: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    startup::seed_playlist(&mut controller, &mut app, &paths, &settings);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);
    mpris_sync::update_mpris(&mpris, &controller);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut controller,
        &player_rx,
        &mpris,
        &control_rx,
        &mut state,
    );

    // The engine must be released before the output stream goes away.
    controller.close(Duration::from_millis(settings.audio.quit_fade_out_ms));
    drop(controller);
    drop(output);
    info!("shutdown complete");

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

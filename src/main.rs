//! KeyPulse - terminal keyboard tester
//!
//! Shows a tenkeyless keyboard and measures hold latency and presses per
//! second for every key as it is tested.

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyCode as CtKeyCode, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    symbols::border,
    widgets::{Block, Borders},
    Frame, Terminal,
};
use std::{
    fs::{self, File},
    io::{self, Stdout},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc,
    },
};

use keypulse::{
    config::Config,
    feedback::TerminalBell,
    keyboard::{KeyEvent, KeyboardListener, SessionClock},
    ui::{
        App, AppState, AppView, HelpPanel, KeyboardVisual, ResultsPanel, StatusBar, StatusPanel,
        TabBar, KEYBOARD_HEIGHT,
    },
};

#[cfg(target_os = "linux")]
use keypulse::keyboard::{evdev_status, EvdevListener};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Where key events come from for this session
enum Input {
    Polling(KeyboardListener),
    #[cfg(target_os = "linux")]
    Evdev(EvdevListener),
}

impl Input {
    fn poll(&mut self) -> usize {
        match self {
            Self::Polling(listener) => listener.poll(),
            #[cfg(target_os = "linux")]
            Self::Evdev(listener) => listener.poll(),
        }
    }
}

/// Route logs to a file because the terminal belongs to the UI.
fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    let log_file = dirs::data_local_dir()
        .map(|dir| dir.join("keypulse"))
        .and_then(|dir| fs::create_dir_all(&dir).ok().map(|_| dir.join("keypulse.log")))
        .and_then(|path| File::create(path).ok());

    if let Some(file) = log_file {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("invalid config, using defaults: {}", e);
            Config::default()
        }
    }
}

fn select_input(
    app: &mut App,
    clock: SessionClock,
    event_tx: mpsc::Sender<KeyEvent>,
) -> Result<Input> {
    let backend = app.config.input.backend;

    #[cfg(target_os = "linux")]
    {
        if backend.wants_evdev() {
            if let Some(evdev) = EvdevListener::try_new(clock, event_tx.clone()) {
                app.set_status(format!("Evdev: {}", evdev_status()));
                return Ok(Input::Evdev(evdev));
            }
            if backend.allows_fallback() {
                app.set_status("Evdev unavailable, polling key state instead".to_string());
            }
        }
    }

    if !backend.allows_fallback() {
        anyhow::bail!("evdev input backend is unavailable: {}", evdev_unavailable_reason());
    }

    log::info!("polling key state with device_query");
    Ok(Input::Polling(KeyboardListener::new(clock, event_tx)))
}

#[cfg(target_os = "linux")]
fn evdev_unavailable_reason() -> String {
    evdev_status()
}

#[cfg(not(target_os = "linux"))]
fn evdev_unavailable_reason() -> String {
    "only supported on Linux".to_string()
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)
        .context("failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("failed to create terminal")
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn draw(frame: &mut Frame, app: &App) {
    let colors = app.colors();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                   // Tab bar
            Constraint::Length(4),                   // Status tiles
            Constraint::Length(KEYBOARD_HEIGHT + 2), // Keyboard visual
            Constraint::Min(6),                      // Main content
            Constraint::Length(1),                   // Status bar
        ])
        .split(frame.area());

    let tab_names: Vec<&str> = AppView::all().iter().map(|v| v.name()).collect();
    frame.render_widget(TabBar::new(&tab_names, app.view.index()), chunks[0]);

    let state = app.keyboard_state();
    frame.render_widget(
        StatusPanel::new(state, app.sound_enabled(), app.platform, colors),
        chunks[1],
    );

    let kb_block = Block::default()
        .title(" \u{2328} Keyboard ")
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(colors.dim));
    let kb_inner = kb_block.inner(chunks[2]);
    frame.render_widget(kb_block, chunks[2]);
    frame.render_widget(KeyboardVisual::new(state, app.platform, colors), kb_inner);

    match app.view {
        AppView::Help => frame.render_widget(HelpPanel::new(colors), chunks[3]),
        _ => {
            let results = app.current_results();
            frame.render_widget(ResultsPanel::new(&results, app.view.name(), colors), chunks[3]);
        }
    }

    let state_str = match app.state {
        AppState::Running => "RUNNING",
        AppState::Paused => "PAUSED",
        AppState::Quitting => "QUITTING",
    };
    let elapsed = app.elapsed_formatted();
    let status = StatusBar::new(state_str, app.view.name(), &elapsed, app.total_events)
        .message(app.get_status());
    frame.render_widget(status, chunks[4]);
}

fn handle_control(app: &mut App, key: event::KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        CtKeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        CtKeyCode::Char('q') | CtKeyCode::Esc => app.quit(),
        CtKeyCode::BackTab => app.prev_view(),
        CtKeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => app.prev_view(),
        CtKeyCode::Tab => app.next_view(),
        CtKeyCode::Char(' ') => app.toggle_pause(),
        CtKeyCode::Char('r') => app.reset(),
        CtKeyCode::Char('s') => app.toggle_sound(),
        CtKeyCode::Char('p') => app.toggle_platform(),
        CtKeyCode::Char('e') => app.export(),
        CtKeyCode::Char('?') => app.view = AppView::Help,
        _ => {}
    }
}

fn run(terminal: &mut Tui, app: &mut App, shutdown: &AtomicBool) -> Result<()> {
    let clock = SessionClock::new();
    let (event_tx, event_rx) = mpsc::channel::<KeyEvent>();
    let mut input = select_input(app, clock, event_tx)?;
    let tick_rate = app.config.refresh_interval();

    loop {
        input.poll();
        while let Ok(key_event) = event_rx.try_recv() {
            app.process_event(&key_event);
        }

        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => handle_control(app, key),
                Event::FocusLost => app.focus_lost(),
                _ => {}
            }
        }

        if shutdown.load(Ordering::SeqCst) {
            app.quit();
        }
        if app.state == AppState::Quitting {
            return Ok(());
        }
    }
}

fn main() -> Result<()> {
    init_logging();

    let config = load_config();
    let mut app = App::new(config, Box::new(TerminalBell::stdout()));

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || shutdown.store(true, Ordering::SeqCst))
            .context("failed to install signal handler")?;
    }

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut app, &shutdown);
    restore_terminal(&mut terminal).context("failed to restore terminal")?;
    result?;

    let state = app.keyboard_state();
    println!("\nKeyPulse session complete.");
    println!(
        "Keys tested: {} / {}",
        state.activated_count(),
        keypulse::keyboard::layout::layout_key_count()
    );
    println!("Total presses: {}", state.total_presses());
    println!("Session duration: {}", app.elapsed_formatted());

    Ok(())
}

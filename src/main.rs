mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use quill::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    draft::{DraftStore, FileDraftStore},
    logging,
    runtime::{CrosstermEventSource, EssayEvent, FixedTicker, Runner, TickTimer},
    EditOutcome, ResultsReport, Session, TickOutcome,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs,
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::mpsc::Sender,
};
use tracing::{info, warn};

/// timed essay writing on fixed-width paper
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Write an essay against the clock on fixed-width lined paper. The line count is checked on every edit and a per-line word and character report is shown when time runs out."
)]
pub struct Cli {
    /// extra minutes on top of the 30 minute base, clamped to 0-120
    #[clap(short = 'e', long, allow_negative_numbers = true)]
    extra_minutes: Option<i64>,

    /// characters per line of paper
    #[clap(short = 'c', long)]
    capacity: Option<usize>,

    /// minimum number of lines required
    #[clap(long)]
    min_lines: Option<usize>,

    /// recommended maximum number of lines
    #[clap(long)]
    max_lines: Option<usize>,

    /// edits that would go past this many lines are refused
    #[clap(long)]
    hard_limit: Option<usize>,

    /// segment FILE, print its results report as JSON and exit
    #[clap(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

impl Cli {
    /// Lay command line overrides over the stored configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(extra) = self.extra_minutes {
            config.set_extra_minutes(extra);
        }
        if let Some(capacity) = self.capacity {
            config.line_capacity = capacity;
        }
        if let Some(min) = self.min_lines {
            config.min_lines = min;
        }
        if let Some(max) = self.max_lines {
            config.max_lines = max;
        }
        if let Some(hard) = self.hard_limit {
            config.hard_limit = hard;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum AppState {
    Home,
    Writing,
    ConfirmFinish,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub state: AppState,
    pub session: Option<Session>,
    pub status_message: Option<String>,
    pub results_scroll: usize,
    config_store: Option<FileConfigStore>,
    draft_store: Option<FileDraftStore>,
    timer: Option<TickTimer>,
}

impl App {
    pub fn new(
        config: Config,
        config_store: Option<FileConfigStore>,
        draft_store: Option<FileDraftStore>,
    ) -> Self {
        Self {
            config,
            state: AppState::Home,
            session: None,
            status_message: None,
            results_scroll: 0,
            config_store,
            draft_store,
            timer: None,
        }
    }

    pub fn report(&self) -> Option<&ResultsReport> {
        self.session.as_ref().and_then(Session::report)
    }

    fn handle_event(&mut self, event: EssayEvent, tick_tx: &Sender<EssayEvent>) -> Flow {
        match event {
            EssayEvent::Tick => {
                self.on_tick();
                Flow::Continue
            }
            EssayEvent::Resize => Flow::Continue,
            EssayEvent::Key(key) => self.on_key(key, tick_tx),
        }
    }

    fn on_key(&mut self, key: KeyEvent, tick_tx: &Sender<EssayEvent>) -> Flow {
        // ctrl+c to quit
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.state {
            AppState::Home => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
                KeyCode::Enter => self.start_session(tick_tx),
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    let digit = i64::from(c.to_digit(10).unwrap_or(0));
                    let extra = i64::from(self.config.extra_minutes) * 10 + digit;
                    self.config.set_extra_minutes(extra);
                }
                KeyCode::Backspace => {
                    let extra = i64::from(self.config.extra_minutes / 10);
                    self.config.set_extra_minutes(extra);
                }
                KeyCode::Up | KeyCode::Char('+') => {
                    let extra = i64::from(self.config.extra_minutes) + 1;
                    self.config.set_extra_minutes(extra);
                }
                KeyCode::Down | KeyCode::Char('-') => {
                    let extra = i64::from(self.config.extra_minutes) - 1;
                    self.config.set_extra_minutes(extra);
                }
                _ => {}
            },
            AppState::Writing => self.on_writing_key(key),
            AppState::ConfirmFinish => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.finish(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.state = AppState::Writing;
                }
                _ => {}
            },
            AppState::Results => {
                let rows = self.report().map_or(0, |r| r.per_line.len());
                let max_scroll = rows.saturating_sub(1);
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
                    KeyCode::Char('n') => {
                        self.session = None;
                        self.status_message = None;
                        self.state = AppState::Home;
                    }
                    KeyCode::Up => {
                        self.results_scroll = self.results_scroll.saturating_sub(1);
                    }
                    KeyCode::Down => {
                        self.results_scroll = (self.results_scroll + 1).min(max_scroll);
                    }
                    KeyCode::PageUp => {
                        self.results_scroll = self.results_scroll.saturating_sub(10);
                    }
                    KeyCode::PageDown => {
                        self.results_scroll = (self.results_scroll + 10).min(max_scroll);
                    }
                    KeyCode::Home => self.results_scroll = 0,
                    _ => {}
                }
            }
        }

        Flow::Continue
    }

    fn on_writing_key(&mut self, key: KeyEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let extend = key.modifiers.contains(KeyModifiers::SHIFT);

        let outcome = match key.code {
            KeyCode::Esc | KeyCode::F(10) => {
                self.state = AppState::ConfirmFinish;
                return;
            }
            KeyCode::F(2) => {
                self.status_message = session
                    .copy()
                    .then(|| String::from("selection copied"));
                return;
            }
            KeyCode::F(3) => session.paste(),
            KeyCode::F(4) => session.underline(),
            KeyCode::Left => {
                session.move_left(extend);
                return;
            }
            KeyCode::Right => {
                session.move_right(extend);
                return;
            }
            KeyCode::Home => {
                session.move_home(extend);
                return;
            }
            KeyCode::End => {
                session.move_end(extend);
                return;
            }
            KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                session.select_all();
                return;
            }
            KeyCode::Enter => session.insert_newline(),
            KeyCode::Backspace => session.backspace(),
            KeyCode::Delete => session.delete_forward(),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                session.insert_char(c)
            }
            _ => return,
        };

        match outcome {
            EditOutcome::Rejected => {
                self.status_message = Some(format!(
                    "hard limit of {} lines reached",
                    session.config().thresholds.hard_limit()
                ));
            }
            EditOutcome::Accepted => self.status_message = None,
            EditOutcome::Ignored => {}
        }
    }

    fn start_session(&mut self, tick_tx: &Sender<EssayEvent>) {
        let session_config = match self.config.session_config() {
            Ok(session_config) => session_config,
            Err(e) => {
                self.status_message = Some(e.to_string());
                return;
            }
        };
        self.remember_extra_minutes();

        let draft_store = self
            .draft_store
            .clone()
            .map(|store| Box::new(store) as Box<dyn DraftStore>);
        self.session = Some(Session::start(session_config, draft_store));
        self.timer = Some(TickTimer::start(tick_tx.clone(), FixedTicker::default()));
        self.status_message = None;
        self.results_scroll = 0;
        self.state = AppState::Writing;
    }

    /// Only the extra minutes are written back; other command line overrides
    /// stay one-off.
    fn remember_extra_minutes(&self) {
        let Some(store) = &self.config_store else {
            return;
        };
        let mut stored = store.load();
        stored.extra_minutes = self.config.effective_extra_minutes();
        if let Err(e) = store.save(&stored) {
            warn!(error = %e, "could not save config");
        }
    }

    fn on_tick(&mut self) {
        if !matches!(self.state, AppState::Writing | AppState::ConfirmFinish) {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.on_tick() == TickOutcome::Expired {
            info!("time is up");
            self.stop_timer();
            self.results_scroll = 0;
            self.state = AppState::Results;
        }
    }

    fn finish(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.lock();
        }
        self.stop_timer();
        self.results_scroll = 0;
        self.state = AppState::Results;
    }

    fn stop_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn teardown(&mut self) {
        self.stop_timer();
    }
}

/// Headless mode: no terminal, no timer, no gate.
fn print_report(path: &Path, config: &Config) -> Result<(), Box<dyn Error>> {
    let text = fs::read_to_string(path)?.replace("\r\n", "\n");
    let session_config = config.session_config()?;
    let lines = quill::segment(&text, session_config.capacity);
    let report = ResultsReport::from_lines(&lines, &session_config.thresholds);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let _log_guard = logging::init(&AppDirs::log_dir());

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply(&mut config);

    if let Err(e) = config.session_config() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::ValueValidation, e.to_string()).exit();
    }

    if let Some(path) = &cli.report {
        return print_report(path, &config);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, Some(config_store), Some(FileDraftStore::new()));
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let events = CrosstermEventSource::new();
    let tick_tx = events.sender();
    let runner = Runner::new(events, FixedTicker::default());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let Some(event) = runner.step() else {
            continue;
        };
        if app.handle_event(event, &tick_tx) == Flow::Quit {
            break;
        }
    }

    app.teardown();
    Ok(())
}

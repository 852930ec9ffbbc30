use std::{
    sync::{Arc, mpsc::Receiver},
    time::Duration,
};

use color_eyre::eyre::Result;
use ratatui::{
    Frame, Terminal,
    crossterm::event::{KeyCode, KeyEvent},
    layout::{Constraint, Layout as Split},
    prelude::Backend,
};
use tracing::{debug, error, info};

use crate::{
    settings::Settings,
    terminal::{Layout, TerminalView},
    tui::{status_line, surface::CellSurface},
};

/// Period of the host tick that drains the byte source.
pub const TICK: Duration = Duration::from_millis(100);

pub enum Event {
    Crossterm(CrosstermEvent),
    /// The ingest thread took in new bytes.
    StreamData,
    /// The byte source is gone and fully drained.
    StreamClosed,
    Quit,
}

pub enum CrosstermEvent {
    Resize,
    KeyPress(KeyEvent),
}

impl From<CrosstermEvent> for Event {
    fn from(value: CrosstermEvent) -> Self {
        Self::Crossterm(value)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum RunningState {
    #[default]
    Running,
    Finished,
}

pub struct App {
    state: RunningState,
    rx: Receiver<Event>,
    view: Arc<TerminalView>,
    settings: Settings,
    source_label: String,
    source_closed: bool,
    /// Layout from the last draw, used to size scroll steps.
    last_layout: Layout,
}

impl App {
    pub fn new(
        rx: Receiver<Event>,
        view: Arc<TerminalView>,
        settings: Settings,
        source_label: String,
    ) -> Self {
        Self {
            state: RunningState::Running,
            rx,
            view,
            settings,
            source_label,
            source_closed: false,
            last_layout: Layout::default(),
        }
    }

    fn is_running(&self) -> bool {
        self.state == RunningState::Running
    }

    pub fn run(&mut self, mut terminal: Terminal<impl Backend>) -> Result<()> {
        self.draw(&mut terminal)?;

        while self.is_running() {
            // All senders gone means there's nothing left that could wake us.
            let Ok(msg) = self.rx.recv() else {
                break;
            };
            let redraw = match msg {
                Event::Quit => {
                    self.state = RunningState::Finished;
                    false
                }
                Event::StreamData => true,
                Event::StreamClosed => {
                    info!("Byte source closed");
                    self.source_closed = true;
                    true
                }
                Event::Crossterm(CrosstermEvent::Resize) => true,
                Event::Crossterm(CrosstermEvent::KeyPress(key)) => self.handle_key_press(key),
            };
            if redraw && self.is_running() {
                self.draw(&mut terminal)?;
            }
        }
        Ok(())
    }

    /// Returns `true` if the screen needs redrawing.
    fn handle_key_press(&mut self, key: KeyEvent) -> bool {
        let row = self.last_layout.bytes_per_row.max(1) as isize;
        let page = self.last_layout.bytes_on_screen.max(1) as isize;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.state = RunningState::Finished;
                false
            }
            KeyCode::Up => self.view.scroll_by(-row),
            KeyCode::Down => self.view.scroll_by(row),
            KeyCode::PageUp => self.view.scroll_by(-page),
            KeyCode::PageDown => self.view.scroll_by(page),
            KeyCode::Home => self.view.scroll_to_start(),
            KeyCode::End => self.view.scroll_to_end(self.last_layout.bytes_on_screen),
            KeyCode::Char('m') => {
                let mode = self.view.display_mode().next();
                self.view.set_display_mode(mode);
                self.settings.set_display_mode(mode);
                true
            }
            KeyCode::Char('r') => {
                self.view.reset();
                true
            }
            KeyCode::Char('s') => {
                match self.settings.save() {
                    Ok(()) => info!("Settings saved to {}", self.settings.path().display()),
                    Err(e) => error!("Failed to save settings: {e}"),
                }
                false
            }
            KeyCode::Char('d') => {
                let dump = self.view.dump_buffer();
                debug!("Dumped {} storage slots", dump.lines().count().saturating_sub(1));
                false
            }
            _ => false,
        }
    }

    pub fn draw(&mut self, terminal: &mut Terminal<impl Backend>) -> Result<()> {
        terminal.draw(|frame| self.render_app(frame))?;
        Ok(())
    }

    fn render_app(&mut self, frame: &mut Frame) {
        let [screen, status] =
            Split::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());

        let mode = self.view.display_mode();
        {
            let mut surface = CellSurface::new(screen, frame.buffer_mut());
            self.view.render(&mut surface);
            self.last_layout = Layout::for_surface(&surface, mode);
        }

        let line = status_line(
            &self.source_label,
            mode,
            self.view.len(),
            self.view.capacity(),
            self.view.scroll_offset(),
            self.source_closed,
        );
        frame.render_widget(line, status);
    }
}

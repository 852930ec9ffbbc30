use std::{
    sync::{Arc, mpsc},
    thread::JoinHandle,
};

use app::{App, CrosstermEvent, Event};
use camino::Utf8PathBuf;
use clap::Parser;
use cli::SpitermCli;
use color_eyre::eyre::Context;
use crossbeam::channel::unbounded;
use panic_handler::{LogFlusher, initialize_panic_handler};
use ratatui::crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};
use serial::{ChannelSource, worker};
use settings::Settings;
use terminal::TerminalView;
use tracing::{debug, error, info, level_filters::LevelFilter};
use tracing_appender::non_blocking::WorkerGuard;

pub mod buffer;
pub mod errors;
pub mod serial;
pub mod settings;
pub mod terminal;
pub mod traits;

mod app;
mod cli;
mod panic_handler;
mod tui;

use errors::{SpitermError, SpitermResult};

/// Wrapper runner so any fatal errors get properly logged.
pub fn run() -> color_eyre::Result<()> {
    let cli = SpitermCli::parse();
    let log = LogFlusher::new(initialize_logging(cli.log_level)?);
    initialize_panic_handler(log.clone())?;

    let result = run_inner(cli);
    if let Err(e) = &result {
        error!("Fatal error: {e}");
    }

    ratatui::restore();
    log.flush();
    result
}

fn run_inner(cli: SpitermCli) -> color_eyre::Result<()> {
    let settings_path = settings_dir(cli.config_path.clone()).join(settings::SETTINGS_FILE_NAME);
    let settings = Settings::load(settings_path.as_std_path())
        .wrap_err_with(|| format!("Couldn't load settings from {settings_path}"))?;
    if settings.loaded_from_file() {
        info!("Using settings from {settings_path}");
    } else {
        info!("Using default settings");
    }

    let capacity = cli.capacity(&settings);
    if capacity == 0 {
        return Err(SpitermError::ZeroCapacity.into());
    }

    let (source, source_label, _reader) = open_source(&cli, &settings)?;

    let view = Arc::new(TerminalView::new(capacity));
    view.set_display_mode(cli.display_mode(&settings));

    let (tx, rx) = mpsc::channel::<Event>();
    spawn_input_thread(tx.clone())?;
    spawn_ingest_thread(Arc::clone(&view), source, tx)?;

    let terminal = ratatui::init();
    App::new(rx, view, settings, source_label).run(terminal)
}

fn settings_dir(cli_override: Option<Utf8PathBuf>) -> Utf8PathBuf {
    if let Some(dir) = cli_override {
        return dir;
    }
    directories::ProjectDirs::from("", "", env!("CARGO_PKG_NAME"))
        .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.config_dir().to_owned()).ok())
        .unwrap_or_else(|| Utf8PathBuf::from("."))
}

/// Starts the reader for whichever source was asked for.
fn open_source(
    cli: &SpitermCli,
    settings: &Settings,
) -> SpitermResult<(ChannelSource, String, JoinHandle<()>)> {
    let (chunk_tx, chunk_rx) = unbounded();

    let (label, reader) = if cli.stdin {
        ("stdin".to_owned(), worker::spawn_stdin_reader(chunk_tx)?)
    } else if let Some(port) = &cli.port {
        let baud_rate = cli.baud_rate(settings);
        let reader = worker::spawn_serial_reader(port, baud_rate, settings, chunk_tx)?;
        (format!("{port} @ {baud_rate}"), reader)
    } else {
        let ports = serialport::available_ports()
            .map(|ports| {
                ports
                    .into_iter()
                    .map(|p| p.port_name)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        return Err(SpitermError::NoSource(ports));
    };

    info!("Capturing from {label}");
    Ok((ChannelSource::new(chunk_rx), label, reader))
}

/// Terminal input, forwarded as [`Event`]s.
fn spawn_input_thread(tx: mpsc::Sender<Event>) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("input".into())
        .spawn(move || {
            let result = (|| -> color_eyre::Result<()> {
                loop {
                    use ratatui::crossterm::event::Event as TermEvent;
                    match ratatui::crossterm::event::read()? {
                        TermEvent::Resize(_, _) => tx.send(CrosstermEvent::Resize.into())?,
                        TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                            if key.code == KeyCode::Char('c')
                                && key.modifiers.contains(KeyModifiers::CONTROL)
                            {
                                tx.send(Event::Quit)?;
                            } else {
                                tx.send(CrosstermEvent::KeyPress(key).into())?;
                            }
                        }
                        _ => (),
                    }
                }
            })();
            if let Err(e) = result {
                debug!("Input thread stopped: {e}");
            }
        })
}

/// Drains `source` into `view` every tick, asking for a redraw only when
/// bytes actually arrived.
fn spawn_ingest_thread(
    view: Arc<TerminalView>,
    mut source: ChannelSource,
    tx: mpsc::Sender<Event>,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("ingest".into())
        .spawn(move || {
            loop {
                if view.ingest(&mut source) && tx.send(Event::StreamData).is_err() {
                    return;
                }
                if source.is_finished() {
                    _ = tx.send(Event::StreamClosed);
                    return;
                }
                std::thread::sleep(app::TICK);
            }
        })
}

pub fn initialize_logging(max_level: LevelFilter) -> color_eyre::Result<WorkerGuard> {
    use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
    use tracing_subscriber::{fmt::time::ChronoLocal, prelude::*};

    let log_name = std::env::current_exe()?.with_extension("log");
    let file_appender = BasicRollingFileAppender::new(
        log_name,
        RollingConditionBasic::new().max_size(1024 * 1024 * 5),
        2,
    )?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let time_fmt = ChronoLocal::new("%Y-%m-%d %H:%M:%S%.6f".to_owned());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_file(false)
        .with_ansi(false)
        .with_target(true)
        .with_timer(time_fmt)
        .with_line_number(true)
        .with_filter(max_level);

    tracing_subscriber::registry().with(fmt_layer).init();
    Ok(guard)
}

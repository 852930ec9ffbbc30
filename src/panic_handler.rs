use std::sync::{Arc, Mutex, PoisonError};

use color_eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;

/// Shared handle on the log writer's guard.
///
/// The panic hook ends the process without unwinding back to `run`, so it
/// flushes through this instead of relying on the guard being dropped.
#[derive(Debug, Clone)]
pub struct LogFlusher(Arc<Mutex<Option<WorkerGuard>>>);

impl LogFlusher {
    pub fn new(guard: WorkerGuard) -> Self {
        Self(Arc::new(Mutex::new(Some(guard))))
    }

    /// Writes out pending log lines and stops the writer. Later calls do nothing.
    pub fn flush(&self) {
        let guard = self.0.lock().unwrap_or_else(PoisonError::into_inner).take();
        drop(guard);
    }
}

/// Installs eyre + panic hooks that put the terminal back before reporting.
///
/// Panics are how contract violations (bad display modes, poisoned locks)
/// surface, so the hook always ends the process.
pub fn initialize_panic_handler(log: LogFlusher) -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(format!(
            "This is a bug. Consider reporting it at {}",
            env!("CARGO_PKG_REPOSITORY")
        ))
        .display_location_section(true)
        .display_env_section(true)
        .into_hooks();
    eyre_hook.install()?;
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();

        let msg = format!("{}", panic_hook.panic_report(panic_info));
        #[cfg(not(debug_assertions))]
        {
            eprintln!("{msg}");
            use human_panic::{Metadata, handle_dump, print_msg};
            let support = format!(
                "You can open a support request at {}",
                env!("CARGO_PKG_REPOSITORY")
            );
            let meta = Metadata::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
                .support(support);

            let file_path = handle_dump(&meta, panic_info);
            print_msg(file_path, &meta)
                .expect("human-panic: printing error message to console failed");
        }
        tracing::error!("Fatal: {}", strip_ansi_escapes::strip_str(msg));
        log.flush();

        #[cfg(debug_assertions)]
        {
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        }

        std::process::exit(libc::EXIT_FAILURE);
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_flush_writes_out_pending_lines() {
        let sink = SharedSink::default();
        let (mut writer, guard) = tracing_appender::non_blocking(sink.clone());
        let log = LogFlusher::new(guard);

        writer.write_all(b"last words\n").unwrap();
        log.clone().flush();
        assert_eq!(sink.0.lock().unwrap().as_slice(), b"last words\n");

        // Already flushed, nothing left to do.
        log.flush();
    }
}

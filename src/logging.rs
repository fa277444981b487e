/*
================================================================================
                               Logging
================================================================================

Application logging goes through the `log` facade (debug!, info!, ...). Output is
sent to two places:

- the console, through an `env_logger` logger with a timestamped, colored format
- an in-memory ring buffer of the last MAX_LOG_LINES crate messages, which can be
  exported to `debug.log` and is dumped into `panic.log` when the process panics

Log levels:
- RUST_LOG, when set, decides everything
- otherwise debug builds show DEBUG and above for this crate, release builds ERROR
- other crates are silenced

Files live under the platform data directory (`dirs`):
<data dir>/face-overlay/logs/{debug.log,panic.log}
================================================================================
*/

use std::panic;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use env_logger::fmt::{Color, Formatter};
use log::{Level, LevelFilter, Log, Metadata, Record};
use chrono::Utc;
use once_cell::sync::OnceCell;

#[allow(unused_imports)]
use log::{debug, info, warn, error};

use crate::config::{LOG_TARGET, MAX_LOG_LINES};
use crate::error::Result;

pub type LogBuffer = Arc<Mutex<VecDeque<String>>>;

static SHARED_LOG_BUFFER: OnceCell<LogBuffer> = OnceCell::new();

/// The buffer installed by `setup_logger`, if any.
pub fn shared_log_buffer() -> Option<LogBuffer> {
    SHARED_LOG_BUFFER.get().map(Arc::clone)
}

struct BufferLogger {
    log_buffer: LogBuffer,
}

impl BufferLogger {
    fn new() -> Self {
        Self {
            log_buffer: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_LINES))),
        }
    }

    fn log_to_buffer(&self, message: &str, target: &str, line: Option<u32>) {
        let mut buffer = self.log_buffer.lock().unwrap_or_else(PoisonError::into_inner);
        if buffer.len() == MAX_LOG_LINES {
            buffer.pop_front();
        }

        let formatted_message = match line {
            Some(line_num) => format!("{target}:{line_num} {message}"),
            None => format!("{target} {message}"),
        };

        buffer.push_back(formatted_message);
    }

    fn get_shared_buffer(&self) -> LogBuffer {
        Arc::clone(&self.log_buffer)
    }
}

impl log::Log for BufferLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with(LOG_TARGET) && metadata.level() <= LevelFilter::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("{:<5} {}", record.level(), record.args());
            self.log_to_buffer(&message, record.target(), record.line());
        }
    }

    fn flush(&self) {}
}

struct CompositeLogger {
    console_logger: env_logger::Logger,
    buffer_logger: BufferLogger,
}

impl log::Log for CompositeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console_logger.enabled(metadata) || self.buffer_logger.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.console_logger.enabled(record.metadata()) {
            self.console_logger.log(record);
        }
        if self.buffer_logger.enabled(record.metadata()) {
            self.buffer_logger.log(record);
        }
    }

    fn flush(&self) {
        self.console_logger.flush();
        self.buffer_logger.flush();
    }
}

fn console_builder() -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else if cfg!(debug_assertions) {
        builder.filter(Some(LOG_TARGET), LevelFilter::Debug);
    } else {
        builder.filter(Some(LOG_TARGET), LevelFilter::Error);
    }

    // Filter out all other crates' logs
    builder.filter(None, LevelFilter::Off);

    builder.format(|buf: &mut Formatter, record: &Record| {
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ");

        let module_info = match (record.module_path(), record.line()) {
            (Some(module), Some(line)) => format!("{module}:{line}"),
            (Some(module), None) => module.to_string(),
            (None, Some(line)) => format!("line:{line}"),
            (None, None) => "unknown".to_string(),
        };

        let mut level_style = buf.style();
        let mut meta_style = buf.style();

        match record.level() {
            Level::Error => level_style.set_color(Color::Red).set_bold(true),
            Level::Warn => level_style.set_color(Color::Yellow).set_bold(true),
            Level::Info => level_style.set_color(Color::Green).set_bold(true),
            Level::Debug => level_style.set_color(Color::Blue).set_bold(true),
            Level::Trace => level_style.set_color(Color::White),
        };

        #[cfg(target_os = "macos")]
        {
            // Color::Rgb does not render on the macOS terminal
            meta_style.set_color(Color::Blue);
        }

        #[cfg(not(target_os = "macos"))]
        {
            meta_style.set_color(Color::Rgb(120, 120, 120));
        }

        writeln!(
            buf,
            "{} {} {} {}",
            meta_style.value(timestamp),
            level_style.value(record.level()),
            meta_style.value(module_info),
            record.args()
        )
    });

    builder
}

/// Installs the console + buffer logger. Returns the shared buffer for export.
pub fn setup_logger() -> Result<LogBuffer> {
    let buffer_logger = BufferLogger::new();
    let shared_buffer = buffer_logger.get_shared_buffer();

    let composite_logger = CompositeLogger {
        console_logger: console_builder().build(),
        buffer_logger,
    };

    log::set_boxed_logger(Box::new(composite_logger))?;

    // Always set the maximum level to Trace so that per-logger filtering decides
    log::set_max_level(LevelFilter::Trace);

    // set_boxed_logger only succeeds once per process, so this cannot already be set
    let _ = SHARED_LOG_BUFFER.set(Arc::clone(&shared_buffer));

    Ok(shared_buffer)
}

pub fn get_log_directory(app_name: &str) -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join(app_name).join("logs")
}

fn snapshot(log_buffer: &LogBuffer) -> Vec<String> {
    let buffer = log_buffer.lock().unwrap_or_else(PoisonError::into_inner);
    buffer.iter().cloned().collect()
}

/// Writes the buffered log lines to `debug.log` in the log directory.
///
/// Only messages from the `log` macros are captured, not raw `println!` output.
pub fn export_debug_logs(app_name: &str, log_buffer: &LogBuffer) -> Result<PathBuf> {
    let log_dir_path = get_log_directory(app_name);
    std::fs::create_dir_all(&log_dir_path)?;
    let debug_log_path = log_dir_path.join("debug.log");

    // Copy out first so the lock is not held while writing
    let log_entries = snapshot(log_buffer);
    write_log_export(&debug_log_path, &log_entries)?;

    info!("Debug logs exported to: {}", debug_log_path.display());
    Ok(debug_log_path)
}

fn write_log_export(path: &Path, log_entries: &[String]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ");
    writeln!(file, "{timestamp} [DEBUG EXPORT] face-overlay debug log export")?;
    writeln!(file, "{timestamp} [DEBUG EXPORT] Maximum captured entries: {MAX_LOG_LINES}")?;
    writeln!(file)?;

    if log_entries.is_empty() {
        writeln!(file, "{timestamp} [DEBUG EXPORT] No log entries found in buffer")?;
    } else {
        for log_entry in log_entries {
            writeln!(file, "{timestamp} {log_entry}")?;
        }
    }

    writeln!(file)?;
    writeln!(file, "{timestamp} [DEBUG EXPORT] Total entries exported: {}", log_entries.len())?;
    file.flush()
}

/// Writes the panic message, a backtrace and the buffered log lines to `panic.log`.
pub fn setup_panic_hook(app_name: &str, log_buffer: LogBuffer) {
    let log_file_path = get_log_directory(app_name).join("panic.log");

    panic::set_hook(Box::new(move |info| {
        let backtrace = backtrace::Backtrace::new();
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ");

        let location = match info.location() {
            Some(location) => format!("{}:{}", location.file(), location.line()),
            None => "unknown location".to_string(),
        };

        let header_msg = format!("[PANIC] at {location} - {info}");
        let backtrace_lines: Vec<String> = format!("{backtrace:?}")
            .lines()
            .map(|line| format!("[BACKTRACE] {}", line.trim()))
            .collect();

        eprintln!("\n\n{header_msg}");
        eprintln!("[PANIC] Backtrace:");
        for line in &backtrace_lines {
            eprintln!("{line}");
        }

        let written = (|| -> std::io::Result<()> {
            if let Some(parent) = log_file_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&log_file_path)?;

            writeln!(file, "{timestamp} {header_msg}")?;
            writeln!(file, "{timestamp} [PANIC] Backtrace:")?;
            for line in &backtrace_lines {
                writeln!(file, "{timestamp} {line}")?;
            }
            writeln!(file)?;
            writeln!(file, "{timestamp} [PANIC] Last {MAX_LOG_LINES} log entries:")?;
            for log in snapshot(&log_buffer) {
                writeln!(file, "{timestamp} {log}")?;
            }
            Ok(())
        })();

        match written {
            Ok(()) => eprintln!("\nA complete crash log has been written to: {}", log_file_path.display()),
            Err(e) => eprintln!("\nFailed to write crash log to {}: {}", log_file_path.display(), e),
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record<'a>(target: &'a str, args: std::fmt::Arguments<'a>) -> Record<'a> {
        Record::builder()
            .level(Level::Info)
            .target(target)
            .line(Some(7))
            .args(args)
            .build()
    }

    #[test]
    fn test_buffer_keeps_crate_messages_only() {
        let logger = BufferLogger::new();
        logger.log(&record("face_overlay::display", format_args!("hello")));
        logger.log(&record("tokio::runtime", format_args!("ignored")));

        let lines = snapshot(&logger.get_shared_buffer());
        assert_eq!(lines, vec!["face_overlay::display:7 INFO  hello".to_string()]);
    }

    #[test]
    fn test_buffer_is_bounded() {
        let logger = BufferLogger::new();
        for i in 0..MAX_LOG_LINES + 5 {
            logger.log(&record("face_overlay", format_args!("line {}", i)));
        }

        let lines = snapshot(&logger.get_shared_buffer());
        assert_eq!(lines.len(), MAX_LOG_LINES);
        assert!(lines[0].ends_with("line 5"));
    }
}

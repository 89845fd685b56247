// ABOUTME: User-facing log output for the upload run.
// ABOUTME: Emits GitHub workflow commands or JSON lines, redacting registered secrets.

use parking_lot::Mutex;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

/// Output mode for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputMode {
    /// GitHub Actions workflow commands (`::error::...`)
    #[default]
    Actions,
    /// JSON lines for scripting
    Json,
}

/// Severity of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
}

/// Leveled message sink with secret masking.
pub struct Output {
    mode: OutputMode,
    writer: Mutex<Box<dyn Write + Send>>,
    secrets: Mutex<Vec<String>>,
    start_time: Option<Instant>,
}

impl Output {
    /// Output to stdout.
    pub fn new(mode: OutputMode) -> Self {
        Self::with_writer(mode, std::io::stdout())
    }

    pub fn with_writer(mode: OutputMode, writer: impl Write + Send + 'static) -> Self {
        Self {
            mode,
            writer: Mutex::new(Box::new(writer)),
            secrets: Mutex::new(Vec::new()),
            start_time: None,
        }
    }

    /// Output into an in-memory buffer that can be read back.
    pub fn capture(mode: OutputMode) -> (Self, CapturedOutput) {
        let captured = CapturedOutput::default();
        (Self::with_writer(mode, captured.clone()), captured)
    }

    /// Start timing the run.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn elapsed_secs(&self) -> Option<f64> {
        self.start_time.map(|t| t.elapsed().as_secs_f64())
    }

    pub fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Level::Warning, message);
    }

    /// Print an error, capitalizing its first letter.
    pub fn error(&self, message: &str) {
        self.emit(Level::Error, &capitalize(message));
    }

    /// Print a final success message with timing, if the timer was started.
    pub fn success(&self, message: &str) {
        match self.elapsed_secs() {
            Some(elapsed) if self.mode == OutputMode::Actions => {
                self.info(&format!("{message} ({elapsed:.1}s)"))
            }
            _ => self.info(message),
        }
    }

    /// Mask `value` in this and all later output.
    ///
    /// In Actions mode the runner is told to mask it in the job log too.
    pub fn set_secret(&self, value: &str) {
        if value.is_empty() {
            return;
        }

        if self.mode == OutputMode::Actions {
            self.write_line(&format!("::add-mask::{value}"));
        }
        self.secrets.lock().push(value.to_string());
    }

    fn emit(&self, level: Level, message: &str) {
        let message = self.redact(message);
        let line = match self.mode {
            OutputMode::Actions => match level {
                Level::Debug => format!("::debug::{message}"),
                Level::Info => message,
                Level::Warning => format!("::warning::{message}"),
                Level::Error => format!("::error::{message}"),
            },
            OutputMode::Json => {
                let event = JsonEvent {
                    level,
                    message: &message,
                    duration_secs: self.elapsed_secs(),
                };
                match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(_) => return,
                }
            }
        };
        self.write_line(&line);
    }

    fn redact(&self, message: &str) -> String {
        self.secrets
            .lock()
            .iter()
            .fold(message.to_string(), |acc, secret| acc.replace(secret.as_str(), "***"))
    }

    fn write_line(&self, line: &str) {
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "{line}");
        let _ = writer.flush();
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    level: Level,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

/// Shared in-memory writer returned by [`Output::capture`].
#[derive(Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

//! Diagnostics reporting.
//!
//! Pipeline stages never print directly. They receive a [`Reporter`] and
//! describe what happened through [`Event`]s; the CLI decides where those go.
//!
//! # Example
//!
//! ```
//! use tilepack::report::{ConsoleReporter, Event, Reporter};
//!
//! let reporter = ConsoleReporter::new().with_verbose(true);
//! reporter.report(Event::Warning { message: "sheet too small".to_string() });
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Environment variable that turns on verbose diagnostics.
pub const VERBOSE_ENV: &str = "TILEPACK_VERBOSE";

/// Events reported while slicing, deduplicating and packing tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A source image was decoded
    ImageLoaded { path: PathBuf, width: u32, height: u32 },
    /// A palette strip was split off the top of a source image
    PaletteCaptured { path: PathBuf, width: u32 },
    /// A tile matched an earlier tile and was not stored
    DuplicateTile { path: PathBuf, x: u32, y: u32, id: u32 },
    /// Non-fatal problem
    Warning { message: String },
    /// An output artifact was written
    ArtifactWritten { path: PathBuf },
    /// End-of-run totals
    Summary { tiles: usize, unique: usize, duplicates: usize },
}

/// Sink for [`Event`]s.
pub trait Reporter {
    /// Report an event.
    fn report(&self, event: Event);

    /// Check if this reporter wants verbose output.
    fn is_verbose(&self) -> bool {
        false
    }
}

/// A reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullReporter;

impl NullReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for NullReporter {
    fn report(&self, _event: Event) {}
}

/// Console reporter with optional colors.
///
/// Warnings are always shown. Per-image and per-tile events are only
/// shown in verbose mode.
pub struct ConsoleReporter {
    use_colors: bool,
    verbose: bool,
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ConsoleReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleReporter")
            .field("use_colors", &self.use_colors)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl ConsoleReporter {
    /// Create a console reporter writing to stderr.
    pub fn new() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr),
            verbose: false,
            output: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /// Create a console reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self { use_colors: false, verbose: false, output: Mutex::new(Box::new(output)) }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    fn yellow(&self, text: &str) -> String {
        self.color(text, "\x1b[33m")
    }

    fn cyan(&self, text: &str) -> String {
        self.color(text, "\x1b[36m")
    }

    fn writeln(&self, line: &str) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", line);
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, event: Event) {
        match event {
            Event::Warning { message } => {
                self.writeln(&format!("{} {}", self.yellow("Warning:"), message));
            }
            _ if !self.verbose => {}
            Event::ImageLoaded { path, width, height } => {
                self.writeln(&format!(
                    "{} Loaded {} ({}x{})",
                    self.cyan("[debug]"),
                    path.display(),
                    width,
                    height
                ));
            }
            Event::PaletteCaptured { path, width } => {
                self.writeln(&format!(
                    "{} Palette strip of {} pixels taken from {}",
                    self.cyan("[debug]"),
                    width,
                    path.display()
                ));
            }
            Event::DuplicateTile { path, x, y, id } => {
                self.writeln(&format!(
                    "{} Skipping tile {},{} of {}: identical to tile {}",
                    self.cyan("[debug]"),
                    x,
                    y,
                    path.display(),
                    id
                ));
            }
            Event::ArtifactWritten { path } => {
                self.writeln(&format!("{} Wrote {}", self.cyan("[debug]"), path.display()));
            }
            Event::Summary { tiles, unique, duplicates } => {
                self.writeln(&format!(
                    "{} {} tiles scanned, {} unique, removed {} duplicates",
                    self.cyan("[debug]"),
                    tiles,
                    unique,
                    duplicates
                ));
            }
        }
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Whether an environment value for [`VERBOSE_ENV`] means "on".
pub fn verbose_from_env_value(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") | Some("0") => false,
        Some(v) => !v.eq_ignore_ascii_case("false"),
    }
}

/// Read [`VERBOSE_ENV`] from the process environment.
pub fn verbose_from_env() -> bool {
    verbose_from_env_value(std::env::var(VERBOSE_ENV).ok().as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Arc;

    fn capture(verbose: bool) -> (ConsoleReporter, Arc<Mutex<Vec<u8>>>) {
        let output = Arc::new(Mutex::new(Vec::new()));
        let reporter = ConsoleReporter::with_output(TestWriter(Arc::clone(&output)))
            .with_colors(false)
            .with_verbose(verbose);
        (reporter, output)
    }

    fn text(output: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8_lossy(&output.lock().unwrap()).to_string()
    }

    #[test]
    fn test_null_reporter() {
        let reporter = NullReporter::new();
        reporter.report(Event::Warning { message: "ignored".to_string() });
        assert!(!reporter.is_verbose());
    }

    #[test]
    fn test_warning_always_shown() {
        let (reporter, output) = capture(false);
        reporter.report(Event::Warning { message: "sheet too small".to_string() });
        assert_eq!(text(&output), "Warning: sheet too small\n");
    }

    #[test]
    fn test_debug_events_hidden_when_quiet() {
        let (reporter, output) = capture(false);
        reporter.report(Event::DuplicateTile { path: "a.png".into(), x: 8, y: 0, id: 1 });
        reporter.report(Event::Summary { tiles: 4, unique: 1, duplicates: 3 });
        assert!(text(&output).is_empty());
    }

    #[test]
    fn test_debug_events_shown_when_verbose() {
        let (reporter, output) = capture(true);
        assert!(reporter.is_verbose());
        reporter.report(Event::ImageLoaded { path: "map.png".into(), width: 16, height: 8 });
        reporter.report(Event::DuplicateTile { path: "map.png".into(), x: 8, y: 0, id: 1 });
        reporter.report(Event::Summary { tiles: 2, unique: 1, duplicates: 1 });

        let text = text(&output);
        assert!(text.contains("Loaded map.png (16x8)"));
        assert!(text.contains("Skipping tile 8,0 of map.png: identical to tile 1"));
        assert!(text.contains("removed 1 duplicates"));
    }

    #[test]
    fn test_verbose_env_values() {
        assert!(!verbose_from_env_value(None));
        assert!(!verbose_from_env_value(Some("")));
        assert!(!verbose_from_env_value(Some("0")));
        assert!(!verbose_from_env_value(Some("FALSE")));
        assert!(verbose_from_env_value(Some("1")));
        assert!(verbose_from_env_value(Some("yes")));
    }

    #[test]
    #[serial]
    fn test_verbose_from_env() {
        std::env::set_var(VERBOSE_ENV, "1");
        assert!(verbose_from_env());
        std::env::remove_var(VERBOSE_ENV);
        assert!(!verbose_from_env());
    }

    struct TestWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}

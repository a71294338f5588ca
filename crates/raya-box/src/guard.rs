//! Guarded invocation and failure reporting
//!
//! A guarded call runs fallible object-model code and turns an error into
//! a [`Report`] sent to a [`Reporter`] instead of propagating it. The
//! boxing factory guards every descriptor installation this way, so one
//! bad entry never aborts the synthesis of a whole type.

use crate::error::{BoxError, BoxResult};
use crate::realm::Realm;
use crate::value::Value;
use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from an explicit flag and the environment.
///
/// Priority: `NO_COLOR` env > flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Presentation of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStyle {
    /// Foreground color
    pub color: Color,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self { color: Color::Red }
    }
}

/// Sink for failure reports
///
/// Reporting is fire-and-forget: implementations swallow their own I/O
/// failures.
pub trait Reporter: Send + Sync {
    /// Deliver one formatted report
    fn report(&self, message: &str, style: &ReportStyle);
}

/// A contained failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Error name (`TypeError`, `RangeError`)
    pub name: &'static str,
    /// Error message
    pub message: String,
    /// Frames, innermost first, ending with the guarded site
    pub frames: Vec<String>,
}

impl Report {
    /// Build a report for `err` caught at `site`
    pub fn from_error(err: &BoxError, site: &str) -> Self {
        let mut frames = err.stack().to_vec();
        frames.push(site.to_string());
        Self {
            name: err.name(),
            message: err.message().to_string(),
            frames,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)?;
        for frame in &self.frames {
            write!(f, "\n    at {}", frame)?;
        }
        Ok(())
    }
}

/// Run `f`; on failure report it and return the report
pub fn contain<T>(
    reporter: &dyn Reporter,
    style: &ReportStyle,
    site: &str,
    f: impl FnOnce() -> BoxResult<T>,
) -> Result<T, Report> {
    f().map_err(|err| {
        let report = Report::from_error(&err, site);
        reporter.report(&report.to_string(), style);
        report
    })
}

/// Run `f`; on failure report it and return `None`
pub fn guarded<T>(
    reporter: &dyn Reporter,
    style: &ReportStyle,
    site: &str,
    f: impl FnOnce() -> BoxResult<T>,
) -> Option<T> {
    contain(reporter, style, site, f).ok()
}

/// Call `func` with `this` and `args`; on failure report it and return `None`
pub fn guarded_call(
    realm: &Realm,
    reporter: &dyn Reporter,
    style: &ReportStyle,
    func: &Value,
    this: &Value,
    args: &[Value],
) -> Option<Value> {
    let site = func
        .as_object()
        .and_then(|obj| obj.function())
        .map(|data| data.name().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "<anonymous>".to_string());
    guarded(reporter, style, &site, || realm.call(func, this, args))
}

/// Writes reports to stderr with color
pub struct ConsoleReporter {
    choice: ColorChoice,
}

impl ConsoleReporter {
    /// Create a reporter with an explicit color choice
    pub fn new(choice: ColorChoice) -> Self {
        Self { choice }
    }

    /// Create a reporter from a `--color` style flag, honoring `NO_COLOR`
    pub fn from_flag(flag: Option<&str>) -> Self {
        Self::new(resolve_color_choice(flag))
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::from_flag(None)
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, message: &str, style: &ReportStyle) {
        let mut stderr = StandardStream::stderr(self.choice);
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(style.color)).set_bold(true);
        let _ = stderr.set_color(&spec);
        let _ = writeln!(stderr, "{}", message);
        let _ = stderr.reset();
    }
}

/// Collects reports in memory
#[derive(Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<(String, ReportStyle)>>,
}

impl MemoryReporter {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages reported so far
    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(m, _)| m.clone()).collect()
    }

    /// Messages and styles reported so far
    pub fn entries(&self) -> Vec<(String, ReportStyle)> {
        self.entries.lock().clone()
    }

    /// Number of reports
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// No reports yet
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove and return all messages
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.lock())
            .into_iter()
            .map(|(m, _)| m)
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, message: &str, style: &ReportStyle) {
        self.entries.lock().push((message.to_string(), *style));
    }
}

/// Discards every report
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _message: &str, _style: &ReportStyle) {}
}

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{ProbeOutcome, ProbeResult};

/// Human-readable output for probe results, one call per result
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn report(&self, result: &ProbeResult) -> std::io::Result<()>;
}

/// Writes one line per result to a writer (stdout by default)
pub struct ConsoleReporter<W> {
    out: Mutex<W>,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Run `f` against the underlying writer
    pub fn with_writer<R>(&self, f: impl FnOnce(&W) -> R) -> Option<R> {
        self.out.lock().ok().map(|out| f(&*out))
    }
}

#[async_trait]
impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    async fn report(&self, result: &ProbeResult) -> std::io::Result<()> {
        let line = format_line(result);
        let mut out = self
            .out
            .lock()
            .map_err(|_| std::io::Error::other("console writer poisoned"))?;
        writeln!(out, "{line}")?;
        out.flush()
    }
}

/// Render a result as a single console line
pub fn format_line(result: &ProbeResult) -> String {
    let marker = match result.outcome {
        ProbeOutcome::Success => "✓",
        _ => "✗",
    };

    let url = if result.url.is_empty() {
        "<empty>"
    } else {
        result.url.as_str()
    };

    let mut line = format!(
        "[{}] {} {} status={} time={}ms ({})",
        result.checked_at.format("%Y-%m-%d %H:%M:%S"),
        marker,
        url,
        result.status_code,
        result.duration_ms,
        result.outcome
    );

    if let Some(error) = &result.error {
        line.push_str(": ");
        line.push_str(error);
    }

    line
}

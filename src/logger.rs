//! Terminal output: prefixed log lines and a single build progress line.
//!
//! ```ignore
//! log!("build"; "{} fingerprinted", plural_count(n, "file"));
//! debug!("fingerprint"; "{} -> {}", from, to);   // --verbose only
//!
//! let progress = ProgressLine::new(&[("fingerprint", 12), ("rewrite", 4)]);
//! progress.inc("fingerprint");
//! progress.finish();
//! ```
//!
//! While a progress line is on screen, log lines clear it first; the next
//! counter update draws it again below them.

use crossterm::{
    cursor, queue,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{StdoutLock, Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set while a [`ProgressLine`] occupies the current terminal line.
static PROGRESS_SHOWN: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Print `[module] message`.
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like [`log!`], but only with `--verbose`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

pub fn log(module: &str, message: &str) {
    let mut out = stdout().lock();
    if PROGRESS_SHOWN.load(Ordering::Relaxed) {
        clear_line(&mut out);
    }
    writeln!(out, "{} {message}", prefix(module)).ok();
    out.flush().ok();
}

fn prefix(module: &str) -> String {
    let tag = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "build" => tag.bright_blue().bold().to_string(),
        "manifest" => tag.bright_green().bold().to_string(),
        "error" => tag.bright_red().bold().to_string(),
        "warning" => tag.bright_magenta().bold().to_string(),
        _ => tag.bright_yellow().bold().to_string(),
    }
}

fn clear_line(out: &mut StdoutLock<'_>) {
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
}

/// `[build] fingerprint(42/69) rewrite(5/10)`, redrawn in place.
///
/// Counters are bumped from rayon workers. Redraws use `try_lock`, so a
/// worker never waits on the terminal; a skipped redraw is caught up by the
/// next one.
pub struct ProgressLine {
    counters: Vec<Counter>,
    draw: Mutex<()>,
    /// Drawn and not yet finished; `Drop` only wipes such a line.
    shown: bool,
}

struct Counter {
    name: &'static str,
    total: usize,
    done: AtomicUsize,
}

impl ProgressLine {
    /// Show a line with one counter per non-empty item.
    pub fn new(items: &[(&'static str, usize)]) -> Self {
        let mut progress = Self::hidden(items);
        progress.shown = true;
        PROGRESS_SHOWN.store(true, Ordering::Relaxed);
        progress.draw(false);
        progress
    }

    fn hidden(items: &[(&'static str, usize)]) -> Self {
        let counters = items
            .iter()
            .filter(|(_, total)| *total > 0)
            .map(|&(name, total)| Counter {
                name,
                total,
                done: AtomicUsize::new(0),
            })
            .collect();
        Self {
            counters,
            draw: Mutex::new(()),
            shown: false,
        }
    }

    fn counter(&self, name: &str) -> Option<&Counter> {
        self.counters.iter().find(|c| c.name == name)
    }

    pub fn inc(&self, name: &str) {
        let Some(counter) = self.counter(name) else {
            return;
        };
        counter.done.fetch_add(1, Ordering::Relaxed);
        if let Some(_guard) = self.draw.try_lock() {
            self.draw(false);
        }
    }

    #[cfg(test)]
    fn current(&self, name: &str) -> Option<usize> {
        self.counter(name).map(|c| c.done.load(Ordering::Relaxed))
    }

    fn render(&self) -> String {
        let parts: Vec<String> = self
            .counters
            .iter()
            .map(|c| format!("{}({}/{})", c.name, c.done.load(Ordering::Relaxed), c.total))
            .collect();
        parts.join(" ")
    }

    fn draw(&self, newline: bool) {
        let mut out = stdout().lock();
        clear_line(&mut out);
        write!(out, "{} {}", prefix("build"), self.render()).ok();
        if newline {
            writeln!(out).ok();
        }
        out.flush().ok();
    }

    /// Leave the final counts on screen.
    pub fn finish(mut self) {
        {
            let _guard = self.draw.lock();
            self.draw(true);
        }
        self.shown = false;
        PROGRESS_SHOWN.store(false, Ordering::Relaxed);
    }
}

impl Drop for ProgressLine {
    /// Abandoned mid-build: wipe the partial line.
    fn drop(&mut self) {
        if !self.shown {
            return;
        }
        PROGRESS_SHOWN.store(false, Ordering::Relaxed);
        let mut out = stdout().lock();
        clear_line(&mut out);
        out.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_counters_hidden() {
        let progress = ProgressLine::hidden(&[("fingerprint", 3), ("rewrite", 0)]);
        assert_eq!(progress.render(), "fingerprint(0/3)");
        assert_eq!(progress.current("rewrite"), None);
    }

    #[test]
    fn test_counts_render() {
        let progress = ProgressLine::hidden(&[("rewrite", 2)]);
        progress.counters[0].done.fetch_add(1, Ordering::Relaxed);
        assert_eq!(progress.render(), "rewrite(1/2)");
        assert_eq!(progress.current("rewrite"), Some(1));
    }

    #[test]
    fn test_finish_releases_line() {
        let progress = ProgressLine::new(&[("fingerprint", 1)]);
        assert!(progress.shown);
        assert!(PROGRESS_SHOWN.load(Ordering::Relaxed));
        progress.inc("fingerprint");
        progress.finish();
        assert!(!PROGRESS_SHOWN.load(Ordering::Relaxed));
    }

    #[test]
    fn test_prefix_names_module() {
        assert!(prefix("manifest").contains("[manifest]"));
        assert!(prefix("Warning").contains("[Warning]"));
    }
}

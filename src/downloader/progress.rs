//! Progress reporting for paginated retrieval.
//!
//! The aggregator drives a [`ProgressSink`] through three calls: `setup` once
//! with a default label, `initialize` when the total page count is known,
//! and `tick` before each page beyond the first is fetched. Sinks take
//! `&self` and keep their state behind interior mutability so one sink can be
//! shared with concurrent page fetches.

use indicatif::{ProgressBar, ProgressStyle};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::info;

/// Emit a log line every this many ticks by default
const DEFAULT_LOG_EVERY: u32 = 5;

/// Receiver of retrieval progress
pub trait ProgressSink: Send + Sync {
    /// Set the default label shown when `initialize` carries none
    fn setup(&self, label: &str);

    /// Start tracking a run of `total_pages` pages
    fn initialize(&self, total_pages: u32, label: Option<&str>);

    /// One more page is being fetched
    fn tick(&self);

    /// Retrieval finished; release any terminal resources
    fn finish(&self) {}
}

/// Sink that discards every call
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn setup(&self, _label: &str) {}
    fn initialize(&self, _total_pages: u32, _label: Option<&str>) {}
    fn tick(&self) {}
}

/// Page counters of one run.
#[derive(Debug, Clone)]
pub struct ProgressState {
    /// Pages ticked so far
    pub current_page: u32,
    /// Total pages reported by the remote API
    pub total_pages: u32,
    /// Label describing the run
    pub label: String,
    /// When `initialize` was called
    pub started: Instant,
}

impl ProgressState {
    /// Fresh state for `total_pages` pages
    pub fn new(total_pages: u32, label: impl Into<String>) -> Self {
        Self {
            current_page: 0,
            total_pages,
            label: label.into(),
            started: Instant::now(),
        }
    }

    /// Completion percentage (0-100)
    pub fn percentage(&self) -> f64 {
        if self.total_pages == 0 {
            return 100.0;
        }
        f64::from(self.current_page) / f64::from(self.total_pages) * 100.0
    }

    /// Remaining time extrapolated from the pages ticked so far
    pub fn estimate_remaining(&self) -> Option<Duration> {
        if self.current_page == 0 || self.current_page >= self.total_pages {
            return None;
        }
        let per_page = self.started.elapsed().as_secs_f64() / f64::from(self.current_page);
        let remaining = f64::from(self.total_pages - self.current_page) * per_page;
        Some(Duration::from_secs_f64(remaining))
    }

    /// `current/total - pct% - label`
    pub fn format_progress(&self) -> String {
        let mut line = format!(
            "{}/{} - {:.0}% - {}",
            self.current_page,
            self.total_pages,
            self.percentage(),
            self.label
        );
        if let Some(remaining) = self.estimate_remaining() {
            line.push_str(&format!(" (~{} remaining)", format_duration(remaining)));
        }
        line
    }
}

/// Sink writing a progress line through `tracing` every N ticks
#[derive(Debug)]
pub struct LogProgressSink {
    every: u32,
    default_label: Mutex<String>,
    state: Mutex<Option<ProgressState>>,
}

impl Default for LogProgressSink {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_EVERY)
    }
}

impl LogProgressSink {
    /// Sink logging on every `every`th tick
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            default_label: Mutex::new(String::new()),
            state: Mutex::new(None),
        }
    }

    /// Snapshot of the current counters
    pub fn snapshot(&self) -> Option<ProgressState> {
        lock(&self.state).clone()
    }
}

impl ProgressSink for LogProgressSink {
    fn setup(&self, label: &str) {
        *lock(&self.default_label) = label.to_string();
    }

    fn initialize(&self, total_pages: u32, label: Option<&str>) {
        let label = match label.filter(|l| !l.is_empty()) {
            Some(label) => label.to_string(),
            None => lock(&self.default_label).clone(),
        };
        *lock(&self.state) = Some(ProgressState::new(total_pages, label));
    }

    fn tick(&self) {
        let mut guard = lock(&self.state);
        if let Some(state) = guard.as_mut() {
            state.current_page += 1;
            if state.current_page % self.every == 0 {
                info!("[PROGRESS] {}", state.format_progress());
            }
        }
    }
}

/// Terminal progress bar
#[derive(Debug)]
pub struct BarProgressSink {
    default_label: Mutex<String>,
    bar: Mutex<Option<ProgressBar>>,
}

impl Default for BarProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl BarProgressSink {
    /// Sink without an active bar
    pub fn new() -> Self {
        Self {
            default_label: Mutex::new(String::new()),
            bar: Mutex::new(None),
        }
    }

    /// Position of the active bar, if any
    pub fn position(&self) -> Option<u64> {
        lock(&self.bar).as_ref().map(ProgressBar::position)
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.green/white}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("─>·")
    }
}

impl ProgressSink for BarProgressSink {
    fn setup(&self, label: &str) {
        *lock(&self.default_label) = label.to_string();
    }

    fn initialize(&self, total_pages: u32, label: Option<&str>) {
        let message = match label.filter(|l| !l.is_empty()) {
            Some(label) => label.to_string(),
            None => lock(&self.default_label).clone(),
        };
        let bar = ProgressBar::new(u64::from(total_pages));
        bar.set_style(Self::style());
        bar.set_message(message);
        if let Some(previous) = lock(&self.bar).replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn tick(&self) {
        if let Some(bar) = lock(&self.bar).as_ref() {
            bar.inc(1);
        }
    }

    fn finish(&self) {
        if let Some(bar) = lock(&self.bar).take() {
            bar.finish();
        }
    }
}

/// Progress display selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Terminal progress bar
    Bar,
    /// Periodic log lines
    Log,
    /// No progress output
    None,
}

impl ProgressMode {
    /// Build the sink for this mode
    pub fn create_sink(self) -> Arc<dyn ProgressSink> {
        match self {
            ProgressMode::Bar => Arc::new(BarProgressSink::new()),
            ProgressMode::Log => Arc::new(LogProgressSink::default()),
            ProgressMode::None => Arc::new(NoopProgressSink),
        }
    }
}

impl FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bar" => Ok(ProgressMode::Bar),
            "log" => Ok(ProgressMode::Log),
            "none" => Ok(ProgressMode::None),
            _ => Err(format!(
                "Invalid progress mode: {s}. Valid options: bar, log, none"
            )),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{:.1}h", secs as f64 / 3600.0)
    }
}

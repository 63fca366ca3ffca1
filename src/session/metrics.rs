//! Metrics recording for the two timed runs
//!
//! Features:
//! - Monotonic run timing behind a `Clock` seam
//! - Guarded click counter, armed only while a run is timing
//! - Mistake tallies keyed by interface style

use super::errors::{SessionError, SessionResult};
use crate::tasks::PresentationStyle;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

/// Source of monotonic timestamps
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-independent clock backed by `Instant::now`
#[derive(Clone, Copy, Debug, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Interaction metrics of one run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub click_count: u32,
    pub time_taken_ms: u64,
    pub mistake_count: u32,
}

impl Metrics {
    pub fn time_taken_secs(&self) -> f64 {
        self.time_taken_ms as f64 / 1000.0
    }
}

/// Both finished runs, the only values the result view may read
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonResults {
    pub bad: Metrics,
    pub good: Metrics,
}

impl ComparisonResults {
    pub fn get(&self, style: PresentationStyle) -> &Metrics {
        match style {
            PresentationStyle::Bad => &self.bad,
            PresentationStyle::Good => &self.good,
        }
    }
}

/// Click counter with an explicit active window
///
/// Clicks delivered while disarmed are dropped, so a stale count can never
/// leak into the next run.
#[derive(Clone, Debug, Default)]
pub struct ClickCounter {
    armed: bool,
    count: u32,
}

impl ClickCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to zero and start counting
    pub fn arm(&mut self) {
        self.count = 0;
        self.armed = true;
    }

    /// Stop counting; the last count stays readable
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Count one click, returns false when the click was discarded
    pub fn record(&mut self) -> bool {
        if self.armed {
            self.count = self.count.saturating_add(1);
        }
        self.armed
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Proof that a run was started
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunHandle {
    pub style: PresentationStyle,
    pub started_at: Instant,
}

/// Records clicks, time and mistakes for the bad and good runs
#[derive(Debug)]
pub struct MetricsRecorder<C: Clock = MonotonicClock> {
    clock: C,
    results: FxHashMap<PresentationStyle, Metrics>,
    /// Start of the latest run per style, kept after finishing
    starts: FxHashMap<PresentationStyle, Instant>,
    running: Option<RunHandle>,
    clicks: ClickCounter,
}

impl MetricsRecorder<MonotonicClock> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock)
    }
}

impl Default for MetricsRecorder<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MetricsRecorder<C> {
    /// Create a recorder with zeroed metrics for both styles
    pub fn with_clock(clock: C) -> Self {
        let mut recorder = MetricsRecorder {
            clock,
            results: FxHashMap::default(),
            starts: FxHashMap::default(),
            running: None,
            clicks: ClickCounter::new(),
        };
        recorder.reset();
        recorder
    }

    /// Begin timing a run and arm the click counter at zero
    pub fn start_run(&mut self, style: PresentationStyle) -> SessionResult<RunHandle> {
        if let Some(active) = self.running {
            return Err(SessionError::RunInProgress {
                running: active.style,
                requested: style,
            });
        }

        let handle = RunHandle {
            style,
            started_at: self.clock.now(),
        };
        self.starts.insert(style, handle.started_at);
        self.running = Some(handle);
        self.clicks.arm();
        debug!(%style, "run started");
        Ok(handle)
    }

    /// Stop timing `style`, store its time and clicks, and return its metrics
    ///
    /// Finishing the same style again re-measures from the same start and
    /// overwrites the stored time and clicks.
    pub fn finish_run(&mut self, style: PresentationStyle) -> SessionResult<Metrics> {
        let started_at = *self
            .starts
            .get(&style)
            .ok_or(SessionError::NoActiveRun(style))?;

        match self.running {
            Some(active) if active.style == style => {
                self.running = None;
                self.clicks.disarm();
            }
            Some(active) => {
                return Err(SessionError::StyleMismatch {
                    active: active.style,
                    reported: style,
                })
            }
            None => warn!(%style, "finishing a run that already finished; overwriting"),
        }

        let elapsed = self.clock.now().saturating_duration_since(started_at);
        let time_taken_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let click_count = self.clicks.count();

        let metrics = self.results.entry(style).or_default();
        metrics.time_taken_ms = time_taken_ms;
        metrics.click_count = click_count;
        let finished = *metrics;

        debug!(
            %style,
            time_taken_ms,
            click_count,
            mistakes = finished.mistake_count,
            "run finished"
        );
        Ok(finished)
    }

    /// Add one mistake to `style`, whichever run is active
    pub fn record_mistake(&mut self, style: PresentationStyle) -> u32 {
        let metrics = self.results.entry(style).or_default();
        metrics.mistake_count = metrics.mistake_count.saturating_add(1);
        metrics.mistake_count
    }

    /// Deliver a click; counted only while a run is timing
    pub fn register_click(&mut self) -> bool {
        self.clicks.record()
    }

    /// Drop any run in progress without storing its measurement
    pub fn cancel_run(&mut self) {
        if let Some(active) = self.running.take() {
            self.starts.remove(&active.style);
            debug!(style = %active.style, "run cancelled");
        }
        self.clicks.disarm();
    }

    pub fn metrics(&self, style: PresentationStyle) -> Metrics {
        self.results.get(&style).copied().unwrap_or_default()
    }

    /// Clicks counted so far in the current (or last) run
    #[cfg(test)]
    pub fn live_clicks(&self) -> u32 {
        self.clicks.count()
    }

    pub fn snapshot(&self) -> ComparisonResults {
        ComparisonResults {
            bad: self.metrics(PresentationStyle::Bad),
            good: self.metrics(PresentationStyle::Good),
        }
    }

    /// Zero both styles and forget every run
    pub fn reset(&mut self) {
        self.results.clear();
        self.results.insert(PresentationStyle::Bad, Metrics::default());
        self.results.insert(PresentationStyle::Good, Metrics::default());
        self.starts.clear();
        self.running = None;
        self.clicks = ClickCounter::new();
    }
}

/// Hand-driven clock for deterministic timing in tests
#[cfg(test)]
#[derive(Clone, Debug)]
pub(crate) struct ManualClock {
    base: Instant,
    offset: std::rc::Rc<std::cell::Cell<std::time::Duration>>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Self {
        ManualClock {
            base: Instant::now(),
            offset: Default::default(),
        }
    }

    pub(crate) fn advance_ms(&self, ms: u64) {
        self.offset
            .set(self.offset.get() + std::time::Duration::from_millis(ms));
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }
}

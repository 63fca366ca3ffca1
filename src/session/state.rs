//! Session state machine
//!
//! Maintains:
//! - Current stage (intro through results)
//! - Selected mission and run order
//! - Completed runs, in completion order
//! - The metrics recorder, driven at run boundaries
//!
//! Every mutation goes through a transition method. An event the current
//! stage does not accept is a wiring bug and comes back as `SessionError`.

use super::errors::{SessionError, SessionResult};
use super::metrics::{Clock, ComparisonResults, Metrics, MetricsRecorder, MonotonicClock};
use crate::feedback::Report;
use crate::tasks::{self, PresentationStyle, TaskDefinition, TaskType};
use std::fmt;
use tracing::{debug, info};

/// Screen the session is on; exactly one is active
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Intro,
    TaskSelection,
    OrderSelection,
    BriefingBad,
    TaskBad,
    BriefingGood,
    TaskGood,
    Results,
}

impl Stage {
    pub fn briefing(style: PresentationStyle) -> Self {
        match style {
            PresentationStyle::Bad => Stage::BriefingBad,
            PresentationStyle::Good => Stage::BriefingGood,
        }
    }

    pub fn task(style: PresentationStyle) -> Self {
        match style {
            PresentationStyle::Bad => Stage::TaskBad,
            PresentationStyle::Good => Stage::TaskGood,
        }
    }

    /// Style of the timed run, if this is a `task-*` stage
    pub fn running_style(self) -> Option<PresentationStyle> {
        match self {
            Stage::TaskBad => Some(PresentationStyle::Bad),
            Stage::TaskGood => Some(PresentationStyle::Good),
            _ => None,
        }
    }

    /// Style being briefed, if this is a `briefing-*` stage
    pub fn briefed_style(self) -> Option<PresentationStyle> {
        match self {
            Stage::BriefingBad => Some(PresentationStyle::Bad),
            Stage::BriefingGood => Some(PresentationStyle::Good),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Intro => "intro",
            Stage::TaskSelection => "task-selection",
            Stage::OrderSelection => "order-selection",
            Stage::BriefingBad => "briefing-bad",
            Stage::TaskBad => "task-bad",
            Stage::BriefingGood => "briefing-good",
            Stage::TaskGood => "task-good",
            Stage::Results => "results",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two styles in the order the user runs them
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOrder([PresentationStyle; 2]);

impl RunOrder {
    /// `[first, other]`, always a permutation of bad and good
    pub fn starting_with(first: PresentationStyle) -> Self {
        RunOrder([first, first.other()])
    }

    pub fn first(&self) -> PresentationStyle {
        self.0[0]
    }

    #[cfg(test)]
    pub fn styles(&self) -> &[PresentationStyle; 2] {
        &self.0
    }

    /// First style in the order that has not been completed yet
    pub fn remaining(&self, completed: &[PresentationStyle]) -> Option<PresentationStyle> {
        self.0.iter().copied().find(|s| !completed.contains(s))
    }
}

/// One lab session: choose a mission, run it twice, compare
#[derive(Debug)]
pub struct Session<C: Clock = MonotonicClock> {
    stage: Stage,
    task_type: Option<TaskType>,
    run_order: Option<RunOrder>,
    completed: Vec<PresentationStyle>,
    recorder: MetricsRecorder<C>,
    instructions_minimized: bool,
}

impl Session<MonotonicClock> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock)
    }
}

impl Default for Session<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Session<C> {
    pub fn with_clock(clock: C) -> Self {
        Session {
            stage: Stage::Intro,
            task_type: None,
            run_order: None,
            completed: Vec::with_capacity(2),
            recorder: MetricsRecorder::with_clock(clock),
            instructions_minimized: false,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn task_type(&self) -> Option<TaskType> {
        self.task_type
    }

    pub fn task(&self) -> Option<&'static TaskDefinition> {
        self.task_type.map(tasks::lookup)
    }

    #[cfg(test)]
    pub fn run_order(&self) -> Option<RunOrder> {
        self.run_order
    }

    /// True until the first run completes
    pub fn is_first_run(&self) -> bool {
        self.completed.is_empty()
    }

    pub fn instructions_minimized(&self) -> bool {
        self.instructions_minimized
    }

    /// Metrics of a style as recorded so far
    #[cfg(test)]
    pub fn metrics(&self, style: PresentationStyle) -> Metrics {
        self.recorder.metrics(style)
    }

    /// Clicks counted in the run that is currently timing
    #[cfg(test)]
    pub fn live_clicks(&self) -> u32 {
        self.recorder.live_clicks()
    }

    /// intro → task-selection
    pub fn begin(&mut self) -> SessionResult<()> {
        self.expect(Stage::Intro, "begin")?;
        self.enter(Stage::TaskSelection);
        Ok(())
    }

    /// task-selection → order-selection
    pub fn select_task(&mut self, task: TaskType) -> SessionResult<()> {
        self.expect(Stage::TaskSelection, "select_task")?;
        self.task_type = Some(task);
        info!(%task, "task selected");
        self.enter(Stage::OrderSelection);
        Ok(())
    }

    /// order-selection → briefing of `first`
    pub fn select_order(&mut self, first: PresentationStyle) -> SessionResult<()> {
        self.expect(Stage::OrderSelection, "select_order")?;
        let order = RunOrder::starting_with(first);
        self.run_order = Some(order);
        info!(first = %order.first(), "run order chosen");
        self.enter(Stage::briefing(first));
        Ok(())
    }

    /// briefing-{s} → task-{s}, starting the timer and click counter
    pub fn start(&mut self) -> SessionResult<()> {
        let style = self
            .stage
            .briefed_style()
            .ok_or_else(|| SessionError::invalid(self.stage, "start"))?;
        self.recorder.start_run(style)?;
        self.instructions_minimized = false;
        self.enter(Stage::task(style));
        Ok(())
    }

    /// task-{s} → next briefing or results
    pub fn complete(&mut self, style: PresentationStyle) -> SessionResult<Metrics> {
        let active = self
            .stage
            .running_style()
            .ok_or_else(|| SessionError::invalid(self.stage, "complete"))?;
        if active != style {
            return Err(SessionError::StyleMismatch {
                active,
                reported: style,
            });
        }
        let order = self
            .run_order
            .ok_or_else(|| SessionError::invalid(self.stage, "complete"))?;

        let metrics = self.recorder.finish_run(style)?;
        self.completed.push(style);
        info!(
            %style,
            time_ms = metrics.time_taken_ms,
            clicks = metrics.click_count,
            mistakes = metrics.mistake_count,
            "run completed"
        );

        match order.remaining(&self.completed) {
            Some(next) => self.enter(Stage::briefing(next)),
            None => self.enter(Stage::Results),
        }
        Ok(metrics)
    }

    /// Self-loop in a `task-*` stage; the mistake goes to `style`
    pub fn mistake(&mut self, style: PresentationStyle) -> SessionResult<u32> {
        if self.stage.running_style().is_none() {
            return Err(SessionError::invalid(self.stage, "mistake"));
        }
        let count = self.recorder.record_mistake(style);
        debug!(%style, count, "mistake recorded");
        Ok(count)
    }

    /// Deliver a click from the input layer; counted only during a timed run
    pub fn click(&mut self) -> bool {
        if self.stage.running_style().is_none() {
            return false;
        }
        self.recorder.register_click()
    }

    /// Collapse or expand the instruction panel during a run
    pub fn toggle_instructions(&mut self) -> SessionResult<bool> {
        if self.stage.running_style().is_none() {
            return Err(SessionError::invalid(self.stage, "toggle_instructions"));
        }
        self.instructions_minimized = !self.instructions_minimized;
        Ok(self.instructions_minimized)
    }

    /// task-{s} → intro, discarding everything measured so far
    pub fn abort(&mut self) -> SessionResult<()> {
        if self.stage.running_style().is_none() {
            return Err(SessionError::invalid(self.stage, "abort"));
        }
        self.recorder.cancel_run();
        info!(stage = %self.stage, "run aborted");
        self.reset();
        Ok(())
    }

    /// results → intro
    pub fn restart(&mut self) -> SessionResult<()> {
        self.expect(Stage::Results, "restart")?;
        self.reset();
        Ok(())
    }

    /// Both finished runs; only available on the results stage
    pub fn results(&self) -> Option<ComparisonResults> {
        if self.stage == Stage::Results {
            Some(self.recorder.snapshot())
        } else {
            None
        }
    }

    /// Results plus analysis, ready for rendering or export
    pub fn report(&self) -> Option<Report> {
        Some(Report::new(self.task_type?, self.results()?))
    }

    fn expect(&self, stage: Stage, event: &'static str) -> SessionResult<()> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(SessionError::invalid(self.stage, event))
        }
    }

    fn enter(&mut self, next: Stage) {
        debug!(from = %self.stage, to = %next, "stage transition");
        self.stage = next;
    }

    fn reset(&mut self) {
        self.recorder.reset();
        self.completed.clear();
        self.run_order = None;
        self.task_type = None;
        self.instructions_minimized = false;
        self.enter(Stage::Intro);
    }
}

//! Lab controller: routes terminal actions into the session and the form
//!
//! Owns the session, the form of the active run and the last finished
//! report. Rendering reads from here; nothing here touches the terminal.

use crate::cli::form::{Control, FieldKind, FormSignal, FormState};
use crate::cli::input::UiAction;
use crate::feedback::Report;
use crate::session::errors::SessionResult;
use crate::session::metrics::{Clock, MonotonicClock};
use crate::session::{Session, Stage};
use crate::tasks::{PresentationStyle, TaskType};
use tracing::{debug, info};

/// Whether the event loop keeps going
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Session plus the interactive state around it
pub struct Lab<C: Clock = MonotonicClock> {
    session: Session<C>,
    form: Option<FormState>,
    last_report: Option<Report>,
}

impl Lab<MonotonicClock> {
    pub fn new() -> Self {
        Self::with_session(Session::new())
    }
}

impl<C: Clock> Lab<C> {
    pub fn with_session(session: Session<C>) -> Self {
        Lab {
            session,
            form: None,
            last_report: None,
        }
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    /// Report of the most recently finished session, kept across restarts
    pub fn last_report(&self) -> Option<&Report> {
        self.last_report.as_ref()
    }

    /// Apply task/order chosen on the command line through the normal transitions
    pub fn preselect(
        &mut self,
        task: Option<TaskType>,
        first: Option<PresentationStyle>,
    ) -> SessionResult<()> {
        if let Some(task) = task {
            self.session.begin()?;
            self.session.select_task(task)?;
            if let Some(first) = first {
                self.session.select_order(first)?;
            }
        }
        Ok(())
    }

    /// Handle one action from the terminal
    pub fn handle(&mut self, action: UiAction) -> SessionResult<Flow> {
        if action == UiAction::Quit {
            return Ok(Flow::Exit);
        }
        // Counted before dispatch: the press that starts a run happens in a
        // briefing and is dropped, the press that completes it is kept.
        if action.is_operation() {
            self.session.click();
        }

        let stage = self.session.stage();
        if let Some(style) = stage.running_style() {
            return self.handle_run(style, action);
        }

        let quit = matches!(action, UiAction::Back | UiAction::Char('q'));
        match (stage, action) {
            (_, _) if quit => return Ok(Flow::Exit),
            (Stage::Intro, UiAction::Enter) => self.session.begin()?,
            (Stage::TaskSelection, UiAction::Char(c)) => {
                if let Some(task) = task_for_key(c) {
                    self.session.select_task(task)?;
                }
            }
            (Stage::OrderSelection, UiAction::Char(c)) => match c.to_ascii_lowercase() {
                'b' => self.session.select_order(PresentationStyle::Bad)?,
                'g' => self.session.select_order(PresentationStyle::Good)?,
                _ => {}
            },
            (Stage::BriefingBad | Stage::BriefingGood, UiAction::Enter) => self.start_run()?,
            (Stage::Results, UiAction::Char('r')) => self.session.restart()?,
            _ => {}
        }
        Ok(Flow::Continue)
    }

    fn start_run(&mut self) -> SessionResult<()> {
        self.session.start()?;
        if let (Some(task), Some(style)) =
            (self.session.task_type(), self.session.stage().running_style())
        {
            self.form = Some(FormState::new(task, style));
        }
        Ok(())
    }

    fn handle_run(&mut self, style: PresentationStyle, action: UiAction) -> SessionResult<Flow> {
        match action {
            UiAction::Back => {
                self.form = None;
                self.session.abort()?;
                return Ok(Flow::Continue);
            }
            UiAction::ToggleInstructions => {
                self.session.toggle_instructions()?;
                return Ok(Flow::Continue);
            }
            _ => {}
        }
        let Some(form) = self.form.as_mut() else {
            return Ok(Flow::Continue);
        };

        let signal = match action {
            UiAction::Click { row, .. } => match form.click_row(row) {
                Some(Control::Button(button)) => form.press(button),
                Some(Control::Field(idx)) if form.fields()[idx].kind == FieldKind::Checkbox => {
                    form.type_char(' ');
                    None
                }
                _ => None,
            },
            UiAction::NextField => {
                form.focus_next();
                None
            }
            UiAction::PrevField => {
                form.focus_prev();
                None
            }
            UiAction::Char(c) => {
                form.type_char(c);
                None
            }
            UiAction::Backspace => {
                form.backspace();
                None
            }
            UiAction::Paste(text) => {
                form.paste(&text);
                None
            }
            UiAction::Enter => form.activate(),
            _ => None,
        };

        match signal {
            Some(FormSignal::Complete) => {
                self.session.complete(style)?;
                self.form = None;
                if let Some(report) = self.session.report() {
                    info!(task = %report.task, "both runs finished");
                    self.last_report = Some(report);
                }
            }
            Some(FormSignal::Mistake(reason)) => {
                let count = self.session.mistake(style)?;
                debug!(%style, count, %reason, "form rejected input");
            }
            None => {}
        }
        Ok(Flow::Continue)
    }
}

fn task_for_key(c: char) -> Option<TaskType> {
    let idx = c.to_digit(10)?.checked_sub(1)? as usize;
    TaskType::ALL.get(idx).copied()
}

//! Terminal display and UI rendering
//!
//! Features:
//! - One screen per session stage
//! - Bad and good renderings of the same form
//! - Floating instruction sheet during runs
//! - Results with bar charts and the written analysis

use super::form::{Button, Control, FieldId, FieldKind, FormState, Notice};
use crate::feedback::Report;
use crate::session::Metrics;
use crate::tasks::{PresentationStyle, TaskDefinition, TaskType};
use crossterm::{
    cursor, execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{stdout, Write};

/// Width of the bar charts on the results screen
const CHART_WIDTH: usize = 40;
/// Width of the instruction panel
const PANEL_WIDTH: u16 = 38;
/// Weak, fair, strong
const STRENGTH_COLORS: [Color; 3] = [Color::Red, Color::Yellow, Color::Green];

/// Terminal display manager
pub struct Display {
    /// Whether we're using alternate screen
    use_alternate_screen: bool,
}

impl Display {
    /// Full-screen display on the alternate screen
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        execute!(stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(Display {
            use_alternate_screen: true,
        })
    }

    /// Clear screen
    pub fn clear(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        execute!(
            stdout,
            ResetColor,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        Ok(())
    }

    /// App header shown outside runs
    pub fn show_header(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Blue),
            SetAttribute(Attribute::Bold),
            Print("UI/UX Lab."),
            SetAttribute(Attribute::Reset),
            SetForegroundColor(Color::DarkGrey),
            Print("  interface design workshop\n"),
            ResetColor
        )?;
        Ok(())
    }

    /// Status bar shown during a run
    pub fn show_run_header(
        &self,
        style: PresentationStyle,
        task: &TaskDefinition,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, 0),
            SetBackgroundColor(Color::DarkGrey),
            SetForegroundColor(Color::White),
            Print(format!(
                " Mode: {} | Task: {} | MISSION IN PROGRESS | [Esc] abort ",
                style.label(),
                task.title
            )),
            ResetColor
        )?;
        Ok(())
    }

    pub fn show_intro(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(2, 3),
            SetForegroundColor(Color::Blue),
            Print("[ Hands-on lab ]"),
            cursor::MoveTo(2, 5),
            SetAttribute(Attribute::Bold),
            SetForegroundColor(Color::White),
            Print("Bad UI vs Good UI"),
            SetAttribute(Attribute::Reset),
            cursor::MoveTo(2, 6),
            SetForegroundColor(Color::Cyan),
            Print("An interactive comparison simulator"),
            ResetColor,
            cursor::MoveTo(2, 8),
            Print("Try a hard-to-use form and an easy-to-use form for the same task,"),
            cursor::MoveTo(2, 9),
            Print("then see in numbers how design changes what users do."),
        )?;
        self.show_help("[Enter] start the lab  |  [q] quit")
    }

    pub fn show_task_selection(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(2, 2),
            SetAttribute(Attribute::Bold),
            Print("Choose a task"),
            SetAttribute(Attribute::Reset),
            cursor::MoveTo(2, 3),
            SetForegroundColor(Color::DarkGrey),
            Print("Pick the kind of form you want to compare."),
            ResetColor
        )?;

        for (i, task) in TaskType::ALL.iter().enumerate() {
            let def = crate::tasks::lookup(*task);
            let row = 5 + 3 * i as u16;
            execute!(
                stdout,
                cursor::MoveTo(4, row),
                SetForegroundColor(Color::Cyan),
                Print(format!("[{}] ", i + 1)),
                ResetColor,
                SetAttribute(Attribute::Bold),
                Print(def.title),
                SetAttribute(Attribute::Reset),
                cursor::MoveTo(8, row + 1),
                SetForegroundColor(Color::DarkGrey),
                Print(def.description),
                ResetColor
            )?;
        }
        self.show_help("[1-3] choose  |  [q] quit")
    }

    pub fn show_order_selection(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(2, 2),
            SetAttribute(Attribute::Bold),
            Print("Which interface first?"),
            SetAttribute(Attribute::Reset),
            cursor::MoveTo(4, 5),
            SetForegroundColor(Color::Red),
            Print("[b] Start with the bad UI"),
            ResetColor,
            cursor::MoveTo(8, 6),
            SetForegroundColor(Color::DarkGrey),
            Print("Feel the friction first, then enjoy the improved design."),
            ResetColor,
            cursor::MoveTo(4, 8),
            SetForegroundColor(Color::Blue),
            Print("[g] Start with the good UI"),
            ResetColor,
            cursor::MoveTo(8, 9),
            SetForegroundColor(Color::DarkGrey),
            Print("See the ideal first, then feel the stress of the bad one."),
            ResetColor
        )?;
        self.show_help("[b]/[g] choose  |  [q] quit")
    }

    /// Mission sheet before a run
    pub fn show_briefing(
        &self,
        style: PresentationStyle,
        task: &TaskDefinition,
        is_first: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        let color = style_color(style);
        let half = if is_first { "first half" } else { "second half" };

        execute!(
            stdout,
            cursor::MoveTo(2, 2),
            SetForegroundColor(color),
            SetAttribute(Attribute::Bold),
            Print(style.label()),
            SetAttribute(Attribute::Reset),
            SetForegroundColor(Color::DarkGrey),
            Print(format!(" - {}", half)),
            ResetColor
        )?;

        let mut row = 4;
        if !is_first {
            let next = match style {
                PresentationStyle::Bad => "the hard-to-use design",
                PresentationStyle::Good => "the ideal design",
            };
            execute!(
                stdout,
                cursor::MoveTo(2, row),
                Print(format!("Well done! For comparison, next you will try {}.", next))
            )?;
            row += 2;
        }

        execute!(
            stdout,
            cursor::MoveTo(2, row),
            SetAttribute(Attribute::Bold),
            Print("Mission sheet"),
            SetAttribute(Attribute::Reset)
        )?;
        for (i, line) in task.instruction_text.lines().enumerate() {
            execute!(stdout, cursor::MoveTo(4, row + 1 + i as u16), Print(line))?;
        }

        let action = match style {
            PresentationStyle::Bad => "[Enter] try the bad UI",
            PresentationStyle::Good => "[Enter] try the good UI",
        };
        self.show_help(action)
    }

    /// Draw the form of the current run
    pub fn show_form(&self, form: &FormState) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        let bad = form.style() == PresentationStyle::Bad;
        let focused = form.focused();

        let banner = if bad {
            "Legacy System v1.0 - DATA ENTRY"
        } else {
            crate::tasks::lookup(form.task()).title
        };
        execute!(
            stdout,
            cursor::MoveTo(2, 2),
            SetForegroundColor(if bad { Color::DarkGrey } else { Color::White }),
            SetAttribute(Attribute::Bold),
            Print(banner),
            SetAttribute(Attribute::Reset),
            ResetColor
        )?;

        for (pos, control) in form.layout().iter().enumerate() {
            let row = FormState::row_of(pos);
            let is_focused = *control == focused;
            execute!(stdout, cursor::MoveTo(2, row))?;
            match control {
                Control::Field(idx) => {
                    let field = &form.fields()[*idx];
                    let marker = if is_focused { "> " } else { "  " };
                    let label_color = if bad { Color::DarkGrey } else { Color::White };
                    execute!(
                        stdout,
                        SetForegroundColor(if is_focused && !bad { Color::Cyan } else { label_color }),
                        Print(marker),
                        Print(format!("{:<26}", field.label)),
                        ResetColor
                    )?;
                    let shown = match field.kind {
                        FieldKind::Checkbox => {
                            if field.checked { "[x]".to_string() } else { "[ ]".to_string() }
                        }
                        FieldKind::Secret => mask(&field.value, form.is_revealed()),
                        FieldKind::Text => field.value.clone(),
                    };
                    if shown.is_empty() && !field.placeholder.is_empty() {
                        execute!(
                            stdout,
                            SetForegroundColor(if bad { Color::Black } else { Color::DarkGrey }),
                            Print(field.placeholder),
                            ResetColor
                        )?;
                    } else if bad {
                        execute!(
                            stdout,
                            SetBackgroundColor(Color::Black),
                            SetForegroundColor(Color::DarkGrey),
                            Print(shown),
                            ResetColor
                        )?;
                    } else {
                        execute!(stdout, Print(shown))?;
                    }
                    if !bad && field.id == FieldId::Password {
                        self.draw_strength_meter(field.value.chars().count())?;
                    }
                }
                Control::Button(button) => self.draw_button(*button, bad, is_focused, form.is_revealed())?,
            }
        }

        self.show_notice(form, FormState::row_of(form.layout().len()) + 1)?;

        let help = if bad {
            "Tab/arrows move  |  Enter: next/press  |  F1 instructions  |  Esc abort"
        } else {
            "Tab/arrows move  |  Enter submit  |  Space tick  |  F1 instructions  |  Esc abort"
        };
        self.show_help(help)
    }

    fn draw_strength_meter(&self, len: usize) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        execute!(stdout, Print("  "))?;
        for (lit, color) in strength_segments(len).into_iter().zip(STRENGTH_COLORS) {
            execute!(
                stdout,
                SetForegroundColor(if lit { color } else { Color::DarkGrey }),
                Print("▬▬ "),
                ResetColor
            )?;
        }
        Ok(())
    }

    fn draw_button(
        &self,
        button: Button,
        bad: bool,
        focused: bool,
        revealed: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        let marker = if focused { "> " } else { "  " };
        let (text, fg, bg) = match (button, bad) {
            // Submit looks disabled, Clear looks primary
            (Button::Submit, true) => ("Execute Submit", Color::DarkGrey, Color::Black),
            (Button::Clear, _) => ("  CLEAR FORM  ", Color::White, Color::Blue),
            (Button::Reveal, true) => ("(o)", Color::DarkGrey, Color::Black),
            (Button::Submit, false) => ("  Register  ", Color::White, Color::Blue),
            (Button::Reveal, false) if revealed => ("Hide password", Color::Cyan, Color::Reset),
            (Button::Reveal, false) => ("Show password", Color::Cyan, Color::Reset),
        };
        execute!(
            stdout,
            Print(marker),
            SetForegroundColor(fg),
            SetBackgroundColor(bg),
            Print(text),
            ResetColor
        )?;
        Ok(())
    }

    fn show_notice(&self, form: &FormState, row: u16) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        match form.notice() {
            Some(Notice::Alert(text)) => {
                execute!(
                    stdout,
                    cursor::MoveTo(2, row),
                    SetBackgroundColor(Color::Grey),
                    SetForegroundColor(Color::Black),
                    Print(format!(" ! {} ", text)),
                    ResetColor
                )?;
            }
            Some(Notice::Inline(violations)) => {
                for (i, v) in violations.iter().enumerate() {
                    execute!(
                        stdout,
                        cursor::MoveTo(2, row + i as u16),
                        SetForegroundColor(Color::Red),
                        Print(format!("x {}", v)),
                        ResetColor
                    )?;
                }
            }
            None => {}
        }
        Ok(())
    }

    /// Floating mission sheet in the top-right corner during a run
    pub fn show_instruction_panel(
        &self,
        task: &TaskDefinition,
        minimized: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        let (cols, _) = terminal::size()?;
        let left = cols.saturating_sub(PANEL_WIDTH + 1);
        let arrow = if minimized { "[+]" } else { "[-]" };

        execute!(
            stdout,
            cursor::MoveTo(left, 2),
            SetBackgroundColor(Color::DarkGrey),
            SetForegroundColor(Color::White),
            Print(format!("{:<width$}", format!(" Mission sheet {} F1", arrow), width = PANEL_WIDTH as usize)),
            ResetColor
        )?;
        if minimized {
            return Ok(());
        }

        for (i, line) in task.instruction_text.lines().enumerate() {
            execute!(
                stdout,
                cursor::MoveTo(left, 3 + i as u16),
                SetForegroundColor(Color::Yellow),
                Print(format!(" {}", line)),
                ResetColor
            )?;
        }
        Ok(())
    }

    /// Results screen: charts, analysis, restart hint
    pub fn show_results(&self, report: &Report) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(2, 2),
            SetAttribute(Attribute::Bold),
            Print("Finished! Here are your results"),
            SetAttribute(Attribute::Reset),
            cursor::MoveTo(2, 3),
            SetForegroundColor(Color::DarkGrey),
            Print(format!("Your interaction data for {}", report.title)),
            ResetColor
        )?;

        let r = &report.results;
        let secs_max = r.bad.time_taken_secs().max(r.good.time_taken_secs());
        let clicks_max = f64::from(r.bad.click_count.max(r.good.click_count));

        let mut row = 5;
        row = self.draw_chart(row, "Time to complete (s)", r, secs_max, |m| {
            (m.time_taken_secs(), format!("{:.2}", m.time_taken_secs()))
        })?;
        row = self.draw_chart(row + 1, "Clicks / operations", r, clicks_max, |m| {
            (f64::from(m.click_count), m.click_count.to_string())
        })?;

        execute!(
            stdout,
            cursor::MoveTo(2, row + 1),
            SetForegroundColor(Color::DarkGrey),
            Print(format!(
                "Mistakes: bad {}  |  good {}",
                r.bad.mistake_count, r.good.mistake_count
            )),
            ResetColor
        )?;

        execute!(
            stdout,
            cursor::MoveTo(2, row + 3),
            SetForegroundColor(Color::Magenta),
            SetAttribute(Attribute::Bold),
            Print("Analysis report"),
            SetAttribute(Attribute::Reset),
            ResetColor
        )?;
        for (i, line) in report.feedback.lines().enumerate() {
            execute!(stdout, cursor::MoveTo(2, row + 4 + i as u16), Print(line))?;
        }

        self.show_help("[r] back to the start  |  [q] quit")
    }

    fn draw_chart<F>(
        &self,
        row: u16,
        title: &str,
        results: &crate::session::ComparisonResults,
        max: f64,
        value: F,
    ) -> Result<u16, Box<dyn std::error::Error>>
    where
        F: Fn(&Metrics) -> (f64, String),
    {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(2, row),
            SetAttribute(Attribute::Bold),
            Print(title),
            SetAttribute(Attribute::Reset)
        )?;
        for (i, style) in [PresentationStyle::Bad, PresentationStyle::Good].iter().enumerate() {
            let (v, text) = value(results.get(*style));
            execute!(
                stdout,
                cursor::MoveTo(4, row + 1 + i as u16),
                Print(format!("{:<8}", style.label())),
                SetForegroundColor(style_color(*style)),
                Print(bar(v, max, CHART_WIDTH)),
                ResetColor,
                Print(format!(" {}", text))
            )?;
        }
        Ok(row + 3)
    }

    /// Show help text on the last line
    pub fn show_help(&self, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        let (_, rows) = terminal::size()?;

        execute!(
            stdout,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            SetForegroundColor(Color::DarkGrey),
            Print(text),
            ResetColor
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Reset terminal state and cleanup
    pub fn shutdown(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();

        if self.use_alternate_screen {
            execute!(stdout, LeaveAlternateScreen, cursor::Show)?;
        }

        terminal::disable_raw_mode()?;
        Ok(())
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        // Best effort cleanup
        let _ = self.shutdown();
    }
}

fn style_color(style: PresentationStyle) -> Color {
    match style {
        PresentationStyle::Bad => Color::Red,
        PresentationStyle::Good => Color::Blue,
    }
}

/// Horizontal bar scaled so `max` fills `width` cells
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round() as usize;
    "█".repeat(cells.clamp(1, width))
}

/// Lit segments of the password strength meter
pub fn strength_segments(len: usize) -> [bool; 3] {
    [len > 0, len > 4, len >= 8]
}

/// Password as shown on screen
pub fn mask(value: &str, revealed: bool) -> String {
    if revealed {
        value.to_string()
    } else {
        "*".repeat(value.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_scales_to_max() {
        assert_eq!(bar(10.0, 10.0, 40).chars().count(), 40);
        assert_eq!(bar(5.0, 10.0, 40).chars().count(), 20);
        assert_eq!(bar(0.0, 10.0, 40), "");
        assert_eq!(bar(3.0, 0.0, 40), "");
    }

    #[test]
    fn test_tiny_values_still_show() {
        assert_eq!(bar(0.01, 100.0, 40).chars().count(), 1);
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("M3@zP7$q", false), "********");
        assert_eq!(mask("M3@zP7$q", true), "M3@zP7$q");
    }

    #[test]
    fn test_strength_meter_segments() {
        assert_eq!(strength_segments(0), [false, false, false]);
        assert_eq!(strength_segments(4), [true, false, false]);
        assert_eq!(strength_segments(5), [true, true, false]);
        assert_eq!(strength_segments(7), [true, true, false]);
        assert_eq!(strength_segments(8), [true, true, true]);
    }
}

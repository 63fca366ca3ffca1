//! UI/UX Lab - bad UI vs good UI comparison in the terminal
//!
//! Single-session, in-memory, self-contained CLI application.
//! The user performs one data-entry task through a deliberately poor
//! form and a well-designed one; time, clicks and mistakes are compared.

mod app;
mod cli;
mod config;
mod feedback;
mod session;
mod tasks;

use app::{Flow, Lab};
use clap::Parser;
use cli::{Display, InputHandler};
use config::Args;
use feedback::Report;
use session::Stage;
use std::error::Error;
use tracing::{error, info};

/// Draw the screen for the current stage
fn render(display: &Display, lab: &Lab) -> Result<(), Box<dyn Error>> {
    let session = lab.session();
    display.clear()?;

    match session.stage() {
        Stage::Intro => {
            display.show_header()?;
            display.show_intro()?;
        }
        Stage::TaskSelection => {
            display.show_header()?;
            display.show_task_selection()?;
        }
        Stage::OrderSelection => {
            display.show_header()?;
            display.show_order_selection()?;
        }
        Stage::BriefingBad | Stage::BriefingGood => {
            display.show_header()?;
            if let (Some(style), Some(task)) = (session.stage().briefed_style(), session.task()) {
                display.show_briefing(style, task, session.is_first_run())?;
            }
        }
        Stage::TaskBad | Stage::TaskGood => {
            if let (Some(style), Some(task), Some(form)) =
                (session.stage().running_style(), session.task(), lab.form())
            {
                display.show_run_header(style, task)?;
                display.show_form(form)?;
                display.show_instruction_panel(task, session.instructions_minimized())?;
            }
        }
        Stage::Results => {
            display.show_header()?;
            if let Some(report) = lab.last_report() {
                display.show_results(report)?;
            }
        }
    }
    Ok(())
}

/// Event loop until the user quits
fn run(lab: &mut Lab, display: &Display, input: &InputHandler) -> Result<(), Box<dyn Error>> {
    render(display, lab)?;

    loop {
        let Some(action) = input.read_action()? else {
            continue;
        };

        let before = lab.session().stage();
        match lab.handle(action)? {
            Flow::Exit => break,
            Flow::Continue => {}
        }
        if lab.session().stage() != before {
            info!(from = %before, to = %lab.session().stage(), "screen changed");
        }
        render(display, lab)?;
    }
    Ok(())
}

/// Plain-text summary of a finished comparison
fn summary(report: &Report) -> String {
    let mut text = format!("\n🎉 Lab complete: {}\n", report.title);
    for (label, m) in [("Bad UI ", &report.results.bad), ("Good UI", &report.results.good)] {
        text.push_str(&format!(
            "📊 {} | {:.1}s | {} clicks | {} mistakes\n",
            label,
            m.time_taken_secs(),
            m.click_count,
            m.mistake_count
        ));
    }
    text.push_str(&format!("\n{}", report.feedback));
    text
}

/// What goes to stdout once the lab has closed
fn closing_output(report: Option<&Report>, json: bool) -> serde_json::Result<String> {
    Ok(match report {
        Some(report) if json => report.to_json()?,
        Some(report) => summary(report),
        None if json => "null".to_string(),
        None => "No comparison finished. Bye!".to_string(),
    })
}

/// Leave raw mode and stop mouse/paste reporting, logging any failure
fn restore_input() {
    if let Err(e) = InputHandler::disable() {
        error!(error = %e, "failed to restore terminal input");
    }
}

/// Run `undo` when a setup step failed, then pass its result on
fn undo_on_err<T, E>(result: Result<T, E>, undo: impl FnOnce()) -> Result<T, E> {
    if result.is_err() {
        undo();
    }
    result
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    config::init_logging(&args)?;
    info!(task = ?args.task, first = ?args.first, "starting UI/UX Lab");

    let mut lab = Lab::new();
    lab.preselect(args.task, args.first)?;

    // Initialize terminal
    InputHandler::enable()?;
    let display = undo_on_err(Display::new(), restore_input)?;
    let outcome = run(&mut lab, &display, &InputHandler::new());

    // Cleanup before anything is printed or an error is reported
    restore_input();
    display.shutdown()?;
    drop(display);

    if let Err(e) = &outcome {
        error!(error = %e, "lab stopped");
    }
    outcome?;

    println!("{}", closing_output(lab.last_report(), args.json)?);
    Ok(())
}

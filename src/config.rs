//! Command-line configuration and logging setup

use crate::tasks::{PresentationStyle, TaskType};
use clap::Parser;
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Filter used when logs share the terminal with the lab screen
const STDERR_DIRECTIVE: &str = "warn";

#[derive(Parser, Debug, Clone)]
#[command(name = "UI/UX Lab")]
#[command(about = "Bad UI vs good UI: run the same data-entry task through both and compare")]
pub struct Args {
    /// Skip task selection and run this mission (email, password, profile)
    #[arg(short, long)]
    pub task: Option<TaskType>,

    /// Skip order selection and start with this interface (bad, good)
    #[arg(short, long, requires = "task")]
    pub first: Option<PresentationStyle>,

    /// Print the finished comparison as JSON after leaving the lab
    #[arg(long)]
    pub json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level filter for --log-file (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Enable debug logging (needs --log-file)
    #[arg(short, long, requires = "log_file")]
    pub debug: bool,
}

impl Args {
    /// Effective filter directive before RUST_LOG is consulted
    pub fn log_directive(&self) -> &str {
        match (&self.log_file, self.debug) {
            // stderr shares the terminal with the lab screen
            (None, _) => STDERR_DIRECTIVE,
            (Some(_), true) => "debug",
            (Some(_), false) => &self.log_level,
        }
    }

    /// RUST_LOG applies only when logs go to a file
    pub fn env_filter(&self) -> Result<EnvFilter, ParseError> {
        if self.log_file.is_none() {
            return EnvFilter::try_new(STDERR_DIRECTIVE);
        }
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(self.log_directive()))
    }
}

/// Install the global tracing subscriber
pub fn init_logging(args: &Args) -> Result<(), Box<dyn Error>> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(args.env_filter()?)
        .with_target(false);

    match &args.log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| e as Box<dyn Error>)?;
        }
        None => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| e as Box<dyn Error>)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preselection() {
        let args = Args::parse_from(["uiux-lab", "--task", "profile", "--first", "good"]);
        assert_eq!(args.task, Some(TaskType::Profile));
        assert_eq!(args.first, Some(PresentationStyle::Good));
        assert!(!args.json);
    }

    #[test]
    fn test_first_requires_task() {
        assert!(Args::try_parse_from(["uiux-lab", "--first", "bad"]).is_err());
        assert!(Args::try_parse_from(["uiux-lab", "--task", "survey"]).is_err());
    }

    #[test]
    fn test_log_directive() {
        let quiet = Args::parse_from(["uiux-lab"]);
        assert_eq!(quiet.log_directive(), "warn");

        let to_file = Args::parse_from(["uiux-lab", "--log-file", "lab.log", "--log-level", "trace"]);
        assert_eq!(to_file.log_directive(), "trace");

        let debug = Args::parse_from(["uiux-lab", "-d", "--log-file", "lab.log"]);
        assert_eq!(debug.log_directive(), "debug");
    }

    #[test]
    fn test_debug_never_reaches_the_terminal() {
        assert!(Args::try_parse_from(["uiux-lab", "-d"]).is_err());

        let quiet = Args::parse_from(["uiux-lab", "--log-level", "trace"]);
        assert_eq!(quiet.log_directive(), "warn");
        // RUST_LOG is not consulted without a log file
        assert_eq!(quiet.env_filter().unwrap().to_string(), "warn");
    }
}

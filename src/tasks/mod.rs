//! Task Registry: the three data-entry missions and their ground truth
//!
//! # Components
//! - `mod.rs`: TaskType, PresentationStyle and the static task catalog
//! - `rules.rs`: Per-task input rules shared by the bad and good forms

pub mod rules;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Address the email mission asks for
pub const CANONICAL_EMAIL: &str = "taro.yamada@example.com";
/// Password the password mission asks for
pub const CANONICAL_PASSWORD: &str = "M3@zP7$q";
/// Minimum password length enforced by both forms
pub const MIN_PASSWORD_LEN: usize = 8;

/// Data-entry mission chosen for a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Email,
    Password,
    Profile,
}

impl TaskType {
    /// All missions, in the order the selection screen lists them
    pub const ALL: [TaskType; 3] = [TaskType::Email, TaskType::Password, TaskType::Profile];

    /// Stable identifier used on the command line and in exports
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Email => "email",
            TaskType::Password => "password",
            TaskType::Profile => "profile",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a task name does not match any mission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown task `{0}` (expected one of: email, password, profile)")]
pub struct ParseTaskError(String);

impl FromStr for TaskType {
    type Err = ParseTaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(TaskType::Email),
            "password" => Ok(TaskType::Password),
            "profile" => Ok(TaskType::Profile),
            _ => Err(ParseTaskError(s.to_string())),
        }
    }
}

/// Which interface variant a run uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationStyle {
    Bad,
    Good,
}

impl PresentationStyle {
    /// The style a run order pairs with this one
    pub fn other(self) -> Self {
        match self {
            PresentationStyle::Bad => PresentationStyle::Good,
            PresentationStyle::Good => PresentationStyle::Bad,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PresentationStyle::Bad => "bad",
            PresentationStyle::Good => "good",
        }
    }

    /// Human label shown in headers and charts
    pub fn label(self) -> &'static str {
        match self {
            PresentationStyle::Bad => "Bad UI",
            PresentationStyle::Good => "Good UI",
        }
    }
}

impl fmt::Display for PresentationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a style name is neither `bad` nor `good`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown interface style `{0}` (expected `bad` or `good`)")]
pub struct ParseStyleError(String);

impl FromStr for PresentationStyle {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bad" => Ok(PresentationStyle::Bad),
            "good" => Ok(PresentationStyle::Good),
            _ => Err(ParseStyleError(s.to_string())),
        }
    }
}

/// Static description of one mission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskDefinition {
    pub id: TaskType,
    pub title: &'static str,
    /// Multi-line instruction sheet, including the exact data to enter
    pub instruction_text: &'static str,
    pub description: &'static str,
}

static TASKS: [TaskDefinition; 3] = [
    TaskDefinition {
        id: TaskType::Email,
        title: "Newsletter sign-up",
        instruction_text: "Register with the following email address.\n\
                           Target: taro.yamada@example.com",
        description: "Compare email entry fields, where typos slip in easily",
    },
    TaskDefinition {
        id: TaskType::Password,
        title: "Password setup",
        instruction_text: "Set the following password.\n\
                           Password: M3@zP7$q",
        description: "Learn the balance between security and convenience",
    },
    TaskDefinition {
        id: TaskType::Profile,
        title: "User profile registration",
        instruction_text: "Enter the following details.\n\
                           Name: Yamada Taro\n\
                           Phone: 090-1234-5678\n\
                           Address: 123-4567 Tokyo, Shinjuku 1-1",
        description: "Compare forms for fixed-format data such as addresses and phone numbers",
    },
];

/// Look up the definition of a mission
pub fn lookup(task: TaskType) -> &'static TaskDefinition {
    let def = match task {
        TaskType::Email => &TASKS[0],
        TaskType::Password => &TASKS[1],
        TaskType::Profile => &TASKS[2],
    };
    debug_assert_eq!(def.id, task, "task catalog out of order");
    def
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_returns_matching_id() {
        for task in TaskType::ALL {
            assert_eq!(lookup(task).id, task);
        }
    }

    #[test]
    fn test_instructions_cite_canonical_values() {
        assert!(lookup(TaskType::Email)
            .instruction_text
            .contains(CANONICAL_EMAIL));
        assert!(lookup(TaskType::Password)
            .instruction_text
            .contains(CANONICAL_PASSWORD));
    }

    #[test]
    fn test_parse_task_type() {
        assert_eq!("Profile".parse::<TaskType>(), Ok(TaskType::Profile));
        assert!("survey".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_style_other_is_involution() {
        for style in [PresentationStyle::Bad, PresentationStyle::Good] {
            assert_ne!(style.other(), style);
            assert_eq!(style.other().other(), style);
        }
    }
}

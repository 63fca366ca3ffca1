//! Feedback: turn the two finished runs into a short written analysis
//!
//! Pure and deterministic. The same task and metrics always produce the
//! same text, so the result screen and the JSON export agree.

use crate::session::ComparisonResults;
use crate::tasks::{self, TaskType};
use serde::Serialize;

/// Seconds the bad run must exceed the good run by to count as a large gap
const LARGE_TIME_GAP_SECS: f64 = 5.0;
/// Extra clicks on the bad run before they are worth mentioning
const CLICK_GAP_THRESHOLD: i64 = 3;

pub const TIME_MARKER: &str = "[Time]";
pub const MISTAKE_MARKER: &str = "[Mistakes]";
pub const CLICK_MARKER: &str = "[Clicks]";
pub const SUMMARY_MARKER: &str = "[Summary]";

/// Which time narrative applies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeGap {
    Large,
    Moderate,
    Negligible,
}

impl TimeGap {
    pub fn classify(time_diff_secs: f64) -> Self {
        if time_diff_secs > LARGE_TIME_GAP_SECS {
            TimeGap::Large
        } else if time_diff_secs > 0.0 {
            TimeGap::Moderate
        } else {
            TimeGap::Negligible
        }
    }
}

/// Seconds the bad run took beyond the good run (negative if it was faster)
pub fn time_diff_secs(results: &ComparisonResults) -> f64 {
    (results.bad.time_taken_ms as f64 - results.good.time_taken_ms as f64) / 1000.0
}

/// Clicks the bad run needed beyond the good run
pub fn click_diff(results: &ComparisonResults) -> i64 {
    i64::from(results.bad.click_count) - i64::from(results.good.click_count)
}

/// Write the comparative analysis for a finished session
pub fn generate(task: TaskType, results: &ComparisonResults) -> String {
    let title = tasks::lookup(task).title;
    let time_diff = time_diff_secs(results);
    let clicks = click_diff(results);

    let mut out = format!("== {} analysis ==\n\n", title);

    out.push_str(&match TimeGap::classify(time_diff) {
        TimeGap::Large => format!(
            "{} The bad UI took {:.1}s longer than the good UI. A cluttered layout and \
             unclear fields slow down every decision the user has to make.\n\n",
            TIME_MARKER, time_diff
        ),
        TimeGap::Moderate => format!(
            "{} The good UI was {:.1}s faster. Well-organized information lowers the \
             mental load and keeps the user moving.\n\n",
            TIME_MARKER, time_diff
        ),
        TimeGap::Negligible => format!(
            "{} Surprisingly, the time barely differed. How did the stress level \
             compare, though?\n\n",
            TIME_MARKER
        ),
    });

    if results.bad.mistake_count > 0 {
        out.push_str(&format!(
            "{} The bad UI caused {} mistake(s). Missing input rules and confusing button \
             placement (dark patterns) wear down the user's confidence.\n\n",
            MISTAKE_MARKER, results.bad.mistake_count
        ));
    }

    if clicks > CLICK_GAP_THRESHOLD {
        out.push_str(&format!(
            "{} The bad UI needed {} more clicks. A broken tab order or tiny click targets \
             add needless operations.\n\n",
            CLICK_MARKER, clicks
        ));
    }

    out.push_str(&format!(
        "{}\nA good UI is one that does not make the user think: clear labels, helpful \
         error messages and a layout that follows the eye. With these in place anyone can \
         use the system without getting lost.",
        SUMMARY_MARKER
    ));

    out
}

/// Finished comparison as handed to the result view and the JSON export
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub task: TaskType,
    pub title: &'static str,
    pub results: ComparisonResults,
    pub feedback: String,
}

impl Report {
    pub fn new(task: TaskType, results: ComparisonResults) -> Self {
        Report {
            task,
            title: tasks::lookup(task).title,
            results,
            feedback: generate(task, &results),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Metrics;

    fn results(bad: (u64, u32, u32), good: (u64, u32, u32)) -> ComparisonResults {
        let metrics = |(time_taken_ms, click_count, mistake_count)| Metrics {
            click_count,
            time_taken_ms,
            mistake_count,
        };
        ComparisonResults {
            bad: metrics(bad),
            good: metrics(good),
        }
    }

    #[test]
    fn test_large_gap_with_mistakes_and_clicks() {
        let text = generate(
            TaskType::Email,
            &results((20_000, 10, 2), (8_000, 4, 0)),
        );
        assert!(text.starts_with("== Newsletter sign-up analysis =="));
        assert!(text.contains("took 12.0s longer"));
        assert!(text.contains("caused 2 mistake(s)"));
        assert!(text.contains("needed 6 more clicks"));
        assert!(text.contains(SUMMARY_MARKER));
        assert!(!text.contains("good UI caused"));
    }

    #[test]
    fn test_five_seconds_is_moderate() {
        let r = results((9_000, 0, 0), (4_000, 0, 0));
        assert_eq!(TimeGap::classify(time_diff_secs(&r)), TimeGap::Moderate);
        let text = generate(TaskType::Password, &r);
        assert!(text.contains("was 5.0s faster"));
        assert!(!text.contains("longer than"));
    }

    #[test]
    fn test_good_slower_is_negligible() {
        let r = results((3_000, 5, 0), (7_500, 5, 4));
        assert_eq!(TimeGap::classify(time_diff_secs(&r)), TimeGap::Negligible);
        let text = generate(TaskType::Profile, &r);
        assert!(text.contains("barely differed"));
        assert!(!text.contains(MISTAKE_MARKER));
        assert!(!text.contains(CLICK_MARKER));
    }

    #[test]
    fn test_click_gap_threshold_is_strict() {
        let at_threshold = generate(TaskType::Email, &results((0, 7, 0), (0, 4, 0)));
        assert!(!at_threshold.contains(CLICK_MARKER));
        let above = generate(TaskType::Email, &results((0, 8, 0), (0, 4, 0)));
        assert!(above.contains("needed 4 more clicks"));
    }

    #[test]
    fn test_report_json_shape() {
        let report = Report::new(TaskType::Email, results((20_000, 10, 2), (8_000, 4, 0)));
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["task"], "email");
        assert_eq!(json["results"]["bad"]["timeTakenMs"], 20_000);
        assert_eq!(json["results"]["good"]["clickCount"], 4);
        assert_eq!(json["feedback"], report.feedback.as_str());
    }

    #[test]
    fn test_generate_is_deterministic() {
        let r = results((15_250, 12, 1), (6_000, 3, 0));
        assert_eq!(generate(TaskType::Profile, &r), generate(TaskType::Profile, &r));
    }

    #[test]
    fn test_huge_durations_do_not_wrap() {
        let slow_bad = results((u64::MAX, 0, 0), (0, 0, 0));
        assert_eq!(TimeGap::classify(time_diff_secs(&slow_bad)), TimeGap::Large);
        let slow_good = results((0, 0, 0), (u64::MAX, 0, 0));
        assert_eq!(TimeGap::classify(time_diff_secs(&slow_good)), TimeGap::Negligible);
    }
}

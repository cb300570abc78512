//! Serializable results of a publisher run

use crate::finder::{BuildResult, MatchRecord, TextFinder};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// What a finder did to the build result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinderAction {
    /// The change condition did not trigger
    Unchanged,
    /// The finder's result was combined with the build result
    Combined,
    /// The finder's result replaced the build result
    Forced,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinderReport {
    pub finder: TextFinder,
    pub found: bool,
    pub action: FinderAction,
    pub result_before: BuildResult,
    pub result_after: BuildResult,
    pub files_scanned: usize,
    pub matches: Vec<MatchRecord>,
    pub matches_truncated: bool,
}

impl FinderReport {
    pub fn triggered(&self) -> bool {
        self.action != FinderAction::Unchanged
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub version: String,
    pub workspace: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_log: Option<PathBuf>,
    pub initial_result: BuildResult,
    pub final_result: BuildResult,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub finders: Vec<FinderReport>,
}

impl ScanReport {
    pub fn exit_code(&self) -> i32 {
        self.final_result.exit_code()
    }

    pub fn total_matches(&self) -> usize {
        self.finders.iter().map(|f| f.matches.len()).sum()
    }

    pub fn result_changed(&self) -> bool {
        self.initial_result != self.final_result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::MatchSource;

    fn finder_report(action: FinderAction, matches: usize) -> FinderReport {
        FinderReport {
            finder: TextFinder::new("x").unwrap(),
            found: matches > 0,
            action,
            result_before: BuildResult::Success,
            result_after: BuildResult::Success,
            files_scanned: 0,
            matches: (0..matches)
                .map(|i| MatchRecord {
                    source: MatchSource::Console,
                    line_number: i + 1,
                    line: "x".to_string(),
                })
                .collect(),
            matches_truncated: false,
        }
    }

    #[test]
    fn test_report_summary() {
        let now = Utc::now();
        let report = ScanReport {
            version: crate::VERSION.to_string(),
            workspace: PathBuf::from("/ws"),
            console_log: Some(PathBuf::from("/ws/log")),
            initial_result: BuildResult::Success,
            final_result: BuildResult::Unstable,
            started_at: now,
            finished_at: now,
            finders: vec![
                finder_report(FinderAction::Combined, 2),
                finder_report(FinderAction::Unchanged, 0),
            ],
        };

        assert_eq!(report.exit_code(), 3);
        assert_eq!(report.total_matches(), 2);
        assert!(report.result_changed());
        assert!(report.finders[0].triggered());
        assert!(!report.finders[1].triggered());
    }
}

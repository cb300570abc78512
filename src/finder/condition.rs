use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// When a finder changes the build result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeCondition {
    #[default]
    MatchFound,
    MatchNotFound,
}

impl ChangeCondition {
    pub const ALL: [ChangeCondition; 2] =
        [ChangeCondition::MatchFound, ChangeCondition::MatchNotFound];

    pub fn description(&self) -> &'static str {
        match self {
            ChangeCondition::MatchFound => "Change the build result if a match is found",
            ChangeCondition::MatchNotFound => "Change the build result if a match is not found",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeCondition::MatchFound => "MATCH_FOUND",
            ChangeCondition::MatchNotFound => "MATCH_NOT_FOUND",
        }
    }

    /// Whether the build result should change given the search outcome
    pub fn triggers(&self, found: bool) -> bool {
        match self {
            ChangeCondition::MatchFound => found,
            ChangeCondition::MatchNotFound => !found,
        }
    }
}

impl fmt::Display for ChangeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        ChangeCondition::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| {
                format!(
                    "Invalid change condition: {}. Valid options: MATCH_FOUND, MATCH_NOT_FOUND",
                    s
                )
            })
    }
}

//! Text finder rule definition

use super::condition::ChangeCondition;
use super::result::BuildResult;
use regex::Regex;
use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinderError {
    #[error("Unable to compile regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },
}

/// Outcome of validating a regular expression typed by a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexCheck {
    Ok,
    Error(String),
}

impl RegexCheck {
    pub fn is_ok(&self) -> bool {
        matches!(self, RegexCheck::Ok)
    }
}

/// Checks that a regular expression compiles
///
/// A blank value is accepted since the user has not entered anything yet.
pub fn check_regexp(value: &str) -> RegexCheck {
    if value.trim().is_empty() {
        return RegexCheck::Ok;
    }
    match Regex::new(value) {
        Ok(_) => RegexCheck::Ok,
        Err(e) => RegexCheck::Error(e.to_string()),
    }
}

/// A single search rule: what to look for, where, and what to do about it
#[derive(Debug, Clone, Serialize)]
pub struct TextFinder {
    #[serde(serialize_with = "serialize_regex")]
    regexp: Regex,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_set: Option<String>,
    build_result: BuildResult,
    change_condition: ChangeCondition,
    also_check_console_output: bool,
    allow_forced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

fn serialize_regex<S: Serializer>(regex: &Regex, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(regex.as_str())
}

impl TextFinder {
    pub fn new(regexp: &str) -> Result<Self, FinderError> {
        let regexp = Regex::new(regexp).map_err(|e| FinderError::InvalidRegex {
            pattern: regexp.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            regexp,
            file_set: None,
            build_result: BuildResult::default(),
            change_condition: ChangeCondition::default(),
            also_check_console_output: false,
            allow_forced: false,
            description: None,
        })
    }

    pub fn with_file_set(mut self, file_set: Option<&str>) -> Self {
        self.file_set = file_set
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_build_result(mut self, build_result: BuildResult) -> Self {
        self.build_result = build_result;
        self
    }

    pub fn with_change_condition(mut self, change_condition: ChangeCondition) -> Self {
        self.change_condition = change_condition;
        self
    }

    pub fn with_also_check_console_output(mut self, enabled: bool) -> Self {
        self.also_check_console_output = enabled;
        self
    }

    pub fn with_allow_forced(mut self, allow_forced: bool) -> Self {
        self.allow_forced = allow_forced;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn regexp(&self) -> &str {
        self.regexp.as_str()
    }

    pub fn pattern(&self) -> &Regex {
        &self.regexp
    }

    pub fn file_set(&self) -> Option<&str> {
        self.file_set.as_deref()
    }

    pub fn build_result(&self) -> BuildResult {
        self.build_result
    }

    pub fn change_condition(&self) -> ChangeCondition {
        self.change_condition
    }

    pub fn also_check_console_output(&self) -> bool {
        self.also_check_console_output
    }

    pub fn allow_forced(&self) -> bool {
        self.allow_forced
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Label used in logs: the description when present, else the pattern
    pub fn label(&self) -> &str {
        self.description().unwrap_or_else(|| self.regexp())
    }
}

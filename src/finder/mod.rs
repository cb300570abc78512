//! Text finder rules and the machinery to evaluate them
//!
//! - [`TextFinder`]: a search rule (pattern, file set, result to apply)
//! - [`BuildResult`] / [`ChangeCondition`]: what a rule does when it fires
//! - [`FileSet`]: Ant-style include patterns over a workspace
//! - [`PatternScanner`]: line-oriented scanning of files and console logs

pub mod condition;
pub mod fileset;
pub mod model;
pub mod result;
pub mod scanner;

pub use condition::ChangeCondition;
pub use fileset::{FileSet, FileSetError};
pub use model::{check_regexp, FinderError, RegexCheck, TextFinder};
pub use result::{BuildResult, ResultParseError, EXIT_USAGE_ERROR};
pub use scanner::{MatchRecord, MatchSource, PatternScanner, ScanOutcome};

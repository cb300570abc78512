//! text-finder - search build output and workspace files to set a build result
//!
//! A build has a workspace, a console log and a current result. A
//! [`TextFinder`] searches the console log and/or an Ant-style file set of the
//! workspace for a regular expression; when its [`ChangeCondition`] holds, the
//! finder applies its [`BuildResult`] to the build. Results only get worse
//! unless the finder is allowed to force them.
//!
//! # Example Usage
//!
//! ```no_run
//! use text_finder::{Build, BuildResult, TextFinder, TextFinderPublisher};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let finder = TextFinder::new("BUILD FAILED")?
//!     .with_file_set(Some("**/*.log"))
//!     .with_build_result(BuildResult::Unstable);
//!
//! let mut build = Build::new(PathBuf::from("/var/ci/workspace"));
//! let report = TextFinderPublisher::new(vec![finder]).perform(&mut build).await?;
//! println!("Build result: {}", report.final_result);
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`finder`]: finder rules, results, file sets and scanning
//! - [`publisher`]: runs finders against a [`Build`]
//! - [`progress`]: transcript and log listeners
//! - [`job`]: declarative job files

pub mod build;
pub mod cli;
pub mod config;
pub mod finder;
pub mod job;
pub mod progress;
pub mod publisher;
pub mod report;
pub mod util;

pub use build::Build;
pub use config::{ConfigError, TextFinderConfig};
pub use finder::{
    check_regexp, BuildResult, ChangeCondition, FileSet, FileSetError, FinderError, RegexCheck,
    TextFinder,
};
pub use job::{Job, JobError};
pub use progress::{ScanEvent, ScanListener};
pub use publisher::{PublishError, PublisherOptions, TextFinderPublisher};
pub use report::{FinderAction, FinderReport, ScanReport};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CheckRegexpArgs, CliArgs, Commands, ConfigArgs, OutputFormatArg, ScanArgs};
pub use output::{OutputFormat, OutputFormatter};

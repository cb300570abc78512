use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::finder::{BuildResult, ChangeCondition};

/// Search build console output and workspace files for a regular expression
#[derive(Parser, Debug)]
#[command(
    name = "text-finder",
    about = "Search build console output and workspace files for a regular expression",
    version,
    long_about = "text-finder runs text finders against a build: each finder searches the \
                  build's console log and/or a set of workspace files for a regular \
                  expression and changes the build result when the condition holds. \
                  The process exits with the code of the final build result."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress the transcript and non-error logs"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run text finders against a build",
        long_about = "Runs the finder given by flags first, then every finder of the job file.\n\n\
                      Exit codes: 0 SUCCESS, 1 FAILURE, 3 UNSTABLE, 4 NOT_BUILT, 5 ABORTED, \
                      2 usage or configuration error.\n\n\
                      Examples:\n  \
                      text-finder scan --regexp ERROR --file-set '**/*.log'\n  \
                      text-finder scan --regexp 'BUILD FAILED' --also-check-console-output --console-log build.log\n  \
                      text-finder scan --job text-finder.yml --format json"
    )]
    Scan(ScanArgs),

    #[command(
        about = "Check that a regular expression compiles",
        long_about = "Prints OK when the expression compiles (or is blank), otherwise the \
                      compiler's error. Exits with 0 or 1.\n\n\
                      Examples:\n  \
                      text-finder check-regexp '^ERROR:'"
    )]
    CheckRegexp(CheckRegexpArgs),

    #[command(about = "List the build results a finder can apply")]
    Results,

    #[command(about = "Show the configuration loaded from the environment")]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    #[arg(
        short = 'r',
        long,
        value_name = "REGEX",
        help = "Regular expression to search for"
    )]
    pub regexp: Option<String>,

    #[arg(
        long,
        value_name = "PATTERNS",
        requires = "regexp",
        help = "Ant-style file set to scan, relative to the workspace (e.g. '**/*.log, out.txt')"
    )]
    pub file_set: Option<String>,

    #[arg(
        long,
        value_name = "RESULT",
        requires = "regexp",
        value_parser = parse_build_result,
        help = "Build result to apply (SUCCESS, UNSTABLE, FAILURE, NOT_BUILT, ABORTED)"
    )]
    pub build_result: Option<BuildResult>,

    #[arg(
        long,
        value_name = "CONDITION",
        requires = "regexp",
        value_parser = parse_change_condition,
        help = "When to change the result (MATCH_FOUND, MATCH_NOT_FOUND)"
    )]
    pub change_condition: Option<ChangeCondition>,

    #[arg(long, requires = "regexp", help = "Also search the console log")]
    pub also_check_console_output: bool,

    #[arg(
        long,
        requires = "regexp",
        help = "Set the result unconditionally, even if it improves the build"
    )]
    pub allow_forced: bool,

    #[arg(
        short = 'j',
        long,
        value_name = "FILE",
        help = "Job file (.yaml, .yml, .toml or .json) declaring finders"
    )]
    pub job: Option<PathBuf>,

    #[arg(
        short = 'w',
        long,
        value_name = "DIR",
        help = "Workspace directory (overrides job file and TEXT_FINDER_WORKSPACE)"
    )]
    pub workspace: Option<PathBuf>,

    #[arg(
        short = 'c',
        long,
        value_name = "FILE",
        help = "Console log of the build (overrides job file and TEXT_FINDER_CONSOLE_LOG)"
    )]
    pub console_log: Option<PathBuf>,

    #[arg(
        long,
        value_name = "RESULT",
        value_parser = parse_build_result,
        help = "Build result before the finders run (default SUCCESS)"
    )]
    pub initial_result: Option<BuildResult>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the report to file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Append the transcript to the console log")]
    pub append_transcript: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CheckRegexpArgs {
    #[arg(value_name = "REGEX", help = "Regular expression to check")]
    pub value: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_build_result(s: &str) -> Result<BuildResult, String> {
    BuildResult::parse_or_default(Some(s)).map_err(|e| e.to_string())
}

fn parse_change_condition(s: &str) -> Result<ChangeCondition, String> {
    s.parse()
}

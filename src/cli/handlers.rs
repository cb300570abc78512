//! Command handlers; each returns the process exit code

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::commands::{CheckRegexpArgs, ConfigArgs, ScanArgs};
use super::output::OutputFormatter;
use crate::build::Build;
use crate::config::TextFinderConfig;
use crate::finder::{check_regexp, BuildResult, RegexCheck, TextFinder, EXIT_USAGE_ERROR};
use crate::job::Job;
use crate::progress::{CompositeListener, ConsoleListener, LoggingListener};
use crate::publisher::TextFinderPublisher;

pub async fn handle_scan(args: &ScanArgs, quiet: bool) -> i32 {
    match run_scan(args, quiet).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            EXIT_USAGE_ERROR
        }
    }
}

/// Finder built from the `scan` flags, if `--regexp` was given
fn finder_from_args(args: &ScanArgs) -> Result<Option<TextFinder>> {
    let Some(regexp) = args.regexp.as_deref() else {
        return Ok(None);
    };

    let finder = TextFinder::new(regexp)?
        .with_file_set(args.file_set.as_deref())
        .with_build_result(args.build_result.unwrap_or_default())
        .with_change_condition(args.change_condition.unwrap_or_default())
        .with_also_check_console_output(args.also_check_console_output)
        .with_allow_forced(args.allow_forced);
    Ok(Some(finder))
}

/// Flags win over the job file, which wins over the environment
fn resolve_build(args: &ScanArgs, job: Option<&Job>, config: &TextFinderConfig) -> Build {
    let workspace = args
        .workspace
        .clone()
        .or_else(|| job.and_then(|j| j.workspace.clone()))
        .unwrap_or_else(|| config.workspace.clone());
    let console_log: Option<PathBuf> = args
        .console_log
        .clone()
        .or_else(|| job.and_then(|j| j.console_log.clone()))
        .or_else(|| config.console_log.clone());
    let initial_result = args
        .initial_result
        .or_else(|| job.and_then(|j| j.initial_result))
        .unwrap_or(BuildResult::Success);

    Build::new(workspace)
        .with_console_log(console_log)
        .with_result(initial_result)
}

async fn run_scan(args: &ScanArgs, quiet: bool) -> Result<i32> {
    let config = TextFinderConfig::from_env()?;
    config.validate()?;

    let job = args
        .job
        .as_deref()
        .map(Job::load)
        .transpose()
        .context("Failed to load job file")?;

    let mut finders: Vec<TextFinder> = finder_from_args(args)?.into_iter().collect();
    if let Some(ref job) = job {
        finders.extend(job.finders.iter().cloned());
    }
    if finders.is_empty() {
        bail!("No text finders configured. Pass --regexp or a --job file with text_finders");
    }

    let mut build = resolve_build(args, job.as_ref(), &config);
    debug!(
        workspace = %build.workspace().display(),
        console_log = ?build.console_log(),
        job = ?args.job,
        "Resolved build"
    );

    let mut listener = CompositeListener::new().with(Arc::new(LoggingListener));
    if !quiet {
        listener = listener.with(Arc::new(ConsoleListener::stderr()));
    }
    if args.append_transcript {
        let Some(log) = build.console_log() else {
            bail!("--append-transcript needs a console log (--console-log, job file or TEXT_FINDER_CONSOLE_LOG)");
        };
        let appender = ConsoleListener::append_to(log).with_context(|| {
            format!("Failed to open console log {} for appending", log.display())
        })?;
        listener = listener.with(Arc::new(appender));
    }

    let report = TextFinderPublisher::new(finders)
        .with_options(config.publisher_options())
        .with_listener(Arc::new(listener))
        .perform(&mut build)
        .await?;

    let formatter = OutputFormatter::new(args.format.into());
    let output = formatter.format(&report)?;
    write_output(&output, args.output.as_ref())?;

    debug!(
        final_result = %report.final_result,
        exit_code = report.exit_code(),
        "Scan finished"
    );
    Ok(report.exit_code())
}

fn write_output(output: &str, path: Option<&PathBuf>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .context("Failed to write output")?;
            if !output.ends_with('\n') {
                stdout.write_all(b"\n").context("Failed to write output")?;
            }
        }
    }
    Ok(())
}

pub fn handle_check_regexp(args: &CheckRegexpArgs) -> i32 {
    match check_regexp(&args.value) {
        RegexCheck::Ok => {
            println!("OK");
            0
        }
        RegexCheck::Error(message) => {
            println!("{}", message);
            1
        }
    }
}

pub fn handle_results() -> i32 {
    for result in BuildResult::ALL {
        println!("{}", result);
    }
    0
}

pub fn handle_config(args: &ConfigArgs) -> i32 {
    let config = match TextFinderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_USAGE_ERROR;
        }
    };

    let valid = match config.validate() {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Error: {}", e);
            false
        }
    };

    match OutputFormatter::new(args.format.into()).format_config(&config) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return EXIT_USAGE_ERROR;
        }
    }

    if valid {
        0
    } else {
        EXIT_USAGE_ERROR
    }
}

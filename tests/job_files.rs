//! Job file loading from disk

use std::fs;
use tempfile::TempDir;
use text_finder::{BuildResult, ChangeCondition, Job, JobError};
use yare::parameterized;

#[parameterized(
    yaml = { "job.yaml", "console_log: build.log\ntext_finders:\n  - regexp: ERROR\n    build_result: unstable\n" },
    yml = { "job.yml", "console_log: build.log\ntext_finders:\n  - regexp: ERROR\n    build_result: unstable\n" },
    toml = { "job.toml", "console_log = \"build.log\"\n\n[[text_finders]]\nregexp = \"ERROR\"\nbuild_result = \"UNSTABLE\"\n" },
    json = { "job.json", r#"{"console_log": "build.log", "text_finders": [{"regexp": "ERROR", "build_result": "Unstable"}]}"# },
)]
fn test_load_each_format(file_name: &str, content: &str) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(file_name);
    fs::write(&path, content).unwrap();

    let job = Job::load(&path).unwrap();

    assert_eq!(job.console_log, Some(dir.path().join("build.log")));
    assert!(job.workspace.is_none());
    assert_eq!(job.finders.len(), 1);
    assert_eq!(job.finders[0].regexp(), "ERROR");
    assert_eq!(job.finders[0].build_result(), BuildResult::Unstable);
}

#[test]
fn test_legacy_job_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.yml");
    fs::write(
        &path,
        "text_finders:\n  - regexp: 'Tests passed'\n    also_check_console_output: true\n    succeed_if_found: true\n    unstable_if_found: true\n",
    )
    .unwrap();

    let job = Job::load(&path).unwrap();
    let finder = &job.finders[0];

    assert_eq!(finder.change_condition(), ChangeCondition::MatchNotFound);
    assert_eq!(finder.build_result(), BuildResult::Unstable);
    assert!(finder.also_check_console_output());
}

#[test]
fn test_missing_job_file() {
    let dir = TempDir::new().unwrap();
    let err = Job::load(&dir.path().join("absent.yml")).unwrap_err();
    assert!(matches!(err, JobError::Read { .. }));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("job.xml");
    fs::write(&path, "<job/>").unwrap();

    let err = Job::load(&path).unwrap_err();
    assert!(matches!(err, JobError::UnsupportedFormat(_)));
}

#[test]
fn test_parse_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = Job::load(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
}

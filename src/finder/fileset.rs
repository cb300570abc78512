//! Ant-style file sets
//!
//! A file set is a list of include patterns separated by commas or whitespace,
//! e.g. `"**/*.log, reports/summary.txt"`. Patterns are matched segment by
//! segment against workspace-relative paths:
//!
//! - `*` and `?` match within a single path segment; every other character,
//!   brackets included, matches itself
//! - `**` matches zero or more whole segments
//! - a trailing `/` is shorthand for `/**`
//!
//! Version control metadata and editor backup files are always excluded.

use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace, warn};

const SEGMENT_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Directories never descended into
const DEFAULT_EXCLUDED_DIRS: &[&str] = &[".git", ".svn", ".hg", ".bzr", "CVS", "SCCS"];

/// File names never reported
const DEFAULT_EXCLUDED_FILES: &[&str] = &[
    "*~",
    "#*#",
    ".#*",
    "%*%",
    "._*",
    ".DS_Store",
    ".cvsignore",
    "vssver.scc",
    ".gitattributes",
    ".gitignore",
    ".gitmodules",
    ".hgignore",
    ".hgsub",
    ".hgsubstate",
    ".hgtags",
    ".bzrignore",
];

#[derive(Debug, Error)]
pub enum FileSetError {
    #[error("File set '{0}' does not contain any pattern")]
    Empty(String),
    #[error("Invalid file set pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("Workspace does not exist: {0}")]
    WorkspaceNotFound(PathBuf),
    #[error("Workspace is not a directory: {0}")]
    NotADirectory(PathBuf),
}

#[derive(Debug, Clone)]
enum Segment {
    AnyDirs,
    Name(Pattern),
}

/// One include pattern, split into path segments
#[derive(Debug, Clone)]
struct AntPattern {
    source: String,
    segments: Vec<Segment>,
}

impl AntPattern {
    fn parse(raw: &str) -> Result<Self, FileSetError> {
        let mut normalized = raw.replace('\\', "/");
        while let Some(rest) = normalized.strip_prefix("./") {
            normalized = rest.to_string();
        }
        let normalized = normalized.trim_start_matches('/');
        let normalized = if normalized.ends_with('/') {
            format!("{}**", normalized)
        } else {
            normalized.to_string()
        };

        let mut segments: Vec<Segment> = Vec::new();
        for part in normalized.split('/').filter(|p| !p.is_empty()) {
            if part == "**" {
                if !matches!(segments.last(), Some(Segment::AnyDirs)) {
                    segments.push(Segment::AnyDirs);
                }
                continue;
            }
            let glob = segment_glob(part);
            let pattern = Pattern::new(&glob).map_err(|e| FileSetError::InvalidPattern {
                pattern: raw.to_string(),
                message: e.to_string(),
            })?;
            segments.push(Segment::Name(pattern));
        }

        if segments.is_empty() {
            return Err(FileSetError::InvalidPattern {
                pattern: raw.to_string(),
                message: "pattern does not name any path".to_string(),
            });
        }

        Ok(Self {
            source: raw.to_string(),
            segments,
        })
    }

    fn matches(&self, path: &[&str]) -> bool {
        match_segments(&self.segments, path)
    }
}

/// Glob for one segment where only `*` and `?` are wildcards
///
/// Everything else, brackets included, matches literally. A run of stars
/// inside a segment (`**.log`) is a single `*`.
fn segment_glob(part: &str) -> String {
    let mut glob = String::with_capacity(part.len());
    let mut literal = String::new();
    let mut after_star = false;
    for c in part.chars() {
        if c != '*' && c != '?' {
            literal.push(c);
            after_star = false;
            continue;
        }
        glob.push_str(&Pattern::escape(&literal));
        literal.clear();
        if c == '?' {
            glob.push('?');
            after_star = false;
        } else if !after_star {
            glob.push('*');
            after_star = true;
        }
    }
    glob.push_str(&Pattern::escape(&literal));
    glob
}

fn match_segments(segments: &[Segment], path: &[&str]) -> bool {
    match segments.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyDirs, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((Segment::Name(pattern), rest)) => match path.split_first() {
            Some((head, tail)) => {
                pattern.matches_with(head, SEGMENT_MATCH_OPTIONS) && match_segments(rest, tail)
            }
            None => false,
        },
    }
}

/// Splits a relative path into its normal components
fn path_segments(path: &Path) -> Option<Vec<&str>> {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect()
}

fn is_default_excluded_file(name: &str) -> bool {
    DEFAULT_EXCLUDED_FILES.iter().any(|p| {
        Pattern::new(p)
            .map(|pattern| pattern.matches_with(name, SEGMENT_MATCH_OPTIONS))
            .unwrap_or(false)
    })
}

/// A set of include patterns evaluated against a workspace
#[derive(Debug, Clone)]
pub struct FileSet {
    raw: String,
    includes: Vec<AntPattern>,
    follow_links: bool,
}

impl FileSet {
    pub fn parse(includes_text: &str) -> Result<Self, FileSetError> {
        let includes = includes_text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(AntPattern::parse)
            .collect::<Result<Vec<_>, _>>()?;

        if includes.is_empty() {
            return Err(FileSetError::Empty(includes_text.to_string()));
        }

        Ok(Self {
            raw: includes_text.to_string(),
            includes,
            follow_links: false,
        })
    }

    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.includes.iter().map(|p| p.source.as_str())
    }

    /// Whether a workspace-relative path is selected by this set
    pub fn matches(&self, relative: &Path) -> bool {
        let Some(segments) = path_segments(relative) else {
            return false;
        };
        if segments.is_empty() {
            return false;
        }
        if segments[..segments.len() - 1]
            .iter()
            .any(|dir| DEFAULT_EXCLUDED_DIRS.contains(dir))
        {
            return false;
        }
        if let Some(name) = segments.last() {
            if DEFAULT_EXCLUDED_DIRS.contains(name) || is_default_excluded_file(name) {
                return false;
            }
        }
        self.includes.iter().any(|p| p.matches(&segments))
    }

    /// Lists the regular files under `base` selected by this set
    ///
    /// Paths are relative to `base` and sorted.
    pub fn scan(&self, base: &Path) -> Result<Vec<PathBuf>, FileSetError> {
        if !base.exists() {
            return Err(FileSetError::WorkspaceNotFound(base.to_path_buf()));
        }
        if !base.is_dir() {
            return Err(FileSetError::NotADirectory(base.to_path_buf()));
        }

        debug!(
            workspace = %base.display(),
            file_set = %self.raw,
            follow_links = self.follow_links,
            "Scanning file set"
        );

        let mut files = Vec::new();
        for result in WalkBuilder::new(base)
            .standard_filters(false)
            .follow_links(self.follow_links)
            .filter_entry(|entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                !(is_dir
                    && entry
                        .file_name()
                        .to_str()
                        .map(|name| DEFAULT_EXCLUDED_DIRS.contains(&name))
                        .unwrap_or(false))
            })
            .build()
        {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            let relative = match entry.path().strip_prefix(base) {
                Ok(r) => r.to_path_buf(),
                Err(_) => continue,
            };

            if self.matches(&relative) {
                trace!(path = %relative.display(), "File selected");
                files.push(relative);
            }
        }

        files.sort();
        debug!(files = files.len(), file_set = %self.raw, "File set scanned");
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "content\n").unwrap();
    }

    #[test]
    fn test_parse_splits_on_commas_and_whitespace() {
        let set = FileSet::parse("**/*.log, out.txt  reports/").unwrap();
        let patterns: Vec<_> = set.patterns().collect();
        assert_eq!(patterns, vec!["**/*.log", "out.txt", "reports/"]);
    }

    #[test]
    fn test_parse_empty_rejected() {
        assert!(matches!(FileSet::parse(" , "), Err(FileSetError::Empty(_))));
    }

    #[test]
    fn test_brackets_match_literally() {
        let set = FileSet::parse("report[1].txt").unwrap();
        assert!(set.matches(Path::new("report[1].txt")));
        assert!(!set.matches(Path::new("report1.txt")));

        let set = FileSet::parse("logs/[a-").unwrap();
        assert!(set.matches(Path::new("logs/[a-")));
        assert!(!set.matches(Path::new("logs/a")));
    }

    #[test]
    fn test_double_star_inside_segment_is_single_star() {
        let set = FileSet::parse("**.log").unwrap();
        assert!(set.matches(Path::new("build.log")));
        assert!(!set.matches(Path::new("nested/build.log")));

        let set = FileSet::parse("logs/a**b?.txt").unwrap();
        assert!(set.matches(Path::new("logs/a-xyz-b1.txt")));
        assert!(!set.matches(Path::new("logs/a/b1.txt")));
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let set = FileSet::parse("*.txt").unwrap();
        assert!(set.matches(Path::new("out.txt")));
        assert!(!set.matches(Path::new("nested/out.txt")));
    }

    #[test]
    fn test_double_star_matches_zero_or_more_dirs() {
        let set = FileSet::parse("**/*.log").unwrap();
        assert!(set.matches(Path::new("build.log")));
        assert!(set.matches(Path::new("a/b/c/build.log")));
        assert!(!set.matches(Path::new("a/build.txt")));

        let set = FileSet::parse("src/**/test/*.xml").unwrap();
        assert!(set.matches(Path::new("src/test/a.xml")));
        assert!(set.matches(Path::new("src/main/java/test/a.xml")));
        assert!(!set.matches(Path::new("other/test/a.xml")));
    }

    #[test]
    fn test_trailing_slash_selects_everything_below() {
        let set = FileSet::parse("reports/").unwrap();
        assert!(set.matches(Path::new("reports/a.txt")));
        assert!(set.matches(Path::new("reports/deep/b.txt")));
        assert!(!set.matches(Path::new("other/a.txt")));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let set = FileSet::parse("OUT.txt").unwrap();
        assert!(!set.matches(Path::new("out.txt")));
    }

    #[test]
    fn test_default_excludes() {
        let set = FileSet::parse("**").unwrap();
        assert!(set.matches(Path::new("src/main.rs")));
        assert!(!set.matches(Path::new(".git/config")));
        assert!(!set.matches(Path::new("module/.svn/entries")));
        assert!(!set.matches(Path::new("notes.txt~")));
        assert!(!set.matches(Path::new("dir/.DS_Store")));
    }

    #[test]
    fn test_scan_returns_sorted_relative_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.log");
        touch(dir.path(), "a.log");
        touch(dir.path(), "nested/c.log");
        touch(dir.path(), "nested/skip.txt");
        touch(dir.path(), ".git/HEAD.log");

        let set = FileSet::parse("**/*.log").unwrap();
        let files = set.scan(dir.path()).unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("a.log"),
                PathBuf::from("b.log"),
                PathBuf::from("nested/c.log"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_followed_only_when_enabled() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "real/a.log");
        symlink(dir.path().join("real/a.log"), dir.path().join("alias.log")).unwrap();
        symlink(dir.path().join("real"), dir.path().join("linked")).unwrap();

        let set = FileSet::parse("**/*.log").unwrap();
        assert_eq!(
            set.scan(dir.path()).unwrap(),
            vec![PathBuf::from("real/a.log")]
        );

        let set = set.with_follow_links(true);
        assert_eq!(
            set.scan(dir.path()).unwrap(),
            vec![
                PathBuf::from("alias.log"),
                PathBuf::from("linked/a.log"),
                PathBuf::from("real/a.log"),
            ]
        );
    }

    #[test]
    fn test_scan_missing_workspace() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let set = FileSet::parse("*.log").unwrap();
        assert!(matches!(
            set.scan(&missing),
            Err(FileSetError::WorkspaceNotFound(_))
        ));
    }

    #[test]
    fn test_scan_no_matches_is_empty() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "readme.md");
        let set = FileSet::parse("*.log").unwrap();
        assert!(set.scan(dir.path()).unwrap().is_empty());
    }
}

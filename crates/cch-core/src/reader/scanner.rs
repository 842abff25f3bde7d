//! Archive discovery.
//!
//! Walks `projects/` in directory order, reads every session file, applies
//! the path, date and session-count filters, and optionally attaches todo
//! lists from `todos/`. Per-file failures are collected as diagnostics and the
//! scan continues; only a missing archive or `projects/` directory is fatal.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::filter::{DateRange, ProjectFilter, SessionBudget};
use crate::project::{Project, decode_project_path};
use crate::reader::jsonl::read_session_with_warnings;
use crate::reader::todos::{parse_todo_filename, read_todo_list};
use crate::todo::TodoList;

const PROJECTS_DIR: &str = "projects";
const TODOS_DIR: &str = "todos";
const CLAUDE_MD: &str = "CLAUDE.md";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("archive directory not found: {0}")]
    RootNotFound(PathBuf),
    #[error("projects directory not found: {0}")]
    ProjectsNotFound(PathBuf),
    #[error("failed to read projects directory {path}: {source}")]
    ProjectsUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read CLAUDE.md: {0}")]
    ClaudeMd(#[source] io::Error),
}

/// A recoverable problem encountered while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: PathBuf,
    /// Set for per-line problems inside a session file.
    pub line: Option<usize>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}: {}", self.path.display(), self.message),
            None => write!(f, "{}: {}", self.path.display(), self.message),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Keep sessions ending at or after this instant.
    pub start: Option<DateTime<Utc>>,
    /// Keep sessions ending at or before this instant.
    pub end: Option<DateTime<Utc>>,
    /// Substrings matched against decoded project paths; empty keeps all.
    pub project_paths: Vec<String>,
    pub include_todos: bool,
    /// Global cap on retained sessions; 0 is unlimited.
    pub max_sessions: usize,
}

#[derive(Debug, Default)]
pub struct ScanResult {
    pub projects: Vec<Project>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scanner over a Claude Code data directory (usually `~/.claude`).
pub struct Scanner {
    base: PathBuf,
    filter: ProjectFilter,
    range: DateRange,
    include_todos: bool,
    max_sessions: usize,
}

impl Scanner {
    pub fn new(base: impl Into<PathBuf>, options: ScanOptions) -> Self {
        Self {
            base: base.into(),
            filter: ProjectFilter::new(options.project_paths),
            range: DateRange::new(options.start, options.end),
            include_todos: options.include_todos,
            max_sessions: options.max_sessions,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Scan projects, dropping diagnostics.
    pub fn scan_projects(&self) -> Result<Vec<Project>, ScanError> {
        self.scan().map(|result| result.projects)
    }

    pub fn scan(&self) -> Result<ScanResult, ScanError> {
        if !self.base.is_dir() {
            return Err(ScanError::RootNotFound(self.base.clone()));
        }
        let projects_dir = self.base.join(PROJECTS_DIR);
        if !projects_dir.is_dir() {
            return Err(ScanError::ProjectsNotFound(projects_dir));
        }
        let entries =
            fs::read_dir(&projects_dir).map_err(|source| ScanError::ProjectsUnreadable {
                path: projects_dir.clone(),
                source,
            })?;

        let mut result = ScanResult::default();
        let mut budget = SessionBudget::new(self.max_sessions);
        // Shared by every project, so read once.
        let mut todo_lists: Option<Vec<TodoList>> = None;

        for entry in readable_entries(entries, &projects_dir, &mut result.diagnostics) {
            let project_dir = entry.path();
            if !project_dir.is_dir() {
                continue;
            }
            let Some(encoded) = project_dir.file_name().and_then(|n| n.to_str()) else {
                tracing::debug!(path = ?project_dir, "skipping non UTF-8 project directory");
                continue;
            };
            if !self.filter.matches(&decode_project_path(encoded)) {
                tracing::debug!(project = encoded, "project filtered out");
                continue;
            }

            let mut project = Project::new(encoded);
            if let Err(e) =
                self.scan_sessions(&project_dir, &mut project, &mut budget, &mut result.diagnostics)
            {
                push_diagnostic(&mut result.diagnostics, &project_dir, &e);
                continue;
            }

            if budget.is_exhausted() {
                tracing::debug!(sessions = budget.used(), "session limit reached");
                result.projects.push(project);
                return Ok(result);
            }

            if self.include_todos {
                let lists =
                    todo_lists.get_or_insert_with(|| self.scan_todos(&mut result.diagnostics));
                for todo_list in lists.iter() {
                    project.add_todo_list(todo_list.clone());
                }
            }

            if project.session_count() > 0 {
                result.projects.push(project);
            }
        }

        Ok(result)
    }

    /// Read the session files of one project, stopping once the budget runs out.
    fn scan_sessions(
        &self,
        project_dir: &Path,
        project: &mut Project,
        budget: &mut SessionBudget,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> io::Result<()> {
        let entries = fs::read_dir(project_dir)?;
        for entry in readable_entries(entries, project_dir, diagnostics) {
            let path = entry.path();
            if !path.is_file() || !path.extension().is_some_and(|e| e == "jsonl") {
                continue;
            }

            let session = match read_session_with_warnings(&path) {
                Ok((session, warnings)) => {
                    diagnostics.extend(warnings.into_iter().map(|w| Diagnostic {
                        path: path.clone(),
                        line: Some(w.line),
                        message: w.message,
                    }));
                    session
                }
                Err(e) => {
                    push_diagnostic(diagnostics, &path, &e);
                    continue;
                }
            };

            if !self.range.contains_end(session.end_time()) {
                tracing::debug!(path = ?path, "session outside date range");
                continue;
            }

            project.add_session(session);
            budget.consume();
            if budget.is_exhausted() {
                break;
            }
        }
        Ok(())
    }

    /// Every non-empty todo list under `todos/`.
    fn scan_todos(&self, diagnostics: &mut Vec<Diagnostic>) -> Vec<TodoList> {
        let todos_dir = self.base.join(TODOS_DIR);
        if !todos_dir.exists() {
            return Vec::new();
        }
        let entries = match fs::read_dir(&todos_dir) {
            Ok(entries) => entries,
            Err(e) => {
                push_diagnostic(diagnostics, &todos_dir, &e);
                return Vec::new();
            }
        };

        let mut lists = Vec::new();
        for entry in readable_entries(entries, &todos_dir, diagnostics) {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some((session_id, agent_id)) = parse_todo_filename(name) else {
                continue;
            };

            match read_todo_list(&path, session_id, agent_id) {
                Ok(list) if !list.todos.is_empty() => lists.push(list),
                Ok(_) => {}
                Err(e) => push_diagnostic(diagnostics, &path, &e),
            }
        }
        lists
    }

    /// Contents of `CLAUDE.md`, empty if the file does not exist.
    pub fn read_claude_md(&self) -> Result<String, ScanError> {
        match fs::read_to_string(self.base.join(CLAUDE_MD)) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(ScanError::ClaudeMd(e)),
        }
    }
}

/// Directory entries that could be read; the rest become diagnostics
/// against `dir`.
fn readable_entries<T>(
    entries: impl IntoIterator<Item = io::Result<T>>,
    dir: &Path,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<T> {
    let mut readable = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => readable.push(entry),
            Err(e) => push_diagnostic(diagnostics, dir, &e),
        }
    }
    readable
}

fn push_diagnostic(diagnostics: &mut Vec<Diagnostic>, path: &Path, error: &dyn std::error::Error) {
    tracing::warn!(path = ?path, error = %error, "skipping unreadable entry");
    diagnostics.push(Diagnostic {
        path: path.to_path_buf(),
        line: None,
        message: error.to_string(),
    });
}

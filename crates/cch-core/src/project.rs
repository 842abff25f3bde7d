//! Projects: one archive directory per working directory.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::session::{Session, TokenUsage};
use crate::todo::TodoList;

/// Decode an archive directory name back into a filesystem path.
///
/// Claude Code replaces every `/` with `-`, so this is lossy for paths whose
/// segments contain hyphens.
pub fn decode_project_path(encoded: &str) -> String {
    encoded.replace('-', "/")
}

/// A conversation workspace and everything recorded for it.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: String,
    /// Decoded path, e.g. `/Users/me/src/app`.
    pub path: String,
    /// Directory name under `projects/`, e.g. `-Users-me-src-app`.
    pub encoded_path: String,
    pub sessions: Vec<Session>,
    pub todo_lists: Vec<TodoList>,
}

impl Project {
    pub fn new(encoded_path: &str) -> Self {
        Self {
            id: encoded_path.to_string(),
            path: decode_project_path(encoded_path),
            encoded_path: encoded_path.to_string(),
            sessions: Vec::new(),
            todo_lists: Vec::new(),
        }
    }

    pub fn add_session(&mut self, mut session: Session) {
        session.project_id.clone_from(&self.id);
        self.sessions.push(session);
    }

    pub fn add_todo_list(&mut self, todo_list: TodoList) {
        self.todo_lists.push(todo_list);
    }

    /// Last component of the decoded path.
    pub fn name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.path)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn total_messages(&self) -> usize {
        self.sessions.iter().map(Session::message_count).sum()
    }

    pub fn total_token_usage(&self) -> TokenUsage {
        self.sessions.iter().map(Session::token_usage).sum()
    }

    /// Earliest session start and latest session end.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.sessions.iter().filter_map(Session::start_time).min()?;
        let end = self.sessions.iter().filter_map(Session::end_time).max()?;
        Some((start, end))
    }
}

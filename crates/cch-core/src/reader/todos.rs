//! Todo files: `todos/<session>-agent-<agent>.json`.

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::todo::{Todo, TodoList};

const AGENT_SEPARATOR: &str = "-agent-";

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a todo file: a JSON array of todos.
pub fn read_todos(path: &Path) -> Result<Vec<Todo>, TodoError> {
    let data = std::fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

/// Split a todo filename into `(session_id, agent_id)`.
///
/// Returns `None` unless the name ends in `.json` and contains the agent
/// separator exactly once.
pub fn parse_todo_filename(name: &str) -> Option<(&str, &str)> {
    let stem = name.strip_suffix(".json")?;
    let mut parts = stem.split(AGENT_SEPARATOR);
    let session = parts.next()?;
    let agent = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((session, agent))
}

/// Read a todo file into a list for the given session and agent.
pub fn read_todo_list(path: &Path, session_id: &str, agent_id: &str) -> Result<TodoList, TodoError> {
    Ok(TodoList {
        session_id: session_id.to_string(),
        agent_id: agent_id.to_string(),
        todos: read_todos(path)?,
    })
}

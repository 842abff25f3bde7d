//! Todo lists written by the agent's todo tool.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    High,
    Medium,
    Low,
}

impl TodoPriority {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for TodoPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single todo item.
///
/// Newer Claude Code versions omit `id` and `priority`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    #[serde(default)]
    pub id: String,
    pub content: String,
    pub status: TodoStatus,
    #[serde(default)]
    pub priority: Option<TodoPriority>,
}

/// The todos of one session/agent pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoList {
    pub session_id: String,
    pub agent_id: String,
    pub todos: Vec<Todo>,
}

impl TodoList {
    pub fn by_status(&self, status: TodoStatus) -> Vec<&Todo> {
        self.todos.iter().filter(|t| t.status == status).collect()
    }

    pub fn by_priority(&self, priority: TodoPriority) -> Vec<&Todo> {
        self.todos
            .iter()
            .filter(|t| t.priority == Some(priority))
            .collect()
    }

    /// Percentage of completed todos, 0 for an empty list.
    #[allow(clippy::cast_precision_loss)]
    pub fn completion_rate(&self) -> f64 {
        if self.todos.is_empty() {
            return 0.0;
        }
        let completed = self.by_status(TodoStatus::Completed).len();
        completed as f64 / self.todos.len() as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: &str, status: TodoStatus, priority: TodoPriority) -> Todo {
        Todo {
            id: id.to_string(),
            content: format!("Task {id}"),
            status,
            priority: Some(priority),
        }
    }

    fn list(todos: Vec<Todo>) -> TodoList {
        TodoList {
            session_id: "test-session".to_string(),
            agent_id: "test-agent".to_string(),
            todos,
        }
    }

    #[test]
    fn test_todo_list_operations() {
        let todo_list = list(vec![
            todo("1", TodoStatus::Pending, TodoPriority::High),
            todo("2", TodoStatus::InProgress, TodoPriority::Medium),
            todo("3", TodoStatus::Completed, TodoPriority::High),
            todo("4", TodoStatus::Completed, TodoPriority::Low),
        ]);

        assert_eq!(todo_list.by_status(TodoStatus::Pending).len(), 1);
        assert_eq!(todo_list.by_status(TodoStatus::Completed).len(), 2);
        assert_eq!(todo_list.by_priority(TodoPriority::High).len(), 2);
        assert!((todo_list.completion_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_completion_rate_half() {
        let todo_list = list(vec![
            todo("1", TodoStatus::Completed, TodoPriority::High),
            todo("2", TodoStatus::Pending, TodoPriority::Low),
        ]);
        assert!((todo_list.completion_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_todo_list() {
        let todo_list = list(Vec::new());
        assert!(todo_list.completion_rate().abs() < f64::EPSILON);
        assert!(todo_list.by_status(TodoStatus::Pending).is_empty());
    }

    #[test]
    fn test_all_completed() {
        let todo_list = list(vec![
            todo("1", TodoStatus::Completed, TodoPriority::High),
            todo("2", TodoStatus::Completed, TodoPriority::Medium),
            todo("3", TodoStatus::Completed, TodoPriority::Low),
        ]);
        assert!((todo_list.completion_rate() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_todo_wire_format() {
        let parsed: Todo = serde_json::from_str(
            r#"{"id":"7","content":"Write docs","status":"in_progress","priority":"medium"}"#,
        )
        .unwrap();
        assert_eq!(parsed.status, TodoStatus::InProgress);
        assert_eq!(parsed.priority, Some(TodoPriority::Medium));

        let current: Todo = serde_json::from_str(
            r#"{"content":"Run tests","status":"pending","activeForm":"Running tests"}"#,
        )
        .unwrap();
        assert_eq!(current.id, "");
        assert_eq!(current.priority, None);

        assert!(serde_json::from_str::<Todo>(r#"{"content":"x","status":"done"}"#).is_err());
    }

    #[test]
    fn test_status_serde_matches_as_str() {
        for status in [
            TodoStatus::Pending,
            TodoStatus::InProgress,
            TodoStatus::Completed,
        ] {
            let value = serde_json::to_value(status).unwrap();
            assert_eq!(value.as_str().unwrap(), status.as_str());
        }
    }
}

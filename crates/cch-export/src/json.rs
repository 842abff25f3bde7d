//! JSON rendering.

use std::io::Write;

use cch_core::{Content, Message, MessageType, Project, Session, Todo, TodoList, TokenUsage};
use serde::Serialize;
use serde_json::json;
use serde_json::value::RawValue;

use crate::exporter::ExportTarget;
use crate::format::{format_date, format_duration, format_timestamp};

#[derive(Debug, Clone, Copy)]
pub struct JsonOptions {
    pub pretty: bool,
    /// Attach each message's original payload as `raw_message`.
    pub include_raw_messages: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            include_raw_messages: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct TokenView {
    input: u64,
    output: u64,
    total: u64,
}

fn token_view(usage: TokenUsage) -> Option<TokenView> {
    (!usage.is_empty()).then(|| TokenView {
        input: usage.input,
        output: usage.output,
        total: usage.total(),
    })
}

#[derive(Debug, Serialize)]
struct MessageView<'a> {
    uuid: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_uuid: Option<&'a str>,
    session_id: &'a str,
    #[serde(rename = "type")]
    kind: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_type: Option<&'a str>,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cwd: Option<&'a str>,
    content: Option<&'a Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_message: Option<&'a RawValue>,
}

#[derive(Debug, Serialize)]
struct SessionView<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    project_id: &'a str,
    start_time: Option<String>,
    end_time: Option<String>,
    duration: String,
    message_count: usize,
    user_messages: usize,
    assistant_messages: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_usage: Option<TokenView>,
    messages: Vec<MessageView<'a>>,
}

#[derive(Debug, Serialize)]
struct DateRangeView {
    start: String,
    end: String,
}

#[derive(Debug, Serialize)]
struct TodoListView<'a> {
    session_id: &'a str,
    agent_id: &'a str,
    todo_count: usize,
    completion_rate: f64,
    todos: &'a [Todo],
}

#[derive(Debug, Serialize)]
struct ProjectView<'a> {
    id: &'a str,
    name: &'a str,
    path: &'a str,
    encoded_path: &'a str,
    session_count: usize,
    message_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_range: Option<DateRangeView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_usage: Option<TokenView>,
    sessions: Vec<SessionView<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    todo_lists: Vec<TodoListView<'a>>,
}

#[derive(Debug, Serialize)]
struct ProjectsView<'a> {
    project_count: usize,
    projects: Vec<ProjectView<'a>>,
}

/// Renders sessions and projects as JSON documents.
#[derive(Debug, Clone, Default)]
pub struct JsonConverter {
    options: JsonOptions,
}

impl JsonConverter {
    pub const fn new(options: JsonOptions) -> Self {
        Self { options }
    }

    pub fn convert_session(&self, session: &Session) -> serde_json::Result<String> {
        self.to_string(&self.session_view(session))
    }

    pub fn convert_project(&self, project: &Project) -> serde_json::Result<String> {
        self.to_string(&self.project_view(project))
    }

    /// `{"project_count": n, "projects": [...]}`
    pub fn convert_projects(&self, projects: &[Project]) -> serde_json::Result<String> {
        self.to_string(&self.projects_view(projects))
    }

    /// One-line summary of a session: id, project, unix start/end, message
    /// count and, when non-zero, token counts.
    pub fn convert_session_compact(&self, session: &Session) -> serde_json::Result<String> {
        let mut compact = json!({
            "id": session.id.as_deref().unwrap_or_default(),
            "project": session.project_id,
            "start": session.start_time().map(|t| t.timestamp()),
            "end": session.end_time().map(|t| t.timestamp()),
            "messages": session.message_count(),
        });
        let usage = session.token_usage();
        if !usage.is_empty() {
            compact["tokens"] = json!({ "in": usage.input, "out": usage.output });
        }
        serde_json::to_string(&compact)
    }

    /// Serialize a target straight into `writer`.
    pub fn write<W: Write>(&self, writer: W, target: ExportTarget<'_>) -> serde_json::Result<()> {
        match target {
            ExportTarget::Session(session) => self.write_value(writer, &self.session_view(session)),
            ExportTarget::Project(project) => self.write_value(writer, &self.project_view(project)),
            ExportTarget::Projects(projects) => {
                self.write_value(writer, &self.projects_view(projects))
            }
        }
    }

    fn write_value<W: Write, T: Serialize>(&self, writer: W, value: &T) -> serde_json::Result<()> {
        if self.options.pretty {
            serde_json::to_writer_pretty(writer, value)
        } else {
            serde_json::to_writer(writer, value)
        }
    }

    fn to_string<T: Serialize>(&self, value: &T) -> serde_json::Result<String> {
        if self.options.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }

    fn message_view<'a>(&self, message: &'a Message) -> MessageView<'a> {
        MessageView {
            uuid: &message.uuid,
            parent_uuid: message.parent_uuid.as_deref(),
            session_id: message.session_id.as_deref().unwrap_or_default(),
            kind: message.kind,
            user_type: message.user_type.as_deref().filter(|t| !t.is_empty()),
            timestamp: format_timestamp(message.timestamp),
            cwd: message.cwd.as_deref(),
            content: message.content.as_ref(),
            raw_message: if self.options.include_raw_messages {
                message.payload.as_deref()
            } else {
                None
            },
        }
    }

    fn session_view<'a>(&self, session: &'a Session) -> SessionView<'a> {
        SessionView {
            id: session.id.as_deref().unwrap_or_default(),
            project_id: &session.project_id,
            start_time: session.start_time().map(format_timestamp),
            end_time: session.end_time().map(format_timestamp),
            duration: format_duration(session.duration()),
            message_count: session.message_count(),
            user_messages: session.user_message_count(),
            assistant_messages: session.assistant_message_count(),
            token_usage: token_view(session.token_usage()),
            messages: session
                .messages()
                .iter()
                .map(|m| self.message_view(m))
                .collect(),
        }
    }

    fn project_view<'a>(&self, project: &'a Project) -> ProjectView<'a> {
        ProjectView {
            id: &project.id,
            name: project.name(),
            path: &project.path,
            encoded_path: &project.encoded_path,
            session_count: project.session_count(),
            message_count: project.total_messages(),
            date_range: project.time_range().map(|(start, end)| DateRangeView {
                start: format_date(start),
                end: format_date(end),
            }),
            token_usage: token_view(project.total_token_usage()),
            sessions: project
                .sessions
                .iter()
                .map(|s| self.session_view(s))
                .collect(),
            todo_lists: project.todo_lists.iter().map(todo_list_view).collect(),
        }
    }

    fn projects_view<'a>(&self, projects: &'a [Project]) -> ProjectsView<'a> {
        ProjectsView {
            project_count: projects.len(),
            projects: projects.iter().map(|p| self.project_view(p)).collect(),
        }
    }
}

fn todo_list_view(list: &TodoList) -> TodoListView<'_> {
    TodoListView {
        session_id: &list.session_id,
        agent_id: &list.agent_id,
        todo_count: list.todos.len(),
        completion_rate: list.completion_rate(),
        todos: &list.todos,
    }
}

//! Markdown rendering.

use std::fmt::Write;

use cch_core::{
    Content, ContentBlock, Message, MessageType, Project, Session, Todo, TodoList, TodoStatus,
};
use chrono::SecondsFormat;

use crate::exporter::ExportTarget;
use crate::format::{format_date, format_duration};

const SECTION_RULE: &str = "\n\n---\n\n";

#[derive(Debug, Clone, Copy)]
pub struct MarkdownOptions {
    pub show_timestamps: bool,
    pub show_token_usage: bool,
    /// Render thinking blocks in collapsed `<details>` sections.
    pub show_thinking: bool,
    pub show_uuids: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            show_token_usage: true,
            show_thinking: false,
            show_uuids: false,
        }
    }
}

/// Renders sessions and projects as Markdown documents.
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    options: MarkdownOptions,
}

impl MarkdownConverter {
    pub const fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    pub fn render(&self, target: ExportTarget<'_>) -> String {
        match target {
            ExportTarget::Session(session) => self.convert_session(session),
            ExportTarget::Project(project) => self.convert_project(project),
            ExportTarget::Projects(projects) => self.convert_projects(projects),
        }
    }

    pub fn convert_session(&self, session: &Session) -> String {
        let mut output = String::new();

        writeln!(output, "# Session: {}\n", session.display_id()).unwrap();
        if let (Some(start), Some(end)) = (session.start_time(), session.end_time()) {
            writeln!(
                output,
                "**Started:** {}  ",
                start.to_rfc3339_opts(SecondsFormat::Secs, true)
            )
            .unwrap();
            writeln!(
                output,
                "**Ended:** {}  ",
                end.to_rfc3339_opts(SecondsFormat::Secs, true)
            )
            .unwrap();
            writeln!(
                output,
                "**Duration:** {}  ",
                format_duration(session.duration())
            )
            .unwrap();
        }
        writeln!(output, "**Messages:** {}  ", session.message_count()).unwrap();

        let usage = session.token_usage();
        if self.options.show_token_usage && !usage.is_empty() {
            writeln!(
                output,
                "**Token Usage:** Input: {}, Output: {}  ",
                usage.input, usage.output
            )
            .unwrap();
        }
        output.push_str("\n---\n\n");

        for (i, message) in session.messages().iter().enumerate() {
            if i > 0 {
                output.push_str("\n---\n\n");
            }
            output.push_str(&self.convert_message(message));
        }

        output
    }

    pub fn convert_message(&self, message: &Message) -> String {
        let mut output = String::new();

        match message.kind {
            MessageType::User => output.push_str("### 👤 User\n\n"),
            MessageType::Assistant => output.push_str("### 🤖 Assistant\n\n"),
        }

        if self.options.show_timestamps {
            writeln!(output, "*{}*  ", message.timestamp.format("%Y-%m-%d %H:%M:%S")).unwrap();
        }
        if self.options.show_uuids && !message.uuid.is_empty() {
            writeln!(output, "*UUID: {}*  ", message.uuid).unwrap();
        }
        if let Some(cwd) = &message.cwd {
            writeln!(output, "*Working Directory: `{cwd}`*  ").unwrap();
        }
        output.push('\n');

        match &message.content {
            Some(Content::UserText(user)) => {
                output.push_str(&user.text);
                output.push('\n');
            }
            Some(Content::ToolResults(results)) => {
                output.push_str("**Tool Results:**\n\n");
                for result in results {
                    writeln!(output, "- Tool: `{}`", result.tool_use_id).unwrap();
                    writeln!(output, "  - Type: {}", result.kind).unwrap();
                    writeln!(
                        output,
                        "  - Content: {}",
                        result.content.as_ref().map_or("", |c| c.get())
                    )
                    .unwrap();
                }
            }
            Some(Content::Assistant(assistant)) => {
                if !assistant.model.is_empty() {
                    writeln!(output, "*Model: {}*\n", assistant.model).unwrap();
                }
                for block in &assistant.content {
                    self.write_block(&mut output, block);
                }
                if self.options.show_token_usage {
                    if let Some(usage) = &assistant.usage {
                        writeln!(
                            output,
                            "\n*Tokens - Input: {}, Output: {}*",
                            usage.total_input_tokens(),
                            usage.output_tokens
                        )
                        .unwrap();
                    }
                }
            }
            None => {}
        }

        output
    }

    fn write_block(&self, output: &mut String, block: &ContentBlock) {
        match block {
            ContentBlock::Text { text } => {
                writeln!(output, "{text}\n").unwrap();
            }
            ContentBlock::Thinking { thinking } => {
                if self.options.show_thinking {
                    output.push_str("<details>\n<summary>💭 Thinking</summary>\n\n");
                    output.push_str(thinking);
                    output.push_str("\n\n</details>\n\n");
                }
            }
            ContentBlock::ToolUse { id, name, input } => {
                writeln!(output, "**🔧 Tool Use:** `{name}`\n").unwrap();
                if !id.is_empty() {
                    writeln!(output, "*ID: {id}*\n").unwrap();
                }
                output.push_str("```json\n");
                output.push_str(input.as_ref().map_or("", |i| i.get()));
                output.push_str("\n```\n\n");
            }
            ContentBlock::Other { kind, text } => {
                writeln!(output, "**{kind}:**\n").unwrap();
                if let Some(text) = text.as_deref().filter(|t| !t.is_empty()) {
                    writeln!(output, "{text}\n").unwrap();
                }
            }
        }
    }

    pub fn convert_project(&self, project: &Project) -> String {
        let mut output = String::new();

        writeln!(output, "# Project: {}\n", project.name()).unwrap();
        writeln!(output, "**Path:** `{}`  ", project.path).unwrap();
        writeln!(output, "**Sessions:** {}  ", project.session_count()).unwrap();
        writeln!(output, "**Total Messages:** {}  ", project.total_messages()).unwrap();

        let usage = project.total_token_usage();
        if self.options.show_token_usage && !usage.is_empty() {
            writeln!(
                output,
                "**Total Token Usage:** Input: {}, Output: {}  ",
                usage.input, usage.output
            )
            .unwrap();
        }
        if let Some((start, end)) = project.time_range() {
            writeln!(
                output,
                "**Date Range:** {} to {}  ",
                format_date(start),
                format_date(end)
            )
            .unwrap();
        }

        if !project.todo_lists.is_empty() {
            writeln!(output, "\n## Todo Lists ({})\n", project.todo_lists.len()).unwrap();
            for todo_list in &project.todo_lists {
                output.push_str(&Self::convert_todo_list(todo_list));
                output.push('\n');
            }
        }

        output.push_str("\n## Sessions\n\n");
        let sessions: Vec<String> = project
            .sessions
            .iter()
            .map(|s| self.convert_session(s))
            .collect();
        output.push_str(&sessions.join(SECTION_RULE));

        output
    }

    pub fn convert_projects(&self, projects: &[Project]) -> String {
        projects
            .iter()
            .map(|p| self.convert_project(p))
            .collect::<Vec<_>>()
            .join(SECTION_RULE)
    }

    pub fn convert_todo_list(todo_list: &TodoList) -> String {
        let mut output = String::new();

        writeln!(output, "### Todo List - Session: {}\n", todo_list.session_id).unwrap();
        if !todo_list.agent_id.is_empty() {
            writeln!(output, "*Agent: {}*  ", todo_list.agent_id).unwrap();
        }
        writeln!(output, "*Completion: {:.0}%*\n", todo_list.completion_rate()).unwrap();

        let pending = todo_list.by_status(TodoStatus::Pending);
        if !pending.is_empty() {
            output.push_str("#### ⏳ Pending\n\n");
            write_todos(&mut output, &pending, false);
            output.push('\n');
        }
        let in_progress = todo_list.by_status(TodoStatus::InProgress);
        if !in_progress.is_empty() {
            output.push_str("#### 🔄 In Progress\n\n");
            write_todos(&mut output, &in_progress, false);
            output.push('\n');
        }
        let completed = todo_list.by_status(TodoStatus::Completed);
        if !completed.is_empty() {
            output.push_str("#### ✅ Completed\n\n");
            write_todos(&mut output, &completed, true);
        }

        output
    }
}

fn write_todos(output: &mut String, todos: &[&Todo], done: bool) {
    let mark = if done { 'x' } else { ' ' };
    for todo in todos {
        let priority = todo
            .priority
            .map(|p| format!(" ({p})"))
            .unwrap_or_default();
        writeln!(output, "- [{mark}] {}{priority}", todo.content).unwrap();
    }
}

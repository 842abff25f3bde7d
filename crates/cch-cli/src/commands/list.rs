//! List command: one row per project in the archive.

use std::fmt::Write;

use anyhow::{Context, Result};
use cch_core::{Project, ScanOptions, Scanner};
use cch_export::format_date;
use serde::Serialize;

use super::export::trimmed_paths;
use crate::cli::ListArgs;
use crate::config::Config;

const NAME_WIDTH: usize = 24;

/// Project summary for display.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectEntry {
    pub name: String,
    pub path: String,
    pub sessions: usize,
    pub messages: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub first_activity: Option<String>,
    pub last_activity: Option<String>,
}

impl ProjectEntry {
    pub fn from_project(project: &Project) -> Self {
        let usage = project.total_token_usage();
        let range = project.time_range();
        Self {
            name: project.name().to_string(),
            path: project.path.clone(),
            sessions: project.session_count(),
            messages: project.total_messages(),
            input_tokens: usage.input,
            output_tokens: usage.output,
            first_activity: range.map(|(start, _)| format_date(start)),
            last_activity: range.map(|(_, end)| format_date(end)),
        }
    }

    fn date_range(&self) -> String {
        match (&self.first_activity, &self.last_activity) {
            (Some(start), Some(end)) if start == end => start.clone(),
            (Some(start), Some(end)) => format!("{start} to {end}"),
            _ => "-".to_string(),
        }
    }
}

/// Summaries sorted by project path.
pub fn project_entries(projects: &[Project]) -> Vec<ProjectEntry> {
    let mut entries: Vec<ProjectEntry> = projects.iter().map(ProjectEntry::from_project).collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    entries
}

/// Format entries for human-readable output.
pub fn format_projects(entries: &[ProjectEntry]) -> String {
    let mut output = String::new();

    if entries.is_empty() {
        writeln!(output, "No projects found matching the criteria").unwrap();
        return output;
    }

    writeln!(output, "PROJECTS ({})", entries.len()).unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "{:<NAME_WIDTH$}  {:>8}  {:>8}  {:>10}  {:<24}  Path",
        "Name", "Sessions", "Messages", "Tokens", "Date Range"
    )
    .unwrap();
    writeln!(
        output,
        "{}  ────────  ────────  ──────────  ────────────────────────  ────────────────",
        "─".repeat(NAME_WIDTH)
    )
    .unwrap();

    for entry in entries {
        // Truncate by characters, not bytes, to avoid panics on multi-byte UTF-8
        let name = if entry.name.chars().count() > NAME_WIDTH {
            format!(
                "{}...",
                entry.name.chars().take(NAME_WIDTH - 3).collect::<String>()
            )
        } else {
            entry.name.clone()
        };
        writeln!(
            output,
            "{:<NAME_WIDTH$}  {:>8}  {:>8}  {:>10}  {:<24}  {}",
            name,
            entry.sessions,
            entry.messages,
            entry.input_tokens.saturating_add(entry.output_tokens),
            entry.date_range(),
            entry.path
        )
        .unwrap();
    }

    output
}

#[derive(Debug, Serialize)]
struct JsonProjects<'a> {
    projects: &'a [ProjectEntry],
    project_count: usize,
}

/// Format entries as JSON.
pub fn format_projects_json(entries: &[ProjectEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonProjects {
        projects: entries,
        project_count: entries.len(),
    })?)
}

/// Runs the list command.
pub fn run(args: &ListArgs, config: &Config) -> Result<()> {
    let source = args.source.as_deref().unwrap_or(&config.source_path);
    let options = ScanOptions {
        project_paths: trimmed_paths(&args.projects),
        ..ScanOptions::default()
    };
    let projects = Scanner::new(source, options)
        .scan_projects()
        .context("failed to scan projects")?;
    let entries = project_entries(&projects);

    if args.json {
        println!("{}", format_projects_json(&entries)?);
    } else {
        print!("{}", format_projects(&entries));
    }

    Ok(())
}

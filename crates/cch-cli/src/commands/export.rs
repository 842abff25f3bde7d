//! Export command.
//!
//! Scans the archive with the requested filters and writes either one
//! document (a single project, or all matching projects) or one file per
//! project with `--batch`.

use std::path::Path;

use anyhow::{Context, Result};
use cch_core::{Project, ScanOptions, Scanner};
use cch_export::{
    BatchExporter, ExportTarget, FileExporter, Format, JsonOptions, MarkdownOptions,
};

use super::util::{parse_datetime, parse_end_datetime};
use crate::cli::ExportArgs;
use crate::config::Config;

const BATCH_NAME_PATTERN: &str = "project_{}";

/// Build scanner options from flags, falling back to configuration.
pub fn scan_options(args: &ExportArgs, config: &Config) -> Result<ScanOptions> {
    let start = args
        .start_time
        .as_deref()
        .map(|s| {
            parse_datetime(s).with_context(|| {
                format!("invalid start time format: {s} (use YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)")
            })
        })
        .transpose()?;
    let end = args
        .end_time
        .as_deref()
        .map(|s| {
            parse_end_datetime(s).with_context(|| {
                format!("invalid end time format: {s} (use YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)")
            })
        })
        .transpose()?;

    Ok(ScanOptions {
        start,
        end,
        project_paths: trimmed_paths(&args.projects),
        include_todos: args.include_todos.unwrap_or(config.include_todos),
        max_sessions: args.max_sessions.unwrap_or(config.max_sessions),
    })
}

/// Build the exporter for the effective format.
pub fn build_exporter(args: &ExportArgs, config: &Config) -> Result<FileExporter> {
    let format = args.format.unwrap_or(config.format);
    let exporter = match format {
        Format::Json => FileExporter::json(JsonOptions {
            pretty: args.pretty.unwrap_or(config.pretty_json),
            include_raw_messages: args.include_raw,
        }),
        Format::Markdown => FileExporter::markdown(markdown_options(args, config)),
        Format::Html => FileExporter::new(format)?,
    };
    Ok(exporter)
}

/// Markdown rendering options; an explicit flag wins over configuration.
pub fn markdown_options(args: &ExportArgs, config: &Config) -> MarkdownOptions {
    MarkdownOptions {
        show_thinking: args.show_thinking.unwrap_or(config.show_thinking),
        ..MarkdownOptions::default()
    }
}

pub(crate) fn trimmed_paths(paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Runs the export command.
pub fn run(args: &ExportArgs, config: &Config, verbose: bool) -> Result<()> {
    let source = args.source.as_deref().unwrap_or(&config.source_path);
    let options = scan_options(args, config)?;
    let exporter = build_exporter(args, config)?;

    if !source.exists() {
        anyhow::bail!(".claude directory not found at {}", source.display());
    }

    tracing::info!(source = %source.display(), "scanning archive");
    let result = Scanner::new(source, options)
        .scan()
        .context("failed to scan projects")?;
    if !result.diagnostics.is_empty() {
        tracing::info!(count = result.diagnostics.len(), "skipped unreadable input");
    }

    let projects = result.projects;
    if projects.is_empty() {
        println!("No projects found matching the criteria");
        return Ok(());
    }

    tracing::info!(
        projects = projects.len(),
        sessions = projects.iter().map(Project::session_count).sum::<usize>(),
        messages = projects.iter().map(Project::total_messages).sum::<usize>(),
        "scan complete"
    );

    if args.batch {
        batch_export(exporter, &projects, &args.output, verbose)
    } else {
        single_export(&exporter, &projects, &args.output)
    }
}

fn single_export(exporter: &FileExporter, projects: &[Project], output: &Path) -> Result<()> {
    let target = match projects {
        [project] => ExportTarget::Project(project),
        _ => ExportTarget::Projects(projects),
    };
    exporter
        .export_to_file(output, target)
        .context("export failed")?;

    if !is_stdout(output) {
        println!("Successfully exported to {}", output.display());
    }
    Ok(())
}

fn batch_export(
    exporter: FileExporter,
    projects: &[Project],
    output: &Path,
    verbose: bool,
) -> Result<()> {
    let batch = BatchExporter::new(exporter, output, BATCH_NAME_PATTERN);
    tracing::info!(projects = projects.len(), output = %output.display(), "batch export");

    let result = batch
        .export_projects(projects)
        .context("batch export failed")?;

    println!("{}", result.summary());

    if result.has_errors() {
        eprintln!("\nErrors occurred:");
        for e in &result.errors {
            eprintln!("  - {}: {}", e.item, e.error);
        }
    }

    if verbose && !result.files.is_empty() {
        println!("\nExported files:");
        for file in &result.files {
            println!("  - {}", file.display());
        }
    }

    Ok(())
}

fn is_stdout(path: &Path) -> bool {
    path.as_os_str().is_empty() || path == Path::new("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> ExportArgs {
        ExportArgs {
            source: None,
            output: PathBuf::from("out.md"),
            format: None,
            projects: Vec::new(),
            start_time: None,
            end_time: None,
            max_sessions: None,
            pretty: None,
            show_thinking: None,
            include_raw: false,
            include_todos: None,
            batch: false,
        }
    }

    #[test]
    fn test_scan_options_fall_back_to_config() {
        let config = Config {
            include_todos: false,
            max_sessions: 7,
            ..Config::default()
        };
        let options = scan_options(&args(), &config).unwrap();

        assert!(!options.include_todos);
        assert_eq!(options.max_sessions, 7);
        assert!(options.start.is_none());
        assert!(options.end.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            include_todos: false,
            max_sessions: 7,
            ..Config::default()
        };
        let args = ExportArgs {
            include_todos: Some(true),
            max_sessions: Some(0),
            projects: vec![" /Users/a ".to_string(), String::new()],
            ..args()
        };
        let options = scan_options(&args, &config).unwrap();

        assert!(options.include_todos);
        assert_eq!(options.max_sessions, 0);
        assert_eq!(options.project_paths, ["/Users/a"]);
    }

    #[test]
    fn test_date_only_end_covers_whole_day() {
        let args = ExportArgs {
            start_time: Some("2024-01-01".to_string()),
            end_time: Some("2024-01-01".to_string()),
            ..args()
        };
        let options = scan_options(&args, &Config::default()).unwrap();

        let (start, end) = (options.start.unwrap(), options.end.unwrap());
        assert_eq!(end - start, chrono::Duration::hours(24));
    }

    #[test]
    fn test_invalid_start_time_message() {
        let args = ExportArgs {
            start_time: Some("01/02/2024".to_string()),
            ..args()
        };
        let err = scan_options(&args, &Config::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid start time format: 01/02/2024 (use YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)"
        );
    }

    #[test]
    fn test_build_exporter_format_resolution() {
        let config = Config {
            format: Format::Json,
            ..Config::default()
        };
        assert_eq!(build_exporter(&args(), &config).unwrap().format(), Format::Json);

        let args = ExportArgs {
            format: Some(Format::Markdown),
            ..args()
        };
        assert_eq!(
            build_exporter(&args, &config).unwrap().format(),
            Format::Markdown
        );
    }

    #[test]
    fn test_show_thinking_flag_overrides_config_both_ways() {
        let enabled = Config {
            show_thinking: true,
            ..Config::default()
        };
        assert!(markdown_options(&args(), &enabled).show_thinking);

        let off = ExportArgs {
            show_thinking: Some(false),
            ..args()
        };
        assert!(!markdown_options(&off, &enabled).show_thinking);

        let on = ExportArgs {
            show_thinking: Some(true),
            ..args()
        };
        assert!(markdown_options(&on, &Config::default()).show_thinking);
        assert!(!markdown_options(&args(), &Config::default()).show_thinking);
    }

    #[test]
    fn test_html_is_rejected() {
        let args = ExportArgs {
            format: Some(Format::Html),
            ..args()
        };
        let err = build_exporter(&args, &Config::default()).unwrap_err();
        assert_eq!(err.to_string(), "html format not yet implemented");
    }

    #[test]
    fn test_is_stdout() {
        assert!(is_stdout(Path::new("-")));
        assert!(is_stdout(Path::new("")));
        assert!(!is_stdout(Path::new("out.md")));
    }
}

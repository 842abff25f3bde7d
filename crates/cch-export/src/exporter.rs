//! Writing rendered documents to files or streams.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use cch_core::{Project, Session};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::json::{JsonConverter, JsonOptions};
use crate::markdown::{MarkdownConverter, MarkdownOptions};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    #[default]
    #[serde(alias = "md")]
    Markdown,
    Html,
}

impl Format {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Html => "html",
        }
    }

    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            _ => Err(format!("unsupported format: {s}")),
        }
    }
}

/// What to export.
#[derive(Debug, Clone, Copy)]
pub enum ExportTarget<'a> {
    Session(&'a Session),
    Project(&'a Project),
    Projects(&'a [Project]),
}

/// Writer adapter that counts the bytes passed through it.
pub struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W: Write> CountingWriter<W> {
    pub const fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    pub const fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[derive(Debug, Clone)]
enum Renderer {
    Json(JsonConverter),
    Markdown(MarkdownConverter),
}

/// Renders export targets in one format and writes them out.
#[derive(Debug, Clone)]
pub struct FileExporter {
    format: Format,
    renderer: Renderer,
}

impl FileExporter {
    pub fn json(options: JsonOptions) -> Self {
        Self {
            format: Format::Json,
            renderer: Renderer::Json(JsonConverter::new(options)),
        }
    }

    pub fn markdown(options: MarkdownOptions) -> Self {
        Self {
            format: Format::Markdown,
            renderer: Renderer::Markdown(MarkdownConverter::new(options)),
        }
    }

    /// Exporter for `format` with default converter options.
    pub fn new(format: Format) -> Result<Self, ExportError> {
        match format {
            Format::Json => Ok(Self::json(JsonOptions::default())),
            Format::Markdown => Ok(Self::markdown(MarkdownOptions::default())),
            Format::Html => Err(ExportError::Unsupported(format)),
        }
    }

    pub const fn format(&self) -> Format {
        self.format
    }

    /// Render `target` into `writer`, returning the number of bytes written.
    pub fn export<W: Write>(
        &self,
        writer: W,
        target: ExportTarget<'_>,
    ) -> Result<u64, ExportError> {
        let mut writer = CountingWriter::new(writer);
        match &self.renderer {
            Renderer::Json(json) => json.write(&mut writer, target)?,
            Renderer::Markdown(markdown) => {
                writer.write_all(markdown.render(target).as_bytes())?;
            }
        }
        writer.flush()?;
        Ok(writer.bytes_written())
    }

    /// Export to `path`, creating parent directories. An empty path or `-`
    /// writes to stdout.
    pub fn export_to_file(
        &self,
        path: &Path,
        target: ExportTarget<'_>,
    ) -> Result<u64, ExportError> {
        if path.as_os_str().is_empty() || path == Path::new("-") {
            return self.export(io::stdout().lock(), target);
        }

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let file = File::create(path).map_err(|source| ExportError::CreateFile {
            path: path.to_path_buf(),
            source,
        })?;
        let bytes = self.export(BufWriter::new(file), target)?;
        tracing::debug!(path = ?path, bytes, "export written");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cch_core::read_session_from;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn project() -> Project {
        let mut project = Project::new("-Users-test-app");
        project.add_session(
            read_session_from(Cursor::new(concat!(
                r#"{"uuid":"m1","sessionId":"s1","type":"user","userType":"external","timestamp":"2024-01-01T10:00:00Z","message":{"role":"user","content":"Hello"}}"#,
                "\n",
            )))
            .unwrap(),
        );
        project
    }

    #[test]
    fn test_format_parse_and_extension() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("markdown".parse::<Format>().unwrap(), Format::Markdown);
        assert_eq!("md".parse::<Format>().unwrap(), Format::Markdown);
        assert_eq!("html".parse::<Format>().unwrap(), Format::Html);
        assert!("pdf".parse::<Format>().is_err());

        assert_eq!(Format::Json.extension(), "json");
        assert_eq!(Format::Markdown.extension(), "md");
        assert_eq!(Format::Markdown.to_string(), "markdown");
    }

    #[test]
    fn test_html_is_unsupported() {
        let err = FileExporter::new(Format::Html).unwrap_err();
        assert!(matches!(err, ExportError::Unsupported(Format::Html)));
        assert_eq!(err.to_string(), "html format not yet implemented");
    }

    #[test]
    fn test_export_counts_bytes() {
        let project = project();
        let exporter = FileExporter::new(Format::Markdown).unwrap();
        let mut buf = Vec::new();

        let bytes = exporter
            .export(&mut buf, ExportTarget::Project(&project))
            .unwrap();

        assert_eq!(bytes, buf.len() as u64);
        assert!(String::from_utf8(buf).unwrap().starts_with("# Project: app\n"));
    }

    #[test]
    fn test_export_session_and_projects_json() {
        let projects = vec![project(), project()];
        let exporter = FileExporter::json(JsonOptions {
            pretty: false,
            include_raw_messages: false,
        });

        let mut buf = Vec::new();
        exporter
            .export(&mut buf, ExportTarget::Projects(&projects))
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["project_count"], 2);

        let mut buf = Vec::new();
        exporter
            .export(&mut buf, ExportTarget::Session(&projects[0].sessions[0]))
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["id"], "s1");
    }

    #[test]
    fn test_export_to_file_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/out.json");
        let project = project();
        let exporter = FileExporter::new(Format::Json).unwrap();

        let bytes = exporter
            .export_to_file(&path, ExportTarget::Project(&project))
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(bytes, written.len() as u64);
        assert!(written.contains("\"encoded_path\": \"-Users-test-app\""));
    }

    #[test]
    fn test_export_to_file_reports_create_failure() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened as the output file.
        let err = FileExporter::new(Format::Json)
            .unwrap()
            .export_to_file(dir.path(), ExportTarget::Projects(&[]))
            .unwrap_err();
        assert!(matches!(err, ExportError::CreateFile { .. }));
    }
}

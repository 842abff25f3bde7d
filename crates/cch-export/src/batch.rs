//! One file per project or session.

use std::fs;
use std::path::{Path, PathBuf};

use cch_core::{Project, Session};

use crate::error::ExportError;
use crate::exporter::{ExportTarget, FileExporter, Format};

/// A single failed item in a batch.
#[derive(Debug)]
pub struct BatchItemError {
    pub item: String,
    pub error: ExportError,
}

#[derive(Debug)]
pub struct BatchExportResult {
    pub total_items: usize,
    pub success_count: usize,
    pub files: Vec<PathBuf>,
    pub errors: Vec<BatchItemError>,
    pub format: Format,
}

impl BatchExportResult {
    const fn new(total_items: usize, format: Format) -> Self {
        Self {
            total_items,
            success_count: 0,
            files: Vec::new(),
            errors: Vec::new(),
            format,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Exported {}/{} items successfully in {} format",
            self.success_count, self.total_items, self.format
        )
    }
}

/// Writes each item to `output_dir`, naming files by substituting the item
/// name for `{}` in `name_pattern` and appending the format's extension.
pub struct BatchExporter {
    exporter: FileExporter,
    output_dir: PathBuf,
    name_pattern: String,
}

impl BatchExporter {
    pub fn new(
        exporter: FileExporter,
        output_dir: impl Into<PathBuf>,
        name_pattern: impl Into<String>,
    ) -> Self {
        Self {
            exporter,
            output_dir: output_dir.into(),
            name_pattern: name_pattern.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        let stem = self.name_pattern.replace("{}", name);
        self.output_dir
            .join(format!("{stem}.{}", self.exporter.format().extension()))
    }

    fn ensure_output_dir(&self) -> Result<(), ExportError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| ExportError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })
    }

    /// Export each project to its own file. Per-project failures are
    /// collected in the result; only failing to create the output
    /// directory aborts the batch.
    pub fn export_projects(&self, projects: &[Project]) -> Result<BatchExportResult, ExportError> {
        self.ensure_output_dir()?;
        let items = projects
            .iter()
            .map(|p| (p.name(), p.id.as_str(), ExportTarget::Project(p)));
        Ok(self.export_all(projects.len(), items))
    }

    /// Export each session to its own file.
    pub fn export_sessions(&self, sessions: &[Session]) -> Result<BatchExportResult, ExportError> {
        self.ensure_output_dir()?;
        let items = sessions
            .iter()
            .map(|s| (s.display_id(), s.display_id(), ExportTarget::Session(s)));
        Ok(self.export_all(sessions.len(), items))
    }

    fn export_all<'a>(
        &self,
        total: usize,
        items: impl Iterator<Item = (&'a str, &'a str, ExportTarget<'a>)>,
    ) -> BatchExportResult {
        let mut result = BatchExportResult::new(total, self.exporter.format());
        for (name, item, target) in items {
            let path = self.file_path(name);
            match self.exporter.export_to_file(&path, target) {
                Ok(_) => {
                    result.success_count += 1;
                    result.files.push(path);
                }
                Err(error) => {
                    tracing::warn!(item, error = %error, "batch export failed");
                    result.errors.push(BatchItemError {
                        item: item.to_string(),
                        error,
                    });
                }
            }
        }
        result
    }
}

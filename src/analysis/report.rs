use crate::error::AnalysisError;
use crate::tables::{DiskRecord, ProcessRecord};
use chrono::{DateTime, Local};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Everything one analysis pass produced
///
/// Each artifact is optional, so every field may be empty. Failures while
/// handling one artifact end up in `errors` and never stop the others.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub log_dir: PathBuf,
    pub generated_at: DateTime<Local>,
    /// Processes shown in the memory chart, highest first
    pub top_processes: Vec<ProcessRecord>,
    pub process_chart: Option<PathBuf>,
    /// First lines of the vm_stat dump
    pub vm_preview: Vec<String>,
    pub vm_free_bytes: Option<u64>,
    /// Every filesystem from the disk usage dump
    pub disks: Vec<DiskRecord>,
    pub disk_chart: Option<PathBuf>,
    /// Informational messages such as missing artifacts
    pub notices: Vec<String>,
    pub errors: Vec<String>,
}

impl AnalysisReport {
    pub fn new(log_dir: &Path) -> Self {
        Self {
            log_dir: log_dir.to_path_buf(),
            generated_at: Local::now(),
            top_processes: Vec::new(),
            process_chart: None,
            vm_preview: Vec::new(),
            vm_free_bytes: None,
            disks: Vec::new(),
            disk_chart: None,
            notices: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Paths of all charts rendered during the pass
    pub fn charts(&self) -> Vec<&Path> {
        self.process_chart
            .iter()
            .chain(self.disk_chart.iter())
            .map(PathBuf::as_path)
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<(), AnalysisError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("Summary written to {}", path.display());
        Ok(())
    }
}

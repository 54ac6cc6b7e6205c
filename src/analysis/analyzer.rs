use crate::analysis::report::AnalysisReport;
use crate::charts::{BarChart, ChartViewer};
use crate::config::{AnalysisConfig, TablesConfig};
use crate::error::AnalysisError;
use crate::runner::CommandRunner;
use crate::tables::{DiskTable, ProcessTable, VmStats};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

pub const PROCESS_CHART_FILE: &str = "process_memory.svg";
pub const DISK_CHART_FILE: &str = "disk_usage.svg";

/// Loads the collected log files and renders the summary charts
///
/// The three artifacts are independent: a missing file is skipped and a
/// broken one is reported without affecting the others.
pub struct LogAnalyzer<'a, R: CommandRunner> {
    tables: &'a TablesConfig,
    analysis: &'a AnalysisConfig,
    /// Directory the charts of this run are written to
    output_dir: PathBuf,
    viewer: Option<ChartViewer<'a, R>>,
}

impl<'a, R: CommandRunner> LogAnalyzer<'a, R> {
    pub fn new(tables: &'a TablesConfig, analysis: &'a AnalysisConfig, output_dir: PathBuf) -> Self {
        Self {
            tables,
            analysis,
            output_dir,
            viewer: None,
        }
    }

    /// Open every rendered chart with `viewer`
    pub fn with_viewer(mut self, viewer: ChartViewer<'a, R>) -> Self {
        self.viewer = Some(viewer);
        self
    }

    /// Analyze whatever artifacts exist in `log_dir`
    ///
    /// Previews are printed to stdout and charts are written to the output
    /// directory, which is created on demand.
    ///
    /// # Arguments
    ///
    /// * `log_dir` - Directory the collector script wrote into
    ///
    /// # Returns
    ///
    /// An [`AnalysisReport`] with whatever could be produced. Per-file
    /// failures are listed in its `errors` instead of being returned.
    pub fn load_and_analyze(&self, log_dir: &Path) -> AnalysisReport {
        info!("Analyzing logs in {}", log_dir.display());
        let mut report = AnalysisReport::new(log_dir);

        let process_file = log_dir.join(&self.tables.process_file);
        if process_file.exists() {
            if let Err(e) = self.analyze_processes(&process_file, &mut report) {
                self.record_error(&mut report, &self.tables.process_file, e);
            }
        } else {
            println!("No process data found.");
            report.notices.push("No process data found.".to_string());
        }

        let vm_file = log_dir.join(&self.tables.vm_file);
        if vm_file.exists() {
            if let Err(e) = self.analyze_vm_stats(&vm_file, &mut report) {
                self.record_error(&mut report, &self.tables.vm_file, e);
            }
        } else {
            debug!("No memory statistics at {}", vm_file.display());
        }

        let disk_file = log_dir.join(&self.tables.disk_file);
        if disk_file.exists() {
            if let Err(e) = self.analyze_disks(&disk_file, &mut report) {
                self.record_error(&mut report, &self.tables.disk_file, e);
            }
        } else {
            debug!("No disk usage data at {}", disk_file.display());
        }

        info!(
            "Analysis finished: {} chart(s), {} error(s)",
            report.charts().len(),
            report.errors.len()
        );
        report
    }

    fn analyze_processes(&self, path: &Path, report: &mut AnalysisReport) -> Result<(), AnalysisError> {
        let text = std::fs::read_to_string(path)?;
        let table = ProcessTable::parse(&text, &self.tables.process_columns)?;
        info!("Loaded {} processes from {}", table.records().len(), path.display());
        print!("{}", table.table().preview(self.analysis.preview_rows));

        let top = table.top_by_memory(self.analysis.top_n);
        report.top_processes = top.iter().map(|r| (*r).clone()).collect();

        let chart = BarChart::new(
            format!("Top {} processes by memory usage", self.analysis.top_n),
            self.tables.process_columns[3].clone(),
        )
        .with_bars(top.iter().map(|r| (r.command.clone(), r.mem)));

        report.process_chart = Some(self.render_and_show(&chart, PROCESS_CHART_FILE)?);
        Ok(())
    }

    fn analyze_vm_stats(&self, path: &Path, report: &mut AnalysisReport) -> Result<(), AnalysisError> {
        let stats = VmStats::parse(&std::fs::read_to_string(path)?);

        let head = stats.head(self.analysis.vm_preview_lines);
        for line in head {
            println!("{}", line);
        }
        report.vm_preview = head.to_vec();
        report.vm_free_bytes = stats.free_bytes();

        match stats.free_bytes() {
            Some(free) => debug!(
                "vm_stat: {} counters, {:.1} MiB free",
                stats.entries().len(),
                free as f64 / (1024.0 * 1024.0)
            ),
            None => debug!("vm_stat: {} counters", stats.entries().len()),
        }
        Ok(())
    }

    fn analyze_disks(&self, path: &Path, report: &mut AnalysisReport) -> Result<(), AnalysisError> {
        let text = std::fs::read_to_string(path)?;
        let table = DiskTable::parse(&text, &self.tables.disk_columns)?;
        info!("Loaded {} filesystems from {}", table.records().len(), path.display());
        print!("{}", table.table().preview(self.analysis.preview_rows));

        report.disks = table.records().to_vec();

        let chart = BarChart::new("Disk Usage", self.tables.disk_columns[4].clone()).with_bars(
            table
                .records()
                .iter()
                .map(|r| (r.filesystem.clone(), r.use_percent.unwrap_or(0.0))),
        );

        report.disk_chart = Some(self.render_and_show(&chart, DISK_CHART_FILE)?);
        Ok(())
    }

    fn render_and_show(&self, chart: &BarChart, file_name: &str) -> Result<PathBuf, AnalysisError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(file_name);
        chart.render_svg(&path)?;
        info!("Chart '{}' written to {}", chart.title, path.display());

        if let Some(viewer) = &self.viewer {
            // A chart that cannot be shown is still on disk
            if let Err(e) = viewer.show(&path) {
                warn!("Could not display {}: {}", path.display(), e);
            }
        }

        Ok(path)
    }

    fn record_error(&self, report: &mut AnalysisReport, file: &str, e: AnalysisError) {
        error!("Failed to analyze {}: {}", file, e);
        report.errors.push(format!("{}: {}", file, e));
    }
}

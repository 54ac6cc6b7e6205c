use crate::error::ChartError;
use log::debug;
use plotters::prelude::*;
use std::path::Path;

const WIDTH: u32 = 1000;
const BASE_HEIGHT: u32 = 120;
const BAR_HEIGHT: u32 = 32;
const MAX_LABEL_CHARS: usize = 48;

/// Horizontal bar chart, one bar per labelled value
///
/// Bars are drawn top to bottom in the order they were added.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    /// Description of the value axis
    pub value_label: String,
    pub bars: Vec<(String, f64)>,
}

impl BarChart {
    pub fn new(title: impl Into<String>, value_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value_label: value_label.into(),
            bars: Vec::new(),
        }
    }

    /// Append `(label, value)` pairs, keeping their order
    pub fn with_bars<I, S>(mut self, bars: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.bars
            .extend(bars.into_iter().map(|(label, value)| (label.into(), value)));
        self
    }

    /// Upper bound of the value axis, with some headroom
    fn value_max(&self) -> f64 {
        let max = self.bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);
        (max * 1.05).max(1.0)
    }

    /// Render the chart as an SVG file
    ///
    /// The image grows with the number of bars. Long labels are cut to keep
    /// the label area readable.
    ///
    /// # Arguments
    ///
    /// * `path` - Destination file; its directory must already exist
    ///
    /// # Errors
    ///
    /// `ChartError::Empty` when there is nothing to draw and
    /// `ChartError::Render` for any drawing failure.
    pub fn render_svg(&self, path: &Path) -> Result<(), ChartError> {
        if self.bars.is_empty() {
            return Err(ChartError::Empty(self.title.clone()));
        }

        let count = self.bars.len();
        let height = BASE_HEIGHT + BAR_HEIGHT * count as u32;
        debug!(
            "Rendering '{}' with {} bars to {}",
            self.title,
            count,
            path.display()
        );

        // Slot 0 is the bottom of the plot, so the first bar gets the top slot
        let labels: Vec<String> = self
            .bars
            .iter()
            .rev()
            .map(|(label, _)| truncate_label(label, MAX_LABEL_CHARS))
            .collect();
        let label_area = labels
            .iter()
            .map(|l| l.chars().count() as u32)
            .max()
            .unwrap_or(0)
            .saturating_mul(7)
            .clamp(60, 360);

        let root = SVGBackend::new(path, (WIDTH, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(label_area)
            .build_cartesian_2d(0f64..self.value_max(), (0..count).into_segmented())
            .map_err(render_error)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(count + 1)
            .y_label_formatter(&|slot| match slot {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                    labels.get(*i).cloned().unwrap_or_default()
                }
                _ => String::new(),
            })
            .x_desc(self.value_label.as_str())
            .draw()
            .map_err(render_error)?;

        chart
            .draw_series(self.bars.iter().enumerate().map(|(i, (_, value))| {
                let slot = count - 1 - i;
                let mut bar = Rectangle::new(
                    [
                        (0.0, SegmentValue::Exact(slot)),
                        (*value, SegmentValue::Exact(slot + 1)),
                    ],
                    BLUE.mix(0.7).filled(),
                );
                bar.set_margin(4, 4, 0, 0);
                bar
            }))
            .map_err(render_error)?;

        root.present().map_err(render_error)?;
        Ok(())
    }
}

fn render_error<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

/// Shorten a label to `max` characters, marking the cut with `...`
pub(crate) fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        return label.to_string();
    }
    let kept: String = label.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

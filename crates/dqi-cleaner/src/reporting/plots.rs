//! Histogram and boxplot rendering for numeric columns.

use crate::error::{CleaningError, Result};
use crate::utils::quantile_sorted;
use image::{Rgb, RgbImage};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const MARGIN: u32 = 20;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const BAR: Rgb<u8> = Rgb([70, 130, 180]);
const AXIS: Rgb<u8> = Rgb([90, 90, 90]);
const MEDIAN: Rgb<u8> = Rgb([220, 90, 40]);

/// File name of the combined boxplot.
pub const BOXPLOT_FILE_NAME: &str = "boxplot.png";

/// Produces charts of numeric columns and returns references to them.
pub trait PlotRenderer: Send + Sync {
    /// Render a histogram of `values` and return where it can be found.
    fn render_histogram(&self, column: &str, values: &[f64]) -> Result<String>;

    /// Render one boxplot across several columns on a shared axis.
    ///
    /// Renderers without boxplot support return `Ok(None)`.
    fn render_boxplot(&self, _columns: &[(String, Vec<f64>)]) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Five-number box of one column: whisker ends, quartiles and median.
///
/// Whiskers stop at the most extreme values within 1.5 IQR of the box;
/// values beyond them are returned as outliers.
#[derive(Debug, Clone, PartialEq)]
struct BoxStats {
    low: f64,
    q1: f64,
    median: f64,
    q3: f64,
    high: f64,
    outliers: Vec<f64>,
}

impl BoxStats {
    fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile_sorted(&sorted, 0.25)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let reach = 1.5 * (q3 - q1);
        let (lower, upper) = (q1 - reach, q3 + reach);

        let inside = || sorted.iter().copied().filter(|v| *v >= lower && *v <= upper);
        Some(Self {
            low: inside().next().unwrap_or(q1),
            q1,
            median,
            q3,
            high: inside().last().unwrap_or(q3),
            outliers: sorted
                .iter()
                .copied()
                .filter(|v| *v < lower || *v > upper)
                .collect(),
        })
    }
}

/// Image file name for a column, spaces replaced by underscores.
pub fn plot_file_name(column: &str) -> String {
    format!("{}.png", column.replace(' ', "_"))
}

/// Writes histograms and the combined boxplot as PNG files.
///
/// Returned references have the form `plots/<file>`; the files themselves
/// go to `output_dir`.
#[derive(Debug, Clone)]
pub struct PngPlotRenderer {
    output_dir: PathBuf,
    bins: usize,
    width: u32,
    height: u32,
}

impl PngPlotRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            bins: 20,
            width: 640,
            height: 400,
        }
    }

    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins.max(1);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Count values per equal-width bin between the minimum and maximum.
    fn bin_counts(&self, values: &[f64]) -> Vec<usize> {
        let mut counts = vec![0usize; self.bins];
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let (Some(min), Some(max)) = (
            finite.iter().copied().reduce(f64::min),
            finite.iter().copied().reduce(f64::max),
        ) else {
            return counts;
        };

        let span = max - min;
        for v in finite {
            let index = if span == 0.0 {
                0
            } else {
                (((v - min) / span) * self.bins as f64) as usize
            };
            counts[index.min(self.bins - 1)] += 1;
        }
        counts
    }

    fn draw(&self, counts: &[usize]) -> Option<RgbImage> {
        let plot_width = self.width.checked_sub(2 * MARGIN).filter(|w| *w > 0)?;
        let plot_height = self.height.checked_sub(2 * MARGIN).filter(|h| *h > 0)?;
        let mut img = RgbImage::from_pixel(self.width, self.height, BACKGROUND);

        let baseline = self.height - MARGIN;
        let max_count = counts.iter().copied().max().unwrap_or(0).max(1);
        let bar_width = (plot_width / counts.len() as u32).max(1);

        for (i, &count) in counts.iter().enumerate() {
            let bar_height = ((count as f64 / max_count as f64) * plot_height as f64) as u32;
            let x_start = MARGIN + i as u32 * bar_width;
            // One pixel gap between bars
            let x_end = (x_start + bar_width.saturating_sub(1).max(1)).min(self.width - MARGIN);
            for x in x_start..x_end {
                for y in (baseline - bar_height)..baseline {
                    img.put_pixel(x, y, BAR);
                }
            }
        }

        for x in MARGIN..(self.width - MARGIN) {
            img.put_pixel(x, baseline, AXIS);
        }
        for y in MARGIN..=baseline {
            img.put_pixel(MARGIN, y, AXIS);
        }

        Some(img)
    }

    fn draw_boxes(&self, boxes: &[BoxStats]) -> Option<RgbImage> {
        let plot_width = self.width.checked_sub(2 * MARGIN).filter(|w| *w > 0)?;
        let plot_height = self.height.checked_sub(2 * MARGIN).filter(|h| *h > 0)?;
        let slot = plot_width / boxes.len().max(1) as u32;
        if slot < 4 {
            return None;
        }
        let mut img = RgbImage::from_pixel(self.width, self.height, BACKGROUND);
        let baseline = self.height - MARGIN;

        let min = boxes
            .iter()
            .map(|b| b.outliers.first().copied().unwrap_or(b.low).min(b.low))
            .reduce(f64::min)?;
        let max = boxes
            .iter()
            .map(|b| b.outliers.last().copied().unwrap_or(b.high).max(b.high))
            .reduce(f64::max)?;
        let span = max - min;
        let to_y = |v: f64| -> u32 {
            let share = if span > 0.0 && span.is_finite() {
                (v - min) / span
            } else {
                0.5
            };
            baseline - (share.clamp(0.0, 1.0) * plot_height as f64) as u32
        };

        for (i, stats) in boxes.iter().enumerate() {
            let left = MARGIN + i as u32 * slot + slot / 4;
            let right = MARGIN + i as u32 * slot + 3 * slot / 4;
            let center = MARGIN + i as u32 * slot + slot / 2;
            let (top, bottom) = (to_y(stats.q3), to_y(stats.q1));

            for x in left..=right {
                img.put_pixel(x, top, BAR);
                img.put_pixel(x, bottom, BAR);
                img.put_pixel(x, to_y(stats.median), MEDIAN);
            }
            for y in top..=bottom {
                img.put_pixel(left, y, BAR);
                img.put_pixel(right, y, BAR);
            }
            for y in to_y(stats.high)..=top {
                img.put_pixel(center, y, AXIS);
            }
            for y in bottom..=to_y(stats.low) {
                img.put_pixel(center, y, AXIS);
            }
            for &v in &stats.outliers {
                img.put_pixel(center, to_y(v), MEDIAN);
            }
        }

        for x in MARGIN..(self.width - MARGIN) {
            img.put_pixel(x, baseline, AXIS);
        }
        for y in MARGIN..=baseline {
            img.put_pixel(MARGIN, y, AXIS);
        }

        Some(img)
    }

    fn save(&self, img: &RgbImage, file_name: &str, column: &str) -> Result<String> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(file_name);
        img.save(&path).map_err(|e| CleaningError::PlotRendering {
            column: column.to_string(),
            reason: e.to_string(),
        })?;
        debug!("Plot for '{}' written to {}", column, path.display());
        Ok(format!("plots/{}", file_name))
    }
}

impl PlotRenderer for PngPlotRenderer {
    fn render_histogram(&self, column: &str, values: &[f64]) -> Result<String> {
        let counts = self.bin_counts(values);
        let img = self.draw(&counts).ok_or_else(|| CleaningError::PlotRendering {
            column: column.to_string(),
            reason: format!("image size {}x{} is too small", self.width, self.height),
        })?;
        self.save(&img, &plot_file_name(column), column)
    }

    fn render_boxplot(&self, columns: &[(String, Vec<f64>)]) -> Result<Option<String>> {
        let boxes: Vec<BoxStats> = columns
            .iter()
            .filter_map(|(_, values)| BoxStats::from_values(values))
            .collect();
        if boxes.is_empty() {
            return Ok(None);
        }

        let label = columns
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let img = self
            .draw_boxes(&boxes)
            .ok_or_else(|| CleaningError::PlotRendering {
                column: label.clone(),
                reason: format!(
                    "image size {}x{} is too small for {} boxes",
                    self.width,
                    self.height,
                    boxes.len()
                ),
            })?;
        self.save(&img, BOXPLOT_FILE_NAME, &label).map(Some)
    }
}

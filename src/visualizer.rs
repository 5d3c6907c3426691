use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use plotters::element::Pie;
use plotters::prelude::*;
use polars::prelude::*;

use crate::aggregator::{age_bin_counts, value_counts, AGE_BIN_EDGES};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::records::Hospital;

static HISTOGRAM_FILE_NAME: &str = "age_histogram.png";
static PIE_FILE_NAME: &str = "diagnosis_pie.png";
static VIOLIN_FILE_NAME: &str = "height_violin.png";

const CHART_SIZE: (u32, u32) = (1024, 768);
const VIOLIN_POINTS: usize = 100;
const VIOLIN_HALF_WIDTH: f64 = 0.4;

type DrawResult<T> = std::result::Result<T, Box<dyn Error>>;

#[derive(Debug, Clone, PartialEq)]
pub struct AgeBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeightGroup {
    pub label: &'static str,
    pub heights: Vec<f64>,
}

pub fn age_histogram(df: &DataFrame) -> Result<Vec<AgeBin>> {
    let counts = age_bin_counts(df)?;
    Ok(AGE_BIN_EDGES
        .windows(2)
        .zip(counts)
        .map(|(edge, count)| AgeBin {
            start: edge[0],
            end: edge[1],
            count,
        })
        .collect())
}

/// Diagnosis frequencies, most frequent first.
pub fn diagnosis_slices(df: &DataFrame) -> Result<Vec<(String, usize)>> {
    let counts = value_counts(df, "diagnosis", |_| true)?;
    let mut slices: Vec<(String, usize)> = counts.into_iter().collect();
    slices.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(slices)
}

pub fn height_groups(df: &DataFrame) -> Result<Vec<HeightGroup>> {
    let hospitals = df.column("hospital")?.utf8()?;
    let heights = df.column("height")?.f64()?;

    Ok(Hospital::ALL
        .iter()
        .map(|hospital| HeightGroup {
            label: hospital.label(),
            heights: hospitals
                .into_iter()
                .zip(heights.into_iter())
                .filter(|(h, _)| *h == Some(hospital.key()))
                .filter_map(|(_, height)| height)
                .collect(),
        })
        .collect())
}

/// Gaussian kernel density of `values` sampled at `points` evenly spaced
/// positions over their range. Bandwidth follows Scott's rule.
pub fn density(values: &[f64], points: usize) -> Vec<(f64, f64)> {
    if values.is_empty() || points < 2 {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut bandwidth = variance.sqrt() * n.powf(-0.2);
    if bandwidth <= f64::EPSILON {
        bandwidth = 1.0;
    }
    let norm = n * bandwidth * (2.0 * std::f64::consts::PI).sqrt();

    let step = (max - min) / (points - 1) as f64;
    (0..points)
        .map(|i| {
            let x = min + step * i as f64;
            let y = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                / norm;
            (x, y)
        })
        .collect()
}

fn draw_histogram(path: &Path, bins: &[AgeBin]) -> DrawResult<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let top = bins.iter().map(|b| b.count).max().unwrap_or(0) as u32 + 1;
    let first = bins.first().map(|b| b.start).unwrap_or(0.0);
    let last = bins.last().map(|b| b.end).unwrap_or(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption("Patients by age", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(first..last, 0u32..top)?;
    chart.configure_mesh().x_desc("Age").y_desc("Patients").draw()?;

    chart.draw_series(bins.iter().map(|bin| {
        Rectangle::new([(bin.start, 0), (bin.end, bin.count as u32)], BLUE.filled())
    }))?;
    chart.draw_series(bins.iter().map(|bin| {
        Rectangle::new([(bin.start, 0), (bin.end, bin.count as u32)], BLACK.stroke_width(1))
    }))?;

    root.present()?;
    Ok(())
}

fn draw_pie(path: &Path, slices: &[(String, usize)]) -> DrawResult<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (width, height) = root.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.35;

    let sizes: Vec<f64> = slices.iter().map(|(_, count)| *count as f64).collect();
    let labels: Vec<&str> = slices.iter().map(|(name, _)| name.as_str()).collect();
    let colors: Vec<RGBColor> = (0..slices.len())
        .map(|i| {
            let color = Palette99::pick(i).to_rgba();
            RGBColor(color.0, color.1, color.2)
        })
        .collect();

    let mut pie = Pie::new(&center, &radius, &sizes[..], &colors[..], &labels[..]);
    pie.label_style(("sans-serif", 20).into_font().color(&BLACK));
    root.draw(&pie)?;

    root.present()?;
    Ok(())
}

fn draw_violin(path: &Path, groups: &[HeightGroup]) -> DrawResult<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let all = groups.iter().flat_map(|g| g.heights.iter().copied());
    let (low, high) = all.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), h| {
        (lo.min(h), hi.max(h))
    });
    let (low, high) = if low.is_finite() { (low, high) } else { (0.0, 1.0) };
    let pad = ((high - low) * 0.05).max(0.1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Height by hospital", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.5f64..groups.len() as f64 + 0.5, (low - pad)..(high + pad))?;

    let labels: Vec<&str> = groups.iter().map(|g| g.label).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len())
        .x_label_formatter(&|x| {
            let slot = x.round() as usize;
            if (x - x.round()).abs() < 1e-6 && (1..=labels.len()).contains(&slot) {
                labels[slot - 1].to_string()
            } else {
                String::new()
            }
        })
        .y_desc("Height")
        .draw()?;

    for (i, group) in groups.iter().enumerate() {
        let curve = density(&group.heights, VIOLIN_POINTS);
        let peak = curve.iter().map(|(_, y)| *y).fold(0.0, f64::max);
        if peak <= 0.0 {
            continue;
        }
        let center = (i + 1) as f64;
        let scale = VIOLIN_HALF_WIDTH / peak;

        let mut outline: Vec<(f64, f64)> = curve
            .iter()
            .map(|(h, d)| (center + d * scale, *h))
            .collect();
        outline.extend(curve.iter().rev().map(|(h, d)| (center - d * scale, *h)));

        let color = Palette99::pick(i);
        chart.draw_series(std::iter::once(Polygon::new(outline.clone(), color.mix(0.4).filled())))?;
        chart.draw_series(std::iter::once(PathElement::new(outline, color.stroke_width(2))))?;
    }

    root.present()?;
    Ok(())
}

fn rendered(chart: &'static str, path: PathBuf, result: DrawResult<()>) -> Result<PathBuf> {
    result.map_err(|e| PipelineError::Render {
        chart,
        message: e.to_string(),
    })?;
    info!("wrote {} to {}", chart, path.display());
    Ok(path)
}

/// Renders the three charts into the output directory.
pub fn render_all(df: &DataFrame, config: &Config) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&config.output_dir)?;

    let bins = age_histogram(df)?;
    let path = config.output_path(HISTOGRAM_FILE_NAME);
    let histogram = rendered("age histogram", path.clone(), draw_histogram(&path, &bins))?;

    let slices = diagnosis_slices(df)?;
    let path = config.output_path(PIE_FILE_NAME);
    let pie = rendered("diagnosis pie chart", path.clone(), draw_pie(&path, &slices))?;

    let groups = height_groups(df)?;
    let path = config.output_path(VIOLIN_FILE_NAME);
    let violin = rendered("height violin plot", path.clone(), draw_violin(&path, &groups))?;

    Ok(vec![histogram, pie, violin])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned() -> DataFrame {
        df!(
            "hospital" => &["general", "prenatal", "sports", "general", "sports"],
            "age" => &[Some(10.0), Some(30.0), Some(20.0), None, Some(80.0)],
            "height" => &[Some(1.7), Some(1.6), Some(6.1), Some(1.8), None],
            "diagnosis" => &["cold", "pregnancy", "sprain", "cold", "0"],
        )
        .unwrap()
    }

    #[test]
    fn histogram_uses_fixed_edges() {
        let bins = age_histogram(&cleaned()).unwrap();
        let counts: Vec<_> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 2, 0, 0, 1]);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[4].end, 80.0);
    }

    #[test]
    fn pie_slices_most_frequent_first() {
        let slices = diagnosis_slices(&cleaned()).unwrap();
        assert_eq!(slices[0], ("cold".to_string(), 2));
        assert_eq!(slices.len(), 4);
        let total: usize = slices.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn height_groups_in_fixed_order() {
        let groups = height_groups(&cleaned()).unwrap();
        let labels: Vec<_> = groups.iter().map(|g| g.label).collect();
        assert_eq!(labels, vec!["General", "Prenatal", "Sports"]);
        assert_eq!(groups[0].heights, vec![1.7, 1.8]);
        assert_eq!(groups[2].heights, vec![6.1]);
    }

    #[test]
    fn density_peaks_near_the_data() {
        let curve = density(&[1.0, 2.0, 2.0, 3.0], 5);
        assert_eq!(curve.len(), 5);
        assert_eq!(curve[0].0, 1.0);
        assert_eq!(curve[4].0, 3.0);
        let peak = curve
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert_eq!(peak.0, 2.0);
        assert!(density(&[], 5).is_empty());
    }
}

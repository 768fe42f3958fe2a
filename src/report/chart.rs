//! Grouped bar chart of per-kinase motif frequency, written as SVG.
//!
//! One group per kinase (sorted by name), one bar per input file. The y axis
//! is the percentage of the file's sequences that carry the motif.

use crate::errors::{KinaseMotifError, Result};
use crate::scoring::aggregator::RunSummary;
use log::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    pub font_size: u32,
    pub background_color: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 500,
            font_family: "Arial, sans-serif".to_string(),
            font_size: 12,
            background_color: "#ffffff".to_string(),
            x_label: "Kinase site".to_string(),
            y_label: "% input sequences".to_string(),
        }
    }
}

const MARGIN_LEFT: f32 = 70.0;
const MARGIN_RIGHT: f32 = 20.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 110.0;

/// Hue spread over [0, 0.8) so the first and last file never share a colour.
pub fn file_colors(n_files: usize) -> Vec<String> {
    (0..n_files)
        .map(|f| {
            let hue = 0.8 * f as f32 / n_files as f32;
            let (r, g, b) = hsv_to_rgb(hue, 1.0, 0.9);
            format!(
                "#{:02X}{:02X}{:02X}",
                (r * 255.0) as u8,
                (g * 255.0) as u8,
                (b * 255.0) as u8
            )
        })
        .collect()
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (v, v, v);
    }
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (i as i32).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Upper bound of the y axis: the largest bar rounded up to a multiple of
/// ten, never below ten and never above a hundred.
fn y_axis_max(summary: &RunSummary) -> f32 {
    let max_pct = summary
        .files
        .iter()
        .flat_map(|f| f.percentages.values())
        .fold(0.0_f64, |acc, x| acc.max(*x)) as f32;
    ((max_pct / 10.0).ceil() * 10.0).clamp(10.0, 100.0)
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub struct SummaryChart<'a> {
    config: ChartConfig,
    summary: &'a RunSummary,
}

impl<'a> SummaryChart<'a> {
    pub fn new(summary: &'a RunSummary) -> Self {
        Self {
            config: ChartConfig::default(),
            summary,
        }
    }

    pub fn to_svg(&self) -> String {
        let cfg = &self.config;
        let width = cfg.width as f32;
        let height = cfg.height as f32;
        let plot_w = width - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = height - MARGIN_TOP - MARGIN_BOTTOM;
        let base_y = MARGIN_TOP + plot_h;

        let kinases = self.summary.kinase_names();
        let n_keys = kinases.len().max(1) as f32;
        let n_files = self.summary.len();
        let colors = file_colors(n_files);
        let group_w = plot_w / n_keys;
        let bar_w = group_w * 0.8 / n_files.max(1) as f32;
        let y_max = y_axis_max(self.summary);
        let scale = plot_h / y_max;

        let mut elements = Vec::new();
        elements.push(format!(
            r#"<rect width="{}" height="{}" fill="{}"/>"#,
            width, height, cfg.background_color
        ));

        // Grid and y ticks.
        let mut tick = 0.0;
        while tick <= y_max + 1e-3 {
            let y = base_y - tick * scale;
            elements.push(format!(
                "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#dddddd\" stroke-width=\"1\"/>",
                MARGIN_LEFT, y, MARGIN_LEFT + plot_w, y
            ));
            elements.push(format!(
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="{}">{}</text>"#,
                MARGIN_LEFT - 6.0,
                y + cfg.font_size as f32 / 3.0,
                cfg.font_size,
                tick
            ));
            tick += y_max / 5.0;
        }

        for (f, file) in self.summary.files.iter().enumerate() {
            let offset = group_w * (0.1 + 0.8 * f as f32 / n_files as f32);
            for (k, kinase) in kinases.iter().enumerate() {
                let pct = file.percentage(kinase) as f32;
                let bar_h = pct * scale;
                elements.push(format!(
                    r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"><title>{}: {} {:.1}%</title></rect>"#,
                    MARGIN_LEFT + k as f32 * group_w + offset,
                    base_y - bar_h,
                    bar_w,
                    bar_h,
                    colors[f],
                    escape_xml(&file.file_id),
                    escape_xml(kinase),
                    pct
                ));
            }
        }

        // Axes.
        elements.push(format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#000000\" stroke-width=\"1\"/>",
            MARGIN_LEFT, base_y, MARGIN_LEFT + plot_w, base_y
        ));
        elements.push(format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#000000\" stroke-width=\"1\"/>",
            MARGIN_LEFT, MARGIN_TOP, MARGIN_LEFT, base_y
        ));

        for (k, kinase) in kinases.iter().enumerate() {
            let x = MARGIN_LEFT + (k as f32 + 0.5) * group_w;
            let y = base_y + 8.0;
            elements.push(format!(
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="{}" transform="rotate(-90 {:.1} {:.1})">{}</text>"#,
                x,
                y,
                cfg.font_size,
                x,
                y,
                escape_xml(kinase)
            ));
        }

        elements.push(format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="{}">{}</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            height - 10.0,
            cfg.font_size,
            escape_xml(&cfg.x_label)
        ));
        let y_lab_x = 18.0;
        let y_lab_y = MARGIN_TOP + plot_h / 2.0;
        elements.push(format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="{}" transform="rotate(-90 {:.1} {:.1})">{}</text>"#,
            y_lab_x,
            y_lab_y,
            cfg.font_size,
            y_lab_x,
            y_lab_y,
            escape_xml(&cfg.y_label)
        ));

        // Legend, top right corner of the plot.
        let legend_font = cfg.font_size.saturating_sub(3).max(8) as f32;
        let legend_x = MARGIN_LEFT + plot_w - 180.0;
        for (f, file) in self.summary.files.iter().enumerate() {
            let y = MARGIN_TOP + 10.0 + f as f32 * (legend_font + 6.0);
            elements.push(format!(
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                legend_x,
                y - legend_font + 2.0,
                legend_font,
                legend_font,
                colors[f]
            ));
            elements.push(format!(
                r#"<text x="{:.1}" y="{:.1}" font-size="{}">{}</text>"#,
                legend_x + legend_font + 6.0,
                y,
                legend_font,
                escape_xml(&file.file_id)
            ));
        }

        let mut svg = String::new();
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" font-family="{}">"#,
            cfg.width,
            cfg.height,
            cfg.width,
            cfg.height,
            escape_xml(&cfg.font_family)
        ));
        svg.push('\n');
        for element in elements {
            svg.push_str(&element);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, out_path: P) -> Result<()> {
        let out_path = out_path.as_ref();
        let mut file =
            File::create(out_path).map_err(|e| KinaseMotifError::io_at(out_path, e))?;
        file.write_all(self.to_svg().as_bytes())
            .map_err(|e| KinaseMotifError::io_at(out_path, e))?;
        info!("Written chart file {}", out_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchResult;
    use crate::scoring::aggregator::FileAggregator;

    fn two_file_summary() -> RunSummary {
        let kinases = ["CK2", "PKA"];
        let mut run = RunSummary::new();

        let mut agg = FileAggregator::new("first", &kinases);
        let mut hit = MatchResult::new();
        hit.record_hit("PKA");
        agg.record(&hit);
        agg.record(&MatchResult::new());
        run.push(agg.finalize());

        run.push(FileAggregator::new("second <&>", &kinases).finalize());
        run
    }

    #[test]
    fn test_file_colors() {
        let colors = file_colors(2);
        assert_eq!(colors.len(), 2);
        // Pure red at hue 0, value 0.9.
        assert_eq!(colors[0], "#E50000");
        assert_ne!(colors[0], colors[1]);
        assert_eq!(file_colors(7).len(), 7);
    }

    #[test]
    fn test_y_axis_max() {
        let run = two_file_summary();
        assert_eq!(y_axis_max(&run), 50.0);
        assert_eq!(y_axis_max(&RunSummary::new()), 10.0);
    }

    #[test]
    fn test_svg_contents() {
        let run = two_file_summary();
        let svg = SummaryChart::new(&run).to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(">CK2</text>"));
        assert!(svg.contains(">PKA</text>"));
        assert!(svg.contains("% input sequences"));
        assert!(svg.contains("second &lt;&amp;&gt;"));
        assert!(!svg.contains("second <&>"));
        assert!(svg.contains("first: PKA 50.0%"));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn test_write_to_file() {
        let run = two_file_summary();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("motif_counts.svg");
        SummaryChart::new(&run).write_to_file(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, SummaryChart::new(&run).to_svg());
    }
}

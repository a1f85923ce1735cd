//! Plain-text rendering for the terminal front end.

use crate::core::engine::Prediction;
use crate::core::insights::{CorrelationMatrix, InsightReport, ScatterPoint};
use crate::domain::model::{Diagnosis, Feature, FeatureVector};
use crate::utils::error::PredictError;

const BAR_WIDTH: usize = 40;
const PLOT_WIDTH: usize = 48;
const PLOT_HEIGHT: usize = 14;

pub fn render_inputs(features: &FeatureVector) -> String {
    let mut out = String::from("🧬 Cell Nucleus Data\n");
    for feature in Feature::ALL {
        out.push_str(&format!("  {:<24} {:>10}\n", feature.label(), features.get(feature)));
    }
    out
}

pub fn render_prediction(prediction: &Prediction) -> String {
    let marker = match prediction.diagnosis {
        Diagnosis::Malignant => "⚠️",
        Diagnosis::Benign => "✅",
    };
    let mut out = format!("Prediction Result:\n{} {}\n", marker, prediction.diagnosis.message());
    for warning in &prediction.warnings {
        out.push_str(&format!("  note: {}\n", warning));
    }
    out
}

pub fn render_prediction_error(error: &PredictError) -> String {
    format!("⚠️ {}\nDetails: {}\n", error.user_friendly_message(), error)
}

pub fn render_unavailable(reason: &str) -> String {
    format!("📊 Dataset insights unavailable: {}\n", reason)
}

pub fn render_report(report: &InsightReport) -> String {
    let mut out = format!("📊 Reference dataset: {} records\n\n", report.record_count);

    out.push_str("Class distribution\n");
    let max = report.class_distribution.values().copied().max().unwrap_or(0);
    for (diagnosis, count) in &report.class_distribution {
        let bar = if max == 0 { 0 } else { count * BAR_WIDTH / max };
        out.push_str(&format!(
            "  {:<10} {:<width$} {}\n",
            diagnosis.name(),
            "#".repeat(bar),
            count,
            width = BAR_WIDTH
        ));
    }

    out.push_str(&format!(
        "\n{} vs {} (B = benign, M = malignant)\n",
        report.scatter_y, report.scatter_x
    ));
    out.push_str(&scatter_ascii(&report.scatter));

    out.push_str("\nCorrelation matrix\n");
    out.push_str(&correlation_table(&report.correlation));

    for (field, groups) in &report.box_plots {
        out.push_str(&format!("\n{} by diagnosis\n", field));
        out.push_str(&format!(
            "  {:<10} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
            "", "n", "min", "q1", "median", "q3", "max"
        ));
        for (diagnosis, s) in groups {
            out.push_str(&format!(
                "  {:<10} {:>6} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4}\n",
                diagnosis.name(),
                s.count,
                s.min,
                s.q1,
                s.median,
                s.q3,
                s.max
            ));
        }
    }

    for note in &report.omitted {
        out.push_str(&format!("\n⚠️ {}\n", note));
    }
    out
}

fn scatter_ascii(points: &[ScatterPoint]) -> String {
    if points.is_empty() {
        return "  (no data)\n".to_string();
    }

    let (min_x, max_x) = bounds(points.iter().map(|p| p.x));
    let (min_y, max_y) = bounds(points.iter().map(|p| p.y));
    let mut grid = vec![vec![' '; PLOT_WIDTH]; PLOT_HEIGHT];

    for p in points {
        let col = scale(p.x, min_x, max_x, PLOT_WIDTH);
        let row = PLOT_HEIGHT - 1 - scale(p.y, min_y, max_y, PLOT_HEIGHT);
        let mark = p.diagnosis.code().chars().next().unwrap_or('?');
        // 重疊時惡性優先顯示
        grid[row][col] = match (grid[row][col], mark) {
            ('M', _) => 'M',
            (_, m) => m,
        };
    }

    let mut out = format!("  {:>10.3} ┐\n", max_y);
    for row in grid {
        out.push_str(&format!("             │{}\n", row.into_iter().collect::<String>()));
    }
    out.push_str(&format!("  {:>10.3} └{}\n", min_y, "─".repeat(PLOT_WIDTH)));
    out.push_str(&format!(
        "             {:<.3}{:>width$.3}\n",
        min_x,
        max_x,
        width = PLOT_WIDTH - 4
    ));
    out
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

fn scale(value: f64, min: f64, max: f64, cells: usize) -> usize {
    if max <= min {
        return 0;
    }
    let pos = ((value - min) / (max - min) * (cells - 1) as f64).round() as usize;
    pos.min(cells - 1)
}

fn correlation_table(matrix: &CorrelationMatrix) -> String {
    let mut out = format!("  {:<24}", "");
    for field in matrix.fields() {
        out.push_str(&format!(" {:>7}", short_name(*field)));
    }
    out.push('\n');

    for (field, row) in matrix.fields().iter().zip(matrix.rows()) {
        out.push_str(&format!("  {:<24}", field.name()));
        for r in row {
            if r.is_nan() {
                out.push_str(&format!(" {:>7}", "n/a"));
            } else {
                out.push_str(&format!(" {:>7.3}", r));
            }
        }
        out.push('\n');
    }
    out
}

fn short_name(field: Feature) -> String {
    field.name().trim_end_matches("_mean").chars().take(7).collect()
}

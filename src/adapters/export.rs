use crate::core::insights::InsightReport;
use crate::domain::ports::Storage;
use crate::utils::error::{PredictError, Result};
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

#[derive(Debug, Serialize)]
struct BundleMetadata<'a> {
    generated_at: String,
    record_count: usize,
    scatter_x: &'a str,
    scatter_y: &'a str,
    omitted: &'a [String],
}

fn class_distribution_csv(report: &InsightReport) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["diagnosis", "count"])?;
    for (diagnosis, count) in &report.class_distribution {
        wtr.write_record([diagnosis.name(), count.to_string().as_str()])?;
    }
    finish(wtr)
}

fn scatter_csv(report: &InsightReport) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([report.scatter_x.name(), report.scatter_y.name(), "diagnosis"])?;
    for point in &report.scatter {
        wtr.write_record([point.x.to_string(), point.y.to_string(), point.diagnosis.name().to_string()])?;
    }
    finish(wtr)
}

fn correlation_csv(report: &InsightReport) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["field".to_string()];
    header.extend(report.correlation.fields().iter().map(|f| f.name().to_string()));
    wtr.write_record(&header)?;

    for (field, row) in report.correlation.fields().iter().zip(report.correlation.rows()) {
        let mut line = vec![field.name().to_string()];
        // NaN 以空欄位表示
        line.extend(row.iter().map(|r| if r.is_nan() { String::new() } else { format!("{:.6}", r) }));
        wtr.write_record(&line)?;
    }
    finish(wtr)
}

fn box_plots_csv(report: &InsightReport) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["field", "diagnosis", "count", "min", "q1", "median", "q3", "max"])?;
    for (field, groups) in &report.box_plots {
        for (diagnosis, s) in groups {
            wtr.write_record([
                field.name().to_string(),
                diagnosis.name().to_string(),
                s.count.to_string(),
                s.min.to_string(),
                s.q1.to_string(),
                s.median.to_string(),
                s.q3.to_string(),
                s.max.to_string(),
            ])?;
        }
    }
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    wtr.into_inner()
        .map_err(|e| PredictError::IoError(e.into_error()))
}

/// Packs the report tables into a ZIP archive.
pub fn bundle_report(report: &InsightReport) -> Result<Vec<u8>> {
    let metadata = BundleMetadata {
        generated_at: chrono::Utc::now().to_rfc3339(),
        record_count: report.record_count,
        scatter_x: report.scatter_x.name(),
        scatter_y: report.scatter_y.name(),
        omitted: &report.omitted,
    };

    let files: Vec<(&str, Vec<u8>)> = vec![
        ("class_distribution.csv", class_distribution_csv(report)?),
        ("scatter.csv", scatter_csv(report)?),
        ("correlation.csv", correlation_csv(report)?),
        ("box_plots.csv", box_plots_csv(report)?),
        ("metadata.json", serde_json::to_vec_pretty(&metadata)?),
    ];

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in files {
        zip.start_file::<_, ()>(name, FileOptions::default())?;
        zip.write_all(&data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

pub async fn export_report<S: Storage>(storage: &S, path: &str, report: &InsightReport) -> Result<String> {
    let data = bundle_report(report)?;
    tracing::debug!("Writing insight bundle ({} bytes) to {}", data.len(), path);
    storage.write_file(path, &data).await?;
    Ok(path.to_string())
}

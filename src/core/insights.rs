//! Dataset-level summaries that feed the reference visualizations.
//!
//! Every function here is a pure function of its `&Dataset` argument.

use crate::domain::model::{Dataset, Diagnosis, Feature};
use crate::utils::error::{PredictError, Result};
use crate::utils::stats;
use serde::Serialize;
use std::collections::BTreeMap;

/// Record count per diagnosis. Both diagnoses are always present.
pub fn class_distribution(dataset: &Dataset) -> BTreeMap<Diagnosis, usize> {
    let mut counts: BTreeMap<Diagnosis, usize> = Diagnosis::ALL.iter().map(|d| (*d, 0)).collect();
    for record in dataset.records() {
        *counts.entry(record.diagnosis).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub diagnosis: Diagnosis,
}

/// One point per record, in dataset order.
pub fn pairwise_scatter(dataset: &Dataset, field_a: Feature, field_b: Feature) -> Vec<ScatterPoint> {
    dataset
        .records()
        .iter()
        .map(|r| ScatterPoint {
            x: r.value(field_a),
            y: r.value(field_b),
            diagnosis: r.diagnosis,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    fields: Vec<Feature>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn fields(&self) -> &[Feature] {
        &self.fields
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn get(&self, a: Feature, b: Feature) -> f64 {
        self.values[a.index()][b.index()]
    }
}

/// Pearson correlation between every pair of measurements.
///
/// A field with zero variance gets NaN across its row and column, diagonal included.
pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = Feature::ALL.iter().map(|f| dataset.column(*f)).collect();
    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        values[i][i] = if stats::pearson(&columns[i], &columns[i]).is_nan() {
            f64::NAN
        } else {
            1.0
        };
        for j in (i + 1)..n {
            let r = stats::pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        fields: Feature::ALL.to_vec(),
        values,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiveNumberSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumberSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            count: sorted.len(),
            min: sorted[0],
            q1: stats::quantile_sorted(&sorted, 0.25),
            median: stats::quantile_sorted(&sorted, 0.5),
            q3: stats::quantile_sorted(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Box-plot summary of one field per diagnosis.
pub fn grouped_distribution(
    dataset: &Dataset,
    field: Feature,
) -> Result<BTreeMap<Diagnosis, FiveNumberSummary>> {
    let mut groups = BTreeMap::new();
    for diagnosis in Diagnosis::ALL {
        let values: Vec<f64> = dataset
            .records()
            .iter()
            .filter(|r| r.diagnosis == diagnosis)
            .map(|r| r.value(field))
            .collect();

        let summary = FiveNumberSummary::from_values(&values).ok_or_else(|| {
            PredictError::EmptyGroupError {
                field: field.name().to_string(),
                group: diagnosis.name().to_string(),
            }
        })?;
        groups.insert(diagnosis, summary);
    }
    Ok(groups)
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightOptions {
    pub scatter_x: Feature,
    pub scatter_y: Feature,
    pub box_fields: Vec<Feature>,
}

impl Default for InsightOptions {
    fn default() -> Self {
        Self {
            scatter_x: Feature::RadiusMean,
            scatter_y: Feature::TextureMean,
            box_fields: vec![Feature::RadiusMean, Feature::AreaMean],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightReport {
    pub record_count: usize,
    pub class_distribution: BTreeMap<Diagnosis, usize>,
    pub scatter_x: Feature,
    pub scatter_y: Feature,
    pub scatter: Vec<ScatterPoint>,
    pub correlation: CorrelationMatrix,
    pub box_plots: BTreeMap<Feature, BTreeMap<Diagnosis, FiveNumberSummary>>,
    /// Summaries that could not be computed, with the reason.
    pub omitted: Vec<String>,
}

pub fn build_report(dataset: &Dataset, options: &InsightOptions) -> InsightReport {
    tracing::debug!("Building insight report over {} records", dataset.len());

    let mut box_plots = BTreeMap::new();
    let mut omitted = Vec::new();
    for field in &options.box_fields {
        match grouped_distribution(dataset, *field) {
            Ok(summary) => {
                box_plots.insert(*field, summary);
            }
            Err(e) => {
                tracing::warn!("Skipping box plot for {}: {}", field, e);
                omitted.push(e.user_friendly_message());
            }
        }
    }

    InsightReport {
        record_count: dataset.len(),
        class_distribution: class_distribution(dataset),
        scatter_x: options.scatter_x,
        scatter_y: options.scatter_y,
        scatter: pairwise_scatter(dataset, options.scatter_x, options.scatter_y),
        correlation: correlation_matrix(dataset),
        box_plots,
        omitted,
    }
}

//! Reference dataset loading.
//!
//! The CSV needs a `diagnosis` column (`B`/`M`) and the ten mean columns; every
//! other column is ignored. A dataset that cannot be loaded is represented as
//! [`ReferenceData::Unavailable`] so the caller can skip dataset views.

use crate::domain::model::{Dataset, DatasetRecord, Diagnosis, Feature, FeatureVector, FEATURE_COUNT};
use crate::domain::ports::Storage;
use crate::utils::error::{PredictError, Result};
use std::io::Read;

const DIAGNOSIS_COLUMN: &str = "diagnosis";

pub fn parse_dataset<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let diagnosis_col = headers
        .iter()
        .position(|h| h == DIAGNOSIS_COLUMN)
        .ok_or_else(|| PredictError::InvalidRecordError {
            row: 1,
            reason: format!("missing '{}' column", DIAGNOSIS_COLUMN),
        })?;

    let mut feature_cols: [Option<usize>; FEATURE_COUNT] = [None; FEATURE_COUNT];
    for (index, header) in headers.iter().enumerate() {
        if let Ok(feature) = header.parse::<Feature>() {
            let slot = &mut feature_cols[feature.index()];
            if slot.is_some() {
                return Err(PredictError::InvalidRecordError {
                    row: 1,
                    reason: format!("ambiguous column '{}' (duplicate of {})", header, feature),
                });
            }
            *slot = Some(index);
        }
    }
    let mut columns = [0usize; FEATURE_COUNT];
    for feature in Feature::ALL {
        columns[feature.index()] =
            feature_cols[feature.index()].ok_or_else(|| PredictError::InvalidRecordError {
                row: 1,
                reason: format!("missing '{}' column", feature),
            })?;
    }

    let mut records = Vec::new();
    for (index, row) in rdr.records().enumerate() {
        let row = row?;
        let line = row.position().map(|p| p.line() as usize).unwrap_or(index + 2);

        let label = row.get(diagnosis_col).unwrap_or_default();
        let diagnosis = Diagnosis::from_code(label).ok_or_else(|| PredictError::InvalidRecordError {
            row: line,
            reason: format!("unknown diagnosis '{}'", label),
        })?;

        let mut values = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            let cell = row.get(columns[feature.index()]).unwrap_or_default();
            values[feature.index()] = cell.parse::<f64>().map_err(|_| PredictError::InvalidRecordError {
                row: line,
                reason: format!("'{}' is not a number for {}", cell, feature),
            })?;
        }
        let measurements = FeatureVector::new(values).map_err(|e| PredictError::InvalidRecordError {
            row: line,
            reason: e.to_string(),
        })?;

        records.push(DatasetRecord {
            diagnosis,
            measurements,
        });
    }

    Ok(Dataset::new(records))
}

pub async fn load_dataset<S: Storage>(storage: &S, path: &str) -> Result<Dataset> {
    let bytes = storage.read_file(path).await.map_err(|e| match e {
        PredictError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
            PredictError::DatasetMissingError {
                path: path.to_string(),
            }
        }
        other => other,
    })?;
    parse_dataset(bytes.as_slice())
}

/// Reference data as seen by the presentation layer.
#[derive(Debug, Clone)]
pub enum ReferenceData {
    Loaded(Dataset),
    Unavailable { reason: String },
}

impl ReferenceData {
    pub async fn load<S: Storage>(storage: &S, path: Option<&str>) -> Self {
        let Some(path) = path else {
            tracing::info!("No reference dataset configured; dataset insights are disabled");
            return ReferenceData::Unavailable {
                reason: "no reference dataset configured".to_string(),
            };
        };

        match load_dataset(storage, path).await {
            Ok(dataset) => {
                tracing::info!("📊 Loaded {} reference records from {}", dataset.len(), path);
                ReferenceData::Loaded(dataset)
            }
            Err(e) => {
                tracing::warn!("⚠️ Reference dataset unavailable: {}", e);
                ReferenceData::Unavailable { reason: e.to_string() }
            }
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            ReferenceData::Loaded(dataset) => Some(dataset),
            ReferenceData::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.dataset().is_some()
    }
}

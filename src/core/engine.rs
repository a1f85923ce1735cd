use crate::core::classifier::ClassifierService;
use crate::core::mapper::DecisionMapper;
use crate::domain::model::{Diagnosis, FeatureVector, RangeWarning, RawOutput};
use crate::domain::ports::Classifier;
use crate::utils::error::Result;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub diagnosis: Diagnosis,
    pub raw_output: RawOutput,
    /// Inputs outside their advisory range. The prediction is still made.
    pub warnings: Vec<RangeWarning>,
}

/// Runs one request: vector → classifier → mapper.
pub struct DiagnosisEngine<C: Classifier> {
    service: Arc<ClassifierService<C>>,
    mapper: DecisionMapper,
}

impl<C: Classifier> Clone for DiagnosisEngine<C> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            mapper: self.mapper,
        }
    }
}

impl<C: Classifier> DiagnosisEngine<C> {
    pub fn new(service: Arc<ClassifierService<C>>, mapper: DecisionMapper) -> Self {
        Self { service, mapper }
    }

    pub fn service(&self) -> &ClassifierService<C> {
        &self.service
    }

    pub fn diagnose(&self, features: &FeatureVector) -> Result<Prediction> {
        let warnings = features.advisory_warnings();
        for warning in &warnings {
            tracing::warn!("⚠️ {}", warning);
        }

        let raw_output = self.service.predict(features)?;
        let diagnosis = self.mapper.map(&raw_output)?;
        tracing::info!("🔍 Prediction: {} (raw output {})", diagnosis, raw_output);

        Ok(Prediction {
            diagnosis,
            raw_output,
            warnings,
        })
    }
}

pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::dataset::ReferenceData;
pub use adapters::storage::LocalStorage;
pub use config::AppConfig;
pub use core::{
    artifact::ClassifierArtifact, classifier::ClassifierService, engine::DiagnosisEngine,
    mapper::DecisionMapper,
};
pub use domain::model::{Diagnosis, Feature, FeatureVector, MappingPolicy, RawOutput};
pub use utils::error::{PredictError, Result};

pub mod artifact;
pub mod classifier;
pub mod engine;
pub mod insights;
pub mod mapper;

pub use crate::domain::model::{Dataset, DatasetRecord, Diagnosis, Feature, FeatureVector, RawOutput};
pub use crate::domain::ports::{Classifier, ConfigProvider, Storage};
pub use crate::utils::error::Result;

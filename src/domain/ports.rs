use crate::domain::model::{FeatureVector, MappingPolicy, RawOutput};
use crate::utils::error::Result;

/// Opaque trained decision function.
///
/// Implementations must be deterministic and free of side effects: the same
/// vector always yields the same output. Shape mismatches are reported as
/// [`crate::utils::error::PredictError::InferenceError`].
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<RawOutput>;

    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn artifact_path(&self) -> &str;
    fn dataset_path(&self) -> Option<&str>;
    fn mapping_policy(&self) -> MappingPolicy;
}

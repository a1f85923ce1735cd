use crate::core::artifact::ClassifierArtifact;
use crate::domain::model::{FeatureVector, RawOutput};
use crate::domain::ports::{Classifier, Storage};
use crate::utils::error::{PredictError, Result};

/// Owns the trained classifier for the lifetime of the process.
///
/// The classifier is injected at construction and never replaced, so a
/// service wrapped in `Arc` can serve concurrent callers without locking.
pub struct ClassifierService<C: Classifier> {
    classifier: C,
}

impl<C: Classifier> ClassifierService<C> {
    pub fn new(classifier: C) -> Self {
        tracing::debug!("Classifier ready: {}", classifier.describe());
        Self { classifier }
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<RawOutput> {
        let raw = self.classifier.predict(features)?;
        tracing::debug!("Classifier output: {}", raw);
        Ok(raw)
    }

    pub fn describe(&self) -> String {
        self.classifier.describe()
    }
}

impl ClassifierService<ClassifierArtifact> {
    /// Reads and validates the artifact. Any failure here is fatal for the caller.
    pub async fn load<S: Storage>(storage: &S, path: &str) -> Result<Self> {
        tracing::info!("📦 Loading classifier artifact from: {}", path);

        let bytes = storage.read_file(path).await.map_err(|e| PredictError::ArtifactLoadError {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let artifact = ClassifierArtifact::from_bytes(&bytes, path)?;

        tracing::info!("✅ Loaded classifier {}", artifact.describe());
        Ok(Self::new(artifact))
    }

    pub fn artifact(&self) -> &ClassifierArtifact {
        &self.classifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                PredictError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct FixedClassifier(RawOutput);

    impl Classifier for FixedClassifier {
        fn predict(&self, _features: &FeatureVector) -> Result<RawOutput> {
            Ok(self.0.clone())
        }
    }

    fn artifact_json() -> Vec<u8> {
        let names: Vec<&str> = crate::domain::model::Feature::ALL.iter().map(|f| f.name()).collect();
        serde_json::to_vec(&serde_json::json!({
            "name": "constant",
            "version": "0.1",
            "feature_names": names,
            "classes": [0, 1],
            "model": {"kind": "decision_tree", "nodes": [{"type": "leaf", "probability": 0.8}]}
        }))
        .unwrap()
    }

    #[test]
    fn test_injected_classifier_is_used() {
        let service = ClassifierService::new(FixedClassifier(RawOutput::Label("M".to_string())));
        let raw = service.predict(&FeatureVector::default()).unwrap();
        assert_eq!(raw, RawOutput::Label("M".to_string()));
    }

    #[tokio::test]
    async fn test_load_from_storage() {
        let storage = MockStorage::with_file("models/classifier.json", &artifact_json());
        let service = ClassifierService::load(&storage, "models/classifier.json")
            .await
            .unwrap();

        assert_eq!(service.artifact().name, "constant");
        assert_eq!(service.predict(&FeatureVector::default()).unwrap(), RawOutput::Code(1));
    }

    #[tokio::test]
    async fn test_missing_artifact_is_load_error() {
        let storage = MockStorage::with_file("other.json", b"{}");
        let err = ClassifierService::load(&storage, "models/classifier.json")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, PredictError::ArtifactLoadError { ref path, .. } if path == "models/classifier.json"));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_corrupt_artifact_is_load_error() {
        let storage = MockStorage::with_file("models/classifier.json", b"{\"name\": 3");
        let result = ClassifierService::load(&storage, "models/classifier.json").await;
        assert!(matches!(result, Err(PredictError::ArtifactLoadError { .. })));
    }
}

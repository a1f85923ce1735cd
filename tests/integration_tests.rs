use onco_predict::adapters::dataset::{load_dataset, ReferenceData};
use onco_predict::adapters::export::export_report;
use onco_predict::core::insights::{build_report, InsightOptions};
use onco_predict::utils::error::ErrorSeverity;
use onco_predict::{
    AppConfig, ClassifierService, DecisionMapper, Diagnosis, DiagnosisEngine, Feature, FeatureVector,
    LocalStorage, MappingPolicy, PredictError, RawOutput,
};
use std::io::Read;
use std::sync::Arc;
use tempfile::TempDir;

fn repo_storage() -> LocalStorage {
    LocalStorage::new(env!("CARGO_MANIFEST_DIR").to_string())
}

fn benign_sample() -> FeatureVector {
    FeatureVector::new([12.0, 17.0, 78.0, 450.0, 0.09, 0.08, 0.04, 0.02, 0.17, 0.062]).unwrap()
}

fn malignant_sample() -> FeatureVector {
    FeatureVector::new([20.0, 25.0, 130.0, 1250.0, 0.11, 0.18, 0.22, 0.12, 0.21, 0.062]).unwrap()
}

async fn engine(path: &str, policy: MappingPolicy) -> anyhow::Result<DiagnosisEngine<onco_predict::ClassifierArtifact>> {
    let service = ClassifierService::load(&repo_storage(), path).await?;
    Ok(DiagnosisEngine::new(Arc::new(service), DecisionMapper::new(policy)))
}

#[tokio::test]
async fn test_shipped_artifact_separates_typical_samples() -> anyhow::Result<()> {
    let engine = engine("models/classifier.json", MappingPolicy::Strict).await?;

    let benign = engine.diagnose(&benign_sample())?;
    assert_eq!(benign.diagnosis, Diagnosis::Benign);
    assert_eq!(benign.raw_output, RawOutput::Label("B".to_string()));
    assert!(benign.warnings.is_empty());

    let malignant = engine.diagnose(&malignant_sample())?;
    assert_eq!(malignant.diagnosis, Diagnosis::Malignant);
    assert_eq!(malignant.raw_output, RawOutput::Label("M".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_boundary_inputs_never_fail_inference() -> anyhow::Result<()> {
    let engine = engine("models/classifier.json", MappingPolicy::Strict).await?;

    let mut low = [0.0; 10];
    let mut high = [0.0; 10];
    for feature in Feature::ALL {
        let (min, max) = feature.advisory_range();
        low[feature.index()] = min;
        high[feature.index()] = max;
    }

    for values in [low, high] {
        let prediction = engine.diagnose(&FeatureVector::new(values)?)?;
        assert!(Diagnosis::ALL.contains(&prediction.diagnosis));
        assert!(prediction.warnings.is_empty());
    }
    Ok(())
}

#[tokio::test]
async fn test_out_of_range_input_still_predicts_with_warning() -> anyhow::Result<()> {
    let engine = engine("models/classifier.json", MappingPolicy::Strict).await?;

    let mut values = [0.0; 10];
    values.copy_from_slice(benign_sample().as_slice());
    values[Feature::AreaMean.index()] = 4000.0;

    let prediction = engine.diagnose(&FeatureVector::new(values)?)?;
    assert_eq!(prediction.warnings.len(), 1);
    assert_eq!(prediction.warnings[0].feature, Feature::AreaMean);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_predictions_are_deterministic() -> anyhow::Result<()> {
    let engine = engine("models/classifier.json", MappingPolicy::Strict).await?;
    let expected = engine.diagnose(&FeatureVector::default())?;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move { engine.diagnose(&FeatureVector::default()) }));
    }
    for handle in handles {
        assert_eq!(handle.await??, expected);
    }
    Ok(())
}

#[tokio::test]
async fn test_tree_artifact_with_integer_codes() -> anyhow::Result<()> {
    let engine = engine("tests/fixtures/tree_codes.json", MappingPolicy::Strict).await?;

    let benign = engine.diagnose(&benign_sample())?;
    assert_eq!(benign.raw_output, RawOutput::Code(0));
    assert_eq!(benign.diagnosis, Diagnosis::Benign);

    let malignant = engine.diagnose(&malignant_sample())?;
    assert_eq!(malignant.raw_output, RawOutput::Code(1));
    assert_eq!(malignant.diagnosis, Diagnosis::Malignant);
    Ok(())
}

#[tokio::test]
async fn test_probability_output_follows_mapping_policy() -> anyhow::Result<()> {
    let strict = engine("tests/fixtures/probability_output.json", MappingPolicy::Strict).await?;
    let err = strict.diagnose(&malignant_sample()).unwrap_err();
    assert!(matches!(err, PredictError::MappingError { .. }));
    assert!(err.is_recoverable());

    let lenient = engine("tests/fixtures/probability_output.json", MappingPolicy::Lenient).await?;
    let prediction = lenient.diagnose(&malignant_sample())?;
    assert_eq!(prediction.raw_output, RawOutput::Probability(0.88));
    assert_eq!(prediction.diagnosis, Diagnosis::Benign);
    Ok(())
}

#[tokio::test]
async fn test_schema_mismatch_is_inference_error() -> anyhow::Result<()> {
    let engine = engine("tests/fixtures/wide_schema.json", MappingPolicy::Strict).await?;

    let err = engine.diagnose(&FeatureVector::default()).unwrap_err();
    assert!(matches!(err, PredictError::InferenceError { .. }));
    assert!(err.to_string().contains("12 features"));
    Ok(())
}

#[tokio::test]
async fn test_missing_artifact_is_fatal() {
    let result = ClassifierService::load(&repo_storage(), "models/does_not_exist.json").await;

    let err = result.err().unwrap();
    assert!(matches!(err, PredictError::ArtifactLoadError { .. }));
    assert_eq!(err.severity(), ErrorSeverity::Critical);
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn test_corrupt_artifact_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("broken.json"), b"{\"name\": \"half").unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

    let err = ClassifierService::load(&storage, "broken.json").await.err().unwrap();
    assert!(matches!(err, PredictError::ArtifactLoadError { .. }));
}

#[tokio::test]
async fn test_reference_dataset_to_exported_bundle() -> anyhow::Result<()> {
    let dataset = load_dataset(&repo_storage(), "tests/fixtures/reference_small.csv").await?;
    assert_eq!(dataset.len(), 12);

    let report = build_report(&dataset, &InsightOptions::default());
    assert_eq!(report.class_distribution[&Diagnosis::Malignant], 5);
    assert_eq!(report.class_distribution[&Diagnosis::Benign], 7);
    assert_eq!(report.scatter.len(), 12);
    assert!(report.omitted.is_empty());

    for feature in Feature::ALL {
        assert!((report.correlation.get(feature, feature) - 1.0).abs() < 1e-9);
    }
    // 半徑與周長幾乎線性相關
    assert!(report.correlation.get(Feature::RadiusMean, Feature::PerimeterMean) > 0.95);

    let radius = &report.box_plots[&Feature::RadiusMean];
    assert_eq!(radius[&Diagnosis::Malignant].count, 5);
    assert_eq!(radius[&Diagnosis::Malignant].max, 20.57);
    assert_eq!(radius[&Diagnosis::Benign].min, 8.196);

    let temp_dir = TempDir::new()?;
    let output = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let written = export_report(&output, "reports/insights.zip", &report).await?;
    assert_eq!(written, "reports/insights.zip");

    let zip_data = std::fs::read(temp_dir.path().join("reports/insights.zip"))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;
    assert_eq!(archive.len(), 5);

    let mut distribution = String::new();
    archive
        .by_name("class_distribution.csv")?
        .read_to_string(&mut distribution)?;
    assert!(distribution.contains("Benign,7"));
    assert!(distribution.contains("Malignant,5"));
    Ok(())
}

#[tokio::test]
async fn test_unavailable_reference_data_degrades() {
    let storage = repo_storage();

    let missing = ReferenceData::load(&storage, Some("tests/fixtures/nope.csv")).await;
    assert!(!missing.is_available());

    let malformed = ReferenceData::load(&storage, Some("tests/fixtures/malformed.csv")).await;
    match malformed {
        ReferenceData::Unavailable { reason } => assert!(reason.contains("row 3")),
        ReferenceData::Loaded(_) => panic!("malformed dataset should not load"),
    }

    let unset = ReferenceData::load(&storage, None).await;
    assert!(unset.dataset().is_none());
}

#[tokio::test]
async fn test_config_file_drives_engine() -> anyhow::Result<()> {
    let config = AppConfig::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/onco-predict.toml"))?;
    assert_eq!(config.model.mapping_policy, MappingPolicy::Strict);

    let engine = engine(&config.model.artifact_path, config.model.mapping_policy).await?;
    assert_eq!(engine.diagnose(&benign_sample())?.diagnosis, Diagnosis::Benign);
    Ok(())
}

#[tokio::test]
async fn test_disabled_dataset_is_reported_as_not_configured() -> anyhow::Result<()> {
    use onco_predict::domain::ports::ConfigProvider;

    let config = AppConfig::from_toml_str("[dataset]\nenabled = false\npath = \"tests/fixtures/reference_small.csv\"\n")?;
    match ReferenceData::load(&repo_storage(), config.dataset_path()).await {
        ReferenceData::Unavailable { reason } => assert!(reason.contains("no reference dataset configured")),
        ReferenceData::Loaded(_) => panic!("disabled dataset should not load"),
    }
    Ok(())
}

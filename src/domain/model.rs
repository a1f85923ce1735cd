use crate::utils::error::{PredictError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// One of the ten cell-nucleus mean measurements, in model input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    RadiusMean,
    TextureMean,
    PerimeterMean,
    AreaMean,
    SmoothnessMean,
    CompactnessMean,
    ConcavityMean,
    #[serde(alias = "concave points_mean")]
    ConcavePointsMean,
    SymmetryMean,
    FractalDimensionMean,
}

pub const FEATURE_COUNT: usize = 10;

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::RadiusMean,
        Feature::TextureMean,
        Feature::PerimeterMean,
        Feature::AreaMean,
        Feature::SmoothnessMean,
        Feature::CompactnessMean,
        Feature::ConcavityMean,
        Feature::ConcavePointsMean,
        Feature::SymmetryMean,
        Feature::FractalDimensionMean,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::RadiusMean => "radius_mean",
            Feature::TextureMean => "texture_mean",
            Feature::PerimeterMean => "perimeter_mean",
            Feature::AreaMean => "area_mean",
            Feature::SmoothnessMean => "smoothness_mean",
            Feature::CompactnessMean => "compactness_mean",
            Feature::ConcavityMean => "concavity_mean",
            Feature::ConcavePointsMean => "concave_points_mean",
            Feature::SymmetryMean => "symmetry_mean",
            Feature::FractalDimensionMean => "fractal_dimension_mean",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Feature::RadiusMean => "Radius Mean",
            Feature::TextureMean => "Texture Mean",
            Feature::PerimeterMean => "Perimeter Mean",
            Feature::AreaMean => "Area Mean",
            Feature::SmoothnessMean => "Smoothness Mean",
            Feature::CompactnessMean => "Compactness Mean",
            Feature::ConcavityMean => "Concavity Mean",
            Feature::ConcavePointsMean => "Concave Points Mean",
            Feature::SymmetryMean => "Symmetry Mean",
            Feature::FractalDimensionMean => "Fractal Dimension Mean",
        }
    }

    /// Physiologically plausible range. Advisory only, never enforced.
    pub fn advisory_range(self) -> (f64, f64) {
        match self {
            Feature::RadiusMean => (5.0, 30.0),
            Feature::TextureMean => (5.0, 40.0),
            Feature::PerimeterMean => (40.0, 200.0),
            Feature::AreaMean => (100.0, 2500.0),
            Feature::SmoothnessMean => (0.0, 0.2),
            Feature::CompactnessMean => (0.0, 1.0),
            Feature::ConcavityMean => (0.0, 1.0),
            Feature::ConcavePointsMean => (0.0, 0.3),
            Feature::SymmetryMean => (0.0, 0.5),
            Feature::FractalDimensionMean => (0.0, 0.2),
        }
    }

    pub fn default_value(self) -> f64 {
        match self {
            Feature::RadiusMean => 14.0,
            Feature::TextureMean => 19.0,
            Feature::PerimeterMean => 90.0,
            Feature::AreaMean => 600.0,
            Feature::SmoothnessMean => 0.1,
            Feature::CompactnessMean => 0.2,
            Feature::ConcavityMean => 0.3,
            Feature::ConcavePointsMean => 0.1,
            Feature::SymmetryMean => 0.18,
            Feature::FractalDimensionMean => 0.06,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self> {
        // 公開 CSV 匯出的欄位名稱含空白；命令列使用連字號
        let normalized = s.trim().replace([' ', '-'], "_");
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.name() == normalized)
            .ok_or_else(|| PredictError::UnknownFieldError { name: s.to_string() })
    }
}

/// Validated, immutable set of the ten measurements for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Builds a vector from values in [`Feature::ALL`] order.
    pub fn new(values: [f64; FEATURE_COUNT]) -> Result<Self> {
        for feature in Feature::ALL {
            check_finite(feature.name(), values[feature.index()])?;
        }
        Ok(Self { values })
    }

    /// Builds a vector from named values. All ten names must be present and no others.
    pub fn from_map(values: &HashMap<String, f64>) -> Result<Self> {
        let mut slots: [Option<f64>; FEATURE_COUNT] = [None; FEATURE_COUNT];
        for (name, value) in values {
            let feature = name.parse::<Feature>().map_err(|_| PredictError::InvalidFeatureError {
                field: name.clone(),
                reason: "unknown measurement".to_string(),
            })?;
            check_finite(feature.name(), *value)?;
            fill_slot(&mut slots, feature, name, *value)?;
        }
        Self::from_slots(slots)
    }

    /// Builds a vector from a JSON object whose values must be JSON numbers.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| PredictError::InvalidFeatureError {
            field: "<input>".to_string(),
            reason: "expected a JSON object of measurements".to_string(),
        })?;

        let mut slots: [Option<f64>; FEATURE_COUNT] = [None; FEATURE_COUNT];
        for (name, raw) in object {
            let feature = name.parse::<Feature>().map_err(|_| PredictError::InvalidFeatureError {
                field: name.clone(),
                reason: "unknown measurement".to_string(),
            })?;
            let number = raw.as_f64().ok_or_else(|| PredictError::InvalidFeatureError {
                field: feature.name().to_string(),
                reason: format!("expected a number, got {}", raw),
            })?;
            check_finite(feature.name(), number)?;
            fill_slot(&mut slots, feature, name, number)?;
        }
        Self::from_slots(slots)
    }

    fn from_slots(slots: [Option<f64>; FEATURE_COUNT]) -> Result<Self> {
        let mut values = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            values[feature.index()] =
                slots[feature.index()].ok_or_else(|| PredictError::InvalidFeatureError {
                    field: feature.name().to_string(),
                    reason: "value is missing".to_string(),
                })?;
        }
        Ok(Self { values })
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn to_named(&self) -> BTreeMap<&'static str, f64> {
        Feature::ALL.iter().map(|f| (f.name(), self.get(*f))).collect()
    }

    /// Fields whose value lies outside the advisory range.
    pub fn advisory_warnings(&self) -> Vec<RangeWarning> {
        Feature::ALL
            .iter()
            .filter_map(|&feature| {
                let value = self.get(feature);
                let (min, max) = feature.advisory_range();
                (value < min || value > max).then_some(RangeWarning { feature, value, min, max })
            })
            .collect()
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            values[feature.index()] = feature.default_value();
        }
        Self { values }
    }
}

/// 同一量測的不同寫法（如 `radius-mean`）只能出現一次
fn fill_slot(
    slots: &mut [Option<f64>; FEATURE_COUNT],
    feature: Feature,
    key: &str,
    value: f64,
) -> Result<()> {
    let slot = &mut slots[feature.index()];
    if slot.is_some() {
        return Err(PredictError::InvalidFeatureError {
            field: key.to_string(),
            reason: format!("duplicate measurement (alias of {})", feature),
        });
    }
    *slot = Some(value);
    Ok(())
}

fn check_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PredictError::InvalidFeatureError {
            field: field.to_string(),
            reason: format!("value must be finite, got {}", value),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeWarning {
    pub feature: Feature,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is outside the typical range [{}, {}]",
            self.feature, self.value, self.min, self.max
        )
    }
}

/// Native classifier output before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOutput {
    Code(i64),
    Probability(f64),
    Label(String),
}

impl fmt::Display for RawOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawOutput::Code(code) => write!(f, "{}", code),
            RawOutput::Probability(p) => write!(f, "{}", p),
            RawOutput::Label(label) => write!(f, "\"{}\"", label),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Diagnosis {
    Benign,
    Malignant,
}

impl Diagnosis {
    pub const ALL: [Diagnosis; 2] = [Diagnosis::Benign, Diagnosis::Malignant];

    pub fn code(self) -> &'static str {
        match self {
            Diagnosis::Benign => "B",
            Diagnosis::Malignant => "M",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "B" => Some(Diagnosis::Benign),
            "M" => Some(Diagnosis::Malignant),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Diagnosis::Benign => "Benign",
            Diagnosis::Malignant => "Malignant",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Diagnosis::Benign => "Benign (Non-Cancerous Tumor)",
            Diagnosis::Malignant => "Malignant (Cancerous Tumor Detected)",
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How outputs outside {0, 1, "B", "M"} are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingPolicy {
    /// Unrecognized outputs are rejected.
    #[default]
    Strict,
    /// Unrecognized outputs fall back to Benign.
    Lenient,
}

impl FromStr for MappingPolicy {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(MappingPolicy::Strict),
            "lenient" => Ok(MappingPolicy::Lenient),
            other => Err(PredictError::InvalidConfigValueError {
                field: "model.mapping_policy".to_string(),
                value: other.to_string(),
                reason: "expected 'strict' or 'lenient'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRecord {
    pub diagnosis: Diagnosis,
    pub measurements: FeatureVector,
}

impl DatasetRecord {
    pub fn value(&self, feature: Feature) -> f64 {
        self.measurements.get(feature)
    }
}

/// Read-only reference data used for descriptive summaries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<DatasetRecord>,
}

impl Dataset {
    pub fn new(records: Vec<DatasetRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    pub fn column(&self, feature: Feature) -> Vec<f64> {
        self.records.iter().map(|r| r.value(feature)).collect()
    }
}

impl FromIterator<DatasetRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = DatasetRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

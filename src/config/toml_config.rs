use crate::core::insights::InsightOptions;
use crate::domain::model::{Feature, MappingPolicy};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{PredictError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub insights: InsightsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_artifact_path")]
    pub artifact_path: String,
    #[serde(default)]
    pub mapping_policy: MappingPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// `false` turns dataset insights off without removing the path.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// An empty string means no dataset.
    #[serde(default = "default_dataset_path")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    #[serde(default = "default_scatter_x")]
    pub scatter_x: Feature,
    #[serde(default = "default_scatter_y")]
    pub scatter_y: Feature,
    #[serde(default = "default_box_fields")]
    pub box_fields: Vec<Feature>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    #[serde(default)]
    pub json: bool,
}

fn default_artifact_path() -> String {
    "models/classifier.json".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_dataset_path() -> Option<String> {
    Some("data/data.csv".to_string())
}

fn default_scatter_x() -> Feature {
    InsightOptions::default().scatter_x
}

fn default_scatter_y() -> Feature {
    InsightOptions::default().scatter_y
}

fn default_box_fields() -> Vec<Feature> {
    InsightOptions::default().box_fields
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
            mapping_policy: MappingPolicy::default(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: default_dataset_path(),
        }
    }
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            scatter_x: default_scatter_x(),
            scatter_y: default_scatter_y(),
            box_fields: default_box_fields(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| PredictError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PredictError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MODEL_PATH})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PredictError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("model.artifact_path", &self.model.artifact_path)?;
        validation::validate_file_extension("model.artifact_path", &self.model.artifact_path, &["json"])?;

        if let Some(path) = self.dataset_path() {
            validation::validate_path("dataset.path", path)?;
            validation::validate_file_extension("dataset.path", path, &["csv"])?;
        }

        validation::validate_distinct(
            "insights.scatter_y",
            &self.insights.scatter_x,
            &self.insights.scatter_y,
        )?;

        if let Some(level) = &self.logging.level {
            validation::validate_non_empty_string("logging.level", level)?;
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(PredictError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", LOG_LEVELS.join(", ")),
                });
            }
        }

        Ok(())
    }

    pub fn insight_options(&self) -> InsightOptions {
        InsightOptions {
            scatter_x: self.insights.scatter_x,
            scatter_y: self.insights.scatter_y,
            box_fields: self.insights.box_fields.clone(),
        }
    }
}

impl ConfigProvider for AppConfig {
    fn artifact_path(&self) -> &str {
        &self.model.artifact_path
    }

    fn dataset_path(&self) -> Option<&str> {
        if !self.dataset.enabled {
            return None;
        }
        self.dataset.path.as_deref().filter(|p| !p.trim().is_empty())
    }

    fn mapping_policy(&self) -> MappingPolicy {
        self.model.mapping_policy
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

use crate::config::toml_config::AppConfig;
use crate::domain::model::{Feature, FeatureVector, MappingPolicy};
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "onco-predict")]
#[command(about = "Classify tumors as benign or malignant from cell nucleus measurements")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the classifier artifact path
    #[arg(long, global = true)]
    pub artifact: Option<String>,

    /// Override the reference dataset path
    #[arg(long, global = true)]
    pub dataset: Option<String>,

    /// Skip the reference dataset
    #[arg(long, global = true, conflicts_with = "dataset")]
    pub no_dataset: bool,

    /// Override how unrecognized classifier outputs are handled
    #[arg(long, global = true)]
    pub mapping_policy: Option<MappingPolicy>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict a diagnosis for one sample
    Predict(PredictArgs),
    /// Summarize the reference dataset
    Insights(InsightsArgs),
    /// Validate configuration, artifact and dataset without predicting
    Check,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    /// Read measurements from a JSON object file instead of flags
    #[arg(long, conflicts_with_all = [
        "radius_mean", "texture_mean", "perimeter_mean", "area_mean", "smoothness_mean",
        "compactness_mean", "concavity_mean", "concave_points_mean", "symmetry_mean",
        "fractal_dimension_mean",
    ])]
    pub input: Option<String>,

    #[arg(long, default_value_t = Feature::RadiusMean.default_value())]
    pub radius_mean: f64,
    #[arg(long, default_value_t = Feature::TextureMean.default_value())]
    pub texture_mean: f64,
    #[arg(long, default_value_t = Feature::PerimeterMean.default_value())]
    pub perimeter_mean: f64,
    #[arg(long, default_value_t = Feature::AreaMean.default_value())]
    pub area_mean: f64,
    #[arg(long, default_value_t = Feature::SmoothnessMean.default_value())]
    pub smoothness_mean: f64,
    #[arg(long, default_value_t = Feature::CompactnessMean.default_value())]
    pub compactness_mean: f64,
    #[arg(long, default_value_t = Feature::ConcavityMean.default_value())]
    pub concavity_mean: f64,
    #[arg(long, default_value_t = Feature::ConcavePointsMean.default_value())]
    pub concave_points_mean: f64,
    #[arg(long, default_value_t = Feature::SymmetryMean.default_value())]
    pub symmetry_mean: f64,
    #[arg(long, default_value_t = Feature::FractalDimensionMean.default_value())]
    pub fractal_dimension_mean: f64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl PredictArgs {
    pub fn feature_vector(&self) -> Result<FeatureVector> {
        FeatureVector::new([
            self.radius_mean,
            self.texture_mean,
            self.perimeter_mean,
            self.area_mean,
            self.smoothness_mean,
            self.compactness_mean,
            self.concavity_mean,
            self.concave_points_mean,
            self.symmetry_mean,
            self.fractal_dimension_mean,
        ])
    }
}

#[derive(Debug, Args)]
pub struct InsightsArgs {
    /// Measurement on the scatter x axis
    #[arg(long)]
    pub scatter_x: Option<Feature>,

    /// Measurement on the scatter y axis
    #[arg(long)]
    pub scatter_y: Option<Feature>,

    /// Measurement to summarize per diagnosis (repeatable)
    #[arg(long = "box-field")]
    pub box_fields: Vec<Feature>,

    /// Write the report tables to a ZIP bundle
    #[arg(long)]
    pub export: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Cli {
    /// 載入配置檔（若有）並套用命令列覆蓋設定
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(artifact) = &self.artifact {
            config.model.artifact_path = artifact.clone();
        }
        if let Some(dataset) = &self.dataset {
            config.dataset.enabled = true;
            config.dataset.path = Some(dataset.clone());
        }
        if self.no_dataset {
            config.dataset.enabled = false;
        }
        if let Some(policy) = self.mapping_policy {
            config.model.mapping_policy = policy;
        }

        if let Command::Insights(args) = &self.command {
            if let Some(x) = args.scatter_x {
                config.insights.scatter_x = x;
            }
            if let Some(y) = args.scatter_y {
                config.insights.scatter_y = y;
            }
            if !args.box_fields.is_empty() {
                config.insights.box_fields = args.box_fields.clone();
            }
        }

        Ok(config)
    }
}

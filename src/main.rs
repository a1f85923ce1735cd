use clap::Parser;
use onco_predict::adapters::dataset::ReferenceData;
use onco_predict::adapters::export;
use onco_predict::app::presenter;
use onco_predict::config::cli::{InsightsArgs, PredictArgs};
use onco_predict::config::{AppConfig, Cli, Command, OutputFormat};
use onco_predict::core::insights;
use onco_predict::domain::ports::{ConfigProvider, Storage};
use onco_predict::utils::{logger, validation::Validate};
use onco_predict::{
    ClassifierArtifact, ClassifierService, DecisionMapper, DiagnosisEngine, FeatureVector,
    LocalStorage, PredictError,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 載入配置並套用命令列覆蓋
    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    if cli.json_logs || config.logging.json {
        logger::init_json_logger(cli.verbose, config.logging.level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, config.logging.level.as_deref());
    }
    tracing::debug!("Resolved config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let storage = LocalStorage::default();
    let result = match &cli.command {
        Command::Predict(args) => run_predict(&storage, &config, args).await,
        Command::Insights(args) => run_insights(&storage, &config, args).await,
        Command::Check => run_check(&storage, &config).await,
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        std::process::exit(e.exit_code());
    }
}

async fn load_engine(
    storage: &LocalStorage,
    config: &AppConfig,
) -> Result<DiagnosisEngine<ClassifierArtifact>, PredictError> {
    let service = match ClassifierService::load(storage, config.artifact_path()).await {
        Ok(service) => service,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            return Err(e);
        }
    };
    Ok(DiagnosisEngine::new(
        Arc::new(service),
        DecisionMapper::new(config.mapping_policy()),
    ))
}

async fn read_input(storage: &LocalStorage, args: &PredictArgs) -> Result<FeatureVector, PredictError> {
    match &args.input {
        Some(path) => {
            let bytes = storage.read_file(path).await?;
            let value: serde_json::Value = serde_json::from_slice(&bytes)?;
            FeatureVector::from_json(&value)
        }
        None => args.feature_vector(),
    }
}

async fn run_predict(
    storage: &LocalStorage,
    config: &AppConfig,
    args: &PredictArgs,
) -> Result<(), PredictError> {
    let engine = load_engine(storage, config).await?;

    let outcome = match read_input(storage, args).await {
        Ok(features) => {
            if args.format == OutputFormat::Text {
                println!("{}", presenter::render_inputs(&features));
            }
            engine.diagnose(&features)
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(prediction) => {
            match args.format {
                OutputFormat::Text => print!("{}", presenter::render_prediction(&prediction)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&prediction)?),
            }
            Ok(())
        }
        Err(e) => {
            // 可恢復錯誤：回報給使用者，不顯示預測結果
            match args.format {
                OutputFormat::Text => eprint!("{}", presenter::render_prediction_error(&e)),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "error": e.to_string(),
                        "message": e.user_friendly_message(),
                    }))?
                ),
            }
            Err(e)
        }
    }
}

async fn run_insights(
    storage: &LocalStorage,
    config: &AppConfig,
    args: &InsightsArgs,
) -> Result<(), PredictError> {
    let reference = ReferenceData::load(storage, config.dataset_path()).await;

    let dataset = match &reference {
        ReferenceData::Loaded(dataset) => dataset,
        ReferenceData::Unavailable { reason } => {
            match args.format {
                OutputFormat::Text => print!("{}", presenter::render_unavailable(reason)),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "unavailable": reason }))?
                ),
            }
            return Ok(());
        }
    };

    let report = insights::build_report(dataset, &config.insight_options());
    match args.format {
        OutputFormat::Text => print!("{}", presenter::render_report(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(path) = &args.export {
        let written = export::export_report(storage, path, &report).await?;
        tracing::info!("📁 Insight bundle saved to: {}", written);
        eprintln!("📁 Insight bundle saved to: {}", written);
    }

    Ok(())
}

async fn run_check(storage: &LocalStorage, config: &AppConfig) -> Result<(), PredictError> {
    println!("📋 Configuration Summary:");
    println!("  Artifact: {}", config.artifact_path());
    println!("  Mapping policy: {:?}", config.mapping_policy());
    println!("  Dataset: {}", config.dataset_path().unwrap_or("(none)"));
    println!(
        "  Scatter: {} vs {}",
        config.insights.scatter_y, config.insights.scatter_x
    );
    println!();

    let engine = load_engine(storage, config).await?;
    println!("✅ Classifier: {}", engine.service().describe());

    // 以預設輸入試跑一次，確認 artifact 接受輸入格式
    match engine.diagnose(&FeatureVector::default()) {
        Ok(prediction) => println!("✅ Smoke prediction: {}", prediction.diagnosis),
        Err(e) => println!("⚠️ Smoke prediction failed: {}", e),
    }

    match ReferenceData::load(storage, config.dataset_path()).await {
        ReferenceData::Loaded(dataset) => println!("✅ Reference dataset: {} records", dataset.len()),
        ReferenceData::Unavailable { reason } => println!("⚠️ Reference dataset unavailable: {}", reason),
    }

    Ok(())
}

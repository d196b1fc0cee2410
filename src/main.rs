use anyhow::Context;
use clap::Parser;
use leave_advisor::utils::error::ErrorSeverity;
use leave_advisor::utils::{logger, validation::Validate};
use leave_advisor::{
    AdvisorError, CliConfig, DataProvider, LeaveAdvisor, LeaveRequest, RestDataProvider,
    RiskAssessment, SnapshotProvider, SourceType, TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入配置檔，未指定時使用預設值
    let mut config = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => TomlConfig::default(),
    };
    cli.apply_overrides(&mut config);

    // 初始化日誌
    let level = config.logging.level.clone();
    if config.json_logging() {
        logger::init_json_logger(level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, level.as_deref());
    }

    tracing::info!("🚀 Starting leave-advisor");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let request = cli.leave_request();
    let outcome = match config.source.r#type {
        SourceType::Snapshot => {
            let path = config.source.snapshot_path.clone().unwrap_or_default();
            tracing::info!("📁 Loading snapshot from: {}", path);
            match SnapshotProvider::from_file(&path) {
                Ok(provider) => advise(provider, &config, &cli, &request).await,
                Err(e) => Err(e),
            }
        }
        SourceType::Rest => {
            let endpoint = config.source.endpoint.clone().unwrap_or_default();
            tracing::info!("🌐 Reading from: {}", endpoint);
            match RestDataProvider::new(
                &endpoint,
                config.source.api_key.clone(),
                config.source_timeout(),
            ) {
                Ok(provider) => advise(provider, &config, &cli, &request).await,
                Err(e) => Err(e),
            }
        }
    };

    match outcome {
        Ok(assessment) => {
            let rendered = cli
                .format
                .render(&assessment)
                .with_context(|| format!("failed to render {:?} output", cli.format))?;
            println!("{}", rendered);
        }
        Err(e) => {
            tracing::error!(
                "❌ Leave assessment failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn advise<P: DataProvider + 'static>(
    provider: P,
    config: &TomlConfig,
    cli: &CliConfig,
    request: &LeaveRequest,
) -> Result<RiskAssessment, AdvisorError> {
    let mut advisor = LeaveAdvisor::from_config(provider, config);
    if let Some(today) = cli.today {
        advisor = advisor.with_today(today);
    }

    advisor.run(request).await
}

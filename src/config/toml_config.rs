use crate::domain::model::AnalysisRules;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AdvisorError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    pub critical_roles: Option<Vec<String>>,
    pub critical_titles: Option<Vec<String>>,
    pub critical_task_sample_limit: Option<usize>,
    pub coverage_high_below: Option<u8>,
    pub coverage_medium_below: Option<u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Snapshot,
    Rest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub r#type: SourceType,
    pub snapshot_path: Option<String>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AdvisorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AdvisorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AdvisorError::ConfigValidationError {
            field: "environment".to_string(),
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
        let rules = self.analysis_rules();

        validation::validate_non_empty_list("rules.critical_roles", &rules.critical_roles)?;
        validation::validate_non_empty_list("rules.critical_titles", &rules.critical_titles)?;
        validation::validate_positive_number(
            "rules.critical_task_sample_limit",
            rules.critical_task_sample_limit,
            1,
        )?;
        validation::validate_range("rules.coverage_high_below", rules.coverage_high_below, 1, 100)?;
        validation::validate_range(
            "rules.coverage_medium_below",
            rules.coverage_medium_below,
            rules.coverage_high_below.saturating_add(1),
            100,
        )?;

        match self.source.r#type {
            SourceType::Snapshot => {
                let path = validation::validate_required_field(
                    "source.snapshot_path",
                    &self.source.snapshot_path,
                )?;
                validation::validate_path("source.snapshot_path", path)?;
            }
            SourceType::Rest => {
                let endpoint =
                    validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
                validation::validate_url("source.endpoint", endpoint)?;
                if let Some(key) = &self.source.api_key {
                    validation::validate_non_empty_string("source.api_key", key)?;
                }
            }
        }

        if let Some(level) = &self.logging.level {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level.to_lowercase().as_str()) {
                return Err(AdvisorError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }

    /// 資料來源的 HTTP 逾時
    pub fn source_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    pub fn json_logging(&self) -> bool {
        self.logging.json.unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn analysis_rules(&self) -> AnalysisRules {
        let defaults = AnalysisRules::default();
        let rules = &self.rules;
        AnalysisRules {
            critical_roles: rules.critical_roles.clone().unwrap_or(defaults.critical_roles),
            critical_titles: rules.critical_titles.clone().unwrap_or(defaults.critical_titles),
            critical_task_sample_limit: rules
                .critical_task_sample_limit
                .unwrap_or(defaults.critical_task_sample_limit),
            coverage_high_below: rules.coverage_high_below.unwrap_or(defaults.coverage_high_below),
            coverage_medium_below: rules
                .coverage_medium_below
                .unwrap_or(defaults.coverage_medium_below),
        }
    }

    fn analysis_timeout(&self) -> Option<Duration> {
        self.analysis.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

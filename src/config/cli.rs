use crate::config::toml_config::{SourceType, TomlConfig};
use crate::domain::model::{LeaveRequest, RiskAssessment};
use crate::utils::error::Result;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    pub fn render(self, assessment: &RiskAssessment) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(assessment)?),
            OutputFormat::Text => Ok(render_text(assessment)),
        }
    }
}

/// 給人閱讀的摘要：風險等級在第一行
pub fn render_text(assessment: &RiskAssessment) -> String {
    let mut out = String::new();
    // write! 到 String 不會失敗
    let _ = writeln!(out, "Risk: {}", assessment.overall_risk_level.label());
    if let Some(error) = &assessment.error {
        let _ = writeln!(out, "Error: {}", error);
    }

    let _ = writeln!(out, "Deadlines: {}", assessment.deadline_impact.message);
    for task in &assessment.deadline_impact.affected_tasks {
        let _ = writeln!(
            out,
            "  - {} (due {}, {})",
            task.title,
            task.due_date,
            task.priority.as_str()
        );
    }
    let _ = writeln!(out, "Coverage: {}", assessment.coverage_risk.message);
    let _ = writeln!(out, "Role: {}", assessment.role_criticality.reason);

    if !assessment.overlapping_leaves.is_empty() {
        let _ = writeln!(out, "Overlapping leaves:");
        for overlap in &assessment.overlapping_leaves {
            let _ = writeln!(
                out,
                "  - {} ({}) {} to {} [{}]",
                overlap.employee_name,
                overlap.role,
                overlap.from_date,
                overlap.to_date,
                overlap.status.as_str()
            );
        }
    }

    if !assessment.suggested_dates.is_empty() {
        let _ = writeln!(out, "Suggested dates:");
        for suggestion in &assessment.suggested_dates {
            let _ = writeln!(
                out,
                "  - {} to {}: {}",
                suggestion.start_date, suggestion.end_date, suggestion.reason
            );
        }
    }

    if !assessment.recommendations.is_empty() {
        let _ = writeln!(out, "Recommendations:");
        for recommendation in &assessment.recommendations {
            let _ = writeln!(
                out,
                "  [{}] {}: {}",
                recommendation.priority.label(),
                recommendation.action,
                recommendation.details
            );
        }
    }

    out
}

#[derive(Debug, Clone, Parser)]
#[command(name = "leave-advisor")]
#[command(about = "Risk-annotated recommendations for a proposed leave request")]
pub struct CliConfig {
    /// Employee requesting the leave
    #[arg(long)]
    pub employee: String,

    /// Organization the employee belongs to
    #[arg(long)]
    pub org: String,

    /// First day of leave (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day of leave, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// JSON snapshot to analyze instead of the configured source
    #[arg(long)]
    pub snapshot: Option<String>,

    /// Override the current date used for date suggestions
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Abort the analysis after this many seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliConfig {
    pub fn leave_request(&self) -> LeaveRequest {
        LeaveRequest::new(self.employee.clone(), self.org.clone(), self.start, self.end)
    }

    /// 命令列參數覆蓋配置檔設定
    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(path) = &self.snapshot {
            config.source.r#type = SourceType::Snapshot;
            config.source.snapshot_path = Some(path.clone());
        }
        if let Some(seconds) = self.timeout_seconds {
            config.analysis.timeout_seconds = Some(seconds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Recommendation, RecommendationPriority, RiskLevel};

    #[test]
    fn test_parse_arguments() {
        let cli = CliConfig::try_parse_from([
            "leave-advisor",
            "--employee",
            "emp-1",
            "--org",
            "org-1",
            "--start",
            "2026-03-02",
            "--end",
            "2026-03-06",
            "--format",
            "text",
        ])
        .unwrap();

        let request = cli.leave_request();
        assert_eq!(request.employee_id, "emp-1");
        assert_eq!(request.duration_days(), 5);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_rejects_malformed_date() {
        let result = CliConfig::try_parse_from([
            "leave-advisor",
            "--employee",
            "emp-1",
            "--org",
            "org-1",
            "--start",
            "03/02/2026",
            "--end",
            "2026-03-06",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_replace_source_and_timeout() {
        let cli = CliConfig::try_parse_from([
            "leave-advisor",
            "--employee",
            "emp-1",
            "--org",
            "org-1",
            "--start",
            "2026-03-02",
            "--end",
            "2026-03-06",
            "--snapshot",
            "snapshot.json",
            "--timeout-seconds",
            "7",
        ])
        .unwrap();

        let mut config = TomlConfig::default();
        config.source.r#type = SourceType::Rest;
        cli.apply_overrides(&mut config);

        assert_eq!(config.source.r#type, SourceType::Snapshot);
        assert_eq!(config.source.snapshot_path.as_deref(), Some("snapshot.json"));
        assert_eq!(config.analysis.timeout_seconds, Some(7));
    }

    #[test]
    fn test_render_text_headline_and_sections() {
        let mut assessment = RiskAssessment::degraded("boom");
        assessment.error = None;
        assessment.overall_risk_level = RiskLevel::High;
        assessment.recommendations.push(Recommendation::new(
            RecommendationPriority::High,
            "Delegate critical tasks",
            "Consider delegating high-priority tasks before leave or adjusting dates.",
        ));

        let text = render_text(&assessment);
        assert!(text.starts_with("Risk: HIGH\n"));
        assert!(text.contains("Deadlines: Unable to analyze deadlines"));
        assert!(text.contains("  [HIGH] Delegate critical tasks: "));
        assert!(!text.contains("Suggested dates:"));
        assert!(!text.contains("Error:"));
    }

    #[test]
    fn test_render_json() {
        let assessment = RiskAssessment::degraded("boom");
        let json = OutputFormat::Json.render(&assessment).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["overall_risk_level"], "low");
        assert_eq!(value["error"], "boom");
    }
}

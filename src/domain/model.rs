use crate::utils::error::{AdvisorError, Result};
use crate::utils::validation::Validate;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 待評估的請假申請（僅作為輸入，不會被保存）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub employee_id: String,
    pub organization_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl LeaveRequest {
    pub fn new(
        employee_id: impl Into<String>,
        organization_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            organization_id: organization_id.into(),
            start_date,
            end_date,
        }
    }

    /// Inclusive number of calendar days covered by the request.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

impl Validate for LeaveRequest {
    fn validate(&self) -> Result<()> {
        if self.employee_id.trim().is_empty() {
            return Err(AdvisorError::validation("employee id cannot be empty"));
        }
        if self.organization_id.trim().is_empty() {
            return Err(AdvisorError::validation("organization id cannot be empty"));
        }
        if self.start_date > self.end_date {
            return Err(AdvisorError::validation(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
    Urgent,
    #[serde(other)]
    Unspecified,
}

impl TaskPriority {
    pub const HIGH_PRIORITIES: [TaskPriority; 3] =
        [TaskPriority::High, TaskPriority::Critical, TaskPriority::Urgent];

    pub fn is_high(self) -> bool {
        Self::HIGH_PRIORITIES.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Critical => "critical",
            TaskPriority::Urgent => "urgent",
            TaskPriority::Unspecified => "unspecified",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: String,
    pub org_id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub status: String,
    #[serde(default)]
    pub project_id: Option<String>,
    pub assignee: String,
}

impl TaskRef {
    pub const CLOSED_STATUSES: [&'static str; 2] = ["completed", "closed"];

    pub fn is_open(&self) -> bool {
        let status = self.status.to_lowercase();
        !Self::CLOSED_STATUSES.contains(&status.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Approved,
    Pending,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeaveStatus::Approved => "approved",
            LeaveStatus::Pending => "pending",
            LeaveStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRecord {
    pub employee_id: String,
    pub org_id: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub status: LeaveStatus,
}

impl LeaveRecord {
    /// Inclusive range-overlap test against `[start, end]`.
    pub fn intersects(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.from_date <= end && self.to_date >= start
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: String,
    pub org_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
}

impl EmployeeProfile {
    pub fn display_name(&self) -> &str {
        non_empty(&self.full_name).unwrap_or("Unknown")
    }

    /// 角色優先，其次職稱
    pub fn role_label(&self) -> &str {
        non_empty(&self.role)
            .or_else(|| non_empty(&self.job_title))
            .unwrap_or("N/A")
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn ordinal(self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
        }
    }

    /// Anything at or above 2 is high.
    pub fn from_ordinal(ordinal: u8) -> Self {
        match ordinal {
            0 => RiskLevel::Low,
            1 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineSeverity {
    Moderate,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedTask {
    pub id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    /// `None` when the project name could not be resolved.
    pub project: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineImpact {
    pub has_conflict: bool,
    pub severity: Option<DeadlineSeverity>,
    pub affected_tasks: Vec<AffectedTask>,
    pub affected_projects: Vec<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeadlineImpact {
    pub fn no_conflict() -> Self {
        Self {
            has_conflict: false,
            severity: None,
            affected_tasks: Vec::new(),
            affected_projects: Vec::new(),
            message: "No task deadlines during this period.".to_string(),
            error: None,
        }
    }

    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            message: "Unable to check deadlines.".to_string(),
            error: Some(error.into()),
            ..Self::no_conflict()
        }
    }

    pub fn is_critical(&self) -> bool {
        self.has_conflict && self.severity == Some(DeadlineSeverity::Critical)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageRisk {
    pub coverage_percent: u8,
    pub risk_level: RiskLevel,
    pub message: String,
    pub team_size: usize,
    pub available_members: usize,
    /// Peers on approved leave, never counting the requester.
    pub on_leave_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CoverageRisk {
    pub fn unavailable(message: &str, error: Option<String>) -> Self {
        Self {
            coverage_percent: 100,
            risk_level: RiskLevel::Low,
            message: message.to_string(),
            team_size: 0,
            available_members: 0,
            on_leave_count: 0,
            error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCriticality {
    pub level: RiskLevel,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RoleCriticality {
    pub fn unavailable(reason: &str, error: Option<String>) -> Self {
        Self {
            level: RiskLevel::Low,
            reason: reason.to_string(),
            error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveOverlap {
    pub employee_id: String,
    pub employee_name: String,
    pub role: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub status: LeaveStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSuggestion {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

impl RecommendationPriority {
    pub fn rank(self) -> u8 {
        match self {
            RecommendationPriority::High => 2,
            RecommendationPriority::Medium => 1,
            RecommendationPriority::Low => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecommendationPriority::High => "HIGH",
            RecommendationPriority::Medium => "MEDIUM",
            RecommendationPriority::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: RecommendationPriority,
    pub action: String,
    pub details: String,
}

impl Recommendation {
    pub fn new(priority: RecommendationPriority, action: &str, details: impl Into<String>) -> Self {
        Self {
            priority,
            action: action.to_string(),
            details: details.into(),
        }
    }
}

/// 單次分析的完整結果，產生後即不可變
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall_risk_level: RiskLevel,
    pub deadline_impact: DeadlineImpact,
    pub coverage_risk: CoverageRisk,
    pub role_criticality: RoleCriticality,
    pub overlapping_leaves: Vec<LeaveOverlap>,
    pub suggested_dates: Vec<DateSuggestion>,
    pub recommendations: Vec<Recommendation>,
    pub analyzed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RiskAssessment {
    /// All-low, recommendation-free result used when the whole analysis cannot complete.
    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            overall_risk_level: RiskLevel::Low,
            deadline_impact: DeadlineImpact {
                message: "Unable to analyze deadlines".to_string(),
                ..DeadlineImpact::no_conflict()
            },
            coverage_risk: CoverageRisk::unavailable("Unable to calculate coverage", None),
            role_criticality: RoleCriticality::unavailable("Unable to assess criticality", None),
            overlapping_leaves: Vec::new(),
            suggested_dates: Vec::new(),
            recommendations: Vec::new(),
            analyzed_at: Utc::now(),
            error: Some(error.into()),
        }
    }
}

/// Keyword lists and thresholds driving the heuristics. Kept as data so they can be swapped per organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRules {
    pub critical_roles: Vec<String>,
    pub critical_titles: Vec<String>,
    pub critical_task_sample_limit: usize,
    pub coverage_high_below: u8,
    pub coverage_medium_below: u8,
}

impl Default for AnalysisRules {
    fn default() -> Self {
        Self {
            critical_roles: ["manager", "team_lead", "executive", "admin"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            critical_titles: [
                "lead",
                "senior",
                "principal",
                "architect",
                "manager",
                "head",
                "director",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            critical_task_sample_limit: 5,
            coverage_high_below: 30,
            coverage_medium_below: 60,
        }
    }
}

impl AnalysisRules {
    pub fn coverage_band(&self, coverage_percent: u8) -> RiskLevel {
        if coverage_percent < self.coverage_high_below {
            RiskLevel::High
        } else if coverage_percent < self.coverage_medium_below {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

use crate::domain::model::{AnalysisRules, EmployeeProfile, LeaveRecord, LeaveStatus, TaskRef};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::Duration;

/// 唯讀資料來源。每個呼叫都可能獨立失敗，彼此之間不要求交易一致性。
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Non-completed/closed tasks assigned to the employee with a due date in `[start, end]`.
    async fn open_tasks_due_in_range(
        &self,
        employee_id: &str,
        org_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaskRef>>;

    async fn project_names(&self, project_ids: &[String]) -> Result<HashMap<String, String>>;

    async fn project_membership(&self, employee_id: &str, org_id: &str) -> Result<Vec<String>>;

    async fn project_members(&self, project_ids: &[String], org_id: &str) -> Result<Vec<String>>;

    async fn team_members(&self, team_id: &str, org_id: &str) -> Result<Vec<String>>;

    /// `Ok(None)` when the employee has no profile in the organization.
    async fn profile(&self, employee_id: &str, org_id: &str) -> Result<Option<EmployeeProfile>>;

    async fn profiles(&self, employee_ids: &[String], org_id: &str) -> Result<Vec<EmployeeProfile>>;

    /// Number of open high/critical/urgent tasks, counting at most `limit`.
    async fn open_high_priority_task_count(
        &self,
        employee_id: &str,
        org_id: &str,
        limit: usize,
    ) -> Result<usize>;

    async fn leaves_intersecting(
        &self,
        employee_ids: &[String],
        org_id: &str,
        statuses: &[LeaveStatus],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRecord>>;
}

pub trait ConfigProvider: Send + Sync {
    fn analysis_rules(&self) -> AnalysisRules;
    fn analysis_timeout(&self) -> Option<Duration>;
}

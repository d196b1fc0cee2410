use crate::adapters::snapshot::{Snapshot, SnapshotProvider};
use crate::domain::model::{
    EmployeeProfile, LeaveRecord, LeaveRequest, LeaveStatus, TaskPriority, TaskRef,
};
use crate::domain::ports::DataProvider;
use crate::utils::error::{AdvisorError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub(crate) const ORG: &str = "org-1";

pub(crate) fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub(crate) fn request(employee_id: &str, start: &str, end: &str) -> LeaveRequest {
    LeaveRequest::new(employee_id, ORG, date(start), date(end))
}

pub(crate) fn profile(
    id: &str,
    team_id: Option<&str>,
    role: Option<&str>,
    job_title: Option<&str>,
) -> EmployeeProfile {
    EmployeeProfile {
        id: id.to_string(),
        org_id: ORG.to_string(),
        full_name: Some(format!("Employee {}", id)),
        role: role.map(str::to_string),
        job_title: job_title.map(str::to_string),
        department: Some("Engineering".to_string()),
        team_id: team_id.map(str::to_string),
    }
}

pub(crate) fn task(
    id: &str,
    assignee: &str,
    due: &str,
    priority: TaskPriority,
    project_id: Option<&str>,
) -> TaskRef {
    TaskRef {
        id: id.to_string(),
        org_id: ORG.to_string(),
        title: format!("Task {}", id),
        due_date: date(due),
        priority,
        status: "in_progress".to_string(),
        project_id: project_id.map(str::to_string),
        assignee: assignee.to_string(),
    }
}

pub(crate) fn leave(employee_id: &str, from: &str, to: &str, status: LeaveStatus) -> LeaveRecord {
    LeaveRecord {
        employee_id: employee_id.to_string(),
        org_id: ORG.to_string(),
        from_date: date(from),
        to_date: date(to),
        status,
    }
}

/// Wraps a snapshot and injects failures, panics or latency per provider method.
pub(crate) struct FaultyProvider {
    inner: SnapshotProvider,
    failing: Vec<&'static str>,
    panicking: Vec<&'static str>,
    fail_all: bool,
    delay: Option<Duration>,
    completed: Arc<AtomicUsize>,
}

impl FaultyProvider {
    pub(crate) fn new(snapshot: Snapshot) -> Self {
        Self {
            inner: SnapshotProvider::new(snapshot),
            failing: Vec::new(),
            panicking: Vec::new(),
            fail_all: false,
            delay: None,
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn failing(mut self, method: &'static str) -> Self {
        self.failing.push(method);
        self
    }

    pub(crate) fn failing_all(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub(crate) fn panicking(mut self, method: &'static str) -> Self {
        self.panicking.push(method);
        self
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls that made it past the injected delay.
    pub(crate) fn completed_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.completed)
    }

    async fn gate(&self, method: &'static str) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        if self.panicking.contains(&method) {
            panic!("injected panic in {}", method);
        }
        if self.fail_all || self.failing.contains(&method) {
            return Err(AdvisorError::data_source(format!(
                "injected failure in {}",
                method
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DataProvider for FaultyProvider {
    async fn open_tasks_due_in_range(
        &self,
        employee_id: &str,
        org_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaskRef>> {
        self.gate("open_tasks_due_in_range").await?;
        self.inner
            .open_tasks_due_in_range(employee_id, org_id, start, end)
            .await
    }

    async fn project_names(&self, project_ids: &[String]) -> Result<HashMap<String, String>> {
        self.gate("project_names").await?;
        self.inner.project_names(project_ids).await
    }

    async fn project_membership(&self, employee_id: &str, org_id: &str) -> Result<Vec<String>> {
        self.gate("project_membership").await?;
        self.inner.project_membership(employee_id, org_id).await
    }

    async fn project_members(&self, project_ids: &[String], org_id: &str) -> Result<Vec<String>> {
        self.gate("project_members").await?;
        self.inner.project_members(project_ids, org_id).await
    }

    async fn team_members(&self, team_id: &str, org_id: &str) -> Result<Vec<String>> {
        self.gate("team_members").await?;
        self.inner.team_members(team_id, org_id).await
    }

    async fn profile(&self, employee_id: &str, org_id: &str) -> Result<Option<EmployeeProfile>> {
        self.gate("profile").await?;
        self.inner.profile(employee_id, org_id).await
    }

    async fn profiles(&self, employee_ids: &[String], org_id: &str) -> Result<Vec<EmployeeProfile>> {
        self.gate("profiles").await?;
        self.inner.profiles(employee_ids, org_id).await
    }

    async fn open_high_priority_task_count(
        &self,
        employee_id: &str,
        org_id: &str,
        limit: usize,
    ) -> Result<usize> {
        self.gate("open_high_priority_task_count").await?;
        self.inner
            .open_high_priority_task_count(employee_id, org_id, limit)
            .await
    }

    async fn leaves_intersecting(
        &self,
        employee_ids: &[String],
        org_id: &str,
        statuses: &[LeaveStatus],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRecord>> {
        self.gate("leaves_intersecting").await?;
        self.inner
            .leaves_intersecting(employee_ids, org_id, statuses, start, end)
            .await
    }
}

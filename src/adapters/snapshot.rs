use crate::domain::model::{EmployeeProfile, LeaveRecord, LeaveStatus, TaskRef};
use crate::domain::ports::DataProvider;
use crate::utils::error::{AdvisorError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub org_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub project_id: String,
    pub employee_id: String,
    pub org_id: String,
}

/// 某一時間點的資料快照，可由 JSON 檔案載入
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub profiles: Vec<EmployeeProfile>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub project_members: Vec<ProjectMember>,
    #[serde(default)]
    pub tasks: Vec<TaskRef>,
    #[serde(default)]
    pub leaves: Vec<LeaveRecord>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: EmployeeProfile) -> Self {
        self.profiles.push(profile);
        self
    }

    pub fn with_project(mut self, id: &str, org_id: &str, name: &str, members: &[&str]) -> Self {
        self.projects.push(Project {
            id: id.to_string(),
            org_id: org_id.to_string(),
            name: name.to_string(),
        });
        for member in members {
            self.project_members.push(ProjectMember {
                project_id: id.to_string(),
                employee_id: member.to_string(),
                org_id: org_id.to_string(),
            });
        }
        self
    }

    pub fn with_task(mut self, task: TaskRef) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_leave(mut self, leave: LeaveRecord) -> Self {
        self.leaves.push(leave);
        self
    }
}

/// In-memory provider over a [`Snapshot`]. Cloning shares the underlying data.
#[derive(Debug, Clone, Default)]
pub struct SnapshotProvider {
    snapshot: Arc<Snapshot>,
}

impl SnapshotProvider {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(content)?;
        Ok(Self::new(snapshot))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AdvisorError::IoError)?;
        let provider = Self::from_json_str(&content)?;
        tracing::debug!(
            "Loaded snapshot from {}: {} profiles, {} tasks, {} leaves",
            path.as_ref().display(),
            provider.snapshot.profiles.len(),
            provider.snapshot.tasks.len(),
            provider.snapshot.leaves.len()
        );
        Ok(provider)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

fn push_unique(ids: &mut Vec<String>, id: &str) {
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
    }
}

#[async_trait]
impl DataProvider for SnapshotProvider {
    async fn open_tasks_due_in_range(
        &self,
        employee_id: &str,
        org_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaskRef>> {
        Ok(self
            .snapshot
            .tasks
            .iter()
            .filter(|t| t.assignee == employee_id && t.org_id == org_id)
            .filter(|t| t.is_open() && t.due_date >= start && t.due_date <= end)
            .cloned()
            .collect())
    }

    async fn project_names(&self, project_ids: &[String]) -> Result<HashMap<String, String>> {
        Ok(self
            .snapshot
            .projects
            .iter()
            .filter(|p| project_ids.contains(&p.id))
            .map(|p| (p.id.clone(), p.name.clone()))
            .collect())
    }

    async fn project_membership(&self, employee_id: &str, org_id: &str) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for member in &self.snapshot.project_members {
            if member.employee_id == employee_id && member.org_id == org_id {
                push_unique(&mut ids, &member.project_id);
            }
        }
        Ok(ids)
    }

    async fn project_members(&self, project_ids: &[String], org_id: &str) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for member in &self.snapshot.project_members {
            if member.org_id == org_id && project_ids.contains(&member.project_id) {
                push_unique(&mut ids, &member.employee_id);
            }
        }
        Ok(ids)
    }

    async fn team_members(&self, team_id: &str, org_id: &str) -> Result<Vec<String>> {
        Ok(self
            .snapshot
            .profiles
            .iter()
            .filter(|p| p.org_id == org_id && p.team_id.as_deref() == Some(team_id))
            .map(|p| p.id.clone())
            .collect())
    }

    async fn profile(&self, employee_id: &str, org_id: &str) -> Result<Option<EmployeeProfile>> {
        Ok(self
            .snapshot
            .profiles
            .iter()
            .find(|p| p.id == employee_id && p.org_id == org_id)
            .cloned())
    }

    async fn profiles(&self, employee_ids: &[String], org_id: &str) -> Result<Vec<EmployeeProfile>> {
        Ok(self
            .snapshot
            .profiles
            .iter()
            .filter(|p| p.org_id == org_id && employee_ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn open_high_priority_task_count(
        &self,
        employee_id: &str,
        org_id: &str,
        limit: usize,
    ) -> Result<usize> {
        Ok(self
            .snapshot
            .tasks
            .iter()
            .filter(|t| t.assignee == employee_id && t.org_id == org_id)
            .filter(|t| t.is_open() && t.priority.is_high())
            .take(limit)
            .count())
    }

    async fn leaves_intersecting(
        &self,
        employee_ids: &[String],
        org_id: &str,
        statuses: &[LeaveStatus],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRecord>> {
        Ok(self
            .snapshot
            .leaves
            .iter()
            .filter(|l| l.org_id == org_id && employee_ids.contains(&l.employee_id))
            .filter(|l| statuses.contains(&l.status) && l.intersects(start, end))
            .cloned()
            .collect())
    }
}

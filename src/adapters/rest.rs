use crate::domain::model::{EmployeeProfile, LeaveRecord, LeaveStatus, TaskPriority, TaskRef};
use crate::domain::ports::DataProvider;
use crate::utils::error::{AdvisorError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const TASK_COLUMNS: &str = "id,title,due_date,priority,status,project_id,assigned_to";
const PROFILE_COLUMNS: &str = "id,full_name,role,job_title,department,team_id";
const CLOSED_STATUS_FILTER: &str = "not.in.(completed,closed)";

#[derive(Debug, Deserialize)]
struct TaskRow {
    id: String,
    title: Option<String>,
    due_date: Option<NaiveDate>,
    priority: Option<TaskPriority>,
    status: Option<String>,
    project_id: Option<String>,
    assigned_to: String,
}

#[derive(Debug, Deserialize)]
struct ProjectRow {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProjectIdRow {
    project_id: String,
}

#[derive(Debug, Deserialize)]
struct UserIdRow {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: String,
    full_name: Option<String>,
    role: Option<String>,
    job_title: Option<String>,
    department: Option<String>,
    team_id: Option<String>,
}

impl ProfileRow {
    fn into_profile(self, org_id: &str) -> EmployeeProfile {
        EmployeeProfile {
            id: self.id,
            org_id: org_id.to_string(),
            full_name: self.full_name,
            role: self.role,
            job_title: self.job_title,
            department: self.department,
            team_id: self.team_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LeaveRow {
    employee_id: String,
    from_date: NaiveDate,
    to_date: NaiveDate,
    status: LeaveStatus,
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

fn in_list<S: AsRef<str>>(values: &[S]) -> String {
    let joined: Vec<&str> = values.iter().map(|v| v.as_ref()).collect();
    format!("in.({})", joined.join(","))
}

fn dedupe(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

/// PostgREST 風格的 HTTP 資料來源（例如 Supabase 的 `/rest/v1`）
pub struct RestDataProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestDataProvider {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        validate_url("source.endpoint", base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        tracing::debug!("Querying {} with {} filter(s)", url, query.len());

        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("{} response status: {}", table, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::data_source(format!(
                "query on '{}' failed with status {}: {}",
                table, status, body
            )));
        }

        Ok(response.json::<Vec<T>>().await?)
    }
}

#[async_trait]
impl DataProvider for RestDataProvider {
    async fn open_tasks_due_in_range(
        &self,
        employee_id: &str,
        org_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaskRef>> {
        let rows: Vec<TaskRow> = self
            .fetch(
                "tasks",
                &[
                    ("select", TASK_COLUMNS.to_string()),
                    ("assigned_to", eq(employee_id)),
                    ("org_id", eq(org_id)),
                    ("status", CLOSED_STATUS_FILTER.to_string()),
                    ("due_date", format!("gte.{}", start)),
                    ("due_date", format!("lte.{}", end)),
                ],
            )
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let due_date = row.due_date?;
                Some(TaskRef {
                    id: row.id,
                    org_id: org_id.to_string(),
                    title: row.title.unwrap_or_default(),
                    due_date,
                    priority: row.priority.unwrap_or(TaskPriority::Unspecified),
                    status: row.status.unwrap_or_default(),
                    project_id: row.project_id,
                    assignee: row.assigned_to,
                })
            })
            .collect())
    }

    async fn project_names(&self, project_ids: &[String]) -> Result<HashMap<String, String>> {
        if project_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<ProjectRow> = self
            .fetch(
                "projects",
                &[("select", "id,name".to_string()), ("id", in_list(project_ids))],
            )
            .await?;
        Ok(rows.into_iter().map(|row| (row.id, row.name)).collect())
    }

    async fn project_membership(&self, employee_id: &str, org_id: &str) -> Result<Vec<String>> {
        let rows: Vec<ProjectIdRow> = self
            .fetch(
                "project_members",
                &[
                    ("select", "project_id".to_string()),
                    ("user_id", eq(employee_id)),
                    ("org_id", eq(org_id)),
                ],
            )
            .await?;
        Ok(dedupe(rows.into_iter().map(|row| row.project_id)))
    }

    async fn project_members(&self, project_ids: &[String], org_id: &str) -> Result<Vec<String>> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<UserIdRow> = self
            .fetch(
                "project_members",
                &[
                    ("select", "user_id".to_string()),
                    ("project_id", in_list(project_ids)),
                    ("org_id", eq(org_id)),
                ],
            )
            .await?;
        Ok(dedupe(rows.into_iter().map(|row| row.user_id)))
    }

    async fn team_members(&self, team_id: &str, org_id: &str) -> Result<Vec<String>> {
        let rows: Vec<IdRow> = self
            .fetch(
                "profiles",
                &[
                    ("select", "id".to_string()),
                    ("team_id", eq(team_id)),
                    ("org_id", eq(org_id)),
                ],
            )
            .await?;
        Ok(dedupe(rows.into_iter().map(|row| row.id)))
    }

    async fn profile(&self, employee_id: &str, org_id: &str) -> Result<Option<EmployeeProfile>> {
        let rows: Vec<ProfileRow> = self
            .fetch(
                "profiles",
                &[
                    ("select", PROFILE_COLUMNS.to_string()),
                    ("id", eq(employee_id)),
                    ("org_id", eq(org_id)),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(|row| row.into_profile(org_id)))
    }

    async fn profiles(&self, employee_ids: &[String], org_id: &str) -> Result<Vec<EmployeeProfile>> {
        if employee_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<ProfileRow> = self
            .fetch(
                "profiles",
                &[
                    ("select", PROFILE_COLUMNS.to_string()),
                    ("id", in_list(employee_ids)),
                    ("org_id", eq(org_id)),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(|row| row.into_profile(org_id)).collect())
    }

    async fn open_high_priority_task_count(
        &self,
        employee_id: &str,
        org_id: &str,
        limit: usize,
    ) -> Result<usize> {
        let priorities: Vec<&str> = TaskPriority::HIGH_PRIORITIES
            .iter()
            .map(|p| p.as_str())
            .collect();
        let rows: Vec<IdRow> = self
            .fetch(
                "tasks",
                &[
                    ("select", "id".to_string()),
                    ("assigned_to", eq(employee_id)),
                    ("org_id", eq(org_id)),
                    ("priority", in_list(priorities.as_slice())),
                    ("status", CLOSED_STATUS_FILTER.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(rows.len().min(limit))
    }

    async fn leaves_intersecting(
        &self,
        employee_ids: &[String],
        org_id: &str,
        statuses: &[LeaveStatus],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRecord>> {
        if employee_ids.is_empty() || statuses.is_empty() {
            return Ok(Vec::new());
        }
        let status_names: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        // 兩個條件同時成立才算區間重疊
        let rows: Vec<LeaveRow> = self
            .fetch(
                "leaves",
                &[
                    ("select", "employee_id,from_date,to_date,status".to_string()),
                    ("org_id", eq(org_id)),
                    ("employee_id", in_list(employee_ids)),
                    ("status", in_list(status_names.as_slice())),
                    ("from_date", format!("lte.{}", end)),
                    ("to_date", format!("gte.{}", start)),
                ],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| LeaveRecord {
                employee_id: row.employee_id,
                org_id: org_id.to_string(),
                from_date: row.from_date,
                to_date: row.to_date,
                status: row.status,
            })
            .collect())
    }
}

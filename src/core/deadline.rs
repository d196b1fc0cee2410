use crate::domain::model::{AffectedTask, DeadlineImpact, DeadlineSeverity, LeaveRequest, TaskRef};
use crate::domain::ports::DataProvider;
use crate::utils::error::Result;
use std::collections::HashMap;

const UNKNOWN_PROJECT: &str = "Unknown Project";

/// Finds open tasks due inside the requested window. Never fails: read errors degrade to
/// "no conflict" with the error attached.
pub async fn check_deadlines<P: DataProvider + ?Sized>(
    provider: &P,
    request: &LeaveRequest,
) -> DeadlineImpact {
    match try_check_deadlines(provider, request).await {
        Ok(impact) => impact,
        Err(e) => {
            tracing::warn!("⚠️ Deadline check failed for {}: {}", request.employee_id, e);
            DeadlineImpact::unavailable(e.to_string())
        }
    }
}

async fn try_check_deadlines<P: DataProvider + ?Sized>(
    provider: &P,
    request: &LeaveRequest,
) -> Result<DeadlineImpact> {
    let tasks: Vec<TaskRef> = provider
        .open_tasks_due_in_range(
            &request.employee_id,
            &request.organization_id,
            request.start_date,
            request.end_date,
        )
        .await?
        .into_iter()
        .filter(|t| t.is_open() && t.due_date >= request.start_date && t.due_date <= request.end_date)
        .collect();

    if tasks.is_empty() {
        return Ok(DeadlineImpact::no_conflict());
    }

    let project_names = resolve_project_names(provider, &tasks).await;

    let high_priority_count = tasks.iter().filter(|t| t.priority.is_high()).count();
    let severity = if high_priority_count > 0 {
        DeadlineSeverity::Critical
    } else {
        DeadlineSeverity::Moderate
    };

    let mut affected_projects: Vec<String> = Vec::new();
    for task in &tasks {
        let name = task
            .project_id
            .as_ref()
            .and_then(|id| project_names.get(id))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_PROJECT);
        if !affected_projects.iter().any(|p| p == name) {
            affected_projects.push(name.to_string());
        }
    }

    let message = match severity {
        DeadlineSeverity::Critical => format!(
            "{} high-priority task(s) due during this period. Consider rescheduling or delegating.",
            high_priority_count
        ),
        DeadlineSeverity::Moderate => format!(
            "{} task(s) due during this period. Ensure handover is planned.",
            tasks.len()
        ),
    };

    tracing::debug!(
        "Deadline check for {}: {} task(s), severity {:?}",
        request.employee_id,
        tasks.len(),
        severity
    );

    let affected_tasks = tasks
        .into_iter()
        .map(|t| AffectedTask {
            project: t
                .project_id
                .as_ref()
                .and_then(|id| project_names.get(id))
                .cloned(),
            id: t.id,
            title: t.title,
            due_date: t.due_date,
            priority: t.priority,
        })
        .collect();

    Ok(DeadlineImpact {
        has_conflict: true,
        severity: Some(severity),
        affected_tasks,
        affected_projects,
        message,
        error: None,
    })
}

/// 專案名稱僅供顯示，查詢失敗時不影響結果
async fn resolve_project_names<P: DataProvider + ?Sized>(
    provider: &P,
    tasks: &[TaskRef],
) -> HashMap<String, String> {
    let mut project_ids: Vec<String> = Vec::new();
    for id in tasks.iter().filter_map(|t| t.project_id.as_ref()) {
        if !project_ids.contains(id) {
            project_ids.push(id.clone());
        }
    }

    if project_ids.is_empty() {
        return HashMap::new();
    }

    match provider.project_names(&project_ids).await {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!("⚠️ Could not resolve project names: {}", e);
            HashMap::new()
        }
    }
}

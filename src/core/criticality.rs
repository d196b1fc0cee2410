use crate::domain::model::{AnalysisRules, RiskLevel, RoleCriticality};
use crate::domain::ports::DataProvider;
use crate::utils::error::Result;

/// Case-insensitive substring match of `text` against any non-empty keyword.
pub fn matches_keyword(text: &str, keywords: &[String]) -> bool {
    let text = text.to_lowercase();
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .any(|k| !k.is_empty() && text.contains(&k))
}

/// Scores how hard the employee is to replace. Read errors degrade to low criticality.
pub async fn assess_role_criticality<P: DataProvider + ?Sized>(
    provider: &P,
    employee_id: &str,
    org_id: &str,
    rules: &AnalysisRules,
) -> RoleCriticality {
    match try_assess(provider, employee_id, org_id, rules).await {
        Ok(criticality) => criticality,
        Err(e) => {
            tracing::warn!("⚠️ Role criticality assessment failed for {}: {}", employee_id, e);
            RoleCriticality::unavailable("Unable to assess role criticality.", Some(e.to_string()))
        }
    }
}

async fn try_assess<P: DataProvider + ?Sized>(
    provider: &P,
    employee_id: &str,
    org_id: &str,
    rules: &AnalysisRules,
) -> Result<RoleCriticality> {
    let Some(profile) = provider.profile(employee_id, org_id).await? else {
        return Ok(RoleCriticality::unavailable("Unable to assess role.", None));
    };

    let role = profile.role.as_deref().unwrap_or_default();
    let title = profile.job_title.as_deref().unwrap_or_default();

    let is_role_critical = matches_keyword(role, &rules.critical_roles);
    let is_title_critical = matches_keyword(title, &rules.critical_titles);

    let critical_tasks = provider
        .open_high_priority_task_count(employee_id, org_id, rules.critical_task_sample_limit)
        .await?;

    tracing::debug!(
        "Criticality for {}: role_critical={}, title_critical={}, high_priority_tasks={}",
        employee_id,
        is_role_critical,
        is_title_critical,
        critical_tasks
    );

    // 角色條件優先於任務條件
    if is_role_critical {
        return Ok(RoleCriticality {
            level: RiskLevel::High,
            reason: format!("{} role is critical for team operations.", role),
            error: None,
        });
    }

    if critical_tasks > 0 {
        return Ok(RoleCriticality {
            level: RiskLevel::High,
            reason: format!("Currently owns {} high-priority task(s).", critical_tasks),
            error: None,
        });
    }

    if is_title_critical {
        return Ok(RoleCriticality {
            level: RiskLevel::Medium,
            reason: format!("{} position may require handover coordination.", title),
            error: None,
        });
    }

    Ok(RoleCriticality {
        level: RiskLevel::Low,
        reason: "Standard role with manageable handover requirements.".to_string(),
        error: None,
    })
}

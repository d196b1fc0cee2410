use crate::core::collaboration::resolve_group;
use crate::domain::model::{AnalysisRules, CoverageRisk, LeaveRequest, LeaveStatus, RiskLevel};
use crate::domain::ports::DataProvider;
use crate::utils::error::Result;
use std::collections::BTreeSet;

/// Computes what share of the collaboration group stays available during the window.
/// Read errors degrade to full coverage with the error attached.
pub async fn calculate_coverage<P: DataProvider + ?Sized>(
    provider: &P,
    request: &LeaveRequest,
    rules: &AnalysisRules,
) -> CoverageRisk {
    match try_calculate_coverage(provider, request, rules).await {
        Ok(coverage) => coverage,
        Err(e) => {
            tracing::warn!("⚠️ Coverage calculation failed for {}: {}", request.employee_id, e);
            CoverageRisk::unavailable("Unable to calculate coverage.", Some(e.to_string()))
        }
    }
}

async fn try_calculate_coverage<P: DataProvider + ?Sized>(
    provider: &P,
    request: &LeaveRequest,
    rules: &AnalysisRules,
) -> Result<CoverageRisk> {
    let employee_id = request.employee_id.as_str();
    let org_id = request.organization_id.as_str();

    let Some(profile) = provider.profile(employee_id, org_id).await? else {
        tracing::debug!("No profile for {} in {}", employee_id, org_id);
        return Ok(CoverageRisk::unavailable("Unable to determine team.", None));
    };

    let group = resolve_group(provider, employee_id, org_id, Some(&profile)).await?;
    let team_size = group.size();

    // 只有自己一人：沒有任何人能代理
    if team_size <= 1 {
        return Ok(CoverageRisk {
            coverage_percent: 0,
            risk_level: RiskLevel::High,
            message: "You are the only member in your team/project. No coverage during leave."
                .to_string(),
            team_size,
            available_members: 0,
            on_leave_count: 0,
            error: None,
        });
    }

    let leaves = provider
        .leaves_intersecting(
            &group.member_ids(),
            org_id,
            &[LeaveStatus::Approved],
            request.start_date,
            request.end_date,
        )
        .await?;

    let mut unavailable: BTreeSet<&str> = leaves
        .iter()
        .filter(|l| l.status == LeaveStatus::Approved)
        .filter(|l| l.intersects(request.start_date, request.end_date))
        .filter(|l| group.contains(&l.employee_id))
        .map(|l| l.employee_id.as_str())
        .collect();
    let on_leave_count = unavailable.iter().filter(|id| **id != employee_id).count();
    unavailable.insert(employee_id);

    let available_members = team_size - unavailable.len();
    let coverage_percent = coverage_percent(available_members, team_size);
    let risk_level = rules.coverage_band(coverage_percent);

    let message = match risk_level {
        RiskLevel::High => format!(
            "Low team coverage: Only {}% available. Consider alternate dates.",
            coverage_percent
        ),
        RiskLevel::Medium => format!(
            "Moderate team coverage: {}% available during this period.",
            coverage_percent
        ),
        RiskLevel::Low => format!(
            "Team coverage: {}% ({}/{} available)",
            coverage_percent, available_members, team_size
        ),
    };

    tracing::debug!(
        "Coverage for {}: {}/{} available, {} peer(s) on leave",
        employee_id,
        available_members,
        team_size,
        on_leave_count
    );

    Ok(CoverageRisk {
        coverage_percent,
        risk_level,
        message,
        team_size,
        available_members,
        on_leave_count,
        error: None,
    })
}

fn coverage_percent(available: usize, team_size: usize) -> u8 {
    if team_size == 0 {
        return 0;
    }
    let percent = (available as f64 / team_size as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

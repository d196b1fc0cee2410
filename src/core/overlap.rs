use crate::core::collaboration::resolve_group;
use crate::domain::model::{EmployeeProfile, LeaveOverlap, LeaveRequest, LeaveStatus};
use crate::domain::ports::DataProvider;
use crate::utils::error::Result;
use std::collections::HashMap;

/// Statuses counted as overlapping. Pending leaves are included on purpose.
pub const OVERLAP_STATUSES: [LeaveStatus; 2] = [LeaveStatus::Approved, LeaveStatus::Pending];

/// Lists peers' approved or pending leaves that intersect the window, one entry per leave
/// record. Read errors degrade to an empty list.
pub async fn detect_overlaps<P: DataProvider + ?Sized>(
    provider: &P,
    request: &LeaveRequest,
) -> Vec<LeaveOverlap> {
    match try_detect_overlaps(provider, request).await {
        Ok(overlaps) => overlaps,
        Err(e) => {
            tracing::warn!("⚠️ Overlap detection failed for {}: {}", request.employee_id, e);
            Vec::new()
        }
    }
}

async fn try_detect_overlaps<P: DataProvider + ?Sized>(
    provider: &P,
    request: &LeaveRequest,
) -> Result<Vec<LeaveOverlap>> {
    let employee_id = request.employee_id.as_str();
    let org_id = request.organization_id.as_str();

    let group = resolve_group(provider, employee_id, org_id, None).await?;
    let peers = group.peers(employee_id);
    if peers.is_empty() {
        return Ok(Vec::new());
    }

    let leaves = provider
        .leaves_intersecting(
            &peers,
            org_id,
            &OVERLAP_STATUSES,
            request.start_date,
            request.end_date,
        )
        .await?;

    let leaves: Vec<_> = leaves
        .into_iter()
        .filter(|l| OVERLAP_STATUSES.contains(&l.status))
        .filter(|l| l.intersects(request.start_date, request.end_date))
        .filter(|l| l.employee_id != employee_id && group.contains(&l.employee_id))
        .collect();

    if leaves.is_empty() {
        return Ok(Vec::new());
    }

    // 姓名與角色僅用於標註，查不到時以預設值顯示
    let profiles: HashMap<String, EmployeeProfile> = match provider.profiles(&peers, org_id).await {
        Ok(profiles) => profiles.into_iter().map(|p| (p.id.clone(), p)).collect(),
        Err(e) => {
            tracing::warn!("⚠️ Could not load peer profiles: {}", e);
            HashMap::new()
        }
    };

    tracing::debug!(
        "Found {} overlapping leave(s) among {} peer(s) of {}",
        leaves.len(),
        peers.len(),
        employee_id
    );

    Ok(leaves
        .into_iter()
        .map(|leave| {
            let profile = profiles.get(&leave.employee_id);
            LeaveOverlap {
                employee_name: profile
                    .map(|p| p.display_name().to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
                role: profile
                    .map(|p| p.role_label().to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
                employee_id: leave.employee_id,
                from_date: leave.from_date,
                to_date: leave.to_date,
                status: leave.status,
            }
        })
        .collect())
}

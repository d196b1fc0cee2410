use crate::domain::model::EmployeeProfile;
use crate::domain::ports::DataProvider;
use crate::utils::error::Result;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSource {
    Project,
    Team,
    Unresolved,
}

/// The employees an absence directly affects. Always contains the subject employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaborationGroup {
    pub source: GroupSource,
    members: BTreeSet<String>,
}

impl CollaborationGroup {
    pub fn new(source: GroupSource, subject: &str, members: impl IntoIterator<Item = String>) -> Self {
        let mut members: BTreeSet<String> = members.into_iter().collect();
        members.insert(subject.to_string());
        Self { source, members }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, employee_id: &str) -> bool {
        self.members.contains(employee_id)
    }

    pub fn member_ids(&self) -> Vec<String> {
        self.members.iter().cloned().collect()
    }

    /// Members other than `subject`.
    pub fn peers(&self, subject: &str) -> Vec<String> {
        self.members
            .iter()
            .filter(|id| id.as_str() != subject)
            .cloned()
            .collect()
    }
}

/// 先以專案成員決定協作群組；員工不屬於任何專案時才退回團隊成員。
///
/// `profile` may be passed in when the caller already loaded it; otherwise it is fetched
/// only if the team fallback is needed.
pub async fn resolve_group<P: DataProvider + ?Sized>(
    provider: &P,
    employee_id: &str,
    org_id: &str,
    profile: Option<&EmployeeProfile>,
) -> Result<CollaborationGroup> {
    let project_ids = provider.project_membership(employee_id, org_id).await?;

    if !project_ids.is_empty() {
        let members = provider.project_members(&project_ids, org_id).await?;
        tracing::debug!(
            "Resolved project group for {}: {} project(s), {} member(s)",
            employee_id,
            project_ids.len(),
            members.len()
        );
        return Ok(CollaborationGroup::new(GroupSource::Project, employee_id, members));
    }

    let team_id = match profile {
        Some(profile) => profile.team_id.clone(),
        None => provider
            .profile(employee_id, org_id)
            .await?
            .and_then(|p| p.team_id),
    };

    match team_id.filter(|id| !id.trim().is_empty()) {
        Some(team_id) => {
            let members = provider.team_members(&team_id, org_id).await?;
            tracing::debug!(
                "Resolved team group for {} via team {}: {} member(s)",
                employee_id,
                team_id,
                members.len()
            );
            Ok(CollaborationGroup::new(GroupSource::Team, employee_id, members))
        }
        None => {
            tracing::debug!("No project or team found for {}", employee_id);
            Ok(CollaborationGroup::new(
                GroupSource::Unresolved,
                employee_id,
                Vec::new(),
            ))
        }
    }
}

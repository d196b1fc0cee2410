use crate::core::Findings;
use crate::domain::model::{DateSuggestion, LeaveRequest, RiskLevel};
use chrono::{Datelike, NaiveDate, TimeDelta, Weekday};

struct Candidate {
    shift_days: i64,
    reason: &'static str,
    /// Only offered when the shifted start is strictly after today.
    requires_future_start: bool,
}

/// 固定的候選區間，依序輸出，不依風險排序
const CANDIDATES: [Candidate; 3] = [
    Candidate {
        shift_days: 7,
        reason: "One week later - may avoid current deadline conflicts",
        requires_future_start: false,
    },
    Candidate {
        shift_days: 14,
        reason: "Two weeks later - improved team coverage expected",
        requires_future_start: false,
    },
    Candidate {
        shift_days: -7,
        reason: "One week earlier - before project deadline",
        requires_future_start: true,
    },
];

pub const MAX_SUGGESTIONS: usize = 3;

/// True when any signal warrants offering alternate dates.
pub fn needs_alternatives(findings: &Findings) -> bool {
    findings.deadline_impact.has_conflict
        || findings.coverage_risk.risk_level != RiskLevel::Low
        || !findings.overlapping_leaves.is_empty()
}

/// Proposes same-duration windows shifted from the request. Candidates are not re-analyzed,
/// so they are hints rather than guaranteed lower-risk windows.
pub fn suggest_alternate_dates(
    request: &LeaveRequest,
    findings: &Findings,
    today: NaiveDate,
) -> Vec<DateSuggestion> {
    if !needs_alternatives(findings) {
        return Vec::new();
    }

    let span = TimeDelta::days(request.duration_days() - 1);

    CANDIDATES
        .iter()
        .filter_map(|candidate| {
            let shifted = request
                .start_date
                .checked_add_signed(TimeDelta::days(candidate.shift_days))?;
            if candidate.requires_future_start && shifted <= today {
                return None;
            }
            let start_date = next_weekday(shifted)?;
            let end_date = start_date.checked_add_signed(span)?;
            Some(DateSuggestion {
                start_date,
                end_date,
                reason: candidate.reason.to_string(),
            })
        })
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Advances day by day until the date is not a Saturday or Sunday.
fn next_weekday(mut date: NaiveDate) -> Option<NaiveDate> {
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date = date.succ_opt()?;
    }
    Some(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{date, request};
    use crate::domain::model::{
        CoverageRisk, DeadlineImpact, DeadlineSeverity, LeaveOverlap, LeaveStatus, RoleCriticality,
    };

    fn quiet_findings() -> Findings {
        Findings {
            deadline_impact: DeadlineImpact::no_conflict(),
            coverage_risk: CoverageRisk {
                coverage_percent: 80,
                risk_level: RiskLevel::Low,
                message: String::new(),
                team_size: 5,
                available_members: 4,
                on_leave_count: 0,
                error: None,
            },
            role_criticality: RoleCriticality {
                level: RiskLevel::High,
                reason: String::new(),
                error: None,
            },
            overlapping_leaves: Vec::new(),
        }
    }

    #[test]
    fn test_no_risk_no_suggestions() {
        // role criticality alone does not trigger suggestions
        let suggestions = suggest_alternate_dates(
            &request("e1", "2026-03-02", "2026-03-06"),
            &quiet_findings(),
            date("2026-01-01"),
        );
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_each_trigger_enables_suggestions() {
        let mut deadline = quiet_findings();
        deadline.deadline_impact.has_conflict = true;
        deadline.deadline_impact.severity = Some(DeadlineSeverity::Moderate);
        assert!(needs_alternatives(&deadline));

        let mut coverage = quiet_findings();
        coverage.coverage_risk.risk_level = RiskLevel::Medium;
        assert!(needs_alternatives(&coverage));

        let mut overlaps = quiet_findings();
        overlaps.overlapping_leaves.push(LeaveOverlap {
            employee_id: "e2".to_string(),
            employee_name: "Grace".to_string(),
            role: "N/A".to_string(),
            from_date: date("2026-03-02"),
            to_date: date("2026-03-03"),
            status: LeaveStatus::Pending,
        });
        assert!(needs_alternatives(&overlaps));
    }

    #[test]
    fn test_three_candidates_preserve_duration() {
        let mut findings = quiet_findings();
        findings.coverage_risk.risk_level = RiskLevel::High;
        // Monday to Friday
        let req = request("e1", "2026-03-02", "2026-03-06");

        let suggestions = suggest_alternate_dates(&req, &findings, date("2026-01-01"));
        assert_eq!(suggestions.len(), 3);

        assert_eq!(suggestions[0].start_date, date("2026-03-09"));
        assert_eq!(suggestions[0].end_date, date("2026-03-13"));
        assert!(suggestions[0].reason.starts_with("One week later"));
        assert_eq!(suggestions[1].start_date, date("2026-03-16"));
        assert!(suggestions[1].reason.starts_with("Two weeks later"));
        assert_eq!(suggestions[2].start_date, date("2026-02-23"));
        assert!(suggestions[2].reason.starts_with("One week earlier"));

        for s in &suggestions {
            assert_eq!(s.end_date - s.start_date, req.end_date - req.start_date);
        }
    }

    #[test]
    fn test_weekend_start_moves_to_monday() {
        let mut findings = quiet_findings();
        findings.deadline_impact.has_conflict = true;
        // Saturday to Tuesday
        let req = request("e1", "2026-03-07", "2026-03-10");

        let suggestions = suggest_alternate_dates(&req, &findings, date("2026-01-01"));
        assert_eq!(suggestions[0].start_date, date("2026-03-16"));
        assert_eq!(suggestions[0].end_date, date("2026-03-19"));
        assert_eq!(suggestions[1].start_date, date("2026-03-23"));
        assert_eq!(suggestions[2].start_date, date("2026-03-02"));
        assert!(suggestions.iter().all(|s| !matches!(s.start_date.weekday(), Weekday::Sat | Weekday::Sun)));
    }

    #[test]
    fn test_earlier_window_requires_future_start() {
        let mut findings = quiet_findings();
        findings.coverage_risk.risk_level = RiskLevel::High;
        let req = request("e1", "2026-03-09", "2026-03-10");

        // shifted start 2026-03-02 equals today: not strictly after
        let suggestions = suggest_alternate_dates(&req, &findings, date("2026-03-02"));
        assert_eq!(suggestions.len(), 2);

        let suggestions = suggest_alternate_dates(&req, &findings, date("2026-03-01"));
        assert_eq!(suggestions.len(), 3);
    }
}

use crate::core::Findings;
use crate::domain::model::{
    DateSuggestion, Recommendation, RecommendationPriority, RiskLevel,
};
use std::cmp::Reverse;

/// Turns the findings into guidance. Every rule emits at most one item; the result is
/// stable-sorted high to medium to low and is never empty.
pub fn synthesize(findings: &Findings, suggestions: &[DateSuggestion]) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let deadline = &findings.deadline_impact;
    if deadline.has_conflict {
        if deadline.is_critical() {
            recommendations.push(Recommendation::new(
                RecommendationPriority::High,
                "Delegate critical tasks",
                "Consider delegating high-priority tasks before leave or adjusting dates.",
            ));
        } else {
            recommendations.push(Recommendation::new(
                RecommendationPriority::Medium,
                "Plan task handover",
                "Ensure all pending tasks are documented and assigned to a colleague.",
            ));
        }
    }

    match findings.coverage_risk.risk_level {
        RiskLevel::High => {
            let details = match suggestions.first() {
                Some(s) => format!("Suggested window: {} to {}", s.start_date, s.end_date),
                None => "Team coverage is low. Consider staggering leave with team members."
                    .to_string(),
            };
            recommendations.push(Recommendation::new(
                RecommendationPriority::High,
                "Consider alternate dates",
                details,
            ));
        }
        RiskLevel::Medium => recommendations.push(Recommendation::new(
            RecommendationPriority::Medium,
            "Coordinate with team",
            "Notify team members early to ensure smooth coverage.",
        )),
        RiskLevel::Low => {}
    }

    if findings.role_criticality.level == RiskLevel::High {
        recommendations.push(Recommendation::new(
            RecommendationPriority::High,
            "Arrange temporary coverage",
            "Critical role requires a designated backup during absence.",
        ));
    }

    let overlap_count = findings.overlapping_leaves.len();
    if overlap_count > 2 {
        recommendations.push(Recommendation::new(
            RecommendationPriority::High,
            "Review team availability",
            format!(
                "{} team members already on/requesting leave during this period.",
                overlap_count
            ),
        ));
    } else if overlap_count > 0 {
        recommendations.push(Recommendation::new(
            RecommendationPriority::Low,
            "Note overlapping leaves",
            format!("{} colleague(s) also on leave during this period.", overlap_count),
        ));
    }

    if recommendations.is_empty() {
        recommendations.push(Recommendation::new(
            RecommendationPriority::Low,
            "Good to proceed",
            "No significant conflicts detected. Standard handover procedures apply.",
        ));
    }

    // sort_by_key is stable: ties keep rule order
    recommendations.sort_by_key(|r| Reverse(r.priority.rank()));
    recommendations
}

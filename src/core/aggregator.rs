use crate::core::Findings;
use crate::domain::model::{DeadlineSeverity, RiskLevel};

/// Role criticality never contributes more than medium on its own; it needs coverage or
/// deadlines to corroborate a high overall grade.
pub const ROLE_CRITICALITY_CAP: u8 = 1;

/// Per-signal ordinals in the order: deadlines, coverage, role criticality, overlaps.
pub fn signal_ordinals(findings: &Findings) -> [u8; 4] {
    let deadline = match (
        findings.deadline_impact.has_conflict,
        findings.deadline_impact.severity,
    ) {
        (false, _) => 0,
        (true, Some(DeadlineSeverity::Critical)) => 2,
        (true, _) => 1,
    };

    let coverage = findings.coverage_risk.risk_level.ordinal();

    let criticality = findings
        .role_criticality
        .level
        .ordinal()
        .min(ROLE_CRITICALITY_CAP);

    let overlaps = match findings.overlapping_leaves.len() {
        0 => 0,
        1..=2 => 1,
        _ => 2,
    };

    [deadline, coverage, criticality, overlaps]
}

/// 取最大值而非加權總和：任何一個嚴重訊號即決定整體風險
pub fn aggregate_risk(findings: &Findings) -> RiskLevel {
    let max = signal_ordinals(findings).into_iter().max().unwrap_or(0);
    RiskLevel::from_ordinal(max)
}

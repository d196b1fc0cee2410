pub mod aggregator;
pub mod collaboration;
pub mod coverage;
pub mod criticality;
pub mod deadline;
pub mod engine;
pub mod overlap;
pub mod recommendations;
pub mod suggester;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::{
    CoverageRisk, DeadlineImpact, LeaveOverlap, LeaveRequest, RiskAssessment, RoleCriticality,
};
pub use crate::domain::ports::{ConfigProvider, DataProvider};
pub use crate::utils::error::Result;

/// 四個分析器各自獨立的輸出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Findings {
    pub deadline_impact: DeadlineImpact,
    pub coverage_risk: CoverageRisk,
    pub role_criticality: RoleCriticality,
    pub overlapping_leaves: Vec<LeaveOverlap>,
}

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, OutputFormat};

pub use adapters::{RestDataProvider, Snapshot, SnapshotProvider};
pub use config::{SourceType, TomlConfig};
pub use crate::core::engine::LeaveAdvisor;
pub use domain::model::{
    AnalysisRules, CoverageRisk, DateSuggestion, DeadlineImpact, DeadlineSeverity, LeaveOverlap,
    LeaveRequest, Recommendation, RecommendationPriority, RiskAssessment, RiskLevel,
    RoleCriticality,
};
pub use domain::ports::{ConfigProvider, DataProvider};
pub use utils::error::{AdvisorError, Result};

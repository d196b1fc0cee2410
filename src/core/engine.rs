use crate::core::aggregator::aggregate_risk;
use crate::core::coverage::calculate_coverage;
use crate::core::criticality::assess_role_criticality;
use crate::core::deadline::check_deadlines;
use crate::core::overlap::detect_overlaps;
use crate::core::recommendations::synthesize;
use crate::core::suggester::suggest_alternate_dates;
use crate::core::Findings;
use crate::domain::model::{
    AnalysisRules, CoverageRisk, DeadlineImpact, LeaveOverlap, LeaveRequest, RiskAssessment,
    RoleCriticality,
};
use crate::domain::ports::{ConfigProvider, DataProvider};
use crate::utils::error::{AdvisorError, Result};
use crate::utils::validation::Validate;
use chrono::{Local, NaiveDate, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};

/// 請假風險評估引擎
///
/// 四個分析器以獨立的 tokio 任務並行執行，全部完成後才進行建議日期、風險彙總與建議產生。
/// 引擎本身不持有可變狀態，同一個實例可被多個呼叫端共用。
pub struct LeaveAdvisor<P: DataProvider + 'static> {
    provider: Arc<P>,
    rules: Arc<AnalysisRules>,
    today: Option<NaiveDate>,
    timeout: Option<Duration>,
}

impl<P: DataProvider + 'static> LeaveAdvisor<P> {
    pub fn new(provider: P) -> Self {
        Self::from_shared(Arc::new(provider))
    }

    pub fn from_shared(provider: Arc<P>) -> Self {
        Self {
            provider,
            rules: Arc::new(AnalysisRules::default()),
            today: None,
            timeout: None,
        }
    }

    /// Rules and caller-level timeout come from the configuration.
    pub fn from_config<C: ConfigProvider + ?Sized>(provider: P, config: &C) -> Self {
        let advisor = Self::new(provider).with_rules(config.analysis_rules());
        match config.analysis_timeout() {
            Some(timeout) => advisor.with_timeout(timeout),
            None => advisor,
        }
    }

    pub fn with_rules(mut self, rules: AnalysisRules) -> Self {
        self.rules = Arc::new(rules);
        self
    }

    /// Pins the date used to filter earlier-window suggestions.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn rules(&self) -> &AnalysisRules {
        &self.rules
    }

    /// Never fails: anything that prevents a full analysis yields the degraded assessment.
    pub async fn assess(&self, request: &LeaveRequest) -> RiskAssessment {
        match self.assess_until(request, std::future::pending::<()>()).await {
            Ok(assessment) => assessment,
            Err(e) => RiskAssessment::degraded(e.to_string()),
        }
    }

    /// Uses the configured timeout when one is set.
    pub async fn run(&self, request: &LeaveRequest) -> Result<RiskAssessment> {
        match self.timeout {
            Some(timeout) => self.assess_with_timeout(request, timeout).await,
            None => Ok(self.assess(request).await),
        }
    }

    pub async fn assess_with_timeout(
        &self,
        request: &LeaveRequest,
        timeout: Duration,
    ) -> Result<RiskAssessment> {
        self.assess_until(request, tokio::time::sleep(timeout))
            .await
            .map_err(|e| match e {
                AdvisorError::Cancelled => AdvisorError::TimedOut {
                    seconds: timeout.as_secs(),
                },
                other => other,
            })
    }

    /// Runs the analysis until `cancel` resolves. On cancellation every in-flight analyzer is
    /// aborted and `Err(Cancelled)` is returned; there is no partial result.
    pub async fn assess_until<F>(&self, request: &LeaveRequest, cancel: F) -> Result<RiskAssessment>
    where
        F: Future,
    {
        if let Err(e) = request.validate() {
            tracing::error!("❌ Rejected leave request for '{}': {}", request.employee_id, e);
            return Ok(RiskAssessment::degraded(e.to_string()));
        }

        tracing::info!(
            "🔍 Assessing leave for {} in {} ({} to {})",
            request.employee_id,
            request.organization_id,
            request.start_date,
            request.end_date
        );

        let handles = self.spawn_analyzers(request);
        // 任何離開此函式的路徑（包含呼叫端丟棄 future）都會中止尚未完成的分析器
        let _guard = handles.abort_guard();

        let findings = tokio::select! {
            joined = handles.join() => joined,
            _ = cancel => {
                tracing::warn!("⚠️ Assessment for {} cancelled", request.employee_id);
                return Err(AdvisorError::Cancelled);
            }
        };

        match findings {
            Ok(findings) => Ok(self.conclude(request, findings)),
            Err(e) => {
                tracing::error!("❌ Assessment for {} degraded: {}", request.employee_id, e);
                Ok(RiskAssessment::degraded(e.to_string()))
            }
        }
    }

    fn spawn_analyzers(&self, request: &LeaveRequest) -> AnalyzerHandles {
        let deadline = {
            let provider = Arc::clone(&self.provider);
            let request = request.clone();
            tokio::spawn(async move { check_deadlines(provider.as_ref(), &request).await })
        };

        let coverage = {
            let provider = Arc::clone(&self.provider);
            let rules = Arc::clone(&self.rules);
            let request = request.clone();
            tokio::spawn(async move { calculate_coverage(provider.as_ref(), &request, &rules).await })
        };

        let criticality = {
            let provider = Arc::clone(&self.provider);
            let rules = Arc::clone(&self.rules);
            let employee_id = request.employee_id.clone();
            let org_id = request.organization_id.clone();
            tokio::spawn(async move {
                assess_role_criticality(provider.as_ref(), &employee_id, &org_id, &rules).await
            })
        };

        let overlaps = {
            let provider = Arc::clone(&self.provider);
            let request = request.clone();
            tokio::spawn(async move { detect_overlaps(provider.as_ref(), &request).await })
        };

        AnalyzerHandles {
            deadline,
            coverage,
            criticality,
            overlaps,
        }
    }

    fn conclude(&self, request: &LeaveRequest, findings: Findings) -> RiskAssessment {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let suggested_dates = suggest_alternate_dates(request, &findings, today);
        let overall_risk_level = aggregate_risk(&findings);
        let recommendations = synthesize(&findings, &suggested_dates);

        tracing::info!(
            "✅ Leave assessment for {}: risk {}, {} recommendation(s), {} suggestion(s)",
            request.employee_id,
            overall_risk_level.label(),
            recommendations.len(),
            suggested_dates.len()
        );

        RiskAssessment {
            overall_risk_level,
            deadline_impact: findings.deadline_impact,
            coverage_risk: findings.coverage_risk,
            role_criticality: findings.role_criticality,
            overlapping_leaves: findings.overlapping_leaves,
            suggested_dates,
            recommendations,
            analyzed_at: Utc::now(),
            error: None,
        }
    }
}

struct AnalyzerHandles {
    deadline: JoinHandle<DeadlineImpact>,
    coverage: JoinHandle<CoverageRisk>,
    criticality: JoinHandle<RoleCriticality>,
    overlaps: JoinHandle<Vec<LeaveOverlap>>,
}

impl AnalyzerHandles {
    fn abort_guard(&self) -> AbortGuard {
        AbortGuard(vec![
            self.deadline.abort_handle(),
            self.coverage.abort_handle(),
            self.criticality.abort_handle(),
            self.overlaps.abort_handle(),
        ])
    }

    /// Waits for all four; a panicked task fails the join.
    async fn join(self) -> Result<Findings> {
        let (deadline, coverage, criticality, overlaps) =
            tokio::join!(self.deadline, self.coverage, self.criticality, self.overlaps);

        Ok(Findings {
            deadline_impact: deadline?,
            coverage_risk: coverage?,
            role_criticality: criticality?,
            overlapping_leaves: overlaps?,
        })
    }
}

/// Aborts the analyzer tasks when dropped. Aborting a finished task is a no-op.
struct AbortGuard(Vec<AbortHandle>);

impl Drop for AbortGuard {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

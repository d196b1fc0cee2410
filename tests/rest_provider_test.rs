use anyhow::Result;
use chrono::NaiveDate;
use httpmock::prelude::*;
use leave_advisor::{
    AdvisorError, DataProvider, DeadlineSeverity, LeaveAdvisor, LeaveRequest, RestDataProvider,
    RiskLevel,
};
use serde_json::json;
use std::time::Duration;

const PROFILE_COLUMNS: &str = "id,full_name,role,job_title,department,team_id";

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn week_off() -> LeaveRequest {
    LeaveRequest::new("e1", "acme", date("2026-03-02"), date("2026-03-06"))
}

/// 模擬一個三人專案：e1 請假期間有一個高優先任務，e2 已核准請假
fn mock_busy_project(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/project_members")
            .query_param("select", "project_id")
            .query_param("user_id", "eq.e1");
        then.status(200).json_body(json!([{ "project_id": "p1" }]));
    });

    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/project_members")
            .query_param("select", "user_id")
            .query_param("project_id", "in.(p1)");
        then.status(200).json_body(json!([
            { "user_id": "e1" },
            { "user_id": "e2" },
            { "user_id": "e3" }
        ]));
    });

    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/profiles")
            .query_param("select", PROFILE_COLUMNS)
            .query_param("id", "eq.e1");
        then.status(200).json_body(json!([{
            "id": "e1",
            "full_name": "Ada",
            "role": "employee",
            "job_title": "Engineer",
            "team_id": "t1"
        }]));
    });

    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/profiles")
            .query_param("select", PROFILE_COLUMNS)
            .query_param("id", "in.(e2,e3)");
        then.status(200).json_body(json!([
            { "id": "e2", "full_name": "Grace", "role": "developer", "team_id": "t1" },
            { "id": "e3", "full_name": "Linus", "team_id": "t1" }
        ]));
    });

    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/tasks")
            .query_param("select", "id,title,due_date,priority,status,project_id,assigned_to")
            .query_param("assigned_to", "eq.e1");
        then.status(200).json_body(json!([{
            "id": "task-1",
            "title": "Quarterly release",
            "due_date": "2026-03-04",
            "priority": "high",
            "status": "in_progress",
            "project_id": "p1",
            "assigned_to": "e1"
        }]));
    });

    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/tasks")
            .query_param("select", "id")
            .query_param("priority", "in.(high,critical,urgent)");
        then.status(200).json_body(json!([{ "id": "task-1" }]));
    });

    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/projects");
        then.status(200)
            .json_body(json!([{ "id": "p1", "name": "Apollo" }]));
    });

    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/leaves");
        then.status(200).json_body(json!([{
            "employee_id": "e2",
            "from_date": "2026-03-03",
            "to_date": "2026-03-04",
            "status": "approved"
        }]));
    });
}

#[tokio::test]
async fn test_full_assessment_over_rest() -> Result<()> {
    let server = MockServer::start();
    mock_busy_project(&server);

    let provider = RestDataProvider::new(&server.base_url(), None, None)?;
    let assessment = LeaveAdvisor::new(provider)
        .with_today(date("2026-02-01"))
        .assess(&week_off())
        .await;

    assert!(assessment.error.is_none());
    assert_eq!(
        assessment.deadline_impact.severity,
        Some(DeadlineSeverity::Critical)
    );
    assert_eq!(assessment.deadline_impact.affected_projects, vec!["Apollo"]);
    assert_eq!(assessment.coverage_risk.team_size, 3);
    assert_eq!(assessment.coverage_risk.coverage_percent, 33);
    assert_eq!(assessment.role_criticality.level, RiskLevel::High);
    assert_eq!(assessment.overlapping_leaves.len(), 1);
    assert_eq!(assessment.overlapping_leaves[0].employee_name, "Grace");
    assert_eq!(assessment.overall_risk_level, RiskLevel::High);
    assert_eq!(assessment.recommendations[0].action, "Delegate critical tasks");

    Ok(())
}

#[tokio::test]
async fn test_sends_api_key_headers() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/profiles")
            .header("apikey", "secret-key")
            .header("authorization", "Bearer secret-key")
            .query_param("id", "eq.e1")
            .query_param("org_id", "eq.acme");
        then.status(200)
            .json_body(json!([{ "id": "e1", "full_name": "Ada" }]));
    });

    let provider = RestDataProvider::new(&server.base_url(), Some("secret-key".to_string()), None)?;
    let profile = provider.profile("e1", "acme").await?.expect("profile");

    mock.assert();
    assert_eq!(profile.display_name(), "Ada");
    assert_eq!(profile.org_id, "acme");
    Ok(())
}

#[tokio::test]
async fn test_leave_query_uses_overlap_filter() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/leaves")
            .query_param("employee_id", "in.(e2,e3)")
            .query_param("status", "in.(approved,pending)")
            .query_param("from_date", "lte.2026-03-06")
            .query_param("to_date", "gte.2026-03-02");
        then.status(200).json_body(json!([]));
    });

    let provider = RestDataProvider::new(&server.base_url(), None, None)?;
    let leaves = provider
        .leaves_intersecting(
            &["e2".to_string(), "e3".to_string()],
            "acme",
            &[
                leave_advisor::domain::model::LeaveStatus::Approved,
                leave_advisor::domain::model::LeaveStatus::Pending,
            ],
            date("2026-03-02"),
            date("2026-03-06"),
        )
        .await?;

    mock.assert();
    assert!(leaves.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_server_errors_degrade_to_defaults() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(500).body("database unavailable");
    });

    let provider = RestDataProvider::new(&server.base_url(), None, None)?;
    let error = provider.profile("e1", "acme").await.unwrap_err();
    assert!(matches!(error, AdvisorError::DataSourceError { .. }));
    assert!(error.to_string().contains("500"));

    let assessment = LeaveAdvisor::new(provider).assess(&week_off()).await;
    assert!(assessment.error.is_none());
    assert_eq!(assessment.overall_risk_level, RiskLevel::Low);
    assert_eq!(assessment.coverage_risk.coverage_percent, 100);
    assert!(assessment.coverage_risk.error.is_some());
    assert!(assessment.deadline_impact.error.is_some());
    assert_eq!(assessment.recommendations[0].action, "Good to proceed");
    Ok(())
}

#[tokio::test]
async fn test_http_timeout_degrades_each_analyzer() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(200)
            .delay(Duration::from_millis(500))
            .json_body(json!([]));
    });

    let provider = RestDataProvider::new(
        &server.base_url(),
        None,
        Some(Duration::from_millis(50)),
    )?;
    let assessment = LeaveAdvisor::new(provider).assess(&week_off()).await;

    assert!(assessment.error.is_none());
    assert!(assessment.deadline_impact.error.is_some());
    assert!(assessment.role_criticality.error.is_some());
    assert_eq!(assessment.overall_risk_level, RiskLevel::Low);
    Ok(())
}

#[tokio::test]
async fn test_caller_timeout_aborts_slow_source() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(200)
            .delay(Duration::from_secs(2))
            .json_body(json!([]));
    });

    let provider = RestDataProvider::new(&server.base_url(), None, None)?;
    let result = LeaveAdvisor::new(provider)
        .assess_with_timeout(&week_off(), Duration::from_millis(100))
        .await;

    assert!(matches!(result, Err(AdvisorError::TimedOut { .. })));
    Ok(())
}

use crate::infra::{deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use survey_window::config::ReportConfig;
use survey_window::error::AppError;
use survey_window::surveys::report::views::{
    ExcludedItemView, SurveyReportSummary, UpcomingSurveyView,
};
use survey_window::surveys::{
    retain_first_by_id, SurveyItemImporter, SurveyReportBuilder, SurveyableItem,
};
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct UpcomingSurveysRequest {
    #[serde(default)]
    pub(crate) items: Vec<SurveyableItem>,
    /// CSV export in the intake format, appended after `items`.
    #[serde(default)]
    pub(crate) items_csv: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) include_excluded: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpcomingSurveysResponse {
    pub(crate) today: NaiveDate,
    pub(crate) entries: Vec<UpcomingSurveyView>,
    pub(crate) summary: SurveyReportSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) excluded: Option<Vec<ExcludedItemView>>,
}

pub(crate) fn survey_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/surveys/upcoming", post(upcoming_surveys_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn upcoming_surveys_endpoint(
    Extension(defaults): Extension<ReportConfig>,
    Json(payload): Json<UpcomingSurveysRequest>,
) -> Result<Json<UpcomingSurveysResponse>, AppError> {
    let UpcomingSurveysRequest {
        mut items,
        items_csv,
        today,
        include_excluded,
    } = payload;

    if let Some(csv) = items_csv {
        let reader = Cursor::new(csv.into_bytes());
        items.extend(SurveyItemImporter::from_reader(reader)?);
    }
    retain_first_by_id(&mut items);

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let include_excluded = include_excluded.unwrap_or(defaults.include_excluded);

    let report = SurveyReportBuilder::new().report(&items, today);
    let summary = report.summary();
    info!(
        %today,
        evaluated = summary.evaluated,
        included = summary.included,
        excluded = summary.excluded,
        "upcoming surveys report served"
    );

    Ok(Json(UpcomingSurveysResponse {
        today,
        entries: report.entry_views(),
        summary,
        excluded: include_excluded.then(|| report.excluded_views()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use survey_window::surveys::{ExclusionKind, SurveyCategory, SurveyStatus};
    use tower::ServiceExt;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn test_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        }
    }

    fn test_app(ready: bool, defaults: ReportConfig) -> Router {
        survey_routes()
            .layer(Extension(test_state(ready)))
            .layer(Extension(defaults))
    }

    fn sample_items() -> Vec<SurveyableItem> {
        vec![
            SurveyableItem::new("other-1", SurveyCategory::OtherSurvey)
                .with_next_survey_date(date(2026, 1, 20)),
            SurveyableItem::new("cert-1", SurveyCategory::ConditionCertificateExpiry)
                .with_issue_date(date(2025, 1, 1))
                .with_valid_date(date(2025, 12, 31)),
            SurveyableItem::new("audit-1", SurveyCategory::InitialSmcIspsMlc),
        ]
    }

    #[tokio::test]
    async fn upcoming_surveys_endpoint_orders_and_classifies() {
        let request = UpcomingSurveysRequest {
            items: sample_items(),
            items_csv: None,
            today: Some(date(2025, 12, 28)),
            include_excluded: None,
        };

        let Json(body) = upcoming_surveys_endpoint(Extension(ReportConfig::default()), Json(request))
            .await
            .expect("report builds");

        assert_eq!(body.today, date(2025, 12, 28));
        let ids: Vec<_> = body
            .entries
            .iter()
            .map(|entry| entry.item_id.0.as_str())
            .collect();
        assert_eq!(ids, vec!["cert-1", "other-1"]);
        assert_eq!(body.entries[0].status, SurveyStatus::Critical);
        assert_eq!(body.entries[1].status, SurveyStatus::DueSoon);
        assert_eq!(body.summary.excluded, 1);
        assert!(body.excluded.is_none());
    }

    #[tokio::test]
    async fn configured_default_returns_excluded_items() {
        let request = UpcomingSurveysRequest {
            items: sample_items(),
            items_csv: Some(
                "ID,Category,Next Survey Date,Next Survey Annotation\nann-1,annotation_driven,2026-01-10,see notes\n"
                    .to_string(),
            ),
            today: Some(date(2025, 12, 28)),
            include_excluded: None,
        };

        let defaults = ReportConfig {
            include_excluded: true,
        };
        let Json(body) = upcoming_surveys_endpoint(Extension(defaults), Json(request))
            .await
            .expect("report builds");

        let excluded = body.excluded.expect("excluded items returned");
        let reasons: Vec<_> = excluded.iter().map(|view| view.reason).collect();
        assert_eq!(
            reasons,
            vec![
                ExclusionKind::MissingRequiredDate,
                ExclusionKind::UnrecognizedAnnotation,
            ]
        );
        assert_eq!(body.summary.evaluated, 4);
    }

    #[tokio::test]
    async fn inline_items_win_over_csv_rows_with_the_same_id() {
        let request = UpcomingSurveysRequest {
            items: sample_items(),
            items_csv: Some(
                "id,category,issue_date,valid_date\ncert-1,condition_certificate_expiry,2025-01-01,2026-06-30\n"
                    .to_string(),
            ),
            today: Some(date(2025, 12, 28)),
            include_excluded: Some(true),
        };

        let Json(body) = upcoming_surveys_endpoint(Extension(ReportConfig::default()), Json(request))
            .await
            .expect("report builds");

        assert_eq!(body.summary.evaluated, 3);
        let cert = body
            .entries
            .iter()
            .find(|entry| entry.item_id.0 == "cert-1")
            .expect("certificate listed once");
        assert_eq!(cert.window_close, date(2025, 12, 31));
        assert_eq!(
            body.entries
                .iter()
                .filter(|entry| entry.item_id.0 == "cert-1")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn malformed_csv_is_a_bad_request() {
        let request = UpcomingSurveysRequest {
            items: Vec::new(),
            items_csv: Some("id,category\ns-1,special_survey,extra\n".to_string()),
            today: None,
            include_excluded: None,
        };

        let error = upcoming_surveys_endpoint(Extension(ReportConfig::default()), Json(request))
            .await
            .expect_err("ragged csv rejected");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn router_serves_json_reports() {
        let payload = json!({
            "today": "2025-10-05",
            "include_excluded": true,
            "items": [
                {
                    "id": "ann-1",
                    "category": "annotation_driven",
                    "next_survey_date": "2025-10-30",
                    "next_survey_annotation": "30/10/2025 (±3M)"
                },
                {
                    "id": "other-1",
                    "category": "other_survey",
                    "next_survey_date": "2025-11-28"
                },
                {
                    "id": "mystery",
                    "category": "drydock",
                    "valid_date": "not a date"
                }
            ]
        });

        let response = test_app(true, ReportConfig::default())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/surveys/upcoming")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");

        let entries = body["entries"].as_array().expect("entries array");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["item_id"], "ann-1");
        assert_eq!(entries[0]["status"], "in_window");
        assert_eq!(entries[0]["days_to_window_close"], 117);
        assert_eq!(entries[1]["item_id"], "other-1");
        assert_eq!(entries[1]["window_open"], "2025-08-30");
        assert_eq!(body["excluded"][0]["reason"], "unclassified");
        assert_eq!(body["summary"]["included"], 2);
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let response = test_app(false, ReportConfig::default())
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = test_app(true, ReportConfig::default())
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }
}

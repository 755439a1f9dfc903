use chrono::NaiveDate;
use survey_window::surveys::{
    ExclusionKind, SurveyCategory, SurveyReportBuilder, SurveyStatus, SurveyableItem,
    UnresolvedRule, WindowRule,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn other_survey_due_next_year_is_not_yet_actionable() {
    let item = SurveyableItem::new("hull-other", SurveyCategory::OtherSurvey)
        .with_next_survey_date(date(2025, 11, 28));
    let builder = SurveyReportBuilder::new();
    let today = date(2024, 12, 15);

    let evaluation = builder.evaluate(&item, today);
    let window = evaluation.window().expect("window computed");
    assert_eq!(window.open(), date(2025, 8, 30));
    assert_eq!(window.close(), date(2026, 2, 26));
    assert!(!evaluation.is_admitted());

    let report = builder.report(&[item], today);
    assert!(report.entries.is_empty());
    assert_eq!(report.excluded[0].reason.kind(), ExclusionKind::OutsideWindow);
}

#[test]
fn special_survey_is_overdue_the_day_after_due() {
    let item = SurveyableItem::new("special-1", SurveyCategory::SpecialSurvey)
        .with_next_survey_date(date(2025, 5, 15));
    let evaluation = SurveyReportBuilder::new().evaluate(&item, date(2025, 5, 16));

    let window = evaluation.window().expect("window computed");
    assert_eq!(window.close(), date(2025, 5, 15));
    assert_eq!(evaluation.classification.status, SurveyStatus::Overdue);
    assert!(evaluation.classification.flags.overdue);
    assert!(!evaluation.is_admitted(), "closed windows never reach the report");
}

#[test]
fn symmetric_annotation_mid_band_is_in_window() {
    let item = SurveyableItem::new("ann-1", SurveyCategory::AnnotationDriven)
        .with_next_survey_date(date(2025, 10, 30))
        .with_annotation("30/10/2025 (±3M)");
    let today = date(2025, 10, 5);

    let entries = SurveyReportBuilder::new().build(&[item], today);
    assert_eq!(entries.len(), 1);

    let entry = &entries[0];
    assert!(matches!(
        entry.rule,
        survey_window::surveys::RuleKind::AnnotationSymmetric
    ));
    assert_eq!(entry.window.open(), date(2025, 7, 30));
    assert_eq!(entry.window.close(), date(2026, 1, 30));
    assert_eq!(entry.classification.days_to_close, 117);
    assert_eq!(entry.classification.status, SurveyStatus::InWindow);
}

#[test]
fn certificate_three_days_from_expiry_is_critical() {
    let item = SurveyableItem::new("cert-1", SurveyCategory::ConditionCertificateExpiry)
        .with_issue_date(date(2025, 1, 1))
        .with_valid_date(date(2025, 12, 31));

    let entries = SurveyReportBuilder::new().build(&[item], date(2025, 12, 28));
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].classification.days_to_close, 3);
    assert_eq!(entries[0].classification.status, SurveyStatus::Critical);
    assert_eq!(entries[0].anchor, date(2025, 12, 31));
}

#[test]
fn audit_without_valid_date_is_unknown_and_left_out() {
    let broken = SurveyableItem::new("audit-1", SurveyCategory::InitialSmcIspsMlc);
    let healthy = SurveyableItem::new("audit-2", SurveyCategory::InitialSmcIspsMlc)
        .with_valid_date(date(2025, 7, 1));
    let builder = SurveyReportBuilder::new();
    let today = date(2025, 6, 1);

    let evaluation = builder.evaluate(&broken, today);
    assert_eq!(evaluation.classification.status, SurveyStatus::Unknown);
    assert!(evaluation.rule.is_null());

    let report = builder.report(&[broken, healthy], today);
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].item.id.0, "audit-2");
    assert_eq!(report.summary().included, 1);
    assert_eq!(
        report.excluded[0].reason.kind(),
        ExclusionKind::MissingRequiredDate
    );
}

#[test]
fn other_survey_in_grace_period_stays_critical() {
    let item = SurveyableItem::new("other-grace", SurveyCategory::OtherSurvey)
        .with_next_survey_date(date(2025, 3, 1));

    let entries = SurveyReportBuilder::new().build(&[item], date(2025, 4, 15));
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].classification.days_to_due, -45);
    assert_eq!(entries[0].classification.status, SurveyStatus::Critical);
    assert!(!entries[0].classification.flags.overdue);
}

#[test]
fn look_back_annotation_closes_on_due_date() {
    let item = SurveyableItem::new("ann-2", SurveyCategory::AnnotationDriven)
        .with_next_survey_date(date(2025, 5, 31))
        .with_annotation("-3M");
    let builder = SurveyReportBuilder::new();

    let evaluation = builder.evaluate(&item, date(2025, 5, 10));
    let window = evaluation.window().expect("window computed");
    assert_eq!(window.open(), date(2025, 2, 28));
    assert_eq!(window.close(), date(2025, 5, 31));
    assert_eq!(evaluation.classification.status, SurveyStatus::Critical);

    let early = builder.evaluate(&item, date(2025, 3, 15));
    assert_eq!(early.classification.status, SurveyStatus::InWindow);
}

#[test]
fn annotation_without_marker_is_excluded_with_hint() {
    let item = SurveyableItem::new("ann-3", SurveyCategory::AnnotationDriven)
        .with_next_survey_date(date(2025, 5, 31))
        .with_annotation("by end of May");

    let report = SurveyReportBuilder::new().report(&[item], date(2025, 5, 10));
    assert!(report.entries.is_empty());

    let view = report.excluded[0].to_view();
    assert_eq!(view.reason, ExclusionKind::UnrecognizedAnnotation);
    assert!(view.hint.contains("±3M"));
}

#[test]
fn certificate_issued_after_expiry_is_a_data_error() {
    let item = SurveyableItem::new("cert-bad", SurveyCategory::ConditionCertificateExpiry)
        .with_issue_date(date(2026, 1, 1))
        .with_valid_date(date(2025, 12, 31));
    let builder = SurveyReportBuilder::new();

    let evaluation = builder.evaluate(&item, date(2025, 12, 31));
    assert!(matches!(
        evaluation.rule,
        WindowRule::ConditionCertificateExpiry { .. }
    ));
    assert_eq!(
        evaluation.rule.compute_window(),
        Err(UnresolvedRule::InvertedDates {
            open: date(2026, 1, 1),
            close: date(2025, 12, 31),
        })
    );
    assert_eq!(evaluation.classification.status, SurveyStatus::Unknown);
}

#[test]
fn json_payload_degrades_bad_fields_per_item() {
    let payload = serde_json::json!([
        {
            "id": "cert-1",
            "category": "Condition Certificate Expiry",
            "issue_date": "2025-01-01",
            "valid_date": "31/12/2025"
        },
        {
            "id": "mystery",
            "category": "drydock_inspection",
            "next_survey_date": "2025-06-01"
        },
        {
            "id": "special-1",
            "category": "special_survey",
            "next_survey_date": "not a date"
        },
        {
            "id": "bare"
        }
    ]);

    let items: Vec<SurveyableItem> =
        serde_json::from_value(payload).expect("lenient payload deserializes");
    assert_eq!(items[0].valid_date, Some(date(2025, 12, 31)));
    assert_eq!(items[1].category, SurveyCategory::Unclassified);
    assert!(items[2].next_survey_date.is_none());
    assert_eq!(items[3].category, SurveyCategory::Unclassified);

    let report = SurveyReportBuilder::new().report(&items, date(2025, 12, 28));
    assert_eq!(report.entries.len(), 1);

    let kinds: Vec<_> = report
        .excluded
        .iter()
        .map(|excluded| excluded.reason.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            ExclusionKind::Unclassified,
            ExclusionKind::MissingRequiredDate,
            ExclusionKind::Unclassified,
        ]
    );
}

#[test]
fn entry_views_serialize_flat_rows() {
    let item = SurveyableItem::new("cert-1", SurveyCategory::ConditionCertificateExpiry)
        .with_issue_date(date(2025, 1, 1))
        .with_valid_date(date(2025, 12, 31));
    let report = SurveyReportBuilder::new().report(&[item], date(2025, 12, 28));

    let value = serde_json::to_value(report.entry_views()).expect("views serialize");
    let row = &value[0];
    assert_eq!(row["item_id"], "cert-1");
    assert_eq!(row["category"], "condition_certificate_expiry");
    assert_eq!(row["status"], "critical");
    assert_eq!(row["window_open"], "2025-01-01");
    assert_eq!(row["window_close"], "2025-12-31");
    assert_eq!(row["days_to_window_close"], 3);
    assert_eq!(row["window_length_days"], 364);
    assert_eq!(row["policy"], "close_countdown");
    assert_eq!(row["policy_label"], "Countdown to window close");
    assert_eq!(row["is_critical"], true);
    assert!(row.get("annotation").is_none());
}

#[test]
fn non_text_fields_degrade_only_their_item() {
    let payload = serde_json::json!([
        {
            "id": "special-1",
            "category": "special_survey",
            "next_survey_date": 20250601
        },
        {
            "id": "numbered",
            "category": 7,
            "next_survey_date": "2025-06-01"
        },
        {
            "id": "ann-1",
            "category": "annotation_driven",
            "next_survey_date": "2025-06-01",
            "next_survey_annotation": { "tolerance": "±3M" }
        },
        {
            "id": "special-2",
            "category": "special_survey",
            "next_survey_date": "2025-06-01"
        }
    ]);

    let items: Vec<SurveyableItem> =
        serde_json::from_value(payload).expect("mixed payload deserializes");
    assert_eq!(items.len(), 4);
    assert!(items[0].next_survey_date.is_none());
    assert_eq!(items[1].category, SurveyCategory::Unclassified);
    assert!(items[2].next_survey_annotation.is_none());

    let report = SurveyReportBuilder::new().report(&items, date(2025, 5, 20));
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].item.id.0, "special-2");

    let kinds: Vec<_> = report
        .excluded
        .iter()
        .map(|excluded| excluded.reason.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            ExclusionKind::MissingRequiredDate,
            ExclusionKind::Unclassified,
            ExclusionKind::UnrecognizedAnnotation,
        ]
    );
}

#[test]
fn two_digit_years_surface_as_missing_dates() {
    let payload = serde_json::json!([
        {
            "id": "other-1",
            "category": "other_survey",
            "next_survey_date": "30/10/25"
        }
    ]);

    let items: Vec<SurveyableItem> = serde_json::from_value(payload).expect("deserializes");
    assert!(items[0].next_survey_date.is_none());

    let report = SurveyReportBuilder::new().report(&items, date(2025, 10, 1));
    assert_eq!(
        report.excluded[0].reason.kind(),
        ExclusionKind::MissingRequiredDate
    );
}

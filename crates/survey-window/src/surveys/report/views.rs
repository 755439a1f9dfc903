use super::super::domain::{ItemId, SurveyCategory, SurveyStatus};
use super::super::rules::{RuleKind, StatusPolicy};
use super::summary::ExclusionKind;
use chrono::NaiveDate;
use serde::Serialize;

/// Flat, serialisable row of the upcoming-surveys report.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingSurveyView {
    pub item_id: ItemId,
    pub category: SurveyCategory,
    pub category_label: &'static str,
    pub rule: RuleKind,
    pub rule_label: &'static str,
    pub anchor_date: NaiveDate,
    pub window_open: NaiveDate,
    pub window_close: NaiveDate,
    pub window_length_days: i64,
    pub policy: Option<StatusPolicy>,
    pub policy_label: &'static str,
    pub status: SurveyStatus,
    pub status_label: &'static str,
    pub is_overdue: bool,
    pub is_critical: bool,
    pub is_due_soon: bool,
    pub days_from_open: i64,
    pub days_to_window_close: i64,
    pub days_to_due: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExcludedItemView {
    pub item_id: ItemId,
    pub category: SurveyCategory,
    pub reason: ExclusionKind,
    pub reason_label: &'static str,
    pub detail: String,
    pub hint: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCountEntry {
    pub status: SurveyStatus,
    pub status_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExclusionCountEntry {
    pub reason: ExclusionKind,
    pub reason_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SurveyReportSummary {
    pub today: NaiveDate,
    pub evaluated: usize,
    pub included: usize,
    pub excluded: usize,
    pub by_status: Vec<StatusCountEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_exclusion: Vec<ExclusionCountEntry>,
}

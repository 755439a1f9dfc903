use super::super::domain::{
    Classification, ItemId, SurveyCategory, SurveyStatus, SurveyableItem, UnresolvedRule, Window,
};
use super::super::rules::{RuleKind, StatusPolicy};
use super::views::{
    ExcludedItemView, ExclusionCountEntry, StatusCountEntry, SurveyReportSummary,
    UpcomingSurveyView,
};
use chrono::NaiveDate;
use serde::Serialize;

/// Report row for an item whose window contains the evaluation date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingSurveyEntry {
    pub item: SurveyableItem,
    pub rule: RuleKind,
    /// Nominal due or expiry date the report is ordered by.
    pub anchor: NaiveDate,
    pub window: Window,
    pub classification: Classification,
}

impl UpcomingSurveyEntry {
    pub fn to_view(&self) -> UpcomingSurveyView {
        let flags = self.classification.flags;

        UpcomingSurveyView {
            item_id: self.item.id.clone(),
            category: self.item.category,
            category_label: self.item.category.label(),
            rule: self.rule,
            rule_label: self.rule.label(),
            anchor_date: self.anchor,
            window_open: self.window.open(),
            window_close: self.window.close(),
            window_length_days: self.window.length_days(),
            policy: self.rule.policy(),
            policy_label: self.rule.policy().map(StatusPolicy::label).unwrap_or_default(),
            status: self.classification.status,
            status_label: self.classification.status.label(),
            is_overdue: flags.overdue,
            is_critical: flags.critical,
            is_due_soon: flags.due_soon,
            days_from_open: self.classification.days_from_open,
            days_to_window_close: self.classification.days_to_close,
            days_to_due: self.classification.days_to_due,
            annotation: self.item.next_survey_annotation.clone(),
        }
    }
}

/// Why an item is absent from the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExclusionReason {
    #[error(transparent)]
    Unresolved(UnresolvedRule),
    #[error("{today} falls outside window {window}")]
    OutsideWindow { window: Window, today: NaiveDate },
}

impl ExclusionReason {
    pub const fn kind(&self) -> ExclusionKind {
        match self {
            Self::Unresolved(UnresolvedRule::Unclassified) => ExclusionKind::Unclassified,
            Self::Unresolved(UnresolvedRule::MissingRequiredDate { .. }) => {
                ExclusionKind::MissingRequiredDate
            }
            Self::Unresolved(UnresolvedRule::UnrecognizedAnnotation) => {
                ExclusionKind::UnrecognizedAnnotation
            }
            Self::Unresolved(UnresolvedRule::InvertedDates { .. }) => ExclusionKind::InvertedDates,
            Self::Unresolved(UnresolvedRule::DateOutOfRange) => ExclusionKind::DateOutOfRange,
            Self::OutsideWindow { .. } => ExclusionKind::OutsideWindow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionKind {
    Unclassified,
    MissingRequiredDate,
    UnrecognizedAnnotation,
    InvertedDates,
    DateOutOfRange,
    OutsideWindow,
}

impl ExclusionKind {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Unclassified,
            Self::MissingRequiredDate,
            Self::UnrecognizedAnnotation,
            Self::InvertedDates,
            Self::DateOutOfRange,
            Self::OutsideWindow,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Unclassified => "Unclassified",
            Self::MissingRequiredDate => "Missing required date",
            Self::UnrecognizedAnnotation => "Unrecognised annotation",
            Self::InvertedDates => "Issue date after expiry",
            Self::DateOutOfRange => "Date out of range",
            Self::OutsideWindow => "Outside survey window",
        }
    }

    /// Operator guidance for tracking down a missing item.
    pub const fn hint(self) -> &'static str {
        match self {
            Self::Unclassified => "Assign the record a survey category.",
            Self::MissingRequiredDate => {
                "Fill in the dates the record's category requires (issue, valid, or next survey)."
            }
            Self::UnrecognizedAnnotation => {
                "End the next survey annotation with a ±3M or -3M tolerance tag."
            }
            Self::InvertedDates => "Check that the issue date precedes the valid-until date.",
            Self::DateOutOfRange => "Check the record's dates for typos in the year.",
            Self::OutsideWindow => {
                "Nothing to fix: the item appears once its window opens and leaves after it closes."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedItem {
    pub item_id: ItemId,
    pub category: SurveyCategory,
    pub reason: ExclusionReason,
}

impl ExcludedItem {
    pub fn to_view(&self) -> ExcludedItemView {
        let kind = self.reason.kind();

        ExcludedItemView {
            item_id: self.item_id.clone(),
            category: self.category,
            reason: kind,
            reason_label: kind.label(),
            detail: self.reason.to_string(),
            hint: kind.hint(),
        }
    }
}

/// Upcoming-surveys report together with the items it left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyReport {
    pub today: NaiveDate,
    /// Ordered by anchor date, then by the caller's tie-break key.
    pub entries: Vec<UpcomingSurveyEntry>,
    /// In input order.
    pub excluded: Vec<ExcludedItem>,
}

impl SurveyReport {
    pub fn evaluated(&self) -> usize {
        self.entries.len() + self.excluded.len()
    }

    pub fn with_status(&self, status: SurveyStatus) -> impl Iterator<Item = &UpcomingSurveyEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.classification.status == status)
    }

    pub fn summary(&self) -> SurveyReportSummary {
        let by_status = SurveyStatus::ordered()
            .into_iter()
            .filter(|status| *status != SurveyStatus::Unknown)
            .map(|status| StatusCountEntry {
                status,
                status_label: status.label(),
                count: self.with_status(status).count(),
            })
            .collect();

        let by_exclusion = ExclusionKind::ordered()
            .into_iter()
            .filter_map(|kind| {
                let count = self
                    .excluded
                    .iter()
                    .filter(|excluded| excluded.reason.kind() == kind)
                    .count();
                (count > 0).then(|| ExclusionCountEntry {
                    reason: kind,
                    reason_label: kind.label(),
                    count,
                })
            })
            .collect();

        SurveyReportSummary {
            today: self.today,
            evaluated: self.evaluated(),
            included: self.entries.len(),
            excluded: self.excluded.len(),
            by_status,
            by_exclusion,
        }
    }

    pub fn entry_views(&self) -> Vec<UpcomingSurveyView> {
        self.entries
            .iter()
            .map(UpcomingSurveyEntry::to_view)
            .collect()
    }

    pub fn excluded_views(&self) -> Vec<ExcludedItemView> {
        self.excluded.iter().map(ExcludedItem::to_view).collect()
    }
}

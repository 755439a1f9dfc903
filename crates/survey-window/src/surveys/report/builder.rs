use super::super::domain::{Classification, SurveyStatus, SurveyableItem, UnresolvedRule, Window};
use super::super::filter::WindowFilter;
use super::super::rules::{RuleResolver, WindowRule};
use super::summary::{ExcludedItem, ExclusionReason, SurveyReport, UpcomingSurveyEntry};
use chrono::NaiveDate;
use tracing::debug;

/// Outcome of running one item through resolver, rule, classifier, and filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub rule: WindowRule,
    pub classification: Classification,
    pub placement: Placement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Admitted { window: Window, anchor: NaiveDate },
    Excluded(ExclusionReason),
}

impl Evaluation {
    fn unresolved(rule: WindowRule, reason: UnresolvedRule) -> Self {
        Self {
            rule,
            classification: Classification::unknown(),
            placement: Placement::Excluded(ExclusionReason::Unresolved(reason)),
        }
    }

    pub fn window(&self) -> Option<Window> {
        match self.placement {
            Placement::Admitted { window, .. }
            | Placement::Excluded(ExclusionReason::OutsideWindow { window, .. }) => Some(window),
            Placement::Excluded(ExclusionReason::Unresolved(_)) => None,
        }
    }

    pub fn is_admitted(&self) -> bool {
        matches!(self.placement, Placement::Admitted { .. })
    }
}

/// Builds the upcoming-surveys report for a batch of items.
///
/// Every item is evaluated independently against the caller's `today`; an item
/// with bad data is left out and recorded, never allowed to fail the batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurveyReportBuilder {
    resolver: RuleResolver,
    filter: WindowFilter,
}

impl SurveyReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&self, item: &SurveyableItem, today: NaiveDate) -> Evaluation {
        let rule = self.resolver.resolve(item);
        let window = match rule.compute_window() {
            Ok(window) => window,
            Err(reason) => return Evaluation::unresolved(rule, reason),
        };

        let classification = rule.classify(&window, today);
        let placement = match rule.anchor() {
            Some(anchor)
                if classification.status != SurveyStatus::Unknown
                    && self.filter.admits(&window, today) =>
            {
                Placement::Admitted { window, anchor }
            }
            _ => Placement::Excluded(ExclusionReason::OutsideWindow { window, today }),
        };

        Evaluation {
            rule,
            classification,
            placement,
        }
    }

    /// Actionable items, ordered by anchor date and then by item id.
    pub fn build(&self, items: &[SurveyableItem], today: NaiveDate) -> Vec<UpcomingSurveyEntry> {
        self.report(items, today).entries
    }

    /// Actionable items, ordered by anchor date and then by `tie_break`.
    pub fn build_by<K, F>(
        &self,
        items: &[SurveyableItem],
        today: NaiveDate,
        tie_break: F,
    ) -> Vec<UpcomingSurveyEntry>
    where
        K: Ord,
        F: Fn(&SurveyableItem) -> K,
    {
        self.report_by(items, today, tie_break).entries
    }

    pub fn report(&self, items: &[SurveyableItem], today: NaiveDate) -> SurveyReport {
        self.report_by(items, today, |item| item.id.clone())
    }

    pub fn report_by<K, F>(
        &self,
        items: &[SurveyableItem],
        today: NaiveDate,
        tie_break: F,
    ) -> SurveyReport
    where
        K: Ord,
        F: Fn(&SurveyableItem) -> K,
    {
        let mut entries = Vec::new();
        let mut excluded = Vec::new();

        for item in items {
            let evaluation = self.evaluate(item, today);
            match evaluation.placement {
                Placement::Admitted { window, anchor } => entries.push(UpcomingSurveyEntry {
                    item: item.clone(),
                    rule: evaluation.rule.kind(),
                    anchor,
                    window,
                    classification: evaluation.classification,
                }),
                Placement::Excluded(reason) => {
                    debug!(
                        item_id = %item.id,
                        category = %item.category,
                        %reason,
                        "item left out of upcoming surveys"
                    );
                    excluded.push(ExcludedItem {
                        item_id: item.id.clone(),
                        category: item.category,
                        reason,
                    });
                }
            }
        }

        // Stable: equal keys keep input order.
        entries.sort_by_cached_key(|entry| (entry.anchor, tie_break(&entry.item)));

        debug!(
            %today,
            evaluated = items.len(),
            included = entries.len(),
            excluded = excluded.len(),
            "upcoming survey report built"
        );

        SurveyReport {
            today,
            entries,
            excluded,
        }
    }
}

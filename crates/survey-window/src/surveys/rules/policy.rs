use super::super::calendar::days_between;
use super::super::domain::{Classification, SurveyStatus, UrgencyFlags, Window};
use chrono::NaiveDate;
use serde::Serialize;

pub(crate) const CRITICAL_DAYS: i64 = 7;
pub(crate) const DUE_SOON_DAYS: i64 = 30;
pub(crate) const TOLERANCE_CRITICAL_DAYS: i64 = 30;

/// Grace-period semantics attached to a window rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Urgency counts down to the window close, which is also the due date.
    CloseCountdown,
    /// Urgency counts down to the nominal due date; the window stays open
    /// through a grace period after it.
    GraceAfterDue,
    /// Urgency is driven by the distance to the far edge of a tolerance band.
    ToleranceBand,
}

impl StatusPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CloseCountdown => "Countdown to window close",
            Self::GraceAfterDue => "Grace period after due date",
            Self::ToleranceBand => "Tolerance band",
        }
    }

    // Inside a tolerance band the due-soon predicate spans the whole
    // non-critical interior, so it carries no signal beyond "in window".
    const fn reports_due_soon(self) -> bool {
        !matches!(self, Self::ToleranceBand)
    }

    fn flags(self, window: &Window, due: NaiveDate, today: NaiveDate) -> UrgencyFlags {
        let to_close = days_between(today, window.close());
        let to_due = days_between(today, due);
        let overdue = today > window.close();

        match self {
            Self::CloseCountdown => UrgencyFlags {
                overdue,
                critical: to_close <= CRITICAL_DAYS,
                due_soon: (0..=DUE_SOON_DAYS).contains(&to_close),
            },
            // Every day of the grace period is critical, not only the first week.
            Self::GraceAfterDue => UrgencyFlags {
                overdue,
                critical: to_due <= CRITICAL_DAYS,
                due_soon: (0..=DUE_SOON_DAYS).contains(&to_due),
            },
            Self::ToleranceBand => UrgencyFlags {
                overdue,
                critical: (0..=TOLERANCE_CRITICAL_DAYS).contains(&to_close),
                due_soon: today > window.open() && to_close > TOLERANCE_CRITICAL_DAYS,
            },
        }
    }
}

/// Single ordered decision: overdue, then critical, then due soon, else in window.
pub(crate) fn decide_status(
    policy: StatusPolicy,
    window: &Window,
    due: NaiveDate,
    today: NaiveDate,
) -> Classification {
    let flags = policy.flags(window, due, today);

    let status = if flags.overdue {
        SurveyStatus::Overdue
    } else if flags.critical {
        SurveyStatus::Critical
    } else if flags.due_soon && policy.reports_due_soon() {
        SurveyStatus::DueSoon
    } else {
        SurveyStatus::InWindow
    };

    Classification {
        status,
        days_from_open: days_between(window.open(), today),
        days_to_close: days_between(today, window.close()),
        days_to_due: days_between(today, due),
        flags,
    }
}

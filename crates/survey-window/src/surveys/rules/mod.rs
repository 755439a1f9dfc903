mod policy;
mod resolver;

pub use policy::StatusPolicy;
pub use resolver::RuleResolver;

use super::calendar::{shift_days, shift_months};
use super::domain::{Classification, UnresolvedRule, Window};
use chrono::NaiveDate;
use policy::decide_status;
use serde::Serialize;

/// Look-back applied by the category rules, in days.
pub const FIXED_LOOK_BACK_DAYS: i64 = 90;
/// Grace period an "other" survey keeps after its due date, in days.
pub const OTHER_SURVEY_GRACE_DAYS: i64 = 90;
/// Tolerance applied by annotation-driven rules, in calendar months.
pub const TOLERANCE_MONTHS: i32 = 3;

/// Window strategy resolved for a single item, carrying the dates it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRule {
    ConditionCertificateExpiry {
        issued: NaiveDate,
        valid_until: NaiveDate,
    },
    InitialSmcIspsMlc {
        valid_until: NaiveDate,
    },
    SpecialSurvey {
        due: NaiveDate,
    },
    OtherSurvey {
        due: NaiveDate,
    },
    AnnotationSymmetric {
        due: NaiveDate,
    },
    AnnotationLookBack {
        due: NaiveDate,
    },
    /// Always classifies as unknown and is never admitted to a report.
    Null(UnresolvedRule),
}

/// Discriminant of [`WindowRule`] without its dates, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    ConditionCertificateExpiry,
    InitialSmcIspsMlc,
    SpecialSurvey,
    OtherSurvey,
    AnnotationSymmetric,
    AnnotationLookBack,
    Null,
}

impl RuleKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ConditionCertificateExpiry => "Certificate validity",
            Self::InitialSmcIspsMlc => "90 days before expiry",
            Self::SpecialSurvey => "90 days before due, no grace",
            Self::OtherSurvey => "90 days either side of due",
            Self::AnnotationSymmetric => "3 months either side of due",
            Self::AnnotationLookBack => "3 months before due",
            Self::Null => "Not windowed",
        }
    }

    pub const fn policy(self) -> Option<StatusPolicy> {
        match self {
            Self::ConditionCertificateExpiry | Self::InitialSmcIspsMlc | Self::SpecialSurvey => {
                Some(StatusPolicy::CloseCountdown)
            }
            Self::OtherSurvey => Some(StatusPolicy::GraceAfterDue),
            Self::AnnotationSymmetric | Self::AnnotationLookBack => Some(StatusPolicy::ToleranceBand),
            Self::Null => None,
        }
    }
}

impl WindowRule {
    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::ConditionCertificateExpiry { .. } => RuleKind::ConditionCertificateExpiry,
            Self::InitialSmcIspsMlc { .. } => RuleKind::InitialSmcIspsMlc,
            Self::SpecialSurvey { .. } => RuleKind::SpecialSurvey,
            Self::OtherSurvey { .. } => RuleKind::OtherSurvey,
            Self::AnnotationSymmetric { .. } => RuleKind::AnnotationSymmetric,
            Self::AnnotationLookBack { .. } => RuleKind::AnnotationLookBack,
            Self::Null(_) => RuleKind::Null,
        }
    }

    /// Nominal due or expiry date; report ordering keys off this.
    pub const fn anchor(&self) -> Option<NaiveDate> {
        match *self {
            Self::ConditionCertificateExpiry { valid_until, .. }
            | Self::InitialSmcIspsMlc { valid_until } => Some(valid_until),
            Self::SpecialSurvey { due }
            | Self::OtherSurvey { due }
            | Self::AnnotationSymmetric { due }
            | Self::AnnotationLookBack { due } => Some(due),
            Self::Null(_) => None,
        }
    }

    pub const fn policy(&self) -> Option<StatusPolicy> {
        self.kind().policy()
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null(_))
    }

    /// Compute the actionable window.
    ///
    /// Category rules offset by a fixed number of days; annotation rules offset
    /// by calendar months. Near month ends the two disagree by up to three days.
    pub fn compute_window(&self) -> Result<Window, UnresolvedRule> {
        match *self {
            Self::ConditionCertificateExpiry {
                issued,
                valid_until,
            } => Window::new(issued, valid_until),
            Self::InitialSmcIspsMlc { valid_until } => {
                Window::new(days_before(valid_until)?, valid_until)
            }
            Self::SpecialSurvey { due } => Window::new(days_before(due)?, due),
            Self::OtherSurvey { due } => {
                let close =
                    shift_days(due, OTHER_SURVEY_GRACE_DAYS).ok_or(UnresolvedRule::DateOutOfRange)?;
                Window::new(days_before(due)?, close)
            }
            Self::AnnotationSymmetric { due } => {
                let close =
                    shift_months(due, TOLERANCE_MONTHS).ok_or(UnresolvedRule::DateOutOfRange)?;
                Window::new(months_before(due)?, close)
            }
            Self::AnnotationLookBack { due } => Window::new(months_before(due)?, due),
            Self::Null(reason) => Err(reason),
        }
    }

    /// Classify `today` against a window produced by this rule.
    pub fn classify(&self, window: &Window, today: NaiveDate) -> Classification {
        match (self.policy(), self.anchor()) {
            (Some(policy), Some(due)) => decide_status(policy, window, due, today),
            _ => Classification::unknown(),
        }
    }
}

fn days_before(date: NaiveDate) -> Result<NaiveDate, UnresolvedRule> {
    shift_days(date, -FIXED_LOOK_BACK_DAYS).ok_or(UnresolvedRule::DateOutOfRange)
}

fn months_before(date: NaiveDate) -> Result<NaiveDate, UnresolvedRule> {
    shift_months(date, -TOLERANCE_MONTHS).ok_or(UnresolvedRule::DateOutOfRange)
}

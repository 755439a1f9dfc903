//! Survey window and status classification engine.
//!
//! Data flows one way: item → [`RuleResolver`] → [`WindowRule`] → window and
//! [`Classification`] → [`WindowFilter`] → sorted [`SurveyReport`]. Nothing here
//! reads the clock, touches I/O, or mutates its input.

pub mod annotation;
mod calendar;
pub mod domain;
mod filter;
pub mod import;
pub mod report;
pub mod rules;

pub use annotation::{parse_annotation, SurveyAnnotation, ToleranceTag};
pub use calendar::parse_date;
pub use domain::{
    Classification, DateField, ItemId, SurveyCategory, SurveyStatus, SurveyableItem,
    UnresolvedRule, UrgencyFlags, Window,
};
pub use filter::WindowFilter;
pub use import::{retain_first_by_id, ItemImportError, SurveyItemImporter};
pub use report::{
    ExcludedItem, ExclusionKind, ExclusionReason, SurveyReport, SurveyReportBuilder,
    UpcomingSurveyEntry,
};
pub use rules::{RuleKind, RuleResolver, StatusPolicy, WindowRule};

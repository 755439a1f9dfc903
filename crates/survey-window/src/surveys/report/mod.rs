mod builder;
mod summary;
pub mod views;

pub use builder::{Evaluation, Placement, SurveyReportBuilder};
pub use summary::{
    ExcludedItem, ExclusionKind, ExclusionReason, SurveyReport, UpcomingSurveyEntry,
};

use super::super::annotation::{parse_annotation, ToleranceTag};
use super::super::domain::{DateField, SurveyCategory, SurveyableItem, UnresolvedRule};
use super::WindowRule;
use chrono::NaiveDate;

/// Maps an item onto the window rule for its category.
///
/// Resolution never fails: missing data yields [`WindowRule::Null`] carrying
/// the reason, so callers can report why an item was left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleResolver;

impl RuleResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, item: &SurveyableItem) -> WindowRule {
        resolve_item(item).unwrap_or_else(WindowRule::Null)
    }
}

fn resolve_item(item: &SurveyableItem) -> Result<WindowRule, UnresolvedRule> {
    match item.category {
        SurveyCategory::ConditionCertificateExpiry => Ok(WindowRule::ConditionCertificateExpiry {
            issued: required(item.issue_date, DateField::IssueDate)?,
            valid_until: required(item.valid_date, DateField::ValidDate)?,
        }),
        SurveyCategory::InitialSmcIspsMlc => Ok(WindowRule::InitialSmcIspsMlc {
            valid_until: required(item.valid_date, DateField::ValidDate)?,
        }),
        SurveyCategory::SpecialSurvey => Ok(WindowRule::SpecialSurvey {
            due: required(item.next_survey_date, DateField::NextSurveyDate)?,
        }),
        SurveyCategory::OtherSurvey => Ok(WindowRule::OtherSurvey {
            due: required(item.next_survey_date, DateField::NextSurveyDate)?,
        }),
        SurveyCategory::AnnotationDriven => {
            let annotation = item
                .next_survey_annotation
                .as_deref()
                .and_then(parse_annotation)
                .ok_or(UnresolvedRule::UnrecognizedAnnotation)?;

            // The structured column wins over a date written into the annotation.
            let due = required(
                item.next_survey_date.or(annotation.date),
                DateField::NextSurveyDate,
            )?;

            Ok(match annotation.tolerance {
                ToleranceTag::Symmetric => WindowRule::AnnotationSymmetric { due },
                ToleranceTag::LookBackOnly => WindowRule::AnnotationLookBack { due },
            })
        }
        SurveyCategory::Unclassified => Err(UnresolvedRule::Unclassified),
    }
}

fn required(date: Option<NaiveDate>, field: DateField) -> Result<NaiveDate, UnresolvedRule> {
    date.ok_or(UnresolvedRule::MissingRequiredDate { field })
}

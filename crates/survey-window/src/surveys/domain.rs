use super::calendar;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Opaque identifier of a regulatory item, as issued by the record store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Regulatory family of an item; selects the window rule applied to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SurveyCategory {
    ConditionCertificateExpiry,
    InitialSmcIspsMlc,
    SpecialSurvey,
    OtherSurvey,
    AnnotationDriven,
    #[default]
    Unclassified,
}

impl SurveyCategory {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::ConditionCertificateExpiry,
            Self::InitialSmcIspsMlc,
            Self::SpecialSurvey,
            Self::OtherSurvey,
            Self::AnnotationDriven,
            Self::Unclassified,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConditionCertificateExpiry => "condition_certificate_expiry",
            Self::InitialSmcIspsMlc => "initial_smc_isps_mlc",
            Self::SpecialSurvey => "special_survey",
            Self::OtherSurvey => "other_survey",
            Self::AnnotationDriven => "annotation_driven",
            Self::Unclassified => "unclassified",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ConditionCertificateExpiry => "Condition / Certificate Expiry",
            Self::InitialSmcIspsMlc => "Initial SMC / ISPS / MLC",
            Self::SpecialSurvey => "Special Survey",
            Self::OtherSurvey => "Other Survey",
            Self::AnnotationDriven => "Annotation Driven",
            Self::Unclassified => "Unclassified",
        }
    }

    /// Lenient parse used for wire payloads and CSV cells.
    ///
    /// Case, spacing, and punctuation are ignored. Anything unrecognised maps to
    /// [`SurveyCategory::Unclassified`] so a bad category never fails a batch.
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .map(|ch| ch.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "conditioncertificateexpiry" | "certificateexpiry" | "condition" => {
                Self::ConditionCertificateExpiry
            }
            "initialsmcispsmlc" | "smcispsmlc" | "initialaudit" => Self::InitialSmcIspsMlc,
            "specialsurvey" | "special" => Self::SpecialSurvey,
            "othersurvey" => Self::OtherSurvey,
            "annotationdriven" | "annotation" => Self::AnnotationDriven,
            _ => Self::Unclassified,
        }
    }
}

impl fmt::Display for SurveyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SurveyCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SurveyCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient_text(deserializer, "category")?;
        Ok(raw.as_deref().map(Self::parse).unwrap_or_default())
    }
}

/// Date columns a window rule may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    IssueDate,
    ValidDate,
    NextSurveyDate,
}

impl DateField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IssueDate => "issue_date",
            Self::ValidDate => "valid_date",
            Self::NextSurveyDate => "next_survey_date",
        }
    }
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A certificate or survey record as handed over by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyableItem {
    pub id: ItemId,
    #[serde(default)]
    pub category: SurveyCategory,
    #[serde(default, deserialize_with = "lenient_date")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub valid_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub next_survey_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_annotation")]
    pub next_survey_annotation: Option<String>,
}

impl SurveyableItem {
    pub fn new(id: impl Into<String>, category: SurveyCategory) -> Self {
        Self {
            id: ItemId(id.into()),
            category,
            issue_date: None,
            valid_date: None,
            next_survey_date: None,
            next_survey_annotation: None,
        }
    }

    pub fn with_issue_date(mut self, date: NaiveDate) -> Self {
        self.issue_date = Some(date);
        self
    }

    pub fn with_valid_date(mut self, date: NaiveDate) -> Self {
        self.valid_date = Some(date);
        self
    }

    pub fn with_next_survey_date(mut self, date: NaiveDate) -> Self {
        self.next_survey_date = Some(date);
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.next_survey_annotation = Some(annotation.into());
        self
    }
}

// Any non-text value in a scalar item field; captured so one corrupt field
// degrades its item instead of rejecting the whole payload.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientText {
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_text<'de, D>(deserializer: D, field: &'static str) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<LenientText>::deserialize(deserializer)? {
        Some(LenientText::Text(value)) => Some(value),
        Some(LenientText::Other(_)) => {
            tracing::warn!(field, "ignoring non-text item field");
            None
        }
        None => None,
    })
}

fn lenient_annotation<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_text(deserializer, "next_survey_annotation")
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = lenient_text(deserializer, "date")?;
    Ok(raw.as_deref().and_then(|value| {
        let parsed = calendar::parse_date(value);
        if parsed.is_none() && !value.trim().is_empty() {
            tracing::warn!(value, "ignoring unparseable item date");
        }
        parsed
    }))
}

/// Closed date range during which an item is actionable.
///
/// `open <= close` holds for every constructed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Window {
    open: NaiveDate,
    close: NaiveDate,
}

impl Window {
    pub fn new(open: NaiveDate, close: NaiveDate) -> Result<Self, UnresolvedRule> {
        if open > close {
            return Err(UnresolvedRule::InvertedDates { open, close });
        }

        Ok(Self { open, close })
    }

    pub fn open(&self) -> NaiveDate {
        self.open
    }

    pub fn close(&self) -> NaiveDate {
        self.close
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.open <= date && date <= self.close
    }

    pub fn length_days(&self) -> i64 {
        calendar::days_between(self.open, self.close)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.open, self.close)
    }
}

/// Reasons an item cannot be windowed. None of these abort a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnresolvedRule {
    #[error("item has no recognised survey category")]
    Unclassified,
    #[error("item is missing its required {field}")]
    MissingRequiredDate { field: DateField },
    #[error("next survey annotation carries no recognised tolerance marker")]
    UnrecognizedAnnotation,
    #[error("window would open on {open} after it closes on {close}")]
    InvertedDates { open: NaiveDate, close: NaiveDate },
    #[error("window falls outside the supported calendar range")]
    DateOutOfRange,
}

/// Urgency bucket assigned to an item for one evaluation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyStatus {
    Overdue,
    Critical,
    DueSoon,
    InWindow,
    Unknown,
}

impl SurveyStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Overdue,
            Self::Critical,
            Self::DueSoon,
            Self::InWindow,
            Self::Unknown,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Overdue => "Overdue",
            Self::Critical => "Critical",
            Self::DueSoon => "Due Soon",
            Self::InWindow => "In Window",
            Self::Unknown => "Unknown",
        }
    }
}

/// Independent urgency booleans as exposed by the legacy reporting payload.
///
/// They may overlap (an overdue special survey is also critical). Consumers
/// that need a single answer read [`Classification::status`] instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct UrgencyFlags {
    pub overdue: bool,
    pub critical: bool,
    pub due_soon: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Classification {
    pub status: SurveyStatus,
    /// `today - open`, in whole days.
    pub days_from_open: i64,
    /// `close - today`, in whole days; negative once the window has closed.
    pub days_to_close: i64,
    /// `anchor - today`, where the anchor is the nominal due or expiry date.
    pub days_to_due: i64,
    pub flags: UrgencyFlags,
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            status: SurveyStatus::Unknown,
            days_from_open: 0,
            days_to_close: 0,
            days_to_due: 0,
            flags: UrgencyFlags::default(),
        }
    }
}

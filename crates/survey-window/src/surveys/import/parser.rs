use super::normalizer::{clean_text, normalize_header};
use crate::surveys::calendar::parse_date;
use crate::surveys::domain::{DateField, ItemId, SurveyCategory, SurveyableItem};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use tracing::warn;

#[derive(Debug)]
pub(crate) struct ItemRecord {
    pub(crate) line: u64,
    pub(crate) item: SurveyableItem,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<ItemRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: csv::StringRecord = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let row: ItemRow = record.deserialize(Some(&headers))?;

        match row.into_item(line) {
            Some(item) => records.push(ItemRecord { line, item }),
            None => warn!(line, "skipping survey item row without an id"),
        }
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct ItemRow {
    #[serde(alias = "item_id", default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    issue_date: Option<String>,
    #[serde(
        alias = "valid_until",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    valid_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    next_survey_date: Option<String>,
    #[serde(
        alias = "annotation",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    next_survey_annotation: Option<String>,
}

impl ItemRow {
    fn into_item(self, line: u64) -> Option<SurveyableItem> {
        let id = ItemId(clean_text(&self.id?));
        let date = |raw: Option<&str>, field: DateField| -> Option<NaiveDate> {
            let raw = raw?;
            let parsed = parse_date(raw);
            if parsed.is_none() {
                warn!(line, item_id = %id, %field, value = raw, "unparseable date left blank");
            }
            parsed
        };

        let issue_date = date(self.issue_date.as_deref(), DateField::IssueDate);
        let valid_date = date(self.valid_date.as_deref(), DateField::ValidDate);
        let next_survey_date = date(self.next_survey_date.as_deref(), DateField::NextSurveyDate);

        Some(SurveyableItem {
            id,
            category: self
                .category
                .as_deref()
                .map(SurveyCategory::parse)
                .unwrap_or_default(),
            issue_date,
            valid_date,
            next_survey_date,
            next_survey_annotation: self.next_survey_annotation.as_deref().map(clean_text),
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

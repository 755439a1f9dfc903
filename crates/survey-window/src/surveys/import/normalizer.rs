pub(crate) fn clean_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `Next Survey Date` and `next-survey-date` both become `next_survey_date`.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = clean_text(value).to_ascii_lowercase();
    let snake: String = cleaned
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();
    snake
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

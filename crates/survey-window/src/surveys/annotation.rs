//! Tolerance tags embedded in next-survey annotations.
//!
//! Annotations read like `30/10/2025 (±3M)` or `2025-10-30 -3M`: an optional
//! date token followed by a trailing tolerance marker.

use super::calendar;
use chrono::NaiveDate;

const SYMMETRIC_MARKERS: [&str; 3] = ["±3M", "+/-3M", "+-3M"];
const LOOK_BACK_MARKERS: [&str; 1] = ["-3M"];

const TRAILING_NOISE: [char; 4] = [')', ']', '.', ';'];
const MARKER_PREFIX_NOISE: [char; 6] = ['(', '[', ',', ';', ':', '/'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToleranceTag {
    /// Survey may be held up to three months either side of the due date.
    Symmetric,
    /// Survey may be held up to three months early, never late.
    LookBackOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurveyAnnotation {
    pub tolerance: ToleranceTag,
    pub date: Option<NaiveDate>,
}

/// Extract the tolerance tag and date token from an annotation.
///
/// Returns `None` when the text does not end in a recognised marker.
pub fn parse_annotation(raw: &str) -> Option<SurveyAnnotation> {
    let body = raw
        .trim()
        .trim_end_matches(|ch: char| ch.is_whitespace() || TRAILING_NOISE.contains(&ch));

    let (tolerance, rest) = SYMMETRIC_MARKERS
        .iter()
        .find_map(|marker| strip_marker(body, marker).map(|rest| (ToleranceTag::Symmetric, rest)))
        .or_else(|| {
            LOOK_BACK_MARKERS.iter().find_map(|marker| {
                strip_marker(body, marker).map(|rest| (ToleranceTag::LookBackOnly, rest))
            })
        })?;

    let token = rest
        .trim_end_matches(|ch: char| ch.is_whitespace() || MARKER_PREFIX_NOISE.contains(&ch));

    Some(SurveyAnnotation {
        tolerance,
        date: date_token(token),
    })
}

// Matches `marker` at the end of `body`, ignoring whitespace and ASCII case.
fn strip_marker<'a>(body: &'a str, marker: &str) -> Option<&'a str> {
    let mut expected = marker.chars().rev().filter(|ch| !ch.is_whitespace()).peekable();

    for (idx, ch) in body.char_indices().rev() {
        if ch.is_whitespace() {
            continue;
        }

        let want = expected.next()?;
        if !want.eq_ignore_ascii_case(&ch) {
            return None;
        }

        if expected.peek().is_none() {
            return Some(&body[..idx]);
        }
    }

    None
}

// Longest trailing run of words that parses as a date wins, so free text such
// as "Due by 30 Oct 2025" still yields the date.
fn date_token(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut starts = std::iter::once(0).chain(
        text.char_indices()
            .filter(|(_, ch)| ch.is_whitespace())
            .map(|(idx, ch)| idx + ch.len_utf8()),
    );

    starts.find_map(|start| calendar::parse_date(&text[start..]))
}

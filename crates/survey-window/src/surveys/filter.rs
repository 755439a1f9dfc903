use super::domain::Window;
use chrono::NaiveDate;

/// Inclusion gate for the upcoming-surveys report.
///
/// Only items whose window contains the evaluation date are actionable. An item
/// due many months out stays hidden until its window opens, and disappears
/// again once the window closes, however overdue it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowFilter;

impl WindowFilter {
    pub fn new() -> Self {
        Self
    }

    pub fn admits(&self, window: &Window, today: NaiveDate) -> bool {
        window.contains(today)
    }
}

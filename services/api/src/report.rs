use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use survey_window::config::AppConfig;
use survey_window::error::AppError;
use survey_window::surveys::{SurveyItemImporter, SurveyReport, SurveyReportBuilder};
use survey_window::telemetry;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct SurveyReportArgs {
    /// CSV export of surveyable items
    #[arg(long)]
    pub(crate) items: PathBuf,
    /// Evaluation date for the report (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// List the items left out of the report and why
    #[arg(long)]
    pub(crate) show_excluded: bool,
}

pub(crate) fn run_survey_report(args: SurveyReportArgs) -> Result<(), AppError> {
    let SurveyReportArgs {
        items,
        today,
        show_excluded,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let records = SurveyItemImporter::from_path(&items)?;
    info!(path = %items.display(), items = records.len(), "survey items imported");

    let report = SurveyReportBuilder::new().report(&records, today);
    let show_excluded = show_excluded || config.report.include_excluded;
    println!("{}", render_survey_report(&report, show_excluded));

    Ok(())
}

pub(crate) fn render_survey_report(report: &SurveyReport, show_excluded: bool) -> String {
    let summary = report.summary();
    let mut lines = vec![
        format!("Upcoming surveys as of {}", summary.today),
        format!(
            "Evaluated {} | included {} | excluded {}",
            summary.evaluated, summary.included, summary.excluded
        ),
        format!(
            "Status: {}",
            summary
                .by_status
                .iter()
                .map(|entry| format!("{} {}", entry.status_label, entry.count))
                .collect::<Vec<_>>()
                .join(" | ")
        ),
    ];

    let views = report.entry_views();
    if views.is_empty() {
        lines.push("\nUpcoming: none".to_string());
    } else {
        lines.push("\nUpcoming".to_string());
        for view in &views {
            lines.push(format!(
                "- {} {} [{}] window {}..{} ({} days, {}) | {} | {} days to close",
                view.anchor_date,
                view.item_id,
                view.category_label,
                view.window_open,
                view.window_close,
                view.window_length_days,
                view.policy_label,
                view.status_label,
                view.days_to_window_close
            ));
            if let Some(annotation) = &view.annotation {
                lines.push(format!("  annotation: {annotation}"));
            }
        }
    }

    if show_excluded {
        let excluded = report.excluded_views();
        if excluded.is_empty() {
            lines.push("\nExcluded: none".to_string());
        } else {
            lines.push("\nExcluded".to_string());
            for view in &excluded {
                lines.push(format!(
                    "- {} ({}): {}: {}",
                    view.item_id, view.category, view.reason_label, view.detail
                ));
                lines.push(format!("  hint: {}", view.hint));
            }
        }
    } else if !summary.by_exclusion.is_empty() {
        lines.push(format!(
            "\n{} item(s) left out; rerun with --show-excluded for reasons",
            summary.excluded
        ));
    }

    lines.join("\n")
}

//! The summary region: headline counters and the recognition share doughnut.

use maud::{Markup, html};

use crate::endpoints;

use super::{
    charts::{RenderedChart, chart_container},
    transforms::SummaryText,
};

/// The HTML ID of the summary region.
pub(super) const SUMMARY_REGION_ID: &str = "attendance-summary";

/// Renders the summary cards, or placeholders if the summary has never loaded.
pub(super) fn summary_region_view(
    summary: Option<&SummaryText>,
    share_chart: Option<&RenderedChart>,
    share_chart_id: &str,
) -> Markup {
    let placeholder = "--";

    html! {
        section
            id=(SUMMARY_REGION_ID)
            class="w-full space-y-4"
            hx-get=(endpoints::DASHBOARD_SUMMARY)
            hx-trigger="dashboard-refreshed from:body"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
        {
            div class="grid grid-cols-2 lg:grid-cols-4 gap-4"
            {
                (summary_card(
                    "Unique Students",
                    "unique-students",
                    summary.map_or(placeholder, |summary| summary.unique_students.as_str()),
                ))
                (summary_card(
                    "Successful Recognitions",
                    "successful-recognitions",
                    summary.map_or(placeholder, |summary| summary.successful_recognitions.as_str()),
                ))
                (summary_card(
                    "Failed Recognitions",
                    "failed-recognitions",
                    summary.map_or(placeholder, |summary| summary.failed_recognitions.as_str()),
                ))
                (summary_card(
                    "Success Rate",
                    "success-rate",
                    summary.map_or(placeholder, |summary| summary.success_rate.as_str()),
                ))
            }

            div class="rounded bg-white dark:bg-gray-800 p-4"
            {
                h2 class="text-xl font-semibold mb-2" { "Recognition Share" }
                (chart_container(share_chart_id, share_chart, "Overview data is not available."))
            }
        }
    }
}

fn summary_card(title: &str, id: &str, value: &str) -> Markup {
    html! {
        div class="rounded bg-white dark:bg-gray-800 p-4 shadow-sm"
        {
            h3 class="text-sm text-gray-500 dark:text-gray-400" { (title) }
            p id=(id) class="text-3xl font-bold" { (value) }
        }
    }
}

//! The attendance table: filtering, sorting and paging over the last fetched rows.
//!
//! Nothing in here fetches. The controller replaces the [AttendanceTable]
//! wholesale when new records arrive and every query runs against that snapshot.

use std::cmp::Ordering;

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    attendance::RecognitionStatus,
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
    },
};

use super::transforms::TableRow;

/// The HTML ID of the whole table region, swapped when the rows are re-fetched.
pub(super) const TABLE_REGION_ID: &str = "attendance-table";
/// The HTML ID of the rows and pager, swapped when the query changes.
const TABLE_RESULTS_ID: &str = "attendance-table-results";
const FILTER_FORM_ID: &str = "attendance-filters";

/// The columns the table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    /// The student's ID.
    StudentId,
    /// The student's name, ignoring case.
    StudentName,
    /// When the attempt happened.
    Timestamp,
    /// Failed before successful.
    Status,
}

/// The direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl SortColumn {
    fn as_str(self) -> &'static str {
        match self {
            SortColumn::StudentId => "student_id",
            SortColumn::StudentName => "student_name",
            SortColumn::Timestamp => "timestamp",
            SortColumn::Status => "status",
        }
    }
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    fn reverse(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// The filters, sort and page requested for the attendance table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableQuery {
    /// Only show rows whose student name contains this text, ignoring case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<String>,
    /// Only show rows from this calendar day, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Defaults to the timestamp column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortColumn>,
    /// Defaults to descending for the default sort and ascending otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    /// 1-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
}

impl TableQuery {
    fn student_filter(&self) -> Option<String> {
        self.student
            .as_deref()
            .map(str::trim)
            .filter(|student| !student.is_empty())
            .map(str::to_lowercase)
    }

    fn date_filter(&self) -> Option<&str> {
        self.date
            .as_deref()
            .map(str::trim)
            .filter(|date| !date.is_empty())
    }

    fn sort(&self) -> (SortColumn, SortOrder) {
        match (self.sort, self.order) {
            (None, order) => (SortColumn::Timestamp, order.unwrap_or(SortOrder::Desc)),
            (Some(column), order) => (column, order.unwrap_or(SortOrder::Asc)),
        }
    }

    fn with_page(&self, page: usize) -> Self {
        Self {
            page: Some(page),
            ..self.clone()
        }
    }

    /// The query for clicking on the header of `column`: flips the order if
    /// the table is already sorted by `column`, and goes back to the first page.
    fn with_sort(&self, column: SortColumn) -> Self {
        let (current_column, current_order) = self.sort();
        let order = if current_column == column {
            current_order.reverse()
        } else {
            SortOrder::Asc
        };

        Self {
            sort: Some(column),
            order: Some(order),
            page: None,
            ..self.clone()
        }
    }

    fn to_url(&self) -> String {
        match serde_urlencoded::to_string(self) {
            Ok(query) if query.is_empty() => endpoints::DASHBOARD_TABLE.to_owned(),
            Ok(query) => format!("{}?{query}", endpoints::DASHBOARD_TABLE),
            Err(error) => {
                tracing::error!("could not encode table query {self:?}: {error}");
                endpoints::DASHBOARD_TABLE.to_owned()
            }
        }
    }
}

/// The attendance rows from the most recent fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct AttendanceTable {
    rows: Vec<TableRow>,
}

/// One page of rows that match a [TableQuery].
#[derive(Debug, PartialEq)]
pub(super) struct TablePage<'a> {
    pub rows: Vec<&'a TableRow>,
    /// 1-based, clamped to the available pages.
    pub page: usize,
    pub page_count: usize,
    /// The number of rows across all pages that matched the filters.
    pub match_count: usize,
}

impl AttendanceTable {
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }

    /// Filter, sort and page the rows.
    pub fn query(&self, query: &TableQuery, page_size: usize) -> TablePage<'_> {
        let student_filter = query.student_filter();
        let date_filter = query.date_filter();

        let mut rows: Vec<&TableRow> = self
            .rows
            .iter()
            .filter(|row| matches_student(row, student_filter.as_deref()))
            .filter(|row| matches_date(row, date_filter))
            .collect();

        let (column, order) = query.sort();
        rows.sort_by(|a, b| {
            let ordering = compare_rows(a, b, column);
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let page_size = page_size.max(1);
        let match_count = rows.len();
        let page_count = match_count.div_ceil(page_size).max(1);
        let page = query.page.unwrap_or(1).clamp(1, page_count);

        TablePage {
            rows: rows
                .into_iter()
                .skip((page - 1) * page_size)
                .take(page_size)
                .collect(),
            page,
            page_count,
            match_count,
        }
    }
}

fn matches_student(row: &TableRow, filter: Option<&str>) -> bool {
    match filter {
        Some(filter) => row.student_name.to_lowercase().contains(filter),
        None => true,
    }
}

fn matches_date(row: &TableRow, filter: Option<&str>) -> bool {
    match filter {
        Some(filter) => row.date.as_deref() == Some(filter),
        None => true,
    }
}

fn compare_rows(a: &TableRow, b: &TableRow, column: SortColumn) -> Ordering {
    match column {
        SortColumn::StudentId => a.student_id.cmp(&b.student_id),
        SortColumn::StudentName => a
            .student_name
            .to_lowercase()
            .cmp(&b.student_name.to_lowercase()),
        SortColumn::Timestamp => a.timestamp.cmp(&b.timestamp),
        SortColumn::Status => a.status.cmp(&b.status),
    }
}

/// Renders the whole table region: the filter form and the first page of results.
///
/// `table` is `None` until the rows have been fetched once.
pub(super) fn table_region_view(
    table: Option<&AttendanceTable>,
    query: &TableQuery,
    page_size: usize,
) -> Markup {
    html! {
        section
            id=(TABLE_REGION_ID)
            class="w-full rounded bg-white dark:bg-gray-800 p-4 space-y-4"
            hx-get=(endpoints::DASHBOARD_TABLE_RELOAD)
            hx-trigger="dashboard-refreshed from:body"
            hx-include={ "#" (FILTER_FORM_ID) }
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
        {
            h2 class="text-xl font-semibold" { "Attendance Records" }

            (filter_form(query))

            @match table {
                Some(table) => (table_results_view(&table.query(query, page_size), query)),
                None => div id=(TABLE_RESULTS_ID) {
                    p class="text-gray-500" { "Attendance data is not available." }
                },
            }
        }
    }
}

fn filter_form(query: &TableQuery) -> Markup {
    let target = format!("#{TABLE_RESULTS_ID}");

    html! {
        form
            id=(FILTER_FORM_ID)
            class="flex flex-wrap gap-4 items-end"
            hx-get=(endpoints::DASHBOARD_TABLE)
            hx-target=(target)
            hx-swap="outerHTML"
            hx-trigger="input changed delay:300ms, search, submit"
        {
            div
            {
                label for="student-search" class=(FORM_LABEL_STYLE) { "Search student" }
                input
                    id="student-search"
                    type="search"
                    name="student"
                    placeholder="Student name"
                    value=[query.student.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date-filter" class=(FORM_LABEL_STYLE) { "Date" }
                input
                    id="date-filter"
                    type="date"
                    name="date"
                    value=[query.date.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button
                type="reset"
                class=(BUTTON_SECONDARY_STYLE)
                hx-get=(endpoints::DASHBOARD_TABLE)
                hx-target=(target)
                hx-swap="outerHTML"
            {
                "Reset"
            }
        }
    }
}

/// Renders one page of rows with sortable headers and a pager.
pub(super) fn table_results_view(page: &TablePage, query: &TableQuery) -> Markup {
    let target = format!("#{TABLE_RESULTS_ID}");

    html! {
        div id=(TABLE_RESULTS_ID)
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        (sort_header("Student ID", SortColumn::StudentId, query, &target))
                        (sort_header("Student Name", SortColumn::StudentName, query, &target))
                        (sort_header("Timestamp", SortColumn::Timestamp, query, &target))
                        (sort_header("Status", SortColumn::Status, query, &target))
                    }
                }

                tbody
                {
                    @for row in &page.rows {
                        tr class=(TABLE_ROW_STYLE) data-attendance-row="true"
                        {
                            td class=(TABLE_CELL_STYLE) { (row.student_id) }
                            td class=(TABLE_CELL_STYLE) { (row.student_name) }
                            td class=(TABLE_CELL_STYLE) { (row.display_timestamp) }
                            td class=(TABLE_CELL_STYLE) { (status_badge(row.status)) }
                        }
                    }

                    @if page.rows.is_empty() {
                        tr
                        {
                            td colspan="4" data-empty-state="true" class="px-6 py-4 text-center"
                            {
                                "No matching records found"
                            }
                        }
                    }
                }
            }

            (pager(page, query, &target))

            // Owned by the filter form so that searching, or reloading the
            // region, keeps the sort picked from the headers.
            @if let Some(sort) = query.sort {
                input type="hidden" name="sort" value=(sort.as_str()) form=(FILTER_FORM_ID);
            }
            @if let Some(order) = query.order {
                input type="hidden" name="order" value=(order.as_str()) form=(FILTER_FORM_ID);
            }
        }
    }
}

fn sort_header(label: &str, column: SortColumn, query: &TableQuery, target: &str) -> Markup {
    let (current_column, current_order) = query.sort();
    let indicator = match (current_column == column, current_order) {
        (false, _) => "",
        (true, SortOrder::Asc) => " ▲",
        (true, SortOrder::Desc) => " ▼",
    };

    html! {
        th scope="col" class=(TABLE_CELL_STYLE)
        {
            a
                href="#"
                hx-get=(query.with_sort(column).to_url())
                hx-target=(target)
                hx-swap="outerHTML"
                class="hover:underline"
            {
                (label) (indicator)
            }
        }
    }
}

fn status_badge(status: RecognitionStatus) -> Markup {
    match status {
        RecognitionStatus::Success => html! {
            span class="status-badge status-success" { "Success" }
        },
        RecognitionStatus::Failed => html! {
            span class="status-badge status-failure" { "Failed" }
        },
    }
}

fn pager(page: &TablePage, query: &TableQuery, target: &str) -> Markup {
    let link_style = "px-3 py-1 rounded text-blue-600 hover:underline";
    let disabled_style = "px-3 py-1 rounded text-gray-400 dark:text-gray-500";

    html! {
        nav class="pagination flex justify-between items-center mt-2 text-sm"
        {
            @if page.page > 1 {
                a
                    href="#"
                    role="button"
                    hx-get=(query.with_page(page.page - 1).to_url())
                    hx-target=(target)
                    hx-swap="outerHTML"
                    class=(link_style)
                { "Prev" }
            } @else {
                span class=(disabled_style) { "Prev" }
            }

            span aria-current="page"
            {
                "Page " (page.page) " of " (page.page_count)
                " (" (page.match_count) " records)"
            }

            @if page.page < page.page_count {
                a
                    href="#"
                    role="button"
                    hx-get=(query.with_page(page.page + 1).to_url())
                    hx-target=(target)
                    hx-swap="outerHTML"
                    class=(link_style)
                { "Next" }
            } @else {
                span class=(disabled_style) { "Next" }
            }
        }
    }
}

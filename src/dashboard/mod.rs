//! Dashboard module
//!
//! Renders the attendance dashboard: summary counters, a daily attendance
//! chart, a per-student success rate chart and a searchable attendance table.
//! Every region is loaded from the attendance API by the [DashboardController]
//! and can be reloaded on its own.

mod cards;
mod charts;
mod controller;
mod handlers;
mod palette;
mod table;
mod transforms;

pub use charts::{
    ChartKind, ChartOptions, ChartRegistry, ChartTheme, Dataset, LegendPosition, RenderedChart,
    SeriesColor, TooltipStyle, create_bar_chart, create_line_chart, create_pie_chart,
};
pub use controller::{DashboardConfig, DashboardController, RefreshState, Region, RegionError};
pub use handlers::dashboard_routes;
pub use table::{SortColumn, SortOrder, TableQuery};

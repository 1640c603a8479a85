//! Chart construction and rendering for the dashboard.
//!
//! This module turns already-shaped chart data (category labels plus one or
//! more parallel datasets) into ECharts option documents and binds them to
//! named containers:
//! - **Bar charts**: categorical comparisons, one series per dataset
//! - **Line charts**: trends, one series per dataset
//! - **Pie and doughnut charts**: part-of-whole, one value and colour per segment
//!
//! Every chart gets the shared [ChartTheme], with the caller's [ChartOptions]
//! merged on top. A container holds at most one chart: creating a chart on a
//! container that already has one replaces it.

use std::collections::HashMap;

use charming::{
    Chart,
    component::{Axis, Legend},
    datatype::DataPointItem,
    element::{AxisType, ItemStyle, LineStyle, Orient, Tooltip, Trigger},
    series::{Bar, Line, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::Error;

/// The kinds of chart the factory can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Vertical bars, one series per dataset.
    Bar,
    /// Lines with point markers, one series per dataset.
    Line,
    /// A filled pie.
    Pie,
    /// A pie with a hole in the middle.
    Doughnut,
}

/// A colour for a whole series, or one colour per data point.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesColor {
    /// The same colour for every point.
    Uniform(&'static str),
    /// One colour per point, index-aligned with the data.
    PerPoint(Vec<&'static str>),
}

impl SeriesColor {
    fn at(&self, index: usize) -> Option<&'static str> {
        match self {
            SeriesColor::Uniform(color) => Some(color),
            SeriesColor::PerPoint(colors) => colors.get(index).copied(),
        }
    }

    fn uniform(&self) -> Option<&'static str> {
        match self {
            SeriesColor::Uniform(color) => Some(color),
            SeriesColor::PerPoint(_) => None,
        }
    }
}

/// One series of values, index-aligned with the chart's labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// The series name shown in the legend and tooltip.
    pub label: String,
    /// One value per label.
    pub data: Vec<f64>,
    /// The bar or marker fill.
    pub fill: SeriesColor,
    /// The bar outline, or the line colour for line charts.
    pub border: SeriesColor,
    /// In pixels.
    pub border_width: u32,
}

/// Where the legend sits relative to the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum LegendPosition {
    Top,
    Bottom,
    Left,
    Right,
}

/// How tooltips look.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipStyle {
    /// Any CSS colour.
    pub background_color: &'static str,
}

/// The look shared by every chart on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartTheme {
    /// Where the legend goes unless a chart says otherwise.
    pub legend_position: LegendPosition,
    /// How tooltips look unless a chart says otherwise.
    pub tooltip: TooltipStyle,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            legend_position: LegendPosition::Top,
            tooltip: TooltipStyle {
                background_color: "rgba(0, 0, 0, 0.7)",
            },
        }
    }
}

/// Per-chart overrides, merged over the [ChartTheme].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartOptions {
    /// Overrides [ChartTheme::legend_position].
    pub legend_position: Option<LegendPosition>,
    /// Overrides [ChartTheme::tooltip].
    pub tooltip: Option<TooltipStyle>,
    /// The category axis name.
    pub x_axis_title: Option<String>,
    /// The value axis name.
    pub y_axis_title: Option<String>,
    /// Start the value axis at zero instead of fitting it to the data.
    pub begin_at_zero: bool,
    /// A fixed upper bound for the value axis.
    pub y_max: Option<f64>,
}

impl ChartTheme {
    fn merge(&self, options: ChartOptions) -> ResolvedOptions {
        ResolvedOptions {
            legend_position: options.legend_position.unwrap_or(self.legend_position),
            tooltip: options.tooltip.unwrap_or_else(|| self.tooltip.clone()),
            x_axis_title: options.x_axis_title,
            y_axis_title: options.y_axis_title,
            begin_at_zero: options.begin_at_zero,
            y_max: options.y_max,
        }
    }
}

struct ResolvedOptions {
    legend_position: LegendPosition,
    tooltip: TooltipStyle,
    x_axis_title: Option<String>,
    y_axis_title: Option<String>,
    begin_at_zero: bool,
    y_max: Option<f64>,
}

/// A chart bound to a container.
#[derive(Debug)]
pub struct RenderedChart {
    /// What was built.
    pub kind: ChartKind,
    chart: Chart,
}

impl RenderedChart {
    /// The ECharts option document for this chart.
    pub fn options_json(&self) -> String {
        self.chart.to_string()
    }
}

/// The chart containers on a page and the chart currently bound to each.
#[derive(Debug)]
pub struct ChartRegistry {
    containers: Vec<&'static str>,
    charts: HashMap<&'static str, RenderedChart>,
    theme: ChartTheme,
}

impl ChartRegistry {
    /// Create a registry that accepts charts for exactly `container_ids`.
    pub fn new(container_ids: &[&'static str]) -> Self {
        Self {
            containers: container_ids.to_vec(),
            charts: HashMap::new(),
            theme: ChartTheme::default(),
        }
    }

    /// The chart bound to `container_id`, if one has been created.
    pub fn get(&self, container_id: &str) -> Option<&RenderedChart> {
        self.charts.get(container_id)
    }

    /// The number of containers that currently have a chart.
    pub fn live_chart_count(&self) -> usize {
        self.charts.len()
    }

    fn container(&self, container_id: &str) -> Result<&'static str, Error> {
        self.containers
            .iter()
            .find(|id| **id == container_id)
            .copied()
            .ok_or_else(|| {
                tracing::error!("Chart container with ID '{container_id}' not found.");
                Error::ContainerNotFound(container_id.to_owned())
            })
    }

    fn bind(&mut self, container_id: &'static str, kind: ChartKind, chart: Chart) -> &RenderedChart {
        if let Some(previous) = self.charts.remove(container_id) {
            tracing::debug!(
                "Destroying {:?} chart in '{container_id}' before creating a {kind:?} chart",
                previous.kind
            );
        }

        self.charts
            .entry(container_id)
            .or_insert(RenderedChart { kind, chart })
    }
}

/// Create or replace a bar chart in `container_id`.
///
/// # Errors
/// Returns [Error::ContainerNotFound] if the registry does not declare
/// `container_id`. Nothing is rendered in that case.
pub fn create_bar_chart<'a>(
    registry: &'a mut ChartRegistry,
    container_id: &str,
    labels: Vec<String>,
    datasets: Vec<Dataset>,
    options: ChartOptions,
) -> Result<&'a RenderedChart, Error> {
    let container_id = registry.container(container_id)?;
    let options = registry.theme.merge(options);

    let mut chart = cartesian_chart(labels, &options);

    for dataset in datasets {
        let mut bar = Bar::new()
            .name(dataset.label.as_str())
            .data(styled_points(&dataset));

        if let Some(style) = series_style(&dataset) {
            bar = bar.item_style(style);
        }

        chart = chart.series(bar);
    }

    Ok(registry.bind(container_id, ChartKind::Bar, chart))
}

/// Create or replace a line chart in `container_id`.
///
/// # Errors
/// Returns [Error::ContainerNotFound] if the registry does not declare
/// `container_id`. Nothing is rendered in that case.
pub fn create_line_chart<'a>(
    registry: &'a mut ChartRegistry,
    container_id: &str,
    labels: Vec<String>,
    datasets: Vec<Dataset>,
    options: ChartOptions,
) -> Result<&'a RenderedChart, Error> {
    let container_id = registry.container(container_id)?;
    let options = registry.theme.merge(options);

    let mut chart = cartesian_chart(labels, &options);

    for dataset in datasets {
        let mut line = Line::new()
            .name(dataset.label.as_str())
            .data(styled_points(&dataset));

        if let Some(border) = dataset.border.uniform() {
            line = line.line_style(
                LineStyle::new()
                    .color(border)
                    .width(dataset.border_width as f64),
            );
        }

        if let Some(style) = series_style(&dataset) {
            line = line.item_style(style);
        }

        chart = chart.series(line);
    }

    Ok(registry.bind(container_id, ChartKind::Line, chart))
}

/// Create or replace a pie chart, or a doughnut chart if `is_doughnut`, in `container_id`.
///
/// Unlike bar and line charts, a pie chart takes a single list of values and
/// one explicit colour per segment.
///
/// # Errors
/// Returns [Error::ContainerNotFound] if the registry does not declare
/// `container_id`. Nothing is rendered in that case.
pub fn create_pie_chart<'a>(
    registry: &'a mut ChartRegistry,
    container_id: &str,
    labels: Vec<String>,
    data: Vec<f64>,
    background_colors: Vec<&'static str>,
    is_doughnut: bool,
    options: ChartOptions,
) -> Result<&'a RenderedChart, Error> {
    let container_id = registry.container(container_id)?;
    let options = registry.theme.merge(options);

    let segments: Vec<DataPointItem> = labels
        .iter()
        .zip(data)
        .enumerate()
        .map(|(index, (label, value))| {
            let mut style = ItemStyle::new().border_width(1);

            if let Some(color) = background_colors.get(index) {
                style = style.color(*color);
            }

            DataPointItem::new(value).name(label.as_str()).item_style(style)
        })
        .collect();

    let pie = Pie::new().data(segments);
    let (pie, kind) = if is_doughnut {
        (pie.radius(vec!["40%", "70%"]), ChartKind::Doughnut)
    } else {
        (pie.radius("70%"), ChartKind::Pie)
    };

    let chart = Chart::new()
        .legend(legend(options.legend_position))
        .tooltip(tooltip(&options.tooltip, Trigger::Item))
        .series(pie);

    Ok(registry.bind(container_id, kind, chart))
}

fn cartesian_chart(labels: Vec<String>, options: &ResolvedOptions) -> Chart {
    let mut x_axis = Axis::new().type_(AxisType::Category).data(labels);
    if let Some(title) = &options.x_axis_title {
        x_axis = x_axis.name(title.as_str());
    }

    let mut y_axis = Axis::new().type_(AxisType::Value);
    if let Some(title) = &options.y_axis_title {
        y_axis = y_axis.name(title.as_str());
    }
    if options.begin_at_zero {
        y_axis = y_axis.min(0.0);
    }
    if let Some(max) = options.y_max {
        y_axis = y_axis.max(max);
    }

    Chart::new()
        .legend(legend(options.legend_position))
        .tooltip(tooltip(&options.tooltip, Trigger::Axis))
        .x_axis(x_axis)
        .y_axis(y_axis)
}

fn legend(position: LegendPosition) -> Legend {
    match position {
        LegendPosition::Top => Legend::new().top("top"),
        LegendPosition::Bottom => Legend::new().top("bottom"),
        LegendPosition::Left => Legend::new().left("left").orient(Orient::Vertical),
        LegendPosition::Right => Legend::new().left("right").orient(Orient::Vertical),
    }
}

fn tooltip(style: &TooltipStyle, trigger: Trigger) -> Tooltip {
    Tooltip::new()
        .trigger(trigger)
        .background_color(style.background_color)
}

/// The series-wide style, used by the legend and for points without their own colour.
fn series_style(dataset: &Dataset) -> Option<ItemStyle> {
    match (dataset.fill.uniform(), dataset.border.uniform()) {
        (None, None) => None,
        (fill, border) => {
            let mut style = ItemStyle::new().border_width(dataset.border_width);
            if let Some(fill) = fill {
                style = style.color(fill);
            }
            if let Some(border) = border {
                style = style.border_color(border);
            }
            Some(style)
        }
    }
}

fn styled_points(dataset: &Dataset) -> Vec<DataPointItem> {
    dataset
        .data
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let mut style = ItemStyle::new().border_width(dataset.border_width);
            if let Some(fill) = dataset.fill.at(index) {
                style = style.color(fill);
            }
            if let Some(border) = dataset.border.at(index) {
                style = style.border_color(border);
            }

            DataPointItem::new(*value).item_style(style)
        })
        .collect()
}

/// Renders the container for a chart, with the script that draws it.
///
/// If no chart has been bound to the container yet, the container is
/// rendered empty with `empty_message`.
pub(super) fn chart_container(
    container_id: &str,
    chart: Option<&RenderedChart>,
    empty_message: &str,
) -> Markup {
    html! {
        div
            id=(container_id)
            class="min-h-[380px] rounded bg-white dark:bg-gray-100"
        {
            @if chart.is_none() {
                p class="p-4 text-gray-500" { (empty_message) }
            }
        }

        @if let Some(chart) = chart {
            script { (chart_script(container_id, chart)) }
        }
    }
}

/// Renders a dashboard region holding one chart.
///
/// The region re-fetches itself from `endpoint` when the dashboard is
/// refreshed. On failure the response goes to the alert container and the
/// region keeps showing the previous chart.
pub(super) fn chart_region_view(
    title: &str,
    endpoint: &str,
    container_id: &str,
    chart: Option<&RenderedChart>,
    empty_message: &str,
) -> Markup {
    html! {
        section
            id={ (container_id) "-region" }
            class="w-full rounded bg-white dark:bg-gray-800 p-4"
            hx-get=(endpoint)
            hx-trigger="dashboard-refreshed from:body"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
        {
            h2 class="text-xl font-semibold mb-2" { (title) }
            (chart_container(container_id, chart, empty_message))
        }
    }
}

/// Generates the JavaScript that draws `chart` into `container_id`.
///
/// Any ECharts instance already bound to the element is disposed first so
/// that a re-rendered fragment replaces the old chart instead of stacking on it.
fn chart_script(container_id: &str, chart: &RenderedChart) -> PreEscaped<String> {
    // Labels are user data, keep them from closing the script element.
    let options = chart.options_json().replace("</", "<\\/");

    PreEscaped(format!(
        r#"(function() {{
            const init = () => {{
                const chartDom = document.getElementById("{container_id}");
                if (!chartDom) {{
                    console.error("Chart container with ID '{container_id}' not found.");
                    return;
                }}

                const existing = echarts.getInstanceByDom(chartDom);
                if (existing) {{
                    existing.dispose();
                }}
                if (chartDom.resizeHandler) {{
                    window.removeEventListener('resize', chartDom.resizeHandler);
                }}

                const chart = echarts.init(chartDom);
                chart.setOption({options});

                chartDom.resizeHandler = () => chart.resize();
                window.addEventListener('resize', chartDom.resizeHandler);
            }};

            if (document.readyState === 'loading') {{
                document.addEventListener('DOMContentLoaded', init);
            }} else {{
                init();
            }}
        }})();"#
    ))
}

#[cfg(test)]
mod chart_tests {
    use scraper::{Html, Selector};
    use serde_json::Value;

    use crate::Error;

    use super::{
        ChartKind, ChartOptions, ChartRegistry, Dataset, LegendPosition, SeriesColor,
        chart_container, create_bar_chart, create_line_chart, create_pie_chart,
    };

    const CONTAINER: &str = "test-chart";

    fn dataset(label: &str, data: Vec<f64>) -> Dataset {
        Dataset {
            label: label.to_owned(),
            data,
            fill: SeriesColor::Uniform("rgba(46, 204, 113, 0.2)"),
            border: SeriesColor::Uniform("#2ecc71"),
            border_width: 2,
        }
    }

    fn labels(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|label| label.to_string()).collect()
    }

    fn parse_options(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    /// ECharts accepts a component as an object or a list of objects.
    fn component<'a>(options: &'a Value, key: &str) -> &'a Value {
        match &options[key] {
            Value::Array(items) => &items[0],
            value => value,
        }
    }

    #[test]
    fn creating_twice_leaves_one_live_chart() {
        let mut registry = ChartRegistry::new(&[CONTAINER]);

        create_bar_chart(
            &mut registry,
            CONTAINER,
            labels(&["a"]),
            vec![dataset("first", vec![1.0])],
            ChartOptions::default(),
        )
        .unwrap();
        create_line_chart(
            &mut registry,
            CONTAINER,
            labels(&["b"]),
            vec![dataset("second", vec![2.0])],
            ChartOptions::default(),
        )
        .unwrap();

        assert_eq!(registry.live_chart_count(), 1);
        let chart = registry.get(CONTAINER).unwrap();
        assert_eq!(chart.kind, ChartKind::Line);
        let options = chart.options_json();
        assert!(options.contains("second"), "got {options}");
        assert!(!options.contains("first"), "got {options}");
    }

    #[test]
    fn unknown_container_renders_nothing() {
        let mut registry = ChartRegistry::new(&[CONTAINER]);

        let result = create_bar_chart(
            &mut registry,
            "missing-chart",
            labels(&["a"]),
            vec![dataset("first", vec![1.0])],
            ChartOptions::default(),
        );

        assert_eq!(
            result.err(),
            Some(Error::ContainerNotFound("missing-chart".to_owned()))
        );
        assert_eq!(registry.live_chart_count(), 0);
    }

    #[test]
    fn bar_chart_applies_theme_and_overrides() {
        let mut registry = ChartRegistry::new(&[CONTAINER]);

        let chart = create_bar_chart(
            &mut registry,
            CONTAINER,
            labels(&["2024-01-01", "2024-01-02"]),
            vec![dataset("Success", vec![3.0, 4.0])],
            ChartOptions {
                x_axis_title: Some("Date".to_owned()),
                y_axis_title: Some("Count".to_owned()),
                begin_at_zero: true,
                y_max: Some(100.0),
                ..Default::default()
            },
        )
        .unwrap();

        let options = parse_options(&chart.options_json());
        assert_eq!(component(&options, "legend")["top"], "top");
        assert_eq!(
            component(&options, "tooltip")["backgroundColor"],
            "rgba(0, 0, 0, 0.7)"
        );
        let x_axis = component(&options, "xAxis");
        assert_eq!(x_axis["name"], "Date");
        assert_eq!(x_axis["data"][1], "2024-01-02");
        let y_axis = component(&options, "yAxis");
        assert_eq!(y_axis["name"], "Count");
        assert_eq!(y_axis["min"].as_f64(), Some(0.0));
        assert_eq!(y_axis["max"].as_f64(), Some(100.0));
        assert_eq!(options["series"][0]["type"], "bar");
        assert_eq!(options["series"][0]["name"], "Success");
    }

    #[test]
    fn legend_position_can_be_overridden() {
        let mut registry = ChartRegistry::new(&[CONTAINER]);

        let chart = create_bar_chart(
            &mut registry,
            CONTAINER,
            labels(&["a"]),
            vec![dataset("first", vec![1.0])],
            ChartOptions {
                legend_position: Some(LegendPosition::Bottom),
                ..Default::default()
            },
        )
        .unwrap();

        let options = parse_options(&chart.options_json());
        assert_eq!(component(&options, "legend")["top"], "bottom");
    }

    #[test]
    fn per_point_colours_are_applied_to_each_bar() {
        let mut registry = ChartRegistry::new(&[CONTAINER]);

        let chart = create_bar_chart(
            &mut registry,
            CONTAINER,
            labels(&["An", "Binh"]),
            vec![Dataset {
                label: "Success rate (%)".to_owned(),
                data: vec![90.0, 10.0],
                fill: SeriesColor::PerPoint(vec!["green", "red"]),
                border: SeriesColor::PerPoint(vec!["darkgreen", "darkred"]),
                border_width: 2,
            }],
            ChartOptions::default(),
        )
        .unwrap();

        let options = parse_options(&chart.options_json());
        let data = &options["series"][0]["data"];
        assert_eq!(data[0]["itemStyle"]["color"], "green");
        assert_eq!(data[0]["itemStyle"]["borderColor"], "darkgreen");
        assert_eq!(data[1]["itemStyle"]["color"], "red");
    }

    #[test]
    fn doughnut_chart_has_inner_radius_and_segment_colours() {
        let mut registry = ChartRegistry::new(&[CONTAINER]);

        let chart = create_pie_chart(
            &mut registry,
            CONTAINER,
            labels(&["Success", "Failed"]),
            vec![40.0, 10.0],
            vec!["#2ecc71", "#e74c3c"],
            true,
            ChartOptions::default(),
        )
        .unwrap();

        assert_eq!(chart.kind, ChartKind::Doughnut);
        let options = parse_options(&chart.options_json());
        assert_eq!(options["series"][0]["type"], "pie");
        assert_eq!(options["series"][0]["radius"][0], "40%");
        assert_eq!(options["series"][0]["data"][1]["name"], "Failed");
        assert_eq!(
            options["series"][0]["data"][1]["itemStyle"]["color"],
            "#e74c3c"
        );
    }

    #[test]
    fn pie_chart_is_not_a_doughnut() {
        let mut registry = ChartRegistry::new(&[CONTAINER]);

        let chart = create_pie_chart(
            &mut registry,
            CONTAINER,
            labels(&["Success", "Failed"]),
            vec![1.0, 1.0],
            vec!["#2ecc71", "#e74c3c"],
            false,
            ChartOptions::default(),
        )
        .unwrap();

        assert_eq!(chart.kind, ChartKind::Pie);
    }

    #[test]
    fn container_renders_script_only_with_chart() {
        let mut registry = ChartRegistry::new(&[CONTAINER]);

        let empty = chart_container(CONTAINER, registry.get(CONTAINER), "No data");
        let html = Html::parse_fragment(&empty.into_string());
        assert!(
            html.select(&Selector::parse("script").unwrap())
                .next()
                .is_none()
        );

        create_bar_chart(
            &mut registry,
            CONTAINER,
            labels(&["</script><b>"]),
            vec![dataset("first", vec![1.0])],
            ChartOptions::default(),
        )
        .unwrap();

        let rendered = chart_container(CONTAINER, registry.get(CONTAINER), "No data").into_string();
        let html = Html::parse_fragment(&rendered);
        let div = html
            .select(&Selector::parse(&format!("div#{CONTAINER}")).unwrap())
            .next();
        assert!(div.is_some(), "container div missing in {rendered}");
        assert_eq!(
            html.select(&Selector::parse("script").unwrap()).count(),
            1,
            "want exactly one script in {rendered}"
        );
        assert!(html.select(&Selector::parse("b").unwrap()).next().is_none());
    }
}

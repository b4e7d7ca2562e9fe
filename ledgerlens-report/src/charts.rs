//! Chart-rendering collaborator: series data in, embeddable markup out.
//!
//! The production implementation emits self-contained ECharts fragment
//! files (a container div plus an init script). The assembler later
//! re-reads those files and splices the two top-level fragments into the
//! final document, mirroring how the charts travel as standalone HTML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use serde_json::{json, Value};
use tracing::info;

/// The two top-level pieces of one rendered chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFragment {
    /// `<div>` container element.
    pub container: String,
    /// `<script>` element that initializes the chart into the container.
    pub script: String,
}

/// One bar panel of the two-panel overview chart.
#[derive(Debug, Clone)]
pub struct BarPanel {
    pub title: String,
    pub series_name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// One pie of the category-share pair, with its display options.
#[derive(Debug, Clone)]
pub struct PiePanel {
    pub name: String,
    /// (category, percentage) pairs, already sorted descending by amount.
    pub data: Vec<(String, f64)>,
    /// Inner/outer radius, e.g. ("30%", "65%").
    pub radius: (String, String),
    /// Horizontal/vertical center, e.g. ("30%", "50%").
    pub center: (String, String),
    /// Nightingale rose layout.
    pub rose: bool,
    /// Legend placement, distance from the bottom edge ("0%" = bottom,
    /// "90%" = top).
    pub legend_bottom: String,
}

/// Requests the pipeline can place against the renderer.
#[derive(Debug, Clone)]
pub enum ChartRequest {
    /// Two side-by-side bar charts on a split grid with split legends.
    BarPanels { left: BarPanel, right: BarPanel },
    /// Expense-share and income-share pies.
    PiePair { left: PiePanel, right: PiePanel },
    /// Bar+line overlap over the daily series on two chart-local y-axes;
    /// the income axis sits on the right with a colored axis line.
    DailyTrend {
        title: String,
        dates: Vec<String>,
        expense: Vec<f64>,
        income: Vec<f64>,
        right_axis_name: String,
        right_axis_color: String,
    },
}

/// Renders one request into a fragment file at `path` and returns the
/// fragments it wrote.
pub trait ChartRenderer {
    fn render(&self, request: &ChartRequest, path: &Path) -> Result<ChartFragment>;
}

/// ECharts-backed renderer. The option object is plain JSON; the fragment
/// file loads echarts.min.js so it also opens standalone in a browser.
pub struct EchartsRenderer;

const ECHARTS_JS: &str = "https://assets.pyecharts.org/assets/v5/echarts.min.js";

impl ChartRenderer for EchartsRenderer {
    fn render(&self, request: &ChartRequest, path: &Path) -> Result<ChartFragment> {
        let option = build_option(request);
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("chart")
            .replace(['-', '.'], "_");

        let container = format!(
            "<div id=\"{id}\" class=\"chart-container\" style=\"width:900px; height:500px;\"></div>"
        );
        let script = format!(
            "<script>\n    var chart_{id} = echarts.init(document.getElementById('{id}'));\n    var option_{id} = {option};\n    chart_{id}.setOption(option_{id});\n</script>",
        );

        let page = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"utf-8\">\n    <script type=\"text/javascript\" src=\"{ECHARTS_JS}\"></script>\n</head>\n<body>\n{container}\n{script}\n</body>\n</html>\n"
        );

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        fs::write(path, page).with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), "rendered chart fragment");

        Ok(ChartFragment { container, script })
    }
}

/// Re-read a fragment file and splice out the first body `<div>` and
/// `<script>`.
pub fn extract_chart_fragments(path: &Path) -> Result<ChartFragment> {
    let source = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let doc = Html::parse_document(&source);

    let div_sel = Selector::parse("body > div").expect("static selector");
    let script_sel = Selector::parse("body > script").expect("static selector");

    let container = doc
        .select(&div_sel)
        .next()
        .with_context(|| format!("no chart container in {}", path.display()))?
        .html();
    let script = doc
        .select(&script_sel)
        .next()
        .with_context(|| format!("no chart script in {}", path.display()))?
        .html();

    Ok(ChartFragment { container, script })
}

fn build_option(request: &ChartRequest) -> Value {
    match request {
        ChartRequest::BarPanels { left, right } => json!({
            "title": [
                { "text": left.title, "left": "0%" },
                { "text": right.title, "left": "55%" },
            ],
            "legend": [
                { "right": "50%", "data": [left.series_name] },
                { "left": "60%", "data": [right.series_name] },
            ],
            "grid": [
                { "left": "0%", "right": "55%", "containLabel": true },
                { "left": "55%", "right": "0%", "containLabel": true },
            ],
            "xAxis": [
                { "gridIndex": 0, "type": "category", "data": left.labels },
                { "gridIndex": 1, "type": "category", "data": right.labels },
            ],
            "yAxis": [
                { "gridIndex": 0, "type": "value" },
                { "gridIndex": 1, "type": "value" },
            ],
            "series": [
                {
                    "name": left.series_name,
                    "type": "bar",
                    "xAxisIndex": 0,
                    "yAxisIndex": 0,
                    "label": { "show": true },
                    "data": left.values,
                },
                {
                    "name": right.series_name,
                    "type": "bar",
                    "xAxisIndex": 1,
                    "yAxisIndex": 1,
                    "label": { "show": true, "formatter": "{c}" },
                    "data": right.values,
                },
            ],
        }),

        ChartRequest::PiePair { left, right } => json!({
            "title": [
                { "text": left.name },
                { "text": right.name, "right": "20%" },
            ],
            "legend": [pie_legend(left), pie_legend(right)],
            "tooltip": { "trigger": "item" },
            "series": [pie_series(left), pie_series(right)],
        }),

        ChartRequest::DailyTrend {
            title,
            dates,
            expense,
            income,
            right_axis_name,
            right_axis_color,
        } => json!({
            "title": { "text": title },
            "tooltip": { "trigger": "axis" },
            "legend": { "data": ["每日支出", "每日收入"] },
            "xAxis": { "type": "category", "data": dates },
            "yAxis": [
                {
                    "type": "value",
                    "axisLabel": { "formatter": "{value} 元" },
                },
                {
                    "type": "value",
                    "name": right_axis_name,
                    "position": "right",
                    "axisLine": { "lineStyle": { "color": right_axis_color } },
                },
            ],
            "series": [
                { "name": "每日支出", "type": "bar", "yAxisIndex": 0, "data": expense },
                { "name": "每日收入", "type": "bar", "yAxisIndex": 1, "data": income },
                {
                    "name": "每日支出", "type": "line", "yAxisIndex": 0,
                    "label": { "show": false }, "data": expense,
                },
                {
                    "name": "每日收入", "type": "line", "yAxisIndex": 1,
                    "label": { "show": false }, "data": income,
                },
            ],
        }),
    }
}

/// Each pie keeps its own legend, scoped to its slices by name.
fn pie_legend(panel: &PiePanel) -> Value {
    let names: Vec<&str> = panel.data.iter().map(|(name, _)| name.as_str()).collect();
    json!({ "bottom": panel.legend_bottom, "data": names })
}

fn pie_series(panel: &PiePanel) -> Value {
    let data: Vec<Value> = panel
        .data
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();
    let mut series = json!({
        "name": panel.name,
        "type": "pie",
        "radius": [panel.radius.0, panel.radius.1],
        "center": [panel.center.0, panel.center.1],
        "data": data,
    });
    if panel.rose {
        series["roseType"] = json!("area");
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pie(name: &str, rose: bool, legend_bottom: &str) -> PiePanel {
        PiePanel {
            name: name.to_string(),
            data: vec![("餐饮".to_string(), 62.5), ("交通".to_string(), 37.5)],
            radius: ("30%".to_string(), "65%".to_string()),
            center: ("30%".to_string(), "50%".to_string()),
            rose,
            legend_bottom: legend_bottom.to_string(),
        }
    }

    #[test]
    fn test_render_writes_standalone_fragment_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("image").join("section_2.html");
        let request = ChartRequest::PiePair {
            left: pie("总支出金额占比", true, "0%"),
            right: pie("总收入金额占比", false, "90%"),
        };

        let fragment = EchartsRenderer.render(&request, &path).unwrap();
        assert!(fragment.container.contains("id=\"section_2\""));
        assert!(fragment.script.contains("echarts.init"));

        let page = std::fs::read_to_string(&path).unwrap();
        assert!(page.contains("echarts.min.js"));
        assert!(page.contains("roseType"));
        // expense legend sits at the bottom, income legend near the top
        assert!(page.contains("\"bottom\":\"0%\""));
        assert!(page.contains("\"bottom\":\"90%\""));
    }

    #[test]
    fn test_pie_pair_emits_one_legend_per_pie() {
        let request = ChartRequest::PiePair {
            left: pie("总支出金额占比", true, "0%"),
            right: pie("总收入金额占比", false, "90%"),
        };
        let option = build_option(&request);
        let legends = option["legend"].as_array().unwrap();
        assert_eq!(legends.len(), 2);
        assert_eq!(legends[0]["bottom"], "0%");
        assert_eq!(legends[1]["bottom"], "90%");
        assert_eq!(legends[0]["data"][0], "餐饮");
        assert_eq!(legends[1]["data"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_extract_round_trips_rendered_fragments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("section_1.html");
        let request = ChartRequest::BarPanels {
            left: BarPanel {
                title: "收支金额".to_string(),
                series_name: "收支金额".to_string(),
                labels: vec!["总支出金额".to_string(), "总收入金额".to_string()],
                values: vec![100.0, 250.0],
            },
            right: BarPanel {
                title: "日均收支金额".to_string(),
                series_name: "日均收支金额".to_string(),
                labels: vec!["日均消费金额".to_string(), "日均收入金额".to_string()],
                values: vec![50.0, 125.0],
            },
        };
        EchartsRenderer.render(&request, &path).unwrap();

        let fragment = extract_chart_fragments(&path).unwrap();
        assert!(fragment.container.starts_with("<div"));
        assert!(fragment.script.starts_with("<script"));
        assert!(fragment.script.contains("setOption"));
    }

    #[test]
    fn test_extract_missing_file_fails() {
        let dir = tempdir().unwrap();
        assert!(extract_chart_fragments(&dir.path().join("nope.html")).is_err());
    }

    #[test]
    fn test_daily_trend_dual_axis_option() {
        let request = ChartRequest::DailyTrend {
            title: "每日收支流水".to_string(),
            dates: vec!["2025-11-01".to_string()],
            expense: vec![100.0],
            income: vec![50.0],
            right_axis_name: "收入".to_string(),
            right_axis_color: "#00CC00".to_string(),
        };
        let option = build_option(&request);
        assert_eq!(option["yAxis"][1]["position"], "right");
        assert_eq!(option["yAxis"][1]["axisLine"]["lineStyle"]["color"], "#00CC00");
        assert_eq!(option["series"].as_array().unwrap().len(), 4);
    }
}

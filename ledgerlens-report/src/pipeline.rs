//! Monthly report orchestrator.
//!
//! One `build_report` call runs the whole batch pipeline for a (year,
//! month): extract, analyze, render charts, narrate, assemble, write. The
//! run is synchronous start-to-finish; the Narrator call is the only
//! network round trip and has no timeout or retry. File writes are
//! non-transactional: a failure between chart writes and the final
//! assembly leaves the chart fragments on disk.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use ledgerlens_core::{
    analyze, sorted_descending, CategoryTotal, ColumnLayout, Distribution, MonthlySlice,
    NormalizedTable, Statistics,
};

use crate::charts::{BarPanel, ChartFragment, ChartRenderer, ChartRequest, PiePanel};
use crate::charts::extract_chart_fragments;
use crate::html::{render_document, render_indexed_table, render_table, Section};
use crate::narrator::Narrator;

pub const SYSTEM_PROMPT: &str =
    "你是一名数据分析专家，请根据提供的数据，生成一段消费报告，要求字数不超过500字。";

const SECTION_OVERVIEW: &str = "一、总体概况";
const SECTION_CATEGORY: &str = "二、分类收支统计";
const SECTION_TREND: &str = "三、日收支概况及趋势";
const SECTION_DETAIL: &str = "四、详细消费记录";

const DIST_COLUMNS: [&str; 7] = ["平均数", "中位数", "众数", "最大值", "最小值", "方差", "标准差"];

/// Where the report and its chart fragments land. Built once per run from
/// the CLI config and never mutated.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub out_dir: PathBuf,
}

impl PipelineConfig {
    fn chart_path(&self, section: usize) -> PathBuf {
        self.out_dir.join("image").join(format!("section_{section}.html"))
    }

    fn report_path(&self, year: i32, month: u32) -> PathBuf {
        self.out_dir.join(format!("{year}年{month}月消费报告.html"))
    }
}

/// Result of one report build. An empty month yields the sentinel form:
/// a human-readable summary, no statistics, and no file writes.
#[derive(Debug)]
pub struct ReportOutcome {
    pub summary: String,
    pub data: MonthlySlice,
    pub statistics: Option<Statistics>,
    pub report_html: Option<PathBuf>,
}

/// Staged chart fragments for the three chart-bearing sections.
#[derive(Debug, Default)]
struct ChartSet {
    overview: Option<ChartFragment>,
    categories: Option<ChartFragment>,
    daily: Option<ChartFragment>,
}

/// Build the report for (year, month) and write it under the configured
/// output directory. Collaborator failures propagate uncaught; nothing is
/// cleaned up on the way out.
pub fn build_report(
    table: &NormalizedTable,
    year: i32,
    month: u32,
    config: &PipelineConfig,
    narrator: &dyn Narrator,
    renderer: &dyn ChartRenderer,
) -> Result<ReportOutcome> {
    let layout = ColumnLayout::from_headers(&table.columns)?;
    let slice = MonthlySlice::extract(&table.columns, table.date_idx, &table.rows, year, month);

    if slice.is_empty() {
        info!(year, month, "no records for requested month");
        return Ok(ReportOutcome {
            summary: format!("未找到 {year}年{month}月 的消费记录。"),
            data: slice,
            statistics: None,
            report_html: None,
        });
    }

    let stats = analyze(&slice, &layout);
    let mut prompt = String::new();
    let mut charts = ChartSet::default();
    let mut sections: Vec<Section> = Vec::new();

    // 1. Overview: six numbers into the prompt, two-panel bar chart.
    prompt.push_str(&overview_prompt(&stats));
    charts.overview = Some(render_and_reload(
        renderer,
        &overview_chart(&stats),
        config,
        1,
    )?);
    let mut overview = Section::new(SECTION_OVERVIEW);
    overview.chart = charts.overview.clone();
    sections.push(overview);

    // 2. Category breakdown, skipped when there are no category totals.
    if !stats.expense_categories.is_empty() {
        prompt.push_str(&category_prompt(&stats));
        charts.categories = Some(render_and_reload(
            renderer,
            &category_chart(&stats),
            config,
            2,
        )?);
        let mut breakdown = Section::new(SECTION_CATEGORY);
        breakdown.chart = charts.categories.clone();
        sections.push(breakdown);
    }

    // 3. Daily trend, skipped when there is no daily-expense series.
    if let (Some(expense), Some(income), false) = (
        stats.expense_summary.as_ref(),
        stats.income_summary.as_ref(),
        stats.daily_expense.is_empty(),
    ) {
        prompt.push_str(&trend_prompt(expense, income));
        charts.daily = Some(render_and_reload(renderer, &trend_chart(&stats), config, 3)?);
        let mut trend = Section::new(SECTION_TREND);
        trend.chart = charts.daily.clone();
        trend.table_html = Some(distribution_table(expense, income));
        sections.push(trend);
    }

    // 4. Detail: one Narrator call over the accumulated prompt, then the
    // full slice as a table.
    let narrative = narrator
        .generate(&prompt, SYSTEM_PROMPT)
        .context("narrator call")?;
    let mut detail = Section::new(SECTION_DETAIL);
    detail.paragraphs = narrative.lines().map(str::to_string).filter(|l| !l.is_empty()).collect();
    detail.table_html = Some(record_table(&slice));
    sections.push(detail);

    let title = format!("{year}年{month}月消费报告");
    let document = render_document(&title, &sections);
    let path = config.report_path(year, month);
    std::fs::write(&path, document).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), sections = sections.len(), "report written");

    Ok(ReportOutcome {
        summary: format!("{year}年{month}月共消费¥{:.2}", stats.total_expense),
        data: slice,
        statistics: Some(stats),
        report_html: Some(path),
    })
}

/// Render one chart to its fixed fragment path, then re-read the file and
/// splice out its two top-level fragments.
fn render_and_reload(
    renderer: &dyn ChartRenderer,
    request: &ChartRequest,
    config: &PipelineConfig,
    section: usize,
) -> Result<ChartFragment> {
    let path = config.chart_path(section);
    renderer
        .render(request, &path)
        .with_context(|| format!("render chart for section {section}"))?;
    extract_chart_fragments(&path)
}

fn overview_prompt(stats: &Statistics) -> String {
    format!(
        "一、总体概况\n下面是需分析的消费数据。\n总支出金额：¥{:.2}，\n日均支出金额：¥{:.2}，\n总收入金额：¥{:.2}，\n日均收入金额：¥{:.2}，\n总净收入：¥{:.2}，\n日均净收入：¥{:.2}。\n",
        stats.total_expense,
        stats.average_daily_expense,
        stats.total_income,
        stats.average_daily_income,
        stats.net_income,
        stats.average_daily_net,
    )
}

fn overview_chart(stats: &Statistics) -> ChartRequest {
    ChartRequest::BarPanels {
        left: BarPanel {
            title: "（日均）收支金额".to_string(),
            series_name: "收支金额".to_string(),
            labels: vec![
                "总支出金额".to_string(),
                "总收入金额".to_string(),
                "总净收入".to_string(),
            ],
            values: vec![stats.total_expense, stats.total_income, stats.net_income],
        },
        right: BarPanel {
            title: "（日均）收支金额".to_string(),
            series_name: "日均收支金额".to_string(),
            labels: vec![
                "日均消费金额".to_string(),
                "日均收入金额".to_string(),
                "日均净收入".to_string(),
            ],
            values: vec![
                stats.average_daily_expense,
                stats.average_daily_income,
                stats.average_daily_net,
            ],
        },
    }
}

fn category_prompt(stats: &Statistics) -> String {
    let mut text = String::from("二、以下为消费金额占比:");
    for cat in sorted_descending(&stats.expense_categories) {
        text.push_str(&share_line(&cat, stats.total_expense));
    }
    text.push_str("以下为收入金额占比:");
    for cat in sorted_descending(&stats.income_categories) {
        text.push_str(&share_line(&cat, stats.total_income));
    }
    text.push('\n');
    text
}

fn share_line(cat: &CategoryTotal, total: f64) -> String {
    format!(
        "  {}: ¥{:.2} ({:.1}%)",
        cat.name,
        cat.amount,
        cat.share_of(total)
    )
}

fn category_chart(stats: &Statistics) -> ChartRequest {
    let shares = |cats: &[CategoryTotal], total: f64| {
        sorted_descending(cats)
            .into_iter()
            .map(|c| {
                let share = c.share_of(total);
                (c.name, share)
            })
            .collect::<Vec<_>>()
    };

    ChartRequest::PiePair {
        left: PiePanel {
            name: "总支出金额占比".to_string(),
            data: shares(&stats.expense_categories, stats.total_expense),
            radius: ("30%".to_string(), "65%".to_string()),
            center: ("30%".to_string(), "50%".to_string()),
            rose: true,
            legend_bottom: "0%".to_string(),
        },
        right: PiePanel {
            name: "总收入金额占比".to_string(),
            data: shares(&stats.income_categories, stats.total_income),
            radius: ("20%".to_string(), "65%".to_string()),
            center: ("75%".to_string(), "50%".to_string()),
            rose: false,
            legend_bottom: "90%".to_string(),
        },
    }
}

fn trend_prompt(expense: &Distribution, income: &Distribution) -> String {
    let prose = |d: &Distribution| {
        format!(
            "平均数：{}，中位数：{}，众数：{}，最大值：{}，最小值：{}，方差：{}，标准差：{}；",
            d.mean, d.median, d.mode, d.max, d.min, d.variance, d.std_dev
        )
    };
    format!(
        "三、日收支概况及趋势：\n1.消费数据：\n{}\n2.收入数据：\n{}\n",
        prose(expense),
        prose(income)
    )
}

fn trend_chart(stats: &Statistics) -> ChartRequest {
    let dates: Vec<String> = stats.daily_expense.keys().map(|d| d.to_string()).collect();
    let expense: Vec<f64> = stats.daily_expense.values().copied().collect();
    let income: Vec<f64> = stats
        .daily_expense
        .keys()
        .map(|d| stats.daily_income.get(d).copied().unwrap_or(0.0))
        .collect();

    ChartRequest::DailyTrend {
        title: "每日收支流水".to_string(),
        dates,
        expense,
        income,
        right_axis_name: "收入".to_string(),
        right_axis_color: "#00CC00".to_string(),
    }
}

/// 2×7 summary: rows 消费金额/收入金额, columns the seven distribution
/// statistics.
fn distribution_table(expense: &Distribution, income: &Distribution) -> String {
    let row = |d: &Distribution| d.as_row().iter().map(|v| format!("{v}")).collect::<Vec<_>>();
    render_indexed_table(
        &DIST_COLUMNS,
        &[
            ("消费金额".to_string(), row(expense)),
            ("收入金额".to_string(), row(income)),
        ],
    )
}

/// The full per-day slice as a table, date column formatted as a date.
fn record_table(slice: &MonthlySlice) -> String {
    let rows: Vec<Vec<String>> = slice
        .rows
        .iter()
        .map(|r| {
            r.cells
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i == slice.date_idx {
                        r.date.to_string()
                    } else {
                        cell.display()
                    }
                })
                .collect()
        })
        .collect();
    render_table(&slice.columns, &rows)
}

//! End-to-end: CSV export in, finished HTML report out.

use std::io::Write;

use anyhow::Result;
use tempfile::{tempdir, NamedTempFile};

use ledgerlens_ingest::load_table;
use ledgerlens_report::charts::EchartsRenderer;
use ledgerlens_report::narrator::Narrator;
use ledgerlens_report::pipeline::{build_report, PipelineConfig};

struct CannedNarrator;

impl Narrator for CannedNarrator {
    fn generate(&self, prompt: &str, _system_prompt: &str) -> Result<String> {
        assert!(prompt.contains("一、总体概况"));
        Ok("十一月整体结余为正，餐饮占比最高。".to_string())
    }
}

fn write_fixture() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    // Two-row header: the blank secondary cells fall back to the primary row.
    writeln!(
        file,
        "基本信息,基本信息,基本信息,基本信息,基本信息,基本信息,支出,支出,支出,收入,收入,收入,收入,收入"
    )
    .unwrap();
    writeln!(
        file,
        "日期,星期,地点,备注,标签,编号,餐饮,交通,总支出/天,总收入/天,工资,理财,红包,其他收入"
    )
    .unwrap();
    writeln!(file, "20251101,六,家,,,1,60,40,100,50,50,,,").unwrap();
    writeln!(file, "20251102,日,家,,,2,,,,200,,200,,").unwrap();
    writeln!(file, "20251015,三,公司,,,3,30,0,30,,,,,").unwrap();
    file
}

#[test]
fn test_csv_to_report_end_to_end() {
    let csv = write_fixture();
    let out = tempdir().unwrap();
    let config = PipelineConfig {
        out_dir: out.path().to_path_buf(),
    };

    let table = load_table(csv.path()).unwrap();
    assert_eq!(table.len(), 3);

    let outcome =
        build_report(&table, 2025, 11, &config, &CannedNarrator, &EchartsRenderer).unwrap();

    assert_eq!(outcome.summary, "2025年11月共消费¥100.00");
    let stats = outcome.statistics.unwrap();
    assert_eq!(stats.total_expense, 100.00);
    assert_eq!(stats.total_income, 250.00);
    assert_eq!(stats.net_income, 150.00);
    assert_eq!(stats.average_daily_expense, 50.00);
    assert_eq!(stats.average_daily_income, 125.00);

    // October's row stayed out of the slice
    assert_eq!(outcome.data.len(), 2);

    let html = std::fs::read_to_string(outcome.report_html.unwrap()).unwrap();
    assert_eq!(html.matches("<h3>").count(), 4);
    assert!(html.contains("十一月整体结余为正"));
    assert!(html.contains("table table-striped"));
    assert!(html.contains("echarts.init"));
}

#[test]
fn test_month_without_rows_yields_sentinel_and_no_files() {
    let csv = write_fixture();
    let out = tempdir().unwrap();
    let config = PipelineConfig {
        out_dir: out.path().to_path_buf(),
    };

    let table = load_table(csv.path()).unwrap();
    let outcome =
        build_report(&table, 2025, 12, &config, &CannedNarrator, &EchartsRenderer).unwrap();

    assert_eq!(outcome.summary, "未找到 2025年12月 的消费记录。");
    assert!(outcome.statistics.is_none());
    assert!(outcome.report_html.is_none());
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_reextracting_report_slice_is_stable() {
    let csv = write_fixture();
    let out = tempdir().unwrap();
    let config = PipelineConfig {
        out_dir: out.path().to_path_buf(),
    };

    let table = load_table(csv.path()).unwrap();
    let outcome =
        build_report(&table, 2025, 11, &config, &CannedNarrator, &EchartsRenderer).unwrap();
    let slice = outcome.data;
    assert_eq!(slice, slice.restrict(2025, 11));
}

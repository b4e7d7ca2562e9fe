use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use ledgerlens_core::{analyze, sorted_descending, ColumnLayout};
use ledgerlens_ingest::{extract_monthly, load_table};
use ledgerlens_report::{
    build_report, ChatNarrator, EchartsRenderer, Narrator, NarratorConfig, OfflineNarrator,
    PipelineConfig,
};

mod config;

use config::{init_config, load_config, Config, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(name = "ledgerlens", version, about = "Monthly spending report generator")]
struct Cli {
    /// Config file (TOML)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the HTML report for one month
    Report {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,

        /// Ledger CSV export (overrides the config)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Output directory (overrides the config)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Skip the narrative-text service; no network, no credentials
        #[arg(long)]
        offline: bool,
    },

    /// Print one month's statistics without writing anything
    Stats {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,

        /// Ledger CSV export (overrides the config)
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Write a default config file
    ConfigInit,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;

    match cli.command {
        Command::Report {
            year,
            month,
            csv,
            out,
            offline,
        } => run_report(&cfg, year, month, csv, out, offline),

        Command::Stats { year, month, csv } => run_stats(&cfg, year, month, csv),

        Command::ConfigInit => init_config(&cli.config),
    }
}

fn run_report(
    cfg: &Config,
    year: i32,
    month: u32,
    csv: Option<PathBuf>,
    out: Option<PathBuf>,
    offline: bool,
) -> Result<()> {
    let csv_path = csv.unwrap_or_else(|| cfg.data.path.clone());
    if !csv_path.exists() {
        bail!("ledger not found: {} (pass --csv <path>)", csv_path.display());
    }
    let out_dir = out.unwrap_or_else(|| cfg.data.out_dir.clone());
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("create {}", out_dir.display()))?;

    let narrator: Box<dyn Narrator> = if offline {
        Box::new(OfflineNarrator)
    } else {
        let api_key = std::env::var(&cfg.llm.api_key_env).with_context(|| {
            format!(
                "missing API key: set {} or pass --offline",
                cfg.llm.api_key_env
            )
        })?;
        Box::new(ChatNarrator::new(NarratorConfig {
            base_url: cfg.llm.base_url.clone(),
            api_key,
            model: cfg.llm.model.clone(),
            temperature: cfg.llm.temperature,
            max_tokens: cfg.llm.max_tokens,
        }))
    };

    let table = load_table(&csv_path)?;
    info!(year, month, "building report");

    let pipeline = PipelineConfig { out_dir };
    let outcome = build_report(&table, year, month, &pipeline, narrator.as_ref(), &EchartsRenderer)?;

    println!("{}", outcome.summary);
    match outcome.report_html {
        Some(path) => println!("Report written to {}", path.display()),
        None => println!("No report file written."),
    }
    Ok(())
}

fn run_stats(cfg: &Config, year: i32, month: u32, csv: Option<PathBuf>) -> Result<()> {
    let csv_path = csv.unwrap_or_else(|| cfg.data.path.clone());
    if !csv_path.exists() {
        bail!("ledger not found: {} (pass --csv <path>)", csv_path.display());
    }

    let table = load_table(&csv_path)?;
    let layout = ColumnLayout::from_headers(&table.columns)?;
    let slice = extract_monthly(&table, year, month);

    if slice.is_empty() {
        println!("未找到 {year}年{month}月 的消费记录。");
        return Ok(());
    }

    let stats = analyze(&slice, &layout);
    println!("{year}年{month}月 ({} 条记录, {} 天)", slice.len(), slice.distinct_dates());
    println!("总支出: ¥{:.2}  日均: ¥{:.2}", stats.total_expense, stats.average_daily_expense);
    println!("总收入: ¥{:.2}  日均: ¥{:.2}", stats.total_income, stats.average_daily_income);
    println!("净收入: ¥{:.2}  日均: ¥{:.2}", stats.net_income, stats.average_daily_net);

    println!("\n支出分类:");
    for cat in sorted_descending(&stats.expense_categories) {
        println!(
            "  {:<12} ¥{:>10.2} ({:.1}%)",
            cat.name,
            cat.amount,
            cat.share_of(stats.total_expense)
        );
    }
    println!("收入分类:");
    for cat in sorted_descending(&stats.income_categories) {
        println!(
            "  {:<12} ¥{:>10.2} ({:.1}%)",
            cat.name,
            cat.amount,
            cat.share_of(stats.total_income)
        );
    }

    if let Some(d) = &stats.expense_summary {
        println!(
            "\n日支出分布: 平均 {} / 中位 {} / 众数 {} / 最大 {} / 最小 {} / 方差 {} / 标准差 {}",
            d.mean, d.median, d.mode, d.max, d.min, d.variance, d.std_dev
        );
    }
    Ok(())
}

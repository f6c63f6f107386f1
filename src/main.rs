use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;

use order_report::app::{App, RunOptions};
use order_report::config::{Backend, Config};
use order_report::report::ExportFormat;
use order_report::utils::logging;

/// 从外卖平台订单历史 PDF 中提取订单，并按餐厅、平台汇总
#[derive(Parser, Debug)]
#[command(name = "order-report", version, about, long_about = None)]
struct Cli {
    /// 要处理的文件（按给出的顺序逐个处理，非 PDF 会被忽略）
    #[arg(num_args = 0..)]
    files: Vec<PathBuf>,

    /// 只显示这些餐厅（可重复）
    #[arg(long = "restaurant", value_name = "NAME")]
    restaurants: Vec<String>,

    /// 导出格式（可重复）
    #[arg(long = "export", value_enum, value_name = "FORMAT")]
    exports: Vec<ExportFormat>,

    /// 导出目录
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// TOML 配置文件
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// 提取后端: gemini 或 openai
    #[arg(long, value_parser = parse_backend)]
    backend: Option<Backend>,

    /// 模型名称
    #[arg(long)]
    model: Option<String>,

    /// 找不到页眉日期时 "Today"/"Yesterday" 的基准日期 (YYYY-MM-DD)
    #[arg(long, value_name = "YYYY-MM-DD")]
    reference_date: Option<NaiveDate>,

    /// 显示详细日志
    #[arg(short, long)]
    verbose: bool,
}

fn parse_backend(s: &str) -> Result<Backend, String> {
    Backend::parse(s).ok_or_else(|| format!("unknown backend '{}', expected gemini or openai", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置，命令行参数优先
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(model) = cli.model {
        config.model_name = model;
    }
    if let Some(out_dir) = cli.out_dir {
        config.output_dir = out_dir;
    }
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    let options = RunOptions {
        files: cli.files,
        restaurants: cli.restaurants,
        exports: cli.exports,
        reference_date: cli.reference_date,
    };

    // 初始化并运行应用
    App::initialize(config, options).run().await?;

    Ok(())
}

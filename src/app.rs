use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{error, warn};

use crate::config::Config;
use crate::error::{AppResult, ExportError, ValidationError};
use crate::models::loaders::load_selected_files;
use crate::models::outcome::{BatchState, OutcomeStatus};
use crate::orchestrator::{BatchEvent, BatchProcessor};
use crate::report::export::{export_report, filter_statement, ExportFormat};
use crate::report::summary::{RestaurantFilter, SummaryView};
use crate::report::table::{crosstab_table, orders_table, outcomes_table};
use crate::services::ExtractionService;
use crate::utils::logging::{log_files_accepted, log_startup, print_final_stats};

/// 一次运行的输入
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// 用户选择的文件（按选择顺序）
    pub files: Vec<PathBuf>,
    /// 餐厅筛选，重复出现的名字会被切换掉
    pub restaurants: Vec<String>,
    pub exports: Vec<ExportFormat>,
    /// 找不到页眉日期时的基准日期
    pub reference_date: Option<NaiveDate>,
}

/// 一次运行的结果
#[derive(Debug, Clone)]
pub struct RunReport {
    pub state: BatchState,
    pub view: SummaryView,
    pub exported: Vec<PathBuf>,
}

/// 应用主结构
pub struct App {
    config: Config,
    options: RunOptions,
    service: ExtractionService,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config, options: RunOptions) -> Self {
        log_startup(&config);

        let service =
            ExtractionService::new(&config).with_fallback_date(options.reference_date);

        Self {
            config,
            options,
            service,
        }
    }

    /// 运行应用主逻辑：读取 → 逐个提取 → 汇总 → 导出
    pub async fn run(self) -> AppResult<RunReport> {
        let files = match load_selected_files(&self.options.files).await {
            Ok(files) => files,
            Err(e @ ValidationError::NoPdfFiles { .. }) => {
                warn!("⚠️ 所选文件中没有 PDF，已全部忽略");
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };
        log_files_accepted(files.len(), self.options.files.len());

        let (tx, rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(print_events(rx));

        let mut processor = BatchProcessor::new(self.service).with_events(tx);
        processor.run_batch(files).await?;
        let state = processor.state().clone();
        // 释放发送端，让进度打印任务结束
        drop(processor);
        if let Err(e) = printer.await {
            warn!("进度输出任务异常结束: {}", e);
        }

        let filter: RestaurantFilter = self.options.restaurants.iter().collect();
        let view = SummaryView::derive(state.outcomes(), &filter);
        render_results(&state, &view);

        let exported = export_all(&view, &self.options.exports, &self.config.output_dir)?;

        let exported_names: Vec<String> =
            exported.iter().map(|p| p.display().to_string()).collect();
        print_final_stats(&state, &exported_names);

        Ok(RunReport {
            state,
            view,
            exported,
        })
    }
}

/// 打印批次进度
async fn print_events(mut rx: UnboundedReceiver<BatchEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            BatchEvent::Started { total } => {
                println!("Processing {} file(s)...", total);
            }
            BatchEvent::FileStarted { label, .. } => {
                println!("  {}", label);
            }
            BatchEvent::FileFinished { outcome, .. } => match outcome.status {
                OutcomeStatus::Success => {
                    println!("    ✓ {}: {} order(s)", outcome.file_name, outcome.orders.len())
                }
                OutcomeStatus::Error => println!(
                    "    ✗ {}: {}",
                    outcome.file_name,
                    outcome.error_message.as_deref().unwrap_or_default()
                ),
            },
            BatchEvent::Completed { outcomes } => {
                println!("Done: {} result(s)\n", outcomes);
            }
        }
    }
}

/// 输出结果表格
///
/// 空批次或没有任何成功记录时不显示汇总。
fn render_results(state: &BatchState, view: &SummaryView) {
    if state.outcomes().is_empty() {
        return;
    }

    println!("{}\n", outcomes_table(state.outcomes()).render());

    if !view.has_records() {
        return;
    }

    println!("Restaurants: {}", view.distinct_restaurants.join(", "));
    println!("{}\n", filter_statement(&view.active_filter));

    if view.filtered_records.is_empty() {
        println!("No orders match the selected restaurants.\n");
        return;
    }

    println!("{}\n", orders_table(view).render());
    println!("{}\n", crosstab_table(view).render());
}

/// 依次导出所有请求的格式
///
/// 筛选后没有订单时跳过导出，不算失败；写文件失败则返回错误。
fn export_all(
    view: &SummaryView,
    formats: &[ExportFormat],
    out_dir: &Path,
) -> AppResult<Vec<PathBuf>> {
    let mut exported = Vec::with_capacity(formats.len());
    for format in formats {
        match export_report(view, *format, out_dir) {
            Ok(path) => exported.push(path),
            Err(ExportError::NothingToExport) => {
                warn!("⚠️ 没有可导出的订单，跳过 {} 导出", format.label());
            }
            Err(e) => {
                error!("❌ {} 导出失败: {}", format.label(), e);
                return Err(e.into());
            }
        }
    }
    Ok(exported)
}

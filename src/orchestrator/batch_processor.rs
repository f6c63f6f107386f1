//! 批量文件处理器 - 编排层
//!
//! ## 职责
//!
//! 按用户选择的顺序逐个处理文件，维护唯一的 `BatchState`。
//!
//! ## 核心功能
//!
//! 1. **阶段切换**：idle → processing → completed，空批次同样走完整流程
//! 2. **严格顺序**：同一时刻只有一个提取调用在进行，进度文字可预测
//! 3. **失败隔离**：单个文件失败只记录在它自己的结果里，后续文件继续处理
//! 4. **进度通知**：可选的 `BatchEvent` 通道，供界面层显示进度
//!
//! 没有取消机制：批次一旦开始就会处理完所有文件。

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::error::BatchError;
use crate::models::outcome::{BatchState, FileOutcome};
use crate::models::upload::UploadedFile;
use crate::services::OrderExtractor;
use crate::workflow::{FileCtx, FileFlow};

/// 批次进度事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// 批次开始
    Started { total: usize },
    /// 开始处理某个文件
    FileStarted {
        index: usize,
        total: usize,
        file_name: String,
        label: String,
    },
    /// 某个文件处理结束（成功或失败）
    FileFinished { index: usize, outcome: FileOutcome },
    /// 批次结束
    Completed { outcomes: usize },
}

/// 批量处理器
///
/// 唯一可以修改 `BatchState` 的地方；其他模块通过 [`BatchProcessor::state`] 只读访问。
pub struct BatchProcessor<E: OrderExtractor> {
    extractor: E,
    state: BatchState,
    events: Option<UnboundedSender<BatchEvent>>,
}

impl<E: OrderExtractor> BatchProcessor<E> {
    pub fn new(extractor: E) -> Self {
        Self {
            extractor,
            state: BatchState::default(),
            events: None,
        }
    }

    /// 注册进度事件通道
    pub fn with_events(mut self, events: UnboundedSender<BatchEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// 处理中不允许提交新的批次
    pub fn can_submit(&self) -> bool {
        !self.state.is_processing()
    }

    /// 运行一个批次
    ///
    /// 只有在上一个批次仍处于 processing 时才会返回错误；
    /// 提取失败全部转换为对应文件的结果，不会中断循环。
    pub async fn run_batch(&mut self, files: Vec<UploadedFile>) -> Result<(), BatchError> {
        if !self.can_submit() {
            return Err(BatchError::AlreadyProcessing);
        }

        let total = files.len();
        self.state.begin();
        // future 在中途被丢弃时，由 guard 结束批次
        let mut guard = BatchGuard {
            state: &mut self.state,
        };
        emit_to(&self.events, BatchEvent::Started { total });
        log_batch_start(total);

        let flow = FileFlow::new(&self.extractor);

        for (idx, file) in files.iter().enumerate() {
            let ctx = FileCtx::new(idx + 1, total, file.name.clone());
            let label = ctx.progress_label();
            debug!("{}", label);

            guard.state.set_progress(label.clone());
            emit_to(
                &self.events,
                BatchEvent::FileStarted {
                    index: ctx.index,
                    total,
                    file_name: file.name.clone(),
                    label,
                },
            );

            let outcome = flow.run(file, &ctx).await;

            emit_to(
                &self.events,
                BatchEvent::FileFinished {
                    index: ctx.index,
                    outcome: outcome.clone(),
                },
            );
            guard.state.push_outcome(outcome);
        }

        guard.state.finish();
        log_batch_complete(&*guard.state);
        let outcomes = guard.state.outcomes().len();
        drop(guard);
        emit_to(&self.events, BatchEvent::Completed { outcomes });

        Ok(())
    }
}

/// 保证批次不会停留在 processing
///
/// 正常结束时 `finish()` 已经调用过，这里什么也不做；
/// 中途被取消时保留已完成的结果并把批次标记为结束，之后可以提交新批次。
struct BatchGuard<'a> {
    state: &'a mut BatchState,
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        if self.state.is_processing() {
            warn!(
                "⚠️ 批次在完成前被取消，已处理 {} 个文件",
                self.state.outcomes().len()
            );
            self.state.finish();
        }
    }
}

/// 接收端已关闭时静默丢弃事件
fn emit_to(events: &Option<UnboundedSender<BatchEvent>>, event: BatchEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

// ========== 日志辅助函数 ==========

fn log_batch_start(total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理批次: 共 {} 个文件（逐个处理）", total);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(state: &BatchState) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 批次完成: 成功 {}/{}，共 {} 条订单",
        state.success_count(),
        state.outcomes().len(),
        state.total_orders()
    );
    info!("{}", "─".repeat(60));
}

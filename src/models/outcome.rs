//! 文件处理结果与批次状态

use serde::Serialize;

use super::order::OrderRecord;

/// 单个文件的处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// 单个文件的处理结果，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub file_name: String,
    pub status: OutcomeStatus,
    pub orders: Vec<OrderRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl FileOutcome {
    pub fn success(file_name: impl Into<String>, orders: Vec<OrderRecord>) -> Self {
        Self {
            file_name: file_name.into(),
            status: OutcomeStatus::Success,
            orders,
            error_message: None,
        }
    }

    /// 失败结果不携带订单
    pub fn error(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            status: OutcomeStatus::Error,
            orders: Vec::new(),
            error_message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// 批次阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchPhase {
    #[default]
    Idle,
    Processing,
    Completed,
}

/// 批次状态
///
/// 只有 `BatchProcessor` 可以修改，其他模块只读。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchState {
    phase: BatchPhase,
    progress_label: String,
    outcomes: Vec<FileOutcome>,
}

impl BatchState {
    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn progress_label(&self) -> &str {
        &self.progress_label
    }

    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    pub fn is_processing(&self) -> bool {
        self.phase == BatchPhase::Processing
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn error_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn total_orders(&self) -> usize {
        self.outcomes.iter().map(|o| o.orders.len()).sum()
    }

    /// 新批次开始：清空结果并进入 processing
    pub(crate) fn begin(&mut self) {
        self.phase = BatchPhase::Processing;
        self.progress_label.clear();
        self.outcomes.clear();
    }

    pub(crate) fn set_progress(&mut self, label: String) {
        self.progress_label = label;
    }

    pub(crate) fn push_outcome(&mut self, outcome: FileOutcome) {
        self.outcomes.push(outcome);
    }

    pub(crate) fn finish(&mut self) {
        self.phase = BatchPhase::Completed;
        self.progress_label.clear();
    }
}

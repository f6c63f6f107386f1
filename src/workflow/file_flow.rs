//! 单个文件处理流程 - 流程层
//!
//! 核心职责：一个文件 → 一个 `FileOutcome`
//!
//! 提取失败在这里被捕获：具体原因写日志，结果里只保留固定的提示文字，
//! 不会向上层抛出错误。

use tracing::{error, info, warn};

use crate::error::GENERIC_EXTRACTION_ERROR;
use crate::models::outcome::FileOutcome;
use crate::models::upload::UploadedFile;
use crate::services::OrderExtractor;
use crate::utils::truncate_text;
use crate::workflow::file_ctx::FileCtx;

/// 单个文件处理流程
///
/// - 不持有任何批次状态
/// - 只依赖提取能力（services）
pub struct FileFlow<'a, E: OrderExtractor + ?Sized> {
    extractor: &'a E,
}

impl<'a, E: OrderExtractor + ?Sized> FileFlow<'a, E> {
    pub fn new(extractor: &'a E) -> Self {
        Self { extractor }
    }

    pub async fn run(&self, file: &UploadedFile, ctx: &FileCtx) -> FileOutcome {
        info!("{} 📄 {}", ctx, truncate_text(&file.name, 60));

        match self.extractor.extract(file).await {
            Ok(orders) => {
                if orders.is_empty() {
                    warn!("{} ⚠️ 没有识别到任何订单", ctx);
                } else {
                    info!("{} ✓ 识别到 {} 条订单", ctx, orders.len());
                }
                FileOutcome::success(&file.name, orders)
            }
            Err(e) => {
                error!("{} ❌ 提取失败: {}", ctx, e);
                FileOutcome::error(&file.name, GENERIC_EXTRACTION_ERROR)
            }
        }
    }
}

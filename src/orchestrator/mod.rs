//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<UploadedFile>，持有 BatchState)
//!     ↓
//! workflow::FileFlow (处理单个文件 → FileOutcome)
//!     ↓
//! services (能力层：提取 / 规范化)
//!     ↓
//! clients (基础设施：Gemini / OpenAI 兼容接口)
//! ```
//!
//! 编排层只做调度和统计，不做具体业务判断。

pub mod batch_processor;

pub use batch_processor::{BatchEvent, BatchProcessor};

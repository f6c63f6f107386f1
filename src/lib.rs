//! # Order Report
//!
//! 从外卖平台（Glovo / Uber Eats / Bolt）打印出来的订单历史 PDF 中提取订单，
//! 按餐厅和平台汇总，并导出报表。
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 与生成式 AI 服务通信，只负责"发文件、拿文本"
//! - `GeminiClient` - 原生 generateContent 接口
//! - `OpenAiClient` - 兼容 OpenAI 的 chat completion 接口
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个文件
//! - `ExtractionService` - 模型调用 → 解析 → 规范化
//! - `normalization` / `header_date` - 餐厅名、平台、相对日期的本地规范化
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个文件"的完整处理流程
//! - `FileCtx` - 上下文封装（文件序号 + 文件名）
//! - `FileFlow` - 一个文件 → 一个 `FileOutcome`，失败在这里被隔离
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 严格按顺序处理一个批次，持有 `BatchState`
//!
//! ### ⑤ 汇总与导出（Report）
//! - `report/` - 餐厅筛选、餐厅 × 平台交叉表、PDF / CSV / Markdown / JSON 导出
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::{App, RunOptions, RunReport};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{FileOutcome, OrderRecord, Platform, UploadedFile};
pub use orchestrator::{BatchEvent, BatchProcessor};
pub use report::{ExportFormat, RestaurantFilter, SummaryView};
pub use services::{ExtractionService, OrderExtractor};
pub use workflow::{FileCtx, FileFlow};

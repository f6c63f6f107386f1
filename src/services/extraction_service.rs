//! 订单提取服务 - 业务能力层
//!
//! 只负责"一个文件 → 一组订单记录"，不关心批次和进度。
//!
//! 流程：模型调用 → 解析 JSON → 本地规范化

use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::clients::{DocumentModel, GeminiClient, OpenAiClient};
use crate::config::{Backend, Config};
use crate::error::ExtractionError;
use crate::models::order::OrderRecord;
use crate::models::upload::UploadedFile;
use crate::services::{header_date, normalization, prompt};

/// 提取接口：给定一个文件，返回订单记录或失败
///
/// 服务正常返回但没有可用记录时返回空列表，而不是错误。
pub trait OrderExtractor: Send + Sync {
    fn extract<'a>(
        &'a self,
        file: &'a UploadedFile,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<OrderRecord>, ExtractionError>> + Send + 'a>>;
}

/// 基于文档模型的提取服务
pub struct ExtractionService {
    model: Box<dyn DocumentModel>,
    prompt: String,
    /// 找不到页眉日期时使用的基准日期（默认为当天）
    fallback_date: Option<NaiveDate>,
}

impl ExtractionService {
    /// 按配置选择后端
    pub fn new(config: &Config) -> Self {
        let model: Box<dyn DocumentModel> = match config.backend {
            Backend::Gemini => Box::new(GeminiClient::new(config)),
            Backend::OpenAi => Box::new(OpenAiClient::new(config)),
        };
        Self::with_model(model)
    }

    /// 使用自定义模型后端
    pub fn with_model(model: Box<dyn DocumentModel>) -> Self {
        Self {
            model,
            prompt: prompt::build_extraction_prompt(),
            fallback_date: None,
        }
    }

    pub fn with_fallback_date(mut self, date: Option<NaiveDate>) -> Self {
        self.fallback_date = date;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.model.name()
    }

    fn reference_date(&self, file: &UploadedFile) -> NaiveDate {
        header_date::header_date_from_pdf(&file.content)
            .or(self.fallback_date)
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    async fn run(&self, file: &UploadedFile) -> Result<Vec<OrderRecord>, ExtractionError> {
        let raw = self.model.generate(file, &self.prompt).await?;
        debug!("[{}] 模型返回 {} 字符", file.name, raw.len());

        let records = parse_orders(&raw)?;
        if records.is_empty() {
            return Ok(records);
        }

        let reference = self.reference_date(file);
        Ok(records
            .into_iter()
            .map(|record| normalization::normalize_record(record, reference))
            .collect())
    }
}

impl OrderExtractor for ExtractionService {
    fn extract<'a>(
        &'a self,
        file: &'a UploadedFile,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<OrderRecord>, ExtractionError>> + Send + 'a>> {
        Box::pin(self.run(file))
    }
}

fn code_fence() -> Option<&'static Regex> {
    static RE: std::sync::OnceLock<Option<Regex>> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$").ok())
        .as_ref()
}

/// 去掉 Markdown 代码块包裹
fn strip_code_fence(raw: &str) -> &str {
    code_fence()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw)
        .trim()
}

/// 解析模型输出
///
/// - 空输出、`null`、空数组 → 空列表
/// - 裸数组，或 `{"orders": [...]}` 包裹的数组 → 逐项解析，缺字段的项丢弃
/// - 不是合法 JSON → `UnparseableContent`
pub fn parse_orders(raw: &str) -> Result<Vec<OrderRecord>, ExtractionError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let value: JsonValue = serde_json::from_str(body)
        .map_err(|source| ExtractionError::UnparseableContent { source })?;

    let items = match value {
        JsonValue::Array(items) => items,
        JsonValue::Object(mut map) => match map.remove("orders") {
            Some(JsonValue::Array(items)) => items,
            _ => {
                warn!("返回的 JSON 对象中没有 orders 数组，视为没有订单");
                Vec::new()
            }
        },
        JsonValue::Null => Vec::new(),
        other => {
            warn!("返回内容不是订单数组: {}", crate::utils::truncate_text(&other.to_string(), 80));
            Vec::new()
        }
    };

    let total = items.len();
    let records: Vec<OrderRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<OrderRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("丢弃第 {} 条记录（字段不完整）: {}", i + 1, e);
                None
            }
        })
        .collect();

    if records.len() < total {
        debug!("保留 {}/{} 条记录", records.len(), total);
    }

    Ok(records)
}

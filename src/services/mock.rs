//! 测试用的可编排提取器

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::extraction_service::OrderExtractor;
use crate::error::ExtractionError;
use crate::models::order::OrderRecord;
use crate::models::upload::UploadedFile;

/// [`MockExtractor`] 的一次返回
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// 返回这些订单
    Orders(Vec<OrderRecord>),
    /// 模拟服务调用失败
    Fail(String),
}

/// 按顺序返回预设结果的提取器
///
/// - 每次调用取下一个预设结果，用完后重复最后一个
/// - 记录调用次数、被调用的文件名
/// - 记录同时进行中的调用数峰值，用于验证顺序执行
pub struct MockExtractor {
    responses: Mutex<Vec<MockResponse>>,
    fallback: MockResponse,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockExtractor {
    /// 每次都返回同一个结果
    pub fn new(response: MockResponse) -> Self {
        Self::with_sequence(vec![response])
    }

    /// 按顺序返回结果，用完后重复最后一个
    pub fn with_sequence(mut responses: Vec<MockResponse>) -> Self {
        let fallback = responses
            .last()
            .cloned()
            .unwrap_or(MockResponse::Orders(Vec::new()));
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            fallback,
            delay: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// 模拟每次调用的网络延迟
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// 按调用顺序返回文件名
    pub fn called_files(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// 同时进行中的调用数峰值
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> MockResponse {
        match self.responses.lock() {
            Ok(mut seq) => seq.pop().unwrap_or_else(|| self.fallback.clone()),
            Err(_) => self.fallback.clone(),
        }
    }
}

impl OrderExtractor for MockExtractor {
    fn extract<'a>(
        &'a self,
        file: &'a UploadedFile,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<OrderRecord>, ExtractionError>> + Send + 'a>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(file.name.clone());
        }
        let response = self.next_response();

        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(d) = self.delay {
                tokio::time::sleep(d).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match response {
                MockResponse::Orders(orders) => Ok(orders),
                MockResponse::Fail(msg) => Err(ExtractionError::BadStatus {
                    backend: "mock".to_string(),
                    status: 500,
                    body: msg,
                }),
            }
        })
    }
}

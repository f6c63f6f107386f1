//! Gemini generateContent 客户端
//!
//! 文件以 base64 `inline_data` 发送，并通过 `responseSchema`
//! 要求模型输出订单数组。

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use super::DocumentModel;
use crate::config::Config;
use crate::error::ExtractionError;
use crate::models::upload::UploadedFile;
use crate::services::prompt;

const BACKEND_NAME: &str = "Gemini";

/// Gemini 客户端
pub struct GeminiClient {
    http: reqwest::Client,
    config: Config,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    InlineData { inline_data: InlineData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: JsonValue,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    /// 创建新的 Gemini 客户端
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("无法按配置创建 HTTP 客户端，使用默认设置: {}", e);
                reqwest::Client::new()
            });

        Self {
            http,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url(),
            self.config.model_name
        )
    }

    async fn call(
        &self,
        file: &UploadedFile,
        prompt_text: &str,
    ) -> Result<String, ExtractionError> {
        // 密钥在第一次真正调用时才检查
        let api_key = self.config.require_api_key()?;

        let request = build_request(file, prompt_text);

        debug!(
            "调用 Gemini API，模型: {}，文件: {} ({} 字节)",
            self.config.model_name,
            file.name,
            file.size()
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::request_failed(BACKEND_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::BadStatus {
                backend: BACKEND_NAME.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::request_failed(BACKEND_NAME, e))?;

        debug!("Gemini API 调用成功");

        response_text(body).ok_or_else(|| ExtractionError::EmptyResponse {
            backend: BACKEND_NAME.to_string(),
        })
    }
}

impl DocumentModel for GeminiClient {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn generate<'a>(
        &'a self,
        file: &'a UploadedFile,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ExtractionError>> + Send + 'a>> {
        Box::pin(self.call(file, prompt))
    }
}

fn build_request(file: &UploadedFile, prompt_text: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: file.media_type.clone(),
                        data: BASE64.encode(&file.content),
                    },
                },
                Part::Text {
                    text: prompt_text.to_string(),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: prompt::response_schema(),
            temperature: 0.0,
        },
    }
}

/// 拼接第一个候选的所有文本片段
fn response_text(response: GenerateContentResponse) -> Option<String> {
    let candidate = response.candidates.into_iter().next()?;
    let text: String = candidate
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    Some(text)
}

//! 兼容 OpenAI 的 chat completion 客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - PDF 以 `file` 内容片段发送，`file_data` 为 `data:application/pdf;base64,...`
//! - 接口不支持 responseSchema，输出约束以 JSON Schema 形式写进系统消息

use std::future::Future;
use std::pin::Pin;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartFile,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, FileObject,
    },
    Client,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::{debug, warn};

use super::DocumentModel;
use crate::config::Config;
use crate::error::ExtractionError;
use crate::models::upload::UploadedFile;
use crate::services::prompt;

const BACKEND_NAME: &str = "OpenAI-compatible";

/// 兼容 OpenAI API 的客户端
pub struct OpenAiClient {
    config: Config,
}

impl OpenAiClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    async fn call(
        &self,
        file: &UploadedFile,
        user_message: &str,
    ) -> Result<String, ExtractionError> {
        let api_key = self.config.require_api_key()?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(self.config.base_url());
        let client = Client::with_config(openai_config);

        debug!(
            "调用 LLM API，模型: {}，文件: {} ({} 字节)",
            self.config.model_name,
            file.name,
            file.size()
        );

        let system_message = system_message();
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message.as_str())
            .build()
            .map_err(|e| ExtractionError::EncodeFailed(e.to_string()))?;

        let user_msg = build_user_message(file, user_message)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(0.0)
            .max_tokens(8192u32)
            .build()
            .map_err(|e| ExtractionError::EncodeFailed(e.to_string()))?;

        let response = client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            ExtractionError::request_failed(BACKEND_NAME, e)
        })?;

        debug!("LLM API 调用成功");

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| ExtractionError::EmptyResponse {
                backend: BACKEND_NAME.to_string(),
            })
    }
}

impl DocumentModel for OpenAiClient {
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

fn system_message() -> String {
    format!(
        "You extract structured order data from documents. \
         Respond with JSON only, matching this JSON Schema:\n{}",
        prompt::json_schema()
    )
}

/// 用户消息：提示词文本 + PDF 文件片段
fn build_user_message(
    file: &UploadedFile,
    text: &str,
) -> Result<ChatCompletionRequestUserMessage, ExtractionError> {
    let content_parts = vec![
        ChatCompletionRequestUserMessageContentPart::Text(
            ChatCompletionRequestMessageContentPartText {
                text: text.to_string(),
            },
        ),
        ChatCompletionRequestUserMessageContentPart::File(
            ChatCompletionRequestMessageContentPartFile {
                file: FileObject {
                    file_data: Some(data_url(file)),
                    file_id: None,
                    filename: Some(file.name.clone()),
                },
            },
        ),
    ];

    ChatCompletionRequestUserMessageArgs::default()
        .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
        .build()
        .map_err(|e| ExtractionError::EncodeFailed(e.to_string()))
}

fn data_url(file: &UploadedFile) -> String {
    format!("data:{};base64,{}", file.media_type, BASE64.encode(&file.content))
}

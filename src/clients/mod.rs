pub mod gemini_client;
pub mod openai_client;

pub use gemini_client::GeminiClient;
pub use openai_client::OpenAiClient;

use std::future::Future;
use std::pin::Pin;

use crate::error::ExtractionError;
use crate::models::upload::UploadedFile;

/// 能读懂 PDF 的模型接口
///
/// 只负责"把文件和指令发出去、拿回文本"，不关心返回内容的含义。
pub trait DocumentModel: Send + Sync {
    /// 后端名称（用于日志和错误信息）
    fn name(&self) -> &str;

    /// 发送一个文件和提取指令，返回模型输出的原始文本
    fn generate<'a>(
        &'a self,
        file: &'a UploadedFile,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ExtractionError>> + Send + 'a>>;
}

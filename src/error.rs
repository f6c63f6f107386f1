use thiserror::Error;

/// 提取失败时展示给用户的固定提示（具体原因只写日志）
pub const GENERIC_EXTRACTION_ERROR: &str = "Failed to extract orders from this file.";

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 提取服务错误
    #[error("提取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 输入校验错误
    #[error("输入错误: {0}")]
    Validation(#[from] ValidationError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 批处理调度错误
    #[error("批处理错误: {0}")]
    Batch(#[from] BatchError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少 API 密钥
    #[error("缺少 API 密钥: 请设置环境变量 {var_name}")]
    MissingApiKey { var_name: String },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 提取服务错误
///
/// 只影响出错的那一个文件，由 workflow 层转换成 `FileOutcome`。
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 配置问题（例如缺少密钥），在第一次调用时暴露
    #[error("{0}")]
    Config(#[from] ConfigError),
    /// 网络请求失败
    #[error("{backend} 请求失败: {source}")]
    RequestFailed {
        backend: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 服务返回非 2xx 状态
    #[error("{backend} 返回错误状态 {status}: {body}")]
    BadStatus {
        backend: String,
        status: u16,
        body: String,
    },
    /// 服务没有返回任何候选内容
    #[error("{backend} 返回结果为空")]
    EmptyResponse { backend: String },
    /// 返回内容不是合法的订单 JSON
    #[error("无法解析返回内容: {source}")]
    UnparseableContent {
        #[source]
        source: serde_json::Error,
    },
    /// 构建请求失败
    #[error("构建请求失败: {0}")]
    EncodeFailed(String),
}

impl ExtractionError {
    pub fn request_failed(
        backend: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ExtractionError::RequestFailed {
            backend: backend.into(),
            source: Box::new(source),
        }
    }
}

/// 输入校验错误
#[derive(Debug, Error)]
pub enum ValidationError {
    /// 所有文件都不是 PDF
    #[error("只接受 PDF 文件，已拒绝 {} 个文件: {}", rejected.len(), rejected.join(", "))]
    NoPdfFiles { rejected: Vec<String> },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 写文件失败
    #[error("写入文件失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 生成 PDF 失败
    #[error("生成PDF失败: {0}")]
    Pdf(#[from] lopdf::Error),
    /// JSON 序列化失败
    #[error("JSON序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
    /// 没有可导出的数据
    #[error("没有可导出的订单")]
    NothingToExport,
}

/// 批处理调度错误
#[derive(Debug, Error)]
pub enum BatchError {
    /// 上一个批次尚未结束
    #[error("当前批次仍在处理中，无法提交新的批次")]
    AlreadyProcessing,
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

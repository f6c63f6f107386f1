use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// API 密钥的环境变量名（按优先级）
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// 提取服务后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Gemini 原生 generateContent 接口
    Gemini,
    /// 兼容 OpenAI 的 chat completion 接口
    #[serde(alias = "openai-compatible")]
    OpenAi,
}

impl Backend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Some(Backend::Gemini),
            "openai" | "openai-compatible" => Some(Backend::OpenAi),
            _ => None,
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Backend::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Backend::OpenAi => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }
}

/// 程序配置
///
/// 密钥在启动时不做检查，第一次调用提取服务时才通过
/// [`Config::require_api_key`] 报错。
#[derive(Clone, Debug)]
pub struct Config {
    // --- 提取服务配置 ---
    pub api_key: Option<String>,
    pub backend: Backend,
    /// 为空时使用后端的默认地址
    pub api_base_url: Option<String>,
    pub model_name: String,
    pub request_timeout_secs: u64,
    // --- 输出配置 ---
    pub output_dir: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            backend: Backend::Gemini,
            api_base_url: None,
            model_name: "gemini-2.5-flash".to_string(),
            request_timeout_secs: 120,
            output_dir: PathBuf::from("."),
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件，所有字段可选
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_key: Option<String>,
    backend: Option<Backend>,
    api_base_url: Option<String>,
    model_name: Option<String>,
    request_timeout_secs: Option<u64>,
    output_dir: Option<PathBuf>,
    verbose_logging: Option<bool>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().overlay_env()
    }

    /// 先读取 TOML 配置文件（可选），再用环境变量覆盖
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        Ok(base.overlay_env())
    }

    fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: FileConfig = toml::from_str(content)?;
        let default = Self::default();
        Ok(Self {
            api_key: file.api_key.filter(|k| !k.trim().is_empty()),
            backend: file.backend.unwrap_or(default.backend),
            api_base_url: file.api_base_url.or(default.api_base_url),
            model_name: file.model_name.unwrap_or(default.model_name),
            request_timeout_secs: file.request_timeout_secs.unwrap_or(default.request_timeout_secs),
            output_dir: file.output_dir.unwrap_or(default.output_dir),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
        })
    }

    fn overlay_env(self) -> Self {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            .or(self.api_key);
        Self {
            api_key,
            backend: std::env::var("EXTRACTION_BACKEND")
                .ok()
                .and_then(|v| Backend::parse(&v))
                .unwrap_or(self.backend),
            api_base_url: std::env::var("LLM_API_BASE_URL").ok().or(self.api_base_url),
            model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.model_name),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.request_timeout_secs),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(self.output_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.verbose_logging),
        }
    }

    /// 取出 API 密钥，不存在时返回明确的配置错误
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey {
                var_name: API_KEY_VARS[0].to_string(),
            })
    }

    pub fn base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or_else(|| self.backend.default_base_url())
            .trim_end_matches('/')
    }
}

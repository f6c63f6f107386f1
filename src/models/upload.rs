use std::path::Path;

/// PDF 的媒体类型
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// 用户选择的一个文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content: Vec<u8>,
    pub media_type: String,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        let name = name.into();
        let media_type = detect_media_type(&name, &content).to_string();
        Self {
            name,
            content,
            media_type,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// 根据文件头和扩展名推断媒体类型
///
/// 文件头 `%PDF` 或扩展名 `.pdf` 都视为 PDF。
pub fn detect_media_type(name: &str, content: &[u8]) -> &'static str {
    if content.starts_with(b"%PDF") {
        return PDF_MEDIA_TYPE;
    }

    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("pdf") => PDF_MEDIA_TYPE,
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

//! 文件处理上下文
//!
//! 封装"我正在处理批次中的第几个文件"这一信息

use std::fmt::Display;

/// 文件处理上下文
#[derive(Debug, Clone)]
pub struct FileCtx {
    /// 文件在批次中的序号（从1开始）
    pub index: usize,

    /// 批次文件总数
    pub total: usize,

    /// 文件名
    pub file_name: String,
}

impl FileCtx {
    /// 创建新的文件上下文
    pub fn new(index: usize, total: usize, file_name: impl Into<String>) -> Self {
        Self {
            index,
            total,
            file_name: file_name.into(),
        }
    }

    /// 展示给用户的进度文字
    pub fn progress_label(&self) -> String {
        format!(
            "processing file {} of {}: {}",
            self.index, self.total, self.file_name
        )
    }
}

impl Display for FileCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文件 {}/{}]", self.index, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_label() {
        let ctx = FileCtx::new(2, 5, "uber.pdf");
        assert_eq!(ctx.progress_label(), "processing file 2 of 5: uber.pdf");
        assert_eq!(ctx.to_string(), "[文件 2/5]");
    }
}

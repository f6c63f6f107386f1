use crate::error::ValidationError;
use crate::models::upload::UploadedFile;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 读取单个文件
pub async fn load_file(path: &Path) -> Result<UploadedFile, ValidationError> {
    let content = fs::read(path)
        .await
        .map_err(|source| ValidationError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(UploadedFile::new(name, content))
}

/// 按顺序读取用户选择的所有文件，只保留 PDF
pub async fn load_selected_files(paths: &[PathBuf]) -> Result<Vec<UploadedFile>, ValidationError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        tracing::debug!("正在读取: {}", path.display());
        files.push(load_file(path).await?);
    }
    accept_pdfs(files)
}

/// 过滤掉非 PDF 文件
///
/// 只要还剩下至少一个 PDF，被过滤的文件就静默丢弃；
/// 全部被过滤时返回 `ValidationError::NoPdfFiles` 通知用户。
/// 空输入原样返回空列表。
pub fn accept_pdfs(files: Vec<UploadedFile>) -> Result<Vec<UploadedFile>, ValidationError> {
    if files.is_empty() {
        return Ok(files);
    }

    let (accepted, rejected): (Vec<_>, Vec<_>) = files.into_iter().partition(|f| f.is_pdf());

    for file in &rejected {
        tracing::debug!("忽略非PDF文件: {} ({})", file.name, file.media_type);
    }

    if accepted.is_empty() {
        return Err(ValidationError::NoPdfFiles {
            rejected: rejected.into_iter().map(|f| f.name).collect(),
        });
    }

    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn pdf(name: &str) -> UploadedFile {
        UploadedFile::new(name, b"%PDF-1.4\n".to_vec())
    }

    fn text(name: &str) -> UploadedFile {
        UploadedFile::new(name, b"hello".to_vec())
    }

    #[test]
    fn test_mixed_drop_keeps_pdfs_in_order() {
        let accepted = accept_pdfs(vec![pdf("a.pdf"), text("notes.txt"), pdf("b.pdf")]).unwrap();
        let names: Vec<_> = accepted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_all_filtered_is_rejected() {
        let err = accept_pdfs(vec![text("notes.txt"), text("menu.png")]).unwrap_err();
        match err {
            ValidationError::NoPdfFiles { rejected } => {
                assert_eq!(rejected, vec!["notes.txt", "menu.png"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_selection_is_allowed() {
        assert!(accept_pdfs(Vec::new()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_selected_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let pdf_path = dir.path().join("glovo.pdf");
        let txt_path = dir.path().join("readme.txt");
        std::fs::File::create(&pdf_path)
            .unwrap()
            .write_all(b"%PDF-1.5\n%%EOF")
            .unwrap();
        std::fs::write(&txt_path, "not a pdf").unwrap();

        let files = load_selected_files(&[pdf_path, txt_path]).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "glovo.pdf");
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let result = load_selected_files(&[PathBuf::from("/definitely/not/here.pdf")]).await;
        tokio_test::assert_err!(result);
    }
}

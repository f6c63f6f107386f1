//! PDF 报表写入
//!
//! 使用 `lopdf` 直接构造文档：等宽字体（Courier）逐行输出，
//! 表格列宽靠空格对齐，超过一页自动分页。

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::ExportError;

/// A4 横向
const PAGE_WIDTH: i64 = 842;
const PAGE_HEIGHT: i64 = 595;
const MARGIN: i64 = 40;
const FONT_SIZE: i64 = 9;
const LINE_HEIGHT: i64 = 12;

/// 一行文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLine {
    pub text: String,
    pub bold: bool,
}

impl PdfLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }

    pub fn blank() -> Self {
        Self::plain("")
    }
}

/// 每页可容纳的行数
pub fn lines_per_page() -> usize {
    ((PAGE_HEIGHT - 2 * MARGIN) / LINE_HEIGHT) as usize
}

/// 每行可容纳的字符数（Courier 字宽固定为 0.6 em）
pub fn chars_per_line() -> usize {
    ((PAGE_WIDTH - 2 * MARGIN) * 1000 / (600 * FONT_SIZE)) as usize
}

/// 标准 Type1 字体只认单字节编码，WinAnsi 覆盖 Latin-1 可见字符，其余替换为 '?'
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}

fn page_content(lines: &[PdfLine]) -> Content {
    let mut operations = Vec::with_capacity(lines.len() * 5);
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        y -= LINE_HEIGHT;
        if line.text.is_empty() {
            continue;
        }
        let font = if line.bold { "F2" } else { "F1" };
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(FONT_SIZE)],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Integer(MARGIN), Object::Integer(y)],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(&line.text), StringFormat::Literal)],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    Content { operations }
}

/// 把文本行排版成 PDF 字节
pub fn render_pdf(lines: &[PdfLine]) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    // 空内容也至少输出一页
    let chunks: Vec<&[PdfLine]> = if lines.is_empty() {
        vec![lines]
    } else {
        lines.chunks(lines_per_page()).collect()
    };

    let mut page_ids: Vec<ObjectId> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let content = page_content(chunk);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
        "Count" => page_ids.len() as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH),
            Object::Integer(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|e| ExportError::Io {
        path: "<memory>".to_string(),
        source: std::io::Error::other(e.to_string()),
    })?;
    Ok(bytes)
}

//! 汇总与导出
//!
//! - `summary` - 从批次结果派生的汇总视图（纯函数）
//! - `table` - 表格数据和终端渲染
//! - `export` - 导出为 PDF / CSV / Markdown / JSON
//! - `pdf_writer` - 基于 lopdf 的分页文本 PDF

pub mod export;
pub mod pdf_writer;
pub mod summary;
pub mod table;

pub use export::{export_report, ExportDocument, ExportFormat};
pub use summary::{Crosstab, CrosstabRow, RestaurantFilter, SummaryView, TaggedRecord};
pub use table::Table;

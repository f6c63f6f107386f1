//! 报表导出
//!
//! 导出内容永远基于当前的 `SummaryView`：筛选后的订单明细、汇总表，
//! 以及一句说明当前筛选了哪些餐厅的文字。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::info;

use crate::error::ExportError;
use crate::models::order::Platform;
use crate::report::pdf_writer::{self, PdfLine};
use crate::report::summary::{SummaryView, TaggedRecord};
use crate::report::table::{crosstab_table, orders_table, Table};
use crate::utils::truncate_text;

pub const REPORT_TITLE: &str = "Order Report";
const FILE_STEM: &str = "relatorio-pedidos";
/// PDF 表格列间距，与 `Table::render_lines` 一致
const PDF_COLUMN_GAP: usize = 2;
const ELLIPSIS_LEN: usize = 3;

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Pdf,
    Csv,
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn all() -> &'static [ExportFormat] {
        &[
            ExportFormat::Pdf,
            ExportFormat::Csv,
            ExportFormat::Markdown,
            ExportFormat::Json,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Csv => "CSV",
            Self::Markdown => "Markdown",
            Self::Json => "JSON",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
            Self::Markdown => "md",
            Self::Json => "json",
        }
    }
}

/// 导出文件名：`relatorio-pedidos-YYYY-MM-DD.<ext>`
pub fn export_file_name(format: ExportFormat, date: NaiveDate) -> String {
    format!("{}-{}.{}", FILE_STEM, date.format("%Y-%m-%d"), format.extension())
}

/// 当前筛选的文字说明
pub fn filter_statement(active_filter: &[String]) -> String {
    if active_filter.is_empty() {
        "All restaurants".to_string()
    } else {
        format!("Filtered restaurants: {}", active_filter.join(", "))
    }
}

/// 所有格式共用的导出内容
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub generated_at: NaiveDateTime,
    pub filter_statement: String,
    pub orders: Table,
    pub summary: Table,
    records: Vec<TaggedRecord>,
    platforms: Vec<Platform>,
    summary_rows: Vec<JsonSummaryRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSummaryRow {
    restaurant_name: String,
    counts: BTreeMap<String, usize>,
    total: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    title: &'a str,
    generated_at: String,
    filter: &'a str,
    platforms: &'a [Platform],
    orders: &'a [TaggedRecord],
    summary: &'a [JsonSummaryRow],
}

impl ExportDocument {
    pub fn from_view(view: &SummaryView, generated_at: NaiveDateTime) -> Self {
        let summary_rows = view
            .crosstab
            .rows
            .iter()
            .map(|(restaurant, row)| JsonSummaryRow {
                restaurant_name: restaurant.clone(),
                counts: view
                    .platforms_in_view
                    .iter()
                    .map(|p| (p.name().to_string(), row.count(*p)))
                    .collect(),
                total: row.total,
            })
            .collect();

        Self {
            generated_at,
            filter_statement: filter_statement(&view.active_filter),
            orders: orders_table(view),
            summary: crosstab_table(view),
            records: view.filtered_records.clone(),
            platforms: view.platforms_in_view.clone(),
            summary_rows,
        }
    }

    fn timestamp(&self) -> String {
        self.generated_at.format("%d/%m/%Y %H:%M").to_string()
    }

    /// 开头三行为标题、生成时间和筛选说明，之后是两张表，表之间空一行
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for line in [
            REPORT_TITLE.to_string(),
            format!("Generated: {}", self.timestamp()),
            self.filter_statement.clone(),
        ] {
            out.push_str(&csv_escape(&line));
            out.push('\n');
        }
        out.push('\n');
        push_csv_table(&mut out, &self.orders);
        out.push('\n');
        push_csv_table(&mut out, &self.summary);
        out
    }

    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n\n", REPORT_TITLE);
        out.push_str(&format!("Generated: {}\n\n", self.timestamp()));
        out.push_str(&format!("{}\n\n", self.filter_statement));
        out.push_str("## Orders\n\n");
        push_markdown_table(&mut out, &self.orders);
        out.push_str("\n## Summary by restaurant\n\n");
        push_markdown_table(&mut out, &self.summary);
        out
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        let export = JsonExport {
            title: REPORT_TITLE,
            generated_at: self.generated_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            filter: &self.filter_statement,
            platforms: &self.platforms,
            orders: &self.records,
            summary: &self.summary_rows,
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    pub fn to_pdf_lines(&self) -> Vec<PdfLine> {
        let mut lines = vec![
            PdfLine::bold(REPORT_TITLE),
            PdfLine::plain(format!("Generated: {}", self.timestamp())),
            PdfLine::plain(fit_pdf_line(&self.filter_statement)),
            PdfLine::blank(),
            PdfLine::bold("Orders"),
        ];
        push_pdf_table(&mut lines, &self.orders);
        lines.push(PdfLine::blank());
        lines.push(PdfLine::bold("Summary by restaurant"));
        push_pdf_table(&mut lines, &self.summary);
        lines
    }

    /// 按格式生成文件内容
    pub fn render(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Pdf => pdf_writer::render_pdf(&self.to_pdf_lines()),
            ExportFormat::Csv => Ok(self.to_csv().into_bytes()),
            ExportFormat::Markdown => Ok(self.to_markdown().into_bytes()),
            ExportFormat::Json => Ok(self.to_json()?.into_bytes()),
        }
    }
}

fn csv_escape(s: &str) -> String {
    if s.contains('"') || s.contains(',') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn push_csv_table(out: &mut String, table: &Table) {
    let line = |cells: &[String]| {
        cells
            .iter()
            .map(|c| csv_escape(c))
            .collect::<Vec<_>>()
            .join(",")
    };
    out.push_str(&line(&table.headers));
    out.push('\n');
    for row in &table.rows {
        out.push_str(&line(row));
        out.push('\n');
    }
}

fn md_escape(s: &str) -> String {
    s.replace('|', "\\|")
}

fn push_markdown_table(out: &mut String, table: &Table) {
    let line = |cells: &[String]| {
        let cells: Vec<String> = cells.iter().map(|c| md_escape(c)).collect();
        format!("| {} |\n", cells.join(" | "))
    };
    out.push_str(&line(&table.headers));
    out.push_str(&format!("|{}\n", "---|".repeat(table.headers.len())));
    for row in &table.rows {
        out.push_str(&line(row));
    }
}

fn fit_pdf_line(text: &str) -> String {
    truncate_text(text, pdf_writer::chars_per_line().saturating_sub(ELLIPSIS_LEN))
}

/// 按列数平分一行的宽度，保证整张表不超出页面
fn pdf_cell_width(columns: usize) -> usize {
    let columns = columns.max(1);
    let budget = pdf_writer::chars_per_line().saturating_sub(PDF_COLUMN_GAP * (columns - 1));
    (budget / columns).saturating_sub(ELLIPSIS_LEN).max(1)
}

fn push_pdf_table(lines: &mut Vec<PdfLine>, table: &Table) {
    let width = pdf_cell_width(table.headers.len());
    let narrow = |cells: &[String]| -> Vec<String> {
        cells.iter().map(|c| truncate_text(c, width)).collect()
    };
    let narrowed = Table {
        headers: narrow(&table.headers),
        rows: table.rows.iter().map(|row| narrow(row)).collect(),
    };
    for (i, text) in narrowed.render_lines().into_iter().enumerate() {
        if i == 0 {
            lines.push(PdfLine::bold(text));
        } else {
            lines.push(PdfLine::plain(text));
        }
    }
}

/// 导出当前视图，返回写入的文件路径
///
/// 筛选后没有任何订单时返回 `NothingToExport`，不会生成空文件。
pub fn export_report(
    view: &SummaryView,
    format: ExportFormat,
    out_dir: &Path,
) -> Result<PathBuf, ExportError> {
    export_report_at(view, format, out_dir, Local::now().naive_local())
}

/// 同 [`export_report`]，使用给定的生成时间（文件名日期取自它）
pub fn export_report_at(
    view: &SummaryView,
    format: ExportFormat,
    out_dir: &Path,
    generated_at: NaiveDateTime,
) -> Result<PathBuf, ExportError> {
    if view.filtered_records.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let document = ExportDocument::from_view(view, generated_at);
    let bytes = document.render(format)?;

    let path = out_dir.join(export_file_name(format, generated_at.date()));
    let io_error = |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    };
    fs::create_dir_all(out_dir).map_err(io_error)?;
    fs::write(&path, bytes).map_err(io_error)?;

    info!("📄 已导出 {} 报表: {}", format.label(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderRecord;
    use crate::models::outcome::FileOutcome;
    use crate::report::summary::RestaurantFilter;

    fn order(n: &str, restaurant: &str, platform: Platform, customer: &str) -> OrderRecord {
        OrderRecord {
            order_number: n.to_string(),
            restaurant_name: restaurant.to_string(),
            date: "01/03/2024".to_string(),
            time: "12:00".to_string(),
            customer_name: customer.to_string(),
            platform,
        }
    }

    fn outcomes() -> Vec<FileOutcome> {
        vec![FileOutcome::success(
            "a.pdf",
            vec![
                order("G-1", "Almada Fórum", Platform::Glovo, "Rita, Sousa"),
                order("U-1", "Almada Fórum", Platform::UberEats, "N/A"),
                order("B-1", "Miraflores", Platform::Bolt, "Ana"),
            ],
        )]
    }

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_file_name_pattern() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(export_file_name(ExportFormat::Pdf, date), "relatorio-pedidos-2024-03-05.pdf");
        assert_eq!(
            export_file_name(ExportFormat::Markdown, date),
            "relatorio-pedidos-2024-03-05.md"
        );
    }

    #[test]
    fn test_filter_statement() {
        assert_eq!(filter_statement(&[]), "All restaurants");
        let active = vec!["Alfragide".to_string(), "Miraflores".to_string()];
        assert_eq!(filter_statement(&active), "Filtered restaurants: Alfragide, Miraflores");
    }

    #[test]
    fn test_csv_reflects_filter() {
        let filter: RestaurantFilter = ["Almada Fórum"].into_iter().collect();
        let view = SummaryView::derive(&outcomes(), &filter);
        let csv = ExportDocument::from_view(&view, generated_at()).to_csv();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Order Report");
        assert_eq!(lines[1], "Generated: 05/03/2024 14:30");
        assert_eq!(lines[2], "Filtered restaurants: Almada Fórum");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Platform,Order #,Restaurant,Date,Time,Customer");
        assert_eq!(lines[5], "Glovo,G-1,Almada Fórum,01/03/2024,12:00,\"Rita, Sousa\"");
        assert_eq!(lines[6], "Uber Eats,U-1,Almada Fórum,01/03/2024,12:00,N/A");
        assert_eq!(lines[7], "");
        assert_eq!(lines[8], "Restaurant,Uber Eats,Glovo,Total");
        assert_eq!(lines[9], "Almada Fórum,1,1,2");
        assert!(!csv.contains("Miraflores"));
    }

    #[test]
    fn test_csv_filter_statement_is_quoted() {
        let filter: RestaurantFilter = ["Almada Fórum", "Miraflores"].into_iter().collect();
        let view = SummaryView::derive(&outcomes(), &filter);
        let csv = ExportDocument::from_view(&view, generated_at()).to_csv();
        assert_eq!(
            csv.lines().nth(2),
            Some("\"Filtered restaurants: Almada Fórum, Miraflores\"")
        );

        let unfiltered = SummaryView::derive(&outcomes(), &RestaurantFilter::new());
        let csv = ExportDocument::from_view(&unfiltered, generated_at()).to_csv();
        assert_eq!(csv.lines().nth(2), Some("All restaurants"));
    }

    #[test]
    fn test_markdown_has_filter_and_tables() {
        let filter: RestaurantFilter = ["Miraflores"].into_iter().collect();
        let view = SummaryView::derive(&outcomes(), &filter);
        let md = ExportDocument::from_view(&view, generated_at()).to_markdown();

        assert!(md.starts_with("# Order Report"));
        assert!(md.contains("Generated: 05/03/2024 14:30"));
        assert!(md.contains("Filtered restaurants: Miraflores"));
        assert!(md.contains("| Bolt | B-1 | Miraflores | 01/03/2024 | 12:00 | Ana |"));
        assert!(md.contains("| Restaurant | Bolt | Total |"));
        assert!(md.contains("| Miraflores | 1 | 1 |"));
    }

    #[test]
    fn test_json_export() {
        let view = SummaryView::derive(&outcomes(), &RestaurantFilter::new());
        let json = ExportDocument::from_view(&view, generated_at()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["filter"], "All restaurants");
        assert_eq!(value["platforms"], serde_json::json!(["Uber Eats", "Glovo", "Bolt"]));
        assert_eq!(value["orders"].as_array().unwrap().len(), 3);
        assert_eq!(value["orders"][0]["sourceFile"], "a.pdf");
        assert_eq!(value["orders"][0]["orderNumber"], "G-1");
        assert_eq!(value["summary"][0]["restaurantName"], "Almada Fórum");
        assert_eq!(value["summary"][0]["counts"]["Glovo"], 1);
        assert_eq!(value["summary"][0]["counts"]["Bolt"], 0);
        assert_eq!(value["summary"][0]["total"], 2);
    }

    #[test]
    fn test_pdf_lines_layout() {
        let view = SummaryView::derive(&outcomes(), &RestaurantFilter::new());
        let lines = ExportDocument::from_view(&view, generated_at()).to_pdf_lines();

        assert_eq!(lines[0], PdfLine::bold(REPORT_TITLE));
        assert_eq!(lines[2].text, "All restaurants");
        assert!(lines[5].bold && lines[5].text.starts_with("Platform"));
        assert!(lines.iter().any(|l| l.text == "Summary by restaurant"));
    }

    #[test]
    fn test_pdf_lines_fit_page_width() {
        let long = "Restaurante com um nome absurdamente comprido, Avenida da Liberdade 245";
        let outcomes = vec![FileOutcome::success(
            "a.pdf",
            vec![
                order(&"9".repeat(40), long, Platform::Glovo, &"Maria ".repeat(10)),
                order("U-1", long, Platform::UberEats, "N/A"),
                order("B-1", "Miraflores", Platform::Bolt, "Ana"),
            ],
        )];
        let filter: RestaurantFilter = [long, "Miraflores"].into_iter().collect();
        let view = SummaryView::derive(&outcomes, &filter);
        let lines = ExportDocument::from_view(&view, generated_at()).to_pdf_lines();

        let capacity = pdf_writer::chars_per_line();
        for line in &lines {
            assert!(
                line.text.chars().count() <= capacity,
                "{} > {}: {}",
                line.text.chars().count(),
                capacity,
                line.text
            );
        }
        assert!(lines.iter().any(|l| l.text.contains("Restaurante com um")));
    }

    #[test]
    fn test_export_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let view = SummaryView::derive(&outcomes(), &RestaurantFilter::new());

        for format in ExportFormat::all() {
            let path = export_report_at(&view, *format, dir.path(), generated_at()).unwrap();
            assert!(path.exists());
            assert_eq!(
                path.file_name().unwrap().to_str().unwrap(),
                export_file_name(*format, generated_at().date())
            );
        }

        let pdf = fs::read(dir.path().join("relatorio-pedidos-2024-03-05.pdf")).unwrap();
        let doc = lopdf::Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_nothing_to_export() {
        let dir = tempfile::tempdir().unwrap();
        let filter: RestaurantFilter = ["Cascais"].into_iter().collect();
        let view = SummaryView::derive(&outcomes(), &filter);

        let result = export_report_at(&view, ExportFormat::Csv, dir.path(), generated_at());
        assert!(matches!(result, Err(ExportError::NothingToExport)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

//! 表格数据与终端渲染

use crate::models::order::Platform;
use crate::models::outcome::{FileOutcome, OutcomeStatus};
use crate::report::summary::SummaryView;

/// 一张二维文本表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 每列宽度（按字符数）
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    /// 渲染为等宽对齐的文本行（表头、分隔线、数据行）
    pub fn render_lines(&self) -> Vec<String> {
        let widths = self.column_widths();
        let format_row = |cells: &[String]| -> String {
            cells
                .iter()
                .enumerate()
                .map(|(i, cell)| pad(cell, widths[i]))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(format_row(&self.headers));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        for row in &self.rows {
            lines.push(format_row(row));
        }
        lines
    }

    pub fn render(&self) -> String {
        self.render_lines().join("\n")
    }
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{}{}", cell, " ".repeat(width.saturating_sub(len)))
}

/// 订单明细表：[平台, 订单号, 餐厅, 日期, 时间, 客户]
pub fn orders_table(view: &SummaryView) -> Table {
    let mut table = Table::new(
        ["Platform", "Order #", "Restaurant", "Date", "Time", "Customer"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    for record in &view.filtered_records {
        let order = &record.order;
        table.push(vec![
            order.platform.name().to_string(),
            order.order_number.clone(),
            order.restaurant_name.clone(),
            order.date.clone(),
            order.time.clone(),
            order.customer_name.clone(),
        ]);
    }
    table
}

/// 汇总表：[餐厅, ...当前视图中的平台, 合计]
pub fn crosstab_table(view: &SummaryView) -> Table {
    let mut headers = vec!["Restaurant".to_string()];
    headers.extend(view.platforms_in_view.iter().map(|p| p.name().to_string()));
    headers.push("Total".to_string());

    let mut table = Table::new(headers);
    for (restaurant, row) in &view.crosstab.rows {
        let mut cells = vec![restaurant.clone()];
        cells.extend(
            view.platforms_in_view
                .iter()
                .map(|p: &Platform| row.count(*p).to_string()),
        );
        cells.push(row.total.to_string());
        table.push(cells);
    }
    table
}

/// 每个文件的处理结果
pub fn outcomes_table(outcomes: &[FileOutcome]) -> Table {
    let mut table = Table::new(
        ["File", "Status", "Orders", "Message"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    for outcome in outcomes {
        let status = match outcome.status {
            OutcomeStatus::Success => "success",
            OutcomeStatus::Error => "error",
        };
        table.push(vec![
            outcome.file_name.clone(),
            status.to_string(),
            outcome.orders.len().to_string(),
            outcome.error_message.clone().unwrap_or_default(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderRecord;
    use crate::report::summary::RestaurantFilter;

    fn order(n: &str, restaurant: &str, platform: Platform) -> OrderRecord {
        OrderRecord {
            order_number: n.to_string(),
            restaurant_name: restaurant.to_string(),
            date: "01/03/2024".to_string(),
            time: "12:00".to_string(),
            customer_name: "N/A".to_string(),
            platform,
        }
    }

    fn view() -> SummaryView {
        let outcomes = vec![FileOutcome::success(
            "a.pdf",
            vec![
                order("1", "Miraflores", Platform::Bolt),
                order("2", "Almada Fórum", Platform::Glovo),
                order("3", "Almada Fórum", Platform::UberEats),
            ],
        )];
        SummaryView::derive(&outcomes, &RestaurantFilter::new())
    }

    #[test]
    fn test_crosstab_columns_follow_platform_order() {
        let table = crosstab_table(&view());
        assert_eq!(
            table.headers,
            vec!["Restaurant", "Uber Eats", "Glovo", "Bolt", "Total"]
        );
        assert_eq!(table.rows[0], vec!["Almada Fórum", "1", "1", "0", "2"]);
        assert_eq!(table.rows[1], vec!["Miraflores", "0", "0", "1", "1"]);
    }

    #[test]
    fn test_orders_table_columns() {
        let table = orders_table(&view());
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0], vec!["Bolt", "1", "Miraflores", "01/03/2024", "12:00", "N/A"]);
    }

    #[test]
    fn test_render_aligns_by_chars() {
        let mut table = Table::new(vec!["A".to_string(), "B".to_string()]);
        table.push(vec!["Fórum".to_string(), "1".to_string()]);
        let lines = table.render_lines();
        assert_eq!(lines[0], "A      B");
        assert_eq!(lines[1], "-----  -");
        assert_eq!(lines[2], "Fórum  1");
    }

    #[test]
    fn test_outcomes_table() {
        let outcomes = vec![
            FileOutcome::success("a.pdf", vec![]),
            FileOutcome::error("b.pdf", "Failed"),
        ];
        let table = outcomes_table(&outcomes);
        assert_eq!(table.rows[1], vec!["b.pdf", "error", "0", "Failed"]);
    }
}

//! 汇总视图
//!
//! 所有内容都是 `(outcomes, RestaurantFilter)` 的纯函数，每次输入变化时重新计算，
//! 不保存任何可以单独修改的派生状态。

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::models::order::{OrderRecord, Platform};
use crate::models::outcome::FileOutcome;

/// 带来源文件名的订单记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedRecord {
    pub source_file: String,
    #[serde(flatten)]
    pub order: OrderRecord,
}

/// 餐厅多选筛选，空集合表示不筛选
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestaurantFilter {
    selected: BTreeSet<String>,
}

impl RestaurantFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 选中/取消选中一个餐厅
    pub fn toggle(&mut self, restaurant: &str) {
        if !self.selected.remove(restaurant) {
            self.selected.insert(restaurant.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, restaurant: &str) -> bool {
        self.selected.contains(restaurant)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// 按字典序返回已选餐厅
    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    fn matches(&self, record: &OrderRecord) -> bool {
        self.is_empty() || self.contains(&record.restaurant_name)
    }
}

impl<S: AsRef<str>> FromIterator<S> for RestaurantFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut filter = Self::new();
        for name in iter {
            filter.toggle(name.as_ref());
        }
        filter
    }
}

/// 一行汇总：每个平台的订单数和合计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrosstabRow {
    pub counts: BTreeMap<Platform, usize>,
    pub total: usize,
}

impl CrosstabRow {
    pub fn count(&self, platform: Platform) -> usize {
        self.counts.get(&platform).copied().unwrap_or_default()
    }
}

/// 餐厅 × 平台 的订单数交叉表
///
/// 只包含筛选后确实有订单的餐厅。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Crosstab {
    pub rows: BTreeMap<String, CrosstabRow>,
}

impl Crosstab {
    pub fn build<'a>(records: impl IntoIterator<Item = &'a OrderRecord>) -> Self {
        let mut rows: BTreeMap<String, CrosstabRow> = BTreeMap::new();
        for record in records {
            let row = rows.entry(record.restaurant_name.clone()).or_default();
            *row.counts.entry(record.platform).or_default() += 1;
            row.total += 1;
        }
        Self { rows }
    }

    pub fn row(&self, restaurant: &str) -> Option<&CrosstabRow> {
        self.rows.get(restaurant)
    }

    pub fn grand_total(&self) -> usize {
        self.rows.values().map(|r| r.total).sum()
    }

    /// 某个平台在所有餐厅中的订单合计
    pub fn platform_total(&self, platform: Platform) -> usize {
        self.rows.values().map(|r| r.count(platform)).sum()
    }
}

/// 所有成功结果中的订单，按结果顺序、记录顺序展开
pub fn all_records(outcomes: &[FileOutcome]) -> Vec<TaggedRecord> {
    outcomes
        .iter()
        .filter(|o| o.is_success())
        .flat_map(|o| {
            o.orders.iter().map(move |order| TaggedRecord {
                source_file: o.file_name.clone(),
                order: order.clone(),
            })
        })
        .collect()
}

/// 去重后按字典序排列的餐厅名
pub fn distinct_restaurants(records: &[TaggedRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.order.restaurant_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 按餐厅筛选，保持原有顺序
pub fn filter_records(records: &[TaggedRecord], filter: &RestaurantFilter) -> Vec<TaggedRecord> {
    records
        .iter()
        .filter(|r| filter.matches(&r.order))
        .cloned()
        .collect()
}

/// 当前视图中出现的平台：先按固定优先顺序（Uber Eats, Glovo, Bolt），其余按名称字典序
pub fn platforms_in_view<'a>(records: impl IntoIterator<Item = &'a OrderRecord>) -> Vec<Platform> {
    let mut platforms: Vec<Platform> = records
        .into_iter()
        .map(|r| r.platform)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    platforms.sort_by(|a, b| {
        a.priority_rank()
            .cmp(&b.priority_rank())
            .then_with(|| a.name().cmp(b.name()))
    });
    platforms
}

/// 完整的汇总视图
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub all_records: Vec<TaggedRecord>,
    pub distinct_restaurants: Vec<String>,
    pub filtered_records: Vec<TaggedRecord>,
    pub platforms_in_view: Vec<Platform>,
    pub crosstab: Crosstab,
    /// 当前生效的筛选（字典序）
    pub active_filter: Vec<String>,
}

impl SummaryView {
    pub fn derive(outcomes: &[FileOutcome], filter: &RestaurantFilter) -> Self {
        let all_records = all_records(outcomes);
        let distinct_restaurants = distinct_restaurants(&all_records);
        let filtered_records = filter_records(&all_records, filter);
        let platforms_in_view = platforms_in_view(filtered_records.iter().map(|r| &r.order));
        let crosstab = Crosstab::build(filtered_records.iter().map(|r| &r.order));

        Self {
            all_records,
            distinct_restaurants,
            filtered_records,
            platforms_in_view,
            crosstab,
            active_filter: filter.selected().map(str::to_string).collect(),
        }
    }

    /// 没有任何成功记录时不显示汇总
    pub fn has_records(&self) -> bool {
        !self.all_records.is_empty()
    }

    pub fn is_filtered(&self) -> bool {
        !self.active_filter.is_empty()
    }
}

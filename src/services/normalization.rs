//! 本地规范化规则
//!
//! 这些规则同时写在提示词里交给模型执行，这里在解析后再执行一遍，
//! 对已经规范化的结果不做任何改变。

use chrono::{Duration, NaiveDate};

use crate::models::order::{OrderRecord, NOT_AVAILABLE};

/// 规范化后日期的输出格式
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// 餐厅名称规则表，按顺序匹配，第一条命中的规则生效
pub const RESTAURANT_RULES: &[(&[&str], &str)] = &[
    (&["Infante Santo"], "Inf Santo"),
    (&["Sérgio Malpique", "Almada"], "Almada Fórum"),
    (&["Fernão Lopes", "Miraflores"], "Miraflores"),
    (&["Cavaleiros", "Alfragide"], "Alfragide"),
    (&["Duarte Pacheco", "Amoreiras"], "Amoreiras"),
];

const TODAY_WORDS: [&str; 2] = ["today", "hoje"];
const YESTERDAY_WORDS: [&str; 2] = ["yesterday", "ontem"];

/// 将原始地址/分店文本映射为标准餐厅名，未命中任何规则时原样返回
///
/// 关键词不区分大小写，但必须以完整单词出现（"Salmadas" 不算 "Almada"）。
pub fn normalize_restaurant(raw: &str) -> String {
    let raw_lower = raw.to_lowercase();
    for (markers, canonical) in RESTAURANT_RULES {
        if markers
            .iter()
            .any(|marker| contains_word(&raw_lower, &marker.to_lowercase()))
        {
            return (*canonical).to_string();
        }
    }
    raw.to_string()
}

/// `needle` 在 `haystack` 中出现，且前后都不紧挨字母或数字
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// 把 "Today"/"Yesterday"（以及葡语 "Hoje"/"Ontem"）解析为绝对日期
///
/// 相对词可能带时间等后缀（例如 "Today, 13:45"），只看开头的单词。
/// 不是相对日期时原样返回。
pub fn resolve_relative_date(raw: &str, header_date: NaiveDate) -> String {
    let trimmed = raw.trim();
    let first_word = trimmed
        .split(|c: char| !c.is_alphabetic())
        .next()
        .unwrap_or_default()
        .to_lowercase();

    if TODAY_WORDS.contains(&first_word.as_str()) {
        return header_date.format(DATE_FORMAT).to_string();
    }
    if YESTERDAY_WORDS.contains(&first_word.as_str()) {
        return (header_date - Duration::days(1)).format(DATE_FORMAT).to_string();
    }
    trimmed.to_string()
}

/// 对模型返回的一条记录执行全部本地规则
pub fn normalize_record(record: OrderRecord, header_date: NaiveDate) -> OrderRecord {
    let customer_name = if record.customer_name.trim().is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        record.customer_name.trim().to_string()
    };

    OrderRecord {
        order_number: record.order_number.trim().to_string(),
        restaurant_name: normalize_restaurant(record.restaurant_name.trim()),
        date: resolve_relative_date(&record.date, header_date),
        time: record.time.trim().to_string(),
        customer_name,
        platform: record.platform,
    }
}

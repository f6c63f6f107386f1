//! 文档页眉日期
//!
//! 打印出来的订单历史页面在页眉里带有打印日期，
//! "Today"/"Yesterday" 这类相对日期都以它为基准。

use chrono::NaiveDate;
use lopdf::Document;
use phf::phf_map;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// 英文/葡萄牙文月份名（小写，含缩写）
static MONTHS: phf::Map<&'static str, u32> = phf_map! {
    "jan" => 1, "january" => 1, "janeiro" => 1,
    "feb" => 2, "february" => 2, "fev" => 2, "fevereiro" => 2,
    "mar" => 3, "march" => 3, "março" => 3, "marco" => 3,
    "apr" => 4, "april" => 4, "abr" => 4, "abril" => 4,
    "may" => 5, "mai" => 5, "maio" => 5,
    "jun" => 6, "june" => 6, "junho" => 6,
    "jul" => 7, "july" => 7, "julho" => 7,
    "aug" => 8, "august" => 8, "ago" => 8, "agosto" => 8,
    "sep" => 9, "sept" => 9, "september" => 9, "set" => 9, "setembro" => 9,
    "oct" => 10, "october" => 10, "out" => 10, "outubro" => 10,
    "nov" => 11, "november" => 11, "novembro" => 11,
    "dec" => 12, "december" => 12, "dez" => 12, "dezembro" => 12,
};

fn numeric_dmy() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,2})[/.-](\d{1,2})[/.-](\d{4})\b").ok())
        .as_ref()
}

fn numeric_ymd() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").ok())
        .as_ref()
}

fn textual() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2})(?:\s+de)?\s+([a-zç]{3,9})\.?(?:\s+de)?,?\s+(\d{4})\b").ok()
    })
    .as_ref()
}

/// 在文本中查找第一个可以识别的日期
///
/// 支持 `dd/mm/yyyy`、`dd-mm-yyyy`、`dd.mm.yyyy`、`yyyy-mm-dd`，
/// 以及 `1 March 2024`、`1 de março de 2024` 这样的写法。
/// 多种写法同时存在时取在文本中出现最早的那个。
pub fn find_date_in_text(text: &str) -> Option<NaiveDate> {
    let mut candidates: Vec<(usize, NaiveDate)> = Vec::new();

    for caps in numeric_ymd()?.captures_iter(text) {
        if let Some(date) = ymd(&caps[1], &caps[2], &caps[3]) {
            candidates.push((caps.get(0).map_or(0, |m| m.start()), date));
        }
    }

    for caps in numeric_dmy()?.captures_iter(text) {
        if let Some(date) = ymd(&caps[3], &caps[2], &caps[1]) {
            candidates.push((caps.get(0).map_or(0, |m| m.start()), date));
        }
    }

    for caps in textual()?.captures_iter(text) {
        let month_name = caps[2].to_lowercase();
        if let Some(month) = MONTHS.get(month_name.as_str()) {
            let date = caps[3]
                .parse::<i32>()
                .ok()
                .zip(caps[1].parse::<u32>().ok())
                .and_then(|(year, day)| NaiveDate::from_ymd_opt(year, *month, day));
            if let Some(date) = date {
                candidates.push((caps.get(0).map_or(0, |m| m.start()), date));
            }
        }
    }

    candidates.into_iter().min_by_key(|(pos, _)| *pos).map(|(_, date)| date)
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// 从 PDF 第一页文本中读取页眉日期
///
/// PDF 无法在本地解析（扫描件、加密等）时返回 `None`，不视为错误。
pub fn header_date_from_pdf(content: &[u8]) -> Option<NaiveDate> {
    let document = match Document::load_mem(content) {
        Ok(document) => document,
        Err(e) => {
            debug!("本地无法解析PDF，跳过页眉日期识别: {}", e);
            return None;
        }
    };

    let text = match document.extract_text(&[1]) {
        Ok(text) => text,
        Err(e) => {
            debug!("无法提取第一页文本: {}", e);
            return None;
        }
    };

    let date = find_date_in_text(&text);
    debug!("页眉日期: {:?}", date);
    date
}

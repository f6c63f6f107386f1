//! 提取提示词与结构化输出 schema

use serde_json::{json, Value as JsonValue};

use super::normalization::RESTAURANT_RULES;

/// 必填字段（customerName 可选）
pub const REQUIRED_FIELDS: [&str; 5] =
    ["orderNumber", "restaurantName", "date", "time", "platform"];

/// 平台的可选值
pub const PLATFORM_VALUES: [&str; 4] = ["Glovo", "Uber Eats", "Bolt", "Unknown"];

/// 构建发送给模型的提取指令
pub fn build_extraction_prompt() -> String {
    let rules = RESTAURANT_RULES
        .iter()
        .enumerate()
        .map(|(i, (markers, canonical))| {
            let quoted: Vec<String> = markers.iter().map(|m| format!("\"{}\"", m)).collect();
            format!(
                "  {}. If it contains the word {} -> \"{}\"",
                i + 1,
                quoted.join(" or "),
                canonical
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are reading a printed order-history report from a food delivery platform.
Extract EVERY order listed in the document and return them as a JSON array.

For each order return:
- orderNumber: the order identifier exactly as printed.
- restaurantName: the store/branch the order belongs to, normalized with the rules below.
- date: the absolute calendar date of the order. The report header shows the date the page
  was printed; resolve relative references such as "Today"/"Hoje" or "Yesterday"/"Ontem"
  against that header date. Never return a relative word.
- time: the order time (HH:MM).
- customerName: the customer name if printed, otherwise "N/A".
- platform: exactly one of {platforms}, based on the platform that produced the report.

Restaurant name rules (check in this order, the first rule that matches wins):
{rules}
  Otherwise keep the name exactly as printed.

If the document contains no orders, return an empty array [].
Return only the JSON array, without commentary or Markdown."#,
        platforms = PLATFORM_VALUES
            .iter()
            .map(|p| format!("\"{}\"", p))
            .collect::<Vec<_>>()
            .join(", "),
        rules = rules,
    )
}

/// Gemini `responseSchema` 格式的输出约束
pub fn response_schema() -> JsonValue {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "orderNumber": { "type": "STRING" },
                "restaurantName": { "type": "STRING" },
                "date": { "type": "STRING" },
                "time": { "type": "STRING" },
                "customerName": { "type": "STRING", "nullable": true },
                "platform": { "type": "STRING", "enum": PLATFORM_VALUES },
            },
            "required": REQUIRED_FIELDS,
        }
    })
}

/// 同样的约束，使用 JSON Schema 写法（给不支持 responseSchema 的接口放进提示词）
pub fn json_schema() -> JsonValue {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "orderNumber": { "type": "string" },
                "restaurantName": { "type": "string" },
                "date": { "type": "string" },
                "time": { "type": "string" },
                "customerName": { "type": ["string", "null"] },
                "platform": { "type": "string", "enum": PLATFORM_VALUES },
            },
            "required": REQUIRED_FIELDS,
        }
    })
}

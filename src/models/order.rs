use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 缺失客户名时的默认值
pub const NOT_AVAILABLE: &str = "N/A";

/// 外卖平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    Glovo,
    UberEats,
    Bolt,
    Unknown,
}

impl Platform {
    /// 汇总表列的固定优先顺序
    pub const PRIORITY: [Platform; 3] = [Platform::UberEats, Platform::Glovo, Platform::Bolt];

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Platform::Glovo => "Glovo",
            Platform::UberEats => "Uber Eats",
            Platform::Bolt => "Bolt",
            Platform::Unknown => "Unknown",
        }
    }

    /// 尝试从字符串解析平台（精确匹配标准名称）
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "Glovo" => Some(Platform::Glovo),
            "Uber Eats" => Some(Platform::UberEats),
            "Bolt" => Some(Platform::Bolt),
            "Unknown" => Some(Platform::Unknown),
            _ => None,
        }
    }

    /// 从任意文本识别平台，识别不出时归为 `Unknown`
    pub fn classify(s: &str) -> Self {
        if let Some(platform) = Self::from_name(s.trim()) {
            return platform;
        }

        let s_lower = s.to_lowercase();
        if s_lower.contains("glovo") {
            return Platform::Glovo;
        }
        if s_lower.contains("uber") {
            return Platform::UberEats;
        }
        if s_lower.contains("bolt") {
            return Platform::Bolt;
        }

        Platform::Unknown
    }

    /// 在汇总表列顺序中的位置，不在优先列表中的排在最后
    pub fn priority_rank(self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|p| *p == self)
            .unwrap_or(Self::PRIORITY.len())
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Platform::classify(&raw))
    }
}

/// 一条订单记录，提取完成后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_number: String,
    pub restaurant_name: String,
    pub date: String,
    pub time: String,
    #[serde(default = "not_available", deserialize_with = "deserialize_customer_name")]
    pub customer_name: String,
    pub platform: Platform,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// 客户名可能缺失、为 null 或为空串，统一为 "N/A"
fn deserialize_customer_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(not_available))
}

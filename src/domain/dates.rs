// ==========================================
// 工厂管理系统 - 日期格式
// ==========================================
// 存储/输出: ISO 本地时间 `YYYY-MM-DDTHH:MM:SS`
// 输入: 兼容 RFC3339、带小数秒、空格分隔与纯日期
// ==========================================

use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 格式化为存储格式
pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// 解析单据日期
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// 解析列表过滤用的日期（stringDate）
///
/// 接受 `YYYY-MM-DD`、完整时间戳以及 `M/D/YYYY`
pub fn parse_filter_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Some(dt) = parse_datetime(value) {
        return Some(dt.date());
    }
    let head = value.split_whitespace().next().unwrap_or_default();
    NaiveDate::parse_from_str(head, "%m/%d/%Y").ok()
}

/// serde 适配：单据日期字段
pub mod iso_datetime {
    use super::{format_datetime, parse_datetime};
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_datetime(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_datetime(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid date: {}", raw)))
    }
}

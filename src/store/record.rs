// ==========================================
// 出口单证工作台 - 记录字段取值辅助
// ==========================================
// 实体库记录是松散类型的键值对,规范化层统一经由这里取值
// 约定: 缺失或类型不符时退化为零值,不报错
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::store::Record;

/// 取字符串字段 (数字自动转为字符串)
pub fn get_str(record: &Record, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 取字符串字段,缺失时为空串
pub fn get_string(record: &Record, key: &str) -> String {
    get_str(record, key).unwrap_or_default()
}

/// 取非空字符串字段 (空白视为缺失)
pub fn get_nonempty(record: &Record, key: &str) -> Option<String> {
    get_str(record, key).filter(|s| !s.trim().is_empty())
}

/// 取数值字段 (数字字符串自动解析),缺失时为 0
pub fn get_f64(record: &Record, key: &str) -> f64 {
    opt_f64(record, key).unwrap_or(0.0)
}

/// 取数值字段,缺失时为 None
pub fn opt_f64(record: &Record, key: &str) -> Option<f64> {
    match record.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// 取整数字段,缺失时为 0
pub fn get_i32(record: &Record, key: &str) -> i32 {
    match record.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) as i32,
        Some(Value::String(s)) => s.trim().parse::<i32>().unwrap_or(0),
        _ => 0,
    }
}

/// 取布尔字段 ("1"/"true"/"Y" 均视为真),缺失时为假
pub fn get_bool(record: &Record, key: &str) -> bool {
    match record.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Some(Value::String(s)) => {
            matches!(s.trim().to_uppercase().as_str(), "1" | "TRUE" | "Y" | "YES")
        }
        _ => false,
    }
}

/// 取日期字段 (ISO 格式,取前 10 位)
pub fn get_date(record: &Record, key: &str) -> Option<NaiveDate> {
    let s = get_str(record, key)?;
    let head = s.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// 取时间戳字段 (RFC3339)
pub fn get_datetime(record: &Record, key: &str) -> Option<DateTime<Utc>> {
    let s = get_str(record, key)?;
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// 取字符串列表字段 (JSON 数组或逗号分隔字符串)
pub fn get_str_list(record: &Record, key: &str) -> Vec<String> {
    match record.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// 从 JSON 对象构造记录 (非对象时为空记录)
pub fn record_from(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Record {
        record_from(json!({
            "name": "ACME",
            "qty": 12.5,
            "qtyStr": "7.25",
            "flag": "Y",
            "shipDate": "2026-03-15T00:00:00Z",
            "hidden": ["a", "b"],
            "csv": "x, y ,z",
        }))
    }

    #[test]
    fn test_string_and_number_coercion() {
        let rec = sample();
        assert_eq!(get_string(&rec, "name"), "ACME");
        assert_eq!(get_f64(&rec, "qty"), 12.5);
        assert_eq!(get_f64(&rec, "qtyStr"), 7.25);
        assert_eq!(get_f64(&rec, "missing"), 0.0);
    }

    #[test]
    fn test_bool_spellings() {
        let rec = sample();
        assert!(get_bool(&rec, "flag"));
        assert!(!get_bool(&rec, "missing"));
    }

    #[test]
    fn test_date_prefix_parse() {
        let rec = sample();
        let date = get_date(&rec, "shipDate").unwrap();
        assert_eq!(date.to_string(), "2026-03-15");
    }

    #[test]
    fn test_list_from_array_and_csv() {
        let rec = sample();
        assert_eq!(get_str_list(&rec, "hidden"), vec!["a", "b"]);
        assert_eq!(get_str_list(&rec, "csv"), vec!["x", "y", "z"]);
    }
}

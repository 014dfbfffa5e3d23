// ==========================================
// 出口单证工作台 - 实体库查询构造
// ==========================================
// 过滤/裁剪/排序/分页的统一表达,后端适配器各自翻译
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Record;

// ==========================================
// SortDir - 排序方向
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDir {
    Asc,
    Desc,
}

// ==========================================
// Query - 查询描述
// ==========================================
// 过滤仅支持字段等值匹配,覆盖本系统全部查询场景
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    pub filter: Vec<(String, Value)>,         // 等值过滤子句 (AND 语义)
    pub select: Vec<String>,                  // 字段裁剪 (空 = 全部)
    pub order_by: Vec<(String, SortDir)>,     // 排序键
    pub page_size: Option<usize>,             // 页大小 (None = 后端默认)
    pub cursor: Option<String>,               // 续页游标
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    /// 追加等值过滤子句
    pub fn eq<V: Into<Value>>(mut self, field: &str, value: V) -> Self {
        self.filter.push((field.to_string(), value.into()));
        self
    }

    /// 字段裁剪
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// 升序排序键
    pub fn order_asc(mut self, field: &str) -> Self {
        self.order_by.push((field.to_string(), SortDir::Asc));
        self
    }

    /// 降序排序键
    pub fn order_desc(mut self, field: &str) -> Self {
        self.order_by.push((field.to_string(), SortDir::Desc));
        self
    }

    /// 页大小
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// 记录是否满足全部过滤子句
    pub fn matches(&self, record: &Record) -> bool {
        self.filter.iter().all(|(field, expected)| {
            record.get(field).map(|v| v == expected).unwrap_or(false)
        })
    }
}

// ==========================================
// Page - 单页查询结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub records: Vec<Record>,        // 本页记录
    pub next_cursor: Option<String>, // 续页游标 (None = 最后一页)
}

// ==========================================
// 出口单证工作台 - 海关编码解析器
// ==========================================
// 职责: 规范化物料号并映射到税则编码
// 红线: 无匹配不报错,行上已有编码保持不动 (预期内的数据缺口)
// ==========================================

use crate::domain::feeds::HsCodeEntry;
use crate::domain::line_item::LineItem;
use std::collections::HashMap;

// ==========================================
// HsCodeResolver - 海关编码解析器
// ==========================================
// 会话加载时从编码表整表构建一次
pub struct HsCodeResolver {
    index: HashMap<String, HsCodeEntry>,
}

impl HsCodeResolver {
    /// 从编码表构建索引: 原始键与规范化键都可命中,原始键优先
    pub fn from_entries(entries: Vec<HsCodeEntry>) -> Self {
        let mut index: HashMap<String, HsCodeEntry> = HashMap::new();
        for entry in entries {
            let normalized = Self::normalize_item_no(&entry.item_no);
            if normalized != entry.item_no {
                index.entry(normalized).or_insert_with(|| entry.clone());
            }
            index.insert(entry.item_no.clone(), entry);
        }
        Self { index }
    }

    /// 规范化物料号: 去千分位分隔符与首尾空白
    pub fn normalize_item_no(raw: &str) -> String {
        raw.trim().replace(',', "")
    }

    /// 解析物料号: 先按原始键,再按规范化键
    pub fn resolve(&self, item_code: &str) -> Option<&HsCodeEntry> {
        if let Some(entry) = self.index.get(item_code) {
            return Some(entry);
        }
        self.index.get(&Self::normalize_item_no(item_code))
    }

    /// 把解析结果写到行上; 无匹配时行保持不动
    ///
    /// # 返回
    /// - true: 命中并写入
    /// - false: 无匹配 (不是错误)
    pub fn apply(&self, row: &mut LineItem) -> bool {
        match self.resolve(&row.item_no) {
            Some(entry) => {
                row.hs_code = Some(entry.hs_code.clone());
                true
            }
            None => false,
        }
    }

    /// 索引条目数
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(item_no: &str, hs_code: &str) -> HsCodeEntry {
        HsCodeEntry {
            item_no: item_no.to_string(),
            hs_code: hs_code.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_raw_key_lookup() {
        let resolver = HsCodeResolver::from_entries(vec![entry("10001", "2710.19")]);
        assert_eq!(resolver.resolve("10001").map(|e| e.hs_code.as_str()), Some("2710.19"));
    }

    #[test]
    fn test_normalized_key_lookup() {
        // 编码表里的物料号带千分位,查询键不带
        let resolver = HsCodeResolver::from_entries(vec![entry("10,001", "2710.19")]);
        assert_eq!(resolver.resolve("10001").map(|e| e.hs_code.as_str()), Some("2710.19"));
    }

    #[test]
    fn test_no_match_leaves_row_untouched() {
        let resolver = HsCodeResolver::from_entries(vec![entry("10001", "2710.19")]);
        let mut row = LineItem::new("SH-01", "SO1", "99999");
        row.hs_code = Some("3403.99".to_string());
        let hit = resolver.apply(&mut row);
        assert!(!hit);
        assert_eq!(row.hs_code.as_deref(), Some("3403.99"));
    }

    #[test]
    fn test_match_overwrites_row() {
        let resolver = HsCodeResolver::from_entries(vec![entry("10001", "2710.19")]);
        let mut row = LineItem::new("SH-01", "SO1", "10001");
        assert!(resolver.apply(&mut row));
        assert_eq!(row.hs_code.as_deref(), Some("2710.19"));
    }
}

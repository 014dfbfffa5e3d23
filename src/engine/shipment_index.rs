// ==========================================
// 出口单证工作台 - 历史装运索引构建器
// ==========================================
// 职责: 历史装运记录 → 按 (订单, 物料) 分组的柜号/封号建议
// 红线: 只给建议,不自动套用到行上
// ==========================================

use crate::domain::feeds::ShippedOrder;
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::instrument;

// ==========================================
// ContainerSuggestion - 柜号建议项
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSuggestion {
    pub token: String, // 柜号令牌 (写回行的值)
    pub label: String, // 下拉显示文本 (带交货单号上下文)
}

// ==========================================
// ShipmentIndex - 历史装运索引
// ==========================================
// 构建时完成分组与排序,查询只做去重投影
pub struct ShipmentIndex {
    groups: HashMap<(String, String), Vec<IndexedRecord>>,
}

#[derive(Debug, Clone)]
struct IndexedRecord {
    token: String,
    delivery_note: Option<String>,
    sort_key: DateTime<Utc>,
}

impl ShipmentIndex {
    /// 从历史装运记录构建索引
    ///
    /// 规则:
    /// - 订单号或物料号缺失的记录跳过
    /// - 令牌 = 原始柜号字段首个 "/" 之前的部分 + 封号; 两者皆空则跳过
    /// - 组内按装运日期倒序,缺日期时以创建时间代替
    #[instrument(skip(records), fields(count = records.len()))]
    pub fn build(records: &[ShippedOrder]) -> Self {
        let mut groups: HashMap<(String, String), Vec<IndexedRecord>> = HashMap::new();

        for record in records {
            let (order_no, item_no) = match (&record.order_no, &record.item_no) {
                (Some(o), Some(i)) if !o.trim().is_empty() && !i.trim().is_empty() => {
                    (o.trim().to_string(), i.trim().to_string())
                }
                _ => continue,
            };
            let token = match container_token(record) {
                Some(token) => token,
                None => continue,
            };
            groups.entry((order_no, item_no)).or_default().push(IndexedRecord {
                token,
                delivery_note: record.delivery_note.clone(),
                sort_key: sort_key(record),
            });
        }

        for members in groups.values_mut() {
            members.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));
        }

        tracing::debug!(groups = groups.len(), "历史装运索引构建完成");
        Self { groups }
    }

    /// 某 (订单, 物料) 的柜号建议,最近在前,按令牌去重
    pub fn suggestions(&self, order_no: &str, item_no: &str) -> Vec<ContainerSuggestion> {
        let key = (order_no.trim().to_string(), item_no.trim().to_string());
        let mut seen: HashSet<&str> = HashSet::new();
        let mut options = Vec::new();
        if let Some(members) = self.groups.get(&key) {
            for member in members {
                if !seen.insert(member.token.as_str()) {
                    continue;
                }
                let label = match &member.delivery_note {
                    Some(note) if !note.trim().is_empty() => {
                        format!("{} ({})", member.token, note.trim())
                    }
                    _ => member.token.clone(),
                };
                options.push(ContainerSuggestion {
                    token: member.token.clone(),
                    label,
                });
            }
        }
        options
    }

    /// 分组数
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// 柜号令牌: 原始柜号首个 "/" 之前的部分与封号拼接
///
/// 两部分皆空 ⇒ None (记录不可用)
pub fn container_token(record: &ShippedOrder) -> Option<String> {
    let head = record
        .container_id
        .as_deref()
        .and_then(|raw| raw.split('/').next())
        .map(|part| part.trim())
        .filter(|part| !part.is_empty());
    let seal = record
        .seal_no
        .as_deref()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());

    match (head, seal) {
        (Some(h), Some(s)) => Some(format!("{} / {}", h, s)),
        (Some(h), None) => Some(h.to_string()),
        (None, Some(s)) => Some(s.to_string()),
        (None, None) => None,
    }
}

/// 排序键: 装运日期 (按当日零点),缺失时退回创建时间,再缺退回纪元起点
fn sort_key(record: &ShippedOrder) -> DateTime<Utc> {
    if let Some(date) = record.ship_date {
        let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap_or_default();
        return DateTime::from_naive_utc_and_offset(date.and_time(midnight), Utc);
    }
    record.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(
        order: &str,
        item: &str,
        container: Option<&str>,
        seal: Option<&str>,
        ship_date: Option<&str>,
    ) -> ShippedOrder {
        ShippedOrder {
            order_no: Some(order.to_string()),
            item_no: Some(item.to_string()),
            delivery_note: Some("DN-7".to_string()),
            ship_date: ship_date.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
            container_id: container.map(|s| s.to_string()),
            seal_no: seal.map(|s| s.to_string()),
            created_at: None,
        }
    }

    #[test]
    fn test_token_takes_head_before_slash() {
        let rec = record("SO1", "I1", Some("TCLU-1/40FT"), Some("SEAL9"), None);
        assert_eq!(container_token(&rec).as_deref(), Some("TCLU-1 / SEAL9"));
    }

    #[test]
    fn test_unusable_records_skipped() {
        let records = vec![
            record("SO1", "I1", None, None, Some("2026-01-10")),
            ShippedOrder {
                order_no: None,
                ..record("SO1", "I1", Some("TCLU-2"), None, Some("2026-01-11"))
            },
        ];
        let index = ShipmentIndex::build(&records);
        assert_eq!(index.group_count(), 0);
    }

    #[test]
    fn test_most_recent_first_and_dedup() {
        let records = vec![
            record("SO1", "I1", Some("OLD-1"), None, Some("2026-01-01")),
            record("SO1", "I1", Some("NEW-1"), None, Some("2026-02-01")),
            record("SO1", "I1", Some("NEW-1"), None, Some("2026-01-15")),
        ];
        let index = ShipmentIndex::build(&records);
        let options = index.suggestions("SO1", "I1");
        let tokens: Vec<&str> = options.iter().map(|o| o.token.as_str()).collect();
        assert_eq!(tokens, vec!["NEW-1", "OLD-1"]);
    }

    #[test]
    fn test_created_at_fallback_ordering() {
        let mut early = record("SO1", "I1", Some("EARLY"), None, None);
        early.created_at = Some(DateTime::parse_from_rfc3339("2026-01-01T08:00:00Z")
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default());
        let mut late = record("SO1", "I1", Some("LATE"), None, None);
        late.created_at = Some(DateTime::parse_from_rfc3339("2026-03-01T08:00:00Z")
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default());

        let index = ShipmentIndex::build(&[early, late]);
        let tokens: Vec<String> = index
            .suggestions("SO1", "I1")
            .into_iter()
            .map(|o| o.token)
            .collect();
        assert_eq!(tokens, vec!["LATE", "EARLY"]);
    }

    #[test]
    fn test_suggestions_isolated_per_group() {
        let records = vec![
            record("SO1", "I1", Some("A"), None, Some("2026-01-01")),
            record("SO2", "I1", Some("B"), None, Some("2026-01-01")),
        ];
        let index = ShipmentIndex::build(&records);
        assert_eq!(index.suggestions("SO1", "I1").len(), 1);
        assert_eq!(index.suggestions("SO2", "I1")[0].token, "B");
        assert!(index.suggestions("SO3", "I1").is_empty());
    }
}

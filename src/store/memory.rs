// ==========================================
// 出口单证工作台 - 内存实体库
// ==========================================
// 职责: EntityStore 契约的进程内参考实现
// 用途: 集成测试与演示夹具; 生产后端由部署方适配
// ==========================================

use std::collections::{HashMap, HashSet};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::store::query::{Page, Query, SortDir};
use crate::store::{EntityKind, EntityStore, Record, StoreError, VerificationTokenProvider};

// ==========================================
// MemoryStore
// ==========================================
// 行为开关模拟真实后端的边角: 创建响应缺 ID、写入失败
pub struct MemoryStore {
    collections: Mutex<HashMap<EntityKind, Vec<Record>>>,
    id_seq: AtomicU64,
    write_count: AtomicU64,

    // ===== 行为开关 (测试注入) =====
    omit_id_kinds: Mutex<HashSet<EntityKind>>, // 创建成功但响应不带 ID
    vanish_kinds: Mutex<HashSet<EntityKind>>,  // 创建响应不带 ID 且读不到 (复制延迟)
    poisoned_ids: Mutex<HashSet<String>>,      // 写操作直接失败的记录

    // ===== 防伪令牌 =====
    token_provider: Mutex<Option<Arc<dyn VerificationTokenProvider>>>,
    tokens_attached: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            collections: Mutex::new(HashMap::new()),
            id_seq: AtomicU64::new(1),
            write_count: AtomicU64::new(0),
            omit_id_kinds: Mutex::new(HashSet::new()),
            vanish_kinds: Mutex::new(HashSet::new()),
            poisoned_ids: Mutex::new(HashSet::new()),
            token_provider: Mutex::new(None),
            tokens_attached: AtomicU64::new(0),
        }
    }

    /// 预置记录,缺 ID 时自动分配; 返回记录 ID
    pub fn seed(&self, kind: EntityKind, mut record: Record) -> String {
        let id = match record.get("id").and_then(|v| v.as_str()) {
            Some(existing) if !existing.is_empty() => existing.to_string(),
            _ => {
                let id = self.next_id(kind);
                record.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };
        record
            .entry("createdAt".to_string())
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        if let Ok(mut map) = self.collections.lock() {
            map.entry(kind).or_default().push(record);
        }
        id
    }

    /// 批量预置
    pub fn seed_many(&self, kind: EntityKind, records: Vec<Record>) {
        for record in records {
            self.seed(kind, record);
        }
    }

    /// 累计写操作次数 (create/update/delete)
    pub fn writes(&self) -> u64 {
        self.write_count.load(AtomicOrdering::SeqCst)
    }

    /// 指定集合的创建响应不回传 ID
    pub fn omit_ids_on_create(&self, kind: EntityKind) {
        if let Ok(mut set) = self.omit_id_kinds.lock() {
            set.insert(kind);
        }
    }

    /// 指定集合的创建确认后暂不可读 (模拟复制延迟丢读)
    pub fn vanish_on_create(&self, kind: EntityKind) {
        if let Ok(mut set) = self.vanish_kinds.lock() {
            set.insert(kind);
        }
    }

    /// 指定记录的写操作固定失败
    pub fn poison(&self, id: &str) {
        if let Ok(mut set) = self.poisoned_ids.lock() {
            set.insert(id.to_string());
        }
    }

    /// 挂接防伪令牌提供方
    pub fn set_token_provider(&self, provider: Arc<dyn VerificationTokenProvider>) {
        if let Ok(mut slot) = self.token_provider.lock() {
            *slot = Some(provider);
        }
    }

    /// 写操作实际附带令牌的次数
    pub fn tokens_attached(&self) -> u64 {
        self.tokens_attached.load(AtomicOrdering::SeqCst)
    }

    /// 当前集合内记录条数
    pub fn count(&self, kind: EntityKind) -> usize {
        self.collections
            .lock()
            .map(|map| map.get(&kind).map(|v| v.len()).unwrap_or(0))
            .unwrap_or(0)
    }

    fn next_id(&self, kind: EntityKind) -> String {
        let n = self.id_seq.fetch_add(1, AtomicOrdering::SeqCst);
        format!("{}-{:05}", kind.collection(), n)
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<EntityKind, Vec<Record>>>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::backend("内存实体库锁中毒"))
    }

    fn flag_set(&self, flags: &Mutex<HashSet<EntityKind>>, kind: EntityKind) -> bool {
        flags.lock().map(|set| set.contains(&kind)).unwrap_or(false)
    }

    fn check_poison(&self, id: &str) -> Result<(), StoreError> {
        let poisoned = self
            .poisoned_ids
            .lock()
            .map(|set| set.contains(id))
            .unwrap_or(false);
        if poisoned {
            Err(StoreError::backend(format!("记录写入被拒绝: {}", id)))
        } else {
            Ok(())
        }
    }

    fn note_write(&self) {
        self.write_count.fetch_add(1, AtomicOrdering::SeqCst);
        let attached = self
            .token_provider
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().and_then(|p| p.token()))
            .is_some();
        if attached {
            self.tokens_attached.fetch_add(1, AtomicOrdering::SeqCst);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

/// 两个 JSON 值的排序比较: 数值按大小,其余按字符串
fn cmp_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(va), Some(vb)) => match (va.as_f64(), vb.as_f64()) {
            (Some(na), Some(nb)) => na.partial_cmp(&nb).unwrap_or(Ordering::Equal),
            _ => {
                let sa = va.as_str().map(|s| s.to_string()).unwrap_or_else(|| va.to_string());
                let sb = vb.as_str().map(|s| s.to_string()).unwrap_or_else(|| vb.to_string());
                sa.cmp(&sb)
            }
        },
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn fetch(&self, kind: EntityKind, query: &Query) -> Result<Page, StoreError> {
        let map = self.guard()?;
        let mut matched: Vec<Record> = map
            .get(&kind)
            .map(|records| records.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();
        drop(map);

        // 多键排序: 从次键到主键依次稳定排序
        for (field, dir) in query.order_by.iter().rev() {
            matched.sort_by(|a, b| {
                let ord = cmp_values(a.get(field), b.get(field));
                match dir {
                    SortDir::Asc => ord,
                    SortDir::Desc => ord.reverse(),
                }
            });
        }

        let offset: usize = match &query.cursor {
            Some(cursor) => cursor
                .parse()
                .map_err(|_| StoreError::BadCursor(cursor.clone()))?,
            None => 0,
        };
        let total = matched.len();
        let size = query.page_size.unwrap_or(total.saturating_sub(offset).max(1));
        let end = (offset + size).min(total);
        let mut page: Vec<Record> = if offset < total {
            matched[offset..end].to_vec()
        } else {
            Vec::new()
        };

        if !query.select.is_empty() {
            for record in page.iter_mut() {
                record.retain(|k, _| k == "id" || query.select.iter().any(|f| f == k));
            }
        }

        let next_cursor = if end < total { Some(end.to_string()) } else { None };
        Ok(Page { records: page, next_cursor })
    }

    async fn fetch_by_id(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> Result<Option<Record>, StoreError> {
        let map = self.guard()?;
        let found = map.get(&kind).and_then(|records| {
            records
                .iter()
                .find(|r| r.get("id").and_then(|v| v.as_str()) == Some(id))
                .cloned()
        });
        Ok(found)
    }

    async fn create(
        &self,
        kind: EntityKind,
        mut record: Record,
    ) -> Result<Option<String>, StoreError> {
        self.note_write();
        if self.flag_set(&self.vanish_kinds, kind) {
            return Ok(None);
        }
        let id = self.next_id(kind);
        record.insert("id".to_string(), Value::String(id.clone()));
        record
            .entry("createdAt".to_string())
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        let mut map = self.guard()?;
        map.entry(kind).or_default().push(record);
        drop(map);
        if self.flag_set(&self.omit_id_kinds, kind) {
            Ok(None)
        } else {
            Ok(Some(id))
        }
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: &str,
        record: Record,
    ) -> Result<(), StoreError> {
        self.note_write();
        self.check_poison(id)?;
        let mut map = self.guard()?;
        let records = map.entry(kind).or_default();
        let target = records
            .iter_mut()
            .find(|r| r.get("id").and_then(|v| v.as_str()) == Some(id));
        match target {
            Some(existing) => {
                for (key, value) in record {
                    existing.insert(key, value);
                }
                Ok(())
            }
            None => Err(StoreError::NotFound {
                kind: kind.collection(),
                id: id.to_string(),
            }),
        }
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), StoreError> {
        self.note_write();
        self.check_poison(id)?;
        let mut map = self.guard()?;
        let records = map.entry(kind).or_default();
        let before = records.len();
        records.retain(|r| r.get("id").and_then(|v| v.as_str()) != Some(id));
        if records.len() == before {
            Err(StoreError::NotFound {
                kind: kind.collection(),
                id: id.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

// ==========================================
// 出口单证工作台 - 实体库访问层
// ==========================================
// 职责: 定义对外部实体库的 CRUD 契约与分页迭代
// 红线: 引擎层不感知后端形态,只面向 EntityStore 契约
// ==========================================

pub mod error;
pub mod memory;
pub mod query;
pub mod record;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use query::{Page, Query, SortDir};

use async_trait::async_trait;
use futures::stream::Stream;
use futures::TryStreamExt;
use std::collections::VecDeque;
use std::fmt;

/// 实体库记录: 松散类型键值对,字段名与后端一致 (camelCase)
pub type Record = serde_json::Map<String, serde_json::Value>;

// ==========================================
// EntityKind - 实体集合标识
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Shipment,          // 装运主记录
    LineItem,          // 装运行项目
    Container,         // 集装箱
    ContainerItem,     // 箱货关联
    Charge,            // 杂费
    AdditionalDetails, // 附加信息
    NotifyParty,       // 通知方
    Term,              // 条款主数据
    Brand,             // 品牌主数据
    CustomerModel,     // 客户主数据
    ShippedOrder,      // 历史装运记录 (只读)
    ArLedger,          // 应收台账 (只读)
    HsCode,            // 海关编码表 (只读)
    DocumentIndex,     // 单证索引 (上传协作方回写)
}

impl EntityKind {
    /// 后端集合名
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Shipment => "shipments",
            EntityKind::LineItem => "lineItems",
            EntityKind::Container => "containers",
            EntityKind::ContainerItem => "containerItems",
            EntityKind::Charge => "charges",
            EntityKind::AdditionalDetails => "additionalDetails",
            EntityKind::NotifyParty => "notifyParties",
            EntityKind::Term => "terms",
            EntityKind::Brand => "brands",
            EntityKind::CustomerModel => "customerModels",
            EntityKind::ShippedOrder => "shippedOrders",
            EntityKind::ArLedger => "arLedger",
            EntityKind::HsCode => "hsCodes",
            EntityKind::DocumentIndex => "documentIndex",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collection())
    }
}

// ==========================================
// EntityStore - 实体库 CRUD 契约
// ==========================================
// 创建响应允许不回传新 ID,调用方需按业务键重查
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// 按查询条件取一页记录
    async fn fetch(&self, kind: EntityKind, query: &Query) -> Result<Page, StoreError>;

    /// 按 ID 取单条记录
    async fn fetch_by_id(&self, kind: EntityKind, id: &str)
        -> Result<Option<Record>, StoreError>;

    /// 创建记录,返回后端分配的 ID (可能缺失)
    async fn create(&self, kind: EntityKind, record: Record)
        -> Result<Option<String>, StoreError>;

    /// 按 ID 更新记录
    async fn update(&self, kind: EntityKind, id: &str, record: Record)
        -> Result<(), StoreError>;

    /// 按 ID 删除记录
    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), StoreError>;
}

// ==========================================
// VerificationTokenProvider - 防伪令牌提供方
// ==========================================
// 存在时,写操作与上传请求附带令牌; 本系统只消费契约
pub trait VerificationTokenProvider: Send + Sync {
    /// 当前令牌,None 表示未启用
    fn token(&self) -> Option<String>;
}

// ==========================================
// 分页迭代
// ==========================================

struct PageWalk {
    buffered: VecDeque<Record>,
    cursor: Option<String>,
    exhausted: bool,
}

/// 惰性逐条迭代全部分页,内存中最多保留一页
pub fn stream_records<'a>(
    store: &'a dyn EntityStore,
    kind: EntityKind,
    query: Query,
) -> impl Stream<Item = Result<Record, StoreError>> + 'a {
    futures::stream::try_unfold(
        PageWalk {
            buffered: VecDeque::new(),
            cursor: query.cursor.clone(),
            exhausted: false,
        },
        move |mut walk| {
            let mut page_query = query.clone();
            async move {
                loop {
                    if let Some(record) = walk.buffered.pop_front() {
                        return Ok(Some((record, walk)));
                    }
                    if walk.exhausted {
                        return Ok(None);
                    }
                    page_query.cursor = walk.cursor.take();
                    let page = store.fetch(kind, &page_query).await?;
                    walk.buffered = page.records.into();
                    walk.cursor = page.next_cursor;
                    walk.exhausted = walk.cursor.is_none();
                    if walk.buffered.is_empty() && walk.exhausted {
                        return Ok(None);
                    }
                }
            }
        },
    )
}

/// 跟随游标取全部记录
pub async fn fetch_all(
    store: &dyn EntityStore,
    kind: EntityKind,
    query: Query,
) -> Result<Vec<Record>, StoreError> {
    stream_records(store, kind, query).try_collect().await
}

/// 取满足条件的第一条记录
pub async fn fetch_first(
    store: &dyn EntityStore,
    kind: EntityKind,
    query: Query,
) -> Result<Option<Record>, StoreError> {
    let page = store.fetch(kind, &query.page_size(1)).await?;
    Ok(page.records.into_iter().next())
}

// ==========================================
// 出口单证工作台 - 外部数据源仓储
// ==========================================
// 应收台账 / 海关编码表 / 历史装运记录 / 单证索引
// 红线: 这些集合只读,本系统不回写
// ==========================================

use crate::domain::feeds::{ArRecord, DocumentIndexEntry, HsCodeEntry, ShippedOrder};
use crate::repository::error::RepositoryResult;
use crate::store::record::{get_date, get_datetime, get_f64, get_nonempty, get_string};
use crate::store::{fetch_all, EntityKind, EntityStore, Query, Record};
use std::sync::Arc;

/// 台账/历史记录的分页大小
const FEED_PAGE_SIZE: usize = 200;

// ==========================================
// LedgerRepository - 应收台账仓储
// ==========================================
pub struct LedgerRepository {
    store: Arc<dyn EntityStore>,
}

impl LedgerRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// 客户的全部台账行 (对账数据源)
    ///
    /// # 参数
    /// - customer_key: 台账侧客户键
    pub async fn find_by_customer(&self, customer_key: &str) -> RepositoryResult<Vec<ArRecord>> {
        let records = fetch_all(
            self.store.as_ref(),
            EntityKind::ArLedger,
            Query::new()
                .eq("customerNo", customer_key)
                .page_size(FEED_PAGE_SIZE),
        )
        .await?;
        Ok(records.into_iter().map(normalize_ar_record).collect())
    }
}

// ==========================================
// HsCodeRepository - 海关编码表仓储
// ==========================================
pub struct HsCodeRepository {
    store: Arc<dyn EntityStore>,
}

impl HsCodeRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// 全量海关编码表 (解析器构建索引用,每次会话加载一次)
    pub async fn load_all(&self) -> RepositoryResult<Vec<HsCodeEntry>> {
        let records = fetch_all(
            self.store.as_ref(),
            EntityKind::HsCode,
            Query::new().page_size(FEED_PAGE_SIZE),
        )
        .await?;
        Ok(records
            .into_iter()
            .map(|r| HsCodeEntry {
                item_no: get_string(&r, "itemNo"),
                hs_code: get_string(&r, "hsCode"),
                description: get_nonempty(&r, "description"),
            })
            .collect())
    }
}

// ==========================================
// ShippedOrderRepository - 历史装运记录仓储
// ==========================================
pub struct ShippedOrderRepository {
    store: Arc<dyn EntityStore>,
}

impl ShippedOrderRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// 全量历史装运记录 (柜号建议索引的输入)
    pub async fn load_all(&self) -> RepositoryResult<Vec<ShippedOrder>> {
        let records = fetch_all(
            self.store.as_ref(),
            EntityKind::ShippedOrder,
            Query::new().page_size(FEED_PAGE_SIZE),
        )
        .await?;
        Ok(records.into_iter().map(normalize_shipped_order).collect())
    }
}

// ==========================================
// DocumentIndexRepository - 单证索引仓储
// ==========================================
// 上传协作方回写,本侧按装运单查询刷新可用状态
pub struct DocumentIndexRepository {
    store: Arc<dyn EntityStore>,
}

impl DocumentIndexRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// 装运单已发布的单证索引行
    pub async fn find_by_shipment(
        &self,
        shipment_id: &str,
    ) -> RepositoryResult<Vec<DocumentIndexEntry>> {
        let records = fetch_all(
            self.store.as_ref(),
            EntityKind::DocumentIndex,
            Query::new().eq("shipmentId", shipment_id),
        )
        .await?;
        Ok(records
            .into_iter()
            .map(|r| DocumentIndexEntry {
                id: get_nonempty(&r, "id"),
                shipment_id: get_string(&r, "shipmentId"),
                doc_type: get_string(&r, "docType"),
                language: get_string(&r, "language"),
                file_url: get_string(&r, "fileUrl"),
                updated_at: get_datetime(&r, "updatedAt"),
            })
            .collect())
    }
}

/// 松散记录 → 台账行
pub fn normalize_ar_record(record: Record) -> ArRecord {
    ArRecord {
        order_no: get_string(&record, "orderNo"),
        item_no: get_string(&record, "itemNo"),
        quantity: get_f64(&record, "quantity"),
        unit_price: get_f64(&record, "unitPrice"),
        vat_amount: get_f64(&record, "vatAmount"),
        line_amount: get_f64(&record, "lineAmount"),
    }
}

/// 松散记录 → 历史装运记录
pub fn normalize_shipped_order(record: Record) -> ShippedOrder {
    ShippedOrder {
        order_no: get_nonempty(&record, "orderNo"),
        item_no: get_nonempty(&record, "itemNo"),
        delivery_note: get_nonempty(&record, "deliveryNote"),
        ship_date: get_date(&record, "shipDate"),
        container_id: get_nonempty(&record, "containerId"),
        seal_no: get_nonempty(&record, "sealNo"),
        created_at: get_datetime(&record, "createdAt"),
    }
}

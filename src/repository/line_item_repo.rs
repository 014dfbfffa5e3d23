// ==========================================
// 出口单证工作台 - 行项目仓储
// ==========================================
// 红线: Repository 不含派生字段计算逻辑
// 职责: 行项目的查询/创建/更新与松散记录规范化
// ==========================================

use crate::domain::line_item::LineItem;
use crate::domain::types::{DerivedField, ValueType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::store::record::{
    get_bool, get_datetime, get_f64, get_nonempty, get_str_list, get_string, record_from,
};
use crate::store::{fetch_all, fetch_first, EntityKind, EntityStore, Query, Record};
use serde_json::json;
use std::sync::Arc;

/// 行项目默认分页大小
const LINE_ITEM_PAGE_SIZE: usize = 100;

// ==========================================
// LineItemRepository - 行项目仓储
// ==========================================
pub struct LineItemRepository {
    store: Arc<dyn EntityStore>,
}

impl LineItemRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// 取装运单下全部行项目 (跟随游标,按物料号排序)
    ///
    /// # 参数
    /// - shipment_no: 装运单号
    ///
    /// # 返回
    /// - Ok(Vec<LineItem>): 规范化后的行集合
    /// - Err: 实体库错误
    pub async fn find_by_shipment(&self, shipment_no: &str) -> RepositoryResult<Vec<LineItem>> {
        let records = fetch_all(
            self.store.as_ref(),
            EntityKind::LineItem,
            Query::new()
                .eq("shipmentNo", shipment_no)
                .order_asc("itemNo")
                .page_size(LINE_ITEM_PAGE_SIZE),
        )
        .await?;
        Ok(records.into_iter().map(normalize_line_item).collect())
    }

    /// 创建行项目,返回后端分配的 ID (响应可能缺失)
    pub async fn create(&self, row: &LineItem) -> RepositoryResult<Option<String>> {
        let id = self
            .store
            .create(EntityKind::LineItem, line_item_payload(row))
            .await?;
        Ok(id)
    }

    /// 按 ID 无条件更新行项目 (无冲突检测,后写覆盖)
    pub async fn update(&self, row: &LineItem) -> RepositoryResult<()> {
        let id = row.id.as_deref().ok_or_else(|| {
            RepositoryError::ValidationError("更新要求行已持久化 (缺少实体库 ID)".to_string())
        })?;
        self.store
            .update(EntityKind::LineItem, id, line_item_payload(row))
            .await?;
        Ok(())
    }

    /// 按复合业务键重查最新一条记录的 ID
    ///
    /// 创建响应缺 ID 时的补救路径: 过滤 (shipment, order, item),
    /// 按创建时间倒序取第一条
    ///
    /// # 返回
    /// - Ok(Some(id)): 解析成功
    /// - Ok(None): 复合键无匹配记录
    pub async fn requery_id(
        &self,
        shipment_no: &str,
        order_no: &str,
        item_no: &str,
    ) -> RepositoryResult<Option<String>> {
        let record = fetch_first(
            self.store.as_ref(),
            EntityKind::LineItem,
            Query::new()
                .eq("shipmentNo", shipment_no)
                .eq("orderNo", order_no)
                .eq("itemNo", item_no)
                .order_desc("createdAt"),
        )
        .await?;
        Ok(record.and_then(|r| get_nonempty(&r, "id")))
    }
}

// ==========================================
// 规范化与载荷映射
// ==========================================

/// 松散记录 → 类型化行项目
pub fn normalize_line_item(record: Record) -> LineItem {
    let mut row = LineItem::new(
        &get_string(&record, "shipmentNo"),
        &get_string(&record, "orderNo"),
        &get_string(&record, "itemNo"),
    );
    row.id = get_nonempty(&record, "id");
    row.description = get_string(&record, "description");
    row.released = get_bool(&record, "released");
    row.packaging = get_string(&record, "packaging");
    row.package_type = get_nonempty(&record, "packageType");
    row.hs_code = get_nonempty(&record, "hsCode");
    row.container_no = get_nonempty(&record, "containerNo");
    row.ordered_qty = get_f64(&record, "orderedQty");
    row.loaded_qty = get_f64(&record, "loadedQty");
    row.pending_qty = get_f64(&record, "pendingQty");
    row.uom_factor = get_f64(&record, "uomFactor");
    row.palletized = get_bool(&record, "palletized");
    row.pallet_count = get_f64(&record, "palletCount");
    row.pallet_weight = get_f64(&record, "palletWeight");
    row.total_volume = get_f64(&record, "totalVolume");
    row.net_weight = get_f64(&record, "netWeight");
    row.gross_weight = get_f64(&record, "grossWeight");
    row.value_type = ValueType::from_str(&get_string(&record, "valueType"));
    row.unit_price = get_f64(&record, "unitPrice");
    row.vat_amount = get_f64(&record, "vatAmount");
    row.total_excl_vat = get_f64(&record, "totalExclVat");
    row.total_incl_vat = get_f64(&record, "totalInclVat");
    row.overridden = get_str_list(&record, "overriddenFields")
        .iter()
        .filter_map(|s| DerivedField::from_str(s))
        .collect();
    row.created_at = get_datetime(&record, "createdAt");
    row
}

/// 类型化行项目 → 实体库载荷 (创建与更新共用,不含 ID)
pub fn line_item_payload(row: &LineItem) -> Record {
    let mut overridden: Vec<String> = row
        .overridden
        .iter()
        .map(|f| f.to_store_str().to_string())
        .collect();
    overridden.sort();

    record_from(json!({
        "shipmentNo": row.shipment_no,
        "orderNo": row.order_no,
        "itemNo": row.item_no,
        "description": row.description,
        "released": row.released,
        "packaging": row.packaging,
        "packageType": row.package_type,
        "hsCode": row.hs_code,
        "containerNo": row.container_no,
        "orderedQty": row.ordered_qty,
        "loadedQty": row.loaded_qty,
        "pendingQty": row.pending_qty,
        "uomFactor": row.uom_factor,
        "palletized": row.palletized,
        "palletCount": row.pallet_count,
        "palletWeight": row.pallet_weight,
        "totalVolume": row.total_volume,
        "netWeight": row.net_weight,
        "grossWeight": row.gross_weight,
        "valueType": row.value_type.to_store_str(),
        "unitPrice": row.unit_price,
        "vatAmount": row.vat_amount,
        "totalExclVat": row.total_excl_vat,
        "totalInclVat": row.total_incl_vat,
        "overriddenFields": overridden,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_coerces_loose_record() {
        let record = record_from(json!({
            "id": "li-1",
            "shipmentNo": "SH-01",
            "orderNo": "SO1",
            "itemNo": "I1",
            "loadedQty": "12.5",
            "released": "Y",
            "valueType": "FOC",
            "overriddenFields": ["NET_WEIGHT", "BOGUS"],
        }));
        let row = normalize_line_item(record);
        assert_eq!(row.id.as_deref(), Some("li-1"));
        assert_eq!(row.loaded_qty, 12.5);
        assert!(row.released);
        assert_eq!(row.value_type, ValueType::Foc);
        assert!(row.is_pinned(DerivedField::NetWeight));
        assert_eq!(row.overridden.len(), 1);
    }

    #[test]
    fn test_payload_serializes_pins() {
        let mut row = LineItem::new("SH-01", "SO1", "I1");
        row.pin(DerivedField::GrossWeight);
        row.pin(DerivedField::TotalVolume);
        let payload = line_item_payload(&row);
        let pins: Vec<&str> = payload
            .get("overriddenFields")
            .and_then(|v| v.as_array())
            .map(|a| a.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(pins, vec!["GROSS_WEIGHT", "TOTAL_VOLUME"]);
    }
}

// ==========================================
// 出口单证工作台 - 杂费仓储
// ==========================================
// 杂费逐行持久化 (create/update/delete),不做批量保存
// ==========================================

use crate::domain::charge::Charge;
use crate::domain::types::ChargeCategory;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::store::record::{get_datetime, get_f64, get_nonempty, get_string, record_from};
use crate::store::{fetch_all, EntityKind, EntityStore, Query, Record};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

// ==========================================
// ChargeRepository - 杂费仓储
// ==========================================
pub struct ChargeRepository {
    store: Arc<dyn EntityStore>,
}

impl ChargeRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// 装运单的全部杂费行,按创建时间排序 (单证打印顺序)
    pub async fn find_by_shipment(&self, shipment_no: &str) -> RepositoryResult<Vec<Charge>> {
        let records = fetch_all(
            self.store.as_ref(),
            EntityKind::Charge,
            Query::new()
                .eq("shipmentNo", shipment_no)
                .order_asc("createdAt"),
        )
        .await?;
        Ok(records.into_iter().map(normalize_charge).collect())
    }

    /// 创建杂费行,返回后端 ID
    pub async fn create(&self, charge: &Charge) -> RepositoryResult<Option<String>> {
        let id = self
            .store
            .create(EntityKind::Charge, charge_payload(charge))
            .await?;
        Ok(id)
    }

    /// 更新杂费行
    pub async fn update(&self, charge: &Charge) -> RepositoryResult<()> {
        let id = charge.id.as_deref().ok_or_else(|| {
            RepositoryError::ValidationError("更新要求杂费行已持久化".to_string())
        })?;
        self.store
            .update(EntityKind::Charge, id, charge_payload(charge))
            .await?;
        Ok(())
    }

    /// 删除杂费行
    pub async fn delete(&self, id: &str) -> RepositoryResult<()> {
        self.store.delete(EntityKind::Charge, id).await?;
        Ok(())
    }
}

/// 松散记录 → 杂费行
pub fn normalize_charge(record: Record) -> Charge {
    Charge {
        id: get_nonempty(&record, "id"),
        shipment_no: get_string(&record, "shipmentNo"),
        category: ChargeCategory::from_str(&get_string(&record, "category")),
        other_name: get_nonempty(&record, "otherName"),
        quantity: get_f64(&record, "quantity"),
        amount: get_f64(&record, "amount"),
        currency: get_string(&record, "currency"),
        created_at: get_datetime(&record, "createdAt").unwrap_or_else(Utc::now),
    }
}

/// 杂费行 → 实体库载荷
pub fn charge_payload(charge: &Charge) -> Record {
    record_from(json!({
        "shipmentNo": charge.shipment_no,
        "category": charge.category.to_store_str(),
        "otherName": charge.other_name,
        "quantity": charge.quantity,
        "amount": charge.amount,
        "currency": charge.currency,
    }))
}

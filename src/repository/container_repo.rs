// ==========================================
// 出口单证工作台 - 集装箱仓储
// ==========================================
// 集装箱 CRUD 表单在外围系统; 本层只读供会话加载
// ==========================================

use crate::domain::container::{Container, ContainerItem};
use crate::domain::types::ContainerKind;
use crate::repository::error::RepositoryResult;
use crate::store::record::{get_f64, get_nonempty, get_string};
use crate::store::{fetch_all, EntityKind, EntityStore, Query, Record};
use std::sync::Arc;

// ==========================================
// ContainerRepository - 集装箱仓储
// ==========================================
pub struct ContainerRepository {
    store: Arc<dyn EntityStore>,
}

impl ContainerRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// 装运单的集装箱记录,按柜号排序
    pub async fn find_by_shipment(&self, shipment_no: &str) -> RepositoryResult<Vec<Container>> {
        let records = fetch_all(
            self.store.as_ref(),
            EntityKind::Container,
            Query::new().eq("shipmentNo", shipment_no).order_asc("code"),
        )
        .await?;
        Ok(records.into_iter().map(normalize_container).collect())
    }

    /// 集装箱下的箱货关联
    pub async fn items_of(&self, container_id: &str) -> RepositoryResult<Vec<ContainerItem>> {
        let records = fetch_all(
            self.store.as_ref(),
            EntityKind::ContainerItem,
            Query::new().eq("containerId", container_id),
        )
        .await?;
        Ok(records
            .into_iter()
            .map(|r| ContainerItem {
                id: get_nonempty(&r, "id"),
                container_id: get_string(&r, "containerId"),
                line_item_id: get_string(&r, "lineItemId"),
                quantity: get_f64(&r, "quantity"),
            })
            .collect())
    }
}

/// 松散记录 → 集装箱
pub fn normalize_container(record: Record) -> Container {
    Container {
        id: get_nonempty(&record, "id"),
        shipment_no: get_string(&record, "shipmentNo"),
        code: get_string(&record, "code"),
        kind: ContainerKind::from_str(&get_string(&record, "kind")),
        tare_weight: get_f64(&record, "tareWeight"),
        total_qty: get_f64(&record, "totalQty"),
        total_net_weight: get_f64(&record, "totalNetWeight"),
        total_gross_weight: get_f64(&record, "totalGrossWeight"),
    }
}

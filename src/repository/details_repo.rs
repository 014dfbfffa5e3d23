// ==========================================
// 出口单证工作台 - 附加信息仓储
// ==========================================
// 每个装运单至多一条; 首次访问惰性创建,之后原地更新
// ==========================================

use crate::domain::details::AdditionalDetails;
use crate::domain::types::PrintTarget;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::store::record::{get_f64, get_nonempty, get_str_list, get_string, record_from};
use crate::store::{fetch_first, EntityKind, EntityStore, Query, Record};
use serde_json::json;
use std::sync::Arc;

// ==========================================
// DetailsRepository - 附加信息仓储
// ==========================================
pub struct DetailsRepository {
    store: Arc<dyn EntityStore>,
}

impl DetailsRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// 取装运单的附加信息,不存在时创建空记录后返回
    ///
    /// # 返回
    /// - Ok(AdditionalDetails): 已有记录或新建的空记录 (带 ID)
    pub async fn find_or_create(&self, shipment_no: &str) -> RepositoryResult<AdditionalDetails> {
        let existing = fetch_first(
            self.store.as_ref(),
            EntityKind::AdditionalDetails,
            Query::new().eq("shipmentNo", shipment_no),
        )
        .await?;
        if let Some(record) = existing {
            return Ok(normalize_details(record));
        }

        let mut details = AdditionalDetails::empty(shipment_no);
        let id = self
            .store
            .create(EntityKind::AdditionalDetails, details_payload(&details))
            .await?;
        details.id = match id {
            Some(id) => Some(id),
            // 创建响应缺 ID 时按装运单号重查
            None => fetch_first(
                self.store.as_ref(),
                EntityKind::AdditionalDetails,
                Query::new()
                    .eq("shipmentNo", shipment_no)
                    .order_desc("createdAt"),
            )
            .await?
            .and_then(|r| get_nonempty(&r, "id")),
        };
        Ok(details)
    }

    /// 原地更新附加信息
    pub async fn update(&self, details: &AdditionalDetails) -> RepositoryResult<()> {
        let id = details.id.as_deref().ok_or_else(|| {
            RepositoryError::ValidationError("更新要求附加信息已持久化".to_string())
        })?;
        self.store
            .update(EntityKind::AdditionalDetails, id, details_payload(details))
            .await?;
        Ok(())
    }
}

/// 松散记录 → 附加信息
pub fn normalize_details(record: Record) -> AdditionalDetails {
    AdditionalDetails {
        id: get_nonempty(&record, "id"),
        shipment_no: get_string(&record, "shipmentNo"),
        print_target: PrintTarget::from_str(&get_string(&record, "printTarget")),
        hidden_fields: get_str_list(&record, "hiddenFields").into_iter().collect(),
        pallets: get_f64(&record, "pallets"),
        cartons: get_f64(&record, "cartons"),
        drums: get_f64(&record, "drums"),
        pails: get_f64(&record, "pails"),
        packages: get_f64(&record, "packages"),
        net_weight: get_f64(&record, "netWeight"),
        gross_weight: get_f64(&record, "grossWeight"),
        comment: get_string(&record, "comment"),
    }
}

/// 附加信息 → 实体库载荷
pub fn details_payload(details: &AdditionalDetails) -> Record {
    let mut hidden: Vec<String> = details.hidden_fields.iter().cloned().collect();
    hidden.sort();
    record_from(json!({
        "shipmentNo": details.shipment_no,
        "printTarget": details.print_target.to_store_str(),
        "hiddenFields": hidden,
        "pallets": details.pallets,
        "cartons": details.cartons,
        "drums": details.drums,
        "pails": details.pails,
        "packages": details.packages,
        "netWeight": details.net_weight,
        "grossWeight": details.gross_weight,
        "comment": details.comment,
    }))
}

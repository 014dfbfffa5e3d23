// ==========================================
// 出口单证工作台 - 装运工作台API
// ==========================================
// 职责: 页面操作入口 (开会话/行编辑/批量保存/对账/杂费/附加信息)
// 红线: 批量流程不因单行失败中断,最终以汇总报告收口
// ==========================================

use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::config::Settings;
use crate::domain::charge::Charge;
use crate::domain::container::{Container, ContainerItem};
use crate::domain::details::AdditionalDetails;
use crate::engine::{ChargeTotals, ChargesAggregator, ContainerSuggestion, ReconcileReport, SaveReport};
use crate::repository::ChargeRepository;
use crate::session::ShipmentSession;
use crate::store::EntityStore;

/// 装运工作台API
///
/// 行集合与脏行状态归会话持有; 此处负责输入校验/错误转换/杂费持久化
pub struct ShipmentApi {
    store: Arc<dyn EntityStore>,
    settings: Settings,
    charges: ChargeRepository,
    aggregator: ChargesAggregator,
}

impl ShipmentApi {
    pub fn new(store: Arc<dyn EntityStore>, settings: Settings) -> Self {
        Self {
            charges: ChargeRepository::new(Arc::clone(&store)),
            aggregator: ChargesAggregator::new(),
            store,
            settings,
        }
    }

    /// 打开装运会话 (页面入口)
    ///
    /// 装运主记录缺失即页面级失败,直接返回 NotFound
    pub async fn open_session(&self, shipment_id: &str) -> ApiResult<ShipmentSession> {
        if shipment_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("装运 ID 不能为空".to_string()));
        }
        Ok(ShipmentSession::open(Arc::clone(&self.store), &self.settings, shipment_id).await?)
    }

    // ==========================================
    // 行集合操作
    // ==========================================

    /// 重新加载行集合,返回行数
    pub async fn load_rows(&self, session: &mut ShipmentSession) -> ApiResult<usize> {
        Ok(session.reload_rows().await?)
    }

    /// 行编辑后标脏
    pub fn mark_dirty(&self, session: &mut ShipmentSession, row_uid: Uuid) -> ApiResult<()> {
        if session.mark_dirty(row_uid) {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("行(uid={})不在当前会话", row_uid)))
        }
    }

    /// 单行重算
    ///
    /// # 参数
    /// - include_prices: false 时跳过未税金额导出 (含税恒等式仍维持)
    pub fn recalculate_row(
        &self,
        session: &mut ShipmentSession,
        row_uid: Uuid,
        include_prices: bool,
    ) -> ApiResult<()> {
        if session.recalculate_row(row_uid, include_prices) {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("行(uid={})不在当前会话", row_uid)))
        }
    }

    /// 全量重算,返回重算行数
    pub fn recalculate_all(&self, session: &mut ShipmentSession, include_prices: bool) -> usize {
        session.recalculate_all(include_prices)
    }

    /// Save-All: 顺序保存全部脏行,返回汇总报告
    pub async fn save_all(&self, session: &mut ShipmentSession) -> SaveReport {
        session.save_all().await
    }

    /// 放弃全部未保存编辑,从实体库重载
    pub async fn discard_all(&self, session: &mut ShipmentSession) -> ApiResult<usize> {
        Ok(session.discard_all().await?)
    }

    /// 应收台账对账
    #[instrument(skip(self, session), fields(shipment = %session.shipment_no()))]
    pub async fn reconcile_with_ledger(
        &self,
        session: &mut ShipmentSession,
        customer_key: &str,
    ) -> ApiResult<ReconcileReport> {
        if customer_key.trim().is_empty() {
            return Err(ApiError::InvalidInput("客户键不能为空".to_string()));
        }
        Ok(session.reconcile_with_ledger(customer_key).await?)
    }

    /// 柜号/封号建议
    pub async fn container_suggestions(
        &self,
        session: &mut ShipmentSession,
        order_no: &str,
        item_no: &str,
    ) -> ApiResult<Vec<ContainerSuggestion>> {
        Ok(session.container_suggestions(order_no, item_no).await?)
    }

    /// 装运单的集装箱清单 (只读展示,汇总字段仅供参考)
    pub async fn containers(&self, session: &mut ShipmentSession) -> ApiResult<Vec<Container>> {
        Ok(session.containers().await?.to_vec())
    }

    /// 集装箱下的箱货关联
    pub async fn container_items(
        &self,
        session: &ShipmentSession,
        container_id: &str,
    ) -> ApiResult<Vec<ContainerItem>> {
        if container_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("集装箱 ID 不能为空".to_string()));
        }
        Ok(session.container_items(container_id).await?)
    }

    /// 解析物料号对应的海关编码
    pub async fn resolve_hs_code(
        &self,
        session: &mut ShipmentSession,
        item_code: &str,
    ) -> ApiResult<Option<String>> {
        if item_code.trim().is_empty() {
            return Err(ApiError::InvalidInput("物料号不能为空".to_string()));
        }
        Ok(session.resolve_hs_code(item_code).await?)
    }

    /// 把解析到的海关编码写到指定行并标脏
    pub async fn fill_hs_code(
        &self,
        session: &mut ShipmentSession,
        row_uid: Uuid,
    ) -> ApiResult<bool> {
        Ok(session.fill_hs_code(row_uid).await?)
    }

    // ==========================================
    // 附加信息
    // ==========================================

    /// 附加信息 (每装运单例,首次访问时取或建)
    pub async fn details(&self, session: &mut ShipmentSession) -> ApiResult<AdditionalDetails> {
        Ok(session.details().await?)
    }

    /// 更新附加信息
    pub async fn update_details(
        &self,
        session: &mut ShipmentSession,
        details: AdditionalDetails,
    ) -> ApiResult<()> {
        if details.shipment_no != session.shipment_no() {
            return Err(ApiError::InvalidInput(format!(
                "附加信息所属装运单({})与当前会话({})不一致",
                details.shipment_no,
                session.shipment_no()
            )));
        }
        Ok(session.update_details(details).await?)
    }

    // ==========================================
    // 杂费 (逐行即时持久化,不走脏行集合)
    // ==========================================

    /// 装运单的杂费行,按创建时间升序
    pub async fn list_charges(&self, shipment_no: &str) -> ApiResult<Vec<Charge>> {
        Ok(self.charges.find_by_shipment(shipment_no).await?)
    }

    /// 新增杂费行,返回后端 ID
    pub async fn add_charge(&self, charge: &Charge) -> ApiResult<Option<String>> {
        if charge.shipment_no.trim().is_empty() {
            return Err(ApiError::InvalidInput("杂费行缺少装运单号".to_string()));
        }
        Ok(self.charges.create(charge).await?)
    }

    /// 更新杂费行
    pub async fn update_charge(&self, charge: &Charge) -> ApiResult<()> {
        if charge.id.is_none() {
            return Err(ApiError::InvalidInput("杂费行缺少 ID,无法更新".to_string()));
        }
        Ok(self.charges.update(charge).await?)
    }

    /// 删除杂费行
    pub async fn remove_charge(&self, id: &str) -> ApiResult<()> {
        Ok(self.charges.delete(id).await?)
    }

    /// 杂费合计 (费用和/折扣和/净影响)
    pub async fn charge_totals(&self, shipment_no: &str) -> ApiResult<ChargeTotals> {
        let charges = self.charges.find_by_shipment(shipment_no).await?;
        Ok(self.aggregator.totals(&charges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ChargeCategory;
    use crate::store::record::record_from;
    use crate::store::{EntityKind, MemoryStore};
    use chrono::Utc;
    use serde_json::json;

    fn workbench() -> (ShipmentApi, Arc<MemoryStore>, String) {
        let store = Arc::new(MemoryStore::new());
        let id = store.seed(
            EntityKind::Shipment,
            record_from(json!({
                "shipmentNo": "DCL-5005",
                "customerNo": "C-11",
                "customerName": "Desert Trade Co",
                "currency": "USD",
            })),
        );
        let api = ShipmentApi::new(
            Arc::clone(&store) as Arc<dyn EntityStore>,
            Settings::default(),
        );
        (api, store, id)
    }

    fn charge(shipment_no: &str, category: ChargeCategory, amount: f64) -> Charge {
        Charge {
            id: None,
            shipment_no: shipment_no.to_string(),
            category,
            other_name: None,
            quantity: 1.0,
            amount,
            currency: "USD".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_open_session_rejects_blank_id() {
        let (api, _store, _id) = workbench();
        let result = api.open_session("  ").await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_row_ops_report_unknown_rows() {
        let (api, _store, id) = workbench();
        let mut session = api.open_session(&id).await.unwrap();

        let ghost = Uuid::new_v4();
        assert!(matches!(
            api.mark_dirty(&mut session, ghost),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            api.recalculate_row(&mut session, ghost, true),
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_charge_round_trip_and_totals() {
        let (api, _store, _id) = workbench();

        api.add_charge(&charge("DCL-5005", ChargeCategory::Freight, 100.0))
            .await
            .unwrap();
        api.add_charge(&charge("DCL-5005", ChargeCategory::Insurance, -30.0))
            .await
            .unwrap();
        api.add_charge(&charge("DCL-5005", ChargeCategory::Handling, 20.0))
            .await
            .unwrap();

        let listed = api.list_charges("DCL-5005").await.unwrap();
        assert_eq!(listed.len(), 3);

        let totals = api.charge_totals("DCL-5005").await.unwrap();
        assert_eq!(totals.total_charges, 120.0);
        assert_eq!(totals.total_discounts, 30.0);
        assert_eq!(totals.net_impact, 90.0);

        // 更新取列表里的行 (带 ID)
        let mut first = listed[0].clone();
        first.amount = 150.0;
        api.update_charge(&first).await.unwrap();
        let totals = api.charge_totals("DCL-5005").await.unwrap();
        assert_eq!(totals.total_charges, 170.0);

        let first_id = first.id.clone().unwrap();
        api.remove_charge(&first_id).await.unwrap();
        let totals = api.charge_totals("DCL-5005").await.unwrap();
        assert_eq!(totals.net_impact, -10.0);
    }

    #[tokio::test]
    async fn test_update_charge_requires_id() {
        let (api, _store, _id) = workbench();
        let unsaved = charge("DCL-5005", ChargeCategory::Packing, 5.0);
        assert!(matches!(
            api.update_charge(&unsaved).await,
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_container_package_view() {
        let (api, store, id) = workbench();
        let cont = store.seed(
            EntityKind::Container,
            record_from(json!({
                "shipmentNo": "DCL-5005",
                "code": "CONT-01",
                "kind": "40FT",
                "tareWeight": 3750.0,
            })),
        );
        store.seed(
            EntityKind::ContainerItem,
            record_from(json!({
                "containerId": cont,
                "lineItemId": "li-9",
                "quantity": 6.0,
            })),
        );

        let mut session = api.open_session(&id).await.unwrap();
        let containers = api.containers(&mut session).await.unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].code, "CONT-01");
        assert_eq!(containers[0].tare_weight, 3750.0);

        let items = api.container_items(&session, &cont).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line_item_id, "li-9");

        assert!(matches!(
            api.container_items(&session, " ").await,
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_update_details_guards_shipment_mismatch() {
        let (api, _store, id) = workbench();
        let mut session = api.open_session(&id).await.unwrap();

        let mut details = api.details(&mut session).await.unwrap();
        details.shipment_no = "DCL-OTHER".to_string();
        assert!(matches!(
            api.update_details(&mut session, details).await,
            Err(ApiError::InvalidInput(_))
        ));
    }
}

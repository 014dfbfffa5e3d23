// ==========================================
// 出口单证工作台 - 装运主记录与主数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::shipment::{Brand, CustomerModel, NotifyParty, Shipment, TermEntry};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::store::record::{get_date, get_datetime, get_i32, get_nonempty, get_string};
use crate::store::{fetch_all, fetch_first, EntityKind, EntityStore, Query, Record};
use chrono::Utc;
use std::sync::Arc;

// ==========================================
// ShipmentRepository - 装运主记录仓储
// ==========================================
pub struct ShipmentRepository {
    store: Arc<dyn EntityStore>,
}

impl ShipmentRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// 按实体库 ID 取装运主记录
    ///
    /// # 返回
    /// - Ok(Shipment): 找到记录
    /// - Err(NotFound): 记录不存在 (生成流程据此中止)
    pub async fn get_by_id(&self, id: &str) -> RepositoryResult<Shipment> {
        let record = self
            .store
            .fetch_by_id(EntityKind::Shipment, id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "shipments".to_string(),
                id: id.to_string(),
            })?;
        Ok(normalize_shipment(record))
    }

    /// 按装运单号取主记录
    pub async fn find_by_no(&self, shipment_no: &str) -> RepositoryResult<Option<Shipment>> {
        let record = fetch_first(
            self.store.as_ref(),
            EntityKind::Shipment,
            Query::new().eq("shipmentNo", shipment_no),
        )
        .await?;
        Ok(record.map(normalize_shipment))
    }
}

// ==========================================
// MasterDataRepository - 单证主数据仓储
// ==========================================
// 通知方 / 品牌 / 条款 / 客户,仅表头组装使用
pub struct MasterDataRepository {
    store: Arc<dyn EntityStore>,
}

impl MasterDataRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// 装运单的通知方文本,按显示顺序
    pub async fn notify_parties(&self, shipment_no: &str) -> RepositoryResult<Vec<NotifyParty>> {
        let records = fetch_all(
            self.store.as_ref(),
            EntityKind::NotifyParty,
            Query::new().eq("shipmentNo", shipment_no).order_asc("seq"),
        )
        .await?;
        Ok(records
            .into_iter()
            .map(|r| NotifyParty {
                id: get_nonempty(&r, "id"),
                shipment_no: get_string(&r, "shipmentNo"),
                seq: get_i32(&r, "seq"),
                text: get_string(&r, "text"),
            })
            .collect())
    }

    /// 品牌主数据 (受益人文本来源)
    pub async fn find_brand(&self, code: &str) -> RepositoryResult<Option<Brand>> {
        let record = fetch_first(
            self.store.as_ref(),
            EntityKind::Brand,
            Query::new().eq("code", code),
        )
        .await?;
        Ok(record.map(|r| Brand {
            code: get_string(&r, "code"),
            name: get_string(&r, "name"),
            beneficiary_text: get_string(&r, "beneficiaryText"),
        }))
    }

    /// 条款代码的显示文本,无映射时原样返回代码
    pub async fn term_text(&self, code: &str) -> RepositoryResult<String> {
        let record = fetch_first(
            self.store.as_ref(),
            EntityKind::Term,
            Query::new().eq("code", code),
        )
        .await?;
        Ok(record
            .map(|r| TermEntry {
                code: get_string(&r, "code"),
                text: get_string(&r, "text"),
            })
            .map(|t| t.text)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| code.to_string()))
    }

    /// 客户主数据
    pub async fn find_customer(
        &self,
        customer_no: &str,
    ) -> RepositoryResult<Option<CustomerModel>> {
        let record = fetch_first(
            self.store.as_ref(),
            EntityKind::CustomerModel,
            Query::new().eq("customerNo", customer_no),
        )
        .await?;
        Ok(record.map(|r| CustomerModel {
            customer_no: get_string(&r, "customerNo"),
            name: get_string(&r, "name"),
            address: get_nonempty(&r, "address"),
            country_code: get_nonempty(&r, "countryCode"),
        }))
    }
}

/// 松散记录 → 装运主记录
pub fn normalize_shipment(record: Record) -> Shipment {
    Shipment {
        id: get_string(&record, "id"),
        shipment_no: get_string(&record, "shipmentNo"),
        customer_no: get_string(&record, "customerNo"),
        customer_name: get_string(&record, "customerName"),
        destination_country: get_nonempty(&record, "destinationCountry"),
        destination: get_nonempty(&record, "destination"),
        vessel: get_nonempty(&record, "vessel"),
        port_of_loading: get_nonempty(&record, "portOfLoading"),
        port_of_discharge: get_nonempty(&record, "portOfDischarge"),
        payment_terms: get_nonempty(&record, "paymentTerms"),
        delivery_terms: get_nonempty(&record, "deliveryTerms"),
        currency: get_string(&record, "currency"),
        delivery_note: get_nonempty(&record, "deliveryNote"),
        invoice_no: get_nonempty(&record, "invoiceNo"),
        invoice_date: get_date(&record, "invoiceDate"),
        ship_date: get_date(&record, "shipDate"),
        brand_code: get_nonempty(&record, "brandCode"),
        created_at: get_datetime(&record, "createdAt").unwrap_or_else(Utc::now),
    }
}

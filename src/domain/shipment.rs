// ==========================================
// 出口单证工作台 - 装运主记录与主数据
// ==========================================
// 用途: 单证表头数据来源; 引擎层只读
// ==========================================

use crate::domain::types::DocType;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 国别缺失时进入单证编号的哨兵代码
pub const UNKNOWN_COUNTRY_CODE: &str = "XX";

// ==========================================
// Shipment - 装运主记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: String,          // 实体库 ID
    pub shipment_no: String, // 装运单号

    // ===== 客户 =====
    pub customer_no: String,   // 客户编号
    pub customer_name: String, // 客户名称

    // ===== 航运信息 =====
    pub destination_country: Option<String>, // 目的国代码 (缺失回退 "XX")
    pub destination: Option<String>,         // 目的地
    pub vessel: Option<String>,              // 船名/航次
    pub port_of_loading: Option<String>,     // 装货港
    pub port_of_discharge: Option<String>,   // 卸货港

    // ===== 商务条款 =====
    pub payment_terms: Option<String>,  // 付款条款代码
    pub delivery_terms: Option<String>, // 交货条款代码
    pub currency: String,               // 币种

    // ===== 单证信息 =====
    pub delivery_note: Option<String>,   // 交货单号
    pub invoice_no: Option<String>,      // 发票号
    pub invoice_date: Option<NaiveDate>, // 发票日期
    pub ship_date: Option<NaiveDate>,    // 装运日期
    pub brand_code: Option<String>,      // 品牌代码 (决定受益人文本)

    pub created_at: DateTime<Utc>, // 记录创建时间
}

impl Shipment {
    /// 单证编号: {类型代码}-{国别}-{装运单号}
    ///
    /// 国别缺失时使用哨兵 "XX",沿用既有编号规则不做修正
    pub fn document_no(&self, doc_type: DocType) -> String {
        let country = self
            .destination_country
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(UNKNOWN_COUNTRY_CODE);
        format!("{}-{}-{}", doc_type.code(), country, self.shipment_no)
    }
}

// ==========================================
// NotifyParty - 通知方
// ==========================================
// 单证表头 0..n 行通知方文本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyParty {
    pub id: Option<String>,  // 实体库 ID
    pub shipment_no: String, // 所属装运单号
    pub seq: i32,            // 显示顺序
    pub text: String,        // 通知方文本
}

// ==========================================
// Brand - 品牌主数据
// ==========================================
// 受益人文本按品牌切换
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub code: String,             // 品牌代码
    pub name: String,             // 品牌名称
    pub beneficiary_text: String, // 单证受益人文本
}

// ==========================================
// TermEntry - 条款主数据
// ==========================================
// 付款/交货条款代码到显示文本的映射
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermEntry {
    pub code: String, // 条款代码
    pub text: String, // 显示文本
}

// ==========================================
// CustomerModel - 客户主数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerModel {
    pub customer_no: String,          // 客户编号
    pub name: String,                 // 客户名称
    pub address: Option<String>,      // 地址
    pub country_code: Option<String>, // 国别代码
}

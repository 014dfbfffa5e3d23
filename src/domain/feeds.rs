// ==========================================
// 出口单证工作台 - 外部只读数据源
// ==========================================
// 红线: 本引擎不回写这些实体,只读取
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ArRecord - 应收台账行
// ==========================================
// 对账时的权威数据源; 单价/税额可能以负数记账,取绝对值使用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArRecord {
    pub order_no: String,  // 销售订单号
    pub item_no: String,   // 物料号
    pub quantity: f64,     // 台账数量
    pub unit_price: f64,   // 单价 (可能为负)
    pub vat_amount: f64,   // 增值税额 (可能为负)
    pub line_amount: f64,  // 行金额
}

impl ArRecord {
    /// 对账索引键 `order|item`
    pub fn ledger_key(&self) -> String {
        format!("{}|{}", self.order_no, self.item_no)
    }
}

// ==========================================
// HsCodeEntry - 海关编码表行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsCodeEntry {
    pub item_no: String,             // 物料号 (可能带千分位分隔)
    pub hs_code: String,             // 海关编码
    pub description: Option<String>, // 税则描述
}

// ==========================================
// DocumentIndexEntry - 单证索引行
// ==========================================
// 上传协作方确认成功后回写; 本侧只读查询
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentIndexEntry {
    pub id: Option<String>,                 // 实体库 ID
    pub shipment_id: String,                // 装运主记录 ID
    pub doc_type: String,                   // 单证类型代码 (CI/PL)
    pub language: String,                   // 单证语言 (en/ar)
    pub file_url: String,                   // 发布后的文件地址
    pub updated_at: Option<DateTime<Utc>>,  // 最近发布时间
}

// ==========================================
// ShippedOrder - 历史装运记录
// ==========================================
// 柜号/封号建议的数据来源
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippedOrder {
    pub order_no: Option<String>,         // 销售订单号
    pub item_no: Option<String>,          // 物料号
    pub delivery_note: Option<String>,    // 交货单号
    pub ship_date: Option<NaiveDate>,     // 装运日期 (排序主键)
    pub container_id: Option<String>,     // 原始柜号字段 (可能含 "/" 后缀)
    pub seal_no: Option<String>,          // 封号
    pub created_at: Option<DateTime<Utc>>, // 创建时间 (排序次键)
}

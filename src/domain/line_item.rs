// ==========================================
// 出口单证工作台 - 装运行项目模型
// ==========================================
// 红线: 派生字段只由重算引擎写入,锁定集合由编辑层维护
// 用途: 行编辑会话的内存模型,保存时映射为实体库载荷
// ==========================================

use crate::domain::types::{DerivedField, ValueType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

// ==========================================
// LineItem - 装运行项目
// ==========================================
// 红线: pending_qty = ordered_qty - loaded_qty 恒成立,与锁定状态无关
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    // ===== 标识 =====
    pub row_uid: Uuid,        // 客户端行标识 (脏行集合的键,与持久化无关)
    pub id: Option<String>,   // 实体库 ID (None = 尚未保存)
    pub shipment_no: String,  // 所属装运单号
    pub order_no: String,     // 销售订单号
    pub item_no: String,      // 物料号

    // ===== 基础信息 =====
    pub description: String,          // 品名描述
    pub released: bool,               // 放行标志
    pub packaging: String,            // 包装描述 (如 "30x4" / "20L")
    pub package_type: Option<String>, // 包装形式
    pub hs_code: Option<String>,      // 海关编码
    pub container_no: Option<String>, // 行所属柜号 (装箱单分组依据)

    // ===== 数量 =====
    pub ordered_qty: f64, // 订单数量
    pub loaded_qty: f64,  // 本次装载数量 (可编辑)
    pub pending_qty: f64, // 待装数量 (派生: ordered - loaded)
    pub uom_factor: f64,  // 单位体积因子 (派生自 packaging,不可锁定)

    // ===== 托盘 =====
    pub palletized: bool,   // 是否托盘化
    pub pallet_count: f64,  // 托盘数量
    pub pallet_weight: f64, // 托盘重量 (派生,不可锁定)

    // ===== 重量与体积 =====
    pub total_volume: f64, // 总体积 (派生,可锁定)
    pub net_weight: f64,   // 净重 (派生,可锁定)
    pub gross_weight: f64, // 毛重 (派生,可锁定)

    // ===== 金额 =====
    pub value_type: ValueType, // 计价类型
    pub unit_price: f64,       // 单价
    pub vat_amount: f64,       // 增值税额
    pub total_excl_vat: f64,   // 未税金额 (派生,可锁定)
    pub total_incl_vat: f64,   // 含税金额 (派生,可锁定)

    // ===== 锁定与审计 =====
    pub overridden: HashSet<DerivedField>, // 手工锁定的派生字段
    pub created_at: Option<DateTime<Utc>>, // 实体库创建时间 (重查时取最新一条)
}

impl LineItem {
    /// 构造空白行 (测试与规范化入口使用)
    pub fn new(shipment_no: &str, order_no: &str, item_no: &str) -> Self {
        LineItem {
            row_uid: Uuid::new_v4(),
            id: None,
            shipment_no: shipment_no.to_string(),
            order_no: order_no.to_string(),
            item_no: item_no.to_string(),
            description: String::new(),
            released: false,
            packaging: String::new(),
            package_type: None,
            hs_code: None,
            container_no: None,
            ordered_qty: 0.0,
            loaded_qty: 0.0,
            pending_qty: 0.0,
            uom_factor: 0.0,
            palletized: false,
            pallet_count: 0.0,
            pallet_weight: 0.0,
            total_volume: 0.0,
            net_weight: 0.0,
            gross_weight: 0.0,
            value_type: ValueType::SalePrice,
            unit_price: 0.0,
            vat_amount: 0.0,
            total_excl_vat: 0.0,
            total_incl_vat: 0.0,
            overridden: HashSet::new(),
            created_at: None,
        }
    }

    /// 是否已持久化 (有实体库 ID)
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// 复合业务键 (shipment, order, item) - 新建行重查的依据
    pub fn composite_key(&self) -> (&str, &str, &str) {
        (&self.shipment_no, &self.order_no, &self.item_no)
    }

    /// 台账对账键 `order|item`
    pub fn ledger_key(&self) -> String {
        format!("{}|{}", self.order_no, self.item_no)
    }

    /// 锁定派生字段 (首次手工编辑该字段时调用)
    pub fn pin(&mut self, field: DerivedField) {
        self.overridden.insert(field);
    }

    /// 解除锁定
    pub fn unpin(&mut self, field: DerivedField) {
        self.overridden.remove(&field);
    }

    /// 字段是否已被手工锁定
    pub fn is_pinned(&self, field: DerivedField) -> bool {
        self.overridden.contains(&field)
    }
}

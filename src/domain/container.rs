// ==========================================
// 出口单证工作台 - 集装箱模型
// ==========================================
// 红线: 汇总字段仅供参考,单证合计以行项目重算为准
// ==========================================

use crate::domain::types::ContainerKind;
use serde::{Deserialize, Serialize};

// ==========================================
// Container - 集装箱记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub id: Option<String>,   // 实体库 ID
    pub shipment_no: String,  // 所属装运单号
    pub code: String,         // 柜号
    pub kind: ContainerKind,  // 运载方式
    pub tare_weight: f64,     // 自重

    // ===== 汇总字段 (参考值,非权威) =====
    pub total_qty: f64,          // 件数汇总
    pub total_net_weight: f64,   // 净重汇总
    pub total_gross_weight: f64, // 毛重汇总
}

// ==========================================
// ContainerItem - 箱货关联
// ==========================================
// Container × LineItem 关联,带装载数量
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerItem {
    pub id: Option<String>,   // 实体库 ID
    pub container_id: String, // 集装箱 ID
    pub line_item_id: String, // 行项目 ID
    pub quantity: f64,        // 该柜装载数量
}

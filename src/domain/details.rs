// ==========================================
// 出口单证工作台 - 附加信息模型
// ==========================================
// 每个装运单至多一条,首次访问时惰性创建
// ==========================================

use crate::domain::types::PrintTarget;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==========================================
// AdditionalDetails - 装运附加信息
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditionalDetails {
    pub id: Option<String>,         // 实体库 ID
    pub shipment_no: String,        // 所属装运单号
    pub print_target: PrintTarget,  // 打印目标 (NONE/CI/PL/BOTH)
    pub hidden_fields: HashSet<String>, // 单证表头中隐藏的字段键

    // ===== 包装汇总 =====
    pub pallets: f64,  // 托盘数
    pub cartons: f64,  // 纸箱数
    pub drums: f64,    // 桶数
    pub pails: f64,    // 提桶数
    pub packages: f64, // 总件数

    // ===== 重量汇总 =====
    pub net_weight: f64,   // 净重
    pub gross_weight: f64, // 毛重

    pub comment: String, // 自由文本备注
}

impl AdditionalDetails {
    /// 指定装运单的空白附加信息 (惰性创建的初值)
    pub fn empty(shipment_no: &str) -> Self {
        AdditionalDetails {
            id: None,
            shipment_no: shipment_no.to_string(),
            print_target: PrintTarget::None,
            hidden_fields: HashSet::new(),
            pallets: 0.0,
            cartons: 0.0,
            drums: 0.0,
            pails: 0.0,
            packages: 0.0,
            net_weight: 0.0,
            gross_weight: 0.0,
            comment: String::new(),
        }
    }

    /// 表头字段是否被隐藏
    pub fn is_hidden(&self, field_key: &str) -> bool {
        self.hidden_fields.contains(field_key)
    }
}

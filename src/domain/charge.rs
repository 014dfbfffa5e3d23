// ==========================================
// 出口单证工作台 - 杂费模型
// ==========================================
// 符号约定: 金额为负 = 折扣, >= 0 = 费用
// ==========================================

use crate::domain::types::ChargeCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Charge - 杂费/折扣行
// ==========================================
// 用途: 商业发票合计区按创建顺序逐行打印
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    pub id: Option<String>,         // 实体库 ID
    pub shipment_no: String,        // 所属装运单号
    pub category: ChargeCategory,   // 杂费类别
    pub other_name: Option<String>, // OTHER 类别的自由文本子名称
    pub quantity: f64,              // 数量
    pub amount: f64,                // 有符号金额 (负数为折扣)
    pub currency: String,           // 币种
    pub created_at: DateTime<Utc>,  // 创建时间 (打印顺序依据)
}

impl Charge {
    /// 该行是否为折扣
    pub fn is_discount(&self) -> bool {
        self.amount < 0.0
    }

    /// 单证上显示的名称: OTHER 类别优先用子名称
    pub fn display_name(&self, locale: &str) -> String {
        match (&self.category, &self.other_name) {
            (ChargeCategory::Other, Some(name)) if !name.trim().is_empty() => name.clone(),
            _ => crate::i18n::label(self.category.label_key(), locale),
        }
    }
}

// ==========================================
// 出口单证工作台 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与实体库字段一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 计价类型 (Value Type)
// ==========================================
// 红线: PRICELESS 行的未税金额恒为 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    SalePrice, // 销售价
    Foc,       // 免费货
    Priceless, // 无价样品
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_store_str())
    }
}

impl ValueType {
    /// 从实体库字符串解析计价类型
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "FOC" => ValueType::Foc,
            "PRICELESS" => ValueType::Priceless,
            _ => ValueType::SalePrice, // 默认值
        }
    }

    /// 转换为实体库存储的字符串
    pub fn to_store_str(&self) -> &'static str {
        match self {
            ValueType::SalePrice => "SALE_PRICE",
            ValueType::Foc => "FOC",
            ValueType::Priceless => "PRICELESS",
        }
    }

    /// 该计价类型下金额是否参与合计
    pub fn carries_value(&self) -> bool {
        !matches!(self, ValueType::Priceless)
    }
}

// ==========================================
// 运载方式 (Container Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerKind {
    #[serde(rename = "20FT")]
    Ft20, // 20尺柜
    #[serde(rename = "40FT")]
    Ft40, // 40尺柜
    #[serde(rename = "TRUCK")]
    Truck, // 卡车
    #[serde(rename = "BULK_TANKER")]
    BulkTanker, // 散装罐车
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_store_str())
    }
}

impl ContainerKind {
    /// 从实体库字符串解析运载方式
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "40FT" => ContainerKind::Ft40,
            "TRUCK" => ContainerKind::Truck,
            "BULK_TANKER" => ContainerKind::BulkTanker,
            _ => ContainerKind::Ft20, // 默认值
        }
    }

    /// 转换为实体库存储的字符串
    pub fn to_store_str(&self) -> &'static str {
        match self {
            ContainerKind::Ft20 => "20FT",
            ContainerKind::Ft40 => "40FT",
            ContainerKind::Truck => "TRUCK",
            ContainerKind::BulkTanker => "BULK_TANKER",
        }
    }
}

// ==========================================
// 杂费类别 (Charge Category)
// ==========================================
// 闭合集合; OTHER 类别携带自由文本子名称 (Charge.other_name)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeCategory {
    Freight,       // 运费
    Insurance,     // 保险费
    Inspection,    // 检验费
    Certification, // 认证费
    Handling,      // 操作费
    Packing,       // 包装费
    Other,         // 其他费用
}

impl fmt::Display for ChargeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_store_str())
    }
}

impl ChargeCategory {
    /// 从实体库字符串解析杂费类别
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "FREIGHT" => ChargeCategory::Freight,
            "INSURANCE" => ChargeCategory::Insurance,
            "INSPECTION" => ChargeCategory::Inspection,
            "CERTIFICATION" => ChargeCategory::Certification,
            "HANDLING" => ChargeCategory::Handling,
            "PACKING" => ChargeCategory::Packing,
            _ => ChargeCategory::Other,
        }
    }

    /// 转换为实体库存储的字符串
    pub fn to_store_str(&self) -> &'static str {
        match self {
            ChargeCategory::Freight => "FREIGHT",
            ChargeCategory::Insurance => "INSURANCE",
            ChargeCategory::Inspection => "INSPECTION",
            ChargeCategory::Certification => "CERTIFICATION",
            ChargeCategory::Handling => "HANDLING",
            ChargeCategory::Packing => "PACKING",
            ChargeCategory::Other => "OTHER",
        }
    }

    /// 单证上显示名称的标签键
    pub fn label_key(&self) -> &'static str {
        match self {
            ChargeCategory::Freight => "doc.charge.freight",
            ChargeCategory::Insurance => "doc.charge.insurance",
            ChargeCategory::Inspection => "doc.charge.inspection",
            ChargeCategory::Certification => "doc.charge.certification",
            ChargeCategory::Handling => "doc.charge.handling",
            ChargeCategory::Packing => "doc.charge.packing",
            ChargeCategory::Other => "doc.charge.other",
        }
    }
}

// ==========================================
// 附加信息打印目标 (Print Target)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrintTarget {
    None, // 不打印
    Ci,   // 仅商业发票
    Pl,   // 仅装箱单
    Both, // 两者都打印
}

impl PrintTarget {
    /// 判断附加信息是否应出现在指定单证上
    pub fn includes(&self, doc_type: DocType) -> bool {
        match self {
            PrintTarget::None => false,
            PrintTarget::Both => true,
            PrintTarget::Ci => doc_type == DocType::CommercialInvoice,
            PrintTarget::Pl => doc_type == DocType::PackingList,
        }
    }

    /// 从实体库字符串解析打印目标
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "CI" => PrintTarget::Ci,
            "PL" => PrintTarget::Pl,
            "BOTH" => PrintTarget::Both,
            _ => PrintTarget::None, // 默认值
        }
    }

    /// 转换为实体库存储的字符串
    pub fn to_store_str(&self) -> &'static str {
        match self {
            PrintTarget::None => "NONE",
            PrintTarget::Ci => "CI",
            PrintTarget::Pl => "PL",
            PrintTarget::Both => "BOTH",
        }
    }
}

// ==========================================
// 单证类型 (Document Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocType {
    CommercialInvoice, // 商业发票
    PackingList,       // 装箱单
}

impl DocType {
    /// 短代码,用于文件名与单证编号
    pub fn code(&self) -> &'static str {
        match self {
            DocType::CommercialInvoice => "CI",
            DocType::PackingList => "PL",
        }
    }

    /// 单证标题的标签键
    pub fn title_key(&self) -> &'static str {
        match self {
            DocType::CommercialInvoice => "doc.ci_title",
            DocType::PackingList => "doc.pl_title",
        }
    }

    /// 从短代码解析单证类型
    pub fn from_code(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PL" | "PACKING_LIST" => DocType::PackingList,
            _ => DocType::CommercialInvoice, // 默认值
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 单证语言 (Document Language)
// ==========================================
// 红线: 语言决定整张表的文字方向,阿拉伯语单证整体镜像
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocLanguage {
    English, // 英语 (LTR)
    Arabic,  // 阿拉伯语 (RTL)
}

impl DocLanguage {
    /// 对应的 locale 代码
    pub fn locale(&self) -> &'static str {
        match self {
            DocLanguage::English => "en",
            DocLanguage::Arabic => "ar",
        }
    }

    /// 该语言的文字方向
    pub fn direction(&self) -> Direction {
        match self {
            DocLanguage::English => Direction::Ltr,
            DocLanguage::Arabic => Direction::Rtl,
        }
    }

    /// 从 locale 代码解析语言
    pub fn from_locale(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "ar" => DocLanguage::Arabic,
            _ => DocLanguage::English, // 默认值
        }
    }
}

impl fmt::Display for DocLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.locale())
    }
}

// ==========================================
// 文字方向 (Direction)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Ltr, // 从左到右
    Rtl, // 从右到左
}

impl Direction {
    pub fn is_rtl(&self) -> bool {
        matches!(self, Direction::Rtl)
    }
}

// ==========================================
// 可锁定的派生字段 (Derived Field)
// ==========================================
// 红线: pending_qty / uom_factor / pallet_weight 永远重算,不在此集合内
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DerivedField {
    TotalVolume,  // 总体积
    NetWeight,    // 净重
    GrossWeight,  // 毛重
    TotalExclVat, // 未税金额
    TotalInclVat, // 含税金额
}

impl fmt::Display for DerivedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_store_str())
    }
}

impl DerivedField {
    /// 从实体库字符串解析派生字段名
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "TOTAL_VOLUME" => Some(DerivedField::TotalVolume),
            "NET_WEIGHT" => Some(DerivedField::NetWeight),
            "GROSS_WEIGHT" => Some(DerivedField::GrossWeight),
            "TOTAL_EXCL_VAT" => Some(DerivedField::TotalExclVat),
            "TOTAL_INCL_VAT" => Some(DerivedField::TotalInclVat),
            _ => None,
        }
    }

    /// 转换为实体库存储的字符串
    pub fn to_store_str(&self) -> &'static str {
        match self {
            DerivedField::TotalVolume => "TOTAL_VOLUME",
            DerivedField::NetWeight => "NET_WEIGHT",
            DerivedField::GrossWeight => "GROSS_WEIGHT",
            DerivedField::TotalExclVat => "TOTAL_EXCL_VAT",
            DerivedField::TotalInclVat => "TOTAL_INCL_VAT",
        }
    }
}

// ==========================================
// 出口单证工作台 - 单证页面模型
// ==========================================
// 职责: 描述一张单证的结构化内容,与渲染格式无关
// 生命周期: 仅在一次生成流程内 (组装 → 渲染 → 丢弃)
// ==========================================

use crate::domain::types::{Direction, DocLanguage, DocType};
use serde::{Deserialize, Serialize};

// ==========================================
// ColumnKind - 明细表列类型
// ==========================================
// 列集合由组装器按单证类型与数据动态决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnKind {
    Seq,         // 序号
    Item,        // 物料号
    Description, // 品名
    HsCode,      // 海关编码 (按需)
    Packages,    // 件数
    Qty,         // 数量
    UnitPrice,   // 单价
    Amount,      // 未税金额
    Vat,         // 增值税 (按需)
    AmountIncl,  // 含税金额 (按需)
    Volume,      // 体积
    NetWeight,   // 净重
    GrossWeight, // 毛重
}

impl ColumnKind {
    /// 表头标签键
    pub fn label_key(&self) -> &'static str {
        match self {
            ColumnKind::Seq => "doc.col.seq",
            ColumnKind::Item => "doc.col.item",
            ColumnKind::Description => "doc.col.description",
            ColumnKind::HsCode => "doc.col.hs_code",
            ColumnKind::Packages => "doc.col.packages",
            ColumnKind::Qty => "doc.col.qty",
            ColumnKind::UnitPrice => "doc.col.unit_price",
            ColumnKind::Amount => "doc.col.amount",
            ColumnKind::Vat => "doc.col.vat",
            ColumnKind::AmountIncl => "doc.col.amount_incl",
            ColumnKind::Volume => "doc.col.volume",
            ColumnKind::NetWeight => "doc.col.net_weight",
            ColumnKind::GrossWeight => "doc.col.gross_weight",
        }
    }

    /// 数值列右对齐 (RTL 单证镜像后左对齐)
    pub fn is_numeric(&self) -> bool {
        !matches!(
            self,
            ColumnKind::Item | ColumnKind::Description | ColumnKind::HsCode
        )
    }
}

// ==========================================
// DocColumn - 明细表列
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocColumn {
    pub kind: ColumnKind, // 列类型
    pub label: String,    // 已本地化的表头文字
}

// ==========================================
// CellValue - 单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Qty(f64),   // 数量/重量/体积 (3 位小数)
    Money(f64), // 金额 (2 位小数)
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

// ==========================================
// TableRow - 明细表行
// ==========================================
// 合计行作为表行追加,不另设合计区
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TableRow {
    /// 普通明细行,单元格按列顺序排列
    Item(Vec<CellValue>),
    /// 合计行: 标签占首列区,数值对齐到指定列下方
    Total {
        label: String,
        cells: Vec<CellValue>,
        bold: bool,
    },
    /// 跨全表宽的单值行 (税额合计/总计/杂费行)
    FullWidth {
        label: String,
        value: CellValue,
        bold: bool,
    },
}

// ==========================================
// DocSection - 明细分段
// ==========================================
// 商业发票单段; 装箱单每柜一段,段间合计互不串扰
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocSection {
    pub band: Option<String>, // 段横幅 (装箱单的柜号条)
    pub rows: Vec<TableRow>,  // 明细与合计行
}

// ==========================================
// FieldCell / FieldRow - 表头字段栅格
// ==========================================
// 两列栅格; 两侧皆空的行在组装时剔除,不渲染空标签
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldCell {
    pub label: String, // 已本地化标签
    pub value: String, // 字段值
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRow {
    pub left: Option<FieldCell>,
    pub right: Option<FieldCell>,
}

impl FieldRow {
    /// 两侧是否都没有可显示内容
    pub fn is_blank(&self) -> bool {
        let side_blank = |c: &Option<FieldCell>| match c {
            None => true,
            Some(cell) => cell.value.trim().is_empty(),
        };
        side_blank(&self.left) && side_blank(&self.right)
    }
}

// ==========================================
// DetailsBlock - 附加信息块
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailsBlock {
    pub fields: Vec<FieldCell>,  // 非零汇总项 (标签已本地化)
    pub comment: Option<String>, // 备注文本
}

// ==========================================
// DocumentModel - 单证页面模型
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentModel {
    pub doc_type: DocType,     // 单证类型
    pub language: DocLanguage, // 单证语言
    pub direction: Direction,  // 文字方向 (由语言决定)

    pub title: String,       // 单证标题 (已本地化)
    pub document_no: String, // 单证编号
    pub shipment_no: String, // 装运单号

    pub header_fields: Vec<FieldRow>,  // 表头字段栅格
    pub beneficiary: Option<String>,   // 品牌受益人文本
    pub notify_parties: Vec<String>,   // 通知方行 (0..n)
    pub notify_label: String,          // 通知方块标签 (有通知方时渲染)

    pub columns: Vec<DocColumn>,      // 明细表列 (LTR 顺序,渲染时按方向镜像)
    pub sections: Vec<DocSection>,    // 明细分段
    pub details: Option<DetailsBlock>, // 附加信息块 (按打印目标取舍)

    pub footer: String, // 页脚文本
}

impl DocumentModel {
    /// 明细表总列数
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// 指定列类型在列表中的位置
    pub fn column_index(&self, kind: ColumnKind) -> Option<usize> {
        self.columns.iter().position(|c| c.kind == kind)
    }

    /// 是否包含指定列
    pub fn has_column(&self, kind: ColumnKind) -> bool {
        self.column_index(kind).is_some()
    }
}

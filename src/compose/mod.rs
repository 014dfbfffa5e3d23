// ==========================================
// 出口单证工作台 - 单证组装层
// ==========================================
// 职责: 把装运数据组装为结构化页面模型并渲染为电子表格
// 输入: 会话层取好的 DocumentData (组装本身为同步纯计算)
// 输出: DocumentModel → SpreadsheetML 字节流 → 上传协作方
// ==========================================

pub mod header;
pub mod invoice;
pub mod labels;
pub mod packing;
pub mod render;
pub mod upload;

pub use invoice::InvoiceComposer;
pub use labels::LabelSet;
pub use packing::PackingComposer;
pub use render::{SpreadsheetRenderer, DOC_FILE_EXTENSION};
pub use upload::{DocumentUploader, MemoryUploader, UploadError, UploadOutcome, UploadRequest};

use crate::domain::charge::Charge;
use crate::domain::details::AdditionalDetails;
use crate::domain::document::{CellValue, ColumnKind, DocColumn, DocumentModel};
use crate::domain::line_item::LineItem;
use crate::domain::shipment::{Brand, CustomerModel, NotifyParty, Shipment};
use crate::domain::types::{DocLanguage, DocType};
use serde::{Deserialize, Serialize};

// ==========================================
// ComposeOptions - 列选项
// ==========================================
// 海关编码列按请求取舍; 增值税列由数据决定,不在选项内
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeOptions {
    pub include_hs: bool, // 是否加入海关编码列
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self { include_hs: false }
    }
}

// ==========================================
// DocumentData - 组装输入包
// ==========================================
// 一次生成流程内由会话层收集,组装器不再访问实体库
#[derive(Debug, Clone)]
pub struct DocumentData {
    pub shipment: Shipment,
    pub customer: Option<CustomerModel>,
    pub brand: Option<Brand>,
    pub notify_parties: Vec<NotifyParty>,
    pub payment_terms_text: Option<String>, // 付款条款显示文本 (代码已解析)
    pub delivery_terms_text: Option<String>, // 交货条款显示文本
    pub rows: Vec<LineItem>,
    pub charges: Vec<Charge>, // 按创建时间升序
    pub details: Option<AdditionalDetails>,
}

/// 按单证类型分派组装
///
/// # 参数
/// - data: 组装输入包
/// - doc_type: 单证类型 (商业发票/装箱单)
/// - language: 单证语言 (决定标签与方向)
/// - options: 列选项
pub fn compose(
    data: &DocumentData,
    doc_type: DocType,
    language: DocLanguage,
    options: ComposeOptions,
) -> DocumentModel {
    match doc_type {
        DocType::CommercialInvoice => InvoiceComposer::new().compose(data, language, options),
        DocType::PackingList => PackingComposer::new().compose(data, language, options),
    }
}

/// 明细行单元格取值 (商业发票与装箱单共用)
pub(crate) fn item_cell(kind: ColumnKind, seq: usize, row: &LineItem) -> CellValue {
    match kind {
        ColumnKind::Seq => CellValue::Int(seq as i64),
        ColumnKind::Item => CellValue::Text(row.item_no.clone()),
        ColumnKind::Description => CellValue::Text(row.description.clone()),
        ColumnKind::HsCode => text_or_empty(row.hs_code.as_deref()),
        ColumnKind::Packages => package_display(row),
        ColumnKind::Qty => CellValue::Qty(row.loaded_qty),
        ColumnKind::UnitPrice => CellValue::Money(row.unit_price),
        ColumnKind::Amount => CellValue::Money(row.total_excl_vat),
        ColumnKind::Vat => CellValue::Money(row.vat_amount),
        ColumnKind::AmountIncl => CellValue::Money(row.total_incl_vat),
        ColumnKind::Volume => CellValue::Qty(row.total_volume),
        ColumnKind::NetWeight => CellValue::Qty(row.net_weight),
        ColumnKind::GrossWeight => CellValue::Qty(row.gross_weight),
    }
}

/// 件列显示: 包装形式优先,其次包装描述
fn package_display(row: &LineItem) -> CellValue {
    match row.package_type.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => CellValue::Text(t.to_string()),
        None => text_or_empty(Some(row.packaging.as_str())),
    }
}

fn text_or_empty(value: Option<&str>) -> CellValue {
    match value.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => CellValue::Text(t.to_string()),
        None => CellValue::Empty,
    }
}

/// 合计行单元格: 全 Empty,指定列填入数值
pub(crate) fn total_cells(
    columns: &[DocColumn],
    entries: &[(ColumnKind, CellValue)],
) -> Vec<CellValue> {
    let mut cells = vec![CellValue::Empty; columns.len()];
    for (kind, value) in entries {
        if let Some(i) = columns.iter().position(|c| c.kind == *kind) {
            cells[i] = value.clone();
        }
    }
    cells
}

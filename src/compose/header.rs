// ==========================================
// 出口单证工作台 - 单证表头组装
// ==========================================
// 职责: 标题/编号/字段栅格/受益人/通知方/附加信息块
// 红线: 两侧皆空的栅格行不产出; 空标签永不渲染
// ==========================================

use crate::compose::labels::LabelSet;
use crate::compose::DocumentData;
use crate::domain::details::AdditionalDetails;
use crate::domain::document::{DetailsBlock, FieldCell, FieldRow};
use crate::domain::types::DocType;
use chrono::NaiveDate;

// ==========================================
// HeaderBlock - 表头组装结果
// ==========================================
#[derive(Debug, Clone)]
pub struct HeaderBlock {
    pub title: String,               // 单证标题
    pub document_no: String,         // 单证编号 (原始值,另入栅格首行)
    pub header_fields: Vec<FieldRow>, // 字段栅格 (已剔除全空行)
    pub beneficiary: Option<String>, // 品牌受益人文本
    pub notify_parties: Vec<String>, // 通知方行
    pub notify_label: String,        // 通知方块标签
    pub footer: String,              // 页脚文本
}

/// 组装单证表头
///
/// 栅格配对固定; 某侧值为空时该侧整体不产出 (含标签),
/// 两侧皆空的行整行剔除。附加信息中标记隐藏的字段键同样不产出。
pub fn compose_header(data: &DocumentData, doc_type: DocType, labels: &LabelSet) -> HeaderBlock {
    let shipment = &data.shipment;
    let title = labels.text(doc_type.title_key());
    let document_no = shipment.document_no(doc_type);
    let details = data.details.as_ref();

    let cell = |key: &str, label_key: &str, value: Option<String>| -> Option<FieldCell> {
        if details.map(|d| d.is_hidden(key)).unwrap_or(false) {
            return None;
        }
        let value = value?;
        if value.trim().is_empty() {
            return None;
        }
        Some(FieldCell {
            label: labels.text(label_key),
            value,
        })
    };

    let customer_value = customer_display(data);
    let doc_date = shipment.invoice_date.or(shipment.ship_date);

    let rows = vec![
        FieldRow {
            left: cell("document_no", "doc.document_no", Some(document_no.clone())),
            right: cell("date", "doc.date", fmt_date(doc_date)),
        },
        FieldRow {
            left: cell("invoice_no", "doc.invoice_no", shipment.invoice_no.clone()),
            right: cell(
                "delivery_note",
                "doc.delivery_note",
                shipment.delivery_note.clone(),
            ),
        },
        FieldRow {
            left: cell("customer", "doc.customer", Some(customer_value)),
            right: cell("destination", "doc.destination", shipment.destination.clone()),
        },
        FieldRow {
            left: cell(
                "port_of_loading",
                "doc.port_of_loading",
                shipment.port_of_loading.clone(),
            ),
            right: cell(
                "port_of_discharge",
                "doc.port_of_discharge",
                shipment.port_of_discharge.clone(),
            ),
        },
        FieldRow {
            left: cell("vessel", "doc.vessel", shipment.vessel.clone()),
            right: cell(
                "payment_terms",
                "doc.payment_terms",
                data.payment_terms_text.clone(),
            ),
        },
        FieldRow {
            left: cell(
                "delivery_terms",
                "doc.delivery_terms",
                data.delivery_terms_text.clone(),
            ),
            right: cell("currency", "doc.currency", Some(shipment.currency.clone())),
        },
    ];

    let header_fields = rows.into_iter().filter(|r| !r.is_blank()).collect();

    let beneficiary = data
        .brand
        .as_ref()
        .map(|b| b.beneficiary_text.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string());

    let notify_parties = data
        .notify_parties
        .iter()
        .map(|p| p.text.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect();

    let footer = labels.text_with(
        "doc.footer",
        &[("title", title.as_str()), ("shipment", shipment.shipment_no.as_str())],
    );

    HeaderBlock {
        title,
        document_no,
        header_fields,
        beneficiary,
        notify_parties,
        notify_label: labels.text("doc.notify_party"),
        footer,
    }
}

/// 组装附加信息块
///
/// 打印目标不含当前单证类型时返回 None; 汇总项仅收非零值
pub fn compose_details(
    details: Option<&AdditionalDetails>,
    doc_type: DocType,
    labels: &LabelSet,
) -> Option<DetailsBlock> {
    let details = details?;
    if !details.print_target.includes(doc_type) {
        return None;
    }

    let mut fields = Vec::new();
    let mut push_count = |key: &str, value: f64| {
        if value != 0.0 {
            fields.push(FieldCell {
                label: labels.text(key),
                value: fmt_count(value),
            });
        }
    };
    push_count("doc.details.pallets", details.pallets);
    push_count("doc.details.cartons", details.cartons);
    push_count("doc.details.drums", details.drums);
    push_count("doc.details.pails", details.pails);
    push_count("doc.details.packages", details.packages);

    if details.net_weight != 0.0 {
        fields.push(FieldCell {
            label: labels.text("doc.details.net_weight"),
            value: fmt_weight(details.net_weight),
        });
    }
    if details.gross_weight != 0.0 {
        fields.push(FieldCell {
            label: labels.text("doc.details.gross_weight"),
            value: fmt_weight(details.gross_weight),
        });
    }

    let comment = {
        let text = details.comment.trim();
        if text.is_empty() {
            None
        } else {
            Some(format!("{}: {}", labels.text("doc.details.comment"), text))
        }
    };

    if fields.is_empty() && comment.is_none() {
        return None;
    }
    Some(DetailsBlock { fields, comment })
}

/// 客户显示值: 装运上的客户名称,客户主数据有地址时拼接
fn customer_display(data: &DocumentData) -> String {
    let name = if !data.shipment.customer_name.trim().is_empty() {
        data.shipment.customer_name.clone()
    } else {
        data.customer
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_default()
    };
    let address = data
        .customer
        .as_ref()
        .and_then(|c| c.address.as_deref())
        .map(str::trim)
        .filter(|a| !a.is_empty());
    match address {
        Some(addr) if !name.trim().is_empty() => format!("{}, {}", name, addr),
        Some(addr) => addr.to_string(),
        None => name,
    }
}

fn fmt_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%d/%m/%Y").to_string())
}

/// 件数类数值显示 (无小数位)
pub(crate) fn fmt_count(value: f64) -> String {
    format!("{:.0}", value)
}

/// 重量类数值显示 (两位小数)
pub(crate) fn fmt_weight(value: f64) -> String {
    format!("{:.2}", value)
}

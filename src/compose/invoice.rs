// ==========================================
// 出口单证工作台 - 商业发票组装
// ==========================================
// 职责: 行集合 + 杂费 → 商业发票页面模型
// 红线: 列集合按数据动态取舍; 合计以表行追加
// ==========================================

use crate::compose::header::{compose_details, compose_header};
use crate::compose::labels::LabelSet;
use crate::compose::{item_cell, total_cells, ComposeOptions, DocumentData};
use crate::domain::document::{CellValue, ColumnKind, DocColumn, DocSection, DocumentModel, TableRow};
use crate::domain::types::{DocLanguage, DocType};
use crate::engine::charges::ChargesAggregator;
use tracing::instrument;

// ==========================================
// InvoiceComposer - 商业发票组装器
// ==========================================
pub struct InvoiceComposer;

impl InvoiceComposer {
    pub fn new() -> Self {
        Self
    }

    /// 组装商业发票
    ///
    /// 组装规则:
    /// 1. 列集合动态决定: 任一行增值税非零 → 增值税列+含税列; 选项要求 → 海关编码列
    /// 2. 明细行按行集合当前顺序产出
    /// 3. 合计以表行追加: 总件数 → 未税小计(仅显示税列时) → 杂费(按创建顺序)
    ///    → 税额合计(通栏) → 总计(通栏加粗)
    /// 4. 总计 = 未税小计 + 杂费净额 + 税额合计
    /// 5. 零明细装运仍产出完整表头表尾
    #[instrument(skip(self, data, options), fields(shipment = %data.shipment.shipment_no, rows = data.rows.len()))]
    pub fn compose(
        &self,
        data: &DocumentData,
        language: DocLanguage,
        options: ComposeOptions,
    ) -> DocumentModel {
        let labels = LabelSet::for_language(language);
        let header = compose_header(data, DocType::CommercialInvoice, &labels);

        let has_vat = data.rows.iter().any(|r| r.vat_amount != 0.0);
        let columns = self.select_columns(&labels, has_vat, options.include_hs);

        let mut rows: Vec<TableRow> = Vec::with_capacity(data.rows.len() + 4);
        for (i, item) in data.rows.iter().enumerate() {
            let cells = columns
                .iter()
                .map(|c| item_cell(c.kind, i + 1, item))
                .collect();
            rows.push(TableRow::Item(cells));
        }

        let total_packages: f64 = data.rows.iter().map(|r| r.loaded_qty).sum();
        let subtotal_excl: f64 = data.rows.iter().map(|r| r.total_excl_vat).sum();
        let vat_total: f64 = data.rows.iter().map(|r| r.vat_amount).sum();

        rows.push(TableRow::Total {
            label: labels.text("doc.total.packages"),
            cells: total_cells(&columns, &[(ColumnKind::Qty, CellValue::Qty(total_packages))]),
            bold: false,
        });

        if has_vat {
            rows.push(TableRow::Total {
                label: labels.text("doc.total.subtotal_excl"),
                cells: total_cells(&columns, &[(ColumnKind::Amount, CellValue::Money(subtotal_excl))]),
                bold: false,
            });
        }

        for charge in &data.charges {
            rows.push(TableRow::FullWidth {
                label: charge.display_name(labels.locale()),
                value: CellValue::Money(charge.amount),
                bold: false,
            });
        }

        rows.push(TableRow::FullWidth {
            label: labels.text("doc.total.vat"),
            value: CellValue::Money(vat_total),
            bold: false,
        });

        let net_charges = ChargesAggregator::new().totals(&data.charges).net_impact;
        let grand_total = subtotal_excl + net_charges + vat_total;
        rows.push(TableRow::FullWidth {
            label: labels.text("doc.total.grand"),
            value: CellValue::Money(grand_total),
            bold: true,
        });

        DocumentModel {
            doc_type: DocType::CommercialInvoice,
            language,
            direction: language.direction(),
            title: header.title,
            document_no: header.document_no,
            shipment_no: data.shipment.shipment_no.clone(),
            header_fields: header.header_fields,
            beneficiary: header.beneficiary,
            notify_parties: header.notify_parties,
            notify_label: header.notify_label,
            columns,
            sections: vec![DocSection { band: None, rows }],
            details: compose_details(data.details.as_ref(), DocType::CommercialInvoice, &labels),
            footer: header.footer,
        }
    }

    fn select_columns(&self, labels: &LabelSet, has_vat: bool, include_hs: bool) -> Vec<DocColumn> {
        let mut kinds = vec![ColumnKind::Seq, ColumnKind::Item, ColumnKind::Description];
        if include_hs {
            kinds.push(ColumnKind::HsCode);
        }
        kinds.extend_from_slice(&[
            ColumnKind::Packages,
            ColumnKind::Qty,
            ColumnKind::UnitPrice,
            ColumnKind::Amount,
        ]);
        if has_vat {
            kinds.extend_from_slice(&[ColumnKind::Vat, ColumnKind::AmountIncl]);
        }
        kinds
            .into_iter()
            .map(|kind| DocColumn {
                kind,
                label: labels.column(kind),
            })
            .collect()
    }
}

impl Default for InvoiceComposer {
    fn default() -> Self {
        Self::new()
    }
}

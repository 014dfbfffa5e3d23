// ==========================================
// 出口单证工作台 - 装箱单组装
// ==========================================
// 职责: 行集合按柜号分段 → 装箱单页面模型
// 红线: 段合计互不累计,不产出跨段总计
// ==========================================

use crate::compose::header::{compose_details, compose_header};
use crate::compose::labels::LabelSet;
use crate::compose::{item_cell, total_cells, ComposeOptions, DocumentData};
use crate::domain::document::{CellValue, ColumnKind, DocColumn, DocSection, DocumentModel, TableRow};
use crate::domain::line_item::LineItem;
use crate::domain::types::{DocLanguage, DocType};
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// PackingComposer - 装箱单组装器
// ==========================================
pub struct PackingComposer;

impl PackingComposer {
    pub fn new() -> Self {
        Self
    }

    /// 组装装箱单
    ///
    /// 组装规则:
    /// 1. 按行自身柜号分组 (不经 Container 关联),组按首次出现顺序成段
    /// 2. 空柜号自成一段,段横幅用本地化"无柜"文本
    /// 3. 每段末尾追加加粗合计行 (数量/体积/净重/毛重)
    /// 4. 序号跨段连续编号
    #[instrument(skip(self, data, options), fields(shipment = %data.shipment.shipment_no, rows = data.rows.len()))]
    pub fn compose(
        &self,
        data: &DocumentData,
        language: DocLanguage,
        options: ComposeOptions,
    ) -> DocumentModel {
        let labels = LabelSet::for_language(language);
        let header = compose_header(data, DocType::PackingList, &labels);
        let columns = self.select_columns(&labels, options.include_hs);

        let groups = group_by_container(&data.rows);

        let mut sections = Vec::with_capacity(groups.len());
        let mut seq = 0usize;
        for (container, members) in &groups {
            let band = if container.is_empty() {
                labels.text("doc.no_container")
            } else {
                labels.text_with("doc.container_band", &[("container", container.as_str())])
            };

            let mut rows: Vec<TableRow> = Vec::with_capacity(members.len() + 1);
            for item in members {
                seq += 1;
                let cells = columns
                    .iter()
                    .map(|c| item_cell(c.kind, seq, item))
                    .collect();
                rows.push(TableRow::Item(cells));
            }

            let qty: f64 = members.iter().map(|r| r.loaded_qty).sum();
            let volume: f64 = members.iter().map(|r| r.total_volume).sum();
            let net: f64 = members.iter().map(|r| r.net_weight).sum();
            let gross: f64 = members.iter().map(|r| r.gross_weight).sum();
            rows.push(TableRow::Total {
                label: labels.text("doc.total.container"),
                cells: total_cells(
                    &columns,
                    &[
                        (ColumnKind::Qty, CellValue::Qty(qty)),
                        (ColumnKind::Volume, CellValue::Qty(volume)),
                        (ColumnKind::NetWeight, CellValue::Qty(net)),
                        (ColumnKind::GrossWeight, CellValue::Qty(gross)),
                    ],
                ),
                bold: true,
            });

            sections.push(DocSection {
                band: Some(band),
                rows,
            });
        }

        DocumentModel {
            doc_type: DocType::PackingList,
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
            sections,
            details: compose_details(data.details.as_ref(), DocType::PackingList, &labels),
            footer: header.footer,
        }
    }

    fn select_columns(&self, labels: &LabelSet, include_hs: bool) -> Vec<DocColumn> {
        let mut kinds = vec![ColumnKind::Seq, ColumnKind::Item, ColumnKind::Description];
        if include_hs {
            kinds.push(ColumnKind::HsCode);
        }
        kinds.extend_from_slice(&[
            ColumnKind::Packages,
            ColumnKind::Qty,
            ColumnKind::Volume,
            ColumnKind::NetWeight,
            ColumnKind::GrossWeight,
        ]);
        kinds
            .into_iter()
            .map(|kind| DocColumn {
                kind,
                label: labels.column(kind),
            })
            .collect()
    }
}

impl Default for PackingComposer {
    fn default() -> Self {
        Self::new()
    }
}

/// 按柜号分组,保持首次出现顺序; 空柜号归入 "" 组
fn group_by_container(rows: &[LineItem]) -> Vec<(String, Vec<&LineItem>)> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&LineItem>> = HashMap::new();
    for item in rows {
        let key = item
            .container_no
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .to_string();
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(item);
    }
    order
        .into_iter()
        .map(|key| {
            let members = groups.remove(&key).unwrap_or_default();
            (key, members)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shipment::Shipment;
    use chrono::Utc;

    fn sample_shipment() -> Shipment {
        Shipment {
            id: "ship-9".to_string(),
            shipment_no: "DCL-3003".to_string(),
            customer_no: "C300".to_string(),
            customer_name: "Oasis Motors".to_string(),
            destination_country: None,
            destination: None,
            vessel: None,
            port_of_loading: None,
            port_of_discharge: None,
            payment_terms: None,
            delivery_terms: None,
            currency: "USD".to_string(),
            delivery_note: None,
            invoice_no: None,
            invoice_date: None,
            ship_date: None,
            brand_code: None,
            created_at: Utc::now(),
        }
    }

    fn row(item_no: &str, container: Option<&str>, qty: f64) -> LineItem {
        let mut r = LineItem::new("DCL-3003", "SO-9", item_no);
        r.description = format!("Coolant {}", item_no);
        r.container_no = container.map(|c| c.to_string());
        r.loaded_qty = qty;
        r.total_volume = qty * 10.0;
        r.net_weight = qty * 9.0;
        r.gross_weight = qty * 9.5;
        r
    }

    fn data_with(rows: Vec<LineItem>) -> DocumentData {
        DocumentData {
            shipment: sample_shipment(),
            customer: None,
            brand: None,
            notify_parties: vec![],
            payment_terms_text: None,
            delivery_terms_text: None,
            rows,
            charges: vec![],
            details: None,
        }
    }

    fn section_total_qty(model: &DocumentModel, section: usize) -> f64 {
        let idx = model.column_index(ColumnKind::Qty).unwrap();
        match model.sections[section].rows.last() {
            Some(TableRow::Total { cells, bold, .. }) => {
                assert!(*bold);
                match &cells[idx] {
                    CellValue::Qty(v) => *v,
                    other => panic!("合计行数量列应为 Qty: {:?}", other),
                }
            }
            other => panic!("段末行应为合计: {:?}", other),
        }
    }

    #[test]
    fn test_blocks_are_isolated() {
        let composer = PackingComposer::new();
        let model = composer.compose(
            &data_with(vec![
                row("A1", Some("C1"), 6.0),
                row("A2", Some("C1"), 4.0),
                row("B1", Some("C2"), 5.0),
            ]),
            DocLanguage::English,
            ComposeOptions::default(),
        );

        assert_eq!(model.sections.len(), 2);
        assert_eq!(section_total_qty(&model, 0), 10.0);
        assert_eq!(section_total_qty(&model, 1), 5.0);
        // 无跨段总计: 装箱单不产出通栏行
        assert!(!model
            .sections
            .iter()
            .flat_map(|s| s.rows.iter())
            .any(|r| matches!(r, TableRow::FullWidth { .. })));
    }

    #[test]
    fn test_first_seen_order_and_running_seq() {
        let composer = PackingComposer::new();
        let model = composer.compose(
            &data_with(vec![
                row("A1", Some("C2"), 1.0),
                row("A2", Some("C1"), 1.0),
                row("A3", Some("C2"), 1.0),
            ]),
            DocLanguage::English,
            ComposeOptions::default(),
        );

        assert_eq!(model.sections.len(), 2);
        assert_eq!(
            model.sections[0].band.as_deref(),
            Some("Container C2")
        );
        // C2 段收两行,序号跨段连续
        let seq_idx = model.column_index(ColumnKind::Seq).unwrap();
        let first_of_second = match &model.sections[1].rows[0] {
            TableRow::Item(cells) => cells[seq_idx].clone(),
            other => panic!("应为明细行: {:?}", other),
        };
        assert_eq!(first_of_second, CellValue::Int(3));
    }

    #[test]
    fn test_missing_container_gets_localized_band() {
        let composer = PackingComposer::new();
        let model = composer.compose(
            &data_with(vec![row("A1", None, 2.0), row("A2", Some("  "), 3.0)]),
            DocLanguage::English,
            ComposeOptions::default(),
        );

        // None 与空白柜号归入同一"无柜"段
        assert_eq!(model.sections.len(), 1);
        assert_eq!(model.sections[0].band.as_deref(), Some("Without Container"));
        assert_eq!(section_total_qty(&model, 0), 5.0);
    }

    #[test]
    fn test_zero_rows_composes_empty_table() {
        let composer = PackingComposer::new();
        let model = composer.compose(
            &data_with(vec![]),
            DocLanguage::English,
            ComposeOptions::default(),
        );

        assert!(model.sections.is_empty());
        assert_eq!(model.title, "PACKING LIST");
        assert_eq!(model.document_no, "PL-XX-DCL-3003");
        assert!(model.has_column(ColumnKind::Volume));
    }

    #[test]
    fn test_pl_has_no_price_columns() {
        let composer = PackingComposer::new();
        let model = composer.compose(
            &data_with(vec![row("A1", Some("C1"), 2.0)]),
            DocLanguage::English,
            ComposeOptions::default(),
        );
        assert!(!model.has_column(ColumnKind::UnitPrice));
        assert!(!model.has_column(ColumnKind::Amount));
        assert!(!model.has_column(ColumnKind::Vat));
    }
}

// ==========================================
// 出口单证工作台 - 电子表格渲染器
// ==========================================
// 格式: SpreadsheetML 2003 (Excel 以 .xls 打开)
// 要求: 结构保真 (表格/表头表尾/双向文字),不追求字节级一致
// ==========================================

use crate::domain::document::{CellValue, ColumnKind, DocumentModel, FieldCell, TableRow};
use tracing::instrument;

/// 渲染产物文件扩展名
pub const DOC_FILE_EXTENSION: &str = "xls";

/// 表格单元格边框块 (四边细实线)
const BORDER_BLOCK: &str = "<Borders>\
<Border ss:Position=\"Bottom\" ss:LineStyle=\"Continuous\" ss:Weight=\"1\"/>\
<Border ss:Position=\"Left\" ss:LineStyle=\"Continuous\" ss:Weight=\"1\"/>\
<Border ss:Position=\"Right\" ss:LineStyle=\"Continuous\" ss:Weight=\"1\"/>\
<Border ss:Position=\"Top\" ss:LineStyle=\"Continuous\" ss:Weight=\"1\"/>\
</Borders>";

// ==========================================
// SheetBuilder - SpreadsheetML 流式构建器
// ==========================================
// 文本一律经 xml_escape 后写入
pub struct SheetBuilder {
    buf: String,
}

impl SheetBuilder {
    pub fn new() -> Self {
        let mut buf = String::with_capacity(16 * 1024);
        buf.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        buf.push_str("<?mso-application progid=\"Excel.Sheet\"?>\n");
        Self { buf }
    }

    pub fn open_workbook(&mut self) -> &mut Self {
        self.buf.push_str(
            "<Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\"\
 xmlns:o=\"urn:schemas-microsoft-com:office:office\"\
 xmlns:x=\"urn:schemas-microsoft-com:office:excel\"\
 xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\"\
 xmlns:html=\"http://www.w3.org/TR/REC-html40\">\n",
        );
        self
    }

    /// 样式目录; 起端/末端对齐随文字方向翻转
    pub fn styles(&mut self, rtl: bool) -> &mut Self {
        let start = if rtl { "Right" } else { "Left" };
        let end = if rtl { "Left" } else { "Right" };

        self.buf.push_str(" <Styles>\n");
        self.buf.push_str(
            "  <Style ss:ID=\"Default\" ss:Name=\"Normal\">\
<Font ss:FontName=\"Arial\" ss:Size=\"10\"/></Style>\n",
        );
        self.buf.push_str(
            "  <Style ss:ID=\"title\">\
<Alignment ss:Horizontal=\"Center\" ss:Vertical=\"Center\"/>\
<Font ss:FontName=\"Arial\" ss:Size=\"14\" ss:Bold=\"1\"/></Style>\n",
        );
        self.buf.push_str(
            "  <Style ss:ID=\"subtitle\">\
<Alignment ss:Horizontal=\"Center\" ss:Vertical=\"Center\"/></Style>\n",
        );
        self.push_style("plain", false, start, None, false, None, false);
        self.push_style("plainBold", true, start, None, false, None, false);
        self.push_style("fieldLabel", true, start, None, false, None, false);
        self.push_style("fieldValue", false, start, None, false, None, true);
        self.push_style("band", true, start, None, true, Some("#D9D9D9"), false);
        self.push_style("head", true, "Center", None, true, Some("#F2F2F2"), true);
        self.push_style("text", false, start, None, true, None, true);
        self.push_style("textB", true, start, None, true, None, true);
        self.push_style("int", false, end, Some("#,##0"), true, None, false);
        self.push_style("intB", true, end, Some("#,##0"), true, None, false);
        self.push_style("qty", false, end, Some("#,##0.000"), true, None, false);
        self.push_style("qtyB", true, end, Some("#,##0.000"), true, None, false);
        self.push_style("money", false, end, Some("#,##0.00"), true, None, false);
        self.push_style("moneyB", true, end, Some("#,##0.00"), true, None, false);
        self.buf.push_str(" </Styles>\n");
        self
    }

    fn push_style(
        &mut self,
        id: &str,
        bold: bool,
        align: &str,
        format: Option<&str>,
        bordered: bool,
        fill: Option<&str>,
        wrap: bool,
    ) {
        self.buf.push_str(&format!("  <Style ss:ID=\"{}\">", id));
        let wrap_attr = if wrap { " ss:WrapText=\"1\"" } else { "" };
        self.buf.push_str(&format!(
            "<Alignment ss:Horizontal=\"{}\" ss:Vertical=\"Center\"{}/>",
            align, wrap_attr
        ));
        if bordered {
            self.buf.push_str(BORDER_BLOCK);
        }
        if bold {
            self.buf
                .push_str("<Font ss:FontName=\"Arial\" ss:Size=\"10\" ss:Bold=\"1\"/>");
        }
        if let Some(color) = fill {
            self.buf.push_str(&format!(
                "<Interior ss:Color=\"{}\" ss:Pattern=\"Solid\"/>",
                color
            ));
        }
        if let Some(f) = format {
            self.buf
                .push_str(&format!("<NumberFormat ss:Format=\"{}\"/>", f));
        }
        self.buf.push_str("</Style>\n");
    }

    pub fn open_worksheet(&mut self, name: &str) -> &mut Self {
        self.buf
            .push_str(&format!(" <Worksheet ss:Name=\"{}\">\n", xml_escape(name)));
        self
    }

    /// 打开表格并写入列宽 (单位: pt)
    pub fn open_table(&mut self, widths: &[f64]) -> &mut Self {
        self.buf.push_str("  <Table>\n");
        for w in widths {
            self.buf.push_str(&format!(
                "   <Column ss:AutoFitWidth=\"0\" ss:Width=\"{:.1}\"/>\n",
                w
            ));
        }
        self
    }

    pub fn open_row(&mut self) -> &mut Self {
        self.buf.push_str("   <Row>\n");
        self
    }

    pub fn open_row_height(&mut self, height: f64) -> &mut Self {
        self.buf.push_str(&format!(
            "   <Row ss:AutoFitHeight=\"0\" ss:Height=\"{:.1}\">\n",
            height
        ));
        self
    }

    pub fn close_row(&mut self) -> &mut Self {
        self.buf.push_str("   </Row>\n");
        self
    }

    pub fn cell_text(&mut self, style: &str, text: &str) -> &mut Self {
        self.cell_text_merged(style, text, 0)
    }

    /// 文本单元格; merge_across 为向后合并的额外列数
    pub fn cell_text_merged(&mut self, style: &str, text: &str, merge_across: usize) -> &mut Self {
        let merge = merge_attr(merge_across);
        self.buf.push_str(&format!(
            "    <Cell ss:StyleID=\"{}\"{}><Data ss:Type=\"String\">{}</Data></Cell>\n",
            style,
            merge,
            xml_escape(text)
        ));
        self
    }

    pub fn cell_number(&mut self, style: &str, value: f64) -> &mut Self {
        self.buf.push_str(&format!(
            "    <Cell ss:StyleID=\"{}\"><Data ss:Type=\"Number\">{}</Data></Cell>\n",
            style, value
        ));
        self
    }

    pub fn cell_blank(&mut self, style: &str) -> &mut Self {
        self.buf
            .push_str(&format!("    <Cell ss:StyleID=\"{}\"/>\n", style));
        self
    }

    pub fn cell_blank_merged(&mut self, style: &str, merge_across: usize) -> &mut Self {
        let merge = merge_attr(merge_across);
        self.buf
            .push_str(&format!("    <Cell ss:StyleID=\"{}\"{}/>\n", style, merge));
        self
    }

    pub fn close_table(&mut self) -> &mut Self {
        self.buf.push_str("  </Table>\n");
        self
    }

    /// 工作表选项: RTL 镜像与页面设置 (页眉/页脚)
    pub fn worksheet_options(
        &mut self,
        rtl: bool,
        header: Option<&str>,
        footer: Option<&str>,
    ) -> &mut Self {
        self.buf
            .push_str("  <WorksheetOptions xmlns=\"urn:schemas-microsoft-com:office:excel\">\n");
        if rtl {
            self.buf.push_str("   <DisplayRightToLeft/>\n");
        }
        self.buf.push_str("   <PageSetup>\n");
        if let Some(text) = header {
            self.buf.push_str(&format!(
                "    <Header x:Margin=\"0.3\" x:Data=\"&amp;C{}\"/>\n",
                xml_escape(text)
            ));
        }
        if let Some(text) = footer {
            self.buf.push_str(&format!(
                "    <Footer x:Margin=\"0.3\" x:Data=\"&amp;C{}\"/>\n",
                xml_escape(text)
            ));
        }
        self.buf.push_str("   </PageSetup>\n");
        self.buf.push_str("   <FitToPage/>\n");
        self.buf
            .push_str("   <Print>\n    <ValidPrinterInfo/>\n    <FitWidth>1</FitWidth>\n   </Print>\n");
        self.buf.push_str("  </WorksheetOptions>\n");
        self
    }

    pub fn close_worksheet(&mut self) -> &mut Self {
        self.buf.push_str(" </Worksheet>\n");
        self
    }

    pub fn close_workbook(&mut self) -> &mut Self {
        self.buf.push_str("</Workbook>\n");
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf.into_bytes()
    }
}

impl Default for SheetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_attr(merge_across: usize) -> String {
    if merge_across == 0 {
        String::new()
    } else {
        format!(" ss:MergeAcross=\"{}\"", merge_across)
    }
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

// ==========================================
// SpreadsheetRenderer - 页面模型渲染器
// ==========================================
pub struct SpreadsheetRenderer {
    content_width: f64, // 内容区总宽 (pt),列宽等比缩放到此值
}

impl SpreadsheetRenderer {
    pub fn new(content_width: f64) -> Self {
        Self { content_width }
    }

    /// 渲染页面模型为 SpreadsheetML 字节流
    ///
    /// 渲染规则:
    /// 1. 列宽按列类型权重等比缩放到固定内容总宽
    /// 2. RTL 单证: 工作表整体镜像 + 起止对齐翻转
    /// 3. 合计行标签合并到首个数值格之前; 通栏行标签跨 n-1 列,数值落末列
    /// 4. 页脚写入页面设置,打印时每页重复
    #[instrument(skip(self, model), fields(doc_type = %model.doc_type, language = %model.language))]
    pub fn render(&self, model: &DocumentModel) -> Vec<u8> {
        let rtl = model.direction.is_rtl();
        let n = model.column_count();
        let widths = self.column_widths(model);

        let mut b = SheetBuilder::new();
        b.open_workbook()
            .styles(rtl)
            .open_worksheet(model.doc_type.code())
            .open_table(&widths);

        self.render_prelude(&mut b, model, n);
        self.render_header_grid(&mut b, model, n);
        self.render_parties(&mut b, model, n);
        self.render_table(&mut b, model, n);
        self.render_details(&mut b, model, n);

        b.close_table();
        b.worksheet_options(rtl, None, Some(&model.footer));
        b.close_worksheet().close_workbook();
        b.build()
    }

    /// 列宽: 权重归一后乘以内容总宽
    fn column_widths(&self, model: &DocumentModel) -> Vec<f64> {
        let weights: Vec<f64> = model
            .columns
            .iter()
            .map(|c| column_weight(c.kind))
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Vec::new();
        }
        weights
            .iter()
            .map(|w| w / total * self.content_width)
            .collect()
    }

    fn render_prelude(&self, b: &mut SheetBuilder, model: &DocumentModel, n: usize) {
        b.open_row_height(28.0);
        b.cell_text_merged("title", &model.title, n.saturating_sub(1));
        b.close_row();

        b.open_row();
        b.cell_text_merged("subtitle", &model.document_no, n.saturating_sub(1));
        b.close_row();

        self.spacer(b);
    }

    fn render_header_grid(&self, b: &mut SheetBuilder, model: &DocumentModel, n: usize) {
        if model.header_fields.is_empty() {
            return;
        }
        let half = (n / 2).max(2);
        let left_merge = half.saturating_sub(2);
        let right_merge = n.saturating_sub(half + 2);

        for row in &model.header_fields {
            b.open_row();
            self.grid_side(b, &row.left, left_merge);
            self.grid_side(b, &row.right, right_merge);
            b.close_row();
        }
        self.spacer(b);
    }

    fn grid_side(&self, b: &mut SheetBuilder, cell: &Option<FieldCell>, value_merge: usize) {
        match cell {
            Some(c) => {
                b.cell_text("fieldLabel", &c.label);
                b.cell_text_merged("fieldValue", &c.value, value_merge);
            }
            None => {
                b.cell_blank("plain");
                b.cell_blank_merged("plain", value_merge);
            }
        }
    }

    fn render_parties(&self, b: &mut SheetBuilder, model: &DocumentModel, n: usize) {
        if let Some(beneficiary) = &model.beneficiary {
            b.open_row();
            b.cell_text_merged("plain", beneficiary, n.saturating_sub(1));
            b.close_row();
        }
        if !model.notify_parties.is_empty() {
            b.open_row();
            b.cell_text_merged("plainBold", &model.notify_label, n.saturating_sub(1));
            b.close_row();
            for party in &model.notify_parties {
                b.open_row();
                b.cell_text_merged("plain", party, n.saturating_sub(1));
                b.close_row();
            }
        }
        if model.beneficiary.is_some() || !model.notify_parties.is_empty() {
            self.spacer(b);
        }
    }

    fn render_table(&self, b: &mut SheetBuilder, model: &DocumentModel, n: usize) {
        b.open_row();
        for column in &model.columns {
            b.cell_text("head", &column.label);
        }
        b.close_row();

        for section in &model.sections {
            if let Some(band) = &section.band {
                b.open_row();
                b.cell_text_merged("band", band, n.saturating_sub(1));
                b.close_row();
            }
            for row in &section.rows {
                self.render_table_row(b, row, n);
            }
        }
    }

    fn render_table_row(&self, b: &mut SheetBuilder, row: &TableRow, n: usize) {
        match row {
            TableRow::Item(cells) => {
                b.open_row();
                for cell in cells {
                    self.render_cell(b, cell, false);
                }
                b.close_row();
            }
            TableRow::Total { label, cells, bold } => {
                // 标签合并到首个数值单元格之前
                let first_value = cells
                    .iter()
                    .position(|c| !matches!(c, CellValue::Empty))
                    .unwrap_or(n);
                let label_style = if *bold { "textB" } else { "text" };
                b.open_row();
                b.cell_text_merged(label_style, label, first_value.saturating_sub(1));
                for cell in cells.iter().skip(first_value) {
                    self.render_cell(b, cell, *bold);
                }
                b.close_row();
            }
            TableRow::FullWidth { label, value, bold } => {
                let label_style = if *bold { "textB" } else { "text" };
                b.open_row();
                b.cell_text_merged(label_style, label, n.saturating_sub(2));
                self.render_cell(b, value, *bold);
                b.close_row();
            }
        }
    }

    fn render_cell(&self, b: &mut SheetBuilder, cell: &CellValue, bold: bool) {
        match cell {
            CellValue::Empty => {
                b.cell_blank(if bold { "textB" } else { "text" });
            }
            CellValue::Text(s) => {
                b.cell_text(if bold { "textB" } else { "text" }, s);
            }
            CellValue::Int(v) => {
                b.cell_number(if bold { "intB" } else { "int" }, *v as f64);
            }
            CellValue::Qty(v) => {
                b.cell_number(if bold { "qtyB" } else { "qty" }, *v);
            }
            CellValue::Money(v) => {
                b.cell_number(if bold { "moneyB" } else { "money" }, *v);
            }
        }
    }

    fn render_details(&self, b: &mut SheetBuilder, model: &DocumentModel, n: usize) {
        let Some(details) = &model.details else {
            return;
        };
        self.spacer(b);

        let half = (n / 2).max(2);
        let label_merge = half.saturating_sub(1);
        let value_merge = n.saturating_sub(half + 1);
        for field in &details.fields {
            b.open_row();
            b.cell_text_merged("fieldLabel", &field.label, label_merge);
            b.cell_text_merged("fieldValue", &field.value, value_merge);
            b.close_row();
        }
        if let Some(comment) = &details.comment {
            b.open_row();
            b.cell_text_merged("fieldValue", comment, n.saturating_sub(1));
            b.close_row();
        }
    }

    fn spacer(&self, b: &mut SheetBuilder) {
        b.open_row();
        b.close_row();
    }
}

fn column_weight(kind: ColumnKind) -> f64 {
    match kind {
        ColumnKind::Seq => 1.0,
        ColumnKind::Item => 2.2,
        ColumnKind::Description => 4.5,
        ColumnKind::HsCode => 2.0,
        ColumnKind::Packages => 2.0,
        ColumnKind::Qty => 1.8,
        ColumnKind::UnitPrice => 2.0,
        ColumnKind::Amount => 2.4,
        ColumnKind::Vat => 1.8,
        ColumnKind::AmountIncl => 2.4,
        ColumnKind::Volume => 2.0,
        ColumnKind::NetWeight => 2.2,
        ColumnKind::GrossWeight => 2.2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{ComposeOptions, DocumentData, InvoiceComposer, PackingComposer};
    use crate::domain::line_item::LineItem;
    use crate::domain::shipment::Shipment;
    use crate::domain::types::DocLanguage;
    use chrono::Utc;

    fn sample_shipment() -> Shipment {
        Shipment {
            id: "ship-7".to_string(),
            shipment_no: "DCL-7007".to_string(),
            customer_no: "C700".to_string(),
            customer_name: "Atlas & Sons".to_string(),
            destination_country: Some("SA".to_string()),
            destination: Some("Jeddah".to_string()),
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

    fn sample_data() -> DocumentData {
        let mut row = LineItem::new("DCL-7007", "SO-7", "OIL-10W40");
        row.description = "Motor Oil 10W40 <Premium>".to_string();
        row.container_no = Some("TCLU-700".to_string());
        row.loaded_qty = 10.0;
        row.unit_price = 50.0;
        row.total_excl_vat = 500.0;
        row.total_volume = 120.0;
        row.net_weight = 108.0;
        row.gross_weight = 118.0;

        DocumentData {
            shipment: sample_shipment(),
            customer: None,
            brand: None,
            notify_parties: vec![],
            payment_terms_text: None,
            delivery_terms_text: None,
            rows: vec![row],
            charges: vec![],
            details: None,
        }
    }

    fn render_invoice(language: DocLanguage) -> String {
        let model =
            InvoiceComposer::new().compose(&sample_data(), language, ComposeOptions::default());
        let bytes = SpreadsheetRenderer::new(680.0).render(&model);
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_output_is_spreadsheet_ml() {
        let xml = render_invoice(DocLanguage::English);
        assert!(xml.starts_with("<?xml version=\"1.0\""));
        assert!(xml.contains("<?mso-application progid=\"Excel.Sheet\"?>"));
        assert!(xml.contains("<Worksheet ss:Name=\"CI\">"));
        assert!(xml.contains("ss:MergeAcross"));
        assert!(xml.contains("#,##0.00"));
        assert!(xml.ends_with("</Workbook>\n"));
    }

    #[test]
    fn test_rtl_only_for_arabic() {
        let en = render_invoice(DocLanguage::English);
        let ar = render_invoice(DocLanguage::Arabic);
        assert!(!en.contains("<DisplayRightToLeft/>"));
        assert!(ar.contains("<DisplayRightToLeft/>"));
        // 对齐翻转: 阿文文本单元格靠右
        assert!(en.contains("<Style ss:ID=\"text\"><Alignment ss:Horizontal=\"Left\""));
        assert!(ar.contains("<Style ss:ID=\"text\"><Alignment ss:Horizontal=\"Right\""));
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = render_invoice(DocLanguage::English);
        assert!(xml.contains("Motor Oil 10W40 &lt;Premium&gt;"));
        assert!(xml.contains("Atlas &amp; Sons"));
        assert!(!xml.contains("<Premium>"));
    }

    #[test]
    fn test_column_widths_scale_to_content_width() {
        let model = InvoiceComposer::new().compose(
            &sample_data(),
            DocLanguage::English,
            ComposeOptions::default(),
        );
        let renderer = SpreadsheetRenderer::new(680.0);
        let widths = renderer.column_widths(&model);
        assert_eq!(widths.len(), model.column_count());
        let total: f64 = widths.iter().sum();
        assert!((total - 680.0).abs() < 0.001);
    }

    #[test]
    fn test_packing_band_in_output() {
        let model = PackingComposer::new().compose(
            &sample_data(),
            DocLanguage::English,
            ComposeOptions::default(),
        );
        let bytes = SpreadsheetRenderer::new(680.0).render(&model);
        let xml = String::from_utf8(bytes).unwrap();
        assert!(xml.contains("Container TCLU-700"));
        assert!(xml.contains("<Worksheet ss:Name=\"PL\">"));
        // 页脚进入页面设置
        assert!(xml.contains("<Footer x:Margin=\"0.3\""));
        assert!(xml.contains("PACKING LIST - DCL-7007"));
    }
}

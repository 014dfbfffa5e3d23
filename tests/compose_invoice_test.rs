// ==========================================
// 商业发票组装渲染流水线测试
// ==========================================
// 场景: 组装输入包 → 页面模型 → SpreadsheetML 字节流
// 覆盖: 动态列/合计块/杂费顺序/双语方向
// ==========================================

use chrono::{TimeZone, Utc};

use export_docs::compose::{compose, ComposeOptions, DocumentData, SpreadsheetRenderer};
use export_docs::domain::types::{ChargeCategory, DocLanguage, DocType};
use export_docs::domain::{Charge, LineItem, Shipment};
use export_docs::engine::{RecalcEngine, RecalcOptions};

// ==========================================
// 测试辅助函数
// ==========================================

fn test_shipment(shipment_no: &str, country: &str) -> Shipment {
    Shipment {
        id: format!("id-{}", shipment_no),
        shipment_no: shipment_no.to_string(),
        customer_no: "C-9".to_string(),
        customer_name: "Atlas & Sons".to_string(),
        destination_country: Some(country.to_string()),
        destination: Some("Jeddah".to_string()),
        vessel: Some("MSC Aurora / 12W".to_string()),
        port_of_loading: Some("Jebel Ali".to_string()),
        port_of_discharge: Some("Jeddah Islamic Port".to_string()),
        payment_terms: None,
        delivery_terms: None,
        currency: "USD".to_string(),
        delivery_note: Some("DN-300".to_string()),
        invoice_no: Some("INV-2024-88".to_string()),
        invoice_date: None,
        ship_date: None,
        brand_code: None,
        created_at: Utc::now(),
    }
}

fn test_row(order_no: &str, item_no: &str, qty: f64, unit_price: f64, vat: f64) -> LineItem {
    let mut row = LineItem::new("DCL-8001", order_no, item_no);
    row.description = format!("Engine Oil {}", item_no);
    row.packaging = "30x4".to_string();
    row.ordered_qty = qty;
    row.loaded_qty = qty;
    row.unit_price = unit_price;
    row.vat_amount = vat;
    row
}

fn test_charge(category: ChargeCategory, amount: f64, minute: u32) -> Charge {
    Charge {
        id: None,
        shipment_no: "DCL-8001".to_string(),
        category,
        other_name: None,
        quantity: 1.0,
        amount,
        currency: "USD".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, minute, 0).unwrap(),
    }
}

fn invoice_data(vat_per_row: f64, charges: Vec<Charge>) -> DocumentData {
    let mut rows = vec![
        test_row("SO1", "I-100", 10.0, 40.0, vat_per_row),
        test_row("SO2", "I-200", 10.0, 40.0, vat_per_row),
    ];
    RecalcEngine::new().recalc_all(&mut rows, RecalcOptions::default());

    DocumentData {
        shipment: test_shipment("DCL-8001", "SA"),
        customer: None,
        brand: None,
        notify_parties: Vec::new(),
        payment_terms_text: None,
        delivery_terms_text: None,
        rows,
        charges,
        details: None,
    }
}

fn render(data: &DocumentData, language: DocLanguage, include_hs: bool) -> String {
    let model = compose(
        data,
        DocType::CommercialInvoice,
        language,
        ComposeOptions { include_hs },
    );
    let bytes = SpreadsheetRenderer::new(680.0).render(&model);
    String::from_utf8(bytes).unwrap()
}

// ==========================================
// 动态列与合计块
// ==========================================

#[test]
fn test_invoice_pipeline_with_vat_and_charges() {
    let charges = vec![
        test_charge(ChargeCategory::Freight, 100.0, 1),
        test_charge(ChargeCategory::Insurance, -30.0, 2),
    ];
    let xml = render(&invoice_data(20.0, charges), DocLanguage::English, false);

    assert!(xml.contains("COMMERCIAL INVOICE"));
    assert!(xml.contains("CI-SA-DCL-8001"));

    // 行含税额非零 → 增值税双列出现
    assert!(xml.contains(">VAT<"));
    assert!(xml.contains("Total Incl. VAT"));
    assert!(xml.contains("Subtotal (Excl. VAT)"));

    // 合计链: 未税小计 800, 杂费 +100 -30, 税额合计 40, 压轴总计 910
    assert!(xml.contains(">800<"));
    assert!(xml.contains(">910<"));
    assert!(xml.contains("VAT Total"));
    assert!(xml.contains("Grand Total"));

    // 杂费按创建顺序打印
    let freight = xml.find(">Freight<").expect("freight row");
    let insurance = xml.find(">Insurance<").expect("insurance row");
    assert!(freight < insurance);
}

#[test]
fn test_invoice_hides_vat_columns_when_all_rows_zero() {
    let xml = render(&invoice_data(0.0, Vec::new()), DocLanguage::English, false);

    assert!(!xml.contains(">VAT<"));
    assert!(!xml.contains("Total Incl. VAT"));
    assert!(!xml.contains("Subtotal (Excl. VAT)"), "无税列时不打印未税小计行");
    // 税额合计与压轴总计仍收口
    assert!(xml.contains("VAT Total"));
    assert!(xml.contains("Grand Total"));
}

#[test]
fn test_invoice_hs_column_is_request_driven() {
    let without = render(&invoice_data(0.0, Vec::new()), DocLanguage::English, false);
    assert!(!without.contains("HS Code"));

    let mut data = invoice_data(0.0, Vec::new());
    data.rows[0].hs_code = Some("2710.19".to_string());
    let with = render(&data, DocLanguage::English, true);
    assert!(with.contains("HS Code"));
    assert!(with.contains("2710.19"));
}

// ==========================================
// 双语与方向
// ==========================================

#[test]
fn test_invoice_arabic_renders_rtl_with_localized_labels() {
    let xml = render(&invoice_data(20.0, Vec::new()), DocLanguage::Arabic, false);

    assert!(xml.contains("<DisplayRightToLeft/>"));
    assert!(xml.contains("فاتورة تجارية"));
    assert!(xml.contains("المجموع الكلي"));
    assert!(!xml.contains("COMMERCIAL INVOICE"));
}

#[test]
fn test_invoice_composes_with_zero_rows() {
    let mut data = invoice_data(0.0, Vec::new());
    data.rows.clear();
    let xml = render(&data, DocLanguage::English, false);

    // 零行仍出表头/页脚与收口合计
    assert!(xml.contains("CI-SA-DCL-8001"));
    assert!(xml.contains("Grand Total"));
    assert!(xml.contains("COMMERCIAL INVOICE - DCL-8001"));
}

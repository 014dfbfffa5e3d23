// ==========================================
// 单证样稿生成器
// ==========================================
// 用途: 内存实体库跑通完整生成流程,产出双语 CI/PL 样稿
// 输出: tests/fixtures/output/*.xls
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;

use export_docs::api::{DocumentApi, ShipmentApi};
use export_docs::compose::{ComposeOptions, DocumentUploader, MemoryUploader};
use export_docs::config::Settings;
use export_docs::domain::types::{ChargeCategory, DocLanguage, DocType, PrintTarget};
use export_docs::domain::Charge;
use export_docs::store::record::record_from;
use export_docs::store::{EntityKind, EntityStore, MemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    export_docs::logging::init();
    println!("开始生成单证样稿...");

    let store = Arc::new(MemoryStore::new());
    let shipment_id = seed_store(&store);

    let mut settings = Settings::default();
    settings.download_dir = Some(PathBuf::from("tests/fixtures/output"));
    export_docs::i18n::apply_settings(&settings);

    let uploader = Arc::new(MemoryUploader::new(
        Arc::clone(&store) as Arc<dyn EntityStore>
    ));
    let shipments = ShipmentApi::new(
        Arc::clone(&store) as Arc<dyn EntityStore>,
        settings.clone(),
    );
    let documents = DocumentApi::new(
        Arc::clone(&store) as Arc<dyn EntityStore>,
        settings,
        Arc::clone(&uploader) as Arc<dyn DocumentUploader>,
    );

    let mut session = shipments.open_session(&shipment_id).await?;
    let containers = shipments.containers(&mut session).await?;
    println!("✓ 装运会话已打开 ({} 行, {} 柜)", session.rows().len(), containers.len());

    // 杂费与附加信息走正式 API,样稿里能看到合计块
    for charge in demo_charges() {
        shipments.add_charge(&charge).await?;
    }
    let mut details = shipments.details(&mut session).await?;
    details.print_target = PrintTarget::Both;
    details.pallets = 12.0;
    details.packages = 480.0;
    details.net_weight = 8_640.0;
    details.gross_weight = 9_120.0;
    details.comment = "SHIPPED ON 12 EURO PALLETS".to_string();
    shipments.update_details(&mut session, details).await?;

    let runs = [
        (DocType::CommercialInvoice, DocLanguage::English, true),
        (DocType::CommercialInvoice, DocLanguage::Arabic, true),
        (DocType::PackingList, DocLanguage::English, false),
        (DocType::PackingList, DocLanguage::Arabic, false),
    ];
    for (doc_type, language, include_hs) in runs {
        let generated = documents
            .generate(
                &mut session,
                doc_type,
                language,
                ComposeOptions { include_hs },
            )
            .await?;
        println!(
            "✓ 生成 {} ({} 字节, 已发布: {})",
            generated.file_name, generated.byte_count, generated.uploaded
        );
    }

    println!("✓ 所有单证样稿生成完成！");
    Ok(())
}

/// 样稿装运数据: 主记录 + 行集合 + 主数据
fn seed_store(store: &MemoryStore) -> String {
    let shipment_id = store.seed(
        EntityKind::Shipment,
        record_from(json!({
            "shipmentNo": "DCL-4102",
            "customerNo": "C-77",
            "customerName": "Gulf Lubricants Trading LLC",
            "destinationCountry": "SA",
            "destination": "Dammam",
            "vessel": "MSC Aurora / 12W",
            "portOfLoading": "Jebel Ali",
            "portOfDischarge": "King Abdulaziz Port",
            "paymentTerms": "PT30",
            "deliveryTerms": "CIF",
            "currency": "USD",
            "deliveryNote": "DN-7741",
            "invoiceNo": "INV-2024-0415",
            "brandCode": "ORX",
        })),
    );

    store.seed(
        EntityKind::CustomerModel,
        record_from(json!({
            "customerNo": "C-77",
            "name": "Gulf Lubricants Trading LLC",
            "address": "P.O. Box 1143, Dammam, KSA",
            "countryCode": "SA",
        })),
    );
    store.seed(
        EntityKind::Brand,
        record_from(json!({
            "code": "ORX",
            "name": "Orix Lubricants",
            "beneficiaryText": "Orix Lubricants FZE, Jebel Ali Free Zone, Dubai, UAE",
        })),
    );
    store.seed(
        EntityKind::Term,
        record_from(json!({ "code": "PT30", "text": "T/T 30 DAYS FROM B/L DATE" })),
    );
    store.seed(
        EntityKind::Term,
        record_from(json!({ "code": "CIF", "text": "CIF DAMMAM SEAPORT" })),
    );
    store.seed(
        EntityKind::NotifyParty,
        record_from(json!({
            "shipmentNo": "DCL-4102",
            "seq": 1,
            "text": "Gulf Lubricants Trading LLC, P.O. Box 1143, Dammam, KSA",
        })),
    );
    store.seed(
        EntityKind::NotifyParty,
        record_from(json!({
            "shipmentNo": "DCL-4102",
            "seq": 2,
            "text": "Saudi Customs Broker Co., Dammam Port Office",
        })),
    );

    store.seed(
        EntityKind::Container,
        record_from(json!({
            "shipmentNo": "DCL-4102",
            "code": "CONT-01",
            "kind": "40FT",
            "tareWeight": 3750.0,
            "totalQty": 65.0,
        })),
    );
    store.seed(
        EntityKind::Container,
        record_from(json!({
            "shipmentNo": "DCL-4102",
            "code": "CONT-02",
            "kind": "20FT",
            "tareWeight": 2300.0,
            "totalQty": 60.0,
        })),
    );

    let rows = [
        ("SO-881", "OX-0420", "Orix Gear Oil 80W90", "20L", "CONT-01", 40.0, 38.5, "2710.19.92"),
        ("SO-881", "OX-0511", "Orix Engine Oil 20W50", "30x4", "CONT-01", 25.0, 46.0, "2710.19.74"),
        ("SO-882", "OX-0633", "Orix Coolant Concentrate", "4x4", "CONT-02", 60.0, 12.25, ""),
        ("SO-882", "OX-0700", "Orix Grease MP3", "208L", "", 4.0, 310.0, ""),
    ];
    for (order_no, item_no, description, packaging, container, qty, price, hs) in rows {
        store.seed(
            EntityKind::LineItem,
            record_from(json!({
                "shipmentNo": "DCL-4102",
                "orderNo": order_no,
                "itemNo": item_no,
                "description": description,
                "packaging": packaging,
                "containerNo": container,
                "orderedQty": qty,
                "loadedQty": qty,
                "unitPrice": price,
                "vatAmount": qty * price * 0.15,
                "hsCode": hs,
            })),
        );
    }

    shipment_id
}

fn demo_charges() -> Vec<Charge> {
    let base = Charge {
        id: None,
        shipment_no: "DCL-4102".to_string(),
        category: ChargeCategory::Freight,
        other_name: None,
        quantity: 1.0,
        amount: 850.0,
        currency: "USD".to_string(),
        created_at: chrono::Utc::now(),
    };
    vec![
        base.clone(),
        Charge {
            category: ChargeCategory::Insurance,
            amount: 120.0,
            ..base.clone()
        },
        Charge {
            category: ChargeCategory::Other,
            other_name: Some("Fumigation Certificate".to_string()),
            amount: 60.0,
            ..base
        },
    ]
}

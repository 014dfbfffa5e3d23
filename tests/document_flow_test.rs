// ==========================================
// 单证生成端到端流程测试
// ==========================================
// 场景: 内存实体库 + 内存上传协作方跑通 会话 → 生成 → 发布 全链路
// 覆盖: 索引发布/传输故障降级/防伪令牌附带/行集合跨页取数
// ==========================================

use std::sync::Arc;

use serde_json::json;

use export_docs::api::{DocumentApi, ShipmentApi};
use export_docs::compose::{ComposeOptions, DocumentUploader, MemoryUploader};
use export_docs::config::Settings;
use export_docs::domain::types::{DocLanguage, DocType};
use export_docs::store::record::record_from;
use export_docs::store::{EntityKind, EntityStore, MemoryStore, VerificationTokenProvider};

// ==========================================
// 测试辅助函数
// ==========================================

fn seed_shipment(store: &MemoryStore) -> String {
    store.seed(
        EntityKind::Shipment,
        record_from(json!({
            "shipmentNo": "DCL-5005",
            "customerNo": "C-77",
            "customerName": "Gulf Trading FZE",
            "destinationCountry": "AE",
            "currency": "AED",
        })),
    )
}

fn seed_row(store: &MemoryStore, item_no: &str) {
    store.seed(
        EntityKind::LineItem,
        record_from(json!({
            "shipmentNo": "DCL-5005",
            "orderNo": "SO-1",
            "itemNo": item_no,
            "description": format!("Hydraulic Oil {}", item_no),
            "packaging": "20L",
            "orderedQty": 5.0,
            "loadedQty": 5.0,
            "unitPrice": 18.0,
        })),
    );
}

struct Workbench {
    shipments: ShipmentApi,
    documents: DocumentApi,
    uploader: Arc<MemoryUploader>,
    _dir: tempfile::TempDir,
}

fn workbench(store: &Arc<MemoryStore>) -> Workbench {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.download_dir = Some(dir.path().to_path_buf());

    let uploader = Arc::new(MemoryUploader::new(
        Arc::clone(store) as Arc<dyn EntityStore>
    ));
    Workbench {
        shipments: ShipmentApi::new(Arc::clone(store) as Arc<dyn EntityStore>, settings.clone()),
        documents: DocumentApi::new(
            Arc::clone(store) as Arc<dyn EntityStore>,
            settings,
            Arc::clone(&uploader) as Arc<dyn DocumentUploader>,
        ),
        uploader,
        _dir: dir,
    }
}

// ==========================================
// 测试: 发布与降级
// ==========================================

#[tokio::test]
async fn test_generated_document_lands_in_index() {
    let store = Arc::new(MemoryStore::new());
    let shipment_id = seed_shipment(&store);
    seed_row(&store, "I-100");
    let wb = workbench(&store);

    let mut session = wb.shipments.open_session(&shipment_id).await.unwrap();
    let generated = wb
        .documents
        .generate(
            &mut session,
            DocType::CommercialInvoice,
            DocLanguage::English,
            ComposeOptions::default(),
        )
        .await
        .unwrap();

    assert!(generated.uploaded);
    assert_eq!(generated.document_no, "CI-AE-DCL-5005");
    assert!(generated.local_path.exists());
    assert_eq!(wb.uploader.request_count(), 1);
    assert_eq!(store.count(EntityKind::DocumentIndex), 1);

    // 发布确认后,会话内可用状态同步刷新
    let url = wb
        .documents
        .document_availability(&session, DocType::CommercialInvoice, DocLanguage::English)
        .unwrap();
    assert!(url.contains("CI-en.xls"));
}

#[tokio::test]
async fn test_transport_outage_degrades_to_local_copy() {
    let store = Arc::new(MemoryStore::new());
    let shipment_id = seed_shipment(&store);
    seed_row(&store, "I-100");
    let wb = workbench(&store);
    wb.uploader.fail_transport(true);

    let mut session = wb.shipments.open_session(&shipment_id).await.unwrap();
    let generated = wb
        .documents
        .generate(
            &mut session,
            DocType::PackingList,
            DocLanguage::English,
            ComposeOptions::default(),
        )
        .await
        .unwrap();

    // 本地文件照常落盘,发布侧不留痕迹
    assert!(generated.local_path.exists());
    assert!(!generated.uploaded);
    assert!(generated.file_url.is_none());
    assert!(generated.warning.unwrap().contains("simulated outage"));
    assert_eq!(wb.uploader.request_count(), 0);
    assert_eq!(store.count(EntityKind::DocumentIndex), 0);
    assert!(session
        .availability(DocType::PackingList, DocLanguage::English)
        .is_none());
}

// ==========================================
// 测试: 防伪令牌
// ==========================================

struct FixedToken;

impl VerificationTokenProvider for FixedToken {
    fn token(&self) -> Option<String> {
        Some("tok-777".to_string())
    }
}

#[tokio::test]
async fn test_row_saves_attach_verification_token() {
    let store = Arc::new(MemoryStore::new());
    let shipment_id = seed_shipment(&store);
    seed_row(&store, "I-100");
    store.set_token_provider(Arc::new(FixedToken));
    let wb = workbench(&store);

    let mut session = wb.shipments.open_session(&shipment_id).await.unwrap();
    let uid = session.rows()[0].row_uid;
    session.row_mut(uid).unwrap().loaded_qty = 7.0;
    wb.shipments.mark_dirty(&mut session, uid).unwrap();

    let report = wb.shipments.save_all(&mut session).await;
    assert_eq!(report.saved(), 1);
    assert_eq!(store.tokens_attached(), 1);
}

// ==========================================
// 测试: 跨页取数
// ==========================================

#[tokio::test]
async fn test_session_loads_rows_beyond_one_page() {
    let store = Arc::new(MemoryStore::new());
    let shipment_id = seed_shipment(&store);
    for i in 0..120 {
        seed_row(&store, &format!("I-{:03}", i));
    }
    let wb = workbench(&store);

    let mut session = wb.shipments.open_session(&shipment_id).await.unwrap();
    assert_eq!(session.rows().len(), 120);

    let reloaded = wb.shipments.load_rows(&mut session).await.unwrap();
    assert_eq!(reloaded, 120);
}

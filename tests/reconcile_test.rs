// ==========================================
// 应收台账对账流程集成测试
// ==========================================
// 场景: 台账权威值合并 → 仅金额重算 → 标脏 → 保存落库
// ==========================================

use std::sync::Arc;

use serde_json::json;

use export_docs::api::ShipmentApi;
use export_docs::config::Settings;
use export_docs::store::record::record_from;
use export_docs::store::{EntityKind, EntityStore, MemoryStore};

// ==========================================
// 测试辅助函数
// ==========================================

fn seeded_store() -> (Arc<MemoryStore>, String) {
    let store = Arc::new(MemoryStore::new());
    let shipment_id = store.seed(
        EntityKind::Shipment,
        record_from(json!({
            "shipmentNo": "DCL-7007",
            "customerNo": "C-1",
            "customerName": "Oasis Motors",
            "currency": "USD",
        })),
    );

    store.seed(
        EntityKind::LineItem,
        record_from(json!({
            "shipmentNo": "DCL-7007",
            "orderNo": "SO1",
            "itemNo": "I1",
            "description": "Hydraulic Oil 46",
            "packaging": "20L",
            "orderedQty": 8.0,
            "loadedQty": 8.0,
            "unitPrice": 10.0,
        })),
    );
    store.seed(
        EntityKind::LineItem,
        record_from(json!({
            "shipmentNo": "DCL-7007",
            "orderNo": "SO2",
            "itemNo": "I2",
            "description": "Coolant Concentrate",
            "packaging": "4x4",
            "orderedQty": 3.0,
            "loadedQty": 3.0,
            "unitPrice": 6.0,
        })),
    );

    // 台账只覆盖 (SO1, I1); 单价为负验证取绝对值
    store.seed(
        EntityKind::ArLedger,
        record_from(json!({
            "customerNo": "C-1",
            "orderNo": "SO1",
            "itemNo": "I1",
            "quantity": 10.0,
            "unitPrice": -50.0,
            "vatAmount": 2.5,
        })),
    );

    (store, shipment_id)
}

// ==========================================
// 对账语义
// ==========================================

#[tokio::test]
async fn test_reconcile_merges_ledger_values_and_recalcs_prices_only() {
    let (store, shipment_id) = seeded_store();
    let api = ShipmentApi::new(
        Arc::clone(&store) as Arc<dyn EntityStore>,
        Settings::default(),
    );
    let mut session = api.open_session(&shipment_id).await.unwrap();

    // 打开时全量重算 (20L → uom 20)
    let before = session
        .rows()
        .iter()
        .find(|r| r.item_no == "I1")
        .unwrap()
        .clone();
    assert_eq!(before.total_volume, 160.0);
    assert_eq!(before.net_weight, 144.0);
    assert_eq!(before.total_excl_vat, 80.0);

    let report = api
        .reconcile_with_ledger(&mut session, "C-1")
        .await
        .unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.not_found, 1, "台账未覆盖的行计数,不报错");
    assert_eq!(report.errors, 0);

    let hit = session.rows().iter().find(|r| r.item_no == "I1").unwrap();
    assert_eq!(hit.loaded_qty, 10.0);
    assert_eq!(hit.unit_price, 50.0, "负单价取绝对值");
    assert_eq!(hit.vat_amount, 2.5);
    assert_eq!(hit.total_excl_vat, 500.0);
    assert_eq!(hit.total_incl_vat, 502.5);

    // 合并后只跑金额重算,体积/重量保持合并前的值
    assert_eq!(hit.total_volume, 160.0);
    assert_eq!(hit.net_weight, 144.0);
    assert_eq!(hit.gross_weight, 152.0);

    // 未命中的行原样保留
    let miss = session.rows().iter().find(|r| r.item_no == "I2").unwrap();
    assert_eq!(miss.loaded_qty, 3.0);
    assert_eq!(miss.unit_price, 6.0);

    assert_eq!(session.dirty_count(), 1, "命中行标脏等待保存");
}

#[tokio::test]
async fn test_reconcile_then_save_persists_merged_values() {
    let (store, shipment_id) = seeded_store();
    let api = ShipmentApi::new(
        Arc::clone(&store) as Arc<dyn EntityStore>,
        Settings::default(),
    );
    let mut session = api.open_session(&shipment_id).await.unwrap();

    api.reconcile_with_ledger(&mut session, "C-1")
        .await
        .unwrap();
    let report = api.save_all(&mut session).await;
    assert_eq!(report.saved(), 1);
    assert_eq!(session.dirty_count(), 0);

    // 重新打开会话验证落库值
    let mut fresh = api.open_session(&shipment_id).await.unwrap();
    api.load_rows(&mut fresh).await.unwrap();
    let row = fresh.rows().iter().find(|r| r.item_no == "I1").unwrap();
    assert_eq!(row.loaded_qty, 10.0);
    assert_eq!(row.unit_price, 50.0);
    assert_eq!(row.vat_amount, 2.5);
}

#[tokio::test]
async fn test_reconcile_rejects_blank_customer_key() {
    let (store, shipment_id) = seeded_store();
    let api = ShipmentApi::new(
        Arc::clone(&store) as Arc<dyn EntityStore>,
        Settings::default(),
    );
    let mut session = api.open_session(&shipment_id).await.unwrap();

    assert!(api.reconcile_with_ledger(&mut session, "  ").await.is_err());
}

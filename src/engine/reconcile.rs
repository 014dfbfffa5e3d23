// ==========================================
// 出口单证工作台 - 应收台账对账引擎
// ==========================================
// 红线: 只改既有行,不增删行; 未命中的行原样保留并计数
// 职责: 台账权威值合并进行集合,之后仅跑金额重算
// 输入: 行集合 + 台账行
// 输出: ReconcileReport (更新/未命中/错误计数)
// ==========================================

use crate::domain::feeds::ArRecord;
use crate::domain::line_item::LineItem;
use crate::engine::dirty::DirtyTracker;
use crate::engine::recalc::RecalcEngine;
use crate::i18n::t_with_args;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// ReconcileReport - 对账结果
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub updated: usize,   // 命中并更新的行数
    pub not_found: usize, // 台账无对应键的行数 (指标,非错误)
    pub errors: usize,    // 合并失败的行数
}

impl ReconcileReport {
    /// 界面汇总消息 (跟随全局 locale)
    pub fn summary(&self) -> String {
        let updated = self.updated.to_string();
        let not_found = self.not_found.to_string();
        let errors = self.errors.to_string();
        t_with_args(
            "msg.reconcile.summary",
            &[
                ("updated", &updated),
                ("not_found", &not_found),
                ("errors", &errors),
            ],
        )
    }
}

// ==========================================
// ReconcileEngine - 对账引擎
// ==========================================
pub struct ReconcileEngine {
    recalc: RecalcEngine,
}

impl ReconcileEngine {
    pub fn new() -> Self {
        Self {
            recalc: RecalcEngine::new(),
        }
    }

    /// 台账行构建索引: 键 `order|item`,重复键后写覆盖
    pub fn build_index(records: &[ArRecord]) -> HashMap<String, ArRecord> {
        let mut index = HashMap::new();
        for record in records {
            index.insert(record.ledger_key(), record.clone());
        }
        index
    }

    /// 逐行合并台账权威值
    ///
    /// 命中规则 (正值才覆盖):
    /// - loaded_qty ← 台账数量 (qty > 0)
    /// - unit_price ← |台账单价| (非零)
    /// - vat_amount ← |台账税额| (非零)
    ///
    /// 命中后只跑金额重算并标脏; 体积/重量字段保持原值
    #[instrument(skip(self, rows, ledger, tracker), fields(rows = rows.len(), ledger = ledger.len()))]
    pub fn reconcile(
        &self,
        rows: &mut [LineItem],
        ledger: &[ArRecord],
        tracker: &mut DirtyTracker,
    ) -> ReconcileReport {
        let index = Self::build_index(ledger);
        let mut report = ReconcileReport::default();

        for row in rows.iter_mut() {
            let record = match index.get(&row.ledger_key()) {
                Some(record) => record,
                None => {
                    report.not_found += 1;
                    continue;
                }
            };

            if record.quantity > 0.0 {
                row.loaded_qty = record.quantity;
            }
            if record.unit_price.abs() > 0.0 {
                row.unit_price = record.unit_price.abs();
            }
            if record.vat_amount.abs() > 0.0 {
                row.vat_amount = record.vat_amount.abs();
            }

            self.recalc.recalc_prices(row);
            tracker.mark(row.row_uid);
            report.updated += 1;
        }

        tracing::info!(
            updated = report.updated,
            not_found = report.not_found,
            "台账对账完成"
        );
        report
    }
}

impl Default for ReconcileEngine {
    fn default() -> Self {
        ReconcileEngine::new()
    }
}

// ==========================================
// 出口单证工作台 - 批量保存引擎
// ==========================================
// 红线: 逐行顺序保存,单行失败计数后继续,绝不中断批次
// 职责: Save-All 流程; 新建行创建响应缺 ID 时按复合键重查
// 输入: 行集合 + 脏行追踪器
// 输出: SaveReport (创建/更新/失败计数)
// ==========================================

use crate::domain::line_item::LineItem;
use crate::engine::dirty::DirtyTracker;
use crate::i18n::t_with_args;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::line_item_repo::LineItemRepository;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

// ==========================================
// SaveReport - 批量保存结果
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveReport {
    pub attempted: usize, // 尝试保存的脏行数
    pub created: usize,   // 新建成功
    pub updated: usize,   // 更新成功
    pub failed: usize,    // 失败 (保持脏标记)
    pub unresolved: Vec<UnresolvedRow>, // 其中复合键重查未解析的行
}

/// 复合键重查未解析的行键
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnresolvedRow {
    pub order_no: String,
    pub item_no: String,
}

impl SaveReport {
    /// 保存成功的行数
    pub fn saved(&self) -> usize {
        self.created + self.updated
    }

    /// 界面汇总消息 (跟随全局 locale)
    pub fn summary(&self) -> String {
        let saved = self.saved().to_string();
        let failed = self.failed.to_string();
        t_with_args("msg.save.summary", &[("saved", &saved), ("failed", &failed)])
    }

    /// 未解析行的逐行界面提示 (跟随全局 locale)
    pub fn unresolved_messages(&self) -> Vec<String> {
        self.unresolved
            .iter()
            .map(|row| {
                t_with_args(
                    "msg.save.requery_unresolved",
                    &[("order", &row.order_no), ("item", &row.item_no)],
                )
            })
            .collect()
    }
}

/// 单行保存结果 (内部使用)
enum RowOutcome {
    Created,
    Updated,
}

// ==========================================
// BatchSaver - 批量保存引擎
// ==========================================
pub struct BatchSaver {
    repo: LineItemRepository,
    requery_delay: Duration,
}

impl BatchSaver {
    /// 创建批量保存引擎
    ///
    /// # 参数
    /// - repo: 行项目仓储
    /// - requery_delay: 创建响应缺 ID 时重查前的等待
    pub fn new(repo: LineItemRepository, requery_delay: Duration) -> Self {
        Self { repo, requery_delay }
    }

    /// Save-All: 顺序保存全部脏行
    ///
    /// - 无 ID 的行走创建; 有 ID 的行无条件更新 (无冲突检测)
    /// - 成功的行解除脏标记; 失败的行保持脏标记并计数
    /// - 无脏行时不发起任何写操作
    #[instrument(skip(self, rows, tracker), fields(dirty = tracker.count()))]
    pub async fn save_all(
        &self,
        rows: &mut [LineItem],
        tracker: &mut DirtyTracker,
    ) -> SaveReport {
        let mut report = SaveReport::default();
        for row in rows.iter_mut() {
            if !tracker.is_dirty(row.row_uid) {
                continue;
            }
            report.attempted += 1;
            match self.save_row(row).await {
                Ok(RowOutcome::Created) => {
                    report.created += 1;
                    tracker.unmark(row.row_uid);
                }
                Ok(RowOutcome::Updated) => {
                    report.updated += 1;
                    tracker.unmark(row.row_uid);
                }
                Err(RepositoryError::UnresolvedKey {
                    shipment_no,
                    order_no,
                    item_no,
                }) => {
                    report.failed += 1;
                    tracing::warn!(
                        %shipment_no,
                        %order_no,
                        %item_no,
                        "复合键重查未解析,行保持脏标记"
                    );
                    report.unresolved.push(UnresolvedRow { order_no, item_no });
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(error = %err, item_no = %row.item_no, "行保存失败,批次继续");
                }
            }
        }
        tracing::info!(
            saved = report.saved(),
            failed = report.failed,
            "批量保存完成"
        );
        report
    }

    /// 单行保存: 创建或更新
    async fn save_row(&self, row: &mut LineItem) -> RepositoryResult<RowOutcome> {
        if row.is_persisted() {
            self.repo.update(row).await?;
            return Ok(RowOutcome::Updated);
        }

        match self.repo.create(row).await? {
            Some(id) => {
                row.id = Some(id);
                Ok(RowOutcome::Created)
            }
            None => {
                // 创建响应缺 ID: 等待后按 (shipment, order, item) 重查最新记录
                tokio::time::sleep(self.requery_delay).await;
                let requeried = self
                    .repo
                    .requery_id(&row.shipment_no, &row.order_no, &row.item_no)
                    .await?;
                match requeried {
                    Some(id) => {
                        row.id = Some(id);
                        Ok(RowOutcome::Created)
                    }
                    None => Err(RepositoryError::UnresolvedKey {
                        shipment_no: row.shipment_no.clone(),
                        order_no: row.order_no.clone(),
                        item_no: row.item_no.clone(),
                    }),
                }
            }
        }
    }
}

// ==========================================
// 出口单证工作台 - 脏行追踪器
// ==========================================
// 职责: 标记被编辑的行,驱动批量保存/放弃
// 红线: 标记幂等; 仅保存成功的行解除标记
// ==========================================

use std::collections::HashSet;
use uuid::Uuid;

// ==========================================
// DirtyTracker - 脏行追踪器
// ==========================================
#[derive(Debug, Default)]
pub struct DirtyTracker {
    dirty: HashSet<Uuid>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self {
            dirty: HashSet::new(),
        }
    }

    /// 标记行为脏 (幂等),返回是否为新标记
    pub fn mark(&mut self, row_uid: Uuid) -> bool {
        self.dirty.insert(row_uid)
    }

    /// 解除标记 (保存成功后)
    pub fn unmark(&mut self, row_uid: Uuid) {
        self.dirty.remove(&row_uid);
    }

    /// 行是否为脏
    pub fn is_dirty(&self, row_uid: Uuid) -> bool {
        self.dirty.contains(&row_uid)
    }

    /// 放弃全部标记 (整表重载后)
    pub fn clear(&mut self) {
        self.dirty.clear();
    }

    /// 脏行数
    pub fn count(&self) -> usize {
        self.dirty.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }
}

// ==========================================
// 出口单证工作台 - 实体库错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("实体不存在: {kind} {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("后端调用失败: {0}")]
    Backend(String),

    #[error("分页游标无效: {0}")]
    BadCursor(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    /// 后端调用失败的便捷构造
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        StoreError::Backend(msg.into())
    }
}

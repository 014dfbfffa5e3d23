// ==========================================
// 出口单证工作台 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::store::StoreError;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 实体错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("复合键未解析: shipment={shipment_no} order={order_no} item={item_no}")]
    UnresolvedKey {
        shipment_no: String,
        order_no: String,
        item_no: String,
    },

    // ===== 实体库错误 =====
    #[error("实体库调用失败: {0}")]
    StoreFailure(String),

    #[error("分页游标无效: {0}")]
    BadCursor(String),

    // ===== 数据质量错误 =====
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("字段值错误 (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => RepositoryError::NotFound {
                entity: kind.to_string(),
                id,
            },
            StoreError::BadCursor(cursor) => RepositoryError::BadCursor(cursor),
            other => RepositoryError::StoreFailure(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

// ==========================================
// 出口单证工作台 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换Repository错误为用户友好的错误消息
// 红线: 上传失败不在此建模为错误 (本地落盘已成功,生成流程降级为警告)
// ==========================================

use crate::compose::UploadError;
use crate::i18n::t_with_args;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 页面级致命错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 生成并发控制
    // ==========================================
    /// 同类型单证生成在途,再次触发直接拒绝 (不排队)
    #[error("单证生成在途: {doc_type}")]
    GenerationInFlight { doc_type: String },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("实体库访问失败: {0}")]
    StoreFailure(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 单证落盘与上传
    // ==========================================
    #[error("单证文件写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("单证上传失败: {0}")]
    Upload(#[from] UploadError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 面向界面的提示消息 (跟随全局 locale)
    pub fn user_message(&self) -> String {
        match self {
            ApiError::GenerationInFlight { doc_type } => {
                t_with_args("msg.doc.in_flight", &[("doc_type", doc_type)])
            }
            other => other.to_string(),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::UnresolvedKey {
                shipment_no,
                order_no,
                item_no,
            } => ApiError::ValidationError(format!(
                "复合键重查未解析: shipment={} order={} item={}",
                shipment_no, order_no, item_no
            )),
            RepositoryError::StoreFailure(msg) => ApiError::StoreFailure(msg),
            RepositoryError::BadCursor(cursor) => {
                ApiError::StoreFailure(format!("分页游标无效: {}", cursor))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

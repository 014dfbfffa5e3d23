// ==========================================
// 出口单证工作台 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供页面回调调用
// ==========================================

pub mod document_api;
pub mod error;
pub mod shipment_api;

// 重导出核心类型
pub use document_api::{DocumentApi, GeneratedDocument};
pub use error::{ApiError, ApiResult};
pub use shipment_api::ShipmentApi;

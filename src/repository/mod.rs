// ==========================================
// 出口单证工作台 - 数据仓储层
// ==========================================
// 职责: 松散实体记录与类型化领域模型之间的规范化映射
// 红线: Repository 不含派生字段计算与对账逻辑
// ==========================================

pub mod charge_repo;
pub mod container_repo;
pub mod details_repo;
pub mod error;
pub mod feeds_repo;
pub mod line_item_repo;
pub mod shipment_repo;

// 重导出核心仓储
pub use charge_repo::ChargeRepository;
pub use container_repo::ContainerRepository;
pub use details_repo::DetailsRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use feeds_repo::{
    DocumentIndexRepository, HsCodeRepository, LedgerRepository, ShippedOrderRepository,
};
pub use line_item_repo::LineItemRepository;
pub use shipment_repo::{MasterDataRepository, ShipmentRepository};

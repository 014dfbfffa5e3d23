// ==========================================
// 出口单证工作台 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、派生规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod charge;
pub mod container;
pub mod details;
pub mod document;
pub mod feeds;
pub mod line_item;
pub mod shipment;
pub mod types;

// 重导出核心类型
pub use charge::Charge;
pub use container::{Container, ContainerItem};
pub use details::AdditionalDetails;
pub use document::{
    CellValue, ColumnKind, DetailsBlock, DocColumn, DocSection, DocumentModel, FieldCell,
    FieldRow, TableRow,
};
pub use feeds::{ArRecord, HsCodeEntry, ShippedOrder};
pub use line_item::LineItem;
pub use shipment::{Brand, CustomerModel, NotifyParty, Shipment, TermEntry, UNKNOWN_COUNTRY_CODE};
pub use types::{
    ChargeCategory, ContainerKind, DerivedField, Direction, DocLanguage, DocType, PrintTarget,
    ValueType,
};

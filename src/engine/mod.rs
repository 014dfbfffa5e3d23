// ==========================================
// 出口单证工作台 - 引擎层
// ==========================================
// 职责: 派生字段、对账、聚合等业务规则引擎
// 红线: Engine 不直接操作实体库载荷,经由仓储层
// ==========================================

pub mod charges;
pub mod dirty;
pub mod hs_resolver;
pub mod recalc;
pub mod reconcile;
pub mod saver;
pub mod shipment_index;
pub mod unit_parser;

// 重导出核心引擎
pub use charges::{ChargeTotals, ChargesAggregator};
pub use dirty::DirtyTracker;
pub use hs_resolver::HsCodeResolver;
pub use recalc::{RecalcEngine, RecalcOptions};
pub use reconcile::{ReconcileEngine, ReconcileReport};
pub use saver::{BatchSaver, SaveReport, UnresolvedRow};
pub use shipment_index::{ContainerSuggestion, ShipmentIndex};
pub use unit_parser::UnitParser;

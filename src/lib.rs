// ==========================================
// 出口单证工作台 - 核心库
// ==========================================
// 系统定位: 出口装运行项目编辑 + 双语单证生成 (人工最终控制权)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 实体库抽象 - 松散记录 CRUD 与分页流
pub mod store;

// 数据仓储层 - 记录归一化与数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 单证组装层 - 页面模型/渲染/上传
pub mod compose;

// 会话层 - 装运页面共享状态
pub mod session;

// 配置层 - 运行配置
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ChargeCategory, ContainerKind, DerivedField, Direction, DocLanguage, DocType, PrintTarget,
    ValueType,
};

// 领域实体
pub use domain::{
    AdditionalDetails, ArRecord, Brand, Charge, Container, ContainerItem, CustomerModel,
    DocumentModel, HsCodeEntry, LineItem, NotifyParty, Shipment, ShippedOrder,
};

// 引擎
pub use engine::{
    BatchSaver, ChargesAggregator, DirtyTracker, HsCodeResolver, RecalcEngine, ReconcileEngine,
    SaveReport, ShipmentIndex, UnitParser,
};

// 组装与上传
pub use compose::{ComposeOptions, DocumentData, DocumentUploader, SpreadsheetRenderer};

// 会话与 API
pub use api::{ApiError, ApiResult, DocumentApi, GeneratedDocument, ShipmentApi};
pub use config::Settings;
pub use session::ShipmentSession;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "出口单证工作台";

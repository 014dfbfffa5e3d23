// ==========================================
// 出口单证工作台 - 装运会话
// ==========================================
// 职责: 单个装运单页面的共享可变状态 (行集合/脏行/只读缓存/忙碌指示)
// 红线: 行集合与脏行集合只在会话内变更
// 红线: 单证可用状态只随确认成功的上传刷新,绝不乐观更新
// 输入: 实体库句柄 + 运行配置
// 输出: 行编辑/批量保存/对账结果与生成前置状态
// ==========================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;
use uuid::Uuid;

use crate::config::Settings;
use crate::domain::container::{Container, ContainerItem};
use crate::domain::details::AdditionalDetails;
use crate::domain::line_item::LineItem;
use crate::domain::shipment::Shipment;
use crate::domain::types::{DocLanguage, DocType};
use crate::engine::{
    BatchSaver, ContainerSuggestion, DirtyTracker, HsCodeResolver, RecalcEngine, RecalcOptions,
    ReconcileEngine, ReconcileReport, SaveReport, ShipmentIndex,
};
use crate::repository::{
    ContainerRepository, DetailsRepository, DocumentIndexRepository, HsCodeRepository,
    LedgerRepository, LineItemRepository, RepositoryResult, ShipmentRepository,
    ShippedOrderRepository,
};
use crate::store::EntityStore;

// ==========================================
// BusyGauge - 引用计数忙碌指示
// ==========================================
// 红线: 守卫析构才释放; 安全超时兜底异常悬挂的流程
pub struct BusyGauge {
    active: Arc<AtomicUsize>,
    epoch: Arc<AtomicU64>,
    generation: Arc<AtomicU64>,
    safety_timeout: Duration,
}

impl BusyGauge {
    pub fn new(safety_timeout: Duration) -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            epoch: Arc::new(AtomicU64::new(0)),
            generation: Arc::new(AtomicU64::new(0)),
            safety_timeout,
        }
    }

    /// 进入忙碌段,返回 RAII 守卫
    ///
    /// 每次进入挂一个安全清零定时器: 超时时若此后再无任何进入且计数仍大于
    /// 零,视为流程异常悬挂,计数强制清零。清零后迟到的旧守卫析构不再计数。
    pub fn enter(&self) -> BusyGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        let stamp = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let born = self.generation.load(Ordering::SeqCst);

        // 无运行时 (同步上下文) 则不挂定时器,计数照常工作
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let active = Arc::clone(&self.active);
            let epoch = Arc::clone(&self.epoch);
            let generation = Arc::clone(&self.generation);
            let timeout = self.safety_timeout;
            handle.spawn(async move {
                tokio::time::sleep(timeout).await;
                if epoch.load(Ordering::SeqCst) == stamp && active.load(Ordering::SeqCst) > 0 {
                    active.store(0, Ordering::SeqCst);
                    generation.fetch_add(1, Ordering::SeqCst);
                    tracing::warn!(
                        timeout_ms = timeout.as_millis() as u64,
                        "忙碌指示超时,强制清零"
                    );
                }
            });
        }

        BusyGuard {
            active: Arc::clone(&self.active),
            generation: Arc::clone(&self.generation),
            born,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }

    /// 当前嵌套深度
    pub fn depth(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// 忙碌段守卫
///
/// 析构时计数减一; 若所属代次已被强制清零,析构不再计数
pub struct BusyGuard {
    active: Arc<AtomicUsize>,
    generation: Arc<AtomicU64>,
    born: u64,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if self.generation.load(Ordering::SeqCst) != self.born {
            return;
        }
        let _ = self
            .active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_sub(1))
            });
    }
}

// ==========================================
// 生成在途标志 - 每单证类型一枚
// ==========================================
// 红线: 同类型生成在途时再次触发直接拒绝,不排队
#[derive(Default)]
struct InFlightFlags {
    ci: AtomicBool,
    pl: AtomicBool,
}

impl InFlightFlags {
    fn slot(&self, doc_type: DocType) -> &AtomicBool {
        match doc_type {
            DocType::CommercialInvoice => &self.ci,
            DocType::PackingList => &self.pl,
        }
    }
}

/// 生成在途守卫; 析构时归还标志
pub struct GenerationGuard {
    flags: Arc<InFlightFlags>,
    doc_type: DocType,
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.flags.slot(self.doc_type).store(false, Ordering::SeqCst);
    }
}

// ==========================================
// ShipmentSession - 装运会话
// ==========================================
pub struct ShipmentSession {
    // ===== 页面主数据 =====
    shipment: Shipment,       // 装运主记录 (打开时加载)
    rows: Vec<LineItem>,      // 行集合
    tracker: DirtyTracker,    // 脏行集合

    // ===== 引擎 =====
    recalc: RecalcEngine,
    reconciler: ReconcileEngine,
    saver: BatchSaver,

    // ===== 仓储 =====
    line_items: LineItemRepository,
    ledger: LedgerRepository,
    hs_codes: HsCodeRepository,
    shipped_orders: ShippedOrderRepository,
    containers_repo: ContainerRepository,
    details_repo: DetailsRepository,
    doc_index: DocumentIndexRepository,

    // ===== 会话级只读缓存 (懒加载) =====
    hs_resolver: Option<HsCodeResolver>,     // 海关编码索引
    shipment_index: Option<ShipmentIndex>,   // 历史装运索引
    containers: Option<Vec<Container>>,      // 集装箱清单
    details: Option<AdditionalDetails>,      // 附加信息单例

    // ===== 生成状态 =====
    availability: HashMap<(DocType, DocLanguage), String>, // 已发布单证 → 文件地址
    busy: BusyGauge,
    in_flight: Arc<InFlightFlags>,
}

impl ShipmentSession {
    /// 打开装运会话
    ///
    /// 步骤:
    /// 1. 按 ID 取装运主记录 (缺失即页面级失败,直接返回错误)
    /// 2. 加载行集合并跑一遍全量重算
    /// 3. 读单证索引初始化可用状态 (失败降级为空,不阻塞打开)
    #[instrument(skip(store, settings), fields(shipment_id = %shipment_id))]
    pub async fn open(
        store: Arc<dyn EntityStore>,
        settings: &Settings,
        shipment_id: &str,
    ) -> RepositoryResult<Self> {
        let shipment = ShipmentRepository::new(Arc::clone(&store))
            .get_by_id(shipment_id)
            .await?;

        let mut session = Self {
            shipment,
            rows: Vec::new(),
            tracker: DirtyTracker::new(),
            recalc: RecalcEngine::new(),
            reconciler: ReconcileEngine::new(),
            saver: BatchSaver::new(
                LineItemRepository::new(Arc::clone(&store)),
                settings.requery_delay(),
            ),
            line_items: LineItemRepository::new(Arc::clone(&store)),
            ledger: LedgerRepository::new(Arc::clone(&store)),
            hs_codes: HsCodeRepository::new(Arc::clone(&store)),
            shipped_orders: ShippedOrderRepository::new(Arc::clone(&store)),
            containers_repo: ContainerRepository::new(Arc::clone(&store)),
            details_repo: DetailsRepository::new(Arc::clone(&store)),
            doc_index: DocumentIndexRepository::new(Arc::clone(&store)),
            hs_resolver: None,
            shipment_index: None,
            containers: None,
            details: None,
            availability: HashMap::new(),
            busy: BusyGauge::new(settings.busy_safety_timeout()),
            in_flight: Arc::new(InFlightFlags::default()),
        };

        session.reload_rows().await?;
        if let Err(err) = session.refresh_availability().await {
            tracing::warn!(error = %err, "单证可用状态初始化失败,降级为空");
        }
        tracing::info!(
            shipment_no = %session.shipment.shipment_no,
            rows = session.rows.len(),
            "装运会话已打开"
        );
        Ok(session)
    }

    pub fn shipment(&self) -> &Shipment {
        &self.shipment
    }

    pub fn shipment_no(&self) -> &str {
        &self.shipment.shipment_no
    }

    pub fn rows(&self) -> &[LineItem] {
        &self.rows
    }

    /// 按行标识取可变行 (编辑入口)
    pub fn row_mut(&mut self, row_uid: Uuid) -> Option<&mut LineItem> {
        self.rows.iter_mut().find(|r| r.row_uid == row_uid)
    }

    pub fn dirty_count(&self) -> usize {
        self.tracker.count()
    }

    pub fn busy(&self) -> &BusyGauge {
        &self.busy
    }

    // ==========================================
    // 行集合操作
    // ==========================================

    /// 重新加载行集合 (放弃未保存编辑)
    ///
    /// 载入后全量重算一遍,脏行集合清空
    pub async fn reload_rows(&mut self) -> RepositoryResult<usize> {
        let mut rows = self
            .line_items
            .find_by_shipment(&self.shipment.shipment_no)
            .await?;
        self.recalc.recalc_all(&mut rows, RecalcOptions::default());
        self.rows = rows;
        self.tracker.clear();
        Ok(self.rows.len())
    }

    /// 行编辑后标脏
    ///
    /// # 返回
    /// - true: 行存在并已标脏
    /// - false: 未知行,忽略
    pub fn mark_dirty(&mut self, row_uid: Uuid) -> bool {
        if self.rows.iter().any(|r| r.row_uid == row_uid) {
            self.tracker.mark(row_uid);
            true
        } else {
            false
        }
    }

    /// 单行重算
    ///
    /// # 参数
    /// - include_prices: false 时跳过未税金额导出 (含税恒等式仍维持)
    ///
    /// # 返回
    /// - true: 行存在并已重算
    pub fn recalculate_row(&mut self, row_uid: Uuid, include_prices: bool) -> bool {
        let options = RecalcOptions { include_prices };
        match self.rows.iter_mut().find(|r| r.row_uid == row_uid) {
            Some(row) => {
                self.recalc.recalc_row(row, options);
                true
            }
            None => false,
        }
    }

    /// 全量重算,返回重算行数
    pub fn recalculate_all(&mut self, include_prices: bool) -> usize {
        self.recalc
            .recalc_all(&mut self.rows, RecalcOptions { include_prices })
    }

    /// Save-All: 顺序保存全部脏行
    ///
    /// 成功行解除脏标记,失败行保留; 无脏行时不发起任何写操作
    pub async fn save_all(&mut self) -> SaveReport {
        let _busy = self.busy.enter();
        self.saver.save_all(&mut self.rows, &mut self.tracker).await
    }

    /// 放弃全部未保存编辑,从实体库重载
    pub async fn discard_all(&mut self) -> RepositoryResult<usize> {
        let _busy = self.busy.enter();
        self.reload_rows().await
    }

    /// 应收台账对账: 取客户台账行,权威值合并进行集合
    #[instrument(skip(self), fields(customer_key = %customer_key))]
    pub async fn reconcile_with_ledger(
        &mut self,
        customer_key: &str,
    ) -> RepositoryResult<ReconcileReport> {
        let _busy = self.busy.enter();
        let ledger = self.ledger.find_by_customer(customer_key).await?;
        Ok(self
            .reconciler
            .reconcile(&mut self.rows, &ledger, &mut self.tracker))
    }

    // ==========================================
    // 会话级只读缓存
    // ==========================================

    /// 柜号/封号建议 (首次调用构建历史装运索引)
    pub async fn container_suggestions(
        &mut self,
        order_no: &str,
        item_no: &str,
    ) -> RepositoryResult<Vec<ContainerSuggestion>> {
        if self.shipment_index.is_none() {
            let records = self.shipped_orders.load_all().await?;
            let index = ShipmentIndex::build(&records);
            tracing::debug!(groups = index.group_count(), "历史装运索引已构建");
            self.shipment_index = Some(index);
        }
        Ok(self
            .shipment_index
            .as_ref()
            .map(|index| index.suggestions(order_no, item_no))
            .unwrap_or_default())
    }

    /// 装运单的集装箱清单 (首次访问时加载,按柜号升序)
    ///
    /// 集装箱分配表单在外围系统; 这里只读展示,汇总字段仅供参考
    pub async fn containers(&mut self) -> RepositoryResult<&[Container]> {
        if self.containers.is_none() {
            let list = self
                .containers_repo
                .find_by_shipment(&self.shipment.shipment_no)
                .await?;
            tracing::debug!(count = list.len(), "集装箱清单已加载");
            self.containers = Some(list);
        }
        Ok(self.containers.as_deref().unwrap_or_default())
    }

    /// 集装箱下的箱货关联 (按需取,不缓存)
    pub async fn container_items(
        &self,
        container_id: &str,
    ) -> RepositoryResult<Vec<ContainerItem>> {
        self.containers_repo.items_of(container_id).await
    }

    /// 确保海关编码索引已加载
    async fn ensure_hs_resolver(&mut self) -> RepositoryResult<()> {
        if self.hs_resolver.is_none() {
            let entries = self.hs_codes.load_all().await?;
            let resolver = HsCodeResolver::from_entries(entries);
            tracing::debug!(entries = resolver.len(), "海关编码索引已构建");
            self.hs_resolver = Some(resolver);
        }
        Ok(())
    }

    /// 解析物料号对应的海关编码 (无匹配返回 None,不是错误)
    pub async fn resolve_hs_code(&mut self, item_code: &str) -> RepositoryResult<Option<String>> {
        self.ensure_hs_resolver().await?;
        Ok(self
            .hs_resolver
            .as_ref()
            .and_then(|resolver| resolver.resolve(item_code))
            .map(|entry| entry.hs_code.clone()))
    }

    /// 把解析到的海关编码写到指定行并标脏
    ///
    /// # 返回
    /// - true: 命中并写入
    /// - false: 行不存在或索引无匹配 (行保持不动)
    pub async fn fill_hs_code(&mut self, row_uid: Uuid) -> RepositoryResult<bool> {
        self.ensure_hs_resolver().await?;
        let Some(resolver) = self.hs_resolver.as_ref() else {
            return Ok(false);
        };
        let Some(row) = self.rows.iter_mut().find(|r| r.row_uid == row_uid) else {
            return Ok(false);
        };
        if resolver.apply(row) {
            self.tracker.mark(row_uid);
            return Ok(true);
        }
        Ok(false)
    }

    /// 附加信息 (每装运单例,首次访问时取或建)
    pub async fn details(&mut self) -> RepositoryResult<AdditionalDetails> {
        if let Some(details) = &self.details {
            return Ok(details.clone());
        }
        let details = self
            .details_repo
            .find_or_create(&self.shipment.shipment_no)
            .await?;
        self.details = Some(details.clone());
        Ok(details)
    }

    /// 更新附加信息并回写缓存
    pub async fn update_details(&mut self, details: AdditionalDetails) -> RepositoryResult<()> {
        self.details_repo.update(&details).await?;
        self.details = Some(details);
        Ok(())
    }

    // ==========================================
    // 单证可用状态
    // ==========================================

    /// 从单证索引刷新可用状态
    ///
    /// 只在打开会话和上传确认成功后调用; 同一单证/语言多条索引时取最近发布
    pub async fn refresh_availability(&mut self) -> RepositoryResult<usize> {
        let mut entries = self.doc_index.find_by_shipment(&self.shipment.id).await?;
        entries.sort_by_key(|e| e.updated_at);
        self.availability.clear();
        for entry in &entries {
            let key = (
                DocType::from_code(&entry.doc_type),
                DocLanguage::from_locale(&entry.language),
            );
            self.availability.insert(key, entry.file_url.clone());
        }
        Ok(self.availability.len())
    }

    /// 指定单证/语言已发布的文件地址
    pub fn availability(&self, doc_type: DocType, language: DocLanguage) -> Option<&str> {
        self.availability
            .get(&(doc_type, language))
            .map(String::as_str)
    }

    // ==========================================
    // 生成在途控制
    // ==========================================

    /// 申请生成在途标志
    ///
    /// # 返回
    /// - Some(守卫): 该类型当前无生成在途
    /// - None: 已有同类型生成在途 (调用方直接拒绝,不排队)
    pub fn begin_generation(&self, doc_type: DocType) -> Option<GenerationGuard> {
        let acquired = self
            .in_flight
            .slot(doc_type)
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if acquired {
            Some(GenerationGuard {
                flags: Arc::clone(&self.in_flight),
                doc_type,
            })
        } else {
            None
        }
    }

    pub fn is_generating(&self, doc_type: DocType) -> bool {
        self.in_flight.slot(doc_type).load(Ordering::SeqCst)
    }
}

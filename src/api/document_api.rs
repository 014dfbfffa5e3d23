// ==========================================
// 出口单证工作台 - 单证生成API
// ==========================================
// 职责: 生成流程编排 (取数 → 组装 → 渲染 → 本地落盘 → 上传 → 刷新可用状态)
// 红线: 本地落盘成功即生成成功; 上传失败只降级为警告,可用状态不刷新
// 红线: 同类型生成在途时再次触发直接拒绝,不排队
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::compose::{
    compose, ComposeOptions, DocumentData, DocumentUploader, SpreadsheetRenderer, UploadRequest,
    DOC_FILE_EXTENSION,
};
use crate::config::Settings;
use crate::domain::types::{DocLanguage, DocType};
use crate::i18n::t_with_args;
use crate::repository::{ChargeRepository, DetailsRepository, MasterDataRepository, ShipmentRepository};
use crate::session::ShipmentSession;
use crate::store::EntityStore;

// ==========================================
// GeneratedDocument - 生成结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocument {
    pub document_no: String,        // 单证编号 (也是文件主名)
    pub file_name: String,          // 落盘文件名
    pub local_path: PathBuf,        // 本地文件路径
    pub byte_count: usize,          // 渲染字节数
    pub uploaded: bool,             // 上传协作方是否确认成功
    pub file_url: Option<String>,   // 确认成功后的发布地址
    pub warning: Option<String>,    // 上传失败时的界面提示 (本地文件已就绪)
}

// ==========================================
// DocumentApi - 单证生成API
// ==========================================
pub struct DocumentApi {
    settings: Settings,
    shipments: ShipmentRepository,
    master: MasterDataRepository,
    charges: ChargeRepository,
    details: DetailsRepository,
    uploader: Arc<dyn DocumentUploader>,
}

impl DocumentApi {
    pub fn new(
        store: Arc<dyn EntityStore>,
        settings: Settings,
        uploader: Arc<dyn DocumentUploader>,
    ) -> Self {
        Self {
            settings,
            shipments: ShipmentRepository::new(Arc::clone(&store)),
            master: MasterDataRepository::new(Arc::clone(&store)),
            charges: ChargeRepository::new(Arc::clone(&store)),
            details: DetailsRepository::new(store),
            uploader,
        }
    }

    /// 生成单证
    ///
    /// 规则:
    /// 1. 同类型生成在途时直接拒绝 (GenerationInFlight)
    /// 2. 装运主记录重取,缺失中止生成 (NotFound)
    /// 3. 行集合取会话当前编辑态,不回读实体库
    /// 4. 渲染产物先本地落盘,再尝试上传
    /// 5. 只有上传确认成功才刷新单证可用状态
    #[instrument(
        skip(self, session, options),
        fields(shipment = %session.shipment_no(), doc_type = %doc_type, language = %language)
    )]
    pub async fn generate(
        &self,
        session: &mut ShipmentSession,
        doc_type: DocType,
        language: DocLanguage,
        options: ComposeOptions,
    ) -> ApiResult<GeneratedDocument> {
        let Some(_in_flight) = session.begin_generation(doc_type) else {
            return Err(ApiError::GenerationInFlight {
                doc_type: doc_type.code().to_string(),
            });
        };
        let _busy = session.busy().enter();

        let data = self.collect(session).await?;
        let model = compose(&data, doc_type, language, options);
        let bytes = SpreadsheetRenderer::new(self.settings.content_width).render(&model);

        // 本地落盘
        let dir = self.settings.resolved_download_dir();
        std::fs::create_dir_all(&dir)?;
        let file_name = format!("{}.{}", model.document_no, DOC_FILE_EXTENSION);
        let local_path = dir.join(&file_name);
        std::fs::write(&local_path, &bytes)?;
        tracing::info!(
            path = %local_path.display(),
            bytes = bytes.len(),
            "单证已本地落盘"
        );

        let mut generated = GeneratedDocument {
            document_no: model.document_no.clone(),
            file_name,
            local_path,
            byte_count: bytes.len(),
            uploaded: false,
            file_url: None,
            warning: None,
        };

        // 上传协作方; 失败不影响已落盘的本地文件
        let request = UploadRequest::new(
            &data.shipment.id,
            &bytes,
            language,
            doc_type,
            DOC_FILE_EXTENSION,
        );
        match self.uploader.upload(request).await {
            Ok(outcome) if outcome.success => {
                generated.uploaded = true;
                generated.file_url = outcome.file_url;
                if let Err(err) = session.refresh_availability().await {
                    tracing::warn!(error = %err, "单证索引刷新失败,可用状态维持原样");
                }
            }
            Ok(_) => {
                tracing::warn!("上传协作方拒绝发布,本地文件已就绪");
                generated.warning = Some(t_with_args(
                    "msg.upload.failed",
                    &[("reason", "publish declined")],
                ));
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::warn!(error = %reason, "单证上传失败,本地文件已就绪");
                generated.warning =
                    Some(t_with_args("msg.upload.failed", &[("reason", &reason)]));
            }
        }

        Ok(generated)
    }

    /// 指定单证/语言已发布的文件地址
    pub fn document_availability(
        &self,
        session: &ShipmentSession,
        doc_type: DocType,
        language: DocLanguage,
    ) -> Option<String> {
        session.availability(doc_type, language).map(str::to_string)
    }

    /// 收集组装输入包 (装运主记录重取,其余主数据按需取)
    async fn collect(&self, session: &mut ShipmentSession) -> ApiResult<DocumentData> {
        let shipment = self.shipments.get_by_id(&session.shipment().id).await?;

        let customer = self.master.find_customer(&shipment.customer_no).await?;
        let brand = match shipment.brand_code.as_deref() {
            Some(code) => self.master.find_brand(code).await?,
            None => None,
        };
        let notify_parties = self.master.notify_parties(&shipment.shipment_no).await?;
        let payment_terms_text = match shipment.payment_terms.as_deref() {
            Some(code) => Some(self.master.term_text(code).await?),
            None => None,
        };
        let delivery_terms_text = match shipment.delivery_terms.as_deref() {
            Some(code) => Some(self.master.term_text(code).await?),
            None => None,
        };
        let charges = self.charges.find_by_shipment(&shipment.shipment_no).await?;
        let details = session.details().await?;

        Ok(DocumentData {
            shipment,
            customer,
            brand,
            notify_parties,
            payment_terms_text,
            delivery_terms_text,
            rows: session.rows().to_vec(),
            charges,
            details: Some(details),
        })
    }
}

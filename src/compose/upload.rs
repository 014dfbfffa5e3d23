// ==========================================
// 出口单证工作台 - 上传协作方契约
// ==========================================
// 职责: 渲染产物的发布契约; 本地落盘成功不等于发布成功
// 红线: 单证可用状态只在协作方确认后更新,永不乐观置位
// ==========================================

use crate::domain::types::{DocLanguage, DocType};
use crate::store::{EntityKind, EntityStore};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("上传传输失败: {0}")]
    Transport(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// UploadRequest - 上传请求
// ==========================================
// 内容以 base64 编码随请求发送
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub document_id: String,   // 装运实体 ID
    pub content: String,       // base64 编码的文件内容
    pub language: DocLanguage, // 单证语言
    pub doc_type: DocType,     // 单证类型
    pub extension: String,     // 文件扩展名
}

impl UploadRequest {
    /// 由渲染字节构造上传请求
    pub fn new(
        document_id: &str,
        bytes: &[u8],
        language: DocLanguage,
        doc_type: DocType,
        extension: &str,
    ) -> Self {
        Self {
            document_id: document_id.to_string(),
            content: general_purpose::STANDARD.encode(bytes),
            language,
            doc_type,
            extension: extension.to_string(),
        }
    }
}

// ==========================================
// UploadOutcome - 上传结果
// ==========================================
// success=false 是业务拒绝,不是传输错误
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub success: bool,
    pub file_url: Option<String>,
}

/// 单证上传协作方
///
/// 只消费契约; 具体传输由外围系统实现
#[async_trait]
pub trait DocumentUploader: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> Result<UploadOutcome, UploadError>;
}

// ==========================================
// MemoryUploader - 内存上传协作方 (测试/演示)
// ==========================================
// 成功时向实体库写入单证索引记录,模拟外围系统的索引发布
pub struct MemoryUploader {
    store: Arc<dyn EntityStore>,
    fail_transport: AtomicBool, // 模拟传输失败
    reject: AtomicBool,         // 模拟业务拒绝 (success=false)
    requests: Mutex<Vec<UploadRequest>>,
}

impl MemoryUploader {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            fail_transport: AtomicBool::new(false),
            reject: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 之后的上传以传输错误失败
    pub fn fail_transport(&self, on: bool) {
        self.fail_transport.store(on, Ordering::SeqCst);
    }

    /// 之后的上传返回 success=false
    pub fn reject_uploads(&self, on: bool) {
        self.reject.store(on, Ordering::SeqCst);
    }

    /// 已受理的上传请求数 (含被拒绝的)
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl DocumentUploader for MemoryUploader {
    async fn upload(&self, request: UploadRequest) -> Result<UploadOutcome, UploadError> {
        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(UploadError::Transport("simulated outage".to_string()));
        }

        let file_url = format!(
            "memory://docs/{}/{}-{}.{}",
            request.document_id,
            request.doc_type.code(),
            request.language.locale(),
            request.extension
        );
        let rejected = self.reject.load(Ordering::SeqCst);

        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if rejected {
            return Ok(UploadOutcome {
                success: false,
                file_url: None,
            });
        }

        let mut record = serde_json::Map::new();
        record.insert("shipmentId".to_string(), request.document_id.clone().into());
        record.insert("docType".to_string(), request.doc_type.code().into());
        record.insert("language".to_string(), request.language.locale().into());
        record.insert("fileUrl".to_string(), file_url.clone().into());
        record.insert("updatedAt".to_string(), Utc::now().to_rfc3339().into());
        self.store
            .create(EntityKind::DocumentIndex, record)
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        Ok(UploadOutcome {
            success: true,
            file_url: Some(file_url),
        })
    }
}

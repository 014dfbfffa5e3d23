// ==========================================
// 出口单证工作台 - 配置管理
// ==========================================
// 职责: 运行参数的加载与默认值
// 存储: JSON 文件 (用户配置目录),缺失时回退默认值
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// 创建响应缺 ID 时重查前的默认等待 (毫秒)
const DEFAULT_REQUERY_DELAY_MS: u64 = 800;
/// 忙碌指示的强制清除超时 (毫秒)
const DEFAULT_BUSY_SAFETY_TIMEOUT_MS: u64 = 45_000;
/// 单证内容区固定总宽 (渲染单位,列宽按比例缩放到此值)
const DEFAULT_CONTENT_WIDTH: f64 = 680.0;
/// 默认界面语言
const DEFAULT_LOCALE: &str = "en";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置文件解析失败: {0}")]
    Parse(#[from] serde_json::Error),
}

// ==========================================
// Settings - 运行配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub requery_delay_ms: u64,        // 创建重查等待
    pub busy_safety_timeout_ms: u64,  // 忙碌指示安全超时
    pub content_width: f64,           // 单证内容区总宽
    pub download_dir: Option<PathBuf>, // 本地下载目录 (None = 系统下载目录)
    pub default_locale: String,       // 界面语言
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            requery_delay_ms: DEFAULT_REQUERY_DELAY_MS,
            busy_safety_timeout_ms: DEFAULT_BUSY_SAFETY_TIMEOUT_MS,
            content_width: DEFAULT_CONTENT_WIDTH,
            download_dir: None,
            default_locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl Settings {
    /// 从默认配置路径加载; 文件缺失或损坏时回退默认值
    pub fn load() -> Self {
        match default_config_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(settings) => settings,
                Err(err) => {
                    tracing::warn!(error = %err, path = %path.display(), "配置文件损坏,使用默认配置");
                    Settings::default()
                }
            },
            _ => Settings::default(),
        }
    }

    /// 从指定路径加载配置
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&raw)?;
        Ok(settings)
    }

    /// 保存配置到指定路径 (目录不存在时创建)
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// 创建重查等待时长
    pub fn requery_delay(&self) -> Duration {
        Duration::from_millis(self.requery_delay_ms)
    }

    /// 忙碌指示安全超时时长
    pub fn busy_safety_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_safety_timeout_ms)
    }

    /// 本地下载目录: 配置值 → 系统下载目录 → 临时目录
    pub fn resolved_download_dir(&self) -> PathBuf {
        if let Some(dir) = &self.download_dir {
            return dir.clone();
        }
        dirs::download_dir().unwrap_or_else(std::env::temp_dir)
    }
}

/// 默认配置文件路径: {配置目录}/export-docs/settings.json
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("export-docs").join("settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.requery_delay_ms, 800);
        assert_eq!(settings.busy_safety_timeout_ms, 45_000);
        assert_eq!(settings.default_locale, "en");
        assert!(settings.download_dir.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.requery_delay_ms = 250;
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(&path).unwrap();
        assert_eq!(reloaded.requery_delay_ms, 250);
        assert_eq!(reloaded.requery_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"content_width": 720.0}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.content_width, 720.0);
        assert_eq!(settings.requery_delay_ms, 800);
    }
}

// ==========================================
// 出口单证工作台 - 单证标签表
// ==========================================
// 职责: 按单证语言显式取标签,与界面全局 locale 无关
// ==========================================

use crate::domain::document::ColumnKind;
use crate::domain::types::DocLanguage;
use crate::i18n;

// ==========================================
// LabelSet - 按语言固定的标签表
// ==========================================
// 阿拉伯语单证在英文界面下生成时,标签仍取阿文
#[derive(Debug, Clone, Copy)]
pub struct LabelSet {
    locale: &'static str,
}

impl LabelSet {
    /// 按单证语言建立标签表
    pub fn for_language(language: DocLanguage) -> Self {
        Self {
            locale: language.locale(),
        }
    }

    /// 标签表对应的 locale 代码
    pub fn locale(&self) -> &'static str {
        self.locale
    }

    /// 取标签文本
    pub fn text(&self, key: &str) -> String {
        i18n::label(key, self.locale)
    }

    /// 取带参数的标签文本
    pub fn text_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        i18n::label_with_args(key, self.locale, args)
    }

    /// 明细表列的表头文字
    pub fn column(&self, kind: ColumnKind) -> String {
        self.text(kind.label_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_follow_document_language() {
        let en = LabelSet::for_language(DocLanguage::English);
        let ar = LabelSet::for_language(DocLanguage::Arabic);

        assert_eq!(en.text("doc.ci_title"), "COMMERCIAL INVOICE");
        assert_ne!(en.text("doc.ci_title"), ar.text("doc.ci_title"));
        assert_eq!(en.locale(), "en");
        assert_eq!(ar.locale(), "ar");
    }

    #[test]
    fn test_column_label() {
        let en = LabelSet::for_language(DocLanguage::English);
        assert_eq!(en.column(ColumnKind::Qty), "Quantity");
    }
}

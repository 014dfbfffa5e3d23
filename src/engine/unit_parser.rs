// ==========================================
// 出口单证工作台 - 包装描述解析器
// ==========================================
// 职责: 包装描述字符串 → 单位体积因子
// 红线: 解析失败退化为 0 并向下游传播零值,不报错
// ==========================================

use regex::Regex;
use std::sync::OnceLock;

// 匹配 "N×M" 后跟单位字母,如 "5X4L"
static PAIR_WITH_UNIT: OnceLock<Option<Regex>> = OnceLock::new();
// 匹配裸 "N×M",如 "30x4"
static BARE_PAIR: OnceLock<Option<Regex>> = OnceLock::new();
// 匹配行尾 数字+单位字母,如 "20L" / "DRUM 208L"
static TRAILING_UNIT: OnceLock<Option<Regex>> = OnceLock::new();
// 匹配第一个独立数字,如 "208"
static FIRST_NUMBER: OnceLock<Option<Regex>> = OnceLock::new();

fn pair_with_unit() -> Option<&'static Regex> {
    PAIR_WITH_UNIT
        .get_or_init(|| {
            Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*[x×]\s*(\d+(?:\.\d+)?)\s*[a-z]").ok()
        })
        .as_ref()
}

fn bare_pair() -> Option<&'static Regex> {
    BARE_PAIR
        .get_or_init(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*[x×]\s*(\d+(?:\.\d+)?)").ok())
        .as_ref()
}

fn trailing_unit() -> Option<&'static Regex> {
    TRAILING_UNIT
        .get_or_init(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*[a-z]+\s*$").ok())
        .as_ref()
}

fn first_number() -> Option<&'static Regex> {
    FIRST_NUMBER
        .get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)").ok())
        .as_ref()
}

// ==========================================
// UnitParser - 包装描述解析器
// ==========================================
pub struct UnitParser;

impl UnitParser {
    pub fn new() -> Self {
        Self
    }

    /// 解析包装描述为单位体积因子
    ///
    /// 规则(顺序执行,命中即返回):
    /// 1) `N×M` 后跟单位字母 (如 "5X4L") → N×M
    /// 2) 裸 `N×M` (如 "30x4") → N×M
    /// 3) 行尾 数字+单位字母 (如 "20L") → 该数字
    /// 4) 第一个独立数字 (如 "208") → 该数字
    /// 5) 其他 → 0
    ///
    /// 大小写不敏感; 乘号接受 ASCII "x" 或 "×"
    pub fn parse(&self, packaging: &str) -> f64 {
        let text = packaging.trim();
        if text.is_empty() {
            return 0.0;
        }

        // 规则1/2: N×M 乘积
        for re in [pair_with_unit(), bare_pair()].into_iter().flatten() {
            if let Some(cap) = re.captures(text) {
                let n = cap.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
                let m = cap.get(2).and_then(|m| m.as_str().parse::<f64>().ok());
                if let (Some(n), Some(m)) = (n, m) {
                    return n * m;
                }
            }
        }

        // 规则3: 行尾 数字+单位字母
        if let Some(re) = trailing_unit() {
            if let Some(value) = re
                .captures(text)
                .and_then(|cap| cap.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
            {
                return value;
            }
        }

        // 规则4: 第一个独立数字
        if let Some(re) = first_number() {
            if let Some(value) = re
                .captures(text)
                .and_then(|cap| cap.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
            {
                return value;
            }
        }

        0.0
    }
}

impl Default for UnitParser {
    fn default() -> Self {
        UnitParser::new()
    }
}

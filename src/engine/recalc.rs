// ==========================================
// 出口单证工作台 - 派生字段重算引擎
// ==========================================
// 红线: 固定依赖顺序,锁定字段跳过但其下游仍以手工值续算
// 职责: 行状态 + 锁定集合 → 派生字段
// 输入: LineItem (就地改写)
// 输出: 改写后的派生字段
// ==========================================

use crate::domain::line_item::LineItem;
use crate::domain::types::{DerivedField, ValueType};
use crate::engine::unit_parser::UnitParser;
use tracing::instrument;

/// 冷却液密度 (品名含 "COOLANT")
pub const COOLANT_DENSITY: f64 = 1.07;
/// 默认密度
pub const DEFAULT_DENSITY: f64 = 0.9;
/// 单个托盘重量 (kg)
pub const PALLET_UNIT_WEIGHT: f64 = 19.38;

const COOLANT_MARKER: &str = "COOLANT";

// ==========================================
// RecalcOptions - 重算选项
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct RecalcOptions {
    pub include_prices: bool, // 是否连带金额字段
}

impl Default for RecalcOptions {
    fn default() -> Self {
        Self { include_prices: true }
    }
}

// ==========================================
// RecalcEngine - 派生字段重算引擎
// ==========================================
pub struct RecalcEngine {
    parser: UnitParser,
}

impl RecalcEngine {
    pub fn new() -> Self {
        Self {
            parser: UnitParser::new(),
        }
    }

    /// 单行重算 (主通道)
    ///
    /// 固定顺序:
    /// 1) uom_factor ← packaging 解析 (恒算)
    /// 2) pending_qty ← ordered - loaded (恒算)
    /// 3) total_volume ← loaded × uom (锁定则跳过)
    /// 4) net_weight ← total_volume × 密度 (锁定则跳过)
    /// 5) pallet_weight ← palletized ? pallet_count × 19.38 : 0 (恒算)
    /// 6) gross_weight ← pallet_weight + net_weight + loaded (锁定则跳过)
    /// 7) total_incl ← total_excl + vat (金额步跳过时也执行,锁定则跳过)
    ///
    /// 未知包装退化为因子 0 并向下游传播零值
    pub fn recalc_row(&self, row: &mut LineItem, options: RecalcOptions) {
        // 1. 单位体积因子: 永远从包装描述重导出
        row.uom_factor = self.parser.parse(&row.packaging);

        // 2. 待装数量: 恒算,与锁定无关
        row.pending_qty = row.ordered_qty - row.loaded_qty;

        // 3. 总体积
        if !row.is_pinned(DerivedField::TotalVolume) {
            row.total_volume = row.loaded_qty * row.uom_factor;
        }

        // 4. 净重: 下游以当前 total_volume 续算,锁定的手工值照用
        if !row.is_pinned(DerivedField::NetWeight) {
            row.net_weight = row.total_volume * Self::density_for(&row.description);
        }

        // 5. 托盘重量: 恒算,不可锁定
        row.pallet_weight = if row.palletized {
            row.pallet_count * PALLET_UNIT_WEIGHT
        } else {
            0.0
        };

        // 6. 毛重
        if !row.is_pinned(DerivedField::GrossWeight) {
            row.gross_weight = row.pallet_weight + row.net_weight + row.loaded_qty;
        }

        if options.include_prices {
            self.recalc_prices(row);
        } else if !row.is_pinned(DerivedField::TotalInclVat) {
            // 金额步跳过时含税合计仍维持恒等式
            row.total_incl_vat = row.total_excl_vat + row.vat_amount;
        }
    }

    /// 金额重算 (对账后单独调用)
    ///
    /// total_excl_vat ← 0 (PRICELESS) 或 unit_price × loaded (锁定则跳过)
    /// total_incl_vat ← total_excl_vat + vat (锁定则跳过)
    pub fn recalc_prices(&self, row: &mut LineItem) {
        if !row.is_pinned(DerivedField::TotalExclVat) {
            row.total_excl_vat = match row.value_type {
                ValueType::Priceless => 0.0,
                _ => row.unit_price * row.loaded_qty,
            };
        }
        if !row.is_pinned(DerivedField::TotalInclVat) {
            row.total_incl_vat = row.total_excl_vat + row.vat_amount;
        }
    }

    /// 轻量重算: 仅含税金额
    ///
    /// 手工改税额或未税金额后调用,保留两者,含税无条件重导出
    pub fn recalc_incl_only(&self, row: &mut LineItem) {
        row.total_incl_vat = row.total_excl_vat + row.vat_amount;
    }

    /// 全表重算,返回处理行数
    #[instrument(skip(self, rows), fields(count = rows.len()))]
    pub fn recalc_all(&self, rows: &mut [LineItem], options: RecalcOptions) -> usize {
        for row in rows.iter_mut() {
            self.recalc_row(row, options);
        }
        rows.len()
    }

    /// 品名对应的密度: 含 "COOLANT" (不分大小写) 为冷却液密度
    pub fn density_for(description: &str) -> f64 {
        if description.to_uppercase().contains(COOLANT_MARKER) {
            COOLANT_DENSITY
        } else {
            DEFAULT_DENSITY
        }
    }
}

impl Default for RecalcEngine {
    fn default() -> Self {
        RecalcEngine::new()
    }
}

// ==========================================
// 工厂管理系统 - 库存类型
// ==========================================

use std::fmt;

/// 带库存计数器的实体
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StockKind {
    Product,
    Material,
}

impl StockKind {
    pub fn table(self) -> &'static str {
        match self {
            StockKind::Product => "products",
            StockKind::Material => "materials",
        }
    }

    pub fn entity_name(self) -> &'static str {
        match self {
            StockKind::Product => "Product",
            StockKind::Material => "Material",
        }
    }
}

impl fmt::Display for StockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entity_name())
    }
}

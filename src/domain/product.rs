// ==========================================
// 工厂管理系统 - 产品与物料清单
// ==========================================

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Identified;

/// 产品
///
/// quantity 为库存计数器，只由订单/生产单据维护；写入时忽略该字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub category_name: String,
    pub quantity: i64,
    pub price: Decimal,
    pub product_details_list: Vec<ProductDetailDto>,
}

/// 物料清单行：每生产一个产品消耗 quantity 个物料
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDetailDto {
    pub id: i64,
    pub product_name: String,
    pub material_name: String,
    pub quantity: i64,
}

impl Identified for ProductDto {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

// ==========================================
// 工厂管理系统 - 销售订单
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Identified;

/// 销售订单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub code: String,
    #[serde(with = "crate::domain::dates::iso_datetime")]
    pub order_date: NaiveDateTime,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub order_details_list: Vec<OrderDetailDto>,
}

/// 订单行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderDetailDto {
    pub id: i64,
    pub order_code: String,
    pub product_name: String,
    pub qty: i64,
}

impl Identified for OrderDto {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

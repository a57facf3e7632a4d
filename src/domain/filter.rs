// ==========================================
// 工厂管理系统 - 列表过滤条件
// ==========================================
// 所有字段可选；空白字符串视为未提供
// ==========================================

use serde::Deserialize;

/// 取出非空白的过滤值
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// 仅按文本搜索（类别 / 客户 / 供应商）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextFilter {
    pub search_text: Option<String>,
}

/// 按文本 + 类别名称（物料 / 产品）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFilter {
    pub search_text: Option<String>,
    pub category: Option<String>,
}

/// 订单过滤
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderFilter {
    pub search_text: Option<String>,
    pub string_date: Option<String>,
    pub customer: Option<String>,
}

/// 采购单过滤
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseFilter {
    pub search_text: Option<String>,
    pub string_date: Option<String>,
    pub supplier: Option<String>,
}

/// 生产记录过滤
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductionFilter {
    pub search_text: Option<String>,
    pub string_date: Option<String>,
    pub product_name: Option<String>,
}

// ==========================================
// 测试数据构建器
// ==========================================
// 职责: 生成各实体的 JSON 请求体（camelCase，与前端约定一致）
// ==========================================

#![allow(dead_code)]

use serde_json::{json, Value};

pub fn category(name: &str) -> Value {
    json!({ "name": name, "description": format!("{} category", name) })
}

pub fn partner(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "contact": "Jane Roe",
        "address": "Main St 1",
        "city": "Springfield",
        "postal": "12345",
        "phone": "555-0100",
        "email": email,
    })
}

pub fn material(name: &str, category: &str, price: f64) -> Value {
    json!({ "name": name, "categoryName": category, "price": price })
}

/// 产品，`bom` 为 (物料名称, 单耗)
pub fn product(name: &str, category: &str, price: f64, bom: &[(&str, i64)]) -> Value {
    let details: Vec<Value> = bom
        .iter()
        .map(|(material, qty)| json!({ "materialName": material, "quantity": qty }))
        .collect();
    json!({
        "name": name,
        "categoryName": category,
        "price": price,
        "productDetailsList": details,
    })
}

/// 销售订单，`lines` 为 (产品名称, 数量)
pub fn order(code: &str, date: &str, customer: &str, lines: &[(&str, i64)]) -> Value {
    let details: Vec<Value> = lines
        .iter()
        .map(|(product, qty)| json!({ "productName": product, "qty": qty }))
        .collect();
    json!({
        "code": code,
        "orderDate": date,
        "customerName": customer,
        "orderDetailsList": details,
    })
}

/// 采购单，`lines` 为 (物料名称, 数量)
pub fn purchase(code: &str, date: &str, supplier: &str, lines: &[(&str, i64)]) -> Value {
    let details: Vec<Value> = lines
        .iter()
        .map(|(material, qty)| json!({ "materialName": material, "qty": qty }))
        .collect();
    json!({
        "code": code,
        "purchaseDate": date,
        "supplierName": supplier,
        "purchaseDetailList": details,
    })
}

pub fn production(code: &str, date: &str, product: &str, qty: i64) -> Value {
    json!({
        "code": code,
        "productionDate": date,
        "productName": product,
        "qty": qty,
    })
}

/// 为请求体设置 id（用于 PATCH）
pub fn with_id(mut body: Value, id: i64) -> Value {
    body["id"] = json!(id);
    body
}

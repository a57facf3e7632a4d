// ==========================================
// API层集成端到端测试
// ==========================================
// 目标: 通过完整路由验证 增删改查 → 库存联动 → 状态码 的约定
// 只走 HTTP 接口，不直接访问数据库
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[path = "helpers/test_data_builder.rs"]
mod test_data_builder;

#[cfg(test)]
mod api_integration_e2e_test {
    use axum::http::StatusCode;
    use axum::Router;
    use serde_json::json;

    use crate::test_data_builder as data;
    use crate::test_helpers::{create_ok, create_test_app, delete, get, patch, post, quantity_of};

    /// 基础主数据: 类别 Parts、供应商 Bolts Inc、客户 Acme、物料 Bolt
    async fn seed_master_data(app: &Router) -> i64 {
        create_ok(app, "categories", data::category("Parts")).await;
        create_ok(app, "suppliers", data::partner("Bolts Inc", "sales@bolts.com")).await;
        create_ok(app, "customers", data::partner("Acme", "buyer@acme.com")).await;
        create_ok(app, "materials", data::material("Bolt", "Parts", 0.5)).await
    }

    // ==========================================
    // 库存联动
    // ==========================================

    #[tokio::test]
    async fn test_生产按物料清单扣减物料() {
        let (_tmp, _state, app) = create_test_app();
        let bolt = seed_master_data(&app).await;
        assert_eq!(quantity_of(&app, "materials", bolt).await, 0);

        create_ok(
            &app,
            "purchases",
            data::purchase("PUR-1", "2024-05-01", "Bolts Inc", &[("Bolt", 20)]),
        )
        .await;
        assert_eq!(quantity_of(&app, "materials", bolt).await, 20);

        let widget = create_ok(
            &app,
            "products",
            data::product("Widget", "Parts", 9.99, &[("Bolt", 2)]),
        )
        .await;
        assert_eq!(quantity_of(&app, "products", widget).await, 0);

        let run = create_ok(
            &app,
            "productions",
            data::production("PRD-1", "2024-05-02", "Widget", 5),
        )
        .await;
        assert_eq!(quantity_of(&app, "products", widget).await, 5);
        assert_eq!(quantity_of(&app, "materials", bolt).await, 10);

        // 修改产量：先撤销旧记录再应用新记录
        let resp = patch(
            &app,
            "/api/productions/patch",
            data::with_id(data::production("PRD-1", "2024-05-02", "Widget", 3), run),
        )
        .await;
        assert_eq!(resp.status, StatusCode::NO_CONTENT);
        assert_eq!(quantity_of(&app, "products", widget).await, 3);
        assert_eq!(quantity_of(&app, "materials", bolt).await, 14);

        let resp = delete(&app, &format!("/api/productions/delete/{}", run)).await;
        assert_eq!(resp.status, StatusCode::NO_CONTENT);
        assert_eq!(quantity_of(&app, "products", widget).await, 0);
        assert_eq!(quantity_of(&app, "materials", bolt).await, 20);
    }

    #[tokio::test]
    async fn test_生产物料不足返回400() {
        let (_tmp, _state, app) = create_test_app();
        let bolt = seed_master_data(&app).await;
        create_ok(
            &app,
            "purchases",
            data::purchase("PUR-1", "2024-05-01", "Bolts Inc", &[("Bolt", 3)]),
        )
        .await;
        create_ok(
            &app,
            "products",
            data::product("Widget", "Parts", 9.99, &[("Bolt", 2)]),
        )
        .await;

        let resp = post(
            &app,
            "/api/productions/create",
            data::production("PRD-1", "2024-05-02", "Widget", 2),
        )
        .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert!(resp.json().get("ProductName").is_some());
        assert_eq!(quantity_of(&app, "materials", bolt).await, 3);
    }

    #[tokio::test]
    async fn test_订单扣减与删除恢复() {
        let (_tmp, _state, app) = create_test_app();
        seed_master_data(&app).await;
        create_ok(
            &app,
            "purchases",
            data::purchase("PUR-1", "2024-05-01", "Bolts Inc", &[("Bolt", 20)]),
        )
        .await;
        let widget = create_ok(
            &app,
            "products",
            data::product("Widget", "Parts", 9.99, &[("Bolt", 2)]),
        )
        .await;
        create_ok(
            &app,
            "productions",
            data::production("PRD-1", "2024-05-02", "Widget", 5),
        )
        .await;

        let order = create_ok(
            &app,
            "orders",
            data::order("ORD-1", "2024-05-03", "Acme", &[("Widget", 3)]),
        )
        .await;
        assert_eq!(quantity_of(&app, "products", widget).await, 2);

        // 超出可用库存
        let resp = post(
            &app,
            "/api/orders/create",
            data::order("ORD-2", "2024-05-03", "Acme", &[("Widget", 3)]),
        )
        .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert!(resp.json().get("OrderDetailsList").is_some());
        assert_eq!(quantity_of(&app, "products", widget).await, 2);

        // 修改时原订单占用的数量计入可用
        let resp = patch(
            &app,
            "/api/orders/patch",
            data::with_id(
                data::order("ORD-1", "2024-05-03", "Acme", &[("Widget", 5)]),
                order,
            ),
        )
        .await;
        assert_eq!(resp.status, StatusCode::NO_CONTENT);
        assert_eq!(quantity_of(&app, "products", widget).await, 0);

        let loaded = get(&app, &format!("/api/orders/{}", order)).await.json();
        assert_eq!(loaded["orderDate"], "2024-05-03T00:00:00");
        assert_eq!(loaded["orderDetailsList"][0]["qty"], 5);
        assert_eq!(loaded["orderDetailsList"][0]["orderCode"], "ORD-1");

        let resp = delete(&app, &format!("/api/orders/delete/{}", order)).await;
        assert_eq!(resp.status, StatusCode::NO_CONTENT);
        assert_eq!(quantity_of(&app, "products", widget).await, 5);
    }

    #[tokio::test]
    async fn test_采购已被消耗时删除返回400() {
        let (_tmp, _state, app) = create_test_app();
        let bolt = seed_master_data(&app).await;
        let purchase = create_ok(
            &app,
            "purchases",
            data::purchase("PUR-1", "2024-05-01", "Bolts Inc", &[("Bolt", 10)]),
        )
        .await;
        create_ok(
            &app,
            "products",
            data::product("Widget", "Parts", 9.99, &[("Bolt", 2)]),
        )
        .await;
        create_ok(
            &app,
            "productions",
            data::production("PRD-1", "2024-05-02", "Widget", 4),
        )
        .await;

        let resp = delete(&app, &format!("/api/purchases/delete/{}", purchase)).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert!(resp.json().get("Quantity").is_some());

        // 事务回滚：采购单与库存均未变化
        assert_eq!(get(&app, &format!("/api/purchases/{}", purchase)).await.status, StatusCode::OK);
        assert_eq!(quantity_of(&app, "materials", bolt).await, 2);
    }

    // ==========================================
    // 校验
    // ==========================================

    #[tokio::test]
    async fn test_名称唯一_大小写不敏感() {
        let (_tmp, _state, app) = create_test_app();
        let id = create_ok(&app, "categories", data::category("Parts")).await;

        let resp = post(&app, "/api/categories/create", data::category("PARTS")).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert!(resp.json().get("Name").is_some());

        // 原样提交自身不算冲突
        let resp = patch(
            &app,
            "/api/categories/patch",
            data::with_id(data::category("Parts"), id),
        )
        .await;
        assert_eq!(resp.status, StatusCode::NO_CONTENT);

        let resp = patch(
            &app,
            "/api/categories/patch",
            data::with_id(data::category("Tools"), id),
        )
        .await;
        assert_eq!(resp.status, StatusCode::NO_CONTENT);
        assert_eq!(get(&app, &format!("/api/categories/{}", id)).await.json()["name"], "Tools");
    }

    #[tokio::test]
    async fn test_字段校验错误表() {
        let (_tmp, _state, app) = create_test_app();

        let resp = post(&app, "/api/materials/create", data::material("", "Nowhere", 0.0)).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        let errors = resp.json();
        assert!(errors.get("Name").is_some());
        assert!(errors.get("Price").is_some());
        assert!(errors.get("CategoryName").is_some());

        let resp = post(
            &app,
            "/api/customers/create",
            data::partner("Acme", "not-an-email"),
        )
        .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert!(resp.json().get("Email").is_some());

        let resp = post(
            &app,
            "/api/customers/create",
            data::partner("Acme", "buyer@@acme.com"),
        )
        .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert!(resp.json().get("Email").is_some());
    }

    #[tokio::test]
    async fn test_请求体无法解析返回400() {
        let (_tmp, _state, app) = create_test_app();
        seed_master_data(&app).await;

        let mut body = data::order("ORD-1", "2024-05-03", "Acme", &[("Widget", 1)]);
        body.as_object_mut().unwrap().remove("orderDate");
        let resp = post(&app, "/api/orders/create", body).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert!(resp.json().get("OrderDate").is_some());

        let body = data::order("ORD-1", "not-a-date", "Acme", &[("Widget", 1)]);
        let resp = post(&app, "/api/orders/create", body).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert!(resp.json().get("OrderDate").is_some());

        // 修改走同一条路径
        let body = data::with_id(data::order("ORD-1", "not-a-date", "Acme", &[]), 1);
        let resp = patch(&app, "/api/orders/patch", body).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);

        let resp = post(&app, "/api/categories/create", json!(["Parts"])).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert!(resp.json().get("Body").is_some());

        assert_eq!(get(&app, "/api/orders/all").await.json(), json!([]));
    }

    #[tokio::test]
    async fn test_新增忽略请求中的id() {
        let (_tmp, _state, app) = create_test_app();
        let resp = post(
            &app,
            "/api/categories/create",
            data::with_id(data::category("Parts"), 77),
        )
        .await;
        assert_eq!(resp.status, StatusCode::CREATED);
        assert!(resp.body.is_empty());
        assert_eq!(resp.location.as_deref(), Some("/api/categories/1"));
    }

    #[tokio::test]
    async fn test_删除被引用记录返回400() {
        let (_tmp, _state, app) = create_test_app();
        seed_master_data(&app).await;
        let parts = get(&app, "/api/categories/all").await.json()[0]["id"]
            .as_i64()
            .unwrap();

        let resp = delete(&app, &format!("/api/categories/delete/{}", parts)).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert!(resp.json().get("Id").is_some());
        assert_eq!(get(&app, "/api/materials/all").await.json().as_array().unwrap().len(), 1);
    }

    // ==========================================
    // 查询
    // ==========================================

    #[tokio::test]
    async fn test_分页与搜索() {
        let (_tmp, _state, app) = create_test_app();
        for name in ["Alpha", "Beta", "Gamma", "Delta", "Epsilon"] {
            create_ok(&app, "categories", data::category(name)).await;
        }

        // 默认每页 4 条
        let page = get(&app, "/api/categories").await.json();
        assert_eq!(page["dataList"].as_array().unwrap().len(), 4);
        assert_eq!(page["pageIndex"], 1);
        assert_eq!(page["pageSize"], 4);
        assert_eq!(page["totalPages"], 2);

        let page = get(&app, "/api/categories?pageIndex=2&pageSize=2").await.json();
        let names: Vec<&str> = page["dataList"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Gamma", "Delta"]);
        assert_eq!(page["totalPages"], 3);

        let page = get(&app, "/api/categories?pageIndex=9&pageSize=2").await.json();
        assert!(page["dataList"].as_array().unwrap().is_empty());
        assert_eq!(page["totalPages"], 3);

        let page = get(&app, "/api/categories?searchText=TA").await.json();
        assert_eq!(page["dataList"].as_array().unwrap().len(), 2);
        assert_eq!(page["totalPages"], 1);
    }

    #[tokio::test]
    async fn test_日期列表与日期过滤() {
        let (_tmp, _state, app) = create_test_app();
        seed_master_data(&app).await;
        for (code, date) in [
            ("PUR-1", "2024-05-01T08:30:00"),
            ("PUR-2", "2024-05-01"),
            ("PUR-3", "2024-05-03"),
        ] {
            create_ok(
                &app,
                "purchases",
                data::purchase(code, date, "Bolts Inc", &[("Bolt", 1)]),
            )
            .await;
        }

        let dates = get(&app, "/api/purchases/dates").await.json();
        assert_eq!(dates, json!(["2024-05-01", "2024-05-03"]));

        let page = get(&app, "/api/purchases?stringDate=2024-05-01").await.json();
        assert_eq!(page["dataList"].as_array().unwrap().len(), 2);

        let page = get(&app, "/api/purchases?supplier=bolts%20inc&searchText=pur-3").await.json();
        assert_eq!(page["dataList"].as_array().unwrap().len(), 1);
        assert_eq!(page["dataList"][0]["purchaseDetailList"][0]["materialName"], "Bolt");

        let resp = get(&app, "/api/purchases?stringDate=someday").await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert!(resp.json().get("StringDate").is_some());

        let dates = get(&app, "/api/orders/dates").await.json();
        assert_eq!(dates, json!([]));
    }

    #[tokio::test]
    async fn test_不存在的记录返回404() {
        let (_tmp, _state, app) = create_test_app();

        assert_eq!(get(&app, "/api/orders/999").await.status, StatusCode::NOT_FOUND);
        assert_eq!(
            delete(&app, "/api/materials/delete/999").await.status,
            StatusCode::NOT_FOUND
        );

        let resp = patch(
            &app,
            "/api/categories/patch",
            data::with_id(data::category("Parts"), 999),
        )
        .await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND);

        // 无 id 的修改请求
        let resp = patch(&app, "/api/categories/patch", data::category("Parts")).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
    }
}

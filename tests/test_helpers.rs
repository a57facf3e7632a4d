// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、路由构建与 HTTP 请求发送
// ==========================================

#![allow(dead_code)]

use std::error::Error;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use factory_mgmt::config::ServerConfig;
use factory_mgmt::logging::{self, LogFormat};
use factory_mgmt::{build_router, AppState, Database, SharedState};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - Database: 已建表的数据库句柄
pub fn create_test_db() -> Result<(NamedTempFile, Database), Box<dyn Error>> {
    logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();
    let db = Database::open(&db_path)?;

    Ok((temp_file, db))
}

/// 测试用启动配置
pub fn test_config(db_path: &str) -> ServerConfig {
    ServerConfig {
        db_path: db_path.to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origins: vec!["http://localhost:5092".to_string()],
        log_format: LogFormat::Text,
        locale: "en".to_string(),
    }
}

/// 创建测试应用（临时文件数据库 + 完整路由）
pub fn create_test_app() -> (NamedTempFile, SharedState, Router) {
    let (temp_file, db) = create_test_db().unwrap();
    let config = test_config(&temp_file.path().to_string_lossy());
    let state = Arc::new(AppState::new(db, config));
    let app = build_router(state.clone());
    (temp_file, state, app)
}

/// HTTP 响应（状态码 + 响应头 + 响应体）
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// 发送请求
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();

    TestResponse {
        status,
        location,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> TestResponse {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch(app: &Router, uri: &str, body: Value) -> TestResponse {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::DELETE, uri, None).await
}

/// 新增并返回新 id（从 Location 头解析）
pub async fn create_ok(app: &Router, entity: &str, body: Value) -> i64 {
    let resp = post(app, &format!("/api/{}/create", entity), body).await;
    assert_eq!(
        resp.status,
        StatusCode::CREATED,
        "创建 {} 失败: {}",
        entity,
        String::from_utf8_lossy(&resp.body)
    );
    resp.location
        .as_deref()
        .and_then(|l| l.rsplit('/').next())
        .and_then(|id| id.parse().ok())
        .unwrap()
}

/// 读取单条记录的 quantity 字段
pub async fn quantity_of(app: &Router, entity: &str, id: i64) -> i64 {
    let resp = get(app, &format!("/api/{}/{}", entity, id)).await;
    assert_eq!(resp.status, StatusCode::OK);
    resp.json()["quantity"].as_i64().unwrap()
}

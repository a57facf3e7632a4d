// ==========================================
// 工厂管理系统 - 通用 HTTP 处理器
// ==========================================
// 所有实体共用同一组处理器，按 Resource 类型参数分派：
// - GET    /api/{entity}              分页列表
// - GET    /api/{entity}/all          全部
// - GET    /api/{entity}/{id}         单条
// - POST   /api/{entity}/create       新增（201）
// - PATCH  /api/{entity}/patch        修改（204）
// - DELETE /api/{entity}/delete/{id}  删除（204）
// - GET    /api/{entity}/dates        去重日期（仅单据类）
// 写操作的校验与落库在同一个事务内完成；无法解析的请求体按 400 字段错误返回
// ==========================================

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};

use crate::api::error::{ApiError, ApiResult};
use crate::api::resource::{DatedResource, Resource};
use crate::app::state::SharedState;
use crate::domain::pagination::{PageQuery, PageRequest, Pagination};
use crate::domain::validation::FieldErrors;
use crate::domain::Identified;
use crate::repository::{CrudRepository, RepositoryError};

/// 单个实体的路由
pub fn resource_routes<R: Resource>() -> Router<SharedState> {
    let base = format!("/api/{}", R::PATH);
    Router::new()
        .route(&base, get(list::<R>))
        .route(&format!("{}/all", base), get(all::<R>))
        .route(&format!("{}/create", base), post(create::<R>))
        .route(&format!("{}/patch", base), patch(update::<R>))
        .route(&format!("{}/delete/{{id}}", base), delete(remove::<R>))
        .route(&format!("{}/{{id}}", base), get(get_one::<R>))
}

/// 单据类实体的路由（额外含 /dates）
pub fn dated_resource_routes<R: DatedResource>() -> Router<SharedState> {
    resource_routes::<R>().route(&format!("/api/{}/dates", R::PATH), get(dates::<R>))
}

async fn list<R: Resource>(
    State(state): State<SharedState>,
    Query(page_query): Query<PageQuery>,
    Query(filter): Query<R::Filter>,
) -> ApiResult<Json<Pagination<R::Dto>>> {
    let page = state
        .db
        .query(format!("{}.list", R::PATH), move |uow| {
            let settings = uow.config().pagination_settings()?;
            let page = PageRequest::normalize(page_query, &settings);
            R::repository(uow).list_paginated(&filter, &page)
        })
        .await?;
    Ok(Json(page))
}

async fn all<R: Resource>(State(state): State<SharedState>) -> ApiResult<Json<Vec<R::Dto>>> {
    let rows = state
        .db
        .query(format!("{}.all", R::PATH), |uow| R::repository(uow).get_all())
        .await?;
    Ok(Json(rows))
}

async fn get_one<R: Resource>(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<R::Dto>> {
    let dto = state
        .db
        .query(format!("{}.get", R::PATH), move |uow| {
            R::repository(uow).get_by_id(id)
        })
        .await?;
    dto.map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{}(id={})不存在", R::PATH, id)))
}

async fn create<R: Resource>(
    State(state): State<SharedState>,
    payload: Result<Json<R::Dto>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(mut dto) = payload?;
    dto.set_id(0);
    let outcome = state
        .db
        .transact(format!("{}.create", R::PATH), move |uow| {
            let repo = R::repository(uow);
            let errors = repo.validate(&dto)?;
            if !errors.is_empty() {
                return Ok(Err(errors));
            }
            repo.create(&dto).map(Ok)
        })
        .await?;

    let id = outcome.map_err(ApiError::Validation)?;
    tracing::info!(entity = R::PATH, id, "记录已创建");
    let location = format!("/api/{}/{}", R::PATH, id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

async fn update<R: Resource>(
    State(state): State<SharedState>,
    payload: Result<Json<R::Dto>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(dto) = payload?;
    let id = dto.id();
    let outcome: Result<(), FieldErrors> = state
        .db
        .transact(format!("{}.patch", R::PATH), move |uow| {
            let repo = R::repository(uow);
            if id <= 0 || !repo.exists(id)? {
                return Err(RepositoryError::not_found(repo.entity_name(), id));
            }
            let errors = repo.validate(&dto)?;
            if !errors.is_empty() {
                return Ok(Err(errors));
            }
            repo.edit(&dto).map(Ok)
        })
        .await?;

    outcome.map_err(ApiError::Validation)?;
    tracing::info!(entity = R::PATH, id, "记录已修改");
    Ok(StatusCode::NO_CONTENT)
}

async fn remove<R: Resource>(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .db
        .transact(format!("{}.delete", R::PATH), move |uow| {
            R::repository(uow).delete(id)
        })
        .await?;

    tracing::info!(entity = R::PATH, id, "记录已删除");
    Ok(StatusCode::NO_CONTENT)
}

async fn dates<R: DatedResource>(State(state): State<SharedState>) -> ApiResult<Json<Vec<String>>> {
    let dates = state
        .db
        .query(format!("{}.dates", R::PATH), R::distinct_dates)
        .await?;
    Ok(Json(dates))
}

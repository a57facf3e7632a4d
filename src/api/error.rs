// ==========================================
// 工厂管理系统 - API层错误类型
// ==========================================
// 职责: 将仓储层错误转换为 HTTP 响应
// - 校验错误: 400 + 字段错误表（含无法解析的请求体）
// - 记录不存在: 404
// - 其余错误: 500，响应体为空，详情只写日志
// ==========================================

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::domain::validation::FieldErrors;
use crate::i18n::{t, t_with_args};
use crate::repository::error::RepositoryError;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("数据校验失败: {0:?}")]
    Validation(FieldErrors),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }

            // 删除仍被引用的记录
            RepositoryError::ForeignKeyViolation(_) => {
                ApiError::Validation(FieldErrors::single("Id", t("validation.in_use")))
            }

            RepositoryError::InsufficientStock {
                name,
                available,
                requested,
                ..
            } => ApiError::Validation(FieldErrors::single(
                "Quantity",
                t_with_args(
                    "validation.insufficient_stock",
                    &[
                        ("name", name.as_str()),
                        ("available", &available.to_string()),
                        ("requested", &requested.to_string()),
                    ],
                ),
            )),

            RepositoryError::FieldValueError { field, message } => {
                ApiError::Validation(FieldErrors::single(field, message))
            }

            other => ApiError::InternalError(other.to_string()),
        }
    }
}

// ==========================================
// 从 JsonRejection 转换
// ==========================================
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        let field = rejection_field(&detail);
        tracing::debug!(field = %field, detail = %detail, "请求体无法解析");
        ApiError::Validation(FieldErrors::single(
            field,
            t_with_args("validation.body_invalid", &[("detail", detail.as_str())]),
        ))
    }
}

/// 从反序列化错误文本中找出出错的字段，找不到时归到 Body
///
/// 缺字段: "missing field `orderDate`"；值非法: "...target type: orderDate: ..."
fn rejection_field(detail: &str) -> String {
    let named = detail
        .split_once("missing field `")
        .and_then(|(_, rest)| rest.split_once('`'))
        .map(|(name, _)| name)
        .or_else(|| {
            let (_, tail) = detail.split_once("target type: ")?;
            let (path, _) = tail.split_once(": ")?;
            let leaf = path.rsplit('.').next()?;
            leaf.split('[').next()
        })
        .filter(|name| {
            !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

    match named {
        Some(name) => {
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => "Body".to_string(),
            }
        }
        None => "Body".to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ApiError::NotFound(msg) => {
                tracing::debug!(reason = %msg, "资源未找到");
                StatusCode::NOT_FOUND.into_response()
            }
            ApiError::InternalError(msg) => {
                tracing::error!(error = %msg, "请求处理失败");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

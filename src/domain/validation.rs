// ==========================================
// 工厂管理系统 - 字段校验结果
// ==========================================
// 校验失败以 “字段名 → 消息” 映射返回给调用方（HTTP 400）
// 同一字段只保留第一条消息
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::i18n::t_with_args;

/// 字段校验错误集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只含一条错误
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// 添加错误；字段已有消息时忽略
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 必填检查，返回值是否非空
    pub fn require(&mut self, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.add(field, t_with_args("validation.required", &[("field", field)]));
            return false;
        }
        true
    }

    /// 重复值错误
    pub fn add_duplicate(&mut self, entity: &str, field: &str) {
        self.add(
            field,
            t_with_args("validation.duplicate", &[("entity", entity), ("field", field)]),
        );
    }

    /// 引用的实体不存在
    pub fn add_unknown_reference(&mut self, field: &str, entity: &str, name: &str) {
        self.add(
            field,
            t_with_args(
                "validation.unknown_reference",
                &[("entity", entity), ("name", name)],
            ),
        );
    }
}

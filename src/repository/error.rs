// ==========================================
// 工具包发布跟踪系统 - 仓储层错误类型
// ==========================================
// 约定: 所有数据库失败统一包装为 SEVERE 级别错误
// 包装内容: 映射名 + 方法名 + 严重级别 + 失败的 SQL
// 工具: thiserror 派生宏
// ==========================================

use std::fmt;
use thiserror::Error;

/// 错误严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Severe,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Severe => write!(f, "SEVERE"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// 数据库失败分类（由 SQLite 错误消息归类）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    Query,
    UniqueConstraint,
    ForeignKey,
}

impl DbErrorKind {
    fn classify(err: &rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("UNIQUE") => {
                DbErrorKind::UniqueConstraint
            }
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("FOREIGN KEY") => {
                DbErrorKind::ForeignKey
            }
            _ => DbErrorKind::Query,
        }
    }
}

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("[{severity}] {entity}::{method} 数据库操作失败: {message} (query: {query})")]
    Database {
        entity: &'static str,
        method: &'static str,
        severity: Severity,
        kind: DbErrorKind,
        query: String,
        message: String,
    },

    #[error("[SEVERE] {entity}::{method} 记录未找到: {key}")]
    NotFound {
        entity: &'static str,
        method: &'static str,
        key: String,
    },

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    // ===== 数据质量错误 =====
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// 包装 rusqlite 错误并记录日志
    ///
    /// 所有 prepare/bind/execute/遍历结果集 的失败都经由此处
    pub fn wrap(
        err: rusqlite::Error,
        entity: &'static str,
        method: &'static str,
        query: &str,
    ) -> Self {
        if let rusqlite::Error::QueryReturnedNoRows = err {
            return Self::not_found(entity, method, query.trim());
        }

        let kind = DbErrorKind::classify(&err);
        tracing::error!(
            entity,
            method,
            severity = %Severity::Severe,
            query = %query.trim(),
            error = %err,
            "数据库操作失败"
        );

        RepositoryError::Database {
            entity,
            method,
            severity: Severity::Severe,
            kind,
            query: query.trim().to_string(),
            message: err.to_string(),
        }
    }

    /// 单行查询未命中
    pub fn not_found(entity: &'static str, method: &'static str, key: impl Into<String>) -> Self {
        let key = key.into();
        tracing::error!(entity, method, key = %key, severity = %Severity::Severe, "记录未找到");
        RepositoryError::NotFound { entity, method, key }
    }

    /// 错误严重级别
    pub fn severity(&self) -> Severity {
        match self {
            RepositoryError::Database { severity, .. } => *severity,
            RepositoryError::ValidationError(_) => Severity::Warning,
            _ => Severity::Severe,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }

    /// 数据库失败分类（非数据库错误返回 None）
    pub fn db_kind(&self) -> Option<DbErrorKind> {
        match self {
            RepositoryError::Database { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

// 无上下文场景（建库、PRAGMA 等）
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::wrap(err, "Database", "execute", "")
    }
}

/// 为 rusqlite 结果附加映射上下文
pub trait SqlResultExt<T> {
    fn with_sql(
        self,
        entity: &'static str,
        method: &'static str,
        query: &str,
    ) -> RepositoryResult<T>;
}

impl<T> SqlResultExt<T> for rusqlite::Result<T> {
    fn with_sql(
        self,
        entity: &'static str,
        method: &'static str,
        query: &str,
    ) -> RepositoryResult<T> {
        self.map_err(|e| RepositoryError::wrap(e, entity, method, query))
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

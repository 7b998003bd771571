// ==========================================
// 工具包发布跟踪系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite (rusqlite)
// 系统定位: 发布跟踪数据库的数据访问层
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 连接配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 表结构与字典数据
pub mod schema;

// 会话 - 共享连接与操作人
pub mod session;

// 日志系统
pub mod logging;

// SQL 性能统计
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{ConfigError, DbConfig};
pub use domain::{
    Audit, ChangeRequest, ChangeRequestStatus, CodeUpdate, Component, ComponentPackage,
    ComponentTkVersion, ComponentType, ComponentUpdate, ComponentVersion, Deliverable,
    DeliverableUpdate, FileVersion, Link, Location, Platform, Release, StageName, StatusEvent,
    StatusName, ToolKit,
};
pub use repository::{
    DbErrorKind, Entity, JoinRepository, RepositoryError, RepositoryResult, Severity,
    StatusHistoryRepository, TableRepository,
};
pub use session::DbSession;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "工具包发布跟踪系统";

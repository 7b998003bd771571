// ==========================================
// 工具包发布跟踪系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,表名/列名只来自静态元数据
// ==========================================
// 结构:
// - table_def / tables: 表元数据（实体表 / 关联表 / 状态历史表）
// - table_repo / join_repo / history_repo: 通用仓储
// - *_repo: 各表专用查询（组合通用仓储）
// ==========================================

pub mod entity;
pub mod error;
pub mod exec;
pub mod mappers;
pub mod raw;
pub mod sql;
pub mod table_def;
pub mod tables;

pub mod history_repo;
pub mod join_repo;
pub mod table_repo;

pub mod change_request_repo;
pub mod code_update_repo;
pub mod component_tk_version_repo;
pub mod component_version_repo;
pub mod delivery_repo;
pub mod file_version_repo;
pub mod location_repo;
pub mod tool_kit_repo;

// 重导出核心类型
pub use entity::Entity;
pub use error::{DbErrorKind, RepositoryError, RepositoryResult, Severity};
pub use table_def::{AuditMode, HistoryDef, JoinDef, TableDef};

// 重导出通用仓储
pub use history_repo::StatusHistoryRepository;
pub use join_repo::JoinRepository;
pub use table_repo::TableRepository;

// 重导出专用仓储
pub use change_request_repo::ChangeRequestRepository;
pub use code_update_repo::CodeUpdateRepository;
pub use component_tk_version_repo::ComponentTkVersionRepository;
pub use component_version_repo::ComponentVersionRepository;
pub use delivery_repo::{ComponentUpdateRepository, DeliverableRepository, DeliverableUpdateRepository};
pub use file_version_repo::FileVersionRepository;
pub use location_repo::LocationRepository;
pub use tool_kit_repo::ToolKitRepository;

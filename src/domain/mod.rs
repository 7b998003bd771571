// ==========================================
// 工具包发布跟踪系统 - 领域模型层
// ==========================================
// 职责: 定义各表对应的记录类型与审计字段
// 红线: 不含数据访问逻辑
// ==========================================
// 说明: 外键以主键 id 保存，由调用方按需经仓储加载关联记录
// ==========================================

pub mod audit;
pub mod catalog;
pub mod change;
pub mod delivery;
pub mod link;
pub mod tool_kit;

// 重导出核心类型
pub use audit::Audit;
pub use catalog::{
    ChangeRequestStatus, Component, ComponentType, Location, Platform, Release, StageName,
};
pub use change::{ChangeRequest, CodeUpdate, FileVersion};
pub use delivery::{ComponentUpdate, Deliverable, DeliverableUpdate};
pub use link::{Link, StatusEvent, StatusName};
pub use tool_kit::{ComponentPackage, ComponentTkVersion, ComponentVersion, ToolKit};

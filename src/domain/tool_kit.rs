// ==========================================
// 工具包发布跟踪系统 - 工具包与组件版本
// ==========================================
// 对齐: tool_kit / component_version / component_tk_version / component_package
// 说明: 外键字段只保存 id，关联对象由调用方按需查询
// ==========================================

use crate::domain::audit::Audit;
use serde::{Deserialize, Serialize};

// ==========================================
// ToolKit - 工具包版本 (如 "14.1.6")
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolKit {
    pub id: i64,
    pub name: String,
    pub release_id: i64,
    pub stage_name_id: i64,
    pub description: Option<String>,
    pub audit: Audit,
}

impl ToolKit {
    pub fn new(name: impl Into<String>, release_id: i64, stage_name_id: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            release_id,
            stage_name_id,
            description: None,
            audit: Audit::default(),
        }
    }
}

// ==========================================
// ComponentVersion - 组件在某发布中的版本
// ==========================================
// 唯一: (component_id, release_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentVersion {
    pub id: i64,
    pub component_id: i64,
    pub release_id: i64,
    pub component_type_id: Option<i64>,
    pub audit: Audit,
}

impl ComponentVersion {
    pub fn new(component_id: i64, release_id: i64, component_type_id: Option<i64>) -> Self {
        Self {
            id: 0,
            component_id,
            release_id,
            component_type_id,
            audit: Audit::default(),
        }
    }
}

// ==========================================
// ComponentTkVersion - 组件版本在某工具包中的实例
// ==========================================
// 唯一: (component_version_id, tool_kit_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentTkVersion {
    pub id: i64,
    pub component_version_id: i64,
    pub tool_kit_id: i64,
    pub ready_for_release: bool,
    pub audit: Audit,
}

impl ComponentTkVersion {
    pub fn new(component_version_id: i64, tool_kit_id: i64) -> Self {
        Self {
            id: 0,
            component_version_id,
            tool_kit_id,
            ready_for_release: false,
            audit: Audit::default(),
        }
    }
}

// ==========================================
// ComponentPackage - 组件安装包
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentPackage {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub audit: Audit,
}

impl ComponentPackage {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description,
            audit: Audit::default(),
        }
    }
}

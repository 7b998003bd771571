// ==========================================
// 工具包发布跟踪系统 - 基础实体
// ==========================================
// 对齐: component / component_type / tk_release / platform / location
//       stage_name / change_request_status
// ==========================================

use crate::domain::audit::Audit;
use serde::{Deserialize, Serialize};

// ==========================================
// Component - 组件
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: i64, // 0 表示尚未入库，由 add_row 分配
    pub name: String,
    pub description: Option<String>,
    pub audit: Audit,
}

impl Component {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description,
            audit: Audit::default(),
        }
    }
}

// ==========================================
// ComponentType - 组件类型
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub audit: Audit,
}

impl ComponentType {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description,
            audit: Audit::default(),
        }
    }
}

// ==========================================
// Release - 发布
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: i64,
    pub name: String, // 如 "14.1"
    pub description: Option<String>,
    pub audit: Audit,
}

impl Release {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description,
            audit: Audit::default(),
        }
    }
}

// ==========================================
// Platform - 平台
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: i64,
    pub name: String,               // 如 "64-bit Linux"
    pub short_name: Option<String>, // 如 "64-linux50"
    pub description: Option<String>,
    pub audit: Audit,
}

impl Platform {
    pub fn new(name: impl Into<String>, short_name: Option<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            short_name,
            description: None,
            audit: Audit::default(),
        }
    }
}

// ==========================================
// Location - 安装位置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub audit: Audit,
}

impl Location {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description,
            audit: Audit::default(),
        }
    }
}

// ==========================================
// 字典表 (无审计列)
// ==========================================

/// 工具包阶段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageName {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// 变更请求状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequestStatus {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

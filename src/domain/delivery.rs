// ==========================================
// 工具包发布跟踪系统 - 交付物
// ==========================================
// 对齐: deliverable / deliverable_update / component_update
// ==========================================

use crate::domain::audit::Audit;
use serde::{Deserialize, Serialize};

// ==========================================
// Deliverable - 交付物（某平台上的组件工具包构建产物）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverable {
    pub id: i64,
    pub name: String,
    pub component_tk_version_id: i64,
    pub platform_id: Option<i64>,
    pub audit: Audit,
}

impl Deliverable {
    pub fn new(name: impl Into<String>, component_tk_version_id: i64, platform_id: Option<i64>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            component_tk_version_id,
            platform_id,
            audit: Audit::default(),
        }
    }
}

// ==========================================
// DeliverableUpdate - 交付物更新
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverableUpdate {
    pub id: i64,
    pub deliverable_id: i64,
    pub description: Option<String>,
    pub audit: Audit,
}

impl DeliverableUpdate {
    pub fn new(deliverable_id: i64, description: Option<String>) -> Self {
        Self {
            id: 0,
            deliverable_id,
            description,
            audit: Audit::default(),
        }
    }
}

// ==========================================
// ComponentUpdate - 组件更新（推送到安装位置的单位）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentUpdate {
    pub id: i64,
    pub component_tk_version_id: i64,
    pub description: Option<String>,
    pub audit: Audit,
}

impl ComponentUpdate {
    pub fn new(component_tk_version_id: i64, description: Option<String>) -> Self {
        Self {
            id: 0,
            component_tk_version_id,
            description,
            audit: Audit::default(),
        }
    }
}

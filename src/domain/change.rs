// ==========================================
// 工具包发布跟踪系统 - 变更请求与代码更新
// ==========================================
// 对齐: change_request / code_update / file_version
// ==========================================

use crate::domain::audit::Audit;
use serde::{Deserialize, Serialize};

// ==========================================
// ChangeRequest - 变更请求 (CQ)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: i64,
    pub name: String, // CQ 编号，如 "MDCMS00123456"
    pub description: Option<String>,
    pub status_id: i64,
    pub severity: Option<i64>, // 1 最高
    pub audit: Audit,
}

impl ChangeRequest {
    pub fn new(name: impl Into<String>, description: Option<String>, status_id: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description,
            status_id,
            severity: None,
            audit: Audit::default(),
        }
    }
}

// ==========================================
// CodeUpdate - 代码更新（一次提交）
// ==========================================
// 唯一: (component_version_id, revision)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeUpdate {
    pub id: i64,
    pub component_version_id: i64,
    pub revision: String,
    pub description: Option<String>,
    pub audit: Audit,
}

impl CodeUpdate {
    pub fn new(component_version_id: i64, revision: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: 0,
            component_version_id,
            revision: revision.into(),
            description,
            audit: Audit::default(),
        }
    }
}

// ==========================================
// FileVersion - 文件修订
// ==========================================
// 唯一: (file_name, revision)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileVersion {
    pub id: i64,
    pub code_update_id: i64,
    pub file_name: String,
    pub revision: String,
    pub audit: Audit,
}

impl FileVersion {
    pub fn new(code_update_id: i64, file_name: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            id: 0,
            code_update_id,
            file_name: file_name.into(),
            revision: revision.into(),
            audit: Audit::default(),
        }
    }
}

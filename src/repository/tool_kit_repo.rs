// ==========================================
// 工具包发布跟踪系统 - 工具包仓储
// ==========================================
// 职责: tool_kit 表（发布 + 阶段）
// ==========================================

use crate::domain::tool_kit::ToolKit;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::table_repo::TableRepository;
use crate::repository::tables::TOOL_KIT;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub struct ToolKitRepository {
    table: TableRepository<ToolKit>,
}

impl ToolKitRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            table: TableRepository::new(conn),
        }
    }

    pub fn table(&self) -> &TableRepository<ToolKit> {
        &self.table
    }

    pub fn list_for_release(&self, release_id: i64) -> RepositoryResult<Vec<ToolKit>> {
        self.table
            .find_where("list_for_release", &["release_id"], &[Value::Integer(release_id)], true)
    }

    pub fn list_for_stage(&self, stage_name_id: i64) -> RepositoryResult<Vec<ToolKit>> {
        self.table.find_where(
            "list_for_stage",
            &["stage_name_id"],
            &[Value::Integer(stage_name_id)],
            true,
        )
    }

    /// 发布下最新的有效工具包（主键最大者）
    ///
    /// # 返回
    /// - Err(NotFound): 该发布下没有有效工具包
    pub fn lookup_latest_for_release(&self, release_id: i64) -> RepositoryResult<ToolKit> {
        self.list_for_release(release_id)?
            .into_iter()
            .max_by_key(|tk| tk.id)
            .ok_or_else(|| {
                RepositoryError::not_found(
                    TOOL_KIT.entity,
                    "lookup_latest_for_release",
                    format!("release={}", release_id),
                )
            })
    }
}

// ==========================================
// 工具包发布跟踪系统 - 文件版本仓储
// ==========================================

use crate::domain::change::FileVersion;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::table_repo::TableRepository;
use crate::repository::tables::FILE_VERSION;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub struct FileVersionRepository {
    table: TableRepository<FileVersion>,
}

impl FileVersionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            table: TableRepository::new(conn),
        }
    }

    pub fn table(&self) -> &TableRepository<FileVersion> {
        &self.table
    }

    pub fn list_for_code_update(&self, code_update_id: i64) -> RepositoryResult<Vec<FileVersion>> {
        self.table.find_where(
            "list_for_code_update",
            &["code_update_id"],
            &[Value::Integer(code_update_id)],
            true,
        )
    }

    /// 同一文件的全部修订
    pub fn list_for_file(&self, file_name: &str) -> RepositoryResult<Vec<FileVersion>> {
        self.table.find_where(
            "list_for_file",
            &["file_name"],
            &[Value::Text(file_name.to_string())],
            true,
        )
    }

    /// 按 (文件名, 修订号) 查询，必须存在
    pub fn lookup_by_file_revision(
        &self,
        file_name: &str,
        revision: &str,
    ) -> RepositoryResult<FileVersion> {
        self.table
            .find_one_where(
                "lookup_by_file_revision",
                &["file_name", "revision"],
                &[
                    Value::Text(file_name.to_string()),
                    Value::Text(revision.to_string()),
                ],
            )?
            .ok_or_else(|| {
                RepositoryError::not_found(
                    FILE_VERSION.entity,
                    "lookup_by_file_revision",
                    format!("{}@{}", file_name, revision),
                )
            })
    }
}

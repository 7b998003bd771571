// ==========================================
// 工具包发布跟踪系统 - 数据库 Schema
// ==========================================
// 职责: 建表（幂等）+ 写入 schema_version + 预置状态/阶段字典
// 约束: 外键、唯一性全部由 schema 保证，代码层不重复校验
// 约束: 软删除表的唯一性只针对有效记录（部分唯一索引）
// ==========================================

use crate::db::CURRENT_SCHEMA_VERSION;
use rusqlite::{params, Connection};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

-- ===== 基础查找表 =====

CREATE TABLE IF NOT EXISTS component_type (
    component_type_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    updated_by TEXT,
    updated_on TEXT,
    deleted_by TEXT,
    deleted_on TEXT
);

CREATE TABLE IF NOT EXISTS component (
    component_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    updated_by TEXT,
    updated_on TEXT,
    deleted_by TEXT,
    deleted_on TEXT
);

CREATE TABLE IF NOT EXISTS tk_release (
    release_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    updated_by TEXT,
    updated_on TEXT,
    deleted_by TEXT,
    deleted_on TEXT
);

CREATE TABLE IF NOT EXISTS platform (
    platform_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    short_name TEXT,
    description TEXT,
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS location (
    location_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    updated_by TEXT,
    updated_on TEXT,
    deleted_by TEXT,
    deleted_on TEXT
);

CREATE TABLE IF NOT EXISTS stage_name (
    stage_name_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT
);

CREATE TABLE IF NOT EXISTS change_request_status (
    change_request_status_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT
);

CREATE TABLE IF NOT EXISTS code_update_status_name (
    status_name_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT
);

CREATE TABLE IF NOT EXISTS deliverable_update_status_name (
    status_name_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT
);

-- ===== 工具包与组件版本 =====

CREATE TABLE IF NOT EXISTS tool_kit (
    tool_kit_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    release_id INTEGER NOT NULL REFERENCES tk_release(release_id),
    stage_name_id INTEGER NOT NULL REFERENCES stage_name(stage_name_id),
    description TEXT,
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    updated_by TEXT,
    updated_on TEXT,
    deleted_by TEXT,
    deleted_on TEXT
);
CREATE INDEX IF NOT EXISTS idx_tool_kit_release ON tool_kit(release_id);

CREATE TABLE IF NOT EXISTS component_version (
    component_version_id INTEGER PRIMARY KEY,
    component_id INTEGER NOT NULL REFERENCES component(component_id),
    release_id INTEGER NOT NULL REFERENCES tk_release(release_id),
    component_type_id INTEGER REFERENCES component_type(component_type_id),
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    updated_by TEXT,
    updated_on TEXT,
    deleted_by TEXT,
    deleted_on TEXT
);
CREATE INDEX IF NOT EXISTS idx_component_version_release ON component_version(release_id);

CREATE TABLE IF NOT EXISTS component_tk_version (
    component_tk_version_id INTEGER PRIMARY KEY,
    component_version_id INTEGER NOT NULL REFERENCES component_version(component_version_id),
    tool_kit_id INTEGER NOT NULL REFERENCES tool_kit(tool_kit_id),
    ready_for_release INTEGER NOT NULL DEFAULT 0,
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    updated_by TEXT,
    updated_on TEXT,
    deleted_by TEXT,
    deleted_on TEXT
);
CREATE INDEX IF NOT EXISTS idx_component_tk_version_tool_kit ON component_tk_version(tool_kit_id);

CREATE TABLE IF NOT EXISTS component_package (
    component_package_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT,
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL
);

-- ===== 变更请求与代码更新 =====

CREATE TABLE IF NOT EXISTS change_request (
    change_request_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    status_id INTEGER NOT NULL REFERENCES change_request_status(change_request_status_id),
    severity INTEGER,
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    updated_by TEXT,
    updated_on TEXT,
    deleted_by TEXT,
    deleted_on TEXT
);
CREATE INDEX IF NOT EXISTS idx_change_request_status ON change_request(status_id);

CREATE TABLE IF NOT EXISTS code_update (
    code_update_id INTEGER PRIMARY KEY,
    component_version_id INTEGER NOT NULL REFERENCES component_version(component_version_id),
    revision TEXT NOT NULL,
    description TEXT,
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    UNIQUE(component_version_id, revision)
);

CREATE TABLE IF NOT EXISTS file_version (
    file_version_id INTEGER PRIMARY KEY,
    code_update_id INTEGER NOT NULL REFERENCES code_update(code_update_id),
    file_name TEXT NOT NULL,
    revision TEXT NOT NULL,
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    UNIQUE(file_name, revision)
);
CREATE INDEX IF NOT EXISTS idx_file_version_code_update ON file_version(code_update_id);

-- ===== 交付物 =====

CREATE TABLE IF NOT EXISTS deliverable (
    deliverable_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    component_tk_version_id INTEGER NOT NULL REFERENCES component_tk_version(component_tk_version_id),
    platform_id INTEGER REFERENCES platform(platform_id),
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    updated_by TEXT,
    updated_on TEXT,
    deleted_by TEXT,
    deleted_on TEXT
);
CREATE INDEX IF NOT EXISTS idx_deliverable_tk_version ON deliverable(component_tk_version_id);

CREATE TABLE IF NOT EXISTS deliverable_update (
    deliverable_update_id INTEGER PRIMARY KEY,
    deliverable_id INTEGER NOT NULL REFERENCES deliverable(deliverable_id),
    description TEXT,
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS component_update (
    component_update_id INTEGER PRIMARY KEY,
    component_tk_version_id INTEGER NOT NULL REFERENCES component_tk_version(component_tk_version_id),
    description TEXT,
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL
);

-- ===== 关联表 =====

CREATE TABLE IF NOT EXISTS comp_version_change_request (
    component_version_id INTEGER NOT NULL REFERENCES component_version(component_version_id),
    change_request_id INTEGER NOT NULL REFERENCES change_request(change_request_id),
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    PRIMARY KEY (component_version_id, change_request_id)
);

CREATE TABLE IF NOT EXISTS change_request_code_update (
    change_request_id INTEGER NOT NULL REFERENCES change_request(change_request_id),
    code_update_id INTEGER NOT NULL REFERENCES code_update(code_update_id),
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    PRIMARY KEY (change_request_id, code_update_id)
);

CREATE TABLE IF NOT EXISTS component_package_tk_version (
    component_package_id INTEGER NOT NULL REFERENCES component_package(component_package_id),
    component_tk_version_id INTEGER NOT NULL REFERENCES component_tk_version(component_tk_version_id),
    PRIMARY KEY (component_package_id, component_tk_version_id)
);

CREATE TABLE IF NOT EXISTS deliverable_update_code_update (
    link_id INTEGER PRIMARY KEY,
    deliverable_update_id INTEGER NOT NULL REFERENCES deliverable_update(deliverable_update_id),
    code_update_id INTEGER NOT NULL REFERENCES code_update(code_update_id),
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    UNIQUE(deliverable_update_id, code_update_id)
);

CREATE TABLE IF NOT EXISTS location_component_update (
    location_id INTEGER NOT NULL REFERENCES location(location_id),
    component_update_id INTEGER NOT NULL REFERENCES component_update(component_update_id),
    created_by TEXT NOT NULL,
    created_on TEXT NOT NULL,
    updated_by TEXT,
    updated_on TEXT,
    deleted_by TEXT,
    deleted_on TEXT,
    PRIMARY KEY (location_id, component_update_id)
);

-- ===== 状态历史表 =====

CREATE TABLE IF NOT EXISTS code_update_status (
    code_update_status_id INTEGER PRIMARY KEY,
    code_update_id INTEGER NOT NULL REFERENCES code_update(code_update_id),
    status_name_id INTEGER NOT NULL REFERENCES code_update_status_name(status_name_id),
    user_id TEXT NOT NULL,
    recorded_on TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_code_update_status_parent ON code_update_status(code_update_id);

CREATE TABLE IF NOT EXISTS deliverable_update_status (
    deliverable_update_status_id INTEGER PRIMARY KEY,
    deliverable_update_id INTEGER NOT NULL REFERENCES deliverable_update(deliverable_update_id),
    status_name_id INTEGER NOT NULL REFERENCES deliverable_update_status_name(status_name_id),
    user_id TEXT NOT NULL,
    recorded_on TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_deliverable_update_status_parent ON deliverable_update_status(deliverable_update_id);
-- ===== 软删除表的唯一性（仅约束有效记录） =====

CREATE UNIQUE INDEX IF NOT EXISTS ux_component_type_name ON component_type(name) WHERE deleted_on IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS ux_component_name ON component(name) WHERE deleted_on IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS ux_tk_release_name ON tk_release(name) WHERE deleted_on IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS ux_location_name ON location(name) WHERE deleted_on IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS ux_tool_kit_name ON tool_kit(name) WHERE deleted_on IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS ux_change_request_name ON change_request(name) WHERE deleted_on IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS ux_component_version_pair
    ON component_version(component_id, release_id) WHERE deleted_on IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS ux_component_tk_version_pair
    ON component_tk_version(component_version_id, tool_kit_id) WHERE deleted_on IS NULL;
"#;

/// 预置字典: (表名, 主键列, [(id, name, description)])
const SEED_ROWS: &[(&str, &str, &[(i64, &str, &str)])] = &[
    (
        "stage_name",
        "stage_name_id",
        &[
            (1, "DEVELOPMENT", "开发阶段"),
            (2, "PREVIEW", "预览阶段"),
            (3, "PRODUCTION", "正式发布"),
        ],
    ),
    (
        "change_request_status",
        "change_request_status_id",
        &[
            (1, "DRAFT", "草稿"),
            (2, "SUBMITTED", "已提交"),
            (3, "APPROVED", "已批准"),
            (4, "COMPLETE", "已完成"),
            (5, "CANCELLED", "已取消"),
        ],
    ),
    (
        "code_update_status_name",
        "status_name_id",
        &[
            (1, "COMMITTED", "代码已提交"),
            (2, "BUILT", "构建完成"),
            (3, "ADVANCED_TO_DEV", "已推进到开发工具包"),
            (4, "ADVANCED_TO_PROD", "已推进到正式工具包"),
        ],
    ),
    (
        "deliverable_update_status_name",
        "status_name_id",
        &[
            (1, "CREATED", "已创建"),
            (2, "SHIPPED", "已发送"),
            (3, "INSTALLED", "已安装"),
        ],
    ),
];

/// 初始化数据库 schema（幂等）
///
/// # 说明
/// - 所有 CREATE 均为 IF NOT EXISTS，可对已有库重复执行
/// - 字典数据使用 INSERT OR IGNORE，不覆盖人工维护的描述
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    for (table, id_column, rows) in SEED_ROWS {
        let sql = format!(
            "INSERT OR IGNORE INTO {} ({}, name, description) VALUES (?1, ?2, ?3)",
            table, id_column
        );
        let mut stmt = conn.prepare(&sql)?;
        for (id, name, description) in rows.iter() {
            stmt.execute(params![id, name, description])?;
        }
    }

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        params![CURRENT_SCHEMA_VERSION],
    )?;

    tracing::debug!(version = CURRENT_SCHEMA_VERSION, "schema 初始化完成");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::read_schema_version;
    use crate::repository::tables::{all_table_names, ENTITY_TABLES, HISTORY_TABLES, JOIN_TABLES};
    use crate::repository::table_def::{STATUS_NAME_ID, STATUS_RECORDED_ON, STATUS_USER_ID};
    use std::collections::HashSet;

    fn table_columns(conn: &Connection, table: &str) -> HashSet<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({})", table))
            .unwrap();
        stmt.query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .collect::<rusqlite::Result<HashSet<_>>>()
            .unwrap()
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));

        let stages: i64 = conn
            .query_row("SELECT COUNT(*) FROM stage_name", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stages, 3);
    }

    #[test]
    fn test_every_catalog_table_exists() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in all_table_names() {
            assert!(!table_columns(&conn, table).is_empty(), "缺少表: {}", table);
        }
    }

    #[test]
    fn test_metadata_columns_match_ddl() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for def in ENTITY_TABLES {
            let cols = table_columns(&conn, def.table);
            for c in def.select_columns() {
                assert!(cols.contains(c), "{}.{} 不存在", def.table, c);
            }
        }

        for def in JOIN_TABLES {
            let cols = table_columns(&conn, def.table);
            for c in def.select_columns() {
                assert!(cols.contains(c), "{}.{} 不存在", def.table, c);
            }
        }

        for def in HISTORY_TABLES {
            let cols = table_columns(&conn, def.table);
            for c in [def.id_column, def.parent_column, STATUS_NAME_ID, STATUS_USER_ID, STATUS_RECORDED_ON] {
                assert!(cols.contains(c), "{}.{} 不存在", def.table, c);
            }
        }
    }
}

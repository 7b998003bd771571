// ==========================================
// 工具包发布跟踪系统 - SQL 构建工具
// ==========================================
// 职责: 根据表结构元数据生成 SELECT/INSERT/UPDATE/DELETE 语句
// 约束: 值一律使用 ?N 占位符绑定，表名/列名只来自静态元数据
// ==========================================

use crate::repository::table_def::{
    JoinDef, TableDef, CREATED_BY, CREATED_ON, DELETED_BY, DELETED_ON, UPDATED_BY, UPDATED_ON,
};

/// 生成 ?start, ?start+1, ... 共 n 个占位符
pub fn placeholders(start: usize, n: usize) -> String {
    (start..start + n)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 生成 "a = ?1 AND b = ?2" 形式的条件
pub fn where_equals(columns: &[&str], start: usize) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", c, start + i))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// 带别名的列清单: "t.a AS a, t.b AS b"
pub fn qualified_select_list(columns: &[&str], alias: &str) -> String {
    columns
        .iter()
        .map(|c| format!("{alias}.{c} AS {c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ==========================================
// 实体表
// ==========================================

pub fn select_all(def: &TableDef, active_only: bool) -> String {
    let mut sql = format!("SELECT {} FROM {}", def.select_columns().join(", "), def.table);
    if active_only {
        if let Some(filter) = def.active_filter() {
            sql.push_str(" WHERE ");
            sql.push_str(filter);
        }
    }
    sql.push_str(&format!(" ORDER BY {}", def.id_column));
    sql
}

/// 按列等值查询
///
/// # 示例
/// ```
/// use tk_release_db::repository::sql::select_by;
/// use tk_release_db::repository::tables::COMPONENT;
///
/// let sql = select_by(&COMPONENT, &["name"], true);
/// assert!(sql.ends_with("WHERE name = ?1 AND deleted_on IS NULL ORDER BY component_id"));
/// ```
pub fn select_by(def: &TableDef, key_columns: &[&str], active_only: bool) -> String {
    let mut sql = format!(
        "SELECT {} FROM {} WHERE {}",
        def.select_columns().join(", "),
        def.table,
        where_equals(key_columns, 1)
    );
    if active_only {
        if let Some(filter) = def.active_filter() {
            sql.push_str(" AND ");
            sql.push_str(filter);
        }
    }
    sql.push_str(&format!(" ORDER BY {}", def.id_column));
    sql
}

pub fn select_by_id(def: &TableDef) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = ?1",
        def.select_columns().join(", "),
        def.table,
        def.id_column
    )
}

pub fn count(def: &TableDef, active_only: bool) -> String {
    match (active_only, def.active_filter()) {
        (true, Some(filter)) => format!("SELECT COUNT(*) FROM {} WHERE {}", def.table, filter),
        _ => format!("SELECT COUNT(*) FROM {}", def.table),
    }
}

/// 下一个序列号: MAX(id) + 1（空表从 1 开始）
pub fn next_id(table: &str, id_column: &str) -> String {
    format!("SELECT COALESCE(MAX({id_column}), 0) + 1 FROM {table}")
}

/// INSERT: 主键 + 数据列 + created 审计列
pub fn insert(def: &TableDef) -> String {
    let mut cols = vec![def.id_column];
    cols.extend_from_slice(def.columns);
    if def.audit.has_created() {
        cols.push(CREATED_BY);
        cols.push(CREATED_ON);
    }
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        def.table,
        cols.join(", "),
        placeholders(1, cols.len())
    )
}

/// UPDATE: 数据列 (+ updated 审计列)，最后一个参数为主键
pub fn update(def: &TableDef) -> String {
    update_columns(def, def.columns)
}

/// UPDATE 指定数据列 (+ updated 审计列)，最后一个参数为主键
///
/// 只改写给定列，其余列保持库中现值
pub fn update_columns(def: &TableDef, columns: &[&str]) -> String {
    let mut sets: Vec<&str> = columns.to_vec();
    if def.audit.soft_delete() {
        sets.push(UPDATED_BY);
        sets.push(UPDATED_ON);
    }
    let assignments = sets
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", c, i + 1))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!(
        "UPDATE {} SET {} WHERE {} = ?{}",
        def.table,
        assignments,
        def.id_column,
        sets.len() + 1
    );
    if let Some(filter) = def.active_filter() {
        sql.push_str(" AND ");
        sql.push_str(filter);
    }
    sql
}

/// 软删除: 写入 deleted_by / deleted_on
pub fn soft_delete(def: &TableDef) -> String {
    format!(
        "UPDATE {} SET {DELETED_BY} = ?1, {DELETED_ON} = ?2 WHERE {} = ?3 AND {DELETED_ON} IS NULL",
        def.table, def.id_column
    )
}

/// 撤销软删除
pub fn restore(def: &TableDef) -> String {
    format!(
        "UPDATE {} SET {DELETED_BY} = NULL, {DELETED_ON} = NULL, {UPDATED_BY} = ?1, {UPDATED_ON} = ?2 \
         WHERE {} = ?3 AND {DELETED_ON} IS NOT NULL",
        def.table, def.id_column
    )
}

pub fn hard_delete(def: &TableDef) -> String {
    format!("DELETE FROM {} WHERE {} = ?1", def.table, def.id_column)
}

// ==========================================
// 关联表
// ==========================================

pub fn join_insert(def: &JoinDef) -> String {
    let mut cols = Vec::new();
    if let Some(id) = def.id_column {
        cols.push(id);
    }
    cols.push(def.left_column);
    cols.push(def.right_column);
    if def.audit.has_created() {
        cols.push(CREATED_BY);
        cols.push(CREATED_ON);
    }
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        def.table,
        cols.join(", "),
        placeholders(1, cols.len())
    )
}

/// 按单侧键查询关联行
pub fn join_select_by(def: &JoinDef, key_column: &str, active_only: bool) -> String {
    let mut sql = format!(
        "SELECT {} FROM {} WHERE {} = ?1",
        def.select_columns().join(", "),
        def.table,
        key_column
    );
    if active_only {
        if let Some(filter) = def.active_filter() {
            sql.push_str(" AND ");
            sql.push_str(filter);
        }
    }
    sql.push_str(&format!(" ORDER BY {}, {}", def.left_column, def.right_column));
    sql
}

pub fn join_select_pair(def: &JoinDef) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = ?1 AND {} = ?2",
        def.select_columns().join(", "),
        def.table,
        def.left_column,
        def.right_column
    )
}

/// 单侧去重 id 列表
pub fn join_distinct_ids(def: &JoinDef, wanted_column: &str, key_column: &str) -> String {
    let mut sql = format!(
        "SELECT DISTINCT {wanted_column} FROM {} WHERE {key_column} = ?1",
        def.table
    );
    if let Some(filter) = def.active_filter() {
        sql.push_str(" AND ");
        sql.push_str(filter);
    }
    sql.push_str(&format!(" ORDER BY {wanted_column}"));
    sql
}

pub fn join_soft_delete(def: &JoinDef) -> String {
    format!(
        "UPDATE {} SET {DELETED_BY} = ?1, {DELETED_ON} = ?2 WHERE {} = ?3 AND {} = ?4 AND {DELETED_ON} IS NULL",
        def.table, def.left_column, def.right_column
    )
}

pub fn join_revive(def: &JoinDef) -> String {
    format!(
        "UPDATE {} SET {DELETED_BY} = NULL, {DELETED_ON} = NULL, {UPDATED_BY} = ?1, {UPDATED_ON} = ?2 \
         WHERE {} = ?3 AND {} = ?4 AND {DELETED_ON} IS NOT NULL",
        def.table, def.left_column, def.right_column
    )
}

pub fn join_delete(def: &JoinDef) -> String {
    format!(
        "DELETE FROM {} WHERE {} = ?1 AND {} = ?2",
        def.table, def.left_column, def.right_column
    )
}

/// 经关联表取对端实体
///
/// `key_column` 为关联表中作为查询条件的一侧，`target_column` 为指向 target 主键的一侧。
/// 实体与关联行均只取有效记录。
pub fn select_related(
    target: &TableDef,
    join: &JoinDef,
    target_column: &str,
    key_column: &str,
) -> String {
    let mut sql = format!(
        "SELECT {} FROM {} t JOIN {} j ON j.{} = t.{} WHERE j.{} = ?1",
        qualified_select_list(&target.select_columns(), "t"),
        target.table,
        join.table,
        target_column,
        target.id_column,
        key_column
    );
    if let Some(filter) = target.active_filter() {
        sql.push_str(&format!(" AND t.{filter}"));
    }
    if let Some(filter) = join.active_filter() {
        sql.push_str(&format!(" AND j.{filter}"));
    }
    sql.push_str(&format!(" ORDER BY t.{}", target.id_column));
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tables::{
        COMPONENT, COMP_VERSION_CHANGE_REQUEST, CHANGE_REQUEST, LOCATION_COMPONENT_UPDATE,
        PLATFORM, STAGE_NAME,
    };

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1, 3), "?1, ?2, ?3");
        assert_eq!(placeholders(4, 1), "?4");
        assert_eq!(placeholders(1, 0), "");
    }

    #[test]
    fn test_insert_includes_created_audit() {
        let sql = insert(&PLATFORM);
        assert_eq!(
            sql,
            "INSERT INTO platform (platform_id, name, short_name, description, created_by, created_on) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        );
    }

    #[test]
    fn test_insert_without_audit() {
        let sql = insert(&STAGE_NAME);
        assert_eq!(
            sql,
            "INSERT INTO stage_name (stage_name_id, name, description) VALUES (?1, ?2, ?3)"
        );
    }

    #[test]
    fn test_update_soft_delete_table() {
        let sql = update(&COMPONENT);
        assert_eq!(
            sql,
            "UPDATE component SET name = ?1, description = ?2, updated_by = ?3, updated_on = ?4 \
             WHERE component_id = ?5 AND deleted_on IS NULL"
        );
    }

    #[test]
    fn test_update_selected_columns() {
        assert_eq!(
            update_columns(&COMPONENT, &["description"]),
            "UPDATE component SET description = ?1, updated_by = ?2, updated_on = ?3 \
             WHERE component_id = ?4 AND deleted_on IS NULL"
        );
        assert_eq!(
            update_columns(&STAGE_NAME, &["description"]),
            "UPDATE stage_name SET description = ?1 WHERE stage_name_id = ?2"
        );
    }

    #[test]
    fn test_select_all_active_filter() {
        assert!(select_all(&COMPONENT, true).contains("WHERE deleted_on IS NULL"));
        assert!(!select_all(&COMPONENT, false).contains("WHERE"));
        assert!(!select_all(&STAGE_NAME, true).contains("WHERE"));
    }

    #[test]
    fn test_next_id() {
        assert_eq!(
            next_id("component", "component_id"),
            "SELECT COALESCE(MAX(component_id), 0) + 1 FROM component"
        );
    }

    #[test]
    fn test_join_distinct_ids_filters_soft_deleted() {
        let sql = join_distinct_ids(&LOCATION_COMPONENT_UPDATE, "component_update_id", "location_id");
        assert!(sql.starts_with("SELECT DISTINCT component_update_id"));
        assert!(sql.contains("deleted_on IS NULL"));
    }

    #[test]
    fn test_select_related() {
        let sql = select_related(
            &CHANGE_REQUEST,
            &COMP_VERSION_CHANGE_REQUEST,
            "change_request_id",
            "component_version_id",
        );
        assert!(sql.contains("t.name AS name"));
        assert!(sql.contains("JOIN comp_version_change_request j ON j.change_request_id = t.change_request_id"));
        assert!(sql.contains("WHERE j.component_version_id = ?1"));
        assert!(sql.contains("AND t.deleted_on IS NULL"));
    }
}

// ==========================================
// 工具包发布跟踪系统 - 按表名的通用行访问
// ==========================================
// 职责: 命令行按表名浏览/导出任意实体表（JSON / CSV）
// 约束: 表名只接受 tables.rs 目录中的名称
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::exec::query_mapped;
use crate::repository::sql;
use crate::repository::table_def::TableDef;
use crate::repository::tables::find_entity_table;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use serde_json::{Map, Value as JsonValue};
use std::io::Write;

/// 按表名解析表元数据
///
/// # 返回
/// - Err(ValidationError): 表名不在目录中
pub fn resolve_table(name: &str) -> RepositoryResult<&'static TableDef> {
    find_entity_table(name)
        .ok_or_else(|| RepositoryError::ValidationError(format!("未知表: {}", name)))
}

fn read_values(row: &Row<'_>, width: usize) -> rusqlite::Result<Vec<Value>> {
    (0..width).map(|i| row.get::<_, Value>(i)).collect()
}

/// 读取整表（列名 + 原始值）
pub fn fetch_rows(
    conn: &Connection,
    def: &TableDef,
    active_only: bool,
) -> RepositoryResult<(Vec<&'static str>, Vec<Vec<Value>>)> {
    let columns = def.select_columns();
    let width = columns.len();
    let query = sql::select_all(def, active_only);
    let rows = query_mapped(conn, def.entity, "fetch_rows", &query, &[], |row| {
        read_values(row, width)
    })?;
    Ok((columns, rows))
}

/// 按主键读取一行（含已软删除）
pub fn fetch_row(
    conn: &Connection,
    def: &TableDef,
    id: i64,
) -> RepositoryResult<Option<Map<String, JsonValue>>> {
    let columns = def.select_columns();
    let width = columns.len();
    let query = sql::select_by_id(def);
    let row = query_mapped(conn, def.entity, "fetch_row", &query, &[Value::Integer(id)], |row| {
        read_values(row, width)
    })?
    .into_iter()
    .next();
    Ok(row.map(|values| to_json_object(&columns, &values)))
}

/// 单个 SQLite 值 → JSON
pub fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Integer(i) => JsonValue::from(*i),
        Value::Real(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Blob(b) => JsonValue::String(format!("<{} bytes>", b.len())),
    }
}

pub fn to_json_object(columns: &[&str], values: &[Value]) -> Map<String, JsonValue> {
    columns
        .iter()
        .zip(values)
        .map(|(c, v)| (c.to_string(), to_json(v)))
        .collect()
}

fn to_csv_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// 导出整表为 CSV（首行为列名）
///
/// # 返回
/// - Ok(usize): 写出的数据行数
pub fn export_csv<W: Write>(
    conn: &Connection,
    def: &TableDef,
    active_only: bool,
    writer: W,
) -> RepositoryResult<usize> {
    let (columns, rows) = fetch_rows(conn, def, active_only)?;

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&columns)
        .map_err(|e| RepositoryError::Other(e.into()))?;
    for row in &rows {
        wtr.write_record(row.iter().map(to_csv_field))
            .map_err(|e| RepositoryError::Other(e.into()))?;
    }
    wtr.flush()
        .map_err(|e| RepositoryError::Other(e.into()))?;

    tracing::info!(table = def.table, rows = rows.len(), "导出 CSV");
    Ok(rows.len())
}

// ==========================================
// 工具包发布跟踪系统 - 语句执行辅助
// ==========================================
// 职责: 准备(缓存) → 绑定 → 执行 → 映射，失败统一包装为 SEVERE 错误
// 说明: 函数直接作用于 &Connection，便于在同一把锁/事务内组合
// 说明: 每条语句执行完毕后上报 perf（计数 + 慢 SQL）
// ==========================================

use crate::perf::record_sql;
use crate::repository::entity::Entity;
use crate::repository::error::{RepositoryResult, SqlResultExt};
use crate::repository::sql;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::time::Instant;

/// 执行查询并映射为实体列表
pub fn query_entities<E: Entity>(
    conn: &Connection,
    method: &'static str,
    query: &str,
    values: &[Value],
) -> RepositoryResult<Vec<E>> {
    query_mapped(conn, E::TABLE.entity, method, query, values, |row| E::from_row(row))
}

/// 执行查询，期望至多一行
pub fn query_entity<E: Entity>(
    conn: &Connection,
    method: &'static str,
    query: &str,
    values: &[Value],
) -> RepositoryResult<Option<E>> {
    let entity = E::TABLE.entity;
    tracing::debug!(entity, method, sql = %query, "query");

    let started = Instant::now();
    let mut stmt = conn.prepare_cached(query).with_sql(entity, method, query)?;
    let found = stmt
        .query_row(params_from_iter(values.iter()), |row| E::from_row(row))
        .optional()
        .with_sql(entity, method, query);
    record_sql(query, started.elapsed());
    found
}

/// 执行查询并用自定义闭包映射
pub fn query_mapped<T, F>(
    conn: &Connection,
    entity: &'static str,
    method: &'static str,
    query: &str,
    values: &[Value],
    map: F,
) -> RepositoryResult<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    tracing::debug!(entity, method, sql = %query, "query");

    let started = Instant::now();
    let mut stmt = conn.prepare_cached(query).with_sql(entity, method, query)?;
    let list = stmt
        .query_map(params_from_iter(values.iter()), map)
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<T>>>())
        .with_sql(entity, method, query);
    record_sql(query, started.elapsed());
    list
}

/// 执行写语句（INSERT / UPDATE / DELETE），返回影响行数
pub fn exec_mutation(
    conn: &Connection,
    entity: &'static str,
    method: &'static str,
    query: &str,
    values: &[Value],
) -> RepositoryResult<usize> {
    tracing::debug!(entity, method, sql = %query, "execute");

    let started = Instant::now();
    let mut stmt = conn.prepare_cached(query).with_sql(entity, method, query)?;
    let affected = stmt
        .execute(params_from_iter(values.iter()))
        .with_sql(entity, method, query);
    record_sql(query, started.elapsed());
    affected
}

/// 单值标量查询（COUNT / MAX 等）
pub fn query_scalar(
    conn: &Connection,
    entity: &'static str,
    method: &'static str,
    query: &str,
    values: &[Value],
) -> RepositoryResult<i64> {
    tracing::debug!(entity, method, sql = %query, "scalar");

    let started = Instant::now();
    let mut stmt = conn.prepare_cached(query).with_sql(entity, method, query)?;
    let v = stmt
        .query_row(params_from_iter(values.iter()), |row| row.get::<_, i64>(0))
        .with_sql(entity, method, query);
    record_sql(query, started.elapsed());
    v
}

/// 下一个序列号（MAX(id)+1）
///
/// 调用方需在同一事务内完成插入，避免共享连接上的交错写入取到相同 id
pub fn next_id(
    conn: &Connection,
    entity: &'static str,
    table: &str,
    id_column: &str,
) -> RepositoryResult<i64> {
    let query = sql::next_id(table, id_column);
    query_scalar(conn, entity, "next_id", &query, &[])
}

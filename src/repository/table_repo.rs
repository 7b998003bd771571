// ==========================================
// 工具包发布跟踪系统 - 通用实体表仓储
// ==========================================
// 职责: 任意实体表的 CRUD（按 id / 名称查询、新增、更新、删除、集合查询）
// 红线: Repository 不含业务逻辑，只负责数据访问
// 约束: 所有查询使用参数化，表名/列名只来自静态元数据
// ==========================================

use crate::domain::audit::{format_ts, now_ts};
use crate::perf::PerfGuard;
use crate::repository::entity::Entity;
use crate::repository::error::{RepositoryError, RepositoryResult, SqlResultExt};
use crate::repository::exec::{exec_mutation, next_id, query_entities, query_entity, query_scalar};
use crate::repository::sql;
use crate::repository::table_def::TableDef;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// TableRepository - 通用实体表仓储
// ==========================================
pub struct TableRepository<E: Entity> {
    conn: Arc<Mutex<Connection>>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for TableRepository<E> {
    fn clone(&self) -> Self {
        Self::new(self.conn.clone())
    }
}

impl<E: Entity> TableRepository<E> {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            _marker: PhantomData,
        }
    }

    /// 获取数据库连接
    pub(crate) fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn def() -> &'static TableDef {
        E::TABLE
    }

    fn name_column(method: &'static str) -> RepositoryResult<&'static str> {
        Self::def().name_column.ok_or_else(|| {
            RepositoryError::ValidationError(format!(
                "{}::{} 表 {} 没有名称列",
                Self::def().entity,
                method,
                Self::def().table
            ))
        })
    }

    // ==========================================
    // 单行查询
    // ==========================================

    /// 按主键查询（包含已软删除记录）
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<E>> {
        let conn = self.get_conn()?;
        find_by_id_on::<E>(&conn, "find_by_id", id)
    }

    /// 按主键查询，必须恰好命中一行
    ///
    /// # 返回
    /// - Ok(E): 找到记录
    /// - Err(NotFound): 未找到（SEVERE）
    pub fn lookup_by_id(&self, id: i64) -> RepositoryResult<E> {
        self.find_by_id(id)?
            .ok_or_else(|| RepositoryError::not_found(Self::def().entity, "lookup_by_id", id.to_string()))
    }

    /// 按名称查询（仅有效记录）
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<E>> {
        let column = Self::name_column("find_by_name")?;
        let query = sql::select_by(Self::def(), &[column], true);
        let conn = self.get_conn()?;
        query_entity(&conn, "find_by_name", &query, &[Value::Text(name.to_string())])
    }

    /// 按名称查询，必须恰好命中一行
    pub fn lookup_by_name(&self, name: &str) -> RepositoryResult<E> {
        self.find_by_name(name)?
            .ok_or_else(|| RepositoryError::not_found(Self::def().entity, "lookup_by_name", name))
    }

    // ==========================================
    // 集合查询
    // ==========================================

    /// 全部记录（含已软删除）
    pub fn list_all(&self) -> RepositoryResult<Vec<E>> {
        let _perf = PerfGuard::new("TableRepository::list_all");
        let query = sql::select_all(Self::def(), false);
        let conn = self.get_conn()?;
        query_entities(&conn, "list_all", &query, &[])
    }

    /// 有效记录（软删除表过滤 deleted_on IS NULL）
    pub fn list_active(&self) -> RepositoryResult<Vec<E>> {
        let _perf = PerfGuard::new("TableRepository::list_active");
        let query = sql::select_all(Self::def(), true);
        let conn = self.get_conn()?;
        query_entities(&conn, "list_active", &query, &[])
    }

    /// 有效记录，按 id_key 建索引
    pub fn keyed_active(&self) -> RepositoryResult<HashMap<String, E>> {
        Ok(self
            .list_active()?
            .into_iter()
            .map(|e| (e.id_key(), e))
            .collect())
    }

    pub fn count_active(&self) -> RepositoryResult<i64> {
        let query = sql::count(Self::def(), true);
        let conn = self.get_conn()?;
        query_scalar(&conn, Self::def().entity, "count_active", &query, &[])
    }

    /// 按任意数据列等值查询（供各表专用仓储组合外键查询）
    pub(crate) fn find_where(
        &self,
        method: &'static str,
        key_columns: &[&str],
        values: &[Value],
        active_only: bool,
    ) -> RepositoryResult<Vec<E>> {
        let query = sql::select_by(Self::def(), key_columns, active_only);
        let conn = self.get_conn()?;
        query_entities(&conn, method, &query, values)
    }

    pub(crate) fn find_one_where(
        &self,
        method: &'static str,
        key_columns: &[&str],
        values: &[Value],
    ) -> RepositoryResult<Option<E>> {
        let query = sql::select_by(Self::def(), key_columns, true);
        let conn = self.get_conn()?;
        query_entity(&conn, method, &query, values)
    }

    /// 执行自定义 SELECT（列清单须覆盖 `E::TABLE.select_columns()`）
    pub(crate) fn query_custom(
        &self,
        method: &'static str,
        query: &str,
        values: &[Value],
    ) -> RepositoryResult<Vec<E>> {
        let conn = self.get_conn()?;
        query_entities(&conn, method, query, values)
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 下一个可用主键
    pub fn next_id(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        next_id(&conn, Self::def().entity, Self::def().table, Self::def().id_column)
    }

    /// 新增记录
    ///
    /// # 说明
    /// - 主键由 MAX(id)+1 生成，忽略 `entity.id()`
    /// - 写入 created_by / created_on（有审计列时）
    /// - 取号、插入、回读在同一事务内完成
    ///
    /// # 返回
    /// - Ok(E): 回读的完整记录
    pub fn add_row(&self, entity: &E, actor: &str) -> RepositoryResult<E> {
        let def = Self::def();
        let values = entity.column_values();
        check_width(def, "add_row", &values)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction().with_sql(def.entity, "add_row", "BEGIN")?;

        let id = next_id(&tx, def.entity, def.table, def.id_column)?;

        let mut bound = Vec::with_capacity(values.len() + 3);
        bound.push(Value::Integer(id));
        bound.extend(values);
        if def.audit.has_created() {
            bound.push(Value::Text(actor.to_string()));
            bound.push(Value::Text(format_ts(&now_ts())));
        }

        let query = sql::insert(def);
        exec_mutation(&tx, def.entity, "add_row", &query, &bound)?;

        let stored = find_by_id_on::<E>(&tx, "add_row", id)?
            .ok_or_else(|| RepositoryError::not_found(def.entity, "add_row", id.to_string()))?;

        tx.commit().with_sql(def.entity, "add_row", "COMMIT")?;

        tracing::info!(entity = def.entity, id, actor, "新增记录");
        Ok(stored)
    }

    /// 更新记录的数据列
    ///
    /// # 说明
    /// - 软删除表同时写入 updated_by / updated_on，且已删除记录不可更新
    /// - 未命中任何行返回 NotFound
    pub fn update_row(&self, entity: &E, actor: &str) -> RepositoryResult<E> {
        let def = Self::def();
        let values = entity.column_values();
        check_width(def, "update_row", &values)?;

        let mut bound = values;
        if def.audit.soft_delete() {
            bound.push(Value::Text(actor.to_string()));
            bound.push(Value::Text(format_ts(&now_ts())));
        }
        bound.push(Value::Integer(entity.id()));

        let conn = self.get_conn()?;
        let query = sql::update(def);
        let affected = exec_mutation(&conn, def.entity, "update_row", &query, &bound)?;
        if affected == 0 {
            return Err(RepositoryError::not_found(
                def.entity,
                "update_row",
                entity.id().to_string(),
            ));
        }

        tracing::info!(entity = def.entity, id = entity.id(), actor, "更新记录");
        find_by_id_on::<E>(&conn, "update_row", entity.id())?.ok_or_else(|| {
            RepositoryError::not_found(def.entity, "update_row", entity.id().to_string())
        })
    }

    /// 只更新指定数据列（单条 UPDATE，其余列保持库中现值）
    ///
    /// # 参数
    /// - id: 主键
    /// - changes: (列名, 新值)，列名必须属于该表的数据列
    /// - actor: 操作人（软删除表写入 updated_by）
    ///
    /// # 返回
    /// - Ok(E): 更新后的记录
    /// - Err(NotFound): 记录不存在或已软删除
    /// - Err(ValidationError): 列名为空或不属于该表
    pub fn update_columns(
        &self,
        id: i64,
        changes: &[(&str, Value)],
        actor: &str,
    ) -> RepositoryResult<E> {
        let def = Self::def();
        if changes.is_empty() {
            return Err(RepositoryError::ValidationError(format!(
                "{}::update_columns 未指定要更新的列",
                def.entity
            )));
        }
        if let Some((col, _)) = changes.iter().find(|(c, _)| !def.columns.contains(c)) {
            return Err(RepositoryError::ValidationError(format!(
                "{}::update_columns 表 {} 没有数据列 {}",
                def.entity, def.table, col
            )));
        }

        let columns: Vec<&str> = changes.iter().map(|(c, _)| *c).collect();
        let mut bound: Vec<Value> = changes.iter().map(|(_, v)| v.clone()).collect();
        if def.audit.soft_delete() {
            bound.push(Value::Text(actor.to_string()));
            bound.push(Value::Text(format_ts(&now_ts())));
        }
        bound.push(Value::Integer(id));

        let conn = self.get_conn()?;
        let query = sql::update_columns(def, &columns);
        let affected = exec_mutation(&conn, def.entity, "update_columns", &query, &bound)?;
        if affected == 0 {
            return Err(RepositoryError::not_found(def.entity, "update_columns", id.to_string()));
        }

        tracing::info!(entity = def.entity, id, columns = ?columns, actor, "更新记录字段");
        find_by_id_on::<E>(&conn, "update_columns", id)?
            .ok_or_else(|| RepositoryError::not_found(def.entity, "update_columns", id.to_string()))
    }

    /// 删除记录
    ///
    /// # 说明
    /// - 全审计表: 软删除（写入 deleted_by / deleted_on），已删除视为未找到
    /// - 其他表: 物理删除
    pub fn delete_row(&self, id: i64, actor: &str) -> RepositoryResult<()> {
        let def = Self::def();
        let conn = self.get_conn()?;

        let affected = if def.audit.soft_delete() {
            let query = sql::soft_delete(def);
            exec_mutation(
                &conn,
                def.entity,
                "delete_row",
                &query,
                &[
                    Value::Text(actor.to_string()),
                    Value::Text(format_ts(&now_ts())),
                    Value::Integer(id),
                ],
            )?
        } else {
            let query = sql::hard_delete(def);
            exec_mutation(&conn, def.entity, "delete_row", &query, &[Value::Integer(id)])?
        };

        if affected == 0 {
            return Err(RepositoryError::not_found(def.entity, "delete_row", id.to_string()));
        }

        tracing::info!(entity = def.entity, id, actor, soft = def.audit.soft_delete(), "删除记录");
        Ok(())
    }

    /// 撤销软删除
    pub fn restore_row(&self, id: i64, actor: &str) -> RepositoryResult<E> {
        let def = Self::def();
        if !def.audit.soft_delete() {
            return Err(RepositoryError::ValidationError(format!(
                "{} 不支持软删除，无法恢复",
                def.table
            )));
        }

        let conn = self.get_conn()?;
        let query = sql::restore(def);
        let affected = exec_mutation(
            &conn,
            def.entity,
            "restore_row",
            &query,
            &[
                Value::Text(actor.to_string()),
                Value::Text(format_ts(&now_ts())),
                Value::Integer(id),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found(def.entity, "restore_row", id.to_string()));
        }

        tracing::info!(entity = def.entity, id, actor, "恢复记录");
        find_by_id_on::<E>(&conn, "restore_row", id)?
            .ok_or_else(|| RepositoryError::not_found(def.entity, "restore_row", id.to_string()))
    }
}

/// 在给定连接（或事务）上按主键查询
pub(crate) fn find_by_id_on<E: Entity>(
    conn: &Connection,
    method: &'static str,
    id: i64,
) -> RepositoryResult<Option<E>> {
    let query = sql::select_by_id(E::TABLE);
    query_entity(conn, method, &query, &[Value::Integer(id)])
}

fn check_width(def: &TableDef, method: &'static str, values: &[Value]) -> RepositoryResult<()> {
    if values.len() != def.columns.len() {
        return Err(RepositoryError::InternalError(format!(
            "{}::{} 绑定列数 {} 与元数据列数 {} 不一致",
            def.entity,
            method,
            values.len(),
            def.columns.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests;

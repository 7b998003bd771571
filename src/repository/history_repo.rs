// ==========================================
// 工具包发布跟踪系统 - 状态历史仓储
// ==========================================
// 职责: 以追加行的方式记录状态变化（父记录 + 状态名 + 用户 + 时间）
// 红线: 不做状态迁移校验，状态名合法性由字典表保证
// ==========================================

use crate::domain::audit::{format_ts, now_ts};
use crate::domain::link::{StatusEvent, StatusName};
use crate::repository::error::{RepositoryError, RepositoryResult, SqlResultExt};
use crate::repository::exec::{exec_mutation, next_id, query_mapped};
use crate::repository::table_def::{HistoryDef, STATUS_NAME_ID, STATUS_RECORDED_ON, STATUS_USER_ID};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// StatusHistoryRepository - 状态历史仓储
// ==========================================
#[derive(Clone)]
pub struct StatusHistoryRepository {
    def: &'static HistoryDef,
    conn: Arc<Mutex<Connection>>,
}

impl StatusHistoryRepository {
    pub fn new(def: &'static HistoryDef, conn: Arc<Mutex<Connection>>) -> Self {
        Self { def, conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 历史行 + 状态名 的 SELECT 前缀
    fn select_events(&self) -> String {
        let d = self.def;
        format!(
            "SELECT h.{id} AS event_id, h.{parent} AS parent_id, h.{STATUS_NAME_ID} AS status_name_id, \
             s.name AS status_name, h.{STATUS_USER_ID} AS user_id, h.{STATUS_RECORDED_ON} AS recorded_on \
             FROM {table} h JOIN {status} s ON s.{STATUS_NAME_ID} = h.{STATUS_NAME_ID}",
            id = d.id_column,
            parent = d.parent_column,
            table = d.table,
            status = d.status_table,
        )
    }

    /// 状态名 → id
    fn status_id_on(&self, conn: &Connection, method: &'static str, status_name: &str) -> RepositoryResult<i64> {
        let d = self.def;
        let query = format!(
            "SELECT {STATUS_NAME_ID} FROM {} WHERE name = ?1",
            d.status_table
        );
        let ids = query_mapped(
            conn,
            d.entity,
            method,
            &query,
            &[Value::Text(status_name.to_string())],
            |row| row.get::<_, i64>(0),
        )?;
        ids.into_iter().next().ok_or_else(|| RepositoryError::not_found(d.entity, method, format!("status={}", status_name)))
    }

    /// 记录一次状态变化
    ///
    /// # 返回
    /// - Ok(StatusEvent): 新增的历史行
    /// - Err(NotFound): 状态名不在字典表中
    pub fn record(&self, parent_id: i64, status_name: &str, actor: &str) -> RepositoryResult<StatusEvent> {
        let d = self.def;
        let mut conn = self.get_conn()?;
        let tx = conn.transaction().with_sql(d.entity, "record", "BEGIN")?;

        let status_id = self.status_id_on(&tx, "record", status_name)?;
        let id = next_id(&tx, d.entity, d.table, d.id_column)?;

        let query = format!(
            "INSERT INTO {} ({}, {}, {STATUS_NAME_ID}, {STATUS_USER_ID}, {STATUS_RECORDED_ON}) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            d.table, d.id_column, d.parent_column
        );
        exec_mutation(
            &tx,
            d.entity,
            "record",
            &query,
            &[
                Value::Integer(id),
                Value::Integer(parent_id),
                Value::Integer(status_id),
                Value::Text(actor.to_string()),
                Value::Text(format_ts(&now_ts())),
            ],
        )?;

        let query = format!("{} WHERE h.{} = ?1", self.select_events(), d.id_column);
        let event = query_mapped(&tx, d.entity, "record", &query, &[Value::Integer(id)], map_event)?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::not_found(d.entity, "record", id.to_string()))?;

        tx.commit().with_sql(d.entity, "record", "COMMIT")?;

        tracing::info!(entity = d.entity, parent_id, status = status_name, actor, "记录状态变化");
        Ok(event)
    }

    /// 父记录的全部状态变化（按记录顺序）
    ///
    /// 顺序以历史行 id 为准，recorded_on 为本地时间，跨时区/回拨时不可靠
    pub fn history(&self, parent_id: i64) -> RepositoryResult<Vec<StatusEvent>> {
        let d = self.def;
        let query = format!(
            "{} WHERE h.{} = ?1 ORDER BY h.{}",
            self.select_events(),
            d.parent_column,
            d.id_column
        );
        let conn = self.get_conn()?;
        query_mapped(&conn, d.entity, "history", &query, &[Value::Integer(parent_id)], map_event)
    }

    /// 父记录的当前状态（最后追加的一行）
    pub fn latest(&self, parent_id: i64) -> RepositoryResult<Option<StatusEvent>> {
        let d = self.def;
        let query = format!(
            "{} WHERE h.{} = ?1 ORDER BY h.{} DESC LIMIT 1",
            self.select_events(),
            d.parent_column,
            d.id_column
        );
        let conn = self.get_conn()?;
        Ok(
            query_mapped(&conn, d.entity, "latest", &query, &[Value::Integer(parent_id)], map_event)?
                .into_iter()
                .next(),
        )
    }

    /// 状态名字典
    pub fn status_names(&self) -> RepositoryResult<Vec<StatusName>> {
        let d = self.def;
        let query = format!(
            "SELECT {STATUS_NAME_ID}, name, description FROM {} ORDER BY {STATUS_NAME_ID}",
            d.status_table
        );
        let conn = self.get_conn()?;
        query_mapped(&conn, d.entity, "status_names", &query, &[], |row| {
            Ok(StatusName {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
            })
        })
    }
}

fn map_event(row: &Row<'_>) -> rusqlite::Result<StatusEvent> {
    Ok(StatusEvent {
        id: row.get("event_id")?,
        parent_id: row.get("parent_id")?,
        status_name_id: row.get("status_name_id")?,
        status_name: row.get("status_name")?,
        user_id: row.get("user_id")?,
        recorded_on: row.get("recorded_on")?,
    })
}

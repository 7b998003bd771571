// ==========================================
// 工具包发布跟踪系统 - 通用关联表仓储
// ==========================================
// 职责: 多对多关联行的新增 / 移除 / 存在性 / 单侧 id 列表 / 对端实体
// 说明: 全审计关联表移除时软删除，再次关联时复用原行
// ==========================================

use crate::domain::audit::{format_ts, now_ts};
use crate::domain::link::Link;
use crate::perf::PerfGuard;
use crate::repository::entity::{read_audit, Entity};
use crate::repository::error::{RepositoryError, RepositoryResult, SqlResultExt};
use crate::repository::exec::{exec_mutation, next_id, query_entities, query_mapped};
use crate::repository::sql;
use crate::repository::table_def::JoinDef;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// JoinRepository - 关联表仓储
// ==========================================
#[derive(Clone)]
pub struct JoinRepository {
    def: &'static JoinDef,
    conn: Arc<Mutex<Connection>>,
}

impl JoinRepository {
    pub fn new(def: &'static JoinDef, conn: Arc<Mutex<Connection>>) -> Self {
        Self { def, conn }
    }

    pub fn def(&self) -> &'static JoinDef {
        self.def
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn pair_key(left_id: i64, right_id: i64) -> String {
        format!("{}_{}", left_id, right_id)
    }

    /// 查询关联行（含已软删除）
    fn find_any_on(
        &self,
        conn: &Connection,
        method: &'static str,
        left_id: i64,
        right_id: i64,
    ) -> RepositoryResult<Option<Link>> {
        let def = self.def;
        let query = sql::join_select_pair(def);
        let found = query_mapped(
            conn,
            def.entity,
            method,
            &query,
            &[Value::Integer(left_id), Value::Integer(right_id)],
            |row| map_link(def, row),
        )?;
        Ok(found.into_iter().next())
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 新增关联
    ///
    /// # 说明
    /// - 关联已存在（有效）时由唯一约束拒绝
    /// - 全审计关联表中已软删除的行会被恢复，而不是重复插入
    pub fn add_link(&self, left_id: i64, right_id: i64, actor: &str) -> RepositoryResult<Link> {
        let def = self.def;
        let ts = format_ts(&now_ts());

        let mut conn = self.get_conn()?;
        let tx = conn.transaction().with_sql(def.entity, "add_link", "BEGIN")?;

        let revived = if def.audit.soft_delete() {
            let query = sql::join_revive(def);
            exec_mutation(
                &tx,
                def.entity,
                "add_link",
                &query,
                &[
                    Value::Text(actor.to_string()),
                    Value::Text(ts.clone()),
                    Value::Integer(left_id),
                    Value::Integer(right_id),
                ],
            )? > 0
        } else {
            false
        };

        if !revived {
            let mut bound = Vec::with_capacity(5);
            if let Some(id_column) = def.id_column {
                bound.push(Value::Integer(next_id(&tx, def.entity, def.table, id_column)?));
            }
            bound.push(Value::Integer(left_id));
            bound.push(Value::Integer(right_id));
            if def.audit.has_created() {
                bound.push(Value::Text(actor.to_string()));
                bound.push(Value::Text(ts));
            }
            let query = sql::join_insert(def);
            exec_mutation(&tx, def.entity, "add_link", &query, &bound)?;
        }

        let link = self
            .find_any_on(&tx, "add_link", left_id, right_id)?
            .ok_or_else(|| {
                RepositoryError::not_found(def.entity, "add_link", Self::pair_key(left_id, right_id))
            })?;
        tx.commit().with_sql(def.entity, "add_link", "COMMIT")?;

        tracing::info!(
            entity = def.entity,
            left_id,
            right_id,
            actor,
            revived,
            "新增关联"
        );
        Ok(link)
    }

    /// 移除关联（全审计表软删除，其余物理删除）
    pub fn remove_link(&self, left_id: i64, right_id: i64, actor: &str) -> RepositoryResult<()> {
        let def = self.def;
        let conn = self.get_conn()?;

        let affected = if def.audit.soft_delete() {
            let query = sql::join_soft_delete(def);
            exec_mutation(
                &conn,
                def.entity,
                "remove_link",
                &query,
                &[
                    Value::Text(actor.to_string()),
                    Value::Text(format_ts(&now_ts())),
                    Value::Integer(left_id),
                    Value::Integer(right_id),
                ],
            )?
        } else {
            let query = sql::join_delete(def);
            exec_mutation(
                &conn,
                def.entity,
                "remove_link",
                &query,
                &[Value::Integer(left_id), Value::Integer(right_id)],
            )?
        };

        if affected == 0 {
            return Err(RepositoryError::not_found(
                def.entity,
                "remove_link",
                Self::pair_key(left_id, right_id),
            ));
        }

        tracing::info!(entity = def.entity, left_id, right_id, actor, "移除关联");
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询有效关联行
    pub fn find_link(&self, left_id: i64, right_id: i64) -> RepositoryResult<Option<Link>> {
        let conn = self.get_conn()?;
        Ok(self
            .find_any_on(&conn, "find_link", left_id, right_id)?
            .filter(|l| !l.audit.is_deleted()))
    }

    /// 查询有效关联行，必须存在
    pub fn lookup_link(&self, left_id: i64, right_id: i64) -> RepositoryResult<Link> {
        self.find_link(left_id, right_id)?.ok_or_else(|| {
            RepositoryError::not_found(self.def.entity, "lookup_link", Self::pair_key(left_id, right_id))
        })
    }

    pub fn exists(&self, left_id: i64, right_id: i64) -> RepositoryResult<bool> {
        Ok(self.find_link(left_id, right_id)?.is_some())
    }

    /// 左侧键关联的右侧 id（去重、升序、仅有效）
    pub fn right_ids_for(&self, left_id: i64) -> RepositoryResult<Vec<i64>> {
        let def = self.def;
        let query = sql::join_distinct_ids(def, def.right_column, def.left_column);
        let conn = self.get_conn()?;
        query_mapped(&conn, def.entity, "right_ids_for", &query, &[Value::Integer(left_id)], |row| {
            row.get(0)
        })
    }

    /// 右侧键关联的左侧 id（去重、升序、仅有效）
    pub fn left_ids_for(&self, right_id: i64) -> RepositoryResult<Vec<i64>> {
        let def = self.def;
        let query = sql::join_distinct_ids(def, def.left_column, def.right_column);
        let conn = self.get_conn()?;
        query_mapped(&conn, def.entity, "left_ids_for", &query, &[Value::Integer(right_id)], |row| {
            row.get(0)
        })
    }

    pub fn links_for_left(&self, left_id: i64) -> RepositoryResult<Vec<Link>> {
        self.links_by("links_for_left", self.def.left_column, left_id)
    }

    pub fn links_for_right(&self, right_id: i64) -> RepositoryResult<Vec<Link>> {
        self.links_by("links_for_right", self.def.right_column, right_id)
    }

    /// 以 id_key 建索引的有效关联行
    pub fn keyed_links_for_left(&self, left_id: i64) -> RepositoryResult<HashMap<String, Link>> {
        Ok(self
            .links_for_left(left_id)?
            .into_iter()
            .map(|l| (l.id_key(), l))
            .collect())
    }

    fn links_by(&self, method: &'static str, key_column: &str, key: i64) -> RepositoryResult<Vec<Link>> {
        let def = self.def;
        let query = sql::join_select_by(def, key_column, true);
        let conn = self.get_conn()?;
        query_mapped(&conn, def.entity, method, &query, &[Value::Integer(key)], |row| {
            map_link(def, row)
        })
    }

    /// 左侧键关联的右侧实体（单条 JOIN 查询）
    pub fn related_right<E: Entity>(&self, left_id: i64) -> RepositoryResult<Vec<E>> {
        let _perf = PerfGuard::new("JoinRepository::related_right");
        let def = self.def;
        let query = sql::select_related(E::TABLE, def, def.right_column, def.left_column);
        let conn = self.get_conn()?;
        query_entities(&conn, "related_right", &query, &[Value::Integer(left_id)])
    }

    /// 右侧键关联的左侧实体（单条 JOIN 查询）
    pub fn related_left<E: Entity>(&self, right_id: i64) -> RepositoryResult<Vec<E>> {
        let _perf = PerfGuard::new("JoinRepository::related_left");
        let def = self.def;
        let query = sql::select_related(E::TABLE, def, def.left_column, def.right_column);
        let conn = self.get_conn()?;
        query_entities(&conn, "related_left", &query, &[Value::Integer(right_id)])
    }
}

fn map_link(def: &JoinDef, row: &Row<'_>) -> rusqlite::Result<Link> {
    let id = match def.id_column {
        Some(col) => Some(row.get(col)?),
        None => None,
    };
    Ok(Link {
        id,
        left_id: row.get(def.left_column)?,
        right_id: row.get(def.right_column)?,
        audit: read_audit(row, def.audit)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Location, Release};
    use crate::domain::delivery::ComponentUpdate;
    use crate::domain::change::CodeUpdate;
    use crate::domain::catalog::Component;
    use crate::domain::tool_kit::{ComponentTkVersion, ComponentVersion, ToolKit};
    use crate::repository::error::DbErrorKind;
    use crate::repository::table_repo::TableRepository;
    use crate::repository::tables::{LOCATION_COMPONENT_UPDATE, DELIVERABLE_UPDATE_CODE_UPDATE};
    use crate::schema::initialize_schema;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = crate::db::open_in_memory_connection().unwrap();
        initialize_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    /// 组件 → 组件版本 → 工具包实例，返回 component_tk_version_id
    fn seed_tk_version(conn: &Arc<Mutex<Connection>>) -> i64 {
        let release = TableRepository::<Release>::new(conn.clone())
            .add_row(&Release::new("14.1", None), "alice")
            .unwrap();
        let component = TableRepository::<Component>::new(conn.clone())
            .add_row(&Component::new("ess", None), "alice")
            .unwrap();
        let cv = TableRepository::<ComponentVersion>::new(conn.clone())
            .add_row(&ComponentVersion::new(component.id, release.id, None), "alice")
            .unwrap();
        let tk = TableRepository::<ToolKit>::new(conn.clone())
            .add_row(&ToolKit::new("14.1.0", release.id, 1), "alice")
            .unwrap();
        TableRepository::<ComponentTkVersion>::new(conn.clone())
            .add_row(&ComponentTkVersion::new(cv.id, tk.id), "alice")
            .unwrap()
            .id
    }

    #[test]
    fn test_soft_join_remove_and_revive() {
        let conn = setup_test_db();
        let tkv = seed_tk_version(&conn);

        let locations = TableRepository::<Location>::new(conn.clone());
        let updates = TableRepository::<ComponentUpdate>::new(conn.clone());
        let loc = locations.add_row(&Location::new("/afs/eda/tk", None), "alice").unwrap();
        let u1 = updates.add_row(&ComponentUpdate::new(tkv, None), "alice").unwrap();
        let u2 = updates.add_row(&ComponentUpdate::new(tkv, None), "alice").unwrap();

        let repo = JoinRepository::new(&LOCATION_COMPONENT_UPDATE, conn.clone());
        repo.add_link(loc.id, u1.id, "alice").unwrap();
        repo.add_link(loc.id, u2.id, "alice").unwrap();
        assert_eq!(repo.right_ids_for(loc.id).unwrap(), vec![u1.id, u2.id]);

        repo.remove_link(loc.id, u1.id, "bob").unwrap();
        assert_eq!(repo.right_ids_for(loc.id).unwrap(), vec![u2.id]);
        assert!(!repo.exists(loc.id, u1.id).unwrap());
        assert!(repo.lookup_link(loc.id, u1.id).unwrap_err().is_not_found());

        // 再次关联恢复原行，不产生重复
        let revived = repo.add_link(loc.id, u1.id, "carol").unwrap();
        assert!(!revived.audit.is_deleted());
        assert_eq!(revived.audit.updated_by.as_deref(), Some("carol"));
        assert_eq!(repo.right_ids_for(loc.id).unwrap(), vec![u1.id, u2.id]);
        assert_eq!(repo.links_for_left(loc.id).unwrap().len(), 2);

        let related: Vec<ComponentUpdate> = repo.related_right(loc.id).unwrap();
        assert_eq!(related.len(), 2);
        let back: Vec<Location> = repo.related_left(u2.id).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].id, loc.id);
    }

    #[test]
    fn test_duplicate_active_link_rejected() {
        let conn = setup_test_db();
        let tkv = seed_tk_version(&conn);

        let loc = TableRepository::<Location>::new(conn.clone())
            .add_row(&Location::new("site", None), "alice")
            .unwrap();
        let u = TableRepository::<ComponentUpdate>::new(conn.clone())
            .add_row(&ComponentUpdate::new(tkv, None), "alice")
            .unwrap();

        let repo = JoinRepository::new(&LOCATION_COMPONENT_UPDATE, conn);
        repo.add_link(loc.id, u.id, "alice").unwrap();
        let err = repo.add_link(loc.id, u.id, "alice").unwrap_err();
        assert_eq!(err.db_kind(), Some(DbErrorKind::UniqueConstraint));
        assert_eq!(repo.right_ids_for(loc.id).unwrap(), vec![u.id]);
    }

    #[test]
    fn test_surrogate_id_join() {
        use crate::domain::delivery::{Deliverable, DeliverableUpdate};

        let conn = setup_test_db();
        let tkv = seed_tk_version(&conn);

        let cv_id = TableRepository::<ComponentTkVersion>::new(conn.clone())
            .lookup_by_id(tkv)
            .unwrap()
            .component_version_id;
        let deliverable = TableRepository::<Deliverable>::new(conn.clone())
            .add_row(&Deliverable::new("ess.tar", tkv, None), "alice")
            .unwrap();
        let du = TableRepository::<DeliverableUpdate>::new(conn.clone())
            .add_row(&DeliverableUpdate::new(deliverable.id, None), "alice")
            .unwrap();
        let codes = TableRepository::<CodeUpdate>::new(conn.clone());
        let c1 = codes.add_row(&CodeUpdate::new(cv_id, "r100", None), "alice").unwrap();
        let c2 = codes.add_row(&CodeUpdate::new(cv_id, "r101", None), "alice").unwrap();

        let repo = JoinRepository::new(&DELIVERABLE_UPDATE_CODE_UPDATE, conn);
        let l1 = repo.add_link(du.id, c1.id, "alice").unwrap();
        let l2 = repo.add_link(du.id, c2.id, "alice").unwrap();
        assert_eq!(l1.id, Some(1));
        assert_eq!(l2.id, Some(2));
        assert_eq!(l2.id_key(), "2");

        let keyed = repo.keyed_links_for_left(du.id).unwrap();
        assert_eq!(keyed.len(), 2);
        assert!(keyed.contains_key("1"));

        repo.remove_link(du.id, c1.id, "alice").unwrap();
        assert_eq!(repo.left_ids_for(c2.id).unwrap(), vec![du.id]);
        assert!(repo.left_ids_for(c1.id).unwrap().is_empty());
        assert!(repo.remove_link(du.id, c1.id, "alice").unwrap_err().is_not_found());
    }
}

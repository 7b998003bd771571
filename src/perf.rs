// ==========================================
// 工具包发布跟踪系统 - SQL 性能统计
// ==========================================
// 职责: 语句计数 + 慢 SQL 日志 + PerfGuard 汇总
// 说明: 由 repository::exec 的执行辅助函数在每条语句结束后上报
// ==========================================

use crate::config::DbConfig;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

static PERF_SQL_ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static PERF_DEPTH: Cell<u32> = Cell::new(0);
    static SQL_COUNT: Cell<u64> = Cell::new(0);
    static SLOW_SQL_COUNT: Cell<u64> = Cell::new(0);
}

fn truncate_sql(sql: &str, max_len: usize) -> String {
    let s = sql.trim().replace('\n', " ");
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}

/// 按配置设置慢 SQL 日志开关与阈值
///
/// 开关（见 `DbConfig`）：
/// - `trace_sql` 未配置时 Debug 默认开启；Release 默认关闭
/// - `TKDB_PERF_SQL=1` 强制开启
/// - `TKDB_SLOW_SQL_MS=50` 配置慢 SQL 阈值（毫秒）
///
/// 语句计数不受开关影响，只要处于 PerfGuard 作用域内即计数
pub fn configure_sql_stats(config: &DbConfig) {
    let enabled = config.trace_sql_enabled();
    PERF_SQL_ENABLED.store(enabled, Ordering::Relaxed);
    let threshold = if enabled { config.slow_sql_threshold_ms() } else { 0 };
    SLOW_SQL_THRESHOLD_MS.store(threshold, Ordering::Relaxed);
}

/// 上报一条已执行的语句
///
/// # 参数
/// - `sql`: 语句文本（慢 SQL 日志中截断输出）
/// - `elapsed`: 准备 + 执行 + 映射的总耗时
pub(crate) fn record_sql(sql: &str, elapsed: Duration) {
    let active = PERF_DEPTH.with(|d| d.get() > 0);
    if active {
        SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
    }

    if !PERF_SQL_ENABLED.load(Ordering::Relaxed) {
        return;
    }

    let ms = elapsed.as_millis() as u64;
    let threshold = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    if threshold > 0 && ms >= threshold {
        let sql_short = truncate_sql(sql, 420);
        tracing::warn!(
            target: "slow_sql",
            duration_ms = ms,
            sql = %sql_short,
            "slow sql"
        );
        if active {
            SLOW_SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
        }
    }
}

/// 性能统计 Guard：记录 elapsed_ms + SQL 语句数 + 慢 SQL 数
///
/// 使用方式：
/// ```ignore
/// let _perf = tk_release_db::perf::PerfGuard::new("list_active_components");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    sql_start: u64,
    slow_sql_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        let sql_start = SQL_COUNT.with(|c| c.get());
        let slow_sql_start = SLOW_SQL_COUNT.with(|c| c.get());
        Self {
            op,
            start: Instant::now(),
            sql_start,
            slow_sql_start,
        }
    }

    /// 自创建以来本线程执行的语句数
    pub fn sql_count(&self) -> u64 {
        SQL_COUNT.with(|c| c.get()).saturating_sub(self.sql_start)
    }

    /// 自创建以来本线程记录的慢 SQL 数
    pub fn slow_sql_count(&self) -> u64 {
        SLOW_SQL_COUNT.with(|c| c.get()).saturating_sub(self.slow_sql_start)
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let sql_count = self.sql_count();
        let slow_sql_count = self.slow_sql_count();

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            sql_count,
            slow_sql_count,
            "done"
        );

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::exec::{exec_mutation, query_scalar};
    use rusqlite::Connection;

    #[test]
    fn test_truncate_sql_respects_char_boundary() {
        assert_eq!(truncate_sql("SELECT 1", 100), "SELECT 1");
        assert_eq!(truncate_sql("SELECT\n1", 100), "SELECT 1");

        let sql = "SELECT '发布'";
        let short = truncate_sql(sql, 9);
        assert!(short.ends_with('…'));
        assert!(short.starts_with("SELECT '"));
    }

    #[test]
    fn test_perf_guard_counts_executed_statements() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (x INTEGER);").unwrap();

        let perf = PerfGuard::new("test");
        exec_mutation(&conn, "T", "insert", "INSERT INTO t (x) VALUES (?1)", &[1i64.into()]).unwrap();
        exec_mutation(&conn, "T", "insert", "INSERT INTO t (x) VALUES (?1)", &[2i64.into()]).unwrap();
        let total = query_scalar(&conn, "T", "sum", "SELECT SUM(x) FROM t", &[]).unwrap();

        assert_eq!(total, 3);
        assert_eq!(perf.sql_count(), 3);
    }

    #[test]
    fn test_statements_outside_guard_are_not_counted() {
        let conn = Connection::open_in_memory().unwrap();
        let before = SQL_COUNT.with(|c| c.get());
        query_scalar(&conn, "T", "one", "SELECT 1", &[]).unwrap();
        assert_eq!(SQL_COUNT.with(|c| c.get()), before);

        {
            let outer = PerfGuard::new("outer");
            let inner = PerfGuard::new("inner");
            query_scalar(&conn, "T", "one", "SELECT 1", &[]).unwrap();
            assert_eq!(inner.sql_count(), 1);
            drop(inner);
            query_scalar(&conn, "T", "one", "SELECT 1", &[]).unwrap();
            assert_eq!(outer.sql_count(), 2);
        }
    }
}

// ==========================================
// 工具包发布跟踪系统 - 命令行入口 (tkdb)
// ==========================================
// 职责: 建库、按表名浏览/导出记录、查看下一个主键
// 说明: 结果输出到 stdout，日志输出到 stderr
// ==========================================

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tk_release_db::config::DbConfig;
use tk_release_db::repository::exec;
use tk_release_db::repository::raw;
use tk_release_db::repository::tables::{ENTITY_TABLES, HISTORY_TABLES, JOIN_TABLES};
use tk_release_db::{logging, DbSession};

#[derive(Parser, Debug)]
#[command(
    name = "tkdb",
    author,
    version,
    about = "Inspect and maintain the tool-kit release tracking database."
)]
struct Cli {
    /// Path to the SQLite database (overrides config and TKDB_DB_PATH).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Path to a JSON configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// User id written to audit columns.
    #[arg(long, global = true)]
    actor: Option<String>,

    /// Verbose logging (debug level).
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create tables and seed dictionaries (idempotent).
    Init,
    /// List the tables known to the mapper catalog.
    Tables,
    /// Print one row by primary key as JSON.
    Show { table: String, id: i64 },
    /// Print rows of a table as JSON lines.
    List {
        table: String,
        /// Include soft-deleted rows.
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,
    },
    /// Export a table as CSV.
    Export {
        table: String,
        /// Output file (stdout when omitted).
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Include soft-deleted rows.
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,
    },
    /// Show the next primary key MAX(id)+1 for a table.
    NextId { table: String },
}

fn load_config(cli: &Cli) -> Result<DbConfig> {
    let mut config = DbConfig::load(cli.config.as_deref()).context("加载配置失败")?;
    if let Some(db) = &cli.db {
        config.db_path = db.to_string_lossy().to_string();
    }
    if let Some(actor) = &cli.actor {
        config.default_actor = actor.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    // 目录信息不需要打开数据库
    if matches!(cli.command, Command::Tables) {
        return print_tables();
    }

    let config = load_config(&cli)?;
    let session = DbSession::open(&config)?;
    execute(&session, &config, cli.command)
}

fn execute(session: &DbSession, config: &DbConfig, command: Command) -> Result<()> {
    match command {
        Command::Init => {
            println!("{} v{}: {}", tk_release_db::APP_NAME, tk_release_db::VERSION, config.db_path);
        }
        Command::Tables => print_tables()?,
        Command::Show { table, id } => {
            let def = raw::resolve_table(&table)?;
            let row = session.with_connection(|conn| raw::fetch_row(conn, def, id))?;
            match row {
                Some(row) => println!("{}", serde_json::to_string_pretty(&row)?),
                None => bail!("{} 中不存在 id={}", def.table, id),
            }
        }
        Command::List { table, all } => {
            let def = raw::resolve_table(&table)?;
            let (columns, rows) =
                session.with_connection(|conn| raw::fetch_rows(conn, def, !all))?;
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            for values in &rows {
                let obj = raw::to_json_object(&columns, values);
                writeln!(out, "{}", serde_json::to_string(&obj)?)?;
            }
            out.flush()?;
        }
        Command::Export { table, output, all } => {
            let def = raw::resolve_table(&table)?;
            let count = match &output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("无法创建输出文件 {}", path.display()))?;
                    session.with_connection(|conn| raw::export_csv(conn, def, !all, file))?
                }
                None => session
                    .with_connection(|conn| raw::export_csv(conn, def, !all, io::stdout()))?,
            };
            tracing::info!(table = def.table, rows = count, "导出完成");
        }
        Command::NextId { table } => {
            let def = raw::resolve_table(&table)?;
            let id = session
                .with_connection(|conn| exec::next_id(conn, def.entity, def.table, def.id_column))?;
            println!("{}", id);
        }
    }

    Ok(())
}

fn print_tables() -> Result<()> {
    for def in ENTITY_TABLES {
        println!("entity   {:<32} {:?}", def.table, def.audit);
    }
    for def in JOIN_TABLES {
        println!("join     {:<32} {:?}", def.table, def.audit);
    }
    for def in HISTORY_TABLES {
        println!("history  {:<32} -> {}", def.table, def.status_table);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init_with_default(if cli.verbose { "debug" } else { "warn" });

    if let Err(err) = run(cli) {
        tracing::error!(error = %err, "命令执行失败");
        eprintln!("错误: {:#}", err);
        std::process::exit(1);
    }
}

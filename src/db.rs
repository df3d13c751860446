// ==========================================
// 信用评分模型治理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 统一建表语句,所有仓储共享同一份 schema
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema(幂等)
///
/// 说明:
/// - 所有表使用 TEXT 主键(UUID),日期统一 ISO-8601 文本
/// - gini_record 的"最新插入"语义依赖 rowid 递增,因此不使用 WITHOUT ROWID
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- 模型主数据
        CREATE TABLE IF NOT EXISTS model_inventory (
            model_id            TEXT PRIMARY KEY,
            model_name          TEXT NOT NULL,
            model_type          TEXT NOT NULL,
            segment             TEXT,
            status              TEXT NOT NULL DEFAULT 'ACTIVE',
            business_unit       TEXT NOT NULL,
            description         TEXT,
            guide_revision_seq  INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        -- 技术文档
        CREATE TABLE IF NOT EXISTS technical_guide (
            guide_id     TEXT PRIMARY KEY,
            model_id     TEXT NOT NULL REFERENCES model_inventory(model_id),
            title        TEXT NOT NULL,
            content_ref  TEXT,
            section_type TEXT,
            revision     INTEGER NOT NULL,
            created_at   TEXT NOT NULL,
            UNIQUE(model_id, revision)
        );

        -- 验证报告(只增不改)
        CREATE TABLE IF NOT EXISTS validation_report (
            report_id   TEXT PRIMARY KEY,
            model_id    TEXT NOT NULL REFERENCES model_inventory(model_id),
            report_date TEXT NOT NULL,
            outcome     TEXT NOT NULL,
            report_kind TEXT NOT NULL DEFAULT 'INCOMING',
            created_at  TEXT NOT NULL
        );

        -- Gini 系数记录
        CREATE TABLE IF NOT EXISTS gini_record (
            record_id   TEXT PRIMARY KEY,
            model_id    TEXT NOT NULL REFERENCES model_inventory(model_id),
            measured_on TEXT NOT NULL,
            coefficient REAL NOT NULL,
            sample_size INTEGER,
            created_at  TEXT NOT NULL
        );

        -- 任务责任人(先建,stage_task 有外键引用)
        CREATE TABLE IF NOT EXISTS task_owner (
            owner_id   TEXT PRIMARY KEY,
            owner_name TEXT NOT NULL,
            contact    TEXT,
            created_at TEXT NOT NULL
        );

        -- 开发项目
        CREATE TABLE IF NOT EXISTS development_project (
            project_id        TEXT PRIMARY KEY,
            project_name      TEXT NOT NULL,
            target_model_type TEXT NOT NULL,
            segment           TEXT,
            priority          TEXT NOT NULL DEFAULT 'MEDIUM',
            status            TEXT NOT NULL DEFAULT 'NOT_STARTED',
            description       TEXT,
            target_end_date   TEXT,
            created_at        TEXT NOT NULL,
            updated_at        TEXT NOT NULL
        );

        -- 开发阶段(position 在项目内连续 1..N)
        CREATE TABLE IF NOT EXISTS development_stage (
            stage_id   TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES development_project(project_id),
            stage_name TEXT NOT NULL,
            position   INTEGER NOT NULL,
            status     TEXT NOT NULL DEFAULT 'NOT_STARTED',
            deadline   TEXT,
            created_at TEXT NOT NULL
        );

        -- 阶段任务(owner_id 为非拥有引用,清空而非级联)
        CREATE TABLE IF NOT EXISTS stage_task (
            task_id      TEXT PRIMARY KEY,
            stage_id     TEXT NOT NULL REFERENCES development_stage(stage_id),
            description  TEXT NOT NULL,
            owner_id     TEXT REFERENCES task_owner(owner_id),
            is_completed INTEGER NOT NULL DEFAULT 0,
            due_date     TEXT,
            created_at   TEXT NOT NULL
        );

        -- 常用查询索引
        CREATE INDEX IF NOT EXISTS idx_technical_guide_model ON technical_guide(model_id);
        CREATE INDEX IF NOT EXISTS idx_validation_report_model ON validation_report(model_id);
        CREATE INDEX IF NOT EXISTS idx_gini_record_model ON gini_record(model_id, measured_on);
        CREATE INDEX IF NOT EXISTS idx_stage_project ON development_stage(project_id, position);
        CREATE INDEX IF NOT EXISTS idx_task_stage ON stage_task(stage_id);
        CREATE INDEX IF NOT EXISTS idx_task_owner ON stage_task(owner_id);
        "#,
    )?;
    Ok(())
}

/// 打开连接并初始化 schema（库级入口，测试与应用共用）
pub fn open_and_init(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

// ==========================================
// 信用评分模型治理系统 - 开发跟踪仓储
// ==========================================
// 红线: 阶段/任务的结构变更与派生状态重算必须在同一事务内完成
// 红线: position 在项目内始终连续(1..N),插入/删除/移动后由本层重排
// ==========================================

use crate::domain::development::{
    derive_project_status, derive_stage_status, DevelopmentProject, DevelopmentStage, StageTask,
    TaskOwner,
};
use crate::domain::types::{Priority, ProgressStatus};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// 行解析辅助
// ==========================================

// 损坏的存储值不做静默兜底,作为列转换错误上抛
fn parse_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_opt_date(idx: usize, value: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    value.map(|s| parse_date(idx, &s)).transpose()
}

fn parse_datetime(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<DevelopmentProject> {
    Ok(DevelopmentProject {
        project_id: row.get(0)?,
        project_name: row.get(1)?,
        target_model_type: row.get(2)?,
        segment: row.get(3)?,
        priority: Priority::from_db_str(&row.get::<_, String>(4)?),
        status: ProgressStatus::from_db_str(&row.get::<_, String>(5)?)
            .unwrap_or(ProgressStatus::NotStarted),
        description: row.get(6)?,
        target_end_date: parse_opt_date(7, row.get(7)?)?,
        created_at: parse_datetime(8, &row.get::<_, String>(8)?)?,
        updated_at: parse_datetime(9, &row.get::<_, String>(9)?)?,
    })
}

fn stage_from_row(row: &Row<'_>) -> rusqlite::Result<DevelopmentStage> {
    Ok(DevelopmentStage {
        stage_id: row.get(0)?,
        project_id: row.get(1)?,
        stage_name: row.get(2)?,
        position: row.get(3)?,
        status: ProgressStatus::from_db_str(&row.get::<_, String>(4)?)
            .unwrap_or(ProgressStatus::NotStarted),
        deadline: parse_opt_date(5, row.get(5)?)?,
        created_at: parse_datetime(6, &row.get::<_, String>(6)?)?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<StageTask> {
    Ok(StageTask {
        task_id: row.get(0)?,
        stage_id: row.get(1)?,
        description: row.get(2)?,
        owner_id: row.get(3)?,
        is_completed: row.get::<_, i64>(4)? != 0,
        due_date: parse_opt_date(5, row.get(5)?)?,
        created_at: parse_datetime(6, &row.get::<_, String>(6)?)?,
    })
}

fn owner_from_row(row: &Row<'_>) -> rusqlite::Result<TaskOwner> {
    Ok(TaskOwner {
        owner_id: row.get(0)?,
        owner_name: row.get(1)?,
        contact: row.get(2)?,
        created_at: parse_datetime(3, &row.get::<_, String>(3)?)?,
    })
}

const PROJECT_COLUMNS: &str = "project_id, project_name, target_model_type, segment, priority, \
     status, description, target_end_date, created_at, updated_at";
const STAGE_COLUMNS: &str =
    "stage_id, project_id, stage_name, position, status, deadline, created_at";
const TASK_COLUMNS: &str =
    "task_id, stage_id, description, owner_id, is_completed, due_date, created_at";

// ==========================================
// 派生状态重算(事务内调用)
// ==========================================
// 红线: 写时重算、读时直出;任何可能改变派生状态的写操作
// 必须在提交前调用本节函数,保证读到的状态永不过期

/// 重算项目派生状态(事务内)
fn recompute_project_status(conn: &Connection, project_id: &str) -> RepositoryResult<()> {
    let mut stmt =
        conn.prepare("SELECT status FROM development_stage WHERE project_id = ?1")?;
    let rows = stmt.query_map(params![project_id], |row| row.get::<_, String>(0))?;
    let mut statuses = Vec::new();
    for row in rows {
        statuses.push(
            ProgressStatus::from_db_str(&row?).unwrap_or(ProgressStatus::NotStarted),
        );
    }
    let status = derive_project_status(&statuses);
    conn.execute(
        "UPDATE development_project SET status = ?2, updated_at = ?3 WHERE project_id = ?1",
        params![project_id, status.to_db_str(), Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// 重算阶段派生状态及其所属项目状态(事务内)
fn recompute_stage_and_project(conn: &Connection, stage_id: &str) -> RepositoryResult<()> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM stage_task WHERE stage_id = ?1 ORDER BY rowid ASC",
        TASK_COLUMNS
    ))?;
    let rows = stmt.query_map(params![stage_id], task_from_row)?;
    let mut tasks = Vec::new();
    for row in rows {
        tasks.push(row?);
    }
    let status = derive_stage_status(&tasks);
    conn.execute(
        "UPDATE development_stage SET status = ?2 WHERE stage_id = ?1",
        params![stage_id, status.to_db_str()],
    )?;

    let project_id: String = conn.query_row(
        "SELECT project_id FROM development_stage WHERE stage_id = ?1",
        params![stage_id],
        |row| row.get(0),
    )?;
    recompute_project_status(conn, &project_id)
}

// ==========================================
// DevelopmentProjectRepository - 开发项目仓储
// ==========================================
/// 开发项目仓储
/// 职责: 管理 development_project 表;级联删除覆盖阶段与任务
pub struct DevelopmentProjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DevelopmentProjectRepository {
    /// 创建新的 DevelopmentProjectRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建开发项目
    pub fn create(&self, project: &DevelopmentProject) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO development_project (
                project_id, project_name, target_model_type, segment, priority,
                status, description, target_end_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                project.project_id,
                project.project_name,
                project.target_model_type,
                project.segment,
                project.priority.to_db_str(),
                project.status.to_db_str(),
                project.description,
                project.target_end_date.map(|d| d.to_string()),
                project.created_at.to_rfc3339(),
                project.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按主键查询
    pub fn find_by_id(&self, project_id: &str) -> RepositoryResult<Option<DevelopmentProject>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM development_project WHERE project_id = ?1",
            PROJECT_COLUMNS
        ))?;
        let result = stmt.query_row(params![project_id], project_from_row);
        match result {
            Ok(project) => Ok(Some(project)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询项目列表(按创建顺序)
    pub fn list(
        &self,
        status: Option<ProgressStatus>,
        model_type: Option<&str>,
    ) -> RepositoryResult<Vec<DevelopmentProject>> {
        let conn = self.get_conn()?;
        let mut sql = format!(
            "SELECT {} FROM development_project WHERE 1=1",
            PROJECT_COLUMNS
        );
        let mut bindings: Vec<String> = Vec::new();
        if let Some(s) = status {
            sql.push_str(&format!(" AND status = ?{}", bindings.len() + 1));
            bindings.push(s.to_db_str().to_string());
        }
        if let Some(t) = model_type {
            sql.push_str(&format!(" AND target_model_type = ?{}", bindings.len() + 1));
            bindings.push(t.to_string());
        }
        sql.push_str(" ORDER BY rowid ASC");

        let mut stmt = conn.prepare(&sql)?;
        let rows =
            stmt.query_map(rusqlite::params_from_iter(bindings.iter()), project_from_row)?;
        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?);
        }
        Ok(projects)
    }

    /// 更新项目可变字段
    ///
    /// 红线: status 为派生字段,本方法不写 status
    pub fn update(&self, project: &DevelopmentProject) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE development_project
            SET project_name = ?2, target_model_type = ?3, segment = ?4,
                priority = ?5, description = ?6, target_end_date = ?7, updated_at = ?8
            WHERE project_id = ?1
            "#,
            params![
                project.project_id,
                project.project_name,
                project.target_model_type,
                project.segment,
                project.priority.to_db_str(),
                project.description,
                project.target_end_date.map(|d| d.to_string()),
                Utc::now().to_rfc3339(),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "development_project".to_string(),
                id: project.project_id.to_string(),
            });
        }
        Ok(())
    }

    /// 级联删除项目及其全部阶段与任务
    ///
    /// 红线: 单事务执行,部分失败整体回滚
    pub fn delete_cascade(&self, project_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            r#"
            DELETE FROM stage_task WHERE stage_id IN (
                SELECT stage_id FROM development_stage WHERE project_id = ?1
            )
            "#,
            params![project_id],
        )?;
        tx.execute(
            "DELETE FROM development_stage WHERE project_id = ?1",
            params![project_id],
        )?;
        let affected = tx.execute(
            "DELETE FROM development_project WHERE project_id = ?1",
            params![project_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "development_project".to_string(),
                id: project_id.to_string(),
            });
        }
        tx.commit()?;
        Ok(())
    }

    // ==========================================
    // 聚合查询(驾驶舱专用,只读)
    // ==========================================

    /// 项目总数
    pub fn count_all(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM development_project", [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    /// 按派生状态统计项目数
    pub fn count_by_status(&self) -> RepositoryResult<Vec<(String, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM development_project GROUP BY status ORDER BY status",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }

    /// 已逾期阶段数: 截止日期早于给定日期且阶段尚未完成
    pub fn count_overdue_stages(&self, today: NaiveDate) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM development_stage \
             WHERE deadline IS NOT NULL AND deadline < ?1 AND status != 'COMPLETED'",
            params![today.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 查询全部项目及其阶段完成统计(单条 SQL,保证同一快照)
    ///
    /// # 返回
    /// - Vec<(项目, 已完成阶段数, 阶段总数)>
    pub fn list_with_stage_counts(
        &self,
    ) -> RepositoryResult<Vec<(DevelopmentProject, i64, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {},
                   COALESCE(SUM(CASE WHEN s.status = 'COMPLETED' THEN 1 ELSE 0 END), 0),
                   COUNT(s.stage_id)
            FROM development_project p
            LEFT JOIN development_stage s ON s.project_id = p.project_id
            GROUP BY p.project_id
            ORDER BY p.rowid ASC
            "#,
            "p.project_id, p.project_name, p.target_model_type, p.segment, p.priority, \
             p.status, p.description, p.target_end_date, p.created_at, p.updated_at"
        ))?;
        let rows = stmt.query_map([], |row| {
            let project = project_from_row(row)?;
            let completed: i64 = row.get(10)?;
            let total: i64 = row.get(11)?;
            Ok((project, completed, total))
        })?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}

// ==========================================
// DevelopmentStageRepository - 开发阶段仓储
// ==========================================
/// 开发阶段仓储
/// 职责: 管理 development_stage 表;插入/删除/移动均在单事务内重排 position
/// 并重算项目派生状态
pub struct DevelopmentStageRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DevelopmentStageRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在指定位置插入阶段,后续阶段整体后移一位
    ///
    /// # 参数
    /// - `position`: 目标位置,合法区间 [1, 阶段数+1]
    ///
    /// # 返回
    /// - Ok(DevelopmentStage): 新阶段(状态为 NOT_STARTED,无任务)
    /// - Err(NotFound): 项目不存在
    /// - Err(FieldValueError): 位置越界
    pub fn insert_at(
        &self,
        project_id: &str,
        stage_name: &str,
        position: i32,
        deadline: Option<NaiveDate>,
    ) -> RepositoryResult<DevelopmentStage> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let count = stage_count_tx(&tx, project_id)?;
        if position < 1 || position > count + 1 {
            return Err(RepositoryError::FieldValueError {
                field: "position".to_string(),
                message: format!("位置 {} 越界,合法区间 [1, {}]", position, count + 1),
            });
        }

        // 后移腾位
        tx.execute(
            "UPDATE development_stage SET position = position + 1 \
             WHERE project_id = ?1 AND position >= ?2",
            params![project_id, position],
        )?;

        let stage = DevelopmentStage {
            stage_id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            stage_name: stage_name.to_string(),
            position,
            status: ProgressStatus::NotStarted,
            deadline,
            created_at: Utc::now(),
        };
        tx.execute(
            r#"
            INSERT INTO development_stage (
                stage_id, project_id, stage_name, position, status, deadline, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                stage.stage_id,
                stage.project_id,
                stage.stage_name,
                stage.position,
                stage.status.to_db_str(),
                stage.deadline.map(|d| d.to_string()),
                stage.created_at.to_rfc3339(),
            ],
        )?;

        recompute_project_status(&tx, project_id)?;
        tx.commit()?;
        Ok(stage)
    }

    /// 更新阶段可变字段(名称/截止日期)
    ///
    /// 红线: status 与 position 不经本方法修改
    pub fn update(
        &self,
        stage_id: &str,
        stage_name: Option<&str>,
        deadline: Option<Option<NaiveDate>>,
    ) -> RepositoryResult<DevelopmentStage> {
        let conn = self.get_conn()?;
        let existing =
            find_stage_tx(&conn, stage_id)?.ok_or_else(|| RepositoryError::NotFound {
                entity: "development_stage".to_string(),
                id: stage_id.to_string(),
            })?;
        let updated = DevelopmentStage {
            stage_id: existing.stage_id,
            project_id: existing.project_id,
            stage_name: stage_name
                .map(|s| s.to_string())
                .unwrap_or(existing.stage_name),
            position: existing.position,
            status: existing.status,
            deadline: deadline.unwrap_or(existing.deadline),
            created_at: existing.created_at,
        };
        conn.execute(
            "UPDATE development_stage SET stage_name = ?2, deadline = ?3 WHERE stage_id = ?1",
            params![
                updated.stage_id,
                updated.stage_name,
                updated.deadline.map(|d| d.to_string()),
            ],
        )?;
        Ok(updated)
    }

    /// 移动阶段到新位置(同一项目内),其余阶段重排保持连续
    ///
    /// # 参数
    /// - `new_position`: 合法区间 [1, 阶段数]
    pub fn move_to(&self, stage_id: &str, new_position: i32) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let stage = find_stage_tx(&tx, stage_id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "development_stage".to_string(),
            id: stage_id.to_string(),
        })?;
        let count = stage_count_tx(&tx, &stage.project_id)?;
        if new_position < 1 || new_position > count {
            return Err(RepositoryError::FieldValueError {
                field: "position".to_string(),
                message: format!("位置 {} 越界,合法区间 [1, {}]", new_position, count),
            });
        }
        if new_position == stage.position {
            return Ok(());
        }

        // 先摘出再插入,两步各自保持区间连续
        tx.execute(
            "UPDATE development_stage SET position = position - 1 \
             WHERE project_id = ?1 AND position > ?2",
            params![stage.project_id, stage.position],
        )?;
        tx.execute(
            "UPDATE development_stage SET position = position + 1 \
             WHERE project_id = ?1 AND position >= ?2 AND stage_id != ?3",
            params![stage.project_id, new_position, stage_id],
        )?;
        tx.execute(
            "UPDATE development_stage SET position = ?2 WHERE stage_id = ?1",
            params![stage_id, new_position],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// 删除阶段及其任务,后续阶段前移一位保持连续
    pub fn delete_and_compact(&self, stage_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let stage = find_stage_tx(&tx, stage_id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "development_stage".to_string(),
            id: stage_id.to_string(),
        })?;

        tx.execute("DELETE FROM stage_task WHERE stage_id = ?1", params![stage_id])?;
        tx.execute(
            "DELETE FROM development_stage WHERE stage_id = ?1",
            params![stage_id],
        )?;
        tx.execute(
            "UPDATE development_stage SET position = position - 1 \
             WHERE project_id = ?1 AND position > ?2",
            params![stage.project_id, stage.position],
        )?;

        recompute_project_status(&tx, &stage.project_id)?;
        tx.commit()?;
        Ok(())
    }

    /// 按主键查询
    pub fn find_by_id(&self, stage_id: &str) -> RepositoryResult<Option<DevelopmentStage>> {
        let conn = self.get_conn()?;
        find_stage_tx(&conn, stage_id)
    }

    /// 查询项目的全部阶段(按 position 升序)
    pub fn find_by_project(&self, project_id: &str) -> RepositoryResult<Vec<DevelopmentStage>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM development_stage WHERE project_id = ?1 ORDER BY position ASC",
            STAGE_COLUMNS
        ))?;
        let rows = stmt.query_map(params![project_id], stage_from_row)?;
        let mut stages = Vec::new();
        for row in rows {
            stages.push(row?);
        }
        Ok(stages)
    }
}

fn stage_count_tx(conn: &Connection, project_id: &str) -> RepositoryResult<i32> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM development_stage WHERE project_id = ?1",
        params![project_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn find_stage_tx(conn: &Connection, stage_id: &str) -> RepositoryResult<Option<DevelopmentStage>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM development_stage WHERE stage_id = ?1",
        STAGE_COLUMNS
    ))?;
    let result = stmt.query_row(params![stage_id], stage_from_row);
    match result {
        Ok(stage) => Ok(Some(stage)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ==========================================
// StageTaskRepository - 阶段任务仓储
// ==========================================
/// 阶段任务仓储
/// 职责: 管理 stage_task 表;每次写操作在事务内重算阶段与项目状态
pub struct StageTaskRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StageTaskRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建任务并重算所属阶段/项目状态
    pub fn create(&self, task: &StageTask) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            r#"
            INSERT INTO stage_task (
                task_id, stage_id, description, owner_id, is_completed, due_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                task.task_id,
                task.stage_id,
                task.description,
                task.owner_id,
                task.is_completed as i64,
                task.due_date.map(|d| d.to_string()),
                task.created_at.to_rfc3339(),
            ],
        )?;
        recompute_stage_and_project(&tx, &task.stage_id)?;
        tx.commit()?;
        Ok(())
    }

    /// 更新任务可变字段(描述/责任人/截止日期)
    ///
    /// # 参数
    /// - `owner_id`: 外层 None 表示不变,内层 None 表示清空引用
    /// - `due_date`: 同上
    pub fn update(
        &self,
        task_id: &str,
        description: Option<&str>,
        owner_id: Option<Option<&str>>,
        due_date: Option<Option<NaiveDate>>,
    ) -> RepositoryResult<StageTask> {
        let conn = self.get_conn()?;
        let existing = find_task_tx(&conn, task_id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "stage_task".to_string(),
            id: task_id.to_string(),
        })?;
        let updated = StageTask {
            task_id: existing.task_id,
            stage_id: existing.stage_id,
            description: description
                .map(|s| s.to_string())
                .unwrap_or(existing.description),
            owner_id: match owner_id {
                Some(new_ref) => new_ref.map(|s| s.to_string()),
                None => existing.owner_id,
            },
            is_completed: existing.is_completed,
            due_date: due_date.unwrap_or(existing.due_date),
            created_at: existing.created_at,
        };
        conn.execute(
            "UPDATE stage_task SET description = ?2, owner_id = ?3, due_date = ?4 \
             WHERE task_id = ?1",
            params![
                updated.task_id,
                updated.description,
                updated.owner_id,
                updated.due_date.map(|d| d.to_string()),
            ],
        )?;
        Ok(updated)
    }

    /// 设置任务完成状态(幂等)并重算阶段/项目状态
    ///
    /// 设置为当前值时为空操作,仍返回成功
    pub fn set_completion(&self, task_id: &str, done: bool) -> RepositoryResult<StageTask> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let existing = find_task_tx(&tx, task_id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "stage_task".to_string(),
            id: task_id.to_string(),
        })?;
        if existing.is_completed == done {
            return Ok(existing);
        }

        tx.execute(
            "UPDATE stage_task SET is_completed = ?2 WHERE task_id = ?1",
            params![task_id, done as i64],
        )?;
        recompute_stage_and_project(&tx, &existing.stage_id)?;
        tx.commit()?;
        Ok(StageTask {
            is_completed: done,
            ..existing
        })
    }

    /// 删除任务并重算阶段/项目状态
    pub fn delete(&self, task_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let existing = find_task_tx(&tx, task_id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "stage_task".to_string(),
            id: task_id.to_string(),
        })?;
        tx.execute("DELETE FROM stage_task WHERE task_id = ?1", params![task_id])?;
        recompute_stage_and_project(&tx, &existing.stage_id)?;
        tx.commit()?;
        Ok(())
    }

    /// 按主键查询
    pub fn find_by_id(&self, task_id: &str) -> RepositoryResult<Option<StageTask>> {
        let conn = self.get_conn()?;
        find_task_tx(&conn, task_id)
    }

    /// 查询阶段的全部任务(按创建顺序)
    pub fn find_by_stage(&self, stage_id: &str) -> RepositoryResult<Vec<StageTask>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM stage_task WHERE stage_id = ?1 ORDER BY rowid ASC",
            TASK_COLUMNS
        ))?;
        let rows = stmt.query_map(params![stage_id], task_from_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }
}

fn find_task_tx(conn: &Connection, task_id: &str) -> RepositoryResult<Option<StageTask>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM stage_task WHERE task_id = ?1",
        TASK_COLUMNS
    ))?;
    let result = stmt.query_row(params![task_id], task_from_row);
    match result {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ==========================================
// TaskOwnerRepository - 任务责任人仓储
// ==========================================
/// 任务责任人仓储
/// 红线: 删除责任人只清空任务引用,永不删除任务(应用层保证,不依赖数据库级联)
pub struct TaskOwnerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TaskOwnerRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建责任人
    pub fn create(&self, owner: &TaskOwner) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO task_owner (owner_id, owner_name, contact, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                owner.owner_id,
                owner.owner_name,
                owner.contact,
                owner.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按主键查询
    pub fn find_by_id(&self, owner_id: &str) -> RepositoryResult<Option<TaskOwner>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT owner_id, owner_name, contact, created_at FROM task_owner \
             WHERE owner_id = ?1",
        )?;
        let result = stmt.query_row(params![owner_id], owner_from_row);
        match result {
            Ok(owner) => Ok(Some(owner)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询全部责任人(按创建顺序)
    pub fn list_all(&self) -> RepositoryResult<Vec<TaskOwner>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT owner_id, owner_name, contact, created_at FROM task_owner \
             ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([], owner_from_row)?;
        let mut owners = Vec::new();
        for row in rows {
            owners.push(row?);
        }
        Ok(owners)
    }

    /// 删除责任人并清空引用它的任务的 owner_id
    ///
    /// 任务本身与其完成状态不受影响,因此无需重算派生状态
    pub fn delete_and_clear_refs(&self, owner_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let cleared = tx.execute(
            "UPDATE stage_task SET owner_id = NULL WHERE owner_id = ?1",
            params![owner_id],
        )?;
        let affected = tx.execute(
            "DELETE FROM task_owner WHERE owner_id = ?1",
            params![owner_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "task_owner".to_string(),
                id: owner_id.to_string(),
            });
        }
        tx.commit()?;
        Ok(cleared)
    }
}

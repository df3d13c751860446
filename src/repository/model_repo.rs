// ==========================================
// 信用评分模型治理系统 - 模型库存仓储
// ==========================================
// 红线: Repository 不含业务规则,只负责数据访问与事务原子性
// 红线: 模型删除必须在单事务内级联删除全部子实体
// ==========================================

use crate::domain::model::{GiniRecord, ModelInventory, TechnicalGuide, ValidationReport};
use crate::domain::types::{ModelStatus, ReportKind};
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

fn model_from_row(row: &Row<'_>) -> rusqlite::Result<ModelInventory> {
    Ok(ModelInventory {
        model_id: row.get(0)?,
        model_name: row.get(1)?,
        model_type: row.get(2)?,
        segment: row.get(3)?,
        status: ModelStatus::from_db_str(&row.get::<_, String>(4)?)
            .unwrap_or(ModelStatus::Active),
        business_unit: row.get(5)?,
        description: row.get(6)?,
        guide_revision_seq: row.get(7)?,
        created_at: parse_datetime(8, &row.get::<_, String>(8)?)?,
        updated_at: parse_datetime(9, &row.get::<_, String>(9)?)?,
    })
}

const MODEL_COLUMNS: &str = "model_id, model_name, model_type, segment, status, \
     business_unit, description, guide_revision_seq, created_at, updated_at";

// ==========================================
// ModelInventoryRepository - 模型主数据仓储
// ==========================================
/// 模型主数据仓储
/// 职责: 管理 model_inventory 表的 CRUD 与级联删除
pub struct ModelInventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ModelInventoryRepository {
    /// 创建新的 ModelInventoryRepository 实例
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建模型
    pub fn create(&self, model: &ModelInventory) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO model_inventory (
                model_id, model_name, model_type, segment, status,
                business_unit, description, guide_revision_seq, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                model.model_id,
                model.model_name,
                model.model_type,
                model.segment,
                model.status.to_db_str(),
                model.business_unit,
                model.description,
                model.guide_revision_seq,
                model.created_at.to_rfc3339(),
                model.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按主键查询
    ///
    /// # 返回
    /// - Ok(Some(ModelInventory)): 找到模型
    /// - Ok(None): 未找到
    /// - Err: 数据库错误
    pub fn find_by_id(&self, model_id: &str) -> RepositoryResult<Option<ModelInventory>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM model_inventory WHERE model_id = ?1",
            MODEL_COLUMNS
        ))?;

        let result = stmt.query_row(params![model_id], model_from_row);
        match result {
            Ok(model) => Ok(Some(model)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询模型列表(按创建顺序)
    ///
    /// # 参数
    /// - `model_type`: 可选类型过滤
    /// - `status`: 可选状态过滤
    pub fn list(
        &self,
        model_type: Option<&str>,
        status: Option<ModelStatus>,
    ) -> RepositoryResult<Vec<ModelInventory>> {
        let conn = self.get_conn()?;
        let mut sql = format!("SELECT {} FROM model_inventory WHERE 1=1", MODEL_COLUMNS);
        let mut bindings: Vec<String> = Vec::new();
        if let Some(t) = model_type {
            sql.push_str(&format!(" AND model_type = ?{}", bindings.len() + 1));
            bindings.push(t.to_string());
        }
        if let Some(s) = status {
            sql.push_str(&format!(" AND status = ?{}", bindings.len() + 1));
            bindings.push(s.to_db_str().to_string());
        }
        sql.push_str(" ORDER BY rowid ASC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(bindings.iter()), model_from_row)?;
        let mut models = Vec::new();
        for row in rows {
            models.push(row?);
        }
        Ok(models)
    }

    /// 更新模型可变字段(不触碰 guide_revision_seq)
    pub fn update(&self, model: &ModelInventory) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE model_inventory
            SET model_name = ?2, model_type = ?3, segment = ?4, status = ?5,
                business_unit = ?6, description = ?7, updated_at = ?8
            WHERE model_id = ?1
            "#,
            params![
                model.model_id,
                model.model_name,
                model.model_type,
                model.segment,
                model.status.to_db_str(),
                model.business_unit,
                model.description,
                Utc::now().to_rfc3339(),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "model_inventory".to_string(),
                id: model.model_id.to_string(),
            });
        }
        Ok(())
    }

    /// 级联删除模型及其全部子实体
    ///
    /// 红线: 单事务执行,部分失败整体回滚,不存在可观察的半级联状态
    pub fn delete_cascade(&self, model_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM gini_record WHERE model_id = ?1", params![model_id])?;
        tx.execute(
            "DELETE FROM validation_report WHERE model_id = ?1",
            params![model_id],
        )?;
        tx.execute(
            "DELETE FROM technical_guide WHERE model_id = ?1",
            params![model_id],
        )?;
        let affected = tx.execute(
            "DELETE FROM model_inventory WHERE model_id = ?1",
            params![model_id],
        )?;
        if affected == 0 {
            // 事务未提交即回滚,子表删除不会生效
            return Err(RepositoryError::NotFound {
                entity: "model_inventory".to_string(),
                id: model_id.to_string(),
            });
        }
        tx.commit()?;
        Ok(())
    }

    // ==========================================
    // 聚合查询(驾驶舱专用,只读)
    // ==========================================

    /// 模型总数
    pub fn count_all(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM model_inventory", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 按状态统计模型数
    pub fn count_by_status(&self) -> RepositoryResult<Vec<(String, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM model_inventory GROUP BY status ORDER BY status",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }

    /// 按模型类型统计模型数
    pub fn count_by_type(&self) -> RepositoryResult<Vec<(String, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT model_type, COUNT(*) FROM model_inventory GROUP BY model_type ORDER BY model_type",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }
}

// ==========================================
// TechnicalGuideRepository - 技术文档仓储
// ==========================================
/// 技术文档仓储
/// 职责: 管理 technical_guide 表;版本号从模型的 guide_revision_seq 分配
/// 红线: 版本号同一模型内单调递增、永不复用(删除不回收)
pub struct TechnicalGuideRepository {
    conn: Arc<Mutex<Connection>>,
}

fn guide_from_row(row: &Row<'_>) -> rusqlite::Result<TechnicalGuide> {
    Ok(TechnicalGuide {
        guide_id: row.get(0)?,
        model_id: row.get(1)?,
        title: row.get(2)?,
        content_ref: row.get(3)?,
        section_type: row.get(4)?,
        revision: row.get(5)?,
        created_at: parse_datetime(6, &row.get::<_, String>(6)?)?,
    })
}

const GUIDE_COLUMNS: &str =
    "guide_id, model_id, title, content_ref, section_type, revision, created_at";

impl TechnicalGuideRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建技术文档,版本号在同一事务内从模型计数器分配
    ///
    /// # 返回
    /// - Ok(TechnicalGuide): 新文档(含分配的版本号)
    /// - Err(NotFound): 模型不存在
    pub fn create(
        &self,
        model_id: &str,
        title: &str,
        content_ref: Option<&str>,
        section_type: Option<&str>,
    ) -> RepositoryResult<TechnicalGuide> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let revision = bump_guide_revision(&tx, model_id)?;
        let guide = TechnicalGuide {
            guide_id: Uuid::new_v4().to_string(),
            model_id: model_id.to_string(),
            title: title.to_string(),
            content_ref: content_ref.map(|s| s.to_string()),
            section_type: section_type.map(|s| s.to_string()),
            revision,
            created_at: Utc::now(),
        };
        tx.execute(
            r#"
            INSERT INTO technical_guide (
                guide_id, model_id, title, content_ref, section_type, revision, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                guide.guide_id,
                guide.model_id,
                guide.title,
                guide.content_ref,
                guide.section_type,
                guide.revision,
                guide.created_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(guide)
    }

    /// 更新技术文档(版本抬升: 更新即分配新版本号)
    ///
    /// # 参数
    /// - `content_ref`: 外层 None 表示不变,内层 None 表示清空
    /// - `section_type`: 同上
    pub fn update(
        &self,
        guide_id: &str,
        title: Option<&str>,
        content_ref: Option<Option<&str>>,
        section_type: Option<Option<&str>>,
    ) -> RepositoryResult<TechnicalGuide> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let existing = find_guide_tx(&tx, guide_id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "technical_guide".to_string(),
            id: guide_id.to_string(),
        })?;

        let revision = bump_guide_revision(&tx, &existing.model_id)?;
        let updated = TechnicalGuide {
            guide_id: existing.guide_id,
            model_id: existing.model_id,
            title: title.map(|s| s.to_string()).unwrap_or(existing.title),
            content_ref: match content_ref {
                Some(new_ref) => new_ref.map(|s| s.to_string()),
                None => existing.content_ref,
            },
            section_type: match section_type {
                Some(new_type) => new_type.map(|s| s.to_string()),
                None => existing.section_type,
            },
            revision,
            created_at: existing.created_at,
        };
        tx.execute(
            r#"
            UPDATE technical_guide
            SET title = ?2, content_ref = ?3, section_type = ?4, revision = ?5
            WHERE guide_id = ?1
            "#,
            params![
                updated.guide_id,
                updated.title,
                updated.content_ref,
                updated.section_type,
                updated.revision,
            ],
        )?;
        tx.commit()?;
        Ok(updated)
    }

    /// 删除技术文档(版本号不回收)
    pub fn delete(&self, guide_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM technical_guide WHERE guide_id = ?1",
            params![guide_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "technical_guide".to_string(),
                id: guide_id.to_string(),
            });
        }
        Ok(())
    }

    /// 按主键查询
    pub fn find_by_id(&self, guide_id: &str) -> RepositoryResult<Option<TechnicalGuide>> {
        let conn = self.get_conn()?;
        find_guide_tx(&conn, guide_id)
    }

    /// 查询模型的全部技术文档(按版本号升序)
    pub fn find_by_model(&self, model_id: &str) -> RepositoryResult<Vec<TechnicalGuide>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM technical_guide WHERE model_id = ?1 ORDER BY revision ASC",
            GUIDE_COLUMNS
        ))?;
        let rows = stmt.query_map(params![model_id], guide_from_row)?;
        let mut guides = Vec::new();
        for row in rows {
            guides.push(row?);
        }
        Ok(guides)
    }
}

/// 在事务内抬升模型的文档版本计数器并返回新版本号
fn bump_guide_revision(conn: &Connection, model_id: &str) -> RepositoryResult<i64> {
    let affected = conn.execute(
        "UPDATE model_inventory SET guide_revision_seq = guide_revision_seq + 1 WHERE model_id = ?1",
        params![model_id],
    )?;
    if affected == 0 {
        return Err(RepositoryError::NotFound {
            entity: "model_inventory".to_string(),
            id: model_id.to_string(),
        });
    }
    let revision: i64 = conn.query_row(
        "SELECT guide_revision_seq FROM model_inventory WHERE model_id = ?1",
        params![model_id],
        |row| row.get(0),
    )?;
    Ok(revision)
}

fn find_guide_tx(conn: &Connection, guide_id: &str) -> RepositoryResult<Option<TechnicalGuide>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM technical_guide WHERE guide_id = ?1",
        GUIDE_COLUMNS
    ))?;
    let result = stmt.query_row(params![guide_id], guide_from_row);
    match result {
        Ok(guide) => Ok(Some(guide)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ==========================================
// ValidationReportRepository - 验证报告仓储
// ==========================================
/// 验证报告仓储
/// 红线: 报告为只增证据,不提供更新操作
pub struct ValidationReportRepository {
    conn: Arc<Mutex<Connection>>,
}

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<ValidationReport> {
    Ok(ValidationReport {
        report_id: row.get(0)?,
        model_id: row.get(1)?,
        report_date: parse_date(2, &row.get::<_, String>(2)?)?,
        outcome: row.get(3)?,
        report_kind: ReportKind::from_db_str(&row.get::<_, String>(4)?)
            .unwrap_or(ReportKind::Incoming),
        created_at: parse_datetime(5, &row.get::<_, String>(5)?)?,
    })
}

impl ValidationReportRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建验证报告
    pub fn create(&self, report: &ValidationReport) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO validation_report (
                report_id, model_id, report_date, outcome, report_kind, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                report.report_id,
                report.model_id,
                report.report_date.to_string(),
                report.outcome,
                report.report_kind.to_db_str(),
                report.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 删除验证报告
    pub fn delete(&self, report_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM validation_report WHERE report_id = ?1",
            params![report_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "validation_report".to_string(),
                id: report_id.to_string(),
            });
        }
        Ok(())
    }

    /// 查询模型的全部验证报告(按报告日期升序,同日按创建顺序)
    pub fn find_by_model(&self, model_id: &str) -> RepositoryResult<Vec<ValidationReport>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT report_id, model_id, report_date, outcome, report_kind, created_at
            FROM validation_report
            WHERE model_id = ?1
            ORDER BY report_date ASC, rowid ASC
            "#,
        )?;
        let rows = stmt.query_map(params![model_id], report_from_row)?;
        let mut reports = Vec::new();
        for row in rows {
            reports.push(row?);
        }
        Ok(reports)
    }
}

// ==========================================
// GiniRecordRepository - Gini 记录仓储
// ==========================================
/// Gini 记录仓储
/// "最新"语义: measured_on 最大者;日期并列时取最后插入(rowid 最大)
pub struct GiniRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

fn gini_from_row(row: &Row<'_>) -> rusqlite::Result<GiniRecord> {
    Ok(GiniRecord {
        record_id: row.get(0)?,
        model_id: row.get(1)?,
        measured_on: parse_date(2, &row.get::<_, String>(2)?)?,
        coefficient: row.get(3)?,
        sample_size: row.get(4)?,
        created_at: parse_datetime(5, &row.get::<_, String>(5)?)?,
    })
}

const GINI_COLUMNS: &str =
    "record_id, model_id, measured_on, coefficient, sample_size, created_at";

impl GiniRecordRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建 Gini 记录
    pub fn create(&self, record: &GiniRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO gini_record (
                record_id, model_id, measured_on, coefficient, sample_size, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.record_id,
                record.model_id,
                record.measured_on.to_string(),
                record.coefficient,
                record.sample_size,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 删除 Gini 记录
    pub fn delete(&self, record_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM gini_record WHERE record_id = ?1",
            params![record_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "gini_record".to_string(),
                id: record_id.to_string(),
            });
        }
        Ok(())
    }

    /// 查询模型的完整 Gini 历史(按测量日期升序,同日按插入顺序)
    pub fn find_by_model(&self, model_id: &str) -> RepositoryResult<Vec<GiniRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM gini_record WHERE model_id = ?1 ORDER BY measured_on ASC, rowid ASC",
            GINI_COLUMNS
        ))?;
        let rows = stmt.query_map(params![model_id], gini_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// 查询模型最近的 N 条记录(最新在前)
    ///
    /// 排序: measured_on DESC, rowid DESC(同日取最后插入)
    pub fn find_latest(&self, model_id: &str, limit: i64) -> RepositoryResult<Vec<GiniRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM gini_record WHERE model_id = ?1 \
             ORDER BY measured_on DESC, rowid DESC LIMIT ?2",
            GINI_COLUMNS
        ))?;
        let rows = stmt.query_map(params![model_id, limit], gini_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

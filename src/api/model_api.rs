// ==========================================
// 信用评分模型治理系统 - 模型注册中心 API
// ==========================================
// 职责: 模型主数据与子实体(技术文档/验证报告/Gini记录)的生命周期管理
// 红线: 模型删除级联且原子;验证报告与Gini记录只增不改
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator;
use crate::domain::model::{GiniRecord, ModelInventory, TechnicalGuide, ValidationReport};
use crate::domain::types::{ModelStatus, ReportKind};
use crate::repository::model_repo::{
    GiniRecordRepository, ModelInventoryRepository, TechnicalGuideRepository,
    ValidationReportRepository,
};

// ==========================================
// 请求 DTO
// ==========================================

/// 创建模型请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateModelRequest {
    pub model_name: String,
    pub model_type: String,
    pub business_unit: String,
    pub segment: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
}

/// 更新模型请求(None 表示不变)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateModelRequest {
    pub model_name: Option<String>,
    pub model_type: Option<String>,
    pub business_unit: Option<String>,
    pub segment: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
}

// ==========================================
// ModelApi - 模型注册中心
// ==========================================

/// 模型注册中心API
///
/// 职责:
/// 1. 模型主数据 CRUD 与过滤查询
/// 2. 技术文档管理(版本号注册中心分配,更新即抬升)
/// 3. 验证报告管理(只增不改)
/// 4. Gini 记录管理与当前值/历史查询
pub struct ModelApi {
    model_repo: Arc<ModelInventoryRepository>,
    guide_repo: Arc<TechnicalGuideRepository>,
    report_repo: Arc<ValidationReportRepository>,
    gini_repo: Arc<GiniRecordRepository>,
}

impl ModelApi {
    /// 创建新的ModelApi实例
    pub fn new(
        model_repo: Arc<ModelInventoryRepository>,
        guide_repo: Arc<TechnicalGuideRepository>,
        report_repo: Arc<ValidationReportRepository>,
        gini_repo: Arc<GiniRecordRepository>,
    ) -> Self {
        Self {
            model_repo,
            guide_repo,
            report_repo,
            gini_repo,
        }
    }

    /// 解析可选状态过滤参数
    fn parse_status(status: Option<&str>) -> ApiResult<Option<ModelStatus>> {
        match status {
            Some(s) => ModelStatus::from_db_str(s)
                .map(Some)
                .ok_or_else(|| ApiError::ValidationError(format!("未知的模型状态: {}", s))),
            None => Ok(None),
        }
    }

    /// 确认模型存在,否则返回 NotFound
    fn require_model(&self, model_id: &str) -> ApiResult<ModelInventory> {
        self.model_repo
            .find_by_id(model_id)?
            .ok_or_else(|| ApiError::NotFound(format!("模型(id={})不存在", model_id)))
    }

    // ==========================================
    // 模型主数据
    // ==========================================

    /// 创建模型
    ///
    /// # 失败
    /// - ValidationError: 名称/类型/业务单元为空
    pub fn create_model(&self, req: CreateModelRequest) -> ApiResult<ModelInventory> {
        let model_name = validator::require_text("model_name", &req.model_name)?;
        let model_type = validator::require_text("model_type", &req.model_type)?;
        let business_unit = validator::require_text("business_unit", &req.business_unit)?;
        let status = Self::parse_status(req.status.as_deref())?.unwrap_or(ModelStatus::Active);

        let now = Utc::now();
        let model = ModelInventory {
            model_id: Uuid::new_v4().to_string(),
            model_name,
            model_type,
            segment: req.segment,
            status,
            business_unit,
            description: req.description,
            guide_revision_seq: 0,
            created_at: now,
            updated_at: now,
        };
        self.model_repo.create(&model)?;
        info!(model_id = %model.model_id, model_type = %model.model_type, "模型已创建");
        Ok(model)
    }

    /// 查询单个模型
    pub fn get_model(&self, model_id: &str) -> ApiResult<ModelInventory> {
        self.require_model(model_id)
    }

    /// 更新模型可变字段
    pub fn update_model(
        &self,
        model_id: &str,
        req: UpdateModelRequest,
    ) -> ApiResult<ModelInventory> {
        let mut model = self.require_model(model_id)?;
        if let Some(name) = req.model_name {
            model.model_name = validator::require_text("model_name", &name)?;
        }
        if let Some(t) = req.model_type {
            model.model_type = validator::require_text("model_type", &t)?;
        }
        if let Some(unit) = req.business_unit {
            model.business_unit = validator::require_text("business_unit", &unit)?;
        }
        if let Some(status) = req.status.as_deref() {
            model.status = ModelStatus::from_db_str(status)
                .ok_or_else(|| ApiError::ValidationError(format!("未知的模型状态: {}", status)))?;
        }
        if req.segment.is_some() {
            model.segment = req.segment;
        }
        if req.description.is_some() {
            model.description = req.description;
        }
        self.model_repo.update(&model)?;
        debug!(model_id = %model.model_id, "模型已更新");
        Ok(model)
    }

    /// 删除模型(级联删除全部子实体,单事务)
    pub fn delete_model(&self, model_id: &str) -> ApiResult<()> {
        self.model_repo.delete_cascade(model_id)?;
        info!(model_id = %model_id, "模型及其子实体已级联删除");
        Ok(())
    }

    /// 查询模型列表
    ///
    /// # 参数
    /// - `model_type`: 可选类型过滤
    /// - `status`: 可选状态过滤(非法状态返回 ValidationError)
    pub fn list_models(
        &self,
        model_type: Option<&str>,
        status: Option<&str>,
    ) -> ApiResult<Vec<ModelInventory>> {
        let status = Self::parse_status(status)?;
        Ok(self.model_repo.list(model_type, status)?)
    }

    // ==========================================
    // 技术文档
    // ==========================================

    /// 创建技术文档,版本号由注册中心分配
    pub fn add_guide(
        &self,
        model_id: &str,
        title: &str,
        content_ref: Option<&str>,
        section_type: Option<&str>,
    ) -> ApiResult<TechnicalGuide> {
        let title = validator::require_text("title", title)?;
        self.require_model(model_id)?;
        let guide = self
            .guide_repo
            .create(model_id, &title, content_ref, section_type)?;
        debug!(model_id = %model_id, revision = guide.revision, "技术文档已创建");
        Ok(guide)
    }

    /// 更新技术文档(更新即抬升版本号,旧版本号不复用)
    ///
    /// # 参数
    /// - `content_ref`: 外层 None 表示不变,内层 None 表示清空
    /// - `section_type`: 同上
    pub fn update_guide(
        &self,
        guide_id: &str,
        title: Option<&str>,
        content_ref: Option<Option<&str>>,
        section_type: Option<Option<&str>>,
    ) -> ApiResult<TechnicalGuide> {
        let title = title
            .map(|t| validator::require_text("title", t))
            .transpose()?;
        let guide = self
            .guide_repo
            .update(guide_id, title.as_deref(), content_ref, section_type)?;
        debug!(guide_id = %guide_id, revision = guide.revision, "技术文档已更新");
        Ok(guide)
    }

    /// 删除技术文档
    pub fn delete_guide(&self, guide_id: &str) -> ApiResult<()> {
        self.guide_repo.delete(guide_id)?;
        Ok(())
    }

    /// 查询模型的技术文档列表(按版本号升序)
    pub fn list_guides(&self, model_id: &str) -> ApiResult<Vec<TechnicalGuide>> {
        self.require_model(model_id)?;
        Ok(self.guide_repo.find_by_model(model_id)?)
    }

    // ==========================================
    // 验证报告(只增不改)
    // ==========================================

    /// 创建验证报告
    ///
    /// # 失败
    /// - NotFound: 模型不存在
    /// - ValidationError: 日期非法或结论为空
    pub fn add_report(
        &self,
        model_id: &str,
        report_date: &str,
        outcome: &str,
        report_kind: Option<&str>,
    ) -> ApiResult<ValidationReport> {
        let outcome = validator::require_text("outcome", outcome)?;
        let report_date = validator::parse_date("report_date", report_date)?;
        let report_kind = match report_kind {
            Some(k) => ReportKind::from_db_str(k)
                .ok_or_else(|| ApiError::ValidationError(format!("未知的报告方向: {}", k)))?,
            None => ReportKind::Incoming,
        };
        self.require_model(model_id)?;

        let report = ValidationReport {
            report_id: Uuid::new_v4().to_string(),
            model_id: model_id.to_string(),
            report_date,
            outcome,
            report_kind,
            created_at: Utc::now(),
        };
        self.report_repo.create(&report)?;
        debug!(model_id = %model_id, report_date = %report.report_date, "验证报告已创建");
        Ok(report)
    }

    /// 删除验证报告
    pub fn delete_report(&self, report_id: &str) -> ApiResult<()> {
        self.report_repo.delete(report_id)?;
        Ok(())
    }

    /// 查询模型的验证报告列表(按报告日期升序)
    pub fn list_reports(&self, model_id: &str) -> ApiResult<Vec<ValidationReport>> {
        self.require_model(model_id)?;
        Ok(self.report_repo.find_by_model(model_id)?)
    }

    // ==========================================
    // Gini 记录
    // ==========================================

    /// 创建 Gini 记录
    ///
    /// # 失败
    /// - ValidationError: 系数越界 [-1, 1] 或日期非法
    /// - NotFound: 模型不存在
    pub fn add_gini_record(
        &self,
        model_id: &str,
        measured_on: &str,
        coefficient: f64,
        sample_size: Option<i64>,
    ) -> ApiResult<GiniRecord> {
        validator::require_gini_coefficient(coefficient)?;
        let measured_on = validator::parse_date("measured_on", measured_on)?;
        self.require_model(model_id)?;

        let record = GiniRecord {
            record_id: Uuid::new_v4().to_string(),
            model_id: model_id.to_string(),
            measured_on,
            coefficient,
            sample_size,
            created_at: Utc::now(),
        };
        self.gini_repo.create(&record)?;
        debug!(model_id = %model_id, coefficient = coefficient, "Gini 记录已创建");
        Ok(record)
    }

    /// 删除 Gini 记录
    pub fn delete_gini_record(&self, record_id: &str) -> ApiResult<()> {
        self.gini_repo.delete(record_id)?;
        Ok(())
    }

    /// 查询模型的完整 Gini 历史(按测量日期升序)
    pub fn gini_history(&self, model_id: &str) -> ApiResult<Vec<GiniRecord>> {
        self.require_model(model_id)?;
        Ok(self.gini_repo.find_by_model(model_id)?)
    }

    /// 查询模型当前 Gini 值
    ///
    /// "当前"取测量日期最新的记录,同日取最后插入者
    ///
    /// # 返回
    /// - Ok(Some(f64)): 当前 Gini 系数
    /// - Ok(None): 无记录(哨兵值,不是错误)
    /// - Err(NotFound): 模型不存在
    pub fn current_gini(&self, model_id: &str) -> ApiResult<Option<f64>> {
        self.require_model(model_id)?;
        let latest = self.gini_repo.find_latest(model_id, 1)?;
        Ok(latest.first().map(|r| r.coefficient))
    }
}

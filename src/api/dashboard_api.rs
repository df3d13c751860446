// ==========================================
// 信用评分模型治理系统 - 驾驶舱 API
// ==========================================
// 职责: 聚合查询(概要统计/类型分布/Gini总览/开发进度)
// 红线: 只读,永不修改底层实体;不引入新的错误种类,只透传读路径错误
// 架构: 无进程级可变状态,天然并发读安全
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::error::ApiResult;
use crate::domain::types::{GiniTrend, Priority, ProgressStatus};
use crate::repository::development_repo::DevelopmentProjectRepository;
use crate::repository::model_repo::{GiniRecordRepository, ModelInventoryRepository};

// ==========================================
// 响应 DTO
// ==========================================

/// 模型侧概要统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub total: i64,
    pub active: i64,
    pub under_review: i64,
    pub retired: i64,
}

/// 开发侧概要统计(按派生状态)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentSummary {
    pub total_projects: i64,
    pub not_started: i64,
    pub in_progress: i64,
    pub completed: i64,
    /// 已逾期阶段数(截止日期已过且阶段未完成)
    pub overdue_stages: i64,
}

/// 驾驶舱概要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub models: ModelSummary,
    pub development: DevelopmentSummary,
}

/// 模型类型分布项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelTypeCount {
    pub model_type: String,
    pub count: i64,
}

/// Gini 总览项(每个模型一条)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiniOverviewItem {
    pub model_id: String,
    pub model_name: String,
    pub model_type: String,
    pub current_gini: Option<f64>,
    pub trend: GiniTrend,
}

/// 开发进度项(每个项目一条)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentProgressItem {
    pub project_id: String,
    pub project_name: String,
    pub status: ProgressStatus,
    pub priority: Priority,
    pub completed_stages: i64,
    pub total_stages: i64,
    /// 完成比 = 已完成阶段数 / 阶段总数,零阶段时为 0
    pub progress_ratio: f64,
    pub target_end_date: Option<NaiveDate>,
}

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================

/// 驾驶舱API
///
/// 职责:
/// 1. 概要统计(模型/项目计数)
/// 2. 模型类型分布
/// 3. Gini 总览(当前值 + 趋势方向)
/// 4. 开发进度(完成比 + 派生状态)
pub struct DashboardApi {
    model_repo: Arc<ModelInventoryRepository>,
    gini_repo: Arc<GiniRecordRepository>,
    project_repo: Arc<DevelopmentProjectRepository>,
}

impl DashboardApi {
    /// 创建新的DashboardApi实例
    pub fn new(
        model_repo: Arc<ModelInventoryRepository>,
        gini_repo: Arc<GiniRecordRepository>,
        project_repo: Arc<DevelopmentProjectRepository>,
    ) -> Self {
        Self {
            model_repo,
            gini_repo,
            project_repo,
        }
    }

    /// 概要统计: 模型总数/各状态数,项目总数/各派生状态数
    pub fn get_summary(&self) -> ApiResult<DashboardSummary> {
        let mut models = ModelSummary {
            total: self.model_repo.count_all()?,
            active: 0,
            under_review: 0,
            retired: 0,
        };
        for (status, count) in self.model_repo.count_by_status()? {
            match status.as_str() {
                "ACTIVE" => models.active = count,
                "UNDER_REVIEW" => models.under_review = count,
                "RETIRED" => models.retired = count,
                _ => {}
            }
        }

        let mut development = DevelopmentSummary {
            total_projects: self.project_repo.count_all()?,
            not_started: 0,
            in_progress: 0,
            completed: 0,
            overdue_stages: self
                .project_repo
                .count_overdue_stages(Utc::now().date_naive())?,
        };
        for (status, count) in self.project_repo.count_by_status()? {
            match status.as_str() {
                "NOT_STARTED" => development.not_started = count,
                "IN_PROGRESS" => development.in_progress = count,
                "COMPLETED" => development.completed = count,
                _ => {}
            }
        }

        debug!(
            models = models.total,
            projects = development.total_projects,
            "驾驶舱概要统计完成"
        );
        Ok(DashboardSummary { models, development })
    }

    /// 模型类型分布: 类型 → 模型数
    pub fn get_model_types(&self) -> ApiResult<Vec<ModelTypeCount>> {
        let counts = self
            .model_repo
            .count_by_type()?
            .into_iter()
            .map(|(model_type, count)| ModelTypeCount { model_type, count })
            .collect();
        Ok(counts)
    }

    /// Gini 总览: 每个模型的当前 Gini 与趋势方向
    ///
    /// 趋势规则(比较最近两条记录):
    /// - NO_DATA: 无记录
    /// - FLAT: 仅一条记录,或最近两条值相等
    /// - UP/DOWN: 最新值高于/低于前一条
    pub fn get_gini_overview(&self) -> ApiResult<Vec<GiniOverviewItem>> {
        let models = self.model_repo.list(None, None)?;
        let mut items = Vec::with_capacity(models.len());
        for model in models {
            let latest = self.gini_repo.find_latest(&model.model_id, 2)?;
            let (current_gini, trend) = match latest.as_slice() {
                [] => (None, GiniTrend::NoData),
                [only] => (Some(only.coefficient), GiniTrend::Flat),
                [newest, previous, ..] => {
                    let trend = if newest.coefficient > previous.coefficient {
                        GiniTrend::Up
                    } else if newest.coefficient < previous.coefficient {
                        GiniTrend::Down
                    } else {
                        GiniTrend::Flat
                    };
                    (Some(newest.coefficient), trend)
                }
            };
            items.push(GiniOverviewItem {
                model_id: model.model_id,
                model_name: model.model_name,
                model_type: model.model_type,
                current_gini,
                trend,
            });
        }
        Ok(items)
    }

    /// 开发进度: 每个项目的完成比与派生状态
    pub fn get_development_progress(&self) -> ApiResult<Vec<DevelopmentProgressItem>> {
        let rows = self.project_repo.list_with_stage_counts()?;
        let items = rows
            .into_iter()
            .map(|(project, completed_stages, total_stages)| {
                let progress_ratio = if total_stages == 0 {
                    0.0
                } else {
                    completed_stages as f64 / total_stages as f64
                };
                DevelopmentProgressItem {
                    project_id: project.project_id,
                    project_name: project.project_name,
                    status: project.status,
                    priority: project.priority,
                    completed_stages,
                    total_stages,
                    progress_ratio,
                    target_end_date: project.target_end_date,
                }
            })
            .collect();
        Ok(items)
    }
}

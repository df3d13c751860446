// ==========================================
// 信用评分模型治理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 所有仓储共享同一个连接(Mutex 序列化),
//       保证派生状态重算读到一致快照
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{DashboardApi, DevelopmentApi, ModelApi};
use crate::repository::development_repo::{
    DevelopmentProjectRepository, DevelopmentStageRepository, StageTaskRepository,
    TaskOwnerRepository,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::model_repo::{
    GiniRecordRepository, ModelInventoryRepository, TechnicalGuideRepository,
    ValidationReportRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 模型注册中心API
    pub model_api: Arc<ModelApi>,

    /// 开发跟踪器API
    pub development_api: Arc<DevelopmentApi>,

    /// 驾驶舱API
    pub dashboard_api: Arc<DashboardApi>,

    /// 模型主数据仓储(供嵌入方/测试直接访问)
    pub model_repo: Arc<ModelInventoryRepository>,

    /// 开发项目仓储(供嵌入方/测试直接访问)
    pub project_repo: Arc<DevelopmentProjectRepository>,
}

impl AppState {
    /// 初始化应用状态: 打开数据库、建 schema、装配仓储与API
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_and_init(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let conn = Arc::new(Mutex::new(conn));

        // 模型注册中心
        let model_repo = Arc::new(ModelInventoryRepository::from_connection(conn.clone()));
        let guide_repo = Arc::new(TechnicalGuideRepository::from_connection(conn.clone()));
        let report_repo = Arc::new(ValidationReportRepository::from_connection(conn.clone()));
        let gini_repo = Arc::new(GiniRecordRepository::from_connection(conn.clone()));

        // 开发跟踪器
        let project_repo = Arc::new(DevelopmentProjectRepository::from_connection(conn.clone()));
        let stage_repo = Arc::new(DevelopmentStageRepository::from_connection(conn.clone()));
        let task_repo = Arc::new(StageTaskRepository::from_connection(conn.clone()));
        let owner_repo = Arc::new(TaskOwnerRepository::from_connection(conn.clone()));

        let model_api = Arc::new(ModelApi::new(
            model_repo.clone(),
            guide_repo,
            report_repo,
            gini_repo.clone(),
        ));
        let development_api = Arc::new(DevelopmentApi::new(
            project_repo.clone(),
            stage_repo,
            task_repo,
            owner_repo,
        ));
        let dashboard_api = Arc::new(DashboardApi::new(
            model_repo.clone(),
            gini_repo,
            project_repo.clone(),
        ));

        Ok(Self {
            db_path: db_path.to_string(),
            model_api,
            development_api,
            dashboard_api,
            model_repo,
            project_repo,
        })
    }
}

// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、API测试环境
// ==========================================

use std::error::Error;
use std::sync::Arc;
use tempfile::NamedTempFile;

use model_governance::api::{DashboardApi, DevelopmentApi, ModelApi};
use model_governance::app::AppState;
use model_governance::repository::development_repo::DevelopmentProjectRepository;
use model_governance::repository::model_repo::ModelInventoryRepository;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    // 初始化 schema
    let conn = model_governance::db::open_and_init(&db_path)?;
    drop(conn);

    Ok((temp_file, db_path))
}

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含所有API实例和必要的依赖
pub struct ApiTestEnv {
    pub db_path: String,
    pub model_api: Arc<ModelApi>,
    pub development_api: Arc<DevelopmentApi>,
    pub dashboard_api: Arc<DashboardApi>,

    // Repository层（用于测试数据校验）
    pub model_repo: Arc<ModelInventoryRepository>,
    pub project_repo: Arc<DevelopmentProjectRepository>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建完整的API测试环境
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let (temp_file, db_path) = create_test_db()?;
        let state = AppState::new(&db_path)?;
        Ok(Self {
            db_path,
            model_api: state.model_api,
            development_api: state.development_api,
            dashboard_api: state.dashboard_api,
            model_repo: state.model_repo,
            project_repo: state.project_repo,
            _temp_file: temp_file,
        })
    }
}

// ==========================================
// 信用评分模型治理系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 HTTP/UI 层调用
// ==========================================

pub mod dashboard_api;
pub mod development_api;
pub mod error;
pub mod model_api;
pub mod validator;

// 重导出核心类型
pub use dashboard_api::{
    DashboardApi, DashboardSummary, DevelopmentProgressItem, DevelopmentSummary,
    GiniOverviewItem, ModelSummary, ModelTypeCount,
};
pub use development_api::{CreateProjectRequest, DevelopmentApi, UpdateProjectRequest};
pub use error::{ApiError, ApiResult};
pub use model_api::{CreateModelRequest, ModelApi, UpdateModelRequest};

// ==========================================
// 信用评分模型治理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、派生规则
// 红线: 不含数据访问逻辑,不含 API 逻辑
// ==========================================

pub mod development;
pub mod model;
pub mod types;

// 重导出核心类型
pub use development::{
    derive_project_status, derive_stage_status, DevelopmentProject, DevelopmentStage, StageTask,
    TaskOwner,
};
pub use model::{GiniRecord, ModelInventory, TechnicalGuide, ValidationReport};
pub use types::{GiniTrend, ModelStatus, Priority, ProgressStatus, ReportKind};

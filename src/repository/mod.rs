// ==========================================
// 信用评分模型治理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务规则,只负责数据访问与事务原子性
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod development_repo;
pub mod error;
pub mod model_repo;

// 重导出核心仓储
pub use development_repo::{
    DevelopmentProjectRepository, DevelopmentStageRepository, StageTaskRepository,
    TaskOwnerRepository,
};
pub use error::{RepositoryError, RepositoryResult};
pub use model_repo::{
    GiniRecordRepository, ModelInventoryRepository, TechnicalGuideRepository,
    ValidationReportRepository,
};

// ==========================================
// 信用评分模型治理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 模型治理核心(实体模型/进度状态机/驾驶舱聚合)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// 数据库基础设施（连接初始化/PRAGMA/schema 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{GiniTrend, ModelStatus, Priority, ProgressStatus, ReportKind};

// 领域实体
pub use domain::{
    DevelopmentProject, DevelopmentStage, GiniRecord, ModelInventory, StageTask, TaskOwner,
    TechnicalGuide, ValidationReport,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "信用评分模型治理系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

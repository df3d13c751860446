// ==========================================
// 信用评分模型治理系统 - 应用层
// ==========================================
// 职责: 应用装配(仓储/API 实例化与共享连接管理)
// ==========================================

pub mod state;

pub use state::AppState;

// ==========================================
// 信用评分模型治理系统 - 开发跟踪领域模型
// ==========================================
// 用途: 开发跟踪器(Development Tracker)的实体定义与派生规则
// 红线: 阶段/项目状态为派生状态,只在写路径重算,读路径直接返回
// ==========================================

use crate::domain::types::{Priority, ProgressStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// DevelopmentProject - 模型开发项目
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentProject {
    // ===== 主键 =====
    pub project_id: String, // 项目唯一标识(UUID)

    // ===== 基础信息 =====
    pub project_name: String,         // 项目名称
    pub target_model_type: String,    // 目标模型类型(PD/LGD/EAD等)
    pub segment: Option<String>,      // 目标客群/细分
    pub priority: Priority,           // 优先级
    pub description: Option<String>,  // 项目说明
    pub target_end_date: Option<NaiveDate>, // 目标完成日期

    // ===== 派生状态 =====
    // 红线: 由阶段状态派生,调用方不可直接设置
    pub status: ProgressStatus,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 记录创建时间
    pub updated_at: DateTime<Utc>, // 记录更新时间
}

// ==========================================
// DevelopmentStage - 开发阶段
// ==========================================
// position 在项目内连续无空洞(1..N),结构变更时由仓储层重排
// 红线: position 是可变排序属性,不是稳定标识;稳定标识是 stage_id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentStage {
    pub stage_id: String,            // 阶段唯一标识(UUID)
    pub project_id: String,          // 所属项目(FK)
    pub stage_name: String,          // 阶段名称
    pub position: i32,               // 执行顺序(项目内 1..N 连续)
    pub status: ProgressStatus,      // 派生状态(由任务派生)
    pub deadline: Option<NaiveDate>, // 阶段截止日期
    pub created_at: DateTime<Utc>,   // 记录创建时间
}

// ==========================================
// StageTask - 阶段任务
// ==========================================
// owner_id 为非拥有引用: 删除责任人只清空引用,不删任务
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTask {
    pub task_id: String,             // 任务唯一标识(UUID)
    pub stage_id: String,            // 所属阶段(FK)
    pub description: String,         // 任务描述
    pub owner_id: Option<String>,    // 责任人引用(可空,非拥有)
    pub is_completed: bool,          // 完成标记
    pub due_date: Option<NaiveDate>, // 截止日期
    pub created_at: DateTime<Utc>,   // 记录创建时间
}

// ==========================================
// TaskOwner - 任务责任人
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOwner {
    pub owner_id: String,          // 责任人唯一标识(UUID)
    pub owner_name: String,        // 姓名
    pub contact: Option<String>,   // 联系方式
    pub created_at: DateTime<Utc>, // 记录创建时间
}

// ==========================================
// 派生规则 (纯函数)
// ==========================================
// 在每个可能影响状态的写操作事务末尾同步调用,永不冗余缓存

/// 由任务集合派生阶段状态
///
/// 规则:
/// - COMPLETED: 至少一个任务且全部完成
/// - NOT_STARTED: 无任务,或全部未完成
/// - IN_PROGRESS: 其余情况(完成与未完成混合)
pub fn derive_stage_status(tasks: &[StageTask]) -> ProgressStatus {
    if tasks.is_empty() {
        return ProgressStatus::NotStarted;
    }
    let done = tasks.iter().filter(|t| t.is_completed).count();
    if done == tasks.len() {
        ProgressStatus::Completed
    } else if done == 0 {
        ProgressStatus::NotStarted
    } else {
        ProgressStatus::InProgress
    }
}

/// 由阶段状态集合派生项目状态
///
/// 规则:
/// - COMPLETED: 所有阶段均 COMPLETED(零阶段不算完成)
/// - NOT_STARTED: 所有阶段均 NOT_STARTED(零阶段视为未开始)
/// - IN_PROGRESS: 其余情况
pub fn derive_project_status(stage_statuses: &[ProgressStatus]) -> ProgressStatus {
    if stage_statuses.is_empty() {
        return ProgressStatus::NotStarted;
    }
    if stage_statuses.iter().all(|s| *s == ProgressStatus::Completed) {
        ProgressStatus::Completed
    } else if stage_statuses.iter().all(|s| *s == ProgressStatus::NotStarted) {
        ProgressStatus::NotStarted
    } else {
        ProgressStatus::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(done: bool) -> StageTask {
        StageTask {
            task_id: uuid::Uuid::new_v4().to_string(),
            stage_id: "stage-1".to_string(),
            description: "测试任务".to_string(),
            owner_id: None,
            is_completed: done,
            due_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_阶段状态_无任务为未开始() {
        assert_eq!(derive_stage_status(&[]), ProgressStatus::NotStarted);
    }

    #[test]
    fn test_阶段状态_全部未完成为未开始() {
        let tasks = vec![task(false), task(false)];
        assert_eq!(derive_stage_status(&tasks), ProgressStatus::NotStarted);
    }

    #[test]
    fn test_阶段状态_混合为进行中() {
        let tasks = vec![task(true), task(false)];
        assert_eq!(derive_stage_status(&tasks), ProgressStatus::InProgress);
    }

    #[test]
    fn test_阶段状态_全部完成为已完成() {
        let tasks = vec![task(true), task(true)];
        assert_eq!(derive_stage_status(&tasks), ProgressStatus::Completed);
    }

    #[test]
    fn test_项目状态_零阶段为未开始() {
        assert_eq!(derive_project_status(&[]), ProgressStatus::NotStarted);
    }

    #[test]
    fn test_项目状态_全部完成为已完成() {
        let statuses = vec![ProgressStatus::Completed, ProgressStatus::Completed];
        assert_eq!(derive_project_status(&statuses), ProgressStatus::Completed);
    }

    #[test]
    fn test_项目状态_含未开始与完成为进行中() {
        let statuses = vec![ProgressStatus::NotStarted, ProgressStatus::Completed];
        assert_eq!(derive_project_status(&statuses), ProgressStatus::InProgress);
    }

    #[test]
    fn test_项目状态_全部未开始为未开始() {
        let statuses = vec![ProgressStatus::NotStarted, ProgressStatus::NotStarted];
        assert_eq!(derive_project_status(&statuses), ProgressStatus::NotStarted);
    }
}

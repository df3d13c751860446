// ==========================================
// 信用评分模型治理系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 模型状态 (Model Status)
// ==========================================
// 生产模型的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelStatus {
    Active,      // 在产
    Retired,     // 退役
    UnderReview, // 复核中
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ModelStatus {
    /// 从数据库字符串解析模型状态
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Some(ModelStatus::Active),
            "RETIRED" => Some(ModelStatus::Retired),
            "UNDER_REVIEW" => Some(ModelStatus::UnderReview),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ModelStatus::Active => "ACTIVE",
            ModelStatus::Retired => "RETIRED",
            ModelStatus::UnderReview => "UNDER_REVIEW",
        }
    }
}

// ==========================================
// 进度状态 (Progress Status)
// ==========================================
// 阶段/项目的派生状态
// 红线: 派生状态只能由重算逻辑写入,调用方不可直接设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    NotStarted, // 未开始
    InProgress, // 进行中
    Completed,  // 已完成
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ProgressStatus {
    /// 从数据库字符串解析进度状态
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NOT_STARTED" => Some(ProgressStatus::NotStarted),
            "IN_PROGRESS" => Some(ProgressStatus::InProgress),
            "COMPLETED" => Some(ProgressStatus::Completed),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "NOT_STARTED",
            ProgressStatus::InProgress => "IN_PROGRESS",
            ProgressStatus::Completed => "COMPLETED",
        }
    }
}

// ==========================================
// 项目优先级 (Priority)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,      // 低
    Medium,   // 中
    High,     // 高
    Critical, // 紧急
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Priority {
    /// 从数据库字符串解析优先级(未知值回退到 MEDIUM)
    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "LOW" => Priority::Low,
            "HIGH" => Priority::High,
            "CRITICAL" => Priority::Critical,
            _ => Priority::Medium,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

// ==========================================
// 验证报告方向 (Report Kind)
// ==========================================
// 报告是发送给验证方(OUTGOING)还是验证方回传(INCOMING)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportKind {
    Incoming, // 验证方回传
    Outgoing, // 发送给验证方
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ReportKind {
    /// 从数据库字符串解析报告方向
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "INCOMING" => Some(ReportKind::Incoming),
            "OUTGOING" => Some(ReportKind::Outgoing),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ReportKind::Incoming => "INCOMING",
            ReportKind::Outgoing => "OUTGOING",
        }
    }
}

// ==========================================
// Gini 趋势方向 (Gini Trend)
// ==========================================
// 由最近两条 Gini 记录比较得出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GiniTrend {
    Up,     // 上升
    Down,   // 下降
    Flat,   // 持平(含仅一条记录的情况)
    NoData, // 无记录
}

impl fmt::Display for GiniTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GiniTrend::Up => write!(f, "UP"),
            GiniTrend::Down => write!(f, "DOWN"),
            GiniTrend::Flat => write!(f, "FLAT"),
            GiniTrend::NoData => write!(f, "NO_DATA"),
        }
    }
}

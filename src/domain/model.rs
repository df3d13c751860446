// ==========================================
// 信用评分模型治理系统 - 模型库存领域模型
// ==========================================
// 用途: 模型注册中心(Model Registry)的实体定义
// 红线: 删除模型必须级联删除其全部子实体(技术文档/验证报告/Gini记录)
// ==========================================

use crate::domain::types::{ModelStatus, ReportKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ModelInventory - 模型主数据
// ==========================================
// 对齐: model_inventory 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInventory {
    // ===== 主键 =====
    pub model_id: String, // 模型唯一标识(UUID)

    // ===== 基础信息 =====
    pub model_name: String,        // 模型名称
    pub model_type: String,        // 模型类型(PD/LGD/EAD等,开放集合)
    pub segment: Option<String>,   // 适用客群/细分
    pub status: ModelStatus,       // 生命周期状态
    pub business_unit: String,     // 责任业务单元
    pub description: Option<String>, // 模型说明

    // ===== 技术文档版本计数器 =====
    // 红线: 只增不减,删除文档不回收版本号
    pub guide_revision_seq: i64,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 记录创建时间
    pub updated_at: DateTime<Utc>, // 记录更新时间
}

// ==========================================
// TechnicalGuide - 技术文档
// ==========================================
// 版本号由注册中心分配,同一模型内单调递增、永不复用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalGuide {
    pub guide_id: String,            // 文档唯一标识(UUID)
    pub model_id: String,            // 所属模型(FK)
    pub title: String,               // 文档标题
    pub content_ref: Option<String>, // 内容引用(文档库路径等)
    pub section_type: Option<String>, // 章节类型(methodology/query/note等)
    pub revision: i64,               // 版本号(注册中心分配)
    pub created_at: DateTime<Utc>,   // 记录创建时间
}

// ==========================================
// ValidationReport - 验证报告
// ==========================================
// 红线: 只增不改(append-only),仅允许删除
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub report_id: String,         // 报告唯一标识(UUID)
    pub model_id: String,          // 所属模型(FK)
    pub report_date: NaiveDate,    // 报告日期
    pub outcome: String,           // 验证结论
    pub report_kind: ReportKind,   // 报告方向(INCOMING/OUTGOING)
    pub created_at: DateTime<Utc>, // 记录创建时间
}

// ==========================================
// GiniRecord - Gini 系数记录
// ==========================================
// 约束: coefficient ∈ [-1, 1],越界在创建时拒绝,永不静默截断
// 同一模型按 measured_on 排序;日期相同时以最后插入者为最新
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiniRecord {
    pub record_id: String,         // 记录唯一标识(UUID)
    pub model_id: String,          // 所属模型(FK)
    pub measured_on: NaiveDate,    // 测量日期
    pub coefficient: f64,          // Gini 系数
    pub sample_size: Option<i64>,  // 样本量
    pub created_at: DateTime<Utc>, // 记录创建时间
}

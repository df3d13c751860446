// ==========================================
// 信用评分模型治理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换Repository错误为用户友好的错误消息
// 分类: ValidationError(调用方输入错误,不重试) / NotFound(引用实体缺失)
//       / Conflict(唯一约束等冲突) / StoreError(存储故障,调用方可退避重试)
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含足够上下文(实体类型、标识、违反的约束)
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 调用方错误
    // ==========================================
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("资源冲突: {0}")]
    Conflict(String),

    // ==========================================
    // 存储错误(含超时,本层不自动重试)
    // ==========================================
    #[error("存储错误: {0}")]
    StoreError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::Conflict(msg),
            RepositoryError::ForeignKeyViolation(msg) => ApiError::Conflict(msg),
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::ValidationError(format!("字段 {} 无效: {}", field, message))
            }
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::LockError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::StoreError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(e) => ApiError::Other(e),
        }
    }
}

/// API层结果类型别名
pub type ApiResult<T> = Result<T, ApiError>;

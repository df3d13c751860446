// ==========================================
// 信用评分模型治理系统 - 输入校验器
// ==========================================
// 职责: API 层入参校验,所有违规带字段上下文返回 ValidationError
// 红线: Gini 系数越界一律拒绝,永不静默截断
// ==========================================

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};

/// 校验必填文本字段非空,返回去除首尾空白后的值
pub fn require_text(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::ValidationError(format!("字段 {} 不能为空", field)));
    }
    Ok(trimmed.to_string())
}

/// 校验 Gini 系数在闭区间 [-1, 1] 内
pub fn require_gini_coefficient(value: f64) -> ApiResult<()> {
    if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
        return Err(ApiError::ValidationError(format!(
            "Gini 系数 {} 越界,合法区间 [-1, 1]",
            value
        )));
    }
    Ok(())
}

/// 解析日期字段(ISO 格式 YYYY-MM-DD)
pub fn parse_date(field: &str, value: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ApiError::ValidationError(format!("字段 {} 不是合法日期: {}", field, value))
    })
}

/// 解析可选日期字段
pub fn parse_optional_date(field: &str, value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match value {
        Some(s) => Ok(Some(parse_date(field, s)?)),
        None => Ok(None),
    }
}

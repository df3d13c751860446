// ==========================================
// DashboardApi 集成测试
// ==========================================
// 测试范围:
// 1. 概要统计(模型/项目计数)
// 2. 模型类型分布
// 3. Gini 总览的当前值与趋势方向
// 4. 开发进度完成比
// ==========================================

mod test_helpers;

use model_governance::api::{CreateModelRequest, CreateProjectRequest};
use model_governance::domain::types::{GiniTrend, ProgressStatus};
use test_helpers::ApiTestEnv;

fn model_request(name: &str, model_type: &str, status: Option<&str>) -> CreateModelRequest {
    CreateModelRequest {
        model_name: name.to_string(),
        model_type: model_type.to_string(),
        business_unit: "零售风险部".to_string(),
        segment: None,
        status: status.map(|s| s.to_string()),
        description: None,
    }
}

fn project_request(name: &str) -> CreateProjectRequest {
    CreateProjectRequest {
        project_name: name.to_string(),
        target_model_type: "PD".to_string(),
        segment: None,
        priority: None,
        description: None,
        target_end_date: None,
    }
}

// ==========================================
// 概要统计测试
// ==========================================

#[test]
fn test_概要统计_空库全零() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let summary = env.dashboard_api.get_summary().expect("查询失败");
    assert_eq!(summary.models.total, 0);
    assert_eq!(summary.development.total_projects, 0);
}

#[test]
fn test_概要统计_按状态计数() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.model_api
        .create_model(model_request("零售PD模型", "PD", None))
        .expect("创建失败");
    env.model_api
        .create_model(model_request("对公LGD模型", "LGD", Some("UNDER_REVIEW")))
        .expect("创建失败");
    env.model_api
        .create_model(model_request("旧版PD模型", "PD", Some("RETIRED")))
        .expect("创建失败");

    // 一个未开始项目 + 一个进行中项目
    env.development_api
        .create_project(project_request("对公LGD重构"))
        .expect("创建失败");
    let p2 = env
        .development_api
        .create_project(project_request("新一代行为评分卡"))
        .expect("创建失败");
    let stage = env
        .development_api
        .create_stage(&p2.project_id, "数据准备", 1, None)
        .expect("创建失败");
    let task = env
        .development_api
        .create_task(&stage.stage_id, "拉取建模样本", None, None)
        .expect("创建失败");
    env.development_api
        .create_task(&stage.stage_id, "字段质检", None, None)
        .expect("创建失败");
    env.development_api.toggle_task(&task.task_id, true).expect("切换失败");

    let summary = env.dashboard_api.get_summary().expect("查询失败");
    assert_eq!(summary.models.total, 3);
    assert_eq!(summary.models.active, 1);
    assert_eq!(summary.models.under_review, 1);
    assert_eq!(summary.models.retired, 1);
    assert_eq!(summary.development.total_projects, 2);
    assert_eq!(summary.development.not_started, 1);
    assert_eq!(summary.development.in_progress, 1);
    assert_eq!(summary.development.completed, 0);
    assert_eq!(summary.development.overdue_stages, 0, "无截止日期不算逾期");
}

#[test]
fn test_概要统计_逾期阶段计数() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let project = env
        .development_api
        .create_project(project_request("新一代行为评分卡"))
        .expect("创建失败");
    // 四个阶段: 逾期未完成(计) / 逾期已完成(不计) / 未到期(不计) / 无截止(不计)
    env.development_api
        .create_stage(&project.project_id, "数据准备", 1, Some("2020-01-01"))
        .expect("创建失败");
    let done_stage = env
        .development_api
        .create_stage(&project.project_id, "建模", 2, Some("2020-06-30"))
        .expect("创建失败");
    env.development_api
        .create_stage(&project.project_id, "验证", 3, Some("2099-12-31"))
        .expect("创建失败");
    env.development_api
        .create_stage(&project.project_id, "上线", 4, None)
        .expect("创建失败");

    let task = env
        .development_api
        .create_task(&done_stage.stage_id, "变量分箱", None, None)
        .expect("创建失败");
    env.development_api.toggle_task(&task.task_id, true).expect("切换失败");

    let summary = env.dashboard_api.get_summary().expect("查询失败");
    assert_eq!(summary.development.overdue_stages, 1, "只计逾期且未完成的阶段");
}

// ==========================================
// 类型分布测试
// ==========================================

#[test]
fn test_模型类型分布() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.model_api
        .create_model(model_request("零售PD模型", "PD", None))
        .expect("创建失败");
    env.model_api
        .create_model(model_request("小微PD模型", "PD", None))
        .expect("创建失败");
    env.model_api
        .create_model(model_request("对公LGD模型", "LGD", None))
        .expect("创建失败");

    let counts = env.dashboard_api.get_model_types().expect("查询失败");
    assert_eq!(counts.len(), 2);
    let pd = counts.iter().find(|c| c.model_type == "PD").expect("缺少PD");
    assert_eq!(pd.count, 2);
    let lgd = counts.iter().find(|c| c.model_type == "LGD").expect("缺少LGD");
    assert_eq!(lgd.count, 1);
}

// ==========================================
// Gini 总览测试
// ==========================================

#[test]
fn test_gini总览_四种趋势() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    // UP: 0.40 → 0.45
    let up = env
        .model_api
        .create_model(model_request("上行模型", "PD", None))
        .expect("创建失败");
    env.model_api
        .add_gini_record(&up.model_id, "2025-03-31", 0.40, None)
        .expect("创建失败");
    env.model_api
        .add_gini_record(&up.model_id, "2025-06-30", 0.45, None)
        .expect("创建失败");

    // DOWN: 0.45 → 0.38
    let down = env
        .model_api
        .create_model(model_request("下行模型", "PD", None))
        .expect("创建失败");
    env.model_api
        .add_gini_record(&down.model_id, "2025-03-31", 0.45, None)
        .expect("创建失败");
    env.model_api
        .add_gini_record(&down.model_id, "2025-06-30", 0.38, None)
        .expect("创建失败");

    // FLAT: 仅一条记录
    let flat = env
        .model_api
        .create_model(model_request("单点模型", "LGD", None))
        .expect("创建失败");
    env.model_api
        .add_gini_record(&flat.model_id, "2025-06-30", 0.50, None)
        .expect("创建失败");

    // NO_DATA: 无记录
    let empty = env
        .model_api
        .create_model(model_request("新建模型", "EAD", None))
        .expect("创建失败");

    let overview = env.dashboard_api.get_gini_overview().expect("查询失败");
    assert_eq!(overview.len(), 4);

    let find = |id: &str| overview.iter().find(|i| i.model_id == id).expect("缺少总览项");
    let up_item = find(&up.model_id);
    assert_eq!(up_item.trend, GiniTrend::Up);
    assert_eq!(up_item.current_gini, Some(0.45));
    assert_eq!(find(&down.model_id).trend, GiniTrend::Down);
    assert_eq!(find(&flat.model_id).trend, GiniTrend::Flat);
    let empty_item = find(&empty.model_id);
    assert_eq!(empty_item.trend, GiniTrend::NoData);
    assert_eq!(empty_item.current_gini, None);
}

#[test]
fn test_gini总览_两条等值为持平() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let model = env
        .model_api
        .create_model(model_request("零售PD模型", "PD", None))
        .expect("创建失败");
    env.model_api
        .add_gini_record(&model.model_id, "2025-03-31", 0.42, None)
        .expect("创建失败");
    env.model_api
        .add_gini_record(&model.model_id, "2025-06-30", 0.42, None)
        .expect("创建失败");

    let overview = env.dashboard_api.get_gini_overview().expect("查询失败");
    assert_eq!(overview[0].trend, GiniTrend::Flat);
}

// ==========================================
// 开发进度测试
// ==========================================

#[test]
fn test_开发进度_完成比() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    // 4 个阶段,完成 1 个 → 0.25
    let project = env
        .development_api
        .create_project(project_request("新一代行为评分卡"))
        .expect("创建失败");
    let mut stage_ids = Vec::new();
    for (i, name) in ["数据准备", "建模", "验证", "上线"].iter().enumerate() {
        let stage = env
            .development_api
            .create_stage(&project.project_id, name, (i + 1) as i32, None)
            .expect("创建失败");
        stage_ids.push(stage.stage_id);
    }
    let task = env
        .development_api
        .create_task(&stage_ids[0], "拉取建模样本", None, None)
        .expect("创建失败");
    env.development_api.toggle_task(&task.task_id, true).expect("切换失败");

    // 零阶段项目 → 0.0
    let empty = env
        .development_api
        .create_project(project_request("对公LGD重构"))
        .expect("创建失败");

    let progress = env
        .dashboard_api
        .get_development_progress()
        .expect("查询失败");
    assert_eq!(progress.len(), 2);

    let item = progress
        .iter()
        .find(|p| p.project_id == project.project_id)
        .expect("缺少进度项");
    assert_eq!(item.total_stages, 4);
    assert_eq!(item.completed_stages, 1);
    assert!((item.progress_ratio - 0.25).abs() < f64::EPSILON);
    assert_eq!(item.status, ProgressStatus::InProgress);

    let empty_item = progress
        .iter()
        .find(|p| p.project_id == empty.project_id)
        .expect("缺少进度项");
    assert_eq!(empty_item.total_stages, 0);
    assert_eq!(empty_item.progress_ratio, 0.0);
    assert_eq!(empty_item.status, ProgressStatus::NotStarted);
}

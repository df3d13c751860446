// ==========================================
// 演示数据生成器
// ==========================================
// 用途: 向指定数据库写入一套演示数据(模型/Gini历史/开发项目)
// 用法: seed_demo_data [数据库路径]  缺省 model_governance.db
// ==========================================

use std::env;

use anyhow::Result;
use tracing::info;

use model_governance::api::{CreateModelRequest, CreateProjectRequest};
use model_governance::app::AppState;

/// 演示模型: (名称, 类型, 细分, 状态, Gini季度序列)
const DEMO_MODELS: &[(&str, &str, &str, Option<&str>, &[(&str, f64)])] = &[
    (
        "零售现金贷申请评分卡",
        "PD",
        "零售-现金贷",
        None,
        &[
            ("2024-09-30", 0.41),
            ("2024-12-31", 0.43),
            ("2025-03-31", 0.42),
            ("2025-06-30", 0.45),
        ],
    ),
    (
        "信用卡行为评分模型",
        "PD",
        "零售-信用卡",
        None,
        &[
            ("2024-12-31", 0.52),
            ("2025-03-31", 0.50),
            ("2025-06-30", 0.47),
        ],
    ),
    (
        "对公中型企业LGD模型",
        "LGD",
        "对公-中型企业",
        Some("UNDER_REVIEW"),
        &[("2025-06-30", 0.38)],
    ),
    ("小微企业EAD模型", "EAD", "小微", None, &[]),
    (
        "旧版零售申请评分卡",
        "PD",
        "零售-现金贷",
        Some("RETIRED"),
        &[("2023-12-31", 0.36)],
    ),
];

/// 演示项目: (名称, 目标类型, 优先级, 阶段 → 任务与完成标记)
const DEMO_PROJECTS: &[(&str, &str, &str, &[(&str, &[(&str, bool)])])] = &[
    (
        "新一代行为评分卡开发",
        "PD",
        "HIGH",
        &[
            (
                "数据准备",
                &[("拉取建模样本", true), ("字段质检", true)],
            ),
            (
                "变量加工与建模",
                &[("变量分箱", true), ("模型训练与调参", false)],
            ),
            ("独立验证", &[("验证报告初稿", false)]),
        ],
    ),
    (
        "对公LGD模型重构",
        "LGD",
        "MEDIUM",
        &[("立项与数据盘点", &[("历史违约清单盘点", false)])],
    ),
];

fn main() -> Result<()> {
    model_governance::logging::init();

    let db_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "model_governance.db".to_string());
    info!(db_path = %db_path, "开始写入演示数据");

    let state = AppState::new(&db_path)?;

    // ===== 模型与 Gini 历史 =====
    for (name, model_type, segment, status, gini_series) in DEMO_MODELS {
        let model = state.model_api.create_model(CreateModelRequest {
            model_name: name.to_string(),
            model_type: model_type.to_string(),
            business_unit: "风险管理部".to_string(),
            segment: Some(segment.to_string()),
            status: status.map(|s| s.to_string()),
            description: None,
        })?;
        state
            .model_api
            .add_guide(&model.model_id, "模型开发文档", None, Some("development"))?;
        for (measured_on, coefficient) in *gini_series {
            state
                .model_api
                .add_gini_record(&model.model_id, measured_on, *coefficient, Some(50_000))?;
        }
        info!(model = %model.model_name, gini_records = gini_series.len(), "模型已写入");
    }

    // ===== 开发项目 =====
    let owner = state.development_api.create_owner("王建国", Some("wangjg@bank.example"))?;
    for (name, target_type, priority, stages) in DEMO_PROJECTS {
        let project = state.development_api.create_project(CreateProjectRequest {
            project_name: name.to_string(),
            target_model_type: target_type.to_string(),
            segment: None,
            priority: Some(priority.to_string()),
            description: None,
            target_end_date: Some("2026-06-30".to_string()),
        })?;
        for (i, (stage_name, tasks)) in stages.iter().enumerate() {
            let stage = state.development_api.create_stage(
                &project.project_id,
                stage_name,
                (i + 1) as i32,
                None,
            )?;
            for (description, done) in *tasks {
                let task = state.development_api.create_task(
                    &stage.stage_id,
                    description,
                    Some(owner.owner_id.as_str()),
                    None,
                )?;
                if *done {
                    state.development_api.toggle_task(&task.task_id, true)?;
                }
            }
        }
        info!(project = %project.project_name, stages = stages.len(), "开发项目已写入");
    }

    let summary = state.dashboard_api.get_summary()?;
    info!(
        models = summary.models.total,
        projects = summary.development.total_projects,
        "演示数据写入完成"
    );
    Ok(())
}

// ==========================================
// Repository 层集成测试
// ==========================================
// 测试范围:
// 1. 仓储 CRUD 与错误映射(NotFound/外键冲突)
// 2. 级联删除失败时的整体回滚
// 3. 最新 Gini 查询的排序语义
// 4. 聚合计数查询
// ==========================================

mod test_helpers;

use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use model_governance::domain::development::{DevelopmentProject, StageTask};
use model_governance::domain::model::{GiniRecord, ModelInventory};
use model_governance::domain::types::{ModelStatus, Priority, ProgressStatus};
use model_governance::repository::development_repo::{
    DevelopmentProjectRepository, DevelopmentStageRepository, StageTaskRepository,
};
use model_governance::repository::error::RepositoryError;
use model_governance::repository::model_repo::{GiniRecordRepository, ModelInventoryRepository};
use test_helpers::create_test_db;

fn test_model(name: &str, model_type: &str) -> ModelInventory {
    let now = Utc::now();
    ModelInventory {
        model_id: Uuid::new_v4().to_string(),
        model_name: name.to_string(),
        model_type: model_type.to_string(),
        segment: None,
        status: ModelStatus::Active,
        business_unit: "零售风险部".to_string(),
        description: None,
        guide_revision_seq: 0,
        created_at: now,
        updated_at: now,
    }
}

fn test_project(name: &str) -> DevelopmentProject {
    let now = Utc::now();
    DevelopmentProject {
        project_id: Uuid::new_v4().to_string(),
        project_name: name.to_string(),
        target_model_type: "PD".to_string(),
        segment: None,
        priority: Priority::Medium,
        description: None,
        target_end_date: None,
        status: ProgressStatus::NotStarted,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_模型仓储_crud基础路径() {
    let (_temp, db_path) = create_test_db().expect("无法创建测试数据库");
    let repo = ModelInventoryRepository::new(&db_path).expect("无法创建仓储");

    let mut model = test_model("零售PD模型", "PD");
    repo.create(&model).expect("创建失败");

    let found = repo.find_by_id(&model.model_id).expect("查询失败");
    assert_eq!(found.as_ref().map(|m| m.model_name.as_str()), Some("零售PD模型"));

    model.status = ModelStatus::Retired;
    repo.update(&model).expect("更新失败");
    let found = repo.find_by_id(&model.model_id).expect("查询失败").unwrap();
    assert_eq!(found.status, ModelStatus::Retired);

    let missing = repo.find_by_id("no-such-id").expect("查询失败");
    assert!(missing.is_none());
}

#[test]
fn test_模型仓储_更新不存在返回notfound() {
    let (_temp, db_path) = create_test_db().expect("无法创建测试数据库");
    let repo = ModelInventoryRepository::new(&db_path).expect("无法创建仓储");

    let model = test_model("零售PD模型", "PD");
    let result = repo.update(&model);
    assert!(matches!(result, Err(RepositoryError::NotFound { .. })));

    let result = repo.delete_cascade(&model.model_id);
    assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
}

#[test]
fn test_级联删除失败_子表回滚() {
    let (_temp, db_path) = create_test_db().expect("无法创建测试数据库");
    let conn = Arc::new(Mutex::new(
        model_governance::db::open_sqlite_connection(&db_path).expect("无法打开数据库"),
    ));
    let model_repo = ModelInventoryRepository::from_connection(conn.clone());
    let gini_repo = GiniRecordRepository::from_connection(conn.clone());

    let model = test_model("零售PD模型", "PD");
    model_repo.create(&model).expect("创建失败");
    let record = GiniRecord {
        record_id: Uuid::new_v4().to_string(),
        model_id: model.model_id.clone(),
        measured_on: "2025-06-30".parse().unwrap(),
        coefficient: 0.42,
        sample_size: None,
        created_at: Utc::now(),
    };
    gini_repo.create(&record).expect("创建失败");

    // 删一个不存在的模型: 事务回滚,已有数据原样保留
    let result = model_repo.delete_cascade("no-such-id");
    assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    let history = gini_repo.find_by_model(&model.model_id).expect("查询失败");
    assert_eq!(history.len(), 1, "回滚后已有记录不受影响");
}

#[test]
fn test_任务外键_责任人不存在() {
    let (_temp, db_path) = create_test_db().expect("无法创建测试数据库");
    let conn = Arc::new(Mutex::new(
        model_governance::db::open_sqlite_connection(&db_path).expect("无法打开数据库"),
    ));
    let project_repo = DevelopmentProjectRepository::from_connection(conn.clone());
    let stage_repo = DevelopmentStageRepository::from_connection(conn.clone());
    let task_repo = StageTaskRepository::from_connection(conn.clone());

    let project = test_project("新一代行为评分卡");
    project_repo.create(&project).expect("创建失败");
    let stage = stage_repo
        .insert_at(&project.project_id, "数据准备", 1, None)
        .expect("创建失败");

    // owner_id 指向不存在的责任人,外键约束拦截
    let task = StageTask {
        task_id: Uuid::new_v4().to_string(),
        stage_id: stage.stage_id.clone(),
        description: "拉取建模样本".to_string(),
        owner_id: Some("ghost-owner".to_string()),
        is_completed: false,
        due_date: None,
        created_at: Utc::now(),
    };
    let result = task_repo.create(&task);
    assert!(matches!(result, Err(RepositoryError::ForeignKeyViolation(_))));
}

#[test]
fn test_阶段插入_越界为字段错误() {
    let (_temp, db_path) = create_test_db().expect("无法创建测试数据库");
    let conn = Arc::new(Mutex::new(
        model_governance::db::open_sqlite_connection(&db_path).expect("无法打开数据库"),
    ));
    let project_repo = DevelopmentProjectRepository::from_connection(conn.clone());
    let stage_repo = DevelopmentStageRepository::from_connection(conn.clone());

    let project = test_project("新一代行为评分卡");
    project_repo.create(&project).expect("创建失败");

    let result = stage_repo.insert_at(&project.project_id, "建模", 2, None);
    assert!(matches!(result, Err(RepositoryError::FieldValueError { .. })));
}

#[test]
fn test_最新gini_排序语义() {
    let (_temp, db_path) = create_test_db().expect("无法创建测试数据库");
    let conn = Arc::new(Mutex::new(
        model_governance::db::open_sqlite_connection(&db_path).expect("无法打开数据库"),
    ));
    let model_repo = ModelInventoryRepository::from_connection(conn.clone());
    let gini_repo = GiniRecordRepository::from_connection(conn.clone());

    let model = test_model("零售PD模型", "PD");
    model_repo.create(&model).expect("创建失败");

    // 同日两条 + 更早一条
    for (date, coefficient) in [("2025-06-30", 0.40), ("2025-06-30", 0.55), ("2025-03-31", 0.70)] {
        let record = GiniRecord {
            record_id: Uuid::new_v4().to_string(),
            model_id: model.model_id.clone(),
            measured_on: date.parse().unwrap(),
            coefficient,
            sample_size: None,
            created_at: Utc::now(),
        };
        gini_repo.create(&record).expect("创建失败");
    }

    let latest = gini_repo.find_latest(&model.model_id, 2).expect("查询失败");
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].coefficient, 0.55, "同日并列取最后插入");
    assert_eq!(latest[1].coefficient, 0.40);
}

#[test]
fn test_损坏的时间列_查询报错不兜底() {
    let (_temp, db_path) = create_test_db().expect("无法创建测试数据库");

    // 绕过仓储直接写入损坏的时间值
    let conn = model_governance::db::open_sqlite_connection(&db_path).expect("无法打开数据库");
    conn.execute(
        r#"
        INSERT INTO model_inventory (
            model_id, model_name, model_type, status, business_unit,
            guide_revision_seq, created_at, updated_at
        ) VALUES ('m-corrupt', '坏数据模型', 'PD', 'ACTIVE', '零售风险部', 0, '不是时间', '不是时间')
        "#,
        [],
    )
    .expect("插入失败");
    drop(conn);

    let repo = ModelInventoryRepository::new(&db_path).expect("无法创建仓储");
    let result = repo.find_by_id("m-corrupt");
    assert!(
        matches!(result, Err(RepositoryError::DatabaseQueryError(_))),
        "损坏数据应报错而非回退默认值"
    );
}

#[test]
fn test_聚合计数查询() {
    let (_temp, db_path) = create_test_db().expect("无法创建测试数据库");
    let repo = ModelInventoryRepository::new(&db_path).expect("无法创建仓储");

    repo.create(&test_model("零售PD模型", "PD")).expect("创建失败");
    repo.create(&test_model("小微PD模型", "PD")).expect("创建失败");
    let mut retired = test_model("旧版LGD模型", "LGD");
    retired.status = ModelStatus::Retired;
    repo.create(&retired).expect("创建失败");

    assert_eq!(repo.count_all().expect("查询失败"), 3);

    let by_status = repo.count_by_status().expect("查询失败");
    assert!(by_status.contains(&("ACTIVE".to_string(), 2)));
    assert!(by_status.contains(&("RETIRED".to_string(), 1)));

    let by_type = repo.count_by_type().expect("查询失败");
    assert!(by_type.contains(&("PD".to_string(), 2)));
    assert!(by_type.contains(&("LGD".to_string(), 1)));
}

// ==========================================
// 信用评分模型治理系统 - 开发跟踪器 API
// ==========================================
// 职责: 开发项目/阶段/任务/责任人的生命周期管理
// 红线: 阶段与项目状态为派生状态,本层永不接受调用方直接设置
// 红线: 删除责任人只清空任务引用,不删任务
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator;
use crate::domain::development::{
    DevelopmentProject, DevelopmentStage, StageTask, TaskOwner,
};
use crate::domain::types::{Priority, ProgressStatus};
use crate::repository::development_repo::{
    DevelopmentProjectRepository, DevelopmentStageRepository, StageTaskRepository,
    TaskOwnerRepository,
};

// ==========================================
// 请求 DTO
// ==========================================

/// 创建开发项目请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub project_name: String,
    pub target_model_type: String,
    pub segment: Option<String>,
    pub priority: Option<String>,
    pub description: Option<String>,
    pub target_end_date: Option<String>,
}

/// 更新开发项目请求(None 表示不变;不含 status,状态只能派生)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    pub project_name: Option<String>,
    pub target_model_type: Option<String>,
    pub segment: Option<String>,
    pub priority: Option<String>,
    pub description: Option<String>,
    pub target_end_date: Option<String>,
}

// ==========================================
// DevelopmentApi - 开发跟踪器
// ==========================================

/// 开发跟踪器API
///
/// 职责:
/// 1. 项目 CRUD 与过滤查询
/// 2. 阶段插入/移动/删除(position 连续性由仓储层事务保证)
/// 3. 任务管理与完成状态切换(幂等)
/// 4. 责任人管理(删除时清空任务引用)
pub struct DevelopmentApi {
    project_repo: Arc<DevelopmentProjectRepository>,
    stage_repo: Arc<DevelopmentStageRepository>,
    task_repo: Arc<StageTaskRepository>,
    owner_repo: Arc<TaskOwnerRepository>,
}

impl DevelopmentApi {
    /// 创建新的DevelopmentApi实例
    pub fn new(
        project_repo: Arc<DevelopmentProjectRepository>,
        stage_repo: Arc<DevelopmentStageRepository>,
        task_repo: Arc<StageTaskRepository>,
        owner_repo: Arc<TaskOwnerRepository>,
    ) -> Self {
        Self {
            project_repo,
            stage_repo,
            task_repo,
            owner_repo,
        }
    }

    /// 确认项目存在,否则返回 NotFound
    fn require_project(&self, project_id: &str) -> ApiResult<DevelopmentProject> {
        self.project_repo
            .find_by_id(project_id)?
            .ok_or_else(|| ApiError::NotFound(format!("开发项目(id={})不存在", project_id)))
    }

    /// 确认阶段存在,否则返回 NotFound
    fn require_stage(&self, stage_id: &str) -> ApiResult<DevelopmentStage> {
        self.stage_repo
            .find_by_id(stage_id)?
            .ok_or_else(|| ApiError::NotFound(format!("开发阶段(id={})不存在", stage_id)))
    }

    /// 确认责任人存在,否则返回 NotFound
    fn require_owner(&self, owner_id: &str) -> ApiResult<TaskOwner> {
        self.owner_repo
            .find_by_id(owner_id)?
            .ok_or_else(|| ApiError::NotFound(format!("责任人(id={})不存在", owner_id)))
    }

    // ==========================================
    // 开发项目
    // ==========================================

    /// 创建开发项目(初始无阶段,派生状态为 NOT_STARTED)
    pub fn create_project(&self, req: CreateProjectRequest) -> ApiResult<DevelopmentProject> {
        let project_name = validator::require_text("project_name", &req.project_name)?;
        let target_model_type =
            validator::require_text("target_model_type", &req.target_model_type)?;
        let target_end_date =
            validator::parse_optional_date("target_end_date", req.target_end_date.as_deref())?;

        let now = Utc::now();
        let project = DevelopmentProject {
            project_id: Uuid::new_v4().to_string(),
            project_name,
            target_model_type,
            segment: req.segment,
            priority: req
                .priority
                .as_deref()
                .map(Priority::from_db_str)
                .unwrap_or_default(),
            description: req.description,
            target_end_date,
            status: ProgressStatus::NotStarted,
            created_at: now,
            updated_at: now,
        };
        self.project_repo.create(&project)?;
        info!(project_id = %project.project_id, "开发项目已创建");
        Ok(project)
    }

    /// 查询单个项目
    pub fn get_project(&self, project_id: &str) -> ApiResult<DevelopmentProject> {
        self.require_project(project_id)
    }

    /// 更新项目可变字段(状态为派生字段,不可更新)
    pub fn update_project(
        &self,
        project_id: &str,
        req: UpdateProjectRequest,
    ) -> ApiResult<DevelopmentProject> {
        let mut project = self.require_project(project_id)?;
        if let Some(name) = req.project_name {
            project.project_name = validator::require_text("project_name", &name)?;
        }
        if let Some(t) = req.target_model_type {
            project.target_model_type = validator::require_text("target_model_type", &t)?;
        }
        if let Some(p) = req.priority.as_deref() {
            project.priority = Priority::from_db_str(p);
        }
        if req.segment.is_some() {
            project.segment = req.segment;
        }
        if req.description.is_some() {
            project.description = req.description;
        }
        if let Some(d) = req.target_end_date.as_deref() {
            project.target_end_date = Some(validator::parse_date("target_end_date", d)?);
        }
        self.project_repo.update(&project)?;
        debug!(project_id = %project_id, "开发项目已更新");
        Ok(project)
    }

    /// 删除项目(级联删除阶段与任务,单事务)
    pub fn delete_project(&self, project_id: &str) -> ApiResult<()> {
        self.project_repo.delete_cascade(project_id)?;
        info!(project_id = %project_id, "开发项目及其阶段/任务已级联删除");
        Ok(())
    }

    /// 查询项目列表
    ///
    /// # 参数
    /// - `status`: 可选派生状态过滤(非法值返回 ValidationError)
    /// - `model_type`: 可选目标模型类型过滤
    pub fn list_projects(
        &self,
        status: Option<&str>,
        model_type: Option<&str>,
    ) -> ApiResult<Vec<DevelopmentProject>> {
        let status = match status {
            Some(s) => Some(ProgressStatus::from_db_str(s).ok_or_else(|| {
                ApiError::ValidationError(format!("未知的进度状态: {}", s))
            })?),
            None => None,
        };
        Ok(self.project_repo.list(status, model_type)?)
    }

    // ==========================================
    // 开发阶段
    // ==========================================

    /// 在指定位置插入阶段,后续阶段整体后移
    ///
    /// # 失败
    /// - NotFound: 项目不存在
    /// - ValidationError: 名称为空或位置越界 [1, 阶段数+1]
    pub fn create_stage(
        &self,
        project_id: &str,
        stage_name: &str,
        position: i32,
        deadline: Option<&str>,
    ) -> ApiResult<DevelopmentStage> {
        let stage_name = validator::require_text("stage_name", stage_name)?;
        let deadline = validator::parse_optional_date("deadline", deadline)?;
        self.require_project(project_id)?;

        let stage = self
            .stage_repo
            .insert_at(project_id, &stage_name, position, deadline)?;
        debug!(project_id = %project_id, position = position, "开发阶段已插入");
        Ok(stage)
    }

    /// 更新阶段可变字段(名称/截止日期)
    pub fn update_stage(
        &self,
        stage_id: &str,
        stage_name: Option<&str>,
        deadline: Option<Option<&str>>,
    ) -> ApiResult<DevelopmentStage> {
        let stage_name = stage_name
            .map(|name| validator::require_text("stage_name", name))
            .transpose()?;
        let deadline = match deadline {
            Some(Some(d)) => Some(Some(validator::parse_date("deadline", d)?)),
            Some(None) => Some(None),
            None => None,
        };
        self.require_stage(stage_id)?;
        Ok(self.stage_repo.update(stage_id, stage_name.as_deref(), deadline)?)
    }

    /// 移动阶段到新位置,其余阶段重排保持 1..N 连续
    pub fn move_stage(&self, stage_id: &str, new_position: i32) -> ApiResult<()> {
        self.stage_repo.move_to(stage_id, new_position)?;
        debug!(stage_id = %stage_id, new_position = new_position, "开发阶段已移动");
        Ok(())
    }

    /// 删除阶段及其任务,后续位置压缩保持连续
    pub fn delete_stage(&self, stage_id: &str) -> ApiResult<()> {
        self.stage_repo.delete_and_compact(stage_id)?;
        debug!(stage_id = %stage_id, "开发阶段已删除并压缩位置");
        Ok(())
    }

    /// 查询项目的阶段列表(按 position 升序)
    pub fn list_stages(&self, project_id: &str) -> ApiResult<Vec<DevelopmentStage>> {
        self.require_project(project_id)?;
        Ok(self.stage_repo.find_by_project(project_id)?)
    }

    // ==========================================
    // 阶段任务
    // ==========================================

    /// 创建任务(初始未完成)并重算派生状态
    ///
    /// # 失败
    /// - NotFound: 阶段不存在,或指定的责任人不存在
    /// - ValidationError: 描述为空或日期非法
    pub fn create_task(
        &self,
        stage_id: &str,
        description: &str,
        owner_id: Option<&str>,
        due_date: Option<&str>,
    ) -> ApiResult<StageTask> {
        let description = validator::require_text("description", description)?;
        let due_date = validator::parse_optional_date("due_date", due_date)?;
        self.require_stage(stage_id)?;
        if let Some(owner_id) = owner_id {
            self.require_owner(owner_id)?;
        }

        let task = StageTask {
            task_id: Uuid::new_v4().to_string(),
            stage_id: stage_id.to_string(),
            description,
            owner_id: owner_id.map(|s| s.to_string()),
            is_completed: false,
            due_date,
            created_at: Utc::now(),
        };
        self.task_repo.create(&task)?;
        debug!(stage_id = %stage_id, task_id = %task.task_id, "任务已创建");
        Ok(task)
    }

    /// 更新任务可变字段
    ///
    /// # 参数
    /// - `owner_id`: 外层 None 表示不变,Some(None) 表示清空引用
    /// - `due_date`: 同上
    pub fn update_task(
        &self,
        task_id: &str,
        description: Option<&str>,
        owner_id: Option<Option<&str>>,
        due_date: Option<Option<&str>>,
    ) -> ApiResult<StageTask> {
        let description = description
            .map(|d| validator::require_text("description", d))
            .transpose()?;
        if let Some(Some(owner_id)) = owner_id {
            self.require_owner(owner_id)?;
        }
        let due_date = match due_date {
            Some(Some(d)) => Some(Some(validator::parse_date("due_date", d)?)),
            Some(None) => Some(None),
            None => None,
        };
        Ok(self
            .task_repo
            .update(task_id, description.as_deref(), owner_id, due_date)?)
    }

    /// 切换任务完成状态(幂等)并重算阶段/项目派生状态
    ///
    /// 设置为当前值时为空操作,仍返回成功
    pub fn toggle_task(&self, task_id: &str, done: bool) -> ApiResult<StageTask> {
        let task = self.task_repo.set_completion(task_id, done)?;
        debug!(task_id = %task_id, done = done, "任务完成状态已设置");
        Ok(task)
    }

    /// 删除任务并重算派生状态
    pub fn delete_task(&self, task_id: &str) -> ApiResult<()> {
        self.task_repo.delete(task_id)?;
        Ok(())
    }

    /// 查询阶段的任务列表(按创建顺序)
    pub fn list_tasks(&self, stage_id: &str) -> ApiResult<Vec<StageTask>> {
        self.require_stage(stage_id)?;
        Ok(self.task_repo.find_by_stage(stage_id)?)
    }

    // ==========================================
    // 任务责任人
    // ==========================================

    /// 创建责任人
    pub fn create_owner(&self, owner_name: &str, contact: Option<&str>) -> ApiResult<TaskOwner> {
        let owner_name = validator::require_text("owner_name", owner_name)?;
        let owner = TaskOwner {
            owner_id: Uuid::new_v4().to_string(),
            owner_name,
            contact: contact.map(|s| s.to_string()),
            created_at: Utc::now(),
        };
        self.owner_repo.create(&owner)?;
        Ok(owner)
    }

    /// 删除责任人,清空引用它的任务的 owner_id
    ///
    /// # 返回
    /// - Ok(usize): 被清空引用的任务数
    /// - Err(NotFound): 责任人不存在
    pub fn delete_owner(&self, owner_id: &str) -> ApiResult<usize> {
        let cleared = self.owner_repo.delete_and_clear_refs(owner_id)?;
        info!(owner_id = %owner_id, cleared = cleared, "责任人已删除,任务引用已清空");
        Ok(cleared)
    }

    /// 查询全部责任人(按创建顺序)
    pub fn list_owners(&self) -> ApiResult<Vec<TaskOwner>> {
        Ok(self.owner_repo.list_all()?)
    }
}

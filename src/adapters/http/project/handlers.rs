//! HTTP handlers for project endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::adapters::http::caller::CurrentCaller;
use crate::adapters::http::error::{parse_id, ApiError};
use crate::application::handlers::project::{
    CreateProjectCommand, CreateProjectHandler, GetProjectHandler, GetProjectQuery,
    InheritProjectBudgetCommand, InheritProjectBudgetHandler, RecalculateProjectHealthCommand,
    RecalculateProjectHealthHandler, RecordProjectSpendCommand, RecordProjectSpendHandler,
    UpdateProjectCompletionCommand, UpdateProjectCompletionHandler, UpdateProjectPhaseCommand,
    UpdateProjectPhaseHandler,
};
use crate::domain::foundation::{CompanyId, ProjectId, UserId};

use super::dto::{
    CompletionResponse, CreateProjectRequest, InheritBudgetRequest, InheritBudgetResponse,
    RecordSpendRequest, UpdateCompletionRequest, UpdatePhaseRequest,
};

#[derive(Clone)]
pub struct ProjectHandlers {
    pub create: Arc<CreateProjectHandler>,
    pub get: Arc<GetProjectHandler>,
    pub phase: Arc<UpdateProjectPhaseHandler>,
    pub completion: Arc<UpdateProjectCompletionHandler>,
    pub spend: Arc<RecordProjectSpendHandler>,
    pub inherit: Arc<InheritProjectBudgetHandler>,
    pub health: Arc<RecalculateProjectHealthHandler>,
}

/// POST /api/projects
pub async fn create_project(
    State(handlers): State<ProjectHandlers>,
    caller: CurrentCaller,
    Json(req): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CreateProjectCommand {
        name: req.name,
        customer_id: req.customer_id,
        customer_name: req.customer_name,
        company_id: req
            .company_id
            .map(CompanyId::new)
            .transpose()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        phase: req.phase,
        value: req.value,
        manager_id: req
            .manager_id
            .map(UserId::new)
            .transpose()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        description: req.description,
        start_date: req.start_date,
        end_date: req.end_date,
    };
    let project = handlers.create.handle(cmd, caller.metadata()).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(handlers): State<ProjectHandlers>,
    _caller: CurrentCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let project_id: ProjectId = parse_id(&id, "project")?;
    Ok(Json(handlers.get.handle(GetProjectQuery { project_id }).await?))
}

/// PUT /api/projects/:id/phase
pub async fn update_phase(
    State(handlers): State<ProjectHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<UpdatePhaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let project_id: ProjectId = parse_id(&id, "project")?;
    let project = handlers
        .phase
        .handle(
            UpdateProjectPhaseCommand {
                project_id,
                phase: req.phase,
            },
            caller.metadata(),
        )
        .await?;
    Ok(Json(project))
}

/// PUT /api/projects/:id/completion
pub async fn update_completion(
    State(handlers): State<ProjectHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<UpdateCompletionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let project_id: ProjectId = parse_id(&id, "project")?;
    let result = handlers
        .completion
        .handle(
            UpdateProjectCompletionCommand {
                project_id,
                completion_percent: req.completion_percent,
            },
            caller.metadata(),
        )
        .await?;
    Ok(Json(CompletionResponse {
        project: result.project,
        auto_completed: result.auto_completed,
    }))
}

/// PUT /api/projects/:id/spend
pub async fn record_spend(
    State(handlers): State<ProjectHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<RecordSpendRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let project_id: ProjectId = parse_id(&id, "project")?;
    let project = handlers
        .spend
        .handle(
            RecordProjectSpendCommand {
                project_id,
                spent: req.spent,
            },
            caller.metadata(),
        )
        .await?;
    Ok(Json(project))
}

/// POST /api/projects/:id/inherit-budget
pub async fn inherit_budget(
    State(handlers): State<ProjectHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<InheritBudgetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let project_id: ProjectId = parse_id(&id, "project")?;
    let result = handlers
        .inherit
        .handle(
            InheritProjectBudgetCommand {
                project_id,
                offer_id: req.offer_id,
            },
            caller.metadata(),
        )
        .await?;
    Ok(Json(InheritBudgetResponse {
        project: result.project,
        inherited: result.inherited,
    }))
}

/// POST /api/projects/:id/recalculate-health
pub async fn recalculate_health(
    State(handlers): State<ProjectHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let project_id: ProjectId = parse_id(&id, "project")?;
    let project = handlers
        .health
        .handle(RecalculateProjectHealthCommand { project_id }, caller.metadata())
        .await?;
    Ok(Json(project))
}

//! HTTP handlers for deal endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::adapters::http::caller::CurrentCaller;
use crate::adapters::http::error::{parse_id, ApiError};
use crate::application::handlers::deal::{
    AdvanceDealStageCommand, AdvanceDealStageHandler, CreateDealCommand, CreateDealHandler,
    CreateOfferFromDealCommand, CreateOfferFromDealHandler, GetDealHandler, GetDealQuery,
    GetStageHistoryHandler, GetStageHistoryQuery, LoseDealCommand, LoseDealHandler,
    ReopenDealCommand, ReopenDealHandler, UpdateDealCommand, UpdateDealHandler, WinDealCommand,
    WinDealHandler,
};
use crate::domain::deal::DealPatch;
use crate::domain::foundation::{CompanyId, DealId, UserId};

use super::dto::{
    AdvanceDealRequest, CreateDealRequest, CreateOfferFromDealRequest, DealTransitionResponse,
    LoseDealRequest, OfferFromDealResponse, UpdateDealRequest, WinDealRequest, WinDealResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct DealHandlers {
    pub create: Arc<CreateDealHandler>,
    pub get: Arc<GetDealHandler>,
    pub update: Arc<UpdateDealHandler>,
    pub advance: Arc<AdvanceDealStageHandler>,
    pub win: Arc<WinDealHandler>,
    pub lose: Arc<LoseDealHandler>,
    pub reopen: Arc<ReopenDealHandler>,
    pub create_offer: Arc<CreateOfferFromDealHandler>,
    pub history: Arc<GetStageHistoryHandler>,
}

fn user_id(raw: String) -> Result<UserId, ApiError> {
    UserId::new(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/deals
pub async fn create_deal(
    State(handlers): State<DealHandlers>,
    caller: CurrentCaller,
    Json(req): Json<CreateDealRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let company_id = req
        .company_id
        .map(CompanyId::new)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let cmd = CreateDealCommand {
        title: req.title,
        description: req.description,
        customer_id: req.customer_id,
        customer_name: req.customer_name,
        company_id,
        value: req.value,
        currency: req.currency,
        probability: req.probability,
        owner_id: req.owner_id.map(user_id).transpose()?,
        expected_close_date: req.expected_close_date,
        source: req.source,
        notes: req.notes,
    };

    let result = handlers.create.handle(cmd, caller.metadata()).await?;
    Ok((
        StatusCode::CREATED,
        Json(DealTransitionResponse {
            deal: result.deal,
            history: result.history,
        }),
    ))
}

/// GET /api/deals/:id
pub async fn get_deal(
    State(handlers): State<DealHandlers>,
    _caller: CurrentCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deal_id: DealId = parse_id(&id, "deal")?;
    let deal = handlers.get.handle(GetDealQuery { deal_id }).await?;
    Ok(Json(deal))
}

/// PATCH /api/deals/:id
pub async fn update_deal(
    State(handlers): State<DealHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<UpdateDealRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let deal_id: DealId = parse_id(&id, "deal")?;
    let patch = DealPatch {
        title: req.title,
        description: req.description,
        value: req.value,
        probability: req.probability,
        expected_close_date: req.expected_close_date,
        owner_id: req.owner_id.map(user_id).transpose()?,
        notes: req.notes,
    };
    let deal = handlers
        .update
        .handle(UpdateDealCommand { deal_id, patch }, caller.metadata())
        .await?;
    Ok(Json(deal))
}

/// POST /api/deals/:id/advance
pub async fn advance_deal(
    State(handlers): State<DealHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<AdvanceDealRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let deal_id: DealId = parse_id(&id, "deal")?;
    let result = handlers
        .advance
        .handle(
            AdvanceDealStageCommand {
                deal_id,
                target: req.stage,
                notes: req.notes,
            },
            caller.metadata(),
        )
        .await?;
    Ok(Json(DealTransitionResponse {
        deal: result.deal,
        history: result.history,
    }))
}

/// POST /api/deals/:id/win
pub async fn win_deal(
    State(handlers): State<DealHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<WinDealRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let deal_id: DealId = parse_id(&id, "deal")?;
    let result = handlers
        .win
        .handle(
            WinDealCommand {
                deal_id,
                notes: req.notes,
                create_project: req.create_project,
            },
            caller.metadata(),
        )
        .await?;
    Ok(Json(WinDealResponse {
        deal: result.deal,
        history: result.history,
        project: result.project,
    }))
}

/// POST /api/deals/:id/lose
pub async fn lose_deal(
    State(handlers): State<DealHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<LoseDealRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let deal_id: DealId = parse_id(&id, "deal")?;
    let result = handlers
        .lose
        .handle(
            LoseDealCommand {
                deal_id,
                category: req.category,
                notes: req.notes,
            },
            caller.metadata(),
        )
        .await?;
    Ok(Json(DealTransitionResponse {
        deal: result.deal,
        history: result.history,
    }))
}

/// POST /api/deals/:id/reopen
pub async fn reopen_deal(
    State(handlers): State<DealHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deal_id: DealId = parse_id(&id, "deal")?;
    let result = handlers
        .reopen
        .handle(ReopenDealCommand { deal_id }, caller.metadata())
        .await?;
    Ok(Json(DealTransitionResponse {
        deal: result.deal,
        history: result.history,
    }))
}

/// POST /api/deals/:id/offers
pub async fn create_offer_from_deal(
    State(handlers): State<DealHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<CreateOfferFromDealRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let deal_id: DealId = parse_id(&id, "deal")?;
    let result = handlers
        .create_offer
        .handle(
            CreateOfferFromDealCommand {
                deal_id,
                title: req.title,
                template_offer_id: req.template_offer_id,
            },
            caller.metadata(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(OfferFromDealResponse {
            offer: result.offer,
            deal: result.deal,
            lines: result.lines,
        }),
    ))
}

/// GET /api/deals/:id/history
pub async fn stage_history(
    State(handlers): State<DealHandlers>,
    _caller: CurrentCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deal_id: DealId = parse_id(&id, "deal")?;
    let entries = handlers
        .history
        .handle(GetStageHistoryQuery { deal_id })
        .await?;
    Ok(Json(entries))
}

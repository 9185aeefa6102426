//! HTTP handlers for offer endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::adapters::http::caller::CurrentCaller;
use crate::adapters::http::error::{parse_id, ApiError};
use crate::application::handlers::offer::{
    AcceptOfferCommand, AcceptOfferHandler, AdvanceOfferCommand, AdvanceOfferHandler,
    CloneOfferCommand, CloneOfferHandler, CreateOfferCommand, CreateOfferHandler,
    ExpireOfferCommand, ExpireOfferHandler, GetOfferHandler, GetOfferQuery,
    RecalculateOfferTotalsCommand, RecalculateOfferTotalsHandler, RejectOfferCommand,
    RejectOfferHandler, SendOfferCommand, SendOfferHandler, UpdateOfferCommand,
    UpdateOfferHandler,
};
use crate::domain::foundation::{CompanyId, OfferId, UserId};
use crate::domain::offer::{OfferNumber, OfferPatch};

use super::dto::{
    AcceptOfferRequest, AcceptOfferResponse, AdvanceOfferRequest, CloneOfferRequest,
    CloneOfferResponse, CreateOfferRequest, RejectOfferRequest, UpdateOfferRequest,
};

#[derive(Clone)]
pub struct OfferHandlers {
    pub create: Arc<CreateOfferHandler>,
    pub get: Arc<GetOfferHandler>,
    pub update: Arc<UpdateOfferHandler>,
    pub send: Arc<SendOfferHandler>,
    pub accept: Arc<AcceptOfferHandler>,
    pub reject: Arc<RejectOfferHandler>,
    pub expire: Arc<ExpireOfferHandler>,
    pub clone_offer: Arc<CloneOfferHandler>,
    pub advance: Arc<AdvanceOfferHandler>,
    pub recalculate: Arc<RecalculateOfferTotalsHandler>,
}

fn bad_request(err: impl std::fmt::Display) -> ApiError {
    ApiError::bad_request(err.to_string())
}

/// POST /api/offers
pub async fn create_offer(
    State(handlers): State<OfferHandlers>,
    caller: CurrentCaller,
    Json(req): Json<CreateOfferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CreateOfferCommand {
        title: req.title,
        customer_id: req.customer_id,
        customer_name: req.customer_name,
        company_id: req
            .company_id
            .map(CompanyId::new)
            .transpose()
            .map_err(bad_request)?,
        phase: req.phase,
        probability: req.probability,
        value: req.value,
        responsible_user_id: req
            .responsible_user_id
            .map(UserId::new)
            .transpose()
            .map_err(bad_request)?,
        description: req.description,
        notes: req.notes,
        due_date: req.due_date,
        deal_id: req.deal_id,
    };
    let offer = handlers.create.handle(cmd, caller.metadata()).await?;
    Ok((StatusCode::CREATED, Json(offer)))
}

/// GET /api/offers/:id
pub async fn get_offer(
    State(handlers): State<OfferHandlers>,
    _caller: CurrentCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let offer_id: OfferId = parse_id(&id, "offer")?;
    Ok(Json(handlers.get.handle(GetOfferQuery { offer_id }).await?))
}

/// PATCH /api/offers/:id
pub async fn update_offer(
    State(handlers): State<OfferHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<UpdateOfferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let offer_id: OfferId = parse_id(&id, "offer")?;
    let offer_number = match req.offer_number {
        Some(Some(raw)) => Some(Some(OfferNumber::new(raw).map_err(bad_request)?)),
        Some(None) => Some(None),
        None => None,
    };
    let patch = OfferPatch {
        title: req.title,
        description: req.description,
        notes: req.notes,
        probability: req.probability,
        responsible_user_id: req
            .responsible_user_id
            .map(UserId::new)
            .transpose()
            .map_err(bad_request)?,
        due_date: req.due_date,
        offer_number,
    };
    let offer = handlers
        .update
        .handle(UpdateOfferCommand { offer_id, patch }, caller.metadata())
        .await?;
    Ok(Json(offer))
}

/// POST /api/offers/:id/send
pub async fn send_offer(
    State(handlers): State<OfferHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let offer_id: OfferId = parse_id(&id, "offer")?;
    let offer = handlers
        .send
        .handle(SendOfferCommand { offer_id }, caller.metadata())
        .await?;
    Ok(Json(offer))
}

/// POST /api/offers/:id/accept
pub async fn accept_offer(
    State(handlers): State<OfferHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<AcceptOfferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let offer_id: OfferId = parse_id(&id, "offer")?;
    let result = handlers
        .accept
        .handle(
            AcceptOfferCommand {
                offer_id,
                create_project: req.create_project,
                project_name: req.project_name,
            },
            caller.metadata(),
        )
        .await?;
    Ok(Json(AcceptOfferResponse {
        offer: result.offer,
        project: result.project,
    }))
}

/// POST /api/offers/:id/reject
pub async fn reject_offer(
    State(handlers): State<OfferHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<RejectOfferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let offer_id: OfferId = parse_id(&id, "offer")?;
    let offer = handlers
        .reject
        .handle(
            RejectOfferCommand {
                offer_id,
                reason: req.reason,
            },
            caller.metadata(),
        )
        .await?;
    Ok(Json(offer))
}

/// POST /api/offers/:id/expire
pub async fn expire_offer(
    State(handlers): State<OfferHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let offer_id: OfferId = parse_id(&id, "offer")?;
    let offer = handlers
        .expire
        .handle(ExpireOfferCommand { offer_id }, caller.metadata())
        .await?;
    Ok(Json(offer))
}

/// POST /api/offers/:id/clone
pub async fn clone_offer(
    State(handlers): State<OfferHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<CloneOfferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let offer_id: OfferId = parse_id(&id, "offer")?;
    let result = handlers
        .clone_offer
        .handle(
            CloneOfferCommand {
                offer_id,
                new_title: req.title,
                include_budget: req.include_budget,
            },
            caller.metadata(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CloneOfferResponse {
            offer: result.offer,
            lines: result.lines,
        }),
    ))
}

/// POST /api/offers/:id/advance
pub async fn advance_offer(
    State(handlers): State<OfferHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(req): Json<AdvanceOfferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let offer_id: OfferId = parse_id(&id, "offer")?;
    let offer = handlers
        .advance
        .handle(
            AdvanceOfferCommand {
                offer_id,
                target: req.phase,
            },
            caller.metadata(),
        )
        .await?;
    Ok(Json(offer))
}

/// POST /api/offers/:id/recalculate
pub async fn recalculate_offer(
    State(handlers): State<OfferHandlers>,
    caller: CurrentCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let offer_id: OfferId = parse_id(&id, "offer")?;
    let offer = handlers
        .recalculate
        .handle(RecalculateOfferTotalsCommand { offer_id }, caller.metadata())
        .await?;
    Ok(Json(offer))
}

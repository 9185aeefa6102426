//! CreateDealHandler - Command handler for opening a new deal.

use std::sync::Arc;

use tracing::debug;

use crate::application::CommandError;
use crate::domain::activity::ActivityEntry;
use crate::domain::deal::{Deal, NewDeal, StageHistoryEntry};
use crate::domain::foundation::{CommandMetadata, CompanyId, CustomerId, Timestamp, UserId};
use crate::ports::{ActivityRecorder, Change, ChangeSet, UnitOfWork};

use super::super::support::record_activity;

/// Command to create a deal in `lead`.
#[derive(Debug, Clone)]
pub struct CreateDealCommand {
    pub title: String,
    pub description: Option<String>,
    pub customer_id: CustomerId,
    pub customer_name: Option<String>,
    /// Defaults to the caller's company.
    pub company_id: Option<CompanyId>,
    pub value: f64,
    /// Defaults to the configured currency.
    pub currency: Option<String>,
    /// Defaults to the lead probability.
    pub probability: Option<u8>,
    /// Defaults to the caller.
    pub owner_id: Option<UserId>,
    pub expected_close_date: Option<Timestamp>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateDealResult {
    pub deal: Deal,
    pub history: StageHistoryEntry,
}

/// Handler for creating deals.
pub struct CreateDealHandler {
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
    default_currency: String,
}

impl CreateDealHandler {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        activities: Arc<dyn ActivityRecorder>,
        default_currency: impl Into<String>,
    ) -> Self {
        Self {
            uow,
            activities,
            default_currency: default_currency.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateDealCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateDealResult, CommandError> {
        let caller = &metadata.caller;

        // 1. Caller must be able to work in the target company
        let company_id = cmd.company_id.unwrap_or_else(|| caller.company_id.clone());
        if !caller.can_access_company(&company_id) {
            return Err(CommandError::Forbidden(format!(
                "user {} may not create deals for company {}",
                caller.user_id, company_id
            )));
        }

        // 2. Open the deal together with its first history entry
        let (deal, history) = Deal::create(
            NewDeal {
                title: cmd.title,
                description: cmd.description,
                customer_id: cmd.customer_id,
                customer_name: cmd.customer_name,
                company_id,
                value: cmd.value,
                currency: cmd
                    .currency
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| self.default_currency.clone()),
                probability: cmd.probability,
                owner_id: cmd.owner_id.unwrap_or_else(|| caller.user_id.clone()),
                expected_close_date: cmd.expected_close_date,
                source: cmd.source,
                notes: cmd.notes,
            },
            caller,
        )?;

        // 3. Persist
        self.uow
            .commit(
                ChangeSet::new()
                    .with(Change::InsertDeal(deal.clone()))
                    .with(Change::AppendStageHistory(history.clone())),
            )
            .await?;
        debug!(deal_id = %deal.id, "deal created");

        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                deal.id,
                "Deal created",
                format!(
                    "Deal '{}' was created with value {} {:.2}",
                    deal.title, deal.currency, deal.value
                ),
                caller,
            ),
        )
        .await;

        Ok(CreateDealResult { deal, history })
    }
}

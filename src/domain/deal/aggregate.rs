//! Deal aggregate.
//!
//! Every stage change goes through a method on [`Deal`] and yields the
//! [`StageHistoryEntry`] to append, so the history log can never drift from
//! the stage actually stored.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    Caller, CompanyId, CustomerId, DealId, Modifiable, OfferId, StateMachine, Timestamp, UserId,
    ValidationError,
};

use super::{DealError, DealStage, LossReasonCategory, StageHistoryEntry};

/// Input for opening a new deal.
#[derive(Debug, Clone)]
pub struct NewDeal {
    pub title: String,
    pub description: Option<String>,
    pub customer_id: CustomerId,
    pub customer_name: Option<String>,
    pub company_id: CompanyId,
    pub value: f64,
    pub currency: String,
    /// Overrides the stage default when set.
    pub probability: Option<u8>,
    pub owner_id: UserId,
    pub expected_close_date: Option<Timestamp>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

/// Editable fields of an open deal; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct DealPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub value: Option<f64>,
    pub probability: Option<u8>,
    pub expected_close_date: Option<Timestamp>,
    pub owner_id: Option<UserId>,
    pub notes: Option<String>,
}

/// A sales-pipeline opportunity.
///
/// # Invariants
///
/// - `probability` is the stage default unless explicitly overridden
/// - at most one linked offer
/// - `lost_reason` / `loss_reason_category` are set only while lost
/// - `actual_close_date` is set only while won or lost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub title: String,
    pub description: Option<String>,
    pub customer_id: CustomerId,
    pub customer_name: Option<String>,
    pub company_id: CompanyId,
    pub stage: DealStage,
    pub probability: u8,
    pub value: f64,
    pub currency: String,
    pub owner_id: UserId,
    pub created_by: UserId,
    pub expected_close_date: Option<Timestamp>,
    pub actual_close_date: Option<Timestamp>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub lost_reason: Option<String>,
    pub loss_reason_category: Option<LossReasonCategory>,
    pub offer_id: Option<OfferId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Deal {
    /// Opens a deal in `lead` together with its `∅ → lead` history entry.
    pub fn create(input: NewDeal, created_by: &Caller) -> Result<(Self, StageHistoryEntry), DealError> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::empty_field("title").into());
        }
        validate_value(input.value)?;
        if let Some(probability) = input.probability {
            validate_probability(probability)?;
        }

        let stage = DealStage::Lead;
        let now = Timestamp::now();
        let currency = if input.currency.trim().is_empty() {
            return Err(ValidationError::empty_field("currency").into());
        } else {
            input.currency.trim().to_uppercase()
        };

        let deal = Self {
            id: DealId::new(),
            title,
            description: input.description,
            customer_id: input.customer_id,
            customer_name: input.customer_name,
            company_id: input.company_id,
            stage,
            probability: input.probability.unwrap_or_else(|| stage.default_probability()),
            value: input.value,
            currency,
            owner_id: input.owner_id,
            created_by: created_by.user_id.clone(),
            expected_close_date: input.expected_close_date,
            actual_close_date: None,
            source: input.source,
            notes: input.notes,
            lost_reason: None,
            loss_reason_category: None,
            offer_id: None,
            created_at: now,
            updated_at: now,
        };
        let entry = StageHistoryEntry::record(
            deal.id,
            None,
            stage,
            created_by,
            Some("Deal created".to_string()),
        );
        Ok((deal, entry))
    }

    /// Probability-weighted value used in pipeline reports.
    pub fn weighted_value(&self) -> f64 {
        self.value * f64::from(self.probability) / 100.0
    }

    /// Moves one step forward along the pipeline, or to `lost` from any open stage.
    ///
    /// `won` is never reachable here; use [`Deal::win`]. Moving to `lost`
    /// this way records the notes as the reason under
    /// [`LossReasonCategory::Other`].
    pub fn advance_stage(
        &mut self,
        target: DealStage,
        notes: Option<String>,
        changed_by: &Caller,
    ) -> Result<StageHistoryEntry, DealError> {
        let from = self.stage;
        let legal = !from.is_closed()
            && target != DealStage::Won
            && from.can_transition_to(&target);
        if !legal {
            return Err(DealError::InvalidStageTransition { from, to: target });
        }

        let now = Timestamp::now();
        self.stage = target;
        self.probability = target.default_probability();
        if target == DealStage::Lost {
            self.actual_close_date = Some(now);
            self.lost_reason = notes.clone();
            self.loss_reason_category = Some(LossReasonCategory::Other);
        }
        self.updated_at = now;
        Ok(StageHistoryEntry::record(self.id, Some(from), target, changed_by, notes))
    }

    /// Closes the deal as won. Only legal from `negotiation`.
    pub fn win(&mut self, notes: Option<String>, changed_by: &Caller) -> Result<StageHistoryEntry, DealError> {
        if self.stage != DealStage::Negotiation {
            return Err(DealError::NotInNegotiation(self.stage));
        }
        let from = self.stage;
        let now = Timestamp::now();
        self.stage = DealStage::Won;
        self.probability = DealStage::Won.default_probability();
        self.actual_close_date = Some(now);
        self.updated_at = now;
        Ok(StageHistoryEntry::record(self.id, Some(from), DealStage::Won, changed_by, notes))
    }

    /// Closes the deal as lost with a categorized reason.
    pub fn lose(
        &mut self,
        category: LossReasonCategory,
        notes: impl Into<String>,
        changed_by: &Caller,
    ) -> Result<StageHistoryEntry, DealError> {
        match self.stage {
            DealStage::Won => return Err(DealError::AlreadyWon),
            DealStage::Lost => return Err(DealError::AlreadyLost),
            _ => {}
        }
        let notes = notes.into();
        let from = self.stage;
        let now = Timestamp::now();
        self.stage = DealStage::Lost;
        self.probability = DealStage::Lost.default_probability();
        self.actual_close_date = Some(now);
        self.lost_reason = Some(notes.clone());
        self.loss_reason_category = Some(category);
        self.updated_at = now;

        let history_note = format!("[{}] {}", category, notes);
        Ok(StageHistoryEntry::record(
            self.id,
            Some(from),
            DealStage::Lost,
            changed_by,
            Some(history_note.trim_end().to_string()),
        ))
    }

    /// Brings a lost deal back to `lead`, clearing every loss marker.
    pub fn reopen(&mut self, changed_by: &Caller) -> Result<StageHistoryEntry, DealError> {
        if self.stage != DealStage::Lost {
            return Err(DealError::NotLost);
        }
        self.stage = DealStage::Lead;
        self.probability = DealStage::Lead.default_probability();
        self.actual_close_date = None;
        self.lost_reason = None;
        self.loss_reason_category = None;
        self.updated_at = Timestamp::now();
        Ok(StageHistoryEntry::record(
            self.id,
            Some(DealStage::Lost),
            DealStage::Lead,
            changed_by,
            Some("Deal reopened".to_string()),
        ))
    }

    /// Checks whether an offer may be drafted from this deal.
    pub fn ensure_can_create_offer(&self) -> Result<(), DealError> {
        if self.offer_id.is_some() {
            return Err(DealError::AlreadyHasOffer);
        }
        if !self.stage.accepts_new_offer() {
            return Err(DealError::InvalidStageForOffer(self.stage));
        }
        Ok(())
    }

    /// Links a freshly drafted offer and moves the deal to `proposal`.
    pub fn attach_offer(&mut self, offer_id: OfferId, changed_by: &Caller) -> Result<StageHistoryEntry, DealError> {
        self.ensure_can_create_offer()?;
        let from = self.stage;
        self.offer_id = Some(offer_id);
        self.stage = DealStage::Proposal;
        self.probability = DealStage::Proposal.default_probability();
        self.updated_at = Timestamp::now();
        Ok(StageHistoryEntry::record(
            self.id,
            Some(from),
            DealStage::Proposal,
            changed_by,
            Some("Offer created from deal".to_string()),
        ))
    }

    /// Edits descriptive fields of an open deal.
    pub fn update(&mut self, patch: DealPatch) -> Result<(), DealError> {
        if self.stage.is_closed() {
            return Err(DealError::Closed(self.stage));
        }
        if let Some(value) = patch.value {
            validate_value(value)?;
        }
        if let Some(probability) = patch.probability {
            validate_probability(probability)?;
        }
        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ValidationError::empty_field("title").into());
            }
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(probability) = patch.probability {
            self.probability = probability;
        }
        if let Some(date) = patch.expected_close_date {
            self.expected_close_date = Some(date);
        }
        if let Some(owner) = patch.owner_id {
            self.owner_id = owner;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

fn validate_value(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::out_of_range("value", 0.0, f64::MAX, value));
    }
    Ok(())
}

fn validate_probability(probability: u8) -> Result<(), ValidationError> {
    if probability > 100 {
        return Err(ValidationError::out_of_range(
            "probability",
            0.0,
            100.0,
            f64::from(probability),
        ));
    }
    Ok(())
}

impl Modifiable for Deal {
    const RESOURCE_TYPE: &'static str = "Deal";

    fn resource_id(&self) -> String {
        self.id.to_string()
    }

    fn owner(&self) -> Option<&UserId> {
        Some(&self.created_by)
    }

    fn assignee(&self) -> Option<&UserId> {
        Some(&self.owner_id)
    }

    fn company(&self) -> &CompanyId {
        &self.company_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Role;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn caller() -> Caller {
        Caller::new(
            UserId::new("seller").unwrap(),
            vec![Role::Market],
            CompanyId::new("stalbygg").unwrap(),
        )
    }

    fn new_deal() -> NewDeal {
        NewDeal {
            title: "Warehouse extension".to_string(),
            description: Some("Steel hall, 2000 m2".to_string()),
            customer_id: CustomerId::new(),
            customer_name: Some("Acme AS".to_string()),
            company_id: CompanyId::new("stalbygg").unwrap(),
            value: 100_000.0,
            currency: "nok".to_string(),
            probability: None,
            owner_id: UserId::new("seller").unwrap(),
            expected_close_date: None,
            source: None,
            notes: None,
        }
    }

    fn deal_in(stage: DealStage) -> Deal {
        let (mut deal, _) = Deal::create(new_deal(), &caller()).unwrap();
        deal.stage = stage;
        deal.probability = stage.default_probability();
        deal
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Creation
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn create_starts_in_lead_with_history() {
        let (deal, entry) = Deal::create(new_deal(), &caller()).unwrap();

        assert_eq!(deal.stage, DealStage::Lead);
        assert_eq!(deal.probability, 10);
        assert_eq!(deal.currency, "NOK");
        assert_eq!(entry.from_stage, None);
        assert_eq!(entry.to_stage, DealStage::Lead);
        assert_eq!(entry.notes.as_deref(), Some("Deal created"));
    }

    #[test]
    fn create_keeps_explicit_probability() {
        let input = NewDeal {
            probability: Some(40),
            ..new_deal()
        };
        let (deal, _) = Deal::create(input, &caller()).unwrap();
        assert_eq!(deal.probability, 40);
    }

    #[test]
    fn create_rejects_blank_title_and_out_of_range_probability() {
        let blank = NewDeal {
            title: "  ".to_string(),
            ..new_deal()
        };
        assert!(matches!(Deal::create(blank, &caller()), Err(DealError::Validation(_))));

        let too_likely = NewDeal {
            probability: Some(101),
            ..new_deal()
        };
        assert!(matches!(Deal::create(too_likely, &caller()), Err(DealError::Validation(_))));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Advance
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn advance_moves_one_step_and_sets_default_probability() {
        let mut deal = deal_in(DealStage::Lead);
        let entry = deal
            .advance_stage(DealStage::Qualified, Some("Budget confirmed".into()), &caller())
            .unwrap();

        assert_eq!(deal.stage, DealStage::Qualified);
        assert_eq!(deal.probability, 25);
        assert_eq!(entry.from_stage, Some(DealStage::Lead));
        assert_eq!(entry.notes.as_deref(), Some("Budget confirmed"));
    }

    #[test]
    fn advance_cannot_skip_stages() {
        let mut deal = deal_in(DealStage::Lead);
        let err = deal.advance_stage(DealStage::Proposal, None, &caller()).unwrap_err();
        assert_eq!(
            err,
            DealError::InvalidStageTransition {
                from: DealStage::Lead,
                to: DealStage::Proposal
            }
        );
        assert_eq!(deal.stage, DealStage::Lead);
    }

    #[test]
    fn advance_never_reaches_won() {
        for stage in [DealStage::Proposal, DealStage::Negotiation] {
            let mut deal = deal_in(stage);
            assert!(matches!(
                deal.advance_stage(DealStage::Won, None, &caller()),
                Err(DealError::InvalidStageTransition { .. })
            ));
        }
    }

    #[test]
    fn advance_to_lost_closes_deal() {
        let mut deal = deal_in(DealStage::Qualified);
        deal.advance_stage(DealStage::Lost, Some("Went silent".into()), &caller())
            .unwrap();
        assert_eq!(deal.stage, DealStage::Lost);
        assert_eq!(deal.probability, 0);
        assert!(deal.actual_close_date.is_some());
        assert_eq!(deal.lost_reason.as_deref(), Some("Went silent"));
        assert_eq!(deal.loss_reason_category, Some(LossReasonCategory::Other));

        deal.reopen(&caller()).unwrap();
        assert_eq!(deal.loss_reason_category, None);
        assert_eq!(deal.lost_reason, None);
    }

    #[test]
    fn advance_refuses_to_leave_lost() {
        let mut deal = deal_in(DealStage::Lost);
        assert!(deal.advance_stage(DealStage::Lead, None, &caller()).is_err());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Win / lose / reopen
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn win_requires_negotiation() {
        let mut deal = deal_in(DealStage::Proposal);
        assert_eq!(
            deal.win(None, &caller()).unwrap_err(),
            DealError::NotInNegotiation(DealStage::Proposal)
        );

        let mut deal = deal_in(DealStage::Negotiation);
        deal.win(None, &caller()).unwrap();
        assert_eq!(deal.stage, DealStage::Won);
        assert_eq!(deal.probability, 100);
        assert!(deal.actual_close_date.is_some());
    }

    #[test]
    fn lose_records_reason_and_rejects_second_call() {
        let mut deal = deal_in(DealStage::Proposal);
        let entry = deal
            .lose(LossReasonCategory::Price, "Competitor 15% cheaper", &caller())
            .unwrap();

        assert_eq!(deal.stage, DealStage::Lost);
        assert_eq!(deal.probability, 0);
        assert_eq!(deal.lost_reason.as_deref(), Some("Competitor 15% cheaper"));
        assert_eq!(deal.loss_reason_category, Some(LossReasonCategory::Price));
        assert_eq!(entry.notes.as_deref(), Some("[price] Competitor 15% cheaper"));

        assert_eq!(
            deal.lose(LossReasonCategory::Other, "again", &caller()).unwrap_err(),
            DealError::AlreadyLost
        );
    }

    #[test]
    fn won_deal_cannot_be_lost() {
        let mut deal = deal_in(DealStage::Won);
        assert_eq!(
            deal.lose(LossReasonCategory::Timing, "late", &caller()).unwrap_err(),
            DealError::AlreadyWon
        );
    }

    #[test]
    fn reopen_resets_loss_markers() {
        let mut deal = deal_in(DealStage::Negotiation);
        deal.lose(LossReasonCategory::Competitor, "lost", &caller()).unwrap();

        let entry = deal.reopen(&caller()).unwrap();
        assert_eq!(deal.stage, DealStage::Lead);
        assert_eq!(deal.probability, 10);
        assert_eq!(deal.actual_close_date, None);
        assert_eq!(deal.lost_reason, None);
        assert_eq!(deal.loss_reason_category, None);
        assert_eq!(entry.notes.as_deref(), Some("Deal reopened"));
    }

    #[test]
    fn only_lost_deals_reopen() {
        let mut deal = deal_in(DealStage::Qualified);
        assert_eq!(deal.reopen(&caller()).unwrap_err(), DealError::NotLost);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Offer link
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn attach_offer_moves_to_proposal() {
        let mut deal = deal_in(DealStage::Qualified);
        let offer = OfferId::new();
        deal.attach_offer(offer, &caller()).unwrap();

        assert_eq!(deal.offer_id, Some(offer));
        assert_eq!(deal.stage, DealStage::Proposal);
        assert_eq!(deal.probability, 50);
    }

    #[test]
    fn second_offer_is_rejected() {
        let mut deal = deal_in(DealStage::Lead);
        deal.offer_id = Some(OfferId::new());
        assert_eq!(
            deal.ensure_can_create_offer().unwrap_err(),
            DealError::AlreadyHasOffer
        );
    }

    #[test]
    fn offer_requires_early_stage() {
        let deal = deal_in(DealStage::Negotiation);
        assert_eq!(
            deal.ensure_can_create_offer().unwrap_err(),
            DealError::InvalidStageForOffer(DealStage::Negotiation)
        );
    }

    #[test]
    fn closed_deal_cannot_be_edited() {
        let mut deal = deal_in(DealStage::Won);
        let patch = DealPatch {
            title: Some("New".into()),
            ..Default::default()
        };
        assert_eq!(deal.update(patch).unwrap_err(), DealError::Closed(DealStage::Won));
    }

    #[test]
    fn weighted_value_uses_probability() {
        let deal = deal_in(DealStage::Proposal);
        assert!((deal.weighted_value() - 50_000.0).abs() < 1e-9);
    }
}

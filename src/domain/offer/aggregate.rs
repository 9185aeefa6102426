//! Offer aggregate.
//!
//! The offer number is the one invariant every phase-affecting method
//! re-checks: a draft never carries a number and every other phase always
//! does. Numbers are issued outside the aggregate (they need the sequence
//! store), so transitions that may leave draft accept an already issued
//! number and keep the existing one when present.

use serde::{Deserialize, Serialize};

use crate::domain::budget::BudgetSummary;
use crate::domain::foundation::{
    Caller, CompanyId, CustomerId, DealId, Modifiable, OfferId, ProjectId, StateMachine,
    Timestamp, UserId, ValidationError,
};

use super::{OfferError, OfferNumber, OfferPhase};

/// Input for creating an offer.
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub title: String,
    pub customer_id: Option<CustomerId>,
    pub customer_name: Option<String>,
    pub company_id: CompanyId,
    pub phase: OfferPhase,
    pub probability: u8,
    pub value: f64,
    pub responsible_user_id: Option<UserId>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub due_date: Option<Timestamp>,
    pub deal_id: Option<DealId>,
}

/// Editable fields of an open offer.
///
/// `offer_number` is tri-state: `None` leaves it alone, `Some(None)` clears
/// it and `Some(Some(n))` sets it.
#[derive(Debug, Clone, Default)]
pub struct OfferPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub probability: Option<u8>,
    pub responsible_user_id: Option<UserId>,
    pub due_date: Option<Timestamp>,
    pub offer_number: Option<Option<OfferNumber>>,
}

/// A quote sent to a customer.
///
/// # Invariants
///
/// - `offer_number.is_none()` exactly when `phase == Draft`
/// - `value`, `cost`, `margin_percent` mirror the budget lines once any exist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub title: String,
    pub offer_number: Option<OfferNumber>,
    pub customer_id: Option<CustomerId>,
    pub customer_name: Option<String>,
    pub company_id: CompanyId,
    pub deal_id: Option<DealId>,
    pub project_id: Option<ProjectId>,
    pub phase: OfferPhase,
    pub probability: u8,
    pub value: f64,
    pub cost: f64,
    pub margin_percent: f64,
    pub has_detailed_budget: bool,
    pub responsible_user_id: Option<UserId>,
    pub created_by: UserId,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub due_date: Option<Timestamp>,
    pub sent_date: Option<Timestamp>,
    pub expiration_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Offer {
    /// Creates an offer in `input.phase`.
    ///
    /// A non-draft phase requires `issued`; a draft ignores it.
    pub fn create(
        input: NewOffer,
        issued: Option<OfferNumber>,
        created_by: &Caller,
    ) -> Result<Self, OfferError> {
        if input.phase.is_closed() {
            return Err(OfferError::InvalidPhaseTransition {
                from: OfferPhase::Draft,
                to: input.phase,
            });
        }
        let title = non_blank_title(input.title)?;
        validate_probability(input.probability)?;
        if !input.value.is_finite() || input.value < 0.0 {
            return Err(ValidationError::out_of_range("value", 0.0, f64::MAX, input.value).into());
        }

        let now = Timestamp::now();
        let offer_number = if input.phase == OfferPhase::Draft {
            None
        } else {
            issued
        };
        let offer = Self {
            id: OfferId::new(),
            title,
            offer_number,
            customer_id: input.customer_id,
            customer_name: input.customer_name,
            company_id: input.company_id,
            deal_id: input.deal_id,
            project_id: None,
            phase: input.phase,
            probability: input
                .phase
                .implied_probability()
                .unwrap_or(input.probability),
            value: input.value,
            cost: 0.0,
            margin_percent: 0.0,
            has_detailed_budget: false,
            responsible_user_id: input.responsible_user_id,
            created_by: created_by.user_id.clone(),
            description: input.description,
            notes: input.notes,
            due_date: input.due_date,
            sent_date: None,
            expiration_date: None,
            created_at: now,
            updated_at: now,
        };
        offer.ensure_number_invariant()?;
        Ok(offer)
    }

    /// True when moving to `target` would require issuing a number first.
    pub fn needs_number_for(&self, target: OfferPhase) -> bool {
        target != OfferPhase::Draft && self.offer_number.is_none()
    }

    /// Checks the draft-iff-no-number invariant.
    pub fn ensure_number_invariant(&self) -> Result<(), OfferError> {
        match (self.phase, &self.offer_number) {
            (OfferPhase::Draft, Some(_)) => Err(OfferError::DraftCannotHaveNumber),
            (OfferPhase::Draft, None) => Ok(()),
            (_, None) => Err(OfferError::NonDraftMustHaveNumber),
            (_, Some(_)) => Ok(()),
        }
    }

    /// Sends the offer to the customer.
    ///
    /// Stamps `sent_date` and an expiration `validity_days` later unless
    /// either is already set.
    pub fn send(&mut self, issued: Option<OfferNumber>, validity_days: i64) -> Result<(), OfferError> {
        if !matches!(self.phase, OfferPhase::Draft | OfferPhase::InProgress) {
            return Err(OfferError::NotInDraftPhase(self.phase));
        }
        self.ensure_number_available(OfferPhase::Sent, &issued)?;
        let now = Timestamp::now();
        let sent = *self.sent_date.get_or_insert(now);
        if self.expiration_date.is_none() {
            self.expiration_date = Some(sent.plus_days(validity_days));
        }
        self.enter(OfferPhase::Sent, issued, now)
    }

    /// Marks a sent offer as accepted by the customer.
    pub fn accept(&mut self) -> Result<(), OfferError> {
        if self.phase != OfferPhase::Sent {
            return Err(OfferError::NotSent(self.phase));
        }
        self.enter(OfferPhase::Won, None, Timestamp::now())
    }

    /// Marks a sent offer as lost, appending the reason to the notes.
    pub fn reject(&mut self, reason: Option<String>) -> Result<(), OfferError> {
        if self.phase != OfferPhase::Sent {
            return Err(OfferError::NotSent(self.phase));
        }
        if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
            let line = format!("Lost reason: {}", reason.trim());
            self.notes = Some(match self.notes.take().filter(|n| !n.is_empty()) {
                Some(existing) => format!("{}\n\n{}", existing, line),
                None => line,
            });
        }
        self.enter(OfferPhase::Lost, None, Timestamp::now())
    }

    /// Expires an open offer, issuing a number if it was still a draft.
    pub fn expire(&mut self, issued: Option<OfferNumber>) -> Result<(), OfferError> {
        if self.phase.is_closed() {
            return Err(OfferError::AlreadyClosed);
        }
        self.enter(OfferPhase::Expired, issued, Timestamp::now())
    }

    /// Generic move between open phases.
    ///
    /// Closed targets are reached only through accept, reject and expire.
    /// Going back to draft clears the number; `sent -> in_progress` clears
    /// the sent and expiration dates.
    pub fn advance(
        &mut self,
        target: OfferPhase,
        issued: Option<OfferNumber>,
        validity_days: i64,
    ) -> Result<(), OfferError> {
        self.ensure_can_advance(target)?;
        if target == self.phase {
            return Ok(());
        }
        if target == OfferPhase::Sent {
            return self.send(issued, validity_days);
        }

        if self.phase == OfferPhase::Sent && target == OfferPhase::InProgress {
            self.sent_date = None;
            self.expiration_date = None;
        }
        if target == OfferPhase::Draft {
            self.offer_number = None;
        }
        self.enter(target, issued, Timestamp::now())
    }

    /// Checks that [`Offer::advance`] to `target` would be accepted.
    pub fn ensure_can_advance(&self, target: OfferPhase) -> Result<(), OfferError> {
        if self.phase.is_closed() {
            return Err(OfferError::AlreadyClosed);
        }
        if target == self.phase {
            return Ok(());
        }
        if target.is_closed() || !self.phase.can_transition_to(&target) {
            return Err(OfferError::InvalidPhaseTransition {
                from: self.phase,
                to: target,
            });
        }
        Ok(())
    }

    /// Starts a fresh draft from this offer.
    ///
    /// The copy never carries a number, a project link or dates of its own.
    pub fn clone_as_draft(&self, new_title: Option<String>, created_by: &Caller) -> Result<Offer, OfferError> {
        let title = match new_title.filter(|t| !t.trim().is_empty()) {
            Some(title) => title.trim().to_string(),
            None => format!("Copy of {}", self.title),
        };
        let now = Timestamp::now();
        let copy = Offer {
            id: OfferId::new(),
            title,
            offer_number: None,
            deal_id: None,
            project_id: None,
            phase: OfferPhase::Draft,
            has_detailed_budget: false,
            cost: 0.0,
            margin_percent: 0.0,
            created_by: created_by.user_id.clone(),
            sent_date: None,
            expiration_date: None,
            created_at: now,
            updated_at: now,
            ..self.clone()
        };
        copy.ensure_number_invariant()?;
        Ok(copy)
    }

    /// Edits descriptive fields; closed offers are read-only.
    pub fn update(&mut self, patch: OfferPatch) -> Result<(), OfferError> {
        if self.phase.is_closed() {
            return Err(OfferError::AlreadyClosed);
        }
        if let Some(number) = &patch.offer_number {
            match (self.phase, number) {
                (OfferPhase::Draft, Some(_)) => return Err(OfferError::DraftCannotHaveNumber),
                (phase, None) if phase != OfferPhase::Draft => {
                    return Err(OfferError::NonDraftMustHaveNumber)
                }
                _ => {}
            }
        }
        if let Some(probability) = patch.probability {
            validate_probability(probability)?;
        }
        if let Some(title) = patch.title {
            self.title = non_blank_title(title)?;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        if let Some(probability) = patch.probability {
            self.probability = probability;
        }
        if let Some(user) = patch.responsible_user_id {
            self.responsible_user_id = Some(user);
        }
        if let Some(due) = patch.due_date {
            self.due_date = Some(due);
        }
        if let Some(number) = patch.offer_number {
            self.offer_number = number;
        }
        self.updated_at = Timestamp::now();
        self.ensure_number_invariant()
    }

    /// Mirrors the budget aggregate into the denormalized value fields.
    ///
    /// Idempotent. `has_detailed_budget` latches on the first line.
    pub fn apply_budget_summary(&mut self, summary: &BudgetSummary) {
        self.value = summary.total_revenue;
        self.cost = summary.total_cost;
        self.margin_percent = summary.margin_percent;
        if !summary.is_empty() {
            self.has_detailed_budget = true;
        }
        self.updated_at = Timestamp::now();
    }

    /// Takes value, cost, margin and the detailed-budget flag from the
    /// stored row. Only the line aggregate writes those fields.
    pub fn keep_budget_totals(&mut self, stored: &Offer) {
        self.value = stored.value;
        self.cost = stored.cost;
        self.margin_percent = stored.margin_percent;
        self.has_detailed_budget = stored.has_detailed_budget;
    }

    pub fn link_project(&mut self, project_id: ProjectId) {
        self.project_id = Some(project_id);
        self.updated_at = Timestamp::now();
    }

    fn ensure_number_available(
        &self,
        target: OfferPhase,
        issued: &Option<OfferNumber>,
    ) -> Result<(), OfferError> {
        if self.needs_number_for(target) && issued.is_none() {
            return Err(OfferError::NonDraftMustHaveNumber);
        }
        Ok(())
    }

    fn enter(&mut self, target: OfferPhase, issued: Option<OfferNumber>, now: Timestamp) -> Result<(), OfferError> {
        self.ensure_number_available(target, &issued)?;
        if target != OfferPhase::Draft && self.offer_number.is_none() {
            self.offer_number = issued;
        }
        self.phase = target;
        if let Some(probability) = target.implied_probability() {
            self.probability = probability;
        }
        self.updated_at = now;
        self.ensure_number_invariant()
    }
}

fn non_blank_title(title: String) -> Result<String, ValidationError> {
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(ValidationError::empty_field("title"));
    }
    Ok(title)
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

impl Modifiable for Offer {
    const RESOURCE_TYPE: &'static str = "Offer";

    fn resource_id(&self) -> String {
        self.id.to_string()
    }

    fn owner(&self) -> Option<&UserId> {
        Some(&self.created_by)
    }

    fn assignee(&self) -> Option<&UserId> {
        self.responsible_user_id.as_ref()
    }

    fn company(&self) -> &CompanyId {
        &self.company_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Role;
    use proptest::prelude::*;

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

    fn number(seq: u32) -> OfferNumber {
        OfferNumber::format("ST", 2025, seq)
    }

    fn new_offer(phase: OfferPhase) -> NewOffer {
        NewOffer {
            title: "Hall roof".to_string(),
            customer_id: Some(CustomerId::new()),
            customer_name: Some("Acme AS".to_string()),
            company_id: CompanyId::new("stalbygg").unwrap(),
            phase,
            probability: 30,
            value: 100_000.0,
            responsible_user_id: None,
            description: None,
            notes: Some("Customer wants steel".to_string()),
            due_date: None,
            deal_id: None,
        }
    }

    fn draft() -> Offer {
        Offer::create(new_offer(OfferPhase::Draft), None, &caller()).unwrap()
    }

    fn sent() -> Offer {
        let mut offer = draft();
        offer.send(Some(number(1)), 60).unwrap();
        offer
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Creation
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn draft_is_created_without_number() {
        let offer = Offer::create(new_offer(OfferPhase::Draft), Some(number(9)), &caller()).unwrap();
        assert_eq!(offer.phase, OfferPhase::Draft);
        assert_eq!(offer.offer_number, None);
        assert_eq!(offer.probability, 30);
    }

    #[test]
    fn non_draft_creation_needs_issued_number() {
        let offer =
            Offer::create(new_offer(OfferPhase::InProgress), Some(number(3)), &caller()).unwrap();
        assert_eq!(offer.offer_number, Some(number(3)));

        assert_eq!(
            Offer::create(new_offer(OfferPhase::InProgress), None, &caller()).unwrap_err(),
            OfferError::NonDraftMustHaveNumber
        );
    }

    #[test]
    fn cannot_create_closed_offer() {
        assert!(matches!(
            Offer::create(new_offer(OfferPhase::Won), Some(number(1)), &caller()),
            Err(OfferError::InvalidPhaseTransition { .. })
        ));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Send / accept / reject / expire
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn send_issues_number_and_stamps_dates() {
        let mut offer = draft();
        offer.send(Some(number(1)), 60).unwrap();

        assert_eq!(offer.phase, OfferPhase::Sent);
        assert_eq!(offer.offer_number, Some(number(1)));
        assert_eq!(offer.probability, 50);
        let sent = offer.sent_date.unwrap();
        assert_eq!(offer.expiration_date, Some(sent.plus_days(60)));
    }

    #[test]
    fn send_keeps_existing_number() {
        let mut offer =
            Offer::create(new_offer(OfferPhase::InProgress), Some(number(5)), &caller()).unwrap();
        offer.send(Some(number(6)), 60).unwrap();
        assert_eq!(offer.offer_number, Some(number(5)));
    }

    #[test]
    fn send_from_sent_is_rejected() {
        let mut offer = sent();
        assert_eq!(
            offer.send(None, 60).unwrap_err(),
            OfferError::NotInDraftPhase(OfferPhase::Sent)
        );
    }

    #[test]
    fn accept_requires_sent() {
        let mut offer = draft();
        assert_eq!(offer.accept().unwrap_err(), OfferError::NotSent(OfferPhase::Draft));

        let mut offer = sent();
        offer.accept().unwrap();
        assert_eq!(offer.phase, OfferPhase::Won);
        assert_eq!(offer.probability, 100);
    }

    #[test]
    fn reject_appends_reason_to_existing_notes() {
        let mut offer = sent();
        offer.reject(Some("Too expensive".to_string())).unwrap();

        assert_eq!(offer.phase, OfferPhase::Lost);
        assert_eq!(offer.probability, 0);
        assert_eq!(
            offer.notes.as_deref(),
            Some("Customer wants steel\n\nLost reason: Too expensive")
        );
    }

    #[test]
    fn reject_without_notes_sets_reason() {
        let mut offer = sent();
        offer.notes = None;
        offer.reject(Some("Timing".to_string())).unwrap();
        assert_eq!(offer.notes.as_deref(), Some("Lost reason: Timing"));
    }

    #[test]
    fn expire_draft_issues_number() {
        let mut offer = draft();
        offer.expire(Some(number(2))).unwrap();
        assert_eq!(offer.phase, OfferPhase::Expired);
        assert_eq!(offer.offer_number, Some(number(2)));
    }

    #[test]
    fn closed_offer_cannot_expire_or_update() {
        let mut offer = sent();
        offer.accept().unwrap();
        assert_eq!(offer.expire(None).unwrap_err(), OfferError::AlreadyClosed);
        assert_eq!(
            offer.update(OfferPatch::default()).unwrap_err(),
            OfferError::AlreadyClosed
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Advance
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn advance_out_of_draft_issues_number() {
        let mut offer = draft();
        offer.advance(OfferPhase::InProgress, Some(number(4)), 60).unwrap();
        assert_eq!(offer.phase, OfferPhase::InProgress);
        assert_eq!(offer.offer_number, Some(number(4)));
    }

    #[test]
    fn advance_back_to_draft_clears_number() {
        let mut offer =
            Offer::create(new_offer(OfferPhase::InProgress), Some(number(4)), &caller()).unwrap();
        offer.advance(OfferPhase::Draft, None, 60).unwrap();
        assert_eq!(offer.phase, OfferPhase::Draft);
        assert_eq!(offer.offer_number, None);
    }

    #[test]
    fn advance_sent_back_to_in_progress_clears_dates() {
        let mut offer = sent();
        offer.advance(OfferPhase::InProgress, None, 60).unwrap();
        assert_eq!(offer.sent_date, None);
        assert_eq!(offer.expiration_date, None);
        assert!(offer.offer_number.is_some());
    }

    #[test]
    fn advance_refuses_closed_targets() {
        let mut offer = sent();
        assert_eq!(
            offer.advance(OfferPhase::Won, None, 60).unwrap_err(),
            OfferError::InvalidPhaseTransition {
                from: OfferPhase::Sent,
                to: OfferPhase::Won
            }
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Update / clone / totals
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn manual_number_rules() {
        let mut offer = draft();
        let set = OfferPatch {
            offer_number: Some(Some(number(8))),
            ..Default::default()
        };
        assert_eq!(offer.update(set).unwrap_err(), OfferError::DraftCannotHaveNumber);

        let mut offer = sent();
        let clear = OfferPatch {
            offer_number: Some(None),
            ..Default::default()
        };
        assert_eq!(offer.update(clear).unwrap_err(), OfferError::NonDraftMustHaveNumber);
    }

    #[test]
    fn clone_restarts_as_unnumbered_draft() {
        let mut original = sent();
        original.project_id = Some(ProjectId::new());
        let copy = original.clone_as_draft(None, &caller()).unwrap();

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.title, "Copy of Hall roof");
        assert_eq!(copy.phase, OfferPhase::Draft);
        assert_eq!(copy.offer_number, None);
        assert_eq!(copy.project_id, None);
        assert_eq!(copy.value, original.value);
        assert_eq!(copy.customer_id, original.customer_id);
    }

    #[test]
    fn clone_uses_new_title_when_given() {
        let copy = draft()
            .clone_as_draft(Some("Hall roof v2".to_string()), &caller())
            .unwrap();
        assert_eq!(copy.title, "Hall roof v2");
    }

    #[test]
    fn budget_summary_drives_value_and_latches_detail_flag() {
        let mut offer = draft();
        let summary = BudgetSummary {
            line_count: 2,
            total_cost: 80_000.0,
            total_revenue: 100_000.0,
            total_profit: 20_000.0,
            margin_percent: 20.0,
        };
        offer.apply_budget_summary(&summary);
        offer.apply_budget_summary(&summary);
        assert_eq!(offer.value, 100_000.0);
        assert_eq!(offer.cost, 80_000.0);
        assert_eq!(offer.margin_percent, 20.0);
        assert!(offer.has_detailed_budget);

        offer.apply_budget_summary(&BudgetSummary::default());
        assert_eq!(offer.value, 0.0);
        assert!(offer.has_detailed_budget);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Offer-number invariant under arbitrary operation sequences
    // ════════════════════════════════════════════════════════════════════════════

    #[derive(Debug, Clone)]
    enum Op {
        Send,
        Accept,
        Reject,
        Expire,
        Advance(OfferPhase),
        Clone,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Send),
            Just(Op::Accept),
            Just(Op::Reject),
            Just(Op::Expire),
            Just(Op::Clone),
            prop_oneof![
                Just(OfferPhase::Draft),
                Just(OfferPhase::InProgress),
                Just(OfferPhase::Sent),
                Just(OfferPhase::Won),
            ]
            .prop_map(Op::Advance),
        ]
    }

    proptest! {
        #[test]
        fn draft_iff_unnumbered_after_any_sequence(ops in prop::collection::vec(op(), 0..20)) {
            let mut offer = draft();
            let mut seq = 0u32;
            for op in ops {
                let target = match &op {
                    Op::Send | Op::Accept | Op::Reject => OfferPhase::Sent,
                    Op::Expire => OfferPhase::Expired,
                    Op::Advance(phase) => *phase,
                    Op::Clone => OfferPhase::Draft,
                };
                let issued = if offer.needs_number_for(target) {
                    seq += 1;
                    Some(number(seq))
                } else {
                    None
                };
                let _ = match op {
                    Op::Send => offer.send(issued, 60),
                    Op::Accept => offer.accept(),
                    Op::Reject => offer.reject(Some("no".to_string())),
                    Op::Expire => offer.expire(issued),
                    Op::Advance(phase) => offer.advance(phase, issued, 60),
                    Op::Clone => offer.clone_as_draft(None, &caller()).map(|copy| offer = copy),
                };
                prop_assert_eq!(offer.phase == OfferPhase::Draft, offer.offer_number.is_none());
            }
        }
    }
}

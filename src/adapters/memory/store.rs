//! In-memory persistence for tests and local development.
//!
//! All state lives behind one mutex. A commit clones the current state,
//! applies the change set to the clone and swaps it in only when every
//! change succeeded, which gives the same all-or-nothing behaviour as a
//! database transaction.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::budget::{BudgetCategory, BudgetLine, BudgetParent, BudgetSummary};
use crate::domain::deal::{newest_first, Deal, StageHistoryEntry};
use crate::domain::foundation::{
    BudgetLineId, CategoryId, CompanyId, DealId, DomainError, ErrorCode, OfferId, ProjectId,
};
use crate::domain::offer::Offer;
use crate::domain::project::Project;
use crate::ports::{
    BudgetCategoryReader, BudgetLineReader, Change, ChangeSet, CommitOutcome, DealReader,
    NumberSequence, OfferReader, Page, PageRequest, ProjectReader, StageHistoryReader, UnitOfWork,
};

#[derive(Debug, Clone, Default)]
struct State {
    deals: HashMap<DealId, Deal>,
    offers: HashMap<OfferId, Offer>,
    projects: HashMap<ProjectId, Project>,
    lines: HashMap<BudgetLineId, BudgetLine>,
    history: Vec<StageHistoryEntry>,
    categories: HashMap<CategoryId, BudgetCategory>,
    sequences: HashMap<(CompanyId, i32), u32>,
}

impl State {
    fn lines_of(&self, parent: &BudgetParent) -> Vec<BudgetLine> {
        let mut lines: Vec<BudgetLine> = self
            .lines
            .values()
            .filter(|line| &line.parent == parent)
            .cloned()
            .collect();
        lines.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        lines
    }

    fn apply(&mut self, change: Change, outcome: &mut CommitOutcome) -> Result<(), DomainError> {
        match change {
            Change::InsertDeal(deal) => {
                if self.deals.contains_key(&deal.id) {
                    return Err(conflict("deal", deal.id));
                }
                self.deals.insert(deal.id, deal);
            }
            Change::UpdateDeal(deal) => {
                let slot = self.deals.get_mut(&deal.id).ok_or_else(|| {
                    DomainError::new(ErrorCode::DealNotFound, format!("deal {} not found", deal.id))
                })?;
                *slot = deal;
            }
            Change::InsertOffer(offer) => {
                if self.offers.contains_key(&offer.id) {
                    return Err(conflict("offer", offer.id));
                }
                self.ensure_unique_number(&offer)?;
                self.offers.insert(offer.id, offer);
            }
            Change::UpdateOffer(mut offer) => {
                let stored = self.offers.get(&offer.id).ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::OfferNotFound,
                        format!("offer {} not found", offer.id),
                    )
                })?;
                offer.keep_budget_totals(stored);
                self.ensure_unique_number(&offer)?;
                self.offers.insert(offer.id, offer);
            }
            Change::InsertProject(project) => {
                if self.projects.contains_key(&project.id) {
                    return Err(conflict("project", project.id));
                }
                self.projects.insert(project.id, project);
            }
            Change::UpdateProject(mut project) => {
                let slot = self
                    .projects
                    .get_mut(&project.id)
                    .ok_or_else(|| project_not_found(&project.id))?;
                project.keep_budget_totals(slot);
                *slot = project;
            }
            Change::SetProjectBudget(project) => {
                let slot = self
                    .projects
                    .get_mut(&project.id)
                    .ok_or_else(|| project_not_found(&project.id))?;
                slot.value = project.value;
                slot.cost = project.cost;
                slot.health = project.health;
                slot.has_detailed_budget = project.has_detailed_budget;
                slot.updated_at = project.updated_at;
            }
            Change::InsertBudgetLine(line) => {
                if self.lines.contains_key(&line.id) {
                    return Err(conflict("budget line", line.id));
                }
                self.lines.insert(line.id, line);
            }
            Change::UpdateBudgetLine(line) => {
                let slot = self
                    .lines
                    .get_mut(&line.id)
                    .ok_or_else(|| line_not_found(&line.id))?;
                *slot = line;
            }
            Change::DeleteBudgetLine(id) => {
                self.lines.remove(&id).ok_or_else(|| line_not_found(&id))?;
            }
            Change::DeleteBudgetLinesByParent(parent) => {
                self.lines.retain(|_, line| line.parent != parent);
            }
            Change::ReorderBudgetLines {
                parent,
                ordered_ids,
            } => {
                for (position, id) in ordered_ids.iter().enumerate() {
                    let line = self
                        .lines
                        .get_mut(id)
                        .filter(|line| line.parent == parent)
                        .ok_or_else(|| line_not_found(id))?;
                    line.display_order = position as u32;
                }
            }
            Change::RecomputeParentAggregate(parent) => {
                let summary = BudgetSummary::from_lines(&self.lines_of(&parent));
                match parent {
                    BudgetParent::Offer(id) => {
                        let offer = self.offers.get_mut(&id).ok_or_else(|| {
                            DomainError::new(
                                ErrorCode::OfferNotFound,
                                format!("offer {} not found", id),
                            )
                        })?;
                        offer.apply_budget_summary(&summary);
                    }
                    BudgetParent::Project(id) => {
                        let project = self
                            .projects
                            .get_mut(&id)
                            .ok_or_else(|| project_not_found(&id))?;
                        project.apply_budget_summary(&summary);
                    }
                }
                outcome.recomputed.push((parent, summary));
            }
            Change::AppendStageHistory(entry) => {
                self.history.push(entry);
            }
        }
        Ok(())
    }

    fn ensure_unique_number(&self, offer: &Offer) -> Result<(), DomainError> {
        let Some(number) = &offer.offer_number else {
            return Ok(());
        };
        let taken = self
            .offers
            .values()
            .any(|other| other.id != offer.id && other.offer_number.as_ref() == Some(number));
        if taken {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("offer number {} is already in use", number),
            ));
        }
        Ok(())
    }
}

fn conflict(what: &str, id: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::Conflict, format!("{} {} already exists", what, id))
}

fn project_not_found(id: &ProjectId) -> DomainError {
    DomainError::new(
        ErrorCode::ProjectNotFound,
        format!("project {} not found", id),
    )
}

fn line_not_found(id: &BudgetLineId) -> DomainError {
    DomainError::new(
        ErrorCode::BudgetLineNotFound,
        format!("budget line {} not found", id),
    )
}

/// In-memory implementation of every persistence port.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    fail_next_commit: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next commit fail after all changes were applied to the
    /// working copy, so callers can observe that nothing was persisted.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    // === Seeding ===

    pub fn add_category(&self, category: BudgetCategory) {
        self.state_unchecked().categories.insert(category.id, category);
    }

    pub fn seed_deal(&self, deal: Deal) {
        self.state_unchecked().deals.insert(deal.id, deal);
    }

    pub fn seed_offer(&self, offer: Offer) {
        self.state_unchecked().offers.insert(offer.id, offer);
    }

    pub fn seed_project(&self, project: Project) {
        self.state_unchecked().projects.insert(project.id, project);
    }

    pub fn seed_line(&self, line: BudgetLine) {
        self.state_unchecked().lines.insert(line.id, line);
    }

    // === Inspection ===

    pub fn deal(&self, id: &DealId) -> Option<Deal> {
        self.state_unchecked().deals.get(id).cloned()
    }

    pub fn offer(&self, id: &OfferId) -> Option<Offer> {
        self.state_unchecked().offers.get(id).cloned()
    }

    pub fn project(&self, id: &ProjectId) -> Option<Project> {
        self.state_unchecked().projects.get(id).cloned()
    }

    pub fn lines_of(&self, parent: &BudgetParent) -> Vec<BudgetLine> {
        self.state_unchecked().lines_of(parent)
    }

    pub fn offer_count(&self) -> usize {
        self.state_unchecked().offers.len()
    }

    pub fn project_count(&self) -> usize {
        self.state_unchecked().projects.len()
    }

    pub fn history_of(&self, deal_id: &DealId) -> Vec<StageHistoryEntry> {
        self.state_unchecked()
            .history
            .iter()
            .filter(|entry| &entry.deal_id == deal_id)
            .cloned()
            .collect()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "in-memory store lock poisoned"))
    }

    /// Seeding and inspection recover a poisoned lock instead of failing.
    fn state_unchecked(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DealReader for InMemoryStore {
    async fn find_by_id(&self, id: &DealId) -> Result<Option<Deal>, DomainError> {
        Ok(self.state()?.deals.get(id).cloned())
    }
}

#[async_trait]
impl StageHistoryReader for InMemoryStore {
    async fn list_for_deal(&self, deal_id: &DealId) -> Result<Vec<StageHistoryEntry>, DomainError> {
        let mut entries: Vec<StageHistoryEntry> = self
            .state()?
            .history
            .iter()
            .rev()
            .filter(|entry| &entry.deal_id == deal_id)
            .cloned()
            .collect();
        // Stable sort; entries sharing a timestamp stay latest-appended first.
        newest_first(&mut entries);
        Ok(entries)
    }
}

#[async_trait]
impl OfferReader for InMemoryStore {
    async fn find_by_id(&self, id: &OfferId) -> Result<Option<Offer>, DomainError> {
        Ok(self.state()?.offers.get(id).cloned())
    }
}

#[async_trait]
impl ProjectReader for InMemoryStore {
    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
        Ok(self.state()?.projects.get(id).cloned())
    }
}

#[async_trait]
impl BudgetLineReader for InMemoryStore {
    async fn find_by_id(&self, id: &BudgetLineId) -> Result<Option<BudgetLine>, DomainError> {
        Ok(self.state()?.lines.get(id).cloned())
    }

    async fn list_by_parent(&self, parent: &BudgetParent) -> Result<Vec<BudgetLine>, DomainError> {
        Ok(self.state()?.lines_of(parent))
    }

    async fn list_by_parent_paginated(
        &self,
        parent: &BudgetParent,
        request: PageRequest,
    ) -> Result<Page<BudgetLine>, DomainError> {
        let lines = self.state()?.lines_of(parent);
        let total = lines.len() as u64;
        let items = lines
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.page_size() as usize)
            .collect();
        Ok(Page::new(items, total, request))
    }

    async fn count_by_parent(&self, parent: &BudgetParent) -> Result<u32, DomainError> {
        let state = self.state()?;
        Ok(state.lines.values().filter(|l| &l.parent == parent).count() as u32)
    }
}

#[async_trait]
impl BudgetCategoryReader for InMemoryStore {
    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<BudgetCategory>, DomainError> {
        Ok(self.state()?.categories.get(id).cloned())
    }
}

#[async_trait]
impl NumberSequence for InMemoryStore {
    async fn next_value(&self, company: &CompanyId, year: i32) -> Result<u32, DomainError> {
        let mut state = self.state()?;
        let counter = state.sequences.entry((company.clone(), year)).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    async fn commit(&self, changes: ChangeSet) -> Result<CommitOutcome, DomainError> {
        let mut state = self.state()?;
        let mut working = state.clone();
        let mut outcome = CommitOutcome::default();

        for change in changes.into_changes() {
            working.apply(change, &mut outcome)?;
        }

        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(DomainError::database(
                "Failed to commit change set",
                "simulated failure",
            ));
        }

        *state = working;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::budget::{LineDetails, LineName, Pricing};
    use crate::domain::foundation::{Caller, CompanyId, Role, UserId};
    use crate::domain::offer::{NewOffer, OfferPhase};
    use crate::domain::project::{NewProject, ProjectHealth};

    fn caller() -> Caller {
        Caller::new(
            UserId::new("user-1").unwrap(),
            vec![Role::Market],
            CompanyId::new("stalbygg").unwrap(),
        )
    }

    fn draft_offer() -> Offer {
        Offer::create(
            NewOffer {
                title: "Warehouse".to_string(),
                customer_id: None,
                customer_name: None,
                company_id: CompanyId::new("stalbygg").unwrap(),
                phase: OfferPhase::Draft,
                probability: 10,
                value: 0.0,
                responsible_user_id: None,
                description: None,
                notes: None,
                due_date: None,
                deal_id: None,
            },
            None,
            &caller(),
        )
        .unwrap()
    }

    fn line(parent: BudgetParent, cost: f64, revenue: f64, order: u32) -> BudgetLine {
        BudgetLine::create(
            parent,
            LineName::custom("Steel"),
            LineDetails::default(),
            Pricing::fixed(cost, revenue),
            order,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn recompute_writes_summary_onto_offer() {
        let store = InMemoryStore::new();
        let offer = draft_offer();
        let parent = BudgetParent::Offer(offer.id);
        store.seed_offer(offer.clone());

        let outcome = store
            .commit(
                ChangeSet::new()
                    .with(Change::InsertBudgetLine(line(parent, 80.0, 100.0, 0)))
                    .with(Change::InsertBudgetLine(line(parent, 20.0, 50.0, 1)))
                    .with(Change::RecomputeParentAggregate(parent)),
            )
            .await
            .unwrap();

        let summary = outcome.summary_for(&parent).unwrap();
        assert_eq!(summary.line_count, 2);
        let stored = store.offer(&offer.id).unwrap();
        assert_eq!(stored.value, 150.0);
        assert_eq!(stored.cost, 100.0);
        assert!(stored.has_detailed_budget);
    }

    #[tokio::test]
    async fn stale_offer_update_keeps_recomputed_totals() {
        let store = InMemoryStore::new();
        let offer = draft_offer();
        let parent = BudgetParent::Offer(offer.id);
        store.seed_offer(offer.clone());

        // A line lands after the offer was read.
        let mut snapshot = offer.clone();
        store
            .commit(
                ChangeSet::new()
                    .with(Change::InsertBudgetLine(line(parent, 120.0, 200.0, 0)))
                    .with(Change::RecomputeParentAggregate(parent)),
            )
            .await
            .unwrap();

        snapshot.title = "Warehouse extension".to_string();
        store
            .commit(ChangeSet::new().with(Change::UpdateOffer(snapshot)))
            .await
            .unwrap();

        let stored = store.offer(&offer.id).unwrap();
        assert_eq!(stored.title, "Warehouse extension");
        assert_eq!(stored.value, 200.0);
        assert_eq!(stored.cost, 120.0);
        assert!((stored.margin_percent - 40.0).abs() < 1e-9);
        assert!(stored.has_detailed_budget);
    }

    #[tokio::test]
    async fn stale_project_update_keeps_value_and_reclassifies_health() {
        let store = InMemoryStore::new();
        let project = Project::create(
            NewProject {
                name: "Hall".to_string(),
                customer_id: None,
                customer_name: None,
                company_id: CompanyId::new("stalbygg").unwrap(),
                phase: None,
                value: 0.0,
                manager_id: None,
                description: None,
                start_date: None,
                end_date: None,
            },
            &caller(),
        )
        .unwrap();
        let parent = BudgetParent::Project(project.id);
        store.seed_project(project.clone());

        let mut snapshot = project.clone();
        store
            .commit(
                ChangeSet::new()
                    .with(Change::InsertBudgetLine(line(parent, 80.0, 100.0, 0)))
                    .with(Change::RecomputeParentAggregate(parent)),
            )
            .await
            .unwrap();

        snapshot.record_spend(115.0).unwrap();
        store
            .commit(ChangeSet::new().with(Change::UpdateProject(snapshot)))
            .await
            .unwrap();

        let stored = store.project(&project.id).unwrap();
        assert_eq!(stored.spent, 115.0);
        assert_eq!(stored.value, 100.0);
        assert_eq!(stored.cost, 80.0);
        assert!(stored.has_detailed_budget);
        assert_eq!(stored.health, ProjectHealth::AtRisk);
    }

    #[tokio::test]
    async fn failed_change_leaves_state_untouched() {
        let store = InMemoryStore::new();
        let offer = draft_offer();
        let parent = BudgetParent::Offer(offer.id);
        store.seed_offer(offer);

        let result = store
            .commit(
                ChangeSet::new()
                    .with(Change::InsertBudgetLine(line(parent, 80.0, 100.0, 0)))
                    .with(Change::DeleteBudgetLine(BudgetLineId::new())),
            )
            .await;

        assert_eq!(result.unwrap_err().code, ErrorCode::BudgetLineNotFound);
        assert!(store.lines_of(&parent).is_empty());
    }

    #[tokio::test]
    async fn failure_switch_rolls_back_once() {
        let store = InMemoryStore::new();
        let offer = draft_offer();
        let parent = BudgetParent::Offer(offer.id);
        store.seed_offer(offer);
        store.fail_next_commit();

        let first = store
            .commit(ChangeSet::new().with(Change::InsertBudgetLine(line(parent, 1.0, 1.0, 0))))
            .await;
        assert!(first.is_err());
        assert!(store.lines_of(&parent).is_empty());

        store
            .commit(ChangeSet::new().with(Change::InsertBudgetLine(line(parent, 1.0, 1.0, 0))))
            .await
            .unwrap();
        assert_eq!(store.lines_of(&parent).len(), 1);
    }

    #[tokio::test]
    async fn reorder_rejects_lines_of_another_parent() {
        let store = InMemoryStore::new();
        let parent = BudgetParent::Offer(OfferId::new());
        let other = BudgetParent::Offer(OfferId::new());
        let foreign = line(other, 1.0, 1.0, 0);
        store.seed_line(foreign.clone());

        let result = store
            .commit(ChangeSet::new().with(Change::ReorderBudgetLines {
                parent,
                ordered_ids: vec![foreign.id],
            }))
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn sequence_counts_per_company_and_year() {
        let store = InMemoryStore::new();
        let stalbygg = CompanyId::new("stalbygg").unwrap();
        let tak = CompanyId::new("tak").unwrap();

        assert_eq!(store.next_value(&stalbygg, 2025).await.unwrap(), 1);
        assert_eq!(store.next_value(&stalbygg, 2025).await.unwrap(), 2);
        assert_eq!(store.next_value(&tak, 2025).await.unwrap(), 1);
        assert_eq!(store.next_value(&stalbygg, 2026).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn paginated_listing_slices_in_display_order() {
        let store = InMemoryStore::new();
        let parent = BudgetParent::Project(ProjectId::new());
        for order in 0..5 {
            store.seed_line(line(parent, 1.0 + order as f64, 2.0, order));
        }

        let page = store
            .list_by_parent_paginated(&parent, PageRequest::new(2, 2))
            .await
            .unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        let orders: Vec<u32> = page.items.iter().map(|l| l.display_order).collect();
        assert_eq!(orders, vec![2, 3]);
    }

    #[tokio::test]
    async fn duplicate_offer_number_is_a_conflict() {
        let store = InMemoryStore::new();
        let mut first = draft_offer();
        first.send(Some(crate::domain::offer::OfferNumber::format("ST", 2025, 1)), 60).unwrap();
        let mut second = draft_offer();
        second.send(Some(crate::domain::offer::OfferNumber::format("ST", 2025, 1)), 60).unwrap();
        store.seed_offer(first);

        let err = store
            .commit(ChangeSet::new().with(Change::InsertOffer(second)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }
}

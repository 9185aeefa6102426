//! WinDealHandler - Command handler for closing a deal as won.
//!
//! Optionally materializes the delivery project in the same transaction,
//! inheriting the linked offer's budget when there is one.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::CommandError;
use crate::domain::activity::{ActivityEntry, Notification, NotificationKind};
use crate::domain::budget::BudgetParent;
use crate::domain::deal::{Deal, StageHistoryEntry};
use crate::domain::foundation::{CommandMetadata, DealId};
use crate::domain::project::Project;
use crate::ports::{
    ActivityRecorder, BudgetLineReader, Change, ChangeSet, DealReader, NotificationSink,
    OfferReader, UnitOfWork,
};

use super::super::support::{
    copy_budget_to_new_parent, ensure_can_modify, load_deal, record_activity, send_notification,
};

#[derive(Debug, Clone)]
pub struct WinDealCommand {
    pub deal_id: DealId,
    pub notes: Option<String>,
    pub create_project: bool,
}

#[derive(Debug, Clone)]
pub struct WinDealResult {
    pub deal: Deal,
    pub history: StageHistoryEntry,
    pub project: Option<Project>,
}

pub struct WinDealHandler {
    deals: Arc<dyn DealReader>,
    offers: Arc<dyn OfferReader>,
    lines: Arc<dyn BudgetLineReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
    notifications: Arc<dyn NotificationSink>,
}

impl WinDealHandler {
    pub fn new(
        deals: Arc<dyn DealReader>,
        offers: Arc<dyn OfferReader>,
        lines: Arc<dyn BudgetLineReader>,
        uow: Arc<dyn UnitOfWork>,
        activities: Arc<dyn ActivityRecorder>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            deals,
            offers,
            lines,
            uow,
            activities,
            notifications,
        }
    }

    pub async fn handle(
        &self,
        cmd: WinDealCommand,
        metadata: CommandMetadata,
    ) -> Result<WinDealResult, CommandError> {
        let caller = &metadata.caller;

        // 1. Load and authorize
        let mut deal = load_deal(self.deals.as_ref(), cmd.deal_id).await?;
        ensure_can_modify(caller, &deal)?;

        // 2. Close the deal
        let history = deal.win(cmd.notes, caller)?;
        let mut changes = ChangeSet::new()
            .with(Change::UpdateDeal(deal.clone()))
            .with(Change::AppendStageHistory(history.clone()));

        // 3. Plan the project, budgeted from the linked offer when present
        let mut planned = None;
        if cmd.create_project {
            let linked = match deal.offer_id {
                Some(offer_id) => self.offers.find_by_id(&offer_id).await?,
                None => None,
            };
            let (budget, budget_source) = match &linked {
                Some(offer) => (offer.value, "linked offer"),
                None => (deal.value, "deal value"),
            };
            let project = Project::from_won_deal(&deal, budget, caller)?;
            changes.push(Change::InsertProject(project.clone()));

            if let Some(mut offer) = linked {
                let target = BudgetParent::Project(project.id);
                let copies =
                    copy_budget_to_new_parent(self.lines.as_ref(), BudgetParent::Offer(offer.id), target)
                        .await?;
                if !copies.is_empty() {
                    changes.extend(copies.into_iter().map(Change::InsertBudgetLine));
                    changes.push(Change::RecomputeParentAggregate(target));
                }
                if offer.project_id.is_none() {
                    offer.link_project(project.id);
                    changes.push(Change::UpdateOffer(offer));
                }
            }
            planned = Some((project, budget_source));
        }

        // 4. Commit everything at once
        let outcome = self.uow.commit(changes).await?;
        let project = planned.map(|(mut project, budget_source)| {
            if let Some(summary) = outcome.summary_for(&BudgetParent::Project(project.id)) {
                project.apply_budget_summary(summary);
            }
            (project, budget_source)
        });
        info!(deal_id = %deal.id, with_project = project.is_some(), "deal won");

        // 5. Side effects
        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(
                deal.id,
                "Deal won!",
                format!(
                    "Deal '{}' was won with value {} {:.2}",
                    deal.title, deal.currency, deal.value
                ),
                caller,
            ),
        )
        .await;
        if let Some((project, budget_source)) = &project {
            debug!(project_id = %project.id, budget_source = %budget_source, "project created from deal");
            record_activity(
                self.activities.as_ref(),
                ActivityEntry::new(
                    project.id,
                    "Project created from deal",
                    format!(
                        "Project '{}' created from won deal with budget {:.2} (from {})",
                        project.name, project.value, budget_source
                    ),
                    caller,
                ),
            )
            .await;
        }

        if deal.owner_id != caller.user_id {
            send_notification(
                self.notifications.as_ref(),
                Notification::new(
                    deal.owner_id.clone(),
                    NotificationKind::DealWon,
                    "Deal Won!",
                    format!(
                        "Congratulations! Deal '{}' has been won with value {} {:.2}",
                        deal.title, deal.currency, deal.value
                    ),
                    deal.id,
                ),
            )
            .await;
        }
        send_notification(
            self.notifications.as_ref(),
            Notification::new(
                caller.user_id.clone(),
                NotificationKind::DealWonConfirmation,
                "Deal Closed Successfully",
                format!(
                    "You've successfully closed deal '{}' with value {} {:.2}",
                    deal.title, deal.currency, deal.value
                ),
                deal.id,
            ),
        )
        .await;

        Ok(WinDealResult {
            deal,
            history,
            project: project.map(|(project, _)| project),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::fixtures::{manager, metadata, owner, stranger, Fixture};
    use crate::domain::deal::DealStage;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::offer::OfferPhase;
    use crate::domain::project::ProjectPhase;

    fn handler(f: &Fixture) -> WinDealHandler {
        WinDealHandler::new(
            f.store.clone(),
            f.store.clone(),
            f.store.clone(),
            f.store.clone(),
            f.activities.clone(),
            f.notifications.clone(),
        )
    }

    fn win(deal_id: DealId, create_project: bool) -> WinDealCommand {
        WinDealCommand {
            deal_id,
            notes: None,
            create_project,
        }
    }

    #[tokio::test]
    async fn wins_from_negotiation_without_project() {
        let f = Fixture::new();
        let deal = f.deal(DealStage::Negotiation);

        let result = handler(&f).handle(win(deal.id, false), metadata(owner())).await.unwrap();

        assert_eq!(result.deal.stage, DealStage::Won);
        assert_eq!(result.deal.probability, 100);
        assert!(result.deal.actual_close_date.is_some());
        assert!(result.project.is_none());
        assert_eq!(f.store.project_count(), 0);
        assert_eq!(f.activities.titles(), vec!["Deal won!".to_string()]);

        // the owner won it, so only the confirmation goes out
        let kinds: Vec<_> = f.notifications.sent().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::DealWonConfirmation]);
    }

    #[tokio::test]
    async fn project_budget_falls_back_to_deal_value() {
        let f = Fixture::new();
        let deal = f.deal(DealStage::Negotiation);

        let result = handler(&f).handle(win(deal.id, true), metadata(owner())).await.unwrap();

        let project = result.project.unwrap();
        assert_eq!(project.name, deal.title);
        assert_eq!(project.value, 100_000.0);
        assert_eq!(project.phase, ProjectPhase::Planning);
        assert_eq!(project.deal_id, Some(deal.id));
        assert_eq!(project.manager_id, Some(deal.owner_id.clone()));
        assert!(f.store.project(&project.id).is_some());

        let entries = f.activities.entries();
        assert_eq!(entries[1].title, "Project created from deal");
        assert!(entries[1].body.ends_with("(from deal value)"));
    }

    #[tokio::test]
    async fn project_inherits_linked_offer_budget() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::Won);
        f.line(BudgetParent::Offer(offer.id), "Steel", 60_000.0, 80_000.0);
        f.line(BudgetParent::Offer(offer.id), "Crane", 10_000.0, 12_000.0);
        let mut linked = f.store.offer(&offer.id).unwrap();
        linked.value = 92_000.0;
        f.store.seed_offer(linked);
        let mut deal = f.deal(DealStage::Negotiation);
        deal.offer_id = Some(offer.id);
        f.store.seed_deal(deal.clone());

        let result = handler(&f).handle(win(deal.id, true), metadata(owner())).await.unwrap();

        let project = result.project.unwrap();
        assert_eq!(project.value, 92_000.0);
        assert_eq!(project.cost, 70_000.0);
        assert!(project.has_detailed_budget);
        assert_eq!(project.offer_id, Some(offer.id));
        assert_eq!(f.store.lines_of(&BudgetParent::Project(project.id)).len(), 2);
        assert_eq!(f.store.offer(&offer.id).unwrap().project_id, Some(project.id));
    }

    #[tokio::test]
    async fn manager_win_notifies_owner_and_confirms_to_caller() {
        let f = Fixture::new();
        let deal = f.deal(DealStage::Negotiation);

        handler(&f).handle(win(deal.id, false), metadata(manager())).await.unwrap();

        let sent = f.notifications.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].kind, NotificationKind::DealWon);
        assert_eq!(sent[0].recipient, owner().user_id);
        assert_eq!(sent[1].kind, NotificationKind::DealWonConfirmation);
        assert_eq!(sent[1].recipient, manager().user_id);
    }

    #[tokio::test]
    async fn requires_negotiation() {
        let f = Fixture::new();
        let deal = f.deal(DealStage::Proposal);

        let err = handler(&f).handle(win(deal.id, true), metadata(owner())).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::DealNotInNegotiation);
        assert_eq!(f.store.project_count(), 0);
    }

    #[tokio::test]
    async fn failed_commit_leaves_deal_open() {
        let f = Fixture::new();
        let deal = f.deal(DealStage::Negotiation);
        f.store.fail_next_commit();

        let err = handler(&f).handle(win(deal.id, true), metadata(owner())).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert_eq!(f.store.deal(&deal.id).unwrap().stage, DealStage::Negotiation);
        assert_eq!(f.store.project_count(), 0);
        assert!(f.activities.entries().is_empty());
    }

    #[tokio::test]
    async fn stranger_cannot_win() {
        let f = Fixture::new();
        let deal = f.deal(DealStage::Negotiation);

        let err = handler(&f).handle(win(deal.id, false), metadata(stranger())).await.unwrap_err();

        assert!(matches!(err, CommandError::Forbidden(_)));
    }
}

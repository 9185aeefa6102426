//! AcceptOfferHandler - Command handler for a customer accepting an offer.
//!
//! With `create_project` the delivery project is created from the offer,
//! inherits its budget lines and is linked back to the offer, all in the
//! same transaction as the phase change.

use std::sync::Arc;

use tracing::info;

use crate::application::CommandError;
use crate::domain::activity::{ActivityEntry, NotificationKind};
use crate::domain::budget::BudgetParent;
use crate::domain::foundation::{CommandMetadata, OfferId};
use crate::domain::offer::Offer;
use crate::domain::project::Project;
use crate::ports::{
    ActivityRecorder, BudgetLineReader, Change, ChangeSet, NotificationSink, OfferReader,
    UnitOfWork,
};

use super::super::support::{
    copy_budget_to_new_parent, ensure_can_modify, load_offer, record_activity,
};
use super::notify_responsible;

#[derive(Debug, Clone)]
pub struct AcceptOfferCommand {
    pub offer_id: OfferId,
    pub create_project: bool,
    /// Defaults to the offer title.
    pub project_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AcceptOfferResult {
    pub offer: Offer,
    pub project: Option<Project>,
}

pub struct AcceptOfferHandler {
    offers: Arc<dyn OfferReader>,
    lines: Arc<dyn BudgetLineReader>,
    uow: Arc<dyn UnitOfWork>,
    activities: Arc<dyn ActivityRecorder>,
    notifications: Arc<dyn NotificationSink>,
}

impl AcceptOfferHandler {
    pub fn new(
        offers: Arc<dyn OfferReader>,
        lines: Arc<dyn BudgetLineReader>,
        uow: Arc<dyn UnitOfWork>,
        activities: Arc<dyn ActivityRecorder>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            offers,
            lines,
            uow,
            activities,
            notifications,
        }
    }

    pub async fn handle(
        &self,
        cmd: AcceptOfferCommand,
        metadata: CommandMetadata,
    ) -> Result<AcceptOfferResult, CommandError> {
        let caller = &metadata.caller;

        // 1. Load and authorize
        let mut offer = load_offer(self.offers.as_ref(), cmd.offer_id).await?;
        ensure_can_modify(caller, &offer)?;

        // 2. sent -> won
        let from = offer.phase;
        offer.accept()?;
        let mut changes = ChangeSet::new();

        // 3. Materialize the project with a copy of the budget
        let mut project = None;
        if cmd.create_project {
            let created = Project::from_won_offer(&offer, cmd.project_name, caller)?;
            let target = BudgetParent::Project(created.id);
            let copies =
                copy_budget_to_new_parent(self.lines.as_ref(), BudgetParent::Offer(offer.id), target)
                    .await?;

            changes.push(Change::InsertProject(created.clone()));
            if !copies.is_empty() {
                changes.extend(copies.into_iter().map(Change::InsertBudgetLine));
                changes.push(Change::RecomputeParentAggregate(target));
            }
            offer.link_project(created.id);
            project = Some(created);
        }
        changes.push(Change::UpdateOffer(offer.clone()));

        // 4. Commit
        let outcome = self.uow.commit(changes).await?;
        if let Some(project) = project.as_mut() {
            if let Some(summary) = outcome.summary_for(&BudgetParent::Project(project.id)) {
                project.apply_budget_summary(summary);
            }
        }
        info!(
            offer_id = %offer.id,
            project_id = ?project.as_ref().map(|p| p.id),
            "offer accepted"
        );

        // 5. Side effects
        let message = format!("Offer '{}' was accepted (phase: {} -> {})", offer.title, from, offer.phase);
        record_activity(
            self.activities.as_ref(),
            ActivityEntry::new(offer.id, "Offer accepted", message.clone(), caller),
        )
        .await;
        if let Some(project) = &project {
            record_activity(
                self.activities.as_ref(),
                ActivityEntry::new(
                    project.id,
                    "Project created",
                    format!(
                        "Project '{}' was created from offer '{}'",
                        project.name, offer.title
                    ),
                    caller,
                ),
            )
            .await;
        }
        notify_responsible(
            self.notifications.as_ref(),
            &offer,
            caller,
            NotificationKind::OfferAccepted,
            "Offer accepted",
            message,
        )
        .await;

        Ok(AcceptOfferResult { offer, project })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::fixtures::{metadata, owner, stranger, Fixture};
    use crate::domain::foundation::ErrorCode;
    use crate::domain::offer::OfferPhase;
    use crate::domain::project::ProjectPhase;

    fn handler(f: &Fixture) -> AcceptOfferHandler {
        AcceptOfferHandler::new(
            f.store.clone(),
            f.store.clone(),
            f.store.clone(),
            f.activities.clone(),
            f.notifications.clone(),
        )
    }

    fn accept(offer_id: OfferId, create_project: bool) -> AcceptOfferCommand {
        AcceptOfferCommand {
            offer_id,
            create_project,
            project_name: None,
        }
    }

    #[tokio::test]
    async fn accepts_without_project() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::Sent);

        let result = handler(&f).handle(accept(offer.id, false), metadata(owner())).await.unwrap();

        assert_eq!(result.offer.phase, OfferPhase::Won);
        assert_eq!(result.offer.probability, 100);
        assert!(result.project.is_none());
        assert_eq!(f.store.project_count(), 0);
        assert_eq!(f.store.offer(&offer.id).unwrap().phase, OfferPhase::Won);
    }

    #[tokio::test]
    async fn project_inherits_lines_and_value() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::Sent);
        let parent = BudgetParent::Offer(offer.id);
        f.line(parent, "Steel", 50_000.0, 70_000.0);
        f.line(parent, "Labour", 20_000.0, 30_000.0);

        let result = handler(&f)
            .handle(
                AcceptOfferCommand {
                    offer_id: offer.id,
                    create_project: true,
                    project_name: Some("Roof delivery".to_string()),
                },
                metadata(owner()),
            )
            .await
            .unwrap();

        let project = result.project.unwrap();
        assert_eq!(project.name, "Roof delivery");
        assert_eq!(project.phase, ProjectPhase::Planning);
        assert_eq!(project.value, 100_000.0);
        assert_eq!(project.cost, 70_000.0);
        assert!(project.has_detailed_budget);
        assert_eq!(project.offer_id, Some(offer.id));

        let copied = f.store.lines_of(&BudgetParent::Project(project.id));
        let names: Vec<_> = copied.iter().map(|l| l.name.as_str().to_string()).collect();
        assert_eq!(names, vec!["Steel".to_string(), "Labour".to_string()]);
        assert_eq!(f.store.offer(&offer.id).unwrap().project_id, Some(project.id));
        assert_eq!(
            f.activities.titles(),
            vec!["Offer accepted".to_string(), "Project created".to_string()]
        );
    }

    #[tokio::test]
    async fn project_without_lines_keeps_offer_value() {
        let f = Fixture::new();
        let mut offer = f.offer(OfferPhase::Sent);
        offer.value = 45_000.0;
        f.store.seed_offer(offer.clone());

        let result = handler(&f).handle(accept(offer.id, true), metadata(owner())).await.unwrap();

        let project = result.project.unwrap();
        assert_eq!(project.name, offer.title);
        assert_eq!(project.value, 45_000.0);
        assert!(!project.has_detailed_budget);
    }

    #[tokio::test]
    async fn only_sent_offers_are_accepted() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::Draft);

        let err = handler(&f).handle(accept(offer.id, true), metadata(owner())).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::OfferNotSent);
        assert_eq!(f.store.project_count(), 0);
    }

    #[tokio::test]
    async fn failed_commit_rolls_back_project_and_lines() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::Sent);
        f.line(BudgetParent::Offer(offer.id), "Steel", 10.0, 20.0);
        f.store.fail_next_commit();

        let err = handler(&f).handle(accept(offer.id, true), metadata(owner())).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert_eq!(f.store.offer(&offer.id).unwrap().phase, OfferPhase::Sent);
        assert_eq!(f.store.project_count(), 0);
    }

    #[tokio::test]
    async fn stranger_cannot_accept() {
        let f = Fixture::new();
        let offer = f.offer(OfferPhase::Sent);

        let err = handler(&f).handle(accept(offer.id, false), metadata(stranger())).await.unwrap_err();

        assert!(matches!(err, CommandError::Forbidden(_)));
    }
}

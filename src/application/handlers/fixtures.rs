//! Shared fixtures for handler tests.

use std::sync::Arc;

use crate::adapters::memory::{InMemoryActivityLog, InMemoryNotificationSink, InMemoryStore};
use crate::domain::budget::{BudgetLine, BudgetParent, LineDetails, LineName, Pricing};
use crate::domain::deal::{Deal, DealStage, NewDeal};
use crate::domain::foundation::{
    Caller, CommandMetadata, CompanyId, CustomerId, Role, UserId,
};
use crate::domain::offer::{NewOffer, Offer, OfferNumber, OfferPhase};
use crate::domain::project::{NewProject, Project, ProjectPhase};

pub(crate) struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub activities: Arc<InMemoryActivityLog>,
    pub notifications: Arc<InMemoryNotificationSink>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            activities: Arc::new(InMemoryActivityLog::new()),
            notifications: Arc::new(InMemoryNotificationSink::new()),
        }
    }

    /// Fixture whose activity log and notification sink always fail.
    pub fn with_failing_sinks() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            activities: Arc::new(InMemoryActivityLog::failing()),
            notifications: Arc::new(InMemoryNotificationSink::failing()),
        }
    }

    pub fn deal(&self, stage: DealStage) -> Deal {
        let (mut deal, _) = Deal::create(
            NewDeal {
                title: "Hall extension".to_string(),
                description: Some("Steel hall".to_string()),
                customer_id: CustomerId::new(),
                customer_name: Some("Acme AS".to_string()),
                company_id: company(),
                value: 100_000.0,
                currency: "NOK".to_string(),
                probability: None,
                owner_id: owner().user_id,
                expected_close_date: None,
                source: None,
                notes: None,
            },
            &owner(),
        )
        .unwrap();
        deal.stage = stage;
        deal.probability = stage.default_probability();
        self.store.seed_deal(deal.clone());
        deal
    }

    pub fn offer(&self, phase: OfferPhase) -> Offer {
        let mut offer = Offer::create(
            NewOffer {
                title: "Warehouse roof".to_string(),
                customer_id: Some(CustomerId::new()),
                customer_name: Some("Acme AS".to_string()),
                company_id: company(),
                phase: OfferPhase::Draft,
                probability: 10,
                value: 0.0,
                responsible_user_id: Some(owner().user_id),
                description: Some("Roof replacement".to_string()),
                notes: None,
                due_date: None,
                deal_id: None,
            },
            None,
            &owner(),
        )
        .unwrap();
        if phase != OfferPhase::Draft {
            offer.offer_number = Some(OfferNumber::format("ST", 2025, 900));
            offer.phase = phase;
        }
        self.store.seed_offer(offer.clone());
        offer
    }

    pub fn project(&self, phase: ProjectPhase, value: f64) -> Project {
        let mut project = Project::create(
            NewProject {
                name: "Roof job".to_string(),
                customer_id: None,
                customer_name: None,
                company_id: company(),
                phase: None,
                value,
                manager_id: Some(owner().user_id),
                description: None,
                start_date: None,
                end_date: None,
            },
            &owner(),
        )
        .unwrap();
        project.phase = phase;
        self.store.seed_project(project.clone());
        project
    }

    pub fn line(&self, parent: BudgetParent, name: &str, cost: f64, revenue: f64) -> BudgetLine {
        let order = self.store.lines_of(&parent).len() as u32;
        let line = BudgetLine::create(
            parent,
            LineName::custom(name),
            LineDetails::default(),
            Pricing::fixed(cost, revenue),
            order,
        )
        .unwrap();
        self.store.seed_line(line.clone());
        line
    }
}

pub(crate) fn company() -> CompanyId {
    CompanyId::new("stalbygg").unwrap()
}

/// Creator and assignee of every seeded record.
pub(crate) fn owner() -> Caller {
    Caller::new(UserId::new("owner-1").unwrap(), vec![Role::Market], company())
        .with_display_name("Olav Owner")
}

pub(crate) fn manager() -> Caller {
    Caller::new(UserId::new("manager-1").unwrap(), vec![Role::Manager], company())
}

/// Neither owner, assignee nor manager of anything.
pub(crate) fn stranger() -> Caller {
    Caller::new(
        UserId::new("stranger-1").unwrap(),
        vec![Role::Viewer],
        CompanyId::new("tak").unwrap(),
    )
}

pub(crate) fn metadata(caller: Caller) -> CommandMetadata {
    CommandMetadata::new(caller).with_correlation_id("test-correlation")
}

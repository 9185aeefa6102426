//! Helpers shared by the command handlers.

use tracing::warn;

use crate::domain::activity::{ActivityEntry, Notification};
use crate::domain::budget::{clone_lines, BudgetError, BudgetLine, BudgetParent};
use crate::domain::deal::{Deal, DealError};
use crate::domain::foundation::{
    can_modify, Caller, CompanyId, DealId, Modifiable, OfferId, ProjectId, Timestamp,
};
use crate::domain::offer::{Offer, OfferError, OfferNumber};
use crate::domain::project::{Project, ProjectError};
use crate::ports::{
    ActivityRecorder, BudgetLineReader, DealReader, NotificationSink, NumberSequence, OfferReader,
    ProjectReader,
};

use crate::application::CommandError;

/// Fails with `Forbidden` unless `caller` may modify `entity`.
pub(crate) fn ensure_can_modify<T: Modifiable>(caller: &Caller, entity: &T) -> Result<(), CommandError> {
    if can_modify(caller, entity) {
        return Ok(());
    }
    warn!(
        user_id = %caller.user_id,
        resource_type = T::RESOURCE_TYPE,
        resource_id = %entity.resource_id(),
        "modification denied"
    );
    Err(CommandError::Forbidden(format!(
        "user {} may not modify {} {}",
        caller.user_id,
        T::RESOURCE_TYPE,
        entity.resource_id()
    )))
}

/// Fails with `Forbidden` unless `caller` may see records of the entity's
/// company. Used where a record is only read, such as a copy source.
pub(crate) fn ensure_can_read<T: Modifiable>(caller: &Caller, entity: &T) -> Result<(), CommandError> {
    if caller.can_access_company(entity.company()) {
        return Ok(());
    }
    warn!(
        user_id = %caller.user_id,
        resource_type = T::RESOURCE_TYPE,
        resource_id = %entity.resource_id(),
        "read denied"
    );
    Err(CommandError::Forbidden(format!(
        "user {} may not read {} {} of company {}",
        caller.user_id,
        T::RESOURCE_TYPE,
        entity.resource_id(),
        entity.company()
    )))
}

/// Records an activity; failures are logged and swallowed.
pub(crate) async fn record_activity(recorder: &dyn ActivityRecorder, entry: ActivityEntry) {
    let title = entry.title.clone();
    if let Err(err) = recorder.record(entry).await {
        warn!(error = %err, title = %title, "failed to record activity");
    }
}

/// Sends a notification; failures are logged and swallowed.
pub(crate) async fn send_notification(sink: &dyn NotificationSink, notification: Notification) {
    let kind = notification.kind;
    if let Err(err) = sink.notify(notification).await {
        warn!(error = %err, kind = %kind, "failed to send notification");
    }
}

/// Issues the next offer number for `company` in the current year.
pub(crate) async fn issue_offer_number(
    sequence: &dyn NumberSequence,
    company: &CompanyId,
) -> Result<OfferNumber, CommandError> {
    let year = Timestamp::now().year();
    let value = sequence.next_value(company, year).await?;
    Ok(OfferNumber::format(company.prefix(), year, value))
}

pub(crate) async fn load_deal(reader: &dyn DealReader, id: DealId) -> Result<Deal, CommandError> {
    reader
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DealError::NotFound(id).into())
}

pub(crate) async fn load_offer(reader: &dyn OfferReader, id: OfferId) -> Result<Offer, CommandError> {
    reader
        .find_by_id(&id)
        .await?
        .ok_or_else(|| OfferError::NotFound(id).into())
}

pub(crate) async fn load_project(
    reader: &dyn ProjectReader,
    id: ProjectId,
) -> Result<Project, CommandError> {
    reader
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ProjectError::NotFound(id).into())
}

/// The entity owning a set of budget lines.
#[derive(Debug, Clone)]
pub(crate) enum ParentRecord {
    Offer(Offer),
    Project(Project),
}

impl ParentRecord {
    pub(crate) fn ensure_can_modify(&self, caller: &Caller) -> Result<(), CommandError> {
        match self {
            ParentRecord::Offer(offer) => ensure_can_modify(caller, offer),
            ParentRecord::Project(project) => ensure_can_modify(caller, project),
        }
    }

    pub(crate) fn ensure_can_read(&self, caller: &Caller) -> Result<(), CommandError> {
        match self {
            ParentRecord::Offer(offer) => ensure_can_read(caller, offer),
            ParentRecord::Project(project) => ensure_can_read(caller, project),
        }
    }
}

/// Loads the parent of a budget, failing with `ParentNotFound`.
pub(crate) async fn load_parent(
    offers: &dyn OfferReader,
    projects: &dyn ProjectReader,
    parent: BudgetParent,
) -> Result<ParentRecord, CommandError> {
    let record = match parent {
        BudgetParent::Offer(id) => offers.find_by_id(&id).await?.map(ParentRecord::Offer),
        BudgetParent::Project(id) => projects.find_by_id(&id).await?.map(ParentRecord::Project),
    };
    record.ok_or_else(|| BudgetError::ParentNotFound(parent).into())
}

/// Copies every line of `source` onto a parent created in the same change set.
///
/// A source without lines yields no copies; conversions treat that as
/// "nothing to inherit" rather than an error.
pub(crate) async fn copy_budget_to_new_parent(
    lines: &dyn BudgetLineReader,
    source: BudgetParent,
    target: BudgetParent,
) -> Result<Vec<BudgetLine>, CommandError> {
    let source_lines = lines.list_by_parent(&source).await?;
    if source_lines.is_empty() {
        return Ok(Vec::new());
    }
    Ok(clone_lines(&source_lines, source, target, 0)?)
}

//! Offer lifecycle command and query handlers.

mod accept_offer;
mod advance_offer;
mod clone_offer;
mod create_offer;
mod expire_offer;
mod get_offer;
mod recalculate_offer_totals;
mod reject_offer;
mod send_offer;
mod update_offer;

pub use accept_offer::{AcceptOfferCommand, AcceptOfferHandler, AcceptOfferResult};
pub use advance_offer::{AdvanceOfferCommand, AdvanceOfferHandler};
pub use clone_offer::{CloneOfferCommand, CloneOfferHandler, CloneOfferResult};
pub use create_offer::{CreateOfferCommand, CreateOfferHandler};
pub use expire_offer::{ExpireOfferCommand, ExpireOfferHandler};
pub use get_offer::{GetOfferHandler, GetOfferQuery};
pub use recalculate_offer_totals::{RecalculateOfferTotalsCommand, RecalculateOfferTotalsHandler};
pub use reject_offer::{RejectOfferCommand, RejectOfferHandler};
pub use send_offer::{SendOfferCommand, SendOfferHandler};
pub use update_offer::{UpdateOfferCommand, UpdateOfferHandler};

use crate::domain::activity::{Notification, NotificationKind};
use crate::domain::foundation::Caller;
use crate::domain::offer::Offer;
use crate::ports::NotificationSink;

use super::support::send_notification;

/// Tells the responsible user about a change someone else made.
pub(crate) async fn notify_responsible(
    sink: &dyn NotificationSink,
    offer: &Offer,
    caller: &Caller,
    kind: NotificationKind,
    title: &str,
    message: String,
) {
    let Some(recipient) = offer.responsible_user_id.as_ref() else {
        return;
    };
    if recipient == &caller.user_id {
        return;
    }
    send_notification(
        sink,
        Notification::new(recipient.clone(), kind, title, message, offer.id),
    )
    .await;
}

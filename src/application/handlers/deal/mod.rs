//! Deal pipeline command and query handlers.

mod advance_deal_stage;
mod create_deal;
mod create_offer_from_deal;
mod get_deal;
mod get_stage_history;
mod lose_deal;
mod reopen_deal;
mod update_deal;
mod win_deal;

pub use advance_deal_stage::{
    AdvanceDealStageCommand, AdvanceDealStageHandler, AdvanceDealStageResult,
};
pub use create_deal::{CreateDealCommand, CreateDealHandler, CreateDealResult};
pub use create_offer_from_deal::{
    CreateOfferFromDealCommand, CreateOfferFromDealHandler, CreateOfferFromDealResult,
};
pub use get_deal::{GetDealHandler, GetDealQuery};
pub use get_stage_history::{GetStageHistoryHandler, GetStageHistoryQuery};
pub use lose_deal::{LoseDealCommand, LoseDealHandler, LoseDealResult};
pub use reopen_deal::{ReopenDealCommand, ReopenDealHandler, ReopenDealResult};
pub use update_deal::{UpdateDealCommand, UpdateDealHandler};
pub use win_deal::{WinDealCommand, WinDealHandler, WinDealResult};

//! Append-only stage history.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Caller, DealId, StageHistoryId, Timestamp, UserId};

use super::DealStage;

/// One stage change of a deal. `from_stage` is `None` for the creation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageHistoryEntry {
    pub id: StageHistoryId,
    pub deal_id: DealId,
    pub from_stage: Option<DealStage>,
    pub to_stage: DealStage,
    pub changed_by: UserId,
    pub changed_by_name: String,
    pub notes: Option<String>,
    pub changed_at: Timestamp,
}

impl StageHistoryEntry {
    pub fn record(
        deal_id: DealId,
        from_stage: Option<DealStage>,
        to_stage: DealStage,
        changed_by: &Caller,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: StageHistoryId::new(),
            deal_id,
            from_stage,
            to_stage,
            changed_by: changed_by.user_id.clone(),
            changed_by_name: changed_by.name().to_string(),
            notes: notes.filter(|n| !n.trim().is_empty()),
            changed_at: Timestamp::now(),
        }
    }
}

/// Orders entries most-recent-first.
pub fn newest_first(entries: &mut [StageHistoryEntry]) {
    entries.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
}

//! State machine trait for lifecycle enums.
//!
//! Deal stages, offer phases and project phases all describe their legal
//! moves through this trait, so the transition tables live next to the enums
//! and aggregates only ask "may I go there?".

/// Trait for lifecycle enums that form a state machine.
///
/// Implementors list their outgoing edges; membership checks and the
/// terminal-state test come for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for DealStage {
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Lead => vec![Qualified, Lost],
///             // ...
///         }
///     }
/// }
///
/// if !deal.stage().can_transition_to(&DealStage::Proposal) { ... }
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if moving from self to target is a legal edge.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

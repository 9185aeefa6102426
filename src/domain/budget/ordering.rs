//! Display-order planning for reorder and clone.

use std::collections::HashSet;

use crate::domain::foundation::BudgetLineId;

use super::{BudgetError, BudgetLine, BudgetParent};

/// Checks that `ordered_ids` is a permutation of the parent's current lines.
///
/// On success, position in the list is the new display order.
pub fn validate_reorder(
    current: &[BudgetLine],
    ordered_ids: &[BudgetLineId],
) -> Result<(), BudgetError> {
    if ordered_ids.len() != current.len() {
        return Err(BudgetError::ReorderCountMismatch {
            expected: current.len(),
            actual: ordered_ids.len(),
        });
    }

    let known: HashSet<BudgetLineId> = current.iter().map(|line| line.id).collect();
    let mut seen = HashSet::with_capacity(ordered_ids.len());
    for id in ordered_ids {
        if !known.contains(id) || !seen.insert(*id) {
            return Err(BudgetError::InvalidReorderList(*id));
        }
    }
    Ok(())
}

/// Copies `source` onto `target`, appending after `existing_on_target` lines.
///
/// Relative order of the source is preserved.
pub fn clone_lines(
    source: &[BudgetLine],
    source_parent: BudgetParent,
    target: BudgetParent,
    existing_on_target: usize,
) -> Result<Vec<BudgetLine>, BudgetError> {
    if source.is_empty() {
        return Err(BudgetError::SourceLinesNotFound(source_parent));
    }

    let mut ordered: Vec<&BudgetLine> = source.iter().collect();
    ordered.sort_by_key(|line| line.display_order);

    Ok(ordered
        .into_iter()
        .enumerate()
        .map(|(rank, line)| line.copy_to(target, (existing_on_target + rank) as u32))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::budget::{LineDetails, LineName, Pricing};
    use crate::domain::foundation::{OfferId, ProjectId};
    use proptest::prelude::*;

    fn lines_on(parent: BudgetParent, n: usize) -> Vec<BudgetLine> {
        (0..n)
            .map(|i| {
                BudgetLine::create(
                    parent,
                    LineName::custom(format!("line {}", i)),
                    LineDetails::default(),
                    Pricing::fixed(100.0 + i as f64, 150.0 + i as f64),
                    i as u32,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn reorder_rejects_wrong_length() {
        let lines = lines_on(BudgetParent::Offer(OfferId::new()), 3);
        let ids: Vec<_> = lines.iter().take(2).map(|l| l.id).collect();
        assert_eq!(
            validate_reorder(&lines, &ids),
            Err(BudgetError::ReorderCountMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn reorder_rejects_duplicates_and_strangers() {
        let lines = lines_on(BudgetParent::Offer(OfferId::new()), 2);
        let dup = vec![lines[0].id, lines[0].id];
        assert_eq!(
            validate_reorder(&lines, &dup),
            Err(BudgetError::InvalidReorderList(lines[0].id))
        );

        let stranger = BudgetLineId::new();
        assert_eq!(
            validate_reorder(&lines, &[lines[0].id, stranger]),
            Err(BudgetError::InvalidReorderList(stranger))
        );
    }

    #[test]
    fn clone_of_empty_source_fails() {
        let source = BudgetParent::Offer(OfferId::new());
        let target = BudgetParent::Project(ProjectId::new());
        assert_eq!(
            clone_lines(&[], source, target, 0),
            Err(BudgetError::SourceLinesNotFound(source))
        );
    }

    #[test]
    fn clone_appends_after_existing_target_lines() {
        let source = BudgetParent::Offer(OfferId::new());
        let target = BudgetParent::Project(ProjectId::new());
        let cloned = clone_lines(&lines_on(source, 2), source, target, 3).unwrap();
        let orders: Vec<u32> = cloned.iter().map(|l| l.display_order).collect();
        assert_eq!(orders, vec![3, 4]);
    }

    proptest! {
        #[test]
        fn any_permutation_is_accepted(n in 1usize..12, seed in any::<u64>()) {
            let lines = lines_on(BudgetParent::Offer(OfferId::new()), n);
            let mut ids: Vec<_> = lines.iter().map(|l| l.id).collect();
            let mut state = seed;
            for i in (1..ids.len()).rev() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let j = (state >> 33) as usize % (i + 1);
                ids.swap(i, j);
            }
            prop_assert!(validate_reorder(&lines, &ids).is_ok());
        }

        #[test]
        fn clone_preserves_financials_and_relative_order(n in 1usize..10) {
            let source = BudgetParent::Offer(OfferId::new());
            let target = BudgetParent::Project(ProjectId::new());
            let mut original = lines_on(source, n);
            original.reverse();

            let cloned = clone_lines(&original, source, target, 0).unwrap();
            original.sort_by_key(|l| l.display_order);

            prop_assert_eq!(cloned.len(), original.len());
            for (copy, src) in cloned.iter().zip(original.iter()) {
                prop_assert_eq!(copy.parent, target);
                prop_assert_eq!(copy.display_order, src.display_order);
                prop_assert!((copy.cost - src.cost).abs() < 1e-9);
                prop_assert!((copy.revenue - src.revenue).abs() < 1.0);
                prop_assert_eq!(copy.margin_override, src.margin_override);
                prop_assert_eq!(copy.target_margin_percent, src.target_margin_percent);
            }
        }
    }
}

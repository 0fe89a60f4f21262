//! Insertion sort by adjacent swaps.
//!
//! Before each insertion the growing sorted prefix `[0, i]` is highlighted
//! with a range mark. The prefix is not final until the last element has
//! been inserted, so every index is settled in a single mark at the end.

use crate::core::primitives::StepPrimitives;
use crate::error::EngineResult;

pub async fn sort(p: &mut StepPrimitives<'_>) -> EngineResult<()> {
    let n = p.len();
    if n == 0 {
        return Ok(());
    }
    for i in 1..n {
        p.mark_range(0, i).await?;
        let mut j = i;
        while j > 0 && p.compare(j - 1, j).await? {
            p.swap(j - 1, j).await?;
            j -= 1;
        }
    }
    p.mark_sorted(0..n).await
}

#[cfg(test)]
mod tests {
    use crate::algorithms::test_support::{kinds, run};
    use crate::core::event_bus::StepKind;
    use crate::domain::model::Algorithm;

    #[tokio::test]
    async fn test_shift_left_until_slot_found() {
        let (array, events) = run(Algorithm::Insertion, vec![2, 3, 1]).await;
        assert_eq!(array, vec![1, 2, 3]);
        assert_eq!(
            kinds(&events),
            vec![
                StepKind::MarkRange,
                StepKind::Compare,
                StepKind::MarkRange,
                StepKind::Compare,
                StepKind::Swap,
                StepKind::Compare,
                StepKind::Swap,
                StepKind::MarkSorted,
            ]
        );
        assert_eq!(events[2].indices, vec![0, 2]);
    }

    #[tokio::test]
    async fn test_equal_values_never_swapped() {
        let (_, events) = run(Algorithm::Insertion, vec![7, 7, 7]).await;
        assert!(events.iter().all(|e| e.kind != StepKind::Swap));
    }
}

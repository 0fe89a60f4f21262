//! Selection sort: one swap per pass, position `i` settled after each pass.

use crate::core::primitives::StepPrimitives;
use crate::error::EngineResult;

pub async fn sort(p: &mut StepPrimitives<'_>) -> EngineResult<()> {
    let n = p.len();
    for i in 0..n {
        let mut min = i;
        for j in i + 1..n {
            if p.compare(min, j).await? {
                min = j;
            }
        }
        if min != i {
            p.swap(i, min).await?;
        }
        p.mark_sorted([i]).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::algorithms::test_support::run;
    use crate::core::event_bus::StepKind;
    use crate::domain::model::Algorithm;

    #[tokio::test]
    async fn test_settles_left_to_right() {
        let (array, events) = run(Algorithm::Selection, vec![4, 2, 3, 1]).await;
        assert_eq!(array, vec![1, 2, 3, 4]);
        let settled: Vec<Vec<usize>> = events
            .iter()
            .filter(|e| e.kind == StepKind::MarkSorted)
            .map(|e| e.indices.clone())
            .collect();
        assert_eq!(settled, vec![vec![0], vec![1], vec![2], vec![3]]);
    }

    #[tokio::test]
    async fn test_at_most_one_swap_per_pass() {
        let (_, events) = run(Algorithm::Selection, vec![5, 4, 3, 2, 1]).await;
        let swaps = events.iter().filter(|e| e.kind == StepKind::Swap).count();
        assert!(swaps <= 4);
        let compares = events.iter().filter(|e| e.kind == StepKind::Compare).count();
        assert_eq!(compares, 4 + 3 + 2 + 1);
    }
}

//! Bubble sort with early exit.
//!
//! Each pass bubbles the largest remaining value to the end of the unsorted
//! prefix, which is then settled. A pass without swaps settles the whole
//! remaining prefix at once.

use crate::core::primitives::StepPrimitives;
use crate::error::EngineResult;

pub async fn sort(p: &mut StepPrimitives<'_>) -> EngineResult<()> {
    let n = p.len();
    let mut end = n;
    while end > 1 {
        let mut swapped = false;
        for j in 0..end - 1 {
            if p.compare(j, j + 1).await? {
                p.swap(j, j + 1).await?;
                swapped = true;
            }
        }
        end -= 1;
        if !swapped {
            return p.mark_sorted(0..=end).await;
        }
        p.mark_sorted([end]).await?;
    }
    if n > 0 {
        p.mark_sorted([0]).await?;
    }
    Ok(())
}

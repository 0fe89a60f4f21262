//! Quick sort with the last element of each range as pivot (Lomuto).
//!
//! Ranges are processed from an explicit stack, left part first. A pivot is
//! settled as soon as it reaches its final slot; a range of one element is
//! settled directly.

use crate::core::primitives::StepPrimitives;
use crate::error::EngineResult;

pub async fn sort(p: &mut StepPrimitives<'_>) -> EngineResult<()> {
    // half-open ranges
    let mut pending = vec![(0, p.len())];
    while let Some((lo, hi)) = pending.pop() {
        match hi - lo {
            0 => continue,
            1 => {
                p.mark_sorted([lo]).await?;
                continue;
            }
            _ => {}
        }
        let pivot = partition(p, lo, hi - 1).await?;
        p.mark_sorted([pivot]).await?;
        pending.push((pivot + 1, hi));
        pending.push((lo, pivot));
    }
    Ok(())
}

/// Partition `[lo, hi]` around `a[hi]`; returns the pivot's final index.
async fn partition(p: &mut StepPrimitives<'_>, lo: usize, hi: usize) -> EngineResult<usize> {
    p.mark_range(lo, hi).await?;
    p.mark_pivot(hi).await?;
    let mut store = lo;
    for j in lo..hi {
        // a[hi] > a[j], i.e. a[j] belongs left of the pivot
        if p.compare(hi, j).await? {
            if store != j {
                p.swap(store, j).await?;
            }
            store += 1;
        }
    }
    if store != hi {
        p.swap(store, hi).await?;
    }
    Ok(store)
}

//! Top-down merge sort with an in-place merge.
//!
//! The merge rotates each element of the right run into place with adjacent
//! swaps, so the array is only ever changed by true exchanges. Only a
//! strictly smaller right element moves ahead of a left one, which keeps the
//! sort stable.
//!
//! Every moved element costs one swap per position it travels, so the swap
//! counter equals the number of inversions in the input (the same count as
//! bubble sort), not the O(n log n) writes of a buffered merge.

use futures::future::{BoxFuture, FutureExt};

use crate::core::primitives::StepPrimitives;
use crate::error::EngineResult;

pub async fn sort(p: &mut StepPrimitives<'_>) -> EngineResult<()> {
    let n = p.len();
    if n == 0 {
        return Ok(());
    }
    sort_range(p, 0, n - 1).await?;
    p.mark_sorted(0..n).await
}

fn sort_range<'a, 'p>(
    p: &'a mut StepPrimitives<'p>,
    lo: usize,
    hi: usize,
) -> BoxFuture<'a, EngineResult<()>>
where
    'p: 'a,
{
    async move {
        if lo >= hi {
            return Ok(());
        }
        let mid = lo + (hi - lo) / 2;
        sort_range(&mut *p, lo, mid).await?;
        sort_range(&mut *p, mid + 1, hi).await?;
        merge(p, lo, mid, hi).await
    }
    .boxed()
}

/// Merge the sorted runs `[lo, mid]` and `[mid + 1, hi]`.
async fn merge(p: &mut StepPrimitives<'_>, lo: usize, mid: usize, hi: usize) -> EngineResult<()> {
    p.mark_range(lo, hi).await?;
    let mut i = lo;
    let mut j = mid + 1;
    while i < j && j <= hi {
        if p.compare(i, j).await? {
            for k in (i..j).rev() {
                p.swap(k, k + 1).await?;
            }
            j += 1;
        }
        i += 1;
    }
    Ok(())
}

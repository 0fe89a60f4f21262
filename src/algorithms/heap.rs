//! Heap sort: build a max-heap with sift-down, then repeatedly move the root
//! to the end of the heap and settle it.

use crate::core::primitives::StepPrimitives;
use crate::error::EngineResult;

pub async fn sort(p: &mut StepPrimitives<'_>) -> EngineResult<()> {
    let n = p.len();
    for root in (0..n / 2).rev() {
        sift_down(p, root, n).await?;
    }
    for end in (1..n).rev() {
        p.swap(0, end).await?;
        p.mark_sorted([end]).await?;
        sift_down(p, 0, end).await?;
    }
    if n > 0 {
        p.mark_sorted([0]).await?;
    }
    Ok(())
}

/// Restore the heap property below `root` within the first `size` slots.
async fn sift_down(p: &mut StepPrimitives<'_>, mut root: usize, size: usize) -> EngineResult<()> {
    loop {
        let left = 2 * root + 1;
        if left >= size {
            return Ok(());
        }
        let mut largest = root;
        if p.compare(left, largest).await? {
            largest = left;
        }
        let right = left + 1;
        if right < size && p.compare(right, largest).await? {
            largest = right;
        }
        if largest == root {
            return Ok(());
        }
        p.swap(root, largest).await?;
        root = largest;
    }
}

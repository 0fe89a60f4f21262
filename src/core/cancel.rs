use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Cancellation signal shared by a run, its controller handle and its
/// event publisher.
///
/// Flipping the signal is synchronous; anything that checks it afterwards
/// observes the cancellation, so no event can be published once
/// [`cancel`](Self::cancel) has returned.
#[derive(Clone, Debug)]
pub struct CancelSignal {
    token: CancellationToken,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

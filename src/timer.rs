/// Timers and call deadlines
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{self, Either};

/// Something that can wait for a duration
#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

/// Race `call` against `timer`. Returns `None` when the timer wins; the call
/// future is dropped and a late result is never observed.
pub async fn with_deadline<F>(timer: &dyn Timer, duration: Duration, call: F) -> Option<F::Output>
where
    F: Future,
{
    let call = Box::pin(call);
    let deadline = timer.sleep(duration);
    match future::select(call, deadline).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(((), _)) => None,
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;

    /// Fires immediately: any call that is not already complete times out
    pub struct ExpiredTimer;

    #[async_trait(?Send)]
    impl Timer for ExpiredTimer {
        async fn sleep(&self, _duration: Duration) {}
    }

    /// Never fires
    pub struct PatientTimer;

    #[async_trait(?Send)]
    impl Timer for PatientTimer {
        async fn sleep(&self, _duration: Duration) {
            future::pending::<()>().await
        }
    }
}
